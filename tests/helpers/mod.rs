#![allow(dead_code)]

use async_trait::async_trait;
use kubedebug::exec::ShellExecutor;
use kubedebug::llm::{CommandSource, LLMError};
use kubedebug::security::{AllowList, CommandValidator};
use kubedebug::Pipeline;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Command source that always answers with the same text
pub struct MockSource {
    response: Result<String, String>,
    calls: Arc<AtomicUsize>,
}

impl MockSource {
    pub fn answering(response: &str) -> Self {
        Self {
            response: Ok(response.to_string()),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            response: Err(message.to_string()),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Shared counter of `generate` calls
    pub fn calls(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.calls)
    }
}

#[async_trait]
impl CommandSource for MockSource {
    async fn generate(&self, _question: &str) -> Result<String, LLMError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.response
            .clone()
            .map_err(LLMError::ApiError)
    }
}

/// Allow-list usable on any machine: shell builtins and coreutils only
pub fn test_allow_list() -> AllowList {
    AllowList::new(["echo", "printf", "cat", "grep", "head", "tail", "sleep"]).unwrap()
}

/// Pipeline with the default kubectl allow-list
pub fn kubectl_pipeline(response: &str) -> Pipeline {
    Pipeline::new(
        Box::new(MockSource::answering(response)),
        CommandValidator::new(),
        ShellExecutor::new(),
    )
}

/// Pipeline whose allow-list permits commands that exist in CI
pub fn local_pipeline(source: MockSource) -> Pipeline {
    Pipeline::new(
        Box::new(source),
        CommandValidator::with_allow_list(test_allow_list()),
        ShellExecutor::new(),
    )
}
