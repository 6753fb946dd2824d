use std::io;
use thiserror::Error;

// Import module-level errors for AppError
use crate::config::settings::ConfigError;
use crate::exec::executor::ExecutionError;
use crate::llm::client::LLMError;
use crate::llm::extractor::ExtractionError;
use crate::llm::translator::TranslationError;
use crate::security::validator::ValidationError;

/// Why a single question did not produce a successful execution
///
/// Every variant ends the current request. Nothing is retried.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Failed to get command: {0}")]
    Source(#[from] LLMError),

    #[error("Failed to extract command: {0}")]
    Extraction(#[from] ExtractionError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Command execution failed: {source}")]
    Execution {
        command: String,
        output: Vec<u8>,
        #[source]
        source: ExecutionError,
    },

    #[error("Command execution cancelled")]
    ConfirmationDenied,
}

impl PipelineError {
    /// The command involved, when one was extracted
    pub fn command(&self) -> Option<&str> {
        match self {
            PipelineError::Validation(ValidationError::DisallowedCommand { command, .. }) => {
                Some(command)
            }
            PipelineError::Execution { command, .. } => Some(command),
            _ => None,
        }
    }

    /// Output captured before an execution failure
    pub fn partial_output(&self) -> Option<String> {
        match self {
            PipelineError::Execution { output, .. } => {
                Some(String::from_utf8_lossy(output).into_owned())
            }
            _ => None,
        }
    }
}

impl From<TranslationError> for PipelineError {
    fn from(err: TranslationError) -> Self {
        match err {
            TranslationError::Source(e) => PipelineError::Source(e),
            TranslationError::Extraction { source, .. } => PipelineError::Extraction(source),
        }
    }
}

/// Top-level application error that wraps all module-specific errors
///
/// Used by the binary for startup failures. Per-question failures stay as
/// `PipelineError` so the front-ends can keep running.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("LLM error: {0}")]
    Llm(#[from] LLMError),

    #[error(transparent)]
    Pipeline(#[from] PipelineError),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Result type for pipeline operations
pub type PipelineResult<T> = std::result::Result<T, PipelineError>;

/// Result type for application-level operations
pub type AppResult<T> = std::result::Result<T, AppError>;
