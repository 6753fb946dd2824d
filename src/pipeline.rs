//! The generate → extract → validate → execute sequence shared by the
//! front-ends. Confirmation is left to the caller.

use crate::audit::AuditLogger;
use crate::config::Config;
use crate::error::{AppResult, PipelineError, PipelineResult};
use crate::exec::ShellExecutor;
use crate::llm::{CommandSource, LLMError, OpenAIClient, TranslationError, Translator};
use crate::security::{CommandValidator, ValidatedCommand};
use std::fmt;

/// Which front-end a request came from, recorded in the audit log
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Frontend {
    Cli,
    Http,
}

impl Frontend {
    pub fn as_str(&self) -> &'static str {
        match self {
            Frontend::Cli => "cli",
            Frontend::Http => "http",
        }
    }
}

impl fmt::Display for Frontend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A command that ran to a zero exit status
#[derive(Debug, Clone)]
pub struct Execution {
    pub command: ValidatedCommand,
    pub output: String,
}

pub struct Pipeline {
    translator: Translator,
    validator: CommandValidator,
    executor: ShellExecutor,
    audit: Option<AuditLogger>,
}

impl Pipeline {
    pub fn new(source: Box<dyn CommandSource>, validator: CommandValidator, executor: ShellExecutor) -> Self {
        Self {
            translator: Translator::new(source),
            validator,
            executor,
            audit: None,
        }
    }

    pub fn with_audit(mut self, audit: AuditLogger) -> Self {
        self.audit = Some(audit);
        self
    }

    /// Build the production pipeline: OpenAI source, configured allow-list,
    /// shell and timeout, and the audit log if enabled
    pub fn from_config(config: &Config) -> AppResult<Self> {
        let api_key = config
            .get_api_key()
            .ok_or_else(|| LLMError::MissingApiKey(config.llm.api_key_env.clone()))?;

        let mut client = OpenAIClient::with_model(api_key, config.llm.model.clone())?;
        if let Some(base_url) = &config.llm.base_url {
            client = client.with_base_url(base_url.as_str());
        }

        let validator = CommandValidator::with_allow_list(config.allow_list()?);
        let executor = ShellExecutor::new()
            .with_shell(config.execution.shell.clone())
            .with_timeout(config.execution_timeout());

        let mut pipeline = Self::new(Box::new(client), validator, executor);

        if config.behavior.log_commands {
            match AuditLogger::new() {
                Ok(audit) => pipeline = pipeline.with_audit(audit),
                Err(e) => tracing::warn!(error = %e, "audit log disabled"),
            }
        }

        Ok(pipeline)
    }

    pub fn validator(&self) -> &CommandValidator {
        &self.validator
    }

    pub fn executor(&self) -> &ShellExecutor {
        &self.executor
    }

    /// Ask the command source and vet its answer
    ///
    /// Returns the command ready for (optional) confirmation and execution.
    pub async fn plan(&self, question: &str, frontend: Frontend) -> PipelineResult<ValidatedCommand> {
        let translation = match self.translator.translate(question).await {
            Ok(translation) => translation,
            Err(TranslationError::Extraction { source, response }) => {
                tracing::warn!(error = %source, "model response had no command");
                self.audit_rejection(question, &response, &source.to_string(), frontend);
                return Err(source.into());
            }
            Err(e) => return Err(e.into()),
        };

        tracing::info!(command = %translation.command, "generated command");

        self.validator.validate(&translation.command).map_err(|e| {
            tracing::warn!(error = %e, "command rejected");
            self.audit_rejection(question, &translation.response, &e.to_string(), frontend);
            PipelineError::from(e)
        })
    }

    /// Extract and validate a response obtained elsewhere
    pub fn check_response(&self, response: &str) -> PipelineResult<ValidatedCommand> {
        let command = self.translator.extract(response)?;
        Ok(self.validator.validate(command)?)
    }

    /// Run a validated command and record it in the audit log
    pub async fn execute(&self, command: &ValidatedCommand, frontend: Frontend) -> PipelineResult<Execution> {
        tracing::info!(command = %command, %frontend, "executing command");

        let result = self.executor.execute(command).await;

        if let Some(audit) = &self.audit {
            if let Err(e) = audit.log_command(command.as_str(), frontend.as_str(), result.audit_exit_code()) {
                tracing::warn!(error = %e, "failed to write audit log");
            }
        }

        match result.error {
            None => {
                tracing::debug!(bytes = result.output.len(), "command finished");
                Ok(Execution {
                    command: command.clone(),
                    output: String::from_utf8_lossy(&result.output).into_owned(),
                })
            }
            Some(source) => {
                tracing::warn!(error = %source, "command failed");
                Err(PipelineError::Execution {
                    command: command.to_string(),
                    output: result.output,
                    source,
                })
            }
        }
    }

    fn audit_rejection(&self, question: &str, response: &str, reason: &str, frontend: Frontend) {
        if let Some(audit) = &self.audit {
            if let Err(e) = audit.log_validation_failure(question, response, reason, frontend.as_str()) {
                tracing::warn!(error = %e, "failed to write audit log");
            }
        }
    }
}
