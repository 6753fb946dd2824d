pub mod audit;
pub mod config;
pub mod error;
pub mod exec;
pub mod llm;
pub mod pipeline;
pub mod security;
pub mod server;
pub mod ui;

// Re-export commonly used types for convenience
pub use error::{AppError, AppResult, PipelineError, PipelineResult};
pub use exec::{ExecutionError, ExecutionResult, ShellExecutor};
pub use pipeline::{Execution, Frontend, Pipeline};
pub use security::{AllowList, CommandValidator, ValidatedCommand, ValidationError};
