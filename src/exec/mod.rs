pub mod executor;

pub use executor::{ExecutionError, ExecutionResult, ShellExecutor, DEFAULT_SHELL};
