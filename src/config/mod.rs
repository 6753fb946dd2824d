pub mod settings;

pub use settings::{BehaviorConfig, Config, ConfigError, ExecutionConfig, LLMConfig, SecurityConfig, ServerConfig};
