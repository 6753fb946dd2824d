pub mod confirm;
pub mod repl;

pub use confirm::{is_affirmative, ConfirmationGate, PromptGate};
pub use repl::Repl;
