pub mod client;
pub mod extractor;
pub mod openai;
pub mod translator;

pub use client::{CommandSource, LLMError};
pub use extractor::{CommandExtractor, ExtractionError};
pub use openai::OpenAIClient;
pub use translator::{Translation, TranslationError, Translator};
