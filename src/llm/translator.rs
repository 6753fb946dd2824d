use crate::llm::client::{CommandSource, LLMError};
use crate::llm::extractor::{CommandExtractor, ExtractionError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TranslationError {
    #[error("Failed to get command: {0}")]
    Source(#[from] LLMError),

    #[error("Failed to extract command: {source}")]
    Extraction {
        #[source]
        source: ExtractionError,
        response: String,
    },
}

/// Candidate command together with the raw text it came from
#[derive(Debug, Clone)]
pub struct Translation {
    pub command: String,
    pub response: String,
}

/// Turns a question into an untrusted candidate command
pub struct Translator {
    source: Box<dyn CommandSource>,
    extractor: CommandExtractor,
}

impl Translator {
    pub fn new(source: Box<dyn CommandSource>) -> Self {
        Self::with_extractor(source, CommandExtractor::new())
    }

    pub fn with_extractor(source: Box<dyn CommandSource>, extractor: CommandExtractor) -> Self {
        Self { source, extractor }
    }

    /// Extract the candidate command from text already obtained from a model
    pub fn extract<'a>(&self, response: &'a str) -> Result<&'a str, ExtractionError> {
        self.extractor.extract(response)
    }

    pub async fn translate(&self, question: &str) -> Result<Translation, TranslationError> {
        let response = self.source.generate(question).await?;

        let command = match self.extract(&response) {
            Ok(command) => command.to_string(),
            Err(source) => return Err(TranslationError::Extraction { source, response }),
        };

        Ok(Translation { command, response })
    }
}
