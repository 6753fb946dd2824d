use thiserror::Error;

pub const DEFAULT_OPEN_MARKER: &str = "<code>";
pub const DEFAULT_CLOSE_MARKER: &str = "</code>";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ExtractionError {
    #[error("No command found in response: missing opening marker '{0}'")]
    MissingOpenMarker(String),

    #[error("No command found in response: missing closing marker '{0}'")]
    MissingCloseMarker(String),

    #[error("No command found in response: markers out of order")]
    MarkersOutOfOrder,
}

/// Pulls the delimited command out of a model response
///
/// Uses the first opening marker and the last closing marker, so a model that
/// echoes the markers inside explanatory text still yields the outermost span.
#[derive(Debug, Clone)]
pub struct CommandExtractor {
    open: String,
    close: String,
}

impl CommandExtractor {
    pub fn new() -> Self {
        Self::with_markers(DEFAULT_OPEN_MARKER, DEFAULT_CLOSE_MARKER)
    }

    pub fn with_markers(open: impl Into<String>, close: impl Into<String>) -> Self {
        Self {
            open: open.into(),
            close: close.into(),
        }
    }

    /// Extract the trimmed command between the markers
    pub fn extract<'a>(&self, response: &'a str) -> Result<&'a str, ExtractionError> {
        let start = response
            .find(&self.open)
            .ok_or_else(|| ExtractionError::MissingOpenMarker(self.open.clone()))?;
        let end = response
            .rfind(&self.close)
            .ok_or_else(|| ExtractionError::MissingCloseMarker(self.close.clone()))?;

        let body_start = start + self.open.len();
        if body_start > end {
            return Err(ExtractionError::MarkersOutOfOrder);
        }

        Ok(response[body_start..end].trim())
    }
}

impl Default for CommandExtractor {
    fn default() -> Self {
        Self::new()
    }
}
