use crate::security::ValidatedCommand;
use std::io::{self, BufRead, Write};

/// Human approval step before a command runs
pub trait ConfirmationGate {
    /// Returns true only on an explicit yes
    fn confirm(&mut self, command: &ValidatedCommand) -> bool;
}

/// Whether an answer counts as approval: `y` or `yes`, any case
pub fn is_affirmative(answer: &str) -> bool {
    let answer = answer.trim().to_lowercase();
    answer == "y" || answer == "yes"
}

/// Line-oriented prompt over any reader/writer pair
///
/// The interactive loop reads questions through the same prompt, so both
/// share one buffered reader.
pub struct PromptGate<R, W> {
    reader: R,
    writer: W,
}

impl<R: BufRead, W: Write> PromptGate<R, W> {
    pub fn new(reader: R, writer: W) -> Self {
        Self { reader, writer }
    }

    /// Read one line; `None` on end of input
    pub fn read_line(&mut self) -> io::Result<Option<String>> {
        let mut line = String::new();
        match self.reader.read_line(&mut line)? {
            0 => Ok(None),
            _ => Ok(Some(line)),
        }
    }

    pub fn writer(&mut self) -> &mut W {
        &mut self.writer
    }

    pub fn into_writer(self) -> W {
        self.writer
    }
}

impl<R: BufRead, W: Write> ConfirmationGate for PromptGate<R, W> {
    fn confirm(&mut self, command: &ValidatedCommand) -> bool {
        let prompted = write!(
            self.writer,
            "Are you sure you want to execute: {}? (y/N): ",
            command
        )
        .and_then(|_| self.writer.flush());
        if let Err(e) = prompted {
            tracing::warn!(error = %e, "failed to show confirmation prompt");
            return false;
        }

        match self.read_line() {
            Ok(Some(answer)) => is_affirmative(&answer),
            Ok(None) => false,
            Err(e) => {
                tracing::warn!(error = %e, "error reading confirmation");
                false
            }
        }
    }
}
