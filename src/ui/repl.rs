use crate::error::{PipelineError, PipelineResult};
use crate::pipeline::{Execution, Frontend, Pipeline};
use crate::ui::confirm::{ConfirmationGate, PromptGate};
use std::io::{self, BufRead, Write};

const BANNER: &str = "Kubernetes Debug Assistant (type 'exit' or 'quit' to end)";
const RULE: &str = "------------------------------------------------------";

/// Terminal front-end: one question at a time, each confirmed before it runs
pub struct Repl<'a, R, W> {
    pipeline: &'a Pipeline,
    prompt: PromptGate<R, W>,
}

impl<'a, R: BufRead, W: Write> Repl<'a, R, W> {
    pub fn new(pipeline: &'a Pipeline, reader: R, writer: W) -> Self {
        Self {
            pipeline,
            prompt: PromptGate::new(reader, writer),
        }
    }

    /// Answer a single question
    ///
    /// Prints the command output (or the partial output of a failed command)
    /// and returns the pipeline outcome for the caller to report.
    pub async fn ask(&mut self, question: &str) -> PipelineResult<Execution> {
        let command = self.pipeline.plan(question, Frontend::Cli).await?;

        if !self.prompt.confirm(&command) {
            self.print("Command execution cancelled.\n");
            return Err(PipelineError::ConfirmationDenied);
        }

        match self.pipeline.execute(&command, Frontend::Cli).await {
            Ok(execution) => {
                self.print_output(&execution.output);
                Ok(execution)
            }
            Err(e) => {
                if let Some(partial) = e.partial_output() {
                    self.print_output(&partial);
                }
                Err(e)
            }
        }
    }

    /// Interactive loop until `exit`, `quit` or end of input
    pub async fn run(&mut self) -> io::Result<()> {
        writeln!(self.prompt.writer(), "{}", BANNER)?;
        writeln!(self.prompt.writer(), "{}", RULE)?;

        loop {
            write!(self.prompt.writer(), "> ")?;
            self.prompt.writer().flush()?;

            let line = match self.prompt.read_line() {
                Ok(Some(line)) => line,
                Ok(None) => break,
                Err(e) => {
                    tracing::error!(error = %e, "error reading input");
                    break;
                }
            };

            let question = line.trim();
            if question.is_empty() {
                continue;
            }

            if question.eq_ignore_ascii_case("exit") || question.eq_ignore_ascii_case("quit") {
                writeln!(self.prompt.writer(), "Goodbye!")?;
                break;
            }

            report(self.ask(question).await);
        }

        Ok(())
    }

    pub fn into_writer(self) -> W {
        self.prompt.into_writer()
    }

    fn print_output(&mut self, output: &str) {
        if output.ends_with('\n') || output.is_empty() {
            self.print(output);
        } else {
            self.print(&format!("{}\n", output));
        }
    }

    fn print(&mut self, text: &str) {
        let writer = self.prompt.writer();
        if let Err(e) = writer.write_all(text.as_bytes()).and_then(|_| writer.flush()) {
            tracing::warn!(error = %e, "failed to write output");
        }
    }
}

/// Log a finished question; a declined confirmation is not an error
pub fn report(outcome: PipelineResult<Execution>) {
    match outcome {
        Ok(_) | Err(PipelineError::ConfirmationDenied) => {}
        Err(e) => tracing::error!(error = %e, "request failed"),
    }
}
