use crate::pipeline::{DestinationPicker, PipelineResult};
use std::io::{BufRead, Write};
use std::path::PathBuf;

/// Destination decided up front; `None` behaves like a cancelled dialog.
#[derive(Debug, Clone, Default)]
pub struct FixedDestination(pub Option<PathBuf>);

impl DestinationPicker for FixedDestination {
    fn choose(&mut self, _default_extension: &str) -> PipelineResult<Option<PathBuf>> {
        Ok(self.0.clone())
    }
}

/// Asks for a path on a line-oriented stream. A blank answer or end of
/// input cancels.
pub struct PromptDestination<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> PromptDestination<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }
}

impl PromptDestination<std::io::StdinLock<'static>, std::io::Stdout> {
    pub fn stdio() -> Self {
        Self::new(std::io::stdin().lock(), std::io::stdout())
    }
}

impl<R: BufRead, W: Write> DestinationPicker for PromptDestination<R, W> {
    fn choose(&mut self, default_extension: &str) -> PipelineResult<Option<PathBuf>> {
        // A broken prompt stream is treated as the user walking away.
        if write!(
            self.output,
            "Save table as (.{} added if no extension, blank to cancel): ",
            default_extension
        )
        .and_then(|_| self.output.flush())
        .is_err()
        {
            return Ok(None);
        }

        let mut line = String::new();
        match self.input.read_line(&mut line) {
            Ok(0) | Err(_) => Ok(None),
            Ok(_) => {
                let answer = line.trim();
                if answer.is_empty() {
                    Ok(None)
                } else {
                    Ok(Some(PathBuf::from(answer)))
                }
            }
        }
    }
}
