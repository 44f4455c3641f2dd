//! Line-based yes/no prompts over any reader/writer pair.

use std::io::{self, BufRead, BufReader, Stderr, Stdin, Write};
use std::sync::{Mutex, PoisonError};

use stencil_core::{
    application::{ApplicationError, ports::Prompter},
    error::{StencilError, StencilResult},
};

const INVALID_CHOICE: &str = "An invalid choice was entered, please enter y or n.";

/// Asks `question [y/n]: ` and reads one answer per line.
///
/// `y`/`yes`/`n`/`no` are accepted in any case. An empty line accepts the
/// default when there is one; anything else asks again. End of input is
/// an error, so a closed stdin never hangs a run.
#[derive(Debug)]
pub struct LinePrompter<R, W> {
    io: Mutex<(R, W)>,
}

impl LinePrompter<BufReader<Stdin>, Stderr> {
    /// Reads answers from stdin and asks on stderr, leaving stdout to the
    /// action report.
    pub fn terminal() -> Self {
        Self::new(BufReader::new(io::stdin()), io::stderr())
    }
}

impl<R, W> LinePrompter<R, W>
where
    R: BufRead,
    W: Write,
{
    pub fn new(reader: R, writer: W) -> Self {
        Self {
            io: Mutex::new((reader, writer)),
        }
    }

    /// Give back the reader and writer, e.g. to inspect what was written.
    pub fn into_inner(self) -> (R, W) {
        self.io.into_inner().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<R, W> Prompter for LinePrompter<R, W>
where
    R: BufRead + Send,
    W: Write + Send,
{
    fn confirm(&self, question: &str, default: Option<bool>) -> StencilResult<bool> {
        let hint = match default {
            None => "y/n",
            Some(true) => "Y/n",
            Some(false) => "y/N",
        };

        let mut io = self.io.lock().unwrap_or_else(PoisonError::into_inner);
        let (reader, writer) = &mut *io;

        loop {
            write!(writer, "{} [{}]: ", question, hint).map_err(prompt_error)?;
            writer.flush().map_err(prompt_error)?;

            let mut line = String::new();
            if reader.read_line(&mut line).map_err(prompt_error)? == 0 {
                return Err(ApplicationError::Prompt {
                    reason: "No answer: input was closed".into(),
                }
                .into());
            }

            match line.trim().to_lowercase().as_str() {
                "y" | "yes" => return Ok(true),
                "n" | "no" => return Ok(false),
                "" => {
                    if let Some(answer) = default {
                        return Ok(answer);
                    }
                }
                _ => {}
            }

            writeln!(writer, "{}", INVALID_CHOICE).map_err(prompt_error)?;
        }
    }
}

fn prompt_error(e: io::Error) -> StencilError {
    ApplicationError::Prompt {
        reason: e.to_string(),
    }
    .into()
}
