//! Confirmation before destroying a previous run's output.

use std::io::{self, BufRead, Write};

use crate::error::Result;

/// Asks the user a yes/no question.
pub trait Prompter {
    /// Returns `Some(answer)`, or `None` when no answer can be obtained
    /// (e.g. stdin is closed).
    fn confirm(&mut self, question: &str) -> Result<Option<bool>>;
}

/// Interprets a typed answer. Only `y` / `yes` (any case) mean yes.
pub fn parse_answer(line: &str) -> bool {
    let answer = line.trim().to_ascii_lowercase();
    answer == "y" || answer == "yes"
}

/// Prompts on stdout and reads the answer from stdin.
#[derive(Debug, Default)]
pub struct StdinPrompter;

impl Prompter for StdinPrompter {
    fn confirm(&mut self, question: &str) -> Result<Option<bool>> {
        print!("{question} (y/n): ");
        io::stdout().flush()?;

        let mut input = String::new();
        let read = io::stdin().lock().read_line(&mut input)?;
        if read == 0 {
            return Ok(None);
        }
        Ok(Some(parse_answer(&input)))
    }
}
