//! Yes/no decisions taken during deployment

use std::io::{self, BufRead, Write};

/// Source of the two interactive decisions of the deploy flow
pub trait Decider: Send {
    /// Replace the listed existing containers?
    fn replace_existing(&mut self, names: &[String]) -> io::Result<bool>;

    /// Download `model` into the inference server?
    fn pull_model(&mut self, model: &str) -> io::Result<bool>;
}

/// Interpret one line of user input; anything but y/yes means no
pub fn parse_answer(input: &str) -> bool {
    matches!(input.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}

/// Ask `question` on `output` and read one answer line from `input`
pub fn ask<R, W>(input: &mut R, output: &mut W, question: &str) -> io::Result<bool>
where
    R: BufRead,
    W: Write,
{
    write!(output, "{} [y/N] ", question)?;
    output.flush()?;

    let mut line = String::new();
    input.read_line(&mut line)?;
    Ok(parse_answer(&line))
}

/// Decider that reads the terminal unless an answer was given up front
#[derive(Debug, Clone, Default)]
pub struct TerminalDecider {
    replace: Option<bool>,
    pull: Option<bool>,
}

impl TerminalDecider {
    pub fn new(replace: Option<bool>, pull: Option<bool>) -> Self {
        Self { replace, pull }
    }

    fn ask_stdin(question: &str) -> io::Result<bool> {
        let stdin = io::stdin();
        let mut stdout = io::stdout();
        ask(&mut stdin.lock(), &mut stdout, question)
    }
}

impl Decider for TerminalDecider {
    fn replace_existing(&mut self, names: &[String]) -> io::Result<bool> {
        match self.replace {
            Some(answer) => Ok(answer),
            None => Self::ask_stdin(&format!(
                "Found existing containers ({}). Remove and recreate them?",
                names.join(", ")
            )),
        }
    }

    fn pull_model(&mut self, model: &str) -> io::Result<bool> {
        match self.pull {
            Some(answer) => Ok(answer),
            None => Self::ask_stdin(&format!("Download the {} model now?", model)),
        }
    }
}
