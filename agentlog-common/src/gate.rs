//! Confirmation gate: one yes/no question, one line of input.
//!
//! Two polarities exist and are not interchangeable:
//!
//! - default-yes (`[Y/n]`): anything but `n` confirms, including empty input.
//! - default-no (`[y/N]`): only `y` confirms.
//!
//! There is no retry loop; every line is classified.

use std::collections::VecDeque;
use std::io::{self, BufRead, Write};
use tracing::debug;

/// Source of yes/no decisions for the reconcilers.
pub trait ConfirmationGate {
    /// Ask `question` and return the decision.
    fn ask(&mut self, question: &str, default_yes: bool) -> bool;
}

/// Classify one raw input line.
pub fn classify_answer(line: &str, default_yes: bool) -> bool {
    let answer = line.trim().to_lowercase();
    if default_yes {
        answer != "n"
    } else {
        answer == "y"
    }
}

/// Prompt suffix shown after the question.
pub fn prompt_suffix(default_yes: bool) -> &'static str {
    if default_yes { "[Y/n] " } else { "[y/N] " }
}

/// Gate reading answers from a line-oriented input and echoing prompts to an output.
pub struct TerminalGate<R, W> {
    input: R,
    output: W,
    indent: String,
}

impl<R: BufRead, W: Write> TerminalGate<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self {
            input,
            output,
            indent: String::new(),
        }
    }

    /// Prefix written before every question, to line prompts up with status output.
    pub fn with_indent(mut self, indent: impl Into<String>) -> Self {
        self.indent = indent.into();
        self
    }

    fn read_answer(&mut self) -> String {
        let mut line = String::new();
        match self.input.read_line(&mut line) {
            Ok(0) => {
                debug!("confirmation input closed, using default");
                String::new()
            }
            Ok(_) => line,
            Err(e) => {
                debug!(error = %e, "failed to read confirmation input, using default");
                String::new()
            }
        }
    }
}

impl TerminalGate<io::StdinLock<'static>, io::Stdout> {
    /// Gate bound to the process stdin/stdout.
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> ConfirmationGate for TerminalGate<R, W> {
    fn ask(&mut self, question: &str, default_yes: bool) -> bool {
        // Prompt output is best-effort; an unwritable terminal still gets classified input.
        let _ = write!(
            self.output,
            "{}{} {}",
            self.indent,
            question,
            prompt_suffix(default_yes)
        );
        let _ = self.output.flush();

        let line = self.read_answer();
        let decision = classify_answer(&line, default_yes);
        debug!(question, answer = line.trim(), decision, "confirmation");
        decision
    }
}

/// Gate replaying a fixed script of answer lines.
///
/// Records every question it was asked. Once the script is exhausted it
/// behaves like a closed input and answers with an empty line.
#[derive(Debug, Default, Clone)]
pub struct ScriptedGate {
    answers: VecDeque<String>,
    asked: Vec<String>,
}

impl ScriptedGate {
    pub fn new<I, S>(answers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            answers: answers.into_iter().map(Into::into).collect(),
            asked: Vec::new(),
        }
    }

    /// Questions asked so far, in order.
    pub fn asked(&self) -> &[String] {
        &self.asked
    }

    /// Answers not yet consumed.
    pub fn remaining(&self) -> usize {
        self.answers.len()
    }
}

impl ConfirmationGate for ScriptedGate {
    fn ask(&mut self, question: &str, default_yes: bool) -> bool {
        self.asked.push(question.to_string());
        let line = self.answers.pop_front().unwrap_or_default();
        classify_answer(&line, default_yes)
    }
}
