//! Conflict resolution for contested fields

use crate::config::ConflictStrategy;
use crate::diff::FieldDiff;
use crate::error::{MergeError, Result};
use crate::row::{display_value, Key};
use serde::Serialize;
use std::io::{BufRead, Write};

/// Side whose values win the contested fields of one entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Winner {
    A,
    B,
}

impl Winner {
    /// Parse a user choice, case-insensitive with surrounding whitespace ignored
    pub fn parse(input: &str) -> Option<Self> {
        match input.trim().to_uppercase().as_str() {
            "A" => Some(Self::A),
            "B" => Some(Self::B),
            _ => None,
        }
    }
}

/// What is put in front of the user for one entity
#[derive(Debug, Clone)]
pub struct ConflictPrompt<'a> {
    pub key_fields: &'a [String],
    pub key: &'a Key,
    pub contested: Vec<&'a FieldDiff>,
}

/// Line-oriented, blocking source of interactive decisions
pub trait DecisionInput {
    /// Show the contested fields before the first read for this entity
    fn present(&mut self, prompt: &ConflictPrompt<'_>) -> std::io::Result<()>;

    /// Ask for a choice; called again after each rejected answer
    fn ask(&mut self, rejected: Option<&str>) -> std::io::Result<()>;

    /// Next line of input, `None` once the channel is closed
    fn read_line(&mut self) -> std::io::Result<Option<String>>;
}

/// Console prompt reading from any buffered reader.
///
/// The same reader is kept for every prompt so nothing buffered is lost
/// between decisions.
pub struct ConsoleInput<R, W> {
    reader: R,
    writer: W,
}

impl<R: BufRead, W: Write> ConsoleInput<R, W> {
    pub fn new(reader: R, writer: W) -> Self {
        Self { reader, writer }
    }

    pub fn into_inner(self) -> (R, W) {
        (self.reader, self.writer)
    }
}

impl ConsoleInput<std::io::StdinLock<'static>, std::io::Stdout> {
    pub fn stdio() -> Self {
        Self::new(std::io::stdin().lock(), std::io::stdout())
    }
}

impl ConsoleInput<std::io::StdinLock<'static>, std::io::Stderr> {
    /// Prompts on stderr, leaving stdout to machine-readable output
    pub fn stdin_stderr() -> Self {
        Self::new(std::io::stdin().lock(), std::io::stderr())
    }
}

impl<R: BufRead, W: Write> DecisionInput for ConsoleInput<R, W> {
    fn present(&mut self, prompt: &ConflictPrompt<'_>) -> std::io::Result<()> {
        writeln!(self.writer)?;
        writeln!(
            self.writer,
            "⚠️  Conflict on [{}] = [{}]",
            prompt.key_fields.join(", "),
            prompt.key
        )?;
        for (i, diff) in prompt.contested.iter().enumerate() {
            let marker = if i + 1 == prompt.contested.len() { "└─" } else { "├─" };
            writeln!(
                self.writer,
                "{} {}: A={:<30} B={}",
                marker,
                diff.field,
                display_value(&diff.a),
                display_value(&diff.b)
            )?;
        }
        writeln!(self.writer, "Type A to keep table A's values, B to take table B's values.")?;
        Ok(())
    }

    fn ask(&mut self, rejected: Option<&str>) -> std::io::Result<()> {
        if let Some(input) = rejected {
            writeln!(self.writer, "Invalid choice \"{}\", please type A or B", input)?;
        }
        write!(self.writer, ">>> Your choice (A/B): ")?;
        self.writer.flush()
    }

    fn read_line(&mut self) -> std::io::Result<Option<String>> {
        let mut line = String::new();
        if self.reader.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line))
    }
}

/// Outcome of one policy decision
#[derive(Debug)]
pub struct Resolution {
    pub winner: Winner,
    /// Set when the input channel failed and the decision fell back to A
    pub warning: Option<MergeError>,
}

impl Resolution {
    fn decided(winner: Winner) -> Self {
        Self { winner, warning: None }
    }
}

/// Picks one winner per conflicting entity according to the strategy
pub struct ResolutionPolicy<'a> {
    strategy: ConflictStrategy,
    input: Option<&'a mut dyn DecisionInput>,
}

impl<'a> ResolutionPolicy<'a> {
    pub fn new(strategy: ConflictStrategy, input: Option<&'a mut dyn DecisionInput>) -> Self {
        Self { strategy, input }
    }

    pub fn strategy(&self) -> ConflictStrategy {
        self.strategy
    }

    pub fn resolve(&mut self, prompt: &ConflictPrompt<'_>) -> Resolution {
        match self.strategy {
            ConflictStrategy::PreferA => Resolution::decided(Winner::A),
            ConflictStrategy::PreferB => Resolution::decided(Winner::B),
            ConflictStrategy::Interactive => match self.ask_user(prompt) {
                Ok(winner) => {
                    log::info!("User chose {:?} for key [{}]", winner, prompt.key);
                    Resolution::decided(winner)
                }
                Err(e) => {
                    log::warn!("{}; defaulting to table A for key [{}]", e, prompt.key);
                    Resolution {
                        winner: Winner::A,
                        warning: Some(e),
                    }
                }
            },
        }
    }

    /// Block until a valid choice arrives or the channel fails
    fn ask_user(&mut self, prompt: &ConflictPrompt<'_>) -> Result<Winner> {
        let input = self
            .input
            .as_deref_mut()
            .ok_or_else(|| MergeError::input("no interactive input channel available"))?;

        input.present(prompt).map_err(MergeError::input)?;
        let mut rejected: Option<String> = None;
        loop {
            input.ask(rejected.as_deref()).map_err(MergeError::input)?;
            let line = input
                .read_line()
                .map_err(MergeError::input)?
                .ok_or_else(|| MergeError::input("input channel closed"))?;
            match Winner::parse(&line) {
                Some(winner) => return Ok(winner),
                None => rejected = Some(line.trim().to_string()),
            }
        }
    }
}
