//! Interactive calculation session.
//!
//! A `Session` holds the current inputs (prefix, operation, decimal style)
//! and the calculation history for one loaded scene. Every user action
//! produces a single [`Status`] describing what happened.

use crate::analysis::aggregate;
use crate::config::Config;
use crate::history::History;
use crate::models::{
    AggregationResult, DecimalStyle, Entity, HistoryEntry, Operation, UnknownOperation,
};
use crate::report::export_csv;
use crate::scene::find_entity;
use std::fmt;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Outcome level of an action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusLevel {
    Info,
    Error,
}

/// Human-readable report of one action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Status {
    pub level: StatusLevel,
    pub message: String,
}

impl Status {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: StatusLevel::Info,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: StatusLevel::Error,
            message: message.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.level == StatusLevel::Error
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.level {
            StatusLevel::Info => write!(f, "{}", self.message),
            StatusLevel::Error => write!(f, "Error: {}", self.message),
        }
    }
}

/// A parsed interactive command.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Calculate,
    ClearHistory,
    Export(Option<PathBuf>),
    ShowHistory,
    SetPrefix(String),
    SetOperation(Operation),
    SetDecimalStyle(DecimalStyle),
    UseEntity(String),
    ListOperations,
    Help,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    #[error("Unknown command '{0}' (type 'help' for a list)")]
    Unknown(String),
    #[error("'{0}' needs an argument")]
    MissingArgument(&'static str),
    #[error(transparent)]
    Operation(#[from] UnknownOperation),
    #[error("Expected 'on' or 'off', got '{0}'")]
    InvalidToggle(String),
}

const HELP: &str = "\
Commands:
  calc                 Calculate and record the result
  clear                Clear the calculation history
  export [FILE]        Export matched objects to CSV
  history              Show recent history
  prefix [TEXT]        Set the name prefix (empty matches everything)
  op <OPERATION>       Set the operation (see 'ops')
  comma on|off         Toggle comma as decimal separator
  use <NAME>           Use an object's name as the prefix
  ops                  List operations
  quit                 Leave the session";

impl Command {
    /// Parse one input line. Blank lines yield `None`.
    ///
    /// The text after `prefix` and `use` is taken verbatim up to the line
    /// terminator, because names are matched exactly.
    pub fn parse(line: &str) -> Result<Option<Self>, CommandError> {
        let line = line.trim_end_matches(['\r', '\n']).trim_start();
        if line.trim_end().is_empty() {
            return Ok(None);
        }

        let (word, verbatim) = match line.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest),
            None => (line, ""),
        };
        let rest = verbatim.trim();

        let command = match word.to_ascii_lowercase().as_str() {
            "calc" | "calculate" => Command::Calculate,
            "clear" => Command::ClearHistory,
            "export" => Command::Export((!rest.is_empty()).then(|| PathBuf::from(rest))),
            "history" => Command::ShowHistory,
            "prefix" => Command::SetPrefix(verbatim.to_string()),
            "op" | "operation" => {
                if rest.is_empty() {
                    return Err(CommandError::MissingArgument("op"));
                }
                Command::SetOperation(rest.parse()?)
            }
            "comma" => match rest.to_ascii_lowercase().as_str() {
                "on" | "true" | "yes" => Command::SetDecimalStyle(DecimalStyle::Comma),
                "off" | "false" | "no" => Command::SetDecimalStyle(DecimalStyle::Dot),
                "" => return Err(CommandError::MissingArgument("comma")),
                _ => return Err(CommandError::InvalidToggle(rest.to_string())),
            },
            "use" => {
                if rest.is_empty() {
                    return Err(CommandError::MissingArgument("use"));
                }
                Command::UseEntity(verbatim.to_string())
            }
            "ops" | "operations" => Command::ListOperations,
            "help" | "?" => Command::Help,
            "quit" | "exit" => Command::Quit,
            other => return Err(CommandError::Unknown(other.to_string())),
        };

        Ok(Some(command))
    }
}

/// Calculation state for one loaded scene.
#[derive(Debug, Clone)]
pub struct Session {
    entities: Vec<Entity>,
    prefix: String,
    operation: Operation,
    decimal_style: DecimalStyle,
    history: History,
    export_path: PathBuf,
}

impl Session {
    /// Create a session over `entities` using the inputs from `config`.
    pub fn new(entities: Vec<Entity>, config: &Config) -> Self {
        Self {
            entities,
            prefix: config.calculation.prefix.clone(),
            operation: config.calculation.operation,
            decimal_style: config.format.decimal_style,
            history: History::new(config.history.display_limit),
            export_path: config.export.path.clone(),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn operation(&self) -> Operation {
        self.operation
    }

    pub fn decimal_style(&self) -> DecimalStyle {
        self.decimal_style
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn set_prefix(&mut self, prefix: impl Into<String>) {
        self.prefix = prefix.into();
    }

    pub fn set_operation(&mut self, operation: Operation) {
        self.operation = operation;
    }

    pub fn set_decimal_style(&mut self, style: DecimalStyle) {
        self.decimal_style = style;
    }

    /// Aggregate with the current inputs without touching the history.
    pub fn compute(&self) -> AggregationResult {
        aggregate(&self.entities, &self.prefix, self.operation)
    }

    /// Aggregate with the current inputs and record the result.
    pub fn calculate(&mut self) -> (AggregationResult, HistoryEntry) {
        let result = self.compute();
        let entry = self
            .history
            .record(&self.prefix, self.operation, &result, self.decimal_style);
        info!("{}", entry.summary);
        (result, entry)
    }

    pub fn clear_history(&mut self) -> Status {
        self.history.clear();
        Status::info("Calculation history cleared.")
    }

    /// Export the current selection to `path`, or to the configured path.
    pub fn export(&self, path: Option<PathBuf>) -> Status {
        let path = path.unwrap_or_else(|| self.export_path.clone());
        let result = self.compute();

        match export_csv(&path, &self.prefix, self.operation, &result, self.decimal_style) {
            Ok(written) => Status::info(format!("Exported to {}", written.display())),
            Err(e) => {
                warn!("Export failed: {}", e);
                Status::error(format!("Export failed: {}", e))
            }
        }
    }

    /// Use the name of an existing object as the prefix.
    pub fn use_entity(&mut self, name: &str) -> Status {
        match find_entity(&self.entities, name) {
            Some(entity) => {
                self.prefix = entity.name.clone();
                Status::info(format!("Prefix set to '{}'", self.prefix))
            }
            None => Status::error(format!("No object named '{}'", name)),
        }
    }

    /// Recent history, one entry per line.
    pub fn history_text(&self) -> String {
        if self.history.is_empty() {
            return "History is empty.".to_string();
        }

        let mut lines = vec!["History:".to_string()];
        lines.extend(self.history.recent().iter().map(|e| format!("  {}", e)));
        lines.join("\n")
    }

    /// Run one command. Returns `None` for `quit`.
    pub fn execute(&mut self, command: Command) -> Option<Status> {
        debug!("Executing {:?}", command);

        let status = match command {
            Command::Calculate => Status::info(self.calculate().1.summary),
            Command::ClearHistory => self.clear_history(),
            Command::Export(path) => self.export(path),
            Command::ShowHistory => Status::info(self.history_text()),
            Command::SetPrefix(prefix) => {
                self.set_prefix(prefix);
                Status::info(format!("Prefix set to '{}'", self.prefix))
            }
            Command::SetOperation(operation) => {
                self.set_operation(operation);
                Status::info(format!(
                    "Operation set to '{}' ({})",
                    operation,
                    operation.description()
                ))
            }
            Command::SetDecimalStyle(style) => {
                self.set_decimal_style(style);
                Status::info(format!("Decimal separator: {}", style))
            }
            Command::UseEntity(name) => self.use_entity(&name),
            Command::ListOperations => Status::info(operations_text()),
            Command::Help => Status::info(HELP),
            Command::Quit => return None,
        };

        Some(status)
    }

    /// Read commands from `input` until end of input or `quit`.
    pub fn run<R: BufRead, W: Write>(&mut self, input: R, mut output: W) -> io::Result<()> {
        for line in input.lines() {
            let line = line?;
            let status = match Command::parse(&line) {
                Ok(Some(command)) => match self.execute(command) {
                    Some(status) => status,
                    None => break,
                },
                Ok(None) => continue,
                Err(e) => Status::error(e.to_string()),
            };
            writeln!(output, "{}", status)?;
        }

        output.flush()
    }
}

fn operations_text() -> String {
    Operation::ALL
        .iter()
        .map(|op| format!("  {:<9} {:<14} {}", op.code(), op.name(), op.description()))
        .collect::<Vec<_>>()
        .join("\n")
}
