//! Error taxonomy raised by the parser.
//!
//! Every failure is a [`ParseError`] carrying one [`ErrorKind`]. The first
//! error raised aborts the parse; the caller decides whether to print it and
//! exit (see [`ParseError::exit_code`]) or handle it programmatically.

use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// The kind of failure that stopped a parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ErrorKind {
    /// A value failed allowed-set, validator or regex checks.
    InvalidArgumentValue,
    /// A required argument had no token and no default.
    MissingRequiredArgument,
    /// A required option was not passed and its argument has no default.
    MissingRequiredOption,
    /// A token in subcommand position named no declared subcommand.
    UnknownCommand,
    /// A flag-like token resolved to no flag or option.
    UnknownOption,
    /// A token could not be interpreted in its position.
    UnresolvedArgument,
}

impl ErrorKind {
    /// Process exit code conventionally associated with this kind.
    pub fn exit_code(self) -> i32 {
        match self {
            Self::InvalidArgumentValue => 10,
            Self::MissingRequiredArgument => 20,
            Self::MissingRequiredOption => 30,
            Self::UnknownCommand => 40,
            Self::UnknownOption => 50,
            Self::UnresolvedArgument => 60,
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidArgumentValue => write!(f, "InvalidArgumentValue"),
            Self::MissingRequiredArgument => write!(f, "MissingRequiredArgument"),
            Self::MissingRequiredOption => write!(f, "MissingRequiredOption"),
            Self::UnknownCommand => write!(f, "UnknownCommand"),
            Self::UnknownOption => write!(f, "UnknownOption"),
            Self::UnresolvedArgument => write!(f, "UnresolvedArgument"),
        }
    }
}

/// A fully populated parse failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ParseError {
    kind: ErrorKind,
    message: String,
    context: String,
    args: Vec<String>,
    suggestions: Vec<String>,
}

pub type ParseResult<T> = Result<T, ParseError>;

impl ParseError {
    pub fn new(kind: ErrorKind, message: impl Into<String>, context: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            context: context.into(),
            args: Vec::new(),
            suggestions: Vec::new(),
        }
    }

    /// Attach the offending token(s).
    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Human-readable paragraph explaining the failure.
    pub fn context(&self) -> &str {
        &self.context
    }

    /// The offending tokens, first one being the primary culprit.
    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// Close subcommand names offered for an [`ErrorKind::UnknownCommand`].
    pub fn suggestions(&self) -> &[String] {
        &self.suggestions
    }

    pub fn exit_code(&self) -> i32 {
        self.kind.exit_code()
    }

    // Convenience constructors for each failure site.

    pub(crate) fn missing_argument(display: &str, found: Option<&str>) -> Self {
        let context = match found {
            Some(token) => format!(
                "Expected a value for the argument {display}, but found `{token}` instead"
            ),
            None => format!("Expected a value for the argument {display}, but none was provided"),
        };
        Self::new(
            ErrorKind::MissingRequiredArgument,
            format!("missing required argument: {display}"),
            context,
        )
        .with_args([display])
    }

    pub(crate) fn missing_option(option: &str) -> Self {
        Self::new(
            ErrorKind::MissingRequiredOption,
            format!("missing required option: `{option}`"),
            format!(
                "The option `{option}` is marked as required but was not passed and has no default value"
            ),
        )
        .with_args([option])
    }

    pub(crate) fn invalid_value(value: &str, display: &str, reason: &str) -> Self {
        Self::new(
            ErrorKind::InvalidArgumentValue,
            format!("invalid value `{value}` for argument {display}"),
            reason,
        )
        .with_args([value])
    }

    pub(crate) fn unknown_option(token: &str) -> Self {
        Self::new(
            ErrorKind::UnknownOption,
            format!("found unknown option: `{token}`"),
            format!("The value `{token}` looks like an option but no such flag or option exists"),
        )
        .with_args([token])
    }

    pub(crate) fn unknown_bundled_flag(flag: char, token: &str) -> Self {
        Self::new(
            ErrorKind::UnknownOption,
            format!("found unknown flag: `-{flag}`"),
            format!("The flag `-{flag}` in the bundled flags `{token}` could not be resolved"),
        )
        .with_args([format!("-{flag}"), token.to_string()])
    }

    pub(crate) fn unknown_command(token: &str, suggestions: Vec<String>) -> Self {
        let mut context = format!("The subcommand `{token}` could not be resolved");
        if !suggestions.is_empty() {
            let quoted: Vec<String> = suggestions.iter().map(|s| format!("`{s}`")).collect();
            context.push_str(&format!(", did you mean {}?", quoted.join(" or ")));
        }
        let mut err = Self::new(
            ErrorKind::UnknownCommand,
            format!("no such subcommand found: `{token}`"),
            context,
        )
        .with_args([token]);
        err.suggestions = suggestions;
        err
    }

    pub(crate) fn unresolved(token: &str, context: impl Into<String>) -> Self {
        Self::new(
            ErrorKind::UnresolvedArgument,
            format!("failed to resolve argument: `{token}`"),
            context,
        )
        .with_args([token])
    }
}
