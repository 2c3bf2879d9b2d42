//! Terminal classification of a parse and the user-facing error taxonomy.

use thiserror::Error;

/// A problem in what the user typed. One parse carries at most one of
/// these: the first failure wins and every later declaration degrades to a
/// no-op, so a run surfaces exactly one problem.
///
/// Programmer errors (an option declared without a name, a scalar argument
/// after an argument list) are not represented here; those panic at the
/// offending declaration call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UserError {
    #[error("Option {token} is unknown.")]
    UnknownOption { token: String },

    #[error("Unknown command '{token}'. Did you mean '{suggestion}'?")]
    UnknownCommand { token: String, suggestion: String },

    #[error("Option {name} is not specified.")]
    OptionMissing { name: String },

    #[error("Argument {name} is not specified.")]
    ArgumentMissing { name: String },

    #[error("Option {name} value expected.")]
    ValueExpected { name: String },

    #[error("Option {name} can't be parsed.")]
    OptionValueInvalid { name: String },

    #[error("Argument {name} can't be parsed.")]
    ArgumentValueInvalid { name: String },

    #[error("{message}")]
    CheckFailed { message: String },
}

/// What a completed parse amounted to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Every declaration at the top level resolved and no subcommand
    /// matched; the top level owns the parse.
    Success,
    /// A nested command matched and its level resolved instead.
    HandledByChild,
    /// A `-h`/`--help` token was seen; nothing was extracted.
    HelpRequested,
    /// The first user-input failure encountered.
    Error(UserError),
}

impl Outcome {
    /// True for [`Outcome::Success`] and [`Outcome::HandledByChild`].
    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success | Outcome::HandledByChild)
    }

    pub fn error(&self) -> Option<&UserError> {
        match self {
            Outcome::Error(error) => Some(error),
            _ => None,
        }
    }

    /// Conventional process exit code for this outcome. Applying it is the
    /// caller's job; the engine never exits.
    pub fn exit_code(&self) -> i32 {
        match self {
            Outcome::Error(_) => 1,
            _ => 0,
        }
    }
}
