//! Error types for `ztmf-core`.
//!
//! These cover view-model construction only. Transport and backend failures
//! live in `ztmf-client`.

/// Errors raised while building or validating core view models.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CoreError {
    /// A date field was empty, malformed, or out of range.
    #[error("{reason}")]
    InvalidDate { reason: String },

    /// Decommission notes exceeded the allowed length.
    #[error("notes are {actual} characters, maximum is {max}")]
    NotesTooLong { max: usize, actual: usize },

    /// A function id is not part of the questionnaire sequence.
    #[error("function {function_id} is not in the questionnaire")]
    UnknownFunction { function_id: i64 },

    /// A form field key does not exist in the field configuration.
    #[error("unknown field '{key}'")]
    UnknownField { key: String },
}
