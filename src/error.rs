//! Error types.
//!
//! Search-internal failures are never errors: an infeasible branch is a
//! [`Rejection`](crate::matching::Rejection) value that the search simply
//! discards. [`RosterError`] covers the problems a caller has to fix
//! before matching can start.

use thiserror::Error;

use crate::validation::ValidationError;

/// Errors surfaced to the caller of the matcher.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RosterError {
    /// Input data failed validation.
    #[error("invalid roster input: {}", summarize(.0))]
    InvalidInput(Vec<ValidationError>),
    /// Search parameters are invalid.
    #[error(transparent)]
    InvalidConfig(#[from] ConfigError),
}

/// Invalid search parameter or override string.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// A parameter that must be positive was zero.
    #[error("`{0}` must be greater than zero")]
    Zero(&'static str),
    /// Unknown key in an override string.
    #[error("unknown parameter `{0}`")]
    UnknownKey(String),
    /// Value in an override string is not a non-negative integer.
    #[error("invalid value `{value}` for `{key}`")]
    InvalidValue {
        /// Parameter name.
        key: String,
        /// Offending value.
        value: String,
    },
    /// Override token without `=`.
    #[error("expected `key=value`, got `{0}`")]
    Malformed(String),
}

impl From<Vec<ValidationError>> for RosterError {
    fn from(errors: Vec<ValidationError>) -> Self {
        RosterError::InvalidInput(errors)
    }
}

fn summarize(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| e.message.as_str())
        .collect::<Vec<_>>()
        .join("; ")
}
