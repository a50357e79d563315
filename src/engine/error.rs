//! Errors surfaced by control operations.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ControlError {
    /// Out-of-range value under the reject policy.
    #[error("{field} = {value} is out of range [{min}, {max}]")]
    OutOfRange {
        field: &'static str,
        value: i64,
        min: i64,
        max: i64,
    },

    /// Body that could not be read as a config update.
    #[error("malformed config update: {0}")]
    Malformed(String),
}
