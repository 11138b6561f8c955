use thiserror::Error;

/// Failures that stop a generation run before or between phases.
///
/// Unspent budgets are not errors; they are reported through
/// [`crate::generator::GenerationReport`].
#[derive(Debug, Error, Clone, PartialEq)]
pub enum MapError {
    #[error(
        "invalid map size {width}×{height}: both must be positive multiples of the \
         {chunk_columns}×{chunk_rows} chunk size"
    )]
    InvalidDimensions {
        width: usize,
        height: usize,
        chunk_columns: usize,
        chunk_rows: usize,
    },

    #[error("config field `{field}` = {value} is outside {expected}")]
    InvalidConfig {
        field: &'static str,
        value: String,
        expected: &'static str,
    },

    #[error("generation cancelled before the {phase} phase")]
    Cancelled { phase: &'static str },
}

pub type Result<T> = std::result::Result<T, MapError>;
