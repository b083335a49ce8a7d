use thiserror::Error;

/// Errors raised by the placement engine and its providers.
///
/// Both variants are returned synchronously before any work is done; once
/// inputs validate, placement always yields a full result.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum PlacementError {
    /// Facility count, radius, severity, site list or grid shape is unusable.
    #[error("invalid parameters: {0}")]
    InvalidParameters(String),
    /// A demand value is negative, NaN or infinite.
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

pub type PlacementResult<T> = Result<T, PlacementError>;

impl PlacementError {
    pub(crate) fn params(msg: impl Into<String>) -> Self {
        PlacementError::InvalidParameters(msg.into())
    }

    pub(crate) fn input(msg: impl Into<String>) -> Self {
        PlacementError::InvalidInput(msg.into())
    }
}
