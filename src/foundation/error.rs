/// Convenience result type used across runpace.
pub type RunpaceResult<T> = Result<T, RunpaceError>;

/// Top-level error taxonomy used by the indicator APIs.
///
/// Most runtime conditions (failed counter reads, missing frame assets, empty frame sets) degrade
/// to a safe state instead of surfacing here. What remains is initialization and configuration
/// failure.
#[derive(thiserror::Error, Debug)]
pub enum RunpaceError {
    /// A CPU counter source could not be opened or read.
    #[error("counter error: {0}")]
    Counter(String),

    /// A frame asset could not be located or decoded.
    #[error("asset error: {0}")]
    Asset(String),

    /// Invalid caller-provided data.
    #[error("validation error: {0}")]
    Validation(String),

    /// Invalid or unreadable settings.
    #[error("configuration error: {0}")]
    Config(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl RunpaceError {
    /// Build a [`RunpaceError::Counter`] value.
    pub fn counter(msg: impl Into<String>) -> Self {
        Self::Counter(msg.into())
    }

    /// Build a [`RunpaceError::Asset`] value.
    pub fn asset(msg: impl Into<String>) -> Self {
        Self::Asset(msg.into())
    }

    /// Build a [`RunpaceError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`RunpaceError::Config`] value.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
