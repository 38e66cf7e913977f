use thiserror::Error;

/// Failure of a single weather update attempt. Neither kind is retried.
#[derive(Debug, Error)]
pub enum UpdateError {
    #[error("City not found: {0}")]
    CityNotFound(String),

    #[error("Error fetching weather data: {0:#}")]
    FetchFailed(anyhow::Error),
}

/// A label that does not name any variant of the target enum.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {kind} '{value}', expected one of: {expected}")]
pub struct ParseLabelError {
    pub kind: &'static str,
    pub value: String,
    pub expected: &'static str,
}
