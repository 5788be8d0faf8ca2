//! Error types. Gesture and transform code never fails; these cover
//! configuration loading and the caller-supplied refresh action.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },

    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
}

impl ConfigError {
    pub fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        ConfigError::Invalid {
            field,
            reason: reason.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum RefreshError {
    #[error("refresh failed: {0}")]
    Failed(String),

    #[error("refresh did not settle within {after_ms} ms")]
    TimedOut { after_ms: u32 },
}

impl From<serde_json::Error> for RefreshError {
    fn from(e: serde_json::Error) -> Self {
        RefreshError::Failed(e.to_string())
    }
}
