//! Error types for ragcheck
//!
//! Splits failures into the two tiers the diagnostic cares about: missing
//! capabilities (fatal) and everything that can go wrong while fetching or
//! constructing the model (advisory).

use thiserror::Error;

use crate::retrieval::Operation;

/// Main error type for diagnostic checks
#[derive(Error, Debug)]
pub enum CheckError {
    /// A required capability could not be acquired
    #[error("{component} unavailable: {reason}")]
    Capability { component: String, reason: String },

    /// Hub download errors (network, auth, missing files)
    #[error("download failed: {0}")]
    Download(#[from] hf_hub::api::sync::ApiError),

    /// Model construction or tensor errors
    #[error("model error: {0}")]
    Model(#[from] candle_core::Error),

    /// Tokenizer loading errors
    #[error("tokenizer error: {0}")]
    Tokenizer(String),

    /// The loaded handle does not expose an expected operation
    #[error("model handle is missing the `{0}` operation")]
    MissingOperation(Operation),

    /// Ctrl-C received during the model-load phase
    #[error("interrupted by user")]
    Interrupted,

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing errors (safetensors index, model config)
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CheckError {
    pub fn capability(component: impl Into<String>, reason: impl ToString) -> Self {
        Self::Capability {
            component: component.into(),
            reason: reason.to_string(),
        }
    }
}

/// Result type alias for diagnostic operations
pub type Result<T> = std::result::Result<T, CheckError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capability_error_display() {
        let err = CheckError::capability("accelerator runtime", "driver init failed");
        assert!(err.to_string().contains("accelerator runtime"));
        assert!(err.to_string().contains("driver init failed"));
    }

    #[test]
    fn test_missing_operation_display() {
        let err = CheckError::MissingOperation(Operation::Search);
        assert!(err.to_string().contains("search"));
    }

    #[test]
    fn test_interrupted_display() {
        let err = CheckError::Interrupted;
        assert_eq!(err.to_string(), "interrupted by user");
    }
}
