use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by the translation adapter and its engines
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BridgeError {
    /// Failure reported by the underlying engine while translating
    #[error("Engine error: {0}")]
    Engine(String),

    /// The engine could not construct a translator for the model
    #[error("Failed to load model at {}: {message}", path.display())]
    ModelLoad { path: PathBuf, message: String },

    /// Unknown device selector
    #[error("Invalid device: {0}")]
    InvalidDevice(String),

    /// An option value the engine cannot accept
    #[error("Invalid option: {0}")]
    InvalidOption(String),

    /// The engine returned a different number of results than it was given inputs
    #[error("Engine returned {actual} results for a batch of {expected}")]
    BatchSizeMismatch { expected: usize, actual: usize },

    /// A translation result carried no hypothesis at all
    #[error("Translation result at index {index} has no hypothesis")]
    MissingHypothesis { index: usize },
}

/// Result type for adapter operations
pub type BridgeResult<T> = Result<T, BridgeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_batch_mismatch() {
        let err = BridgeError::BatchSizeMismatch {
            expected: 3,
            actual: 2,
        };
        assert_eq!(
            err.to_string(),
            "Engine returned 2 results for a batch of 3"
        );
    }

    #[test]
    fn test_display_model_load_includes_path() {
        let err = BridgeError::ModelLoad {
            path: PathBuf::from("/models/m2m"),
            message: "no model.bin".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("/models/m2m"));
        assert!(msg.contains("no model.bin"));
    }
}
