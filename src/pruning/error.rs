//! Pruning-specific error types.
//!
//! Each variant carries enough context to diagnose the failure without a
//! debugger: the offending value, the parameter or layer name, the shapes
//! involved.

use std::fmt;

/// Pruning operation errors with detailed context.
#[derive(Debug, Clone, PartialEq)]
pub enum PruningError {
    /// Strategy name not present in the registry.
    UnknownStrategy {
        /// Requested strategy name
        name: String,
    },

    /// Compression fraction outside `[0.0, 1.0]`.
    InvalidCompression {
        /// Provided value
        value: f32,
        /// Constraint description
        constraint: String,
    },

    /// Gradient required by a strategy variant but not populated.
    ///
    /// Gradient-based scoring needs the caller to have run a backward pass
    /// first; the absence is surfaced rather than silently treated as zero.
    MissingGradient {
        /// Parameter name lacking a gradient
        parameter: String,
    },

    /// Calibration context has no activation statistics for a layer.
    MissingActivationStats {
        /// Layer name that's missing stats
        layer: String,
    },

    /// Calibration data required but no context was provided at all.
    CalibrationRequired {
        /// Method requiring calibration
        method: String,
    },

    /// Threshold selection over an empty score collection.
    EmptyScores {
        /// Where the empty input came from
        context: String,
    },

    /// Mask and parameter tensor shapes don't align.
    ShapeMismatch {
        /// Expected shape
        expected: Vec<usize>,
        /// Actual shape found
        got: Vec<usize>,
    },

    /// Model has no prunable parameters.
    NoParameters {
        /// Module identifier or description
        module: String,
    },

    /// Numerical instability detected (NaN/Inf in weights or scores).
    NumericalInstability {
        /// Method that detected the instability
        method: String,
        /// Detailed description of what was detected
        details: String,
    },
}

impl fmt::Display for PruningError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PruningError::UnknownStrategy { name } => {
                write!(f, "Unknown pruning strategy '{name}'")
            }
            PruningError::InvalidCompression { value, constraint } => {
                write!(f, "Invalid compression fraction {value}: {constraint}")
            }
            PruningError::MissingGradient { parameter } => {
                write!(
                    f,
                    "Parameter '{parameter}' has no gradient; run a backward pass before gradient-based pruning"
                )
            }
            PruningError::MissingActivationStats { layer } => {
                write!(f, "Missing activation statistics for layer '{layer}'")
            }
            PruningError::CalibrationRequired { method } => {
                write!(
                    f,
                    "Method '{method}' requires calibration data but none was provided"
                )
            }
            PruningError::EmptyScores { context } => {
                write!(f, "Empty score collection: {context}")
            }
            PruningError::ShapeMismatch { expected, got } => {
                write!(f, "Shape mismatch: expected {expected:?}, got {got:?}")
            }
            PruningError::NoParameters { module } => {
                write!(f, "Module '{module}' has no prunable parameters")
            }
            PruningError::NumericalInstability { method, details } => {
                write!(f, "Numerical instability in {method}: {details}")
            }
        }
    }
}

impl std::error::Error for PruningError {}

/// Convenience alias for pruning results.
pub type Result<T> = std::result::Result<T, PruningError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_strategy_names_the_strategy() {
        let err = PruningError::UnknownStrategy {
            name: "MagicPruning".to_string(),
        };
        assert!(err.to_string().contains("MagicPruning"));
    }

    #[test]
    fn test_invalid_compression_shows_value_and_constraint() {
        let err = PruningError::InvalidCompression {
            value: 1.5,
            constraint: "must be between 0.0 and 1.0".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("1.5"));
        assert!(msg.contains("0.0") && msg.contains("1.0"));
    }

    #[test]
    fn test_missing_gradient_mentions_backward_pass() {
        let err = PruningError::MissingGradient {
            parameter: "0.weight".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("0.weight"));
        assert!(msg.contains("backward"));
    }

    #[test]
    fn test_missing_activation_stats_names_layer() {
        let err = PruningError::MissingActivationStats {
            layer: "encoder.0".to_string(),
        };
        assert!(err.to_string().contains("encoder.0"));
    }

    #[test]
    fn test_shape_mismatch_shows_both_shapes() {
        let err = PruningError::ShapeMismatch {
            expected: vec![512, 256],
            got: vec![256, 512],
        };
        let msg = err.to_string();
        assert!(msg.contains("512") && msg.contains("256"));
    }

    #[test]
    fn test_error_implements_std_error() {
        fn assert_error<T: std::error::Error>() {}
        assert_error::<PruningError>();
    }

    #[test]
    fn test_error_is_clone_and_eq() {
        let err = PruningError::EmptyScores {
            context: "threshold selection".to_string(),
        };
        assert_eq!(err.clone(), err);
    }
}
