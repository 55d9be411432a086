//! Importance scoring: how much does each weight matter?
//!
//! Scoring is a pure function from a parameter tensor (plus optional
//! gradient or activation statistics) to a non-negative score per element.
//! Missing preconditions are surfaced as errors, never silently defaulted:
//! a gradient-based score without a gradient is a caller bug worth stopping
//! for.

use serde::{Deserialize, Serialize};

use super::calibration::CalibrationContext;
use super::error::{PruningError, Result};
use crate::tensor::Tensor;

/// Importance scoring variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ImportanceKind {
    /// Absolute weight value: `|w|`.
    Magnitude,

    /// Elementwise product of weight and gradient magnitudes: `|w| * |g|`.
    ///
    /// Requires the tensor's gradient to be populated.
    MagnitudeGradient,

    /// Weight magnitude scaled by input activation norm:
    /// `|w[i,j]| * sqrt(norm[j])`.
    ///
    /// Requires calibration statistics for the parameter's layer.
    MagnitudeActivation,
}

/// Derive the calibration layer key from a parameter name.
///
/// `"0.weight"` maps to layer `"0"`; names without a `.weight` suffix map
/// to themselves.
#[must_use]
pub fn layer_key(parameter: &str) -> &str {
    parameter.strip_suffix(".weight").unwrap_or(parameter)
}

/// Compute per-element importance scores for one parameter.
///
/// # Arguments
/// * `parameter` - Parameter name (used for error context and calibration lookup)
/// * `tensor` - The parameter tensor
/// * `kind` - Scoring variant
/// * `ctx` - Calibration context, required for [`ImportanceKind::MagnitudeActivation`]
///
/// # Returns
/// Scores with the same length as the tensor, all non-negative.
///
/// # Errors
/// * [`PruningError::MissingGradient`] - gradient variant without a gradient
/// * [`PruningError::CalibrationRequired`] - activation variant without a context
/// * [`PruningError::MissingActivationStats`] - context lacks this layer
/// * [`PruningError::ShapeMismatch`] - activation variant on a tensor with
///   fewer than two dimensions, or stats of the wrong length
/// * [`PruningError::EmptyScores`] - activation variant on a tensor with a
///   zero dimension
/// * [`PruningError::NumericalInstability`] - NaN or Inf in weights or gradients
pub fn score(
    parameter: &str,
    tensor: &Tensor,
    kind: ImportanceKind,
    ctx: Option<&CalibrationContext>,
) -> Result<Vec<f32>> {
    check_finite("importance", parameter, tensor.data())?;

    match kind {
        ImportanceKind::Magnitude => Ok(tensor.data().iter().map(|w| w.abs()).collect()),

        ImportanceKind::MagnitudeGradient => {
            let grad = tensor
                .grad()
                .ok_or_else(|| PruningError::MissingGradient {
                    parameter: parameter.to_string(),
                })?;
            check_finite("importance (gradient)", parameter, grad.data())?;
            Ok(tensor
                .data()
                .iter()
                .zip(grad.data())
                .map(|(w, g)| w.abs() * g.abs())
                .collect())
        }

        ImportanceKind::MagnitudeActivation => {
            let ctx = ctx.ok_or_else(|| PruningError::CalibrationRequired {
                method: "MagnitudeActivation".to_string(),
            })?;
            let layer = layer_key(parameter);
            let stats =
                ctx.get(layer)
                    .ok_or_else(|| PruningError::MissingActivationStats {
                        layer: layer.to_string(),
                    })?;

            if tensor.ndim() < 2 {
                return Err(PruningError::ShapeMismatch {
                    expected: vec![0, 0],
                    got: tensor.shape().to_vec(),
                });
            }
            if tensor.numel() == 0 {
                return Err(PruningError::EmptyScores {
                    context: format!(
                        "activation scoring of '{parameter}' with degenerate shape {:?}",
                        tensor.shape()
                    ),
                });
            }
            // Treat the tensor as [out, rest]; stats cover the flattened rest.
            let row_len = tensor.numel() / tensor.shape()[0];
            let norms = stats.norms();
            if norms.len() != row_len {
                return Err(PruningError::ShapeMismatch {
                    expected: vec![row_len],
                    got: vec![norms.len()],
                });
            }

            Ok(tensor
                .data()
                .iter()
                .enumerate()
                .map(|(idx, w)| w.abs() * norms[idx % row_len].sqrt())
                .collect())
        }
    }
}

fn check_finite(method: &str, parameter: &str, data: &[f32]) -> Result<()> {
    for (i, &v) in data.iter().enumerate() {
        if v.is_nan() {
            return Err(PruningError::NumericalInstability {
                method: method.to_string(),
                details: format!("NaN in '{parameter}' at index {i}"),
            });
        }
        if v.is_infinite() {
            return Err(PruningError::NumericalInstability {
                method: method.to_string(),
                details: format!("Inf in '{parameter}' at index {i}"),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pruning::calibration::ActivationStats;

    #[test]
    fn test_magnitude_is_absolute_value() {
        let t = Tensor::new(&[-2.0, 0.0, 3.0], &[3]);
        let scores = score("w", &t, ImportanceKind::Magnitude, None).unwrap();
        assert_eq!(scores, vec![2.0, 0.0, 3.0]);
    }

    #[test]
    fn test_magnitude_gradient_is_product_of_magnitudes() {
        let mut t = Tensor::new(&[-2.0, 3.0], &[2]);
        t.set_grad(Tensor::new(&[0.5, -1.0], &[2]));

        let scores = score("w", &t, ImportanceKind::MagnitudeGradient, None).unwrap();
        assert_eq!(scores, vec![1.0, 3.0]);
    }

    #[test]
    fn test_magnitude_gradient_without_grad_errors() {
        let t = Tensor::new(&[1.0, 2.0], &[2]);
        let err = score("0.weight", &t, ImportanceKind::MagnitudeGradient, None).unwrap_err();
        assert_eq!(
            err,
            PruningError::MissingGradient {
                parameter: "0.weight".to_string()
            }
        );
    }

    #[test]
    fn test_activation_requires_context() {
        let t = Tensor::new(&[1.0, 2.0, 3.0, 4.0], &[2, 2]);
        let err = score("0.weight", &t, ImportanceKind::MagnitudeActivation, None).unwrap_err();
        assert!(matches!(err, PruningError::CalibrationRequired { .. }));
    }

    #[test]
    fn test_activation_missing_layer_stats_errors() {
        let t = Tensor::new(&[1.0, 2.0, 3.0, 4.0], &[2, 2]);
        let ctx = CalibrationContext::new();
        let err =
            score("0.weight", &t, ImportanceKind::MagnitudeActivation, Some(&ctx)).unwrap_err();
        assert_eq!(
            err,
            PruningError::MissingActivationStats {
                layer: "0".to_string()
            }
        );
    }

    #[test]
    fn test_activation_scales_by_input_norm() {
        // weight [2, 2]; activation norms [4.0, 1.0] -> sqrt = [2.0, 1.0]
        let t = Tensor::new(&[1.0, 1.0, -2.0, 2.0], &[2, 2]);
        let mut stats = ActivationStats::new(2);
        stats.record(&[4.0, 1.0]);
        let mut ctx = CalibrationContext::new();
        ctx.insert("fc", stats);

        let scores =
            score("fc.weight", &t, ImportanceKind::MagnitudeActivation, Some(&ctx)).unwrap();
        // norms() = [4, 1], sqrt -> [2, 1]
        assert_eq!(scores, vec![2.0, 1.0, 4.0, 2.0]);
    }

    #[test]
    fn test_activation_stats_length_mismatch_errors() {
        let t = Tensor::new(&[1.0, 2.0, 3.0, 4.0], &[2, 2]);
        let mut ctx = CalibrationContext::new();
        ctx.insert("fc", ActivationStats::new(3));

        let err =
            score("fc.weight", &t, ImportanceKind::MagnitudeActivation, Some(&ctx)).unwrap_err();
        assert!(matches!(err, PruningError::ShapeMismatch { .. }));
    }

    #[test]
    fn test_activation_on_zero_dim_tensor_errors() {
        let t = Tensor::zeros(&[0, 3]);
        let mut ctx = CalibrationContext::new();
        ctx.insert("fc", ActivationStats::new(3));

        let err =
            score("fc.weight", &t, ImportanceKind::MagnitudeActivation, Some(&ctx)).unwrap_err();
        assert!(matches!(err, PruningError::EmptyScores { .. }));
    }

    #[test]
    fn test_nan_weight_is_rejected() {
        let t = Tensor::new(&[1.0, f32::NAN], &[2]);
        let err = score("w", &t, ImportanceKind::Magnitude, None).unwrap_err();
        assert!(matches!(err, PruningError::NumericalInstability { .. }));
    }

    #[test]
    fn test_inf_gradient_is_rejected() {
        let mut t = Tensor::new(&[1.0, 2.0], &[2]);
        t.set_grad(Tensor::new(&[f32::INFINITY, 0.0], &[2]));
        let err = score("w", &t, ImportanceKind::MagnitudeGradient, None).unwrap_err();
        assert!(matches!(err, PruningError::NumericalInstability { .. }));
    }

    #[test]
    fn test_layer_key_strips_weight_suffix() {
        assert_eq!(layer_key("0.weight"), "0");
        assert_eq!(layer_key("encoder.fc.weight"), "encoder.fc");
        assert_eq!(layer_key("embedding"), "embedding");
    }
}
