//! Threshold selection: the cutoff below which weights are pruned.

use super::error::{PruningError, Result};

/// Compute the score cutoff for a target pruning fraction.
///
/// The `floor(len * fraction)` lowest-scoring elements fall at or below the
/// returned threshold (exactly that many when scores are unique; ties at the
/// threshold are pruned together by the mask builder's strict `>` rule).
///
/// # Arguments
/// * `scores` - Flattened importance scores
/// * `fraction` - Target fraction of elements to prune, in `[0.0, 1.0]`
///
/// # Returns
/// * `NEG_INFINITY` when nothing is to be pruned (every score is above it)
/// * `INFINITY` when everything is to be pruned (no score is above it)
/// * otherwise the `num_prune`-th smallest score
///
/// # Errors
/// * [`PruningError::InvalidCompression`] - fraction outside `[0.0, 1.0]`
/// * [`PruningError::EmptyScores`] - empty input
pub fn fraction_threshold(scores: &[f32], fraction: f32) -> Result<f32> {
    validate_fraction(fraction)?;
    if scores.is_empty() {
        return Err(PruningError::EmptyScores {
            context: "threshold selection".to_string(),
        });
    }

    let num_prune = (scores.len() as f32 * fraction) as usize;
    if num_prune == 0 {
        return Ok(f32::NEG_INFINITY);
    }
    if num_prune >= scores.len() {
        return Ok(f32::INFINITY);
    }

    let mut sorted = scores.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    Ok(sorted[num_prune - 1])
}

/// Validate a compression fraction before any mask work begins.
///
/// # Errors
/// [`PruningError::InvalidCompression`] if outside `[0.0, 1.0]` or not finite.
pub fn validate_fraction(fraction: f32) -> Result<()> {
    if !fraction.is_finite() || !(0.0..=1.0).contains(&fraction) {
        return Err(PruningError::InvalidCompression {
            value: fraction,
            constraint: "must be between 0.0 and 1.0".to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fraction_zero_prunes_nothing() {
        let t = fraction_threshold(&[3.0, 1.0, 2.0], 0.0).unwrap();
        assert_eq!(t, f32::NEG_INFINITY);
    }

    #[test]
    fn test_fraction_one_prunes_everything() {
        let t = fraction_threshold(&[3.0, 1.0, 2.0], 1.0).unwrap();
        assert_eq!(t, f32::INFINITY);
    }

    #[test]
    fn test_half_of_four_unique_scores() {
        // sorted: [1, 2, 3, 4]; num_prune = 2 -> threshold = 2.0
        let t = fraction_threshold(&[3.0, 1.0, 4.0, 2.0], 0.5).unwrap();
        assert_eq!(t, 2.0);
    }

    #[test]
    fn test_rounding_rule_is_floor() {
        // len = 10, fraction = 0.25 -> floor(2.5) = 2 pruned
        let scores: Vec<f32> = (1..=10).map(|i| i as f32).collect();
        let t = fraction_threshold(&scores, 0.25).unwrap();
        assert_eq!(t, 2.0);
        let pruned = scores.iter().filter(|&&s| s <= t).count();
        assert_eq!(pruned, 2);
    }

    #[test]
    fn test_fraction_out_of_range_errors() {
        for bad in [-0.1, 1.1, f32::NAN, f32::INFINITY] {
            let err = fraction_threshold(&[1.0], bad).unwrap_err();
            assert!(matches!(err, PruningError::InvalidCompression { .. }));
        }
    }

    #[test]
    fn test_empty_scores_error() {
        let err = fraction_threshold(&[], 0.5).unwrap_err();
        assert!(matches!(err, PruningError::EmptyScores { .. }));
    }

    #[test]
    fn test_threshold_unaffected_by_input_order() {
        let a = fraction_threshold(&[5.0, 1.0, 3.0, 2.0, 4.0], 0.4).unwrap();
        let b = fraction_threshold(&[1.0, 2.0, 3.0, 4.0, 5.0], 0.4).unwrap();
        assert_eq!(a, b);
        assert_eq!(a, 2.0);
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            /// With unique scores, the strict `> threshold` rule keeps
            /// exactly len - floor(len * f) elements.
            #[test]
            fn pruned_count_is_floor_of_fraction(
                len in 1usize..200,
                frac in 0.0f32..=1.0,
            ) {
                // Unique scores by construction
                let scores: Vec<f32> = (0..len).map(|i| i as f32 + 0.5).collect();
                let t = fraction_threshold(&scores, frac).unwrap();
                let pruned = scores.iter().filter(|&&s| s <= t).count();
                let expected = (len as f32 * frac) as usize;
                prop_assert_eq!(pruned, expected.min(len));
            }
        }
    }
}
