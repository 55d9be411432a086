//! Sparsity masks: which weights survive pruning.
//!
//! A mask is boolean per element (`true` = keep) and carries the shape of
//! the parameter it was built for, so shape compatibility is checked before
//! any weight is touched.

use std::collections::BTreeMap;

use super::error::{PruningError, Result};
use super::threshold::{fraction_threshold, validate_fraction};
use crate::tensor::Tensor;

/// Masks for a whole model, keyed by parameter name.
///
/// `BTreeMap` keeps iteration deterministic, which keeps reports and tests
/// stable.
pub type ModelMasks = BTreeMap<String, Mask>;

/// Boolean keep/prune mask for one parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct Mask {
    keep: Vec<bool>,
    shape: Vec<usize>,
}

impl Mask {
    /// Create a mask from explicit keep flags.
    ///
    /// # Errors
    /// [`PruningError::ShapeMismatch`] if the flag count doesn't match the
    /// shape's element count.
    pub fn new(keep: Vec<bool>, shape: &[usize]) -> Result<Self> {
        let expected: usize = shape.iter().product();
        if keep.len() != expected {
            return Err(PruningError::ShapeMismatch {
                expected: shape.to_vec(),
                got: vec![keep.len()],
            });
        }
        Ok(Self {
            keep,
            shape: shape.to_vec(),
        })
    }

    /// Build an elementwise mask: keep where `score > threshold`.
    ///
    /// Ties at the threshold are pruned together, so the achieved fraction
    /// matches the target exactly only for unique score distributions.
    ///
    /// # Errors
    /// [`PruningError::ShapeMismatch`] if scores don't cover the shape.
    pub fn from_scores(scores: &[f32], shape: &[usize], threshold: f32) -> Result<Self> {
        Self::new(scores.iter().map(|&s| s > threshold).collect(), shape)
    }

    /// All-keep (dense) mask.
    #[must_use]
    pub fn dense(shape: &[usize]) -> Self {
        let len: usize = shape.iter().product();
        Self {
            keep: vec![true; len],
            shape: shape.to_vec(),
        }
    }

    /// The shape this mask was built for.
    #[must_use]
    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    /// Keep flags, one per element.
    #[must_use]
    pub fn keep(&self) -> &[bool] {
        &self.keep
    }

    /// Fraction of pruned elements (0.0 = dense, 1.0 = all pruned).
    #[must_use]
    pub fn sparsity(&self) -> f32 {
        if self.keep.is_empty() {
            return 0.0;
        }
        self.num_pruned() as f32 / self.keep.len() as f32
    }

    /// Number of kept elements.
    #[must_use]
    pub fn num_kept(&self) -> usize {
        self.keep.iter().filter(|&&k| k).count()
    }

    /// Number of pruned elements.
    #[must_use]
    pub fn num_pruned(&self) -> usize {
        self.keep.len() - self.num_kept()
    }

    /// Check this mask against a parameter without mutating it.
    ///
    /// # Errors
    /// [`PruningError::ShapeMismatch`] if shapes differ.
    pub fn validate(&self, tensor: &Tensor) -> Result<()> {
        if tensor.shape() != self.shape.as_slice() {
            return Err(PruningError::ShapeMismatch {
                expected: self.shape.clone(),
                got: tensor.shape().to_vec(),
            });
        }
        Ok(())
    }

    /// Zero pruned elements in place.
    ///
    /// # Errors
    /// [`PruningError::ShapeMismatch`] if shapes differ.
    pub fn apply(&self, tensor: &mut Tensor) -> Result<()> {
        self.validate(tensor)?;
        for (w, &k) in tensor.data_mut().iter_mut().zip(&self.keep) {
            if !k {
                *w = 0.0;
            }
        }
        Ok(())
    }
}

/// Aggregate elementwise scores into one score per output channel.
///
/// The first axis is the channel axis; each channel's score is the L2 norm
/// of its score slice, so a channel with a few large weights outranks one
/// with many small ones.
///
/// # Errors
/// [`PruningError::ShapeMismatch`] if the tensor has fewer than two
/// dimensions or scores don't cover the shape;
/// [`PruningError::EmptyScores`] if any dimension is zero.
pub fn channel_scores(scores: &[f32], shape: &[usize]) -> Result<Vec<f32>> {
    if shape.len() < 2 {
        return Err(PruningError::ShapeMismatch {
            expected: vec![0, 0],
            got: shape.to_vec(),
        });
    }
    if shape.contains(&0) {
        return Err(PruningError::EmptyScores {
            context: format!("channel aggregation over degenerate shape {shape:?}"),
        });
    }
    let numel: usize = shape.iter().product();
    if scores.len() != numel {
        return Err(PruningError::ShapeMismatch {
            expected: shape.to_vec(),
            got: vec![scores.len()],
        });
    }

    let channels = shape[0];
    let row_len = numel / channels;
    Ok(scores
        .chunks(row_len)
        .map(|row| row.iter().map(|s| s * s).sum::<f32>().sqrt())
        .collect())
}

/// Expand per-channel keep decisions into an elementwise mask.
///
/// Every element of a channel shares that channel's fate, so channels are
/// kept or pruned atomically.
///
/// # Errors
/// [`PruningError::ShapeMismatch`] if the decision count doesn't match the
/// channel count; [`PruningError::EmptyScores`] if any dimension is zero.
pub fn expand_channel_mask(channel_keep: &[bool], shape: &[usize]) -> Result<Mask> {
    if shape.contains(&0) {
        return Err(PruningError::EmptyScores {
            context: format!("channel expansion over degenerate shape {shape:?}"),
        });
    }
    if shape.is_empty() || channel_keep.len() != shape[0] {
        return Err(PruningError::ShapeMismatch {
            expected: vec![shape.first().copied().unwrap_or(0)],
            got: vec![channel_keep.len()],
        });
    }
    let numel: usize = shape.iter().product();
    let row_len = numel / shape[0];
    let keep: Vec<bool> = channel_keep
        .iter()
        .flat_map(|&k| std::iter::repeat(k).take(row_len))
        .collect();
    Mask::new(keep, shape)
}

/// Build a channel mask for one parameter with its own local threshold.
///
/// Aggregates scores per output channel, thresholds the channel scores at
/// `fraction`, and expands back to element granularity.
///
/// # Errors
/// Propagates validation errors from aggregation and threshold selection.
pub fn channel_mask(scores: &[f32], shape: &[usize], fraction: f32) -> Result<Mask> {
    validate_fraction(fraction)?;
    let ch_scores = channel_scores(scores, shape)?;
    let threshold = fraction_threshold(&ch_scores, fraction)?;
    let keep: Vec<bool> = ch_scores.iter().map(|&s| s > threshold).collect();
    expand_channel_mask(&keep, shape)
}
