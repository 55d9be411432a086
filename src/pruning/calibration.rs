//! Activation statistics collected from calibration data.
//!
//! Activation-based importance scoring needs per-input-position L2 norms
//! collected during forward passes over a calibration set. The context is
//! populated by the caller's inference loop and handed to `prune` read-only.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Accumulated activation statistics for one layer.
///
/// Tracks the running sum of squared activations per flattened input
/// position. `norms()` yields the L2 norm over all recorded samples,
/// which is the statistic activation-weighted scoring consumes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivationStats {
    /// Sum of squared activation values per input position
    sum_squares: Vec<f32>,
    /// Number of samples recorded
    samples: usize,
}

impl ActivationStats {
    /// Create empty statistics for `features` input positions.
    #[must_use]
    pub fn new(features: usize) -> Self {
        Self {
            sum_squares: vec![0.0; features],
            samples: 0,
        }
    }

    /// Record one activation row (one sample's input to the layer).
    ///
    /// # Panics
    ///
    /// Panics if the row length doesn't match the configured feature count.
    pub fn record(&mut self, activation: &[f32]) {
        assert_eq!(
            activation.len(),
            self.sum_squares.len(),
            "Activation length {} doesn't match feature count {}",
            activation.len(),
            self.sum_squares.len()
        );
        for (acc, &a) in self.sum_squares.iter_mut().zip(activation) {
            *acc += a * a;
        }
        self.samples += 1;
    }

    /// L2 norm per input position over all recorded samples.
    #[must_use]
    pub fn norms(&self) -> Vec<f32> {
        self.sum_squares.iter().map(|&s| s.sqrt()).collect()
    }

    /// Number of input positions tracked.
    #[must_use]
    pub fn features(&self) -> usize {
        self.sum_squares.len()
    }

    /// Number of samples recorded so far.
    #[must_use]
    pub fn samples(&self) -> usize {
        self.samples
    }
}

/// Per-layer activation statistics keyed by layer name.
///
/// Layer names follow parameter naming minus the `.weight` suffix: the
/// stats for parameter `"0.weight"` live under key `"0"`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CalibrationContext {
    stats: HashMap<String, ActivationStats>,
}

impl CalibrationContext {
    /// Create an empty context.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert statistics for a layer, replacing any existing entry.
    pub fn insert(&mut self, layer: impl Into<String>, stats: ActivationStats) {
        self.stats.insert(layer.into(), stats);
    }

    /// Record one activation row for a layer, creating stats on first use.
    pub fn record(&mut self, layer: impl Into<String>, activation: &[f32]) {
        self.stats
            .entry(layer.into())
            .or_insert_with(|| ActivationStats::new(activation.len()))
            .record(activation);
    }

    /// Look up statistics for a layer.
    #[must_use]
    pub fn get(&self, layer: &str) -> Option<&ActivationStats> {
        self.stats.get(layer)
    }

    /// Whether statistics exist for a layer.
    #[must_use]
    pub fn contains(&self, layer: &str) -> bool {
        self.stats.contains_key(layer)
    }

    /// Number of layers with statistics.
    #[must_use]
    pub fn len(&self) -> usize {
        self.stats.len()
    }

    /// Whether the context is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.stats.is_empty()
    }
}
