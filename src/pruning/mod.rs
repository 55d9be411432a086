//! Neural network pruning: importance scoring, thresholds, masks, and
//! in-place weight pruning.
//!
//! # Pipeline
//!
//! The orchestrator resolves a strategy by name in a [`StrategyRegistry`],
//! the strategy scores every prunable parameter, thresholds the scores for
//! the target compression fraction, and builds boolean keep/prune masks;
//! the orchestrator then validates and applies the masks in place.
//!
//! # Example
//!
//! ```
//! use podar::nn::{Linear, Sequential};
//! use podar::pruning::prune_builtin;
//! use podar::tensor::Tensor;
//!
//! let mut model = Sequential::new()
//!     .add(Linear::new(2, 2).with_weight(Tensor::new(&[0.1, 0.2, 0.3, 0.4], &[2, 2])));
//!
//! let report = prune_builtin(&mut model, "LayerMagWeight", 0.5).unwrap();
//! assert_eq!(report.parameters_pruned, 2);
//! ```
//!
//! # References
//! - Han, S., et al. (2015). Learning both weights and connections. NeurIPS.
//! - Sun, M., et al. (2023). A simple and effective pruning approach. arXiv:2306.11695.

mod calibration;
mod error;
mod importance;
mod mask;
mod pruner;
mod registry;
mod strategy;
mod threshold;

pub use calibration::{ActivationStats, CalibrationContext};
pub use error::{PruningError, Result};
pub use importance::{layer_key, score, ImportanceKind};
pub use mask::{channel_mask, channel_scores, expand_channel_mask, Mask, ModelMasks};
pub use pruner::{list_pruning_strategies, prune, prune_builtin, PruningReport};
pub use registry::StrategyRegistry;
pub use strategy::{
    prunable_parameters, Granularity, MagnitudePruning, PruningScope, RandomPruning, Strategy,
};
pub use threshold::{fraction_threshold, validate_fraction};
