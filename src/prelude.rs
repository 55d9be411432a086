//! Convenience re-exports for common usage.
//!
//! # Usage
//!
//! ```
//! use podar::prelude::*;
//! ```

pub use crate::nn::{Linear, Module, Sequential};
pub use crate::pruning::{
    list_pruning_strategies, prune, prune_builtin, CalibrationContext, Granularity,
    ImportanceKind, MagnitudePruning, Mask, ModelMasks, PruningError, PruningReport, PruningScope,
    RandomPruning, Strategy, StrategyRegistry,
};
pub use crate::tensor::Tensor;
