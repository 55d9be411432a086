//! Podar: neural network pruning strategies in pure Rust.
//!
//! Podar turns a trained model into a sparser one by zeroing the weights
//! that matter least. Importance is estimated from weight magnitudes,
//! gradients, or calibration activations; thresholds are computed globally
//! or per layer; masks zero elements or whole output channels.
//!
//! # Quick Start
//!
//! ```
//! use podar::prelude::*;
//!
//! // A two-layer model with hand-set weights
//! let mut model = Sequential::new()
//!     .add(Linear::new(2, 2).with_weight(Tensor::new(&[0.1, 0.2, 0.3, 0.4], &[2, 2])))
//!     .add(Linear::new(2, 2).with_weight(Tensor::new(&[1.0, 2.0, 3.0, 4.0], &[2, 2])));
//!
//! // Prune half the weights, one magnitude threshold per layer
//! let report = prune_builtin(&mut model, "LayerMagWeight", 0.5).unwrap();
//! assert_eq!(report.parameters_pruned, 4);
//!
//! // The seven built-in strategies, order-stable
//! assert_eq!(list_pruning_strategies().len(), 7);
//! ```
//!
//! # Modules
//!
//! - [`tensor`]: flat `f32` tensor with shape and optional gradient
//! - [`nn`]: the `Module` trait plus `Linear` and `Sequential`
//! - [`pruning`]: scoring, thresholds, masks, strategies, registry, pruner
//!
//! # Concurrency
//!
//! Everything is single-threaded and synchronous. The only mutation is the
//! final in-place zeroing of parameters; callers must not share a model with
//! other writers during `prune`.

pub mod nn;
pub mod prelude;
pub mod pruning;
pub mod tensor;
