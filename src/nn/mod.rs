//! Minimal neural network modules.
//!
//! This module provides just enough of a model abstraction for pruning:
//! the [`Module`] trait exposes parameters by name, and [`Linear`] /
//! [`Sequential`] give tests and examples something concrete to prune.
//! It is not a training framework; gradients and activations are supplied
//! by the caller.

mod container;
mod linear;
mod module;

pub use container::Sequential;
pub use linear::Linear;
pub use module::Module;
