//! The `Module` trait: the model abstraction pruning operates on.

use crate::tensor::Tensor;

/// Interface for neural network modules.
///
/// A module owns named parameter tensors and can run a forward pass.
/// Parameter names are stable across calls and unique within a module;
/// containers prefix child names (`"0.weight"`, `"1.bias"`, ...).
///
/// # Object Safety
/// This trait is object-safe and can be used as `dyn Module`.
pub trait Module {
    /// Run a forward pass.
    fn forward(&self, input: &Tensor) -> Tensor;

    /// All parameters with their names, in declaration order.
    fn named_parameters(&self) -> Vec<(String, &Tensor)>;

    /// All parameters with their names, mutably.
    ///
    /// Same names and order as [`Module::named_parameters`].
    fn named_parameters_mut(&mut self) -> Vec<(String, &mut Tensor)>;
}
