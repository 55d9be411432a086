//! Pruning orchestrator: resolve a strategy, build masks, apply them.
//!
//! Mask application is transactional: every mask is validated against its
//! parameter before any weight is zeroed, so a failed prune leaves the model
//! exactly as it was. The in-place mutation itself must not race other
//! readers or writers of the same model; that is the caller's responsibility,
//! there is no internal locking.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::calibration::CalibrationContext;
use super::error::{PruningError, Result};
use super::registry::StrategyRegistry;
use super::threshold::validate_fraction;
use crate::nn::Module;

/// Result of a pruning operation with diagnostics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PruningReport {
    /// Strategy that produced the masks.
    pub strategy: String,
    /// Requested compression fraction.
    pub compression: f32,
    /// Achieved sparsity over all prunable parameters.
    pub achieved_sparsity: f32,
    /// Number of weights zeroed.
    pub parameters_pruned: usize,
    /// Total prunable weights considered.
    pub total_parameters: usize,
    /// Per-parameter sparsity breakdown.
    pub layer_sparsity: BTreeMap<String, f32>,
}

impl PruningReport {
    /// Compression ratio (original / remaining size).
    #[must_use]
    pub fn compression_ratio(&self) -> f32 {
        if self.total_parameters == 0 || self.achieved_sparsity >= 1.0 {
            return f32::INFINITY;
        }
        1.0 / (1.0 - self.achieved_sparsity)
    }
}

/// Prune a model in place with a named strategy from a registry.
///
/// # Arguments
/// * `module` - Model to prune (mutated in place on success)
/// * `registry` - Strategy registry to resolve `strategy` in
/// * `strategy` - Strategy name
/// * `compression` - Target fraction of weights to prune, in `[0.0, 1.0]`
/// * `ctx` - Calibration context for activation-based strategies
///
/// # Errors
/// * [`PruningError::InvalidCompression`] - before any other work
/// * [`PruningError::UnknownStrategy`] - name not registered, no mutation
/// * [`PruningError::ShapeMismatch`] - a mask doesn't fit its parameter;
///   detected in a pre-validation pass, no mutation
/// * plus any scoring precondition failure from the strategy
pub fn prune(
    module: &mut dyn Module,
    registry: &StrategyRegistry,
    strategy: &str,
    compression: f32,
    ctx: Option<&CalibrationContext>,
) -> Result<PruningReport> {
    validate_fraction(compression)?;
    let resolved = registry.lookup(strategy)?;
    let masks = resolved.model_masks(&*module, compression, ctx)?;

    // Pre-validation: check every mask against its parameter before
    // touching any weight.
    {
        let params = module.named_parameters();
        for (name, mask) in &masks {
            let tensor = params
                .iter()
                .find(|(n, _)| n == name)
                .map(|(_, t)| *t)
                .ok_or_else(|| PruningError::NoParameters {
                    module: name.clone(),
                })?;
            mask.validate(tensor)?;
        }
    }

    let mut parameters_pruned = 0;
    let mut total_parameters = 0;
    let mut layer_sparsity = BTreeMap::new();
    for (name, tensor) in module.named_parameters_mut() {
        if let Some(mask) = masks.get(&name) {
            mask.apply(tensor)?;
            parameters_pruned += mask.num_pruned();
            total_parameters += mask.keep().len();
            layer_sparsity.insert(name, mask.sparsity());
        }
    }

    let achieved_sparsity = if total_parameters == 0 {
        0.0
    } else {
        parameters_pruned as f32 / total_parameters as f32
    };

    Ok(PruningReport {
        strategy: strategy.to_string(),
        compression,
        achieved_sparsity,
        parameters_pruned,
        total_parameters,
        layer_sparsity,
    })
}

/// Prune with the built-in registry and no calibration context.
///
/// Convenience wrapper over [`prune`] for the weight- and gradient-based
/// built-ins.
///
/// # Errors
/// Same as [`prune`].
pub fn prune_builtin(
    module: &mut dyn Module,
    strategy: &str,
    compression: f32,
) -> Result<PruningReport> {
    prune(
        module,
        &StrategyRegistry::builtin(),
        strategy,
        compression,
        None,
    )
}

/// Names of the built-in strategies, in registration order.
#[must_use]
pub fn list_pruning_strategies() -> Vec<String> {
    StrategyRegistry::builtin()
        .names()
        .into_iter()
        .map(String::from)
        .collect()
}
