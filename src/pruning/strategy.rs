//! Pruning strategies: a fixed mask-computation contract.
//!
//! A strategy is a stateless recipe (aside from configuration): it names an
//! importance function, a thresholding scope, and a granularity. Collecting
//! parameters, thresholding, and building masks are shared machinery in the
//! trait's provided methods, so adding a strategy means implementing one
//! scoring function, not a subclass hierarchy.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use super::calibration::CalibrationContext;
use super::error::{PruningError, Result};
use super::importance::{score, ImportanceKind};
use super::mask::{channel_mask, channel_scores, expand_channel_mask, Mask, ModelMasks};
use super::threshold::{fraction_threshold, validate_fraction};
use crate::nn::Module;
use crate::tensor::Tensor;

/// Where the threshold is computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PruningScope {
    /// One threshold across all prunable parameters jointly.
    Global,
    /// An independent threshold per parameter tensor, same target fraction.
    Layerwise,
}

/// What the threshold applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Granularity {
    /// Individual weights are kept or pruned.
    Element,
    /// Whole output channels are kept or pruned atomically.
    Channel,
}

/// Collect a module's prunable parameters.
///
/// A parameter is prunable iff it has at least two dimensions: weight
/// matrices are pruned, biases and scalars are left alone.
#[must_use]
pub fn prunable_parameters(module: &dyn Module) -> Vec<(String, &Tensor)> {
    module
        .named_parameters()
        .into_iter()
        .filter(|(_, t)| t.ndim() >= 2)
        .collect()
}

/// Mask-computation contract shared by all strategies.
///
/// # Object Safety
/// This trait is object-safe; registries hold `Box<dyn Strategy>`.
pub trait Strategy: Send + Sync + std::fmt::Debug {
    /// Strategy name as it appears in the registry.
    fn name(&self) -> &str;

    /// Thresholding scope.
    fn scope(&self) -> PruningScope;

    /// Thresholding granularity.
    fn granularity(&self) -> Granularity {
        Granularity::Element
    }

    /// Per-element importance scores for one parameter.
    ///
    /// # Errors
    /// Precondition failures (missing gradient or calibration data) and
    /// numerical instability are surfaced, never defaulted.
    fn importance(
        &self,
        parameter: &str,
        tensor: &Tensor,
        ctx: Option<&CalibrationContext>,
    ) -> Result<Vec<f32>>;

    /// Compute a mask for a single parameter with its own local threshold.
    ///
    /// # Errors
    /// Propagates fraction validation, scoring, and mask construction errors.
    fn layer_masks(
        &self,
        parameter: &str,
        tensor: &Tensor,
        compression: f32,
        ctx: Option<&CalibrationContext>,
    ) -> Result<Mask> {
        validate_fraction(compression)?;
        let scores = self.importance(parameter, tensor, ctx)?;
        match self.granularity() {
            Granularity::Element => {
                let threshold = fraction_threshold(&scores, compression)?;
                Mask::from_scores(&scores, tensor.shape(), threshold)
            }
            Granularity::Channel => channel_mask(&scores, tensor.shape(), compression),
        }
    }

    /// Compute masks for every prunable parameter of a module.
    ///
    /// Global scope pools all scores before thresholding; layerwise scope
    /// thresholds each parameter independently at the same fraction.
    ///
    /// # Errors
    /// * [`PruningError::InvalidCompression`] - fraction outside `[0.0, 1.0]`
    /// * [`PruningError::NoParameters`] - module has no prunable parameters
    /// * plus any scoring precondition failure
    fn model_masks(
        &self,
        module: &dyn Module,
        compression: f32,
        ctx: Option<&CalibrationContext>,
    ) -> Result<ModelMasks> {
        validate_fraction(compression)?;
        let params = prunable_parameters(module);
        if params.is_empty() {
            return Err(PruningError::NoParameters {
                module: "model".to_string(),
            });
        }

        let mut scored: Vec<(String, Vec<usize>, Vec<f32>)> = Vec::with_capacity(params.len());
        for (name, tensor) in &params {
            let scores = self.importance(name, tensor, ctx)?;
            scored.push((name.clone(), tensor.shape().to_vec(), scores));
        }

        let mut masks = ModelMasks::new();
        match (self.scope(), self.granularity()) {
            (PruningScope::Global, Granularity::Element) => {
                let pooled: Vec<f32> = scored
                    .iter()
                    .flat_map(|(_, _, s)| s.iter().copied())
                    .collect();
                let threshold = fraction_threshold(&pooled, compression)?;
                for (name, shape, scores) in scored {
                    masks.insert(name, Mask::from_scores(&scores, &shape, threshold)?);
                }
            }
            (PruningScope::Layerwise, Granularity::Element) => {
                for (name, shape, scores) in scored {
                    let threshold = fraction_threshold(&scores, compression)?;
                    masks.insert(name, Mask::from_scores(&scores, &shape, threshold)?);
                }
            }
            (PruningScope::Global, Granularity::Channel) => {
                let per_param: Vec<Vec<f32>> = scored
                    .iter()
                    .map(|(_, shape, s)| channel_scores(s, shape))
                    .collect::<Result<_>>()?;
                let pooled: Vec<f32> = per_param.iter().flatten().copied().collect();
                let threshold = fraction_threshold(&pooled, compression)?;
                for ((name, shape, _), ch) in scored.into_iter().zip(per_param) {
                    let keep: Vec<bool> = ch.iter().map(|&s| s > threshold).collect();
                    masks.insert(name, expand_channel_mask(&keep, &shape)?);
                }
            }
            (PruningScope::Layerwise, Granularity::Channel) => {
                for (name, shape, scores) in scored {
                    masks.insert(name, channel_mask(&scores, &shape, compression)?);
                }
            }
        }
        Ok(masks)
    }
}

/// Magnitude-family strategy: importance kind x scope x granularity.
#[derive(Debug, Clone)]
pub struct MagnitudePruning {
    name: String,
    kind: ImportanceKind,
    scope: PruningScope,
    granularity: Granularity,
}

impl MagnitudePruning {
    fn new(name: &str, kind: ImportanceKind, scope: PruningScope) -> Self {
        Self {
            name: name.to_string(),
            kind,
            scope,
            granularity: Granularity::Element,
        }
    }

    /// `GlobalMagWeight`: one `|w|` threshold across the whole model.
    #[must_use]
    pub fn global_weight() -> Self {
        Self::new("GlobalMagWeight", ImportanceKind::Magnitude, PruningScope::Global)
    }

    /// `LayerMagWeight`: per-layer `|w|` thresholds.
    #[must_use]
    pub fn layer_weight() -> Self {
        Self::new("LayerMagWeight", ImportanceKind::Magnitude, PruningScope::Layerwise)
    }

    /// `GlobalMagGrad`: one `|w|*|g|` threshold across the whole model.
    #[must_use]
    pub fn global_gradient() -> Self {
        Self::new(
            "GlobalMagGrad",
            ImportanceKind::MagnitudeGradient,
            PruningScope::Global,
        )
    }

    /// `LayerMagGrad`: per-layer `|w|*|g|` thresholds.
    #[must_use]
    pub fn layer_gradient() -> Self {
        Self::new(
            "LayerMagGrad",
            ImportanceKind::MagnitudeGradient,
            PruningScope::Layerwise,
        )
    }

    /// `GlobalMagAct`: one activation-weighted threshold across the model.
    #[must_use]
    pub fn global_activation() -> Self {
        Self::new(
            "GlobalMagAct",
            ImportanceKind::MagnitudeActivation,
            PruningScope::Global,
        )
    }

    /// `LayerMagAct`: per-layer activation-weighted thresholds.
    #[must_use]
    pub fn layer_activation() -> Self {
        Self::new(
            "LayerMagAct",
            ImportanceKind::MagnitudeActivation,
            PruningScope::Layerwise,
        )
    }

    /// Switch to channel granularity: whole output channels prune atomically.
    #[must_use]
    pub fn channelwise(mut self) -> Self {
        self.granularity = Granularity::Channel;
        self
    }

    /// The importance kind this strategy scores with.
    #[must_use]
    pub fn kind(&self) -> ImportanceKind {
        self.kind
    }
}

impl Strategy for MagnitudePruning {
    fn name(&self) -> &str {
        &self.name
    }

    fn scope(&self) -> PruningScope {
        self.scope
    }

    fn granularity(&self) -> Granularity {
        self.granularity
    }

    fn importance(
        &self,
        parameter: &str,
        tensor: &Tensor,
        ctx: Option<&CalibrationContext>,
    ) -> Result<Vec<f32>> {
        score(parameter, tensor, self.kind, ctx)
    }
}

/// Random pruning: uniform random importance per element.
///
/// Serves as the baseline every informed strategy must beat. Seedable for
/// reproducible experiments; per-parameter streams are derived from the seed
/// and the parameter name so layers don't share score sequences.
#[derive(Debug, Clone, Default)]
pub struct RandomPruning {
    seed: Option<u64>,
}

impl RandomPruning {
    /// Create with a fresh entropy seed per call.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create with a fixed seed for reproducible masks.
    #[must_use]
    pub fn with_seed(seed: u64) -> Self {
        Self { seed: Some(seed) }
    }
}

impl Strategy for RandomPruning {
    fn name(&self) -> &str {
        "RandomPruning"
    }

    fn scope(&self) -> PruningScope {
        PruningScope::Layerwise
    }

    fn importance(
        &self,
        parameter: &str,
        tensor: &Tensor,
        _ctx: Option<&CalibrationContext>,
    ) -> Result<Vec<f32>> {
        let mut rng = match self.seed {
            Some(seed) => {
                let mut hasher = DefaultHasher::new();
                parameter.hash(&mut hasher);
                StdRng::seed_from_u64(seed ^ hasher.finish())
            }
            None => StdRng::from_entropy(),
        };
        Ok((0..tensor.numel()).map(|_| rng.gen::<f32>()).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nn::{Linear, Sequential};

    fn two_layer_model() -> Sequential {
        // Layer 0 weights are all smaller than layer 1 weights
        Sequential::new()
            .add(
                Linear::new(2, 2)
                    .with_weight(Tensor::new(&[0.1, 0.2, 0.3, 0.4], &[2, 2])),
            )
            .add(
                Linear::new(2, 2)
                    .with_weight(Tensor::new(&[10.0, 20.0, 30.0, 40.0], &[2, 2])),
            )
    }

    #[test]
    fn test_prunable_parameters_skips_biases() {
        let model = two_layer_model();
        let params = prunable_parameters(&model);
        let names: Vec<&str> = params.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, vec!["0.weight", "1.weight"]);
    }

    #[test]
    fn test_global_threshold_concentrates_on_weak_layer() {
        let strategy = MagnitudePruning::global_weight();
        let model = two_layer_model();
        let masks = strategy.model_masks(&model, 0.5, None).unwrap();

        // Shared threshold: all of layer 0 falls below it, layer 1 survives
        assert_eq!(masks["0.weight"].num_pruned(), 4);
        assert_eq!(masks["1.weight"].num_pruned(), 0);
    }

    #[test]
    fn test_layerwise_threshold_spreads_evenly() {
        let strategy = MagnitudePruning::layer_weight();
        let model = two_layer_model();
        let masks = strategy.model_masks(&model, 0.5, None).unwrap();

        assert_eq!(masks["0.weight"].num_pruned(), 2);
        assert_eq!(masks["1.weight"].num_pruned(), 2);
    }

    #[test]
    fn test_global_and_layerwise_masks_differ() {
        let model = two_layer_model();
        let global = MagnitudePruning::global_weight()
            .model_masks(&model, 0.5, None)
            .unwrap();
        let layer = MagnitudePruning::layer_weight()
            .model_masks(&model, 0.5, None)
            .unwrap();
        assert_ne!(global["0.weight"], layer["0.weight"]);
    }

    #[test]
    fn test_gradient_strategy_requires_gradients() {
        let strategy = MagnitudePruning::global_gradient();
        let model = two_layer_model();
        let err = strategy.model_masks(&model, 0.5, None).unwrap_err();
        assert!(matches!(err, PruningError::MissingGradient { .. }));
    }

    #[test]
    fn test_gradient_strategy_ranks_by_product() {
        // Large weight with zero gradient loses to small weight with large gradient
        let mut weight = Tensor::new(&[100.0, 0.5], &[1, 2]);
        weight.set_grad(Tensor::new(&[0.0, 10.0], &[1, 2]));
        let layer = Linear::new(2, 1).with_weight(weight);

        let mask = MagnitudePruning::layer_gradient()
            .layer_masks("weight", layer.weight(), 0.5, None)
            .unwrap();
        assert_eq!(mask.keep(), &[false, true]);
    }

    #[test]
    fn test_activation_strategy_requires_context() {
        let strategy = MagnitudePruning::layer_activation();
        let model = two_layer_model();
        let err = strategy.model_masks(&model, 0.5, None).unwrap_err();
        assert!(matches!(err, PruningError::CalibrationRequired { .. }));
    }

    #[test]
    fn test_activation_strategy_with_calibration() {
        use crate::pruning::calibration::CalibrationContext;

        let model = two_layer_model();
        let mut ctx = CalibrationContext::new();
        ctx.record("0", &[1.0, 1.0]);
        ctx.record("1", &[1.0, 1.0]);

        let masks = MagnitudePruning::layer_activation()
            .model_masks(&model, 0.5, Some(&ctx))
            .unwrap();
        assert_eq!(masks["0.weight"].num_pruned(), 2);
        assert_eq!(masks["1.weight"].num_pruned(), 2);
    }

    #[test]
    fn test_channelwise_masks_are_atomic() {
        let strategy = MagnitudePruning::layer_weight().channelwise();
        let model = two_layer_model();
        let masks = strategy.model_masks(&model, 0.5, None).unwrap();

        for mask in masks.values() {
            let row_len = mask.shape()[1];
            for row in mask.keep().chunks(row_len) {
                assert!(row.iter().all(|&k| k == row[0]), "channel not atomic");
            }
        }
    }

    #[test]
    fn test_random_seeded_is_reproducible() {
        let model = two_layer_model();
        let a = RandomPruning::with_seed(42)
            .model_masks(&model, 0.5, None)
            .unwrap();
        let b = RandomPruning::with_seed(42)
            .model_masks(&model, 0.5, None)
            .unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_random_layers_get_distinct_streams() {
        let strategy = RandomPruning::with_seed(7);
        let t = Tensor::zeros(&[4, 4]);
        let a = strategy.importance("0.weight", &t, None).unwrap();
        let b = strategy.importance("1.weight", &t, None).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_random_extremes() {
        let model = two_layer_model();
        let none = RandomPruning::with_seed(1)
            .model_masks(&model, 0.0, None)
            .unwrap();
        assert!(none.values().all(|m| m.num_pruned() == 0));

        let all = RandomPruning::with_seed(1)
            .model_masks(&model, 1.0, None)
            .unwrap();
        assert!(all.values().all(|m| m.num_kept() == 0));
    }

    #[test]
    fn test_model_masks_rejects_bad_fraction() {
        let model = two_layer_model();
        let err = MagnitudePruning::global_weight()
            .model_masks(&model, 1.5, None)
            .unwrap_err();
        assert!(matches!(err, PruningError::InvalidCompression { .. }));
    }

    #[test]
    fn test_model_masks_no_prunable_parameters() {
        let model = Sequential::new();
        let err = MagnitudePruning::global_weight()
            .model_masks(&model, 0.5, None)
            .unwrap_err();
        assert!(matches!(err, PruningError::NoParameters { .. }));
    }

    #[test]
    fn test_strategy_trait_object_safe() {
        let strategies: Vec<Box<dyn Strategy>> = vec![
            Box::new(RandomPruning::new()),
            Box::new(MagnitudePruning::global_weight()),
        ];
        assert_eq!(strategies[1].name(), "GlobalMagWeight");
    }
}
