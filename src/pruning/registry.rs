//! Strategy registry: name to strategy resolution.
//!
//! The registry is a plain value constructed explicitly and passed in, not
//! process-wide state. Entries keep insertion order so `names()` is stable
//! across calls.

use super::error::{PruningError, Result};
use super::strategy::{MagnitudePruning, RandomPruning, Strategy};

/// Ordered mapping from strategy name to implementation.
///
/// Lookups are linear; registries hold a handful of entries and are built
/// once, so there is no index structure to keep in sync.
#[derive(Default)]
pub struct StrategyRegistry {
    entries: Vec<(String, Box<dyn Strategy>)>,
}

impl StrategyRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry populated with the seven built-in strategies.
    ///
    /// Order: `RandomPruning`, `GlobalMagWeight`, `LayerMagWeight`,
    /// `GlobalMagGrad`, `LayerMagGrad`, `GlobalMagAct`, `LayerMagAct`.
    #[must_use]
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        registry.register_named(RandomPruning::new());
        registry.register_named(MagnitudePruning::global_weight());
        registry.register_named(MagnitudePruning::layer_weight());
        registry.register_named(MagnitudePruning::global_gradient());
        registry.register_named(MagnitudePruning::layer_gradient());
        registry.register_named(MagnitudePruning::global_activation());
        registry.register_named(MagnitudePruning::layer_activation());
        registry
    }

    /// Register a strategy under an explicit name.
    ///
    /// Re-registering an existing name replaces the entry in place, keeping
    /// its position in the listing order.
    pub fn register<S: Strategy + 'static>(&mut self, name: impl Into<String>, strategy: S) {
        let name = name.into();
        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some(entry) => entry.1 = Box::new(strategy),
            None => self.entries.push((name, Box::new(strategy))),
        }
    }

    /// Register a strategy under its own [`Strategy::name`].
    pub fn register_named<S: Strategy + 'static>(&mut self, strategy: S) {
        let name = strategy.name().to_string();
        self.register(name, strategy);
    }

    /// Resolve a strategy by name.
    ///
    /// # Errors
    /// [`PruningError::UnknownStrategy`] if the name is not registered.
    pub fn lookup(&self, name: &str) -> Result<&dyn Strategy> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, s)| s.as_ref())
            .ok_or_else(|| PruningError::UnknownStrategy {
                name: name.to_string(),
            })
    }

    /// Registered names in insertion order.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        self.entries.iter().map(|(n, _)| n.as_str()).collect()
    }

    /// Number of registered strategies.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the registry has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
