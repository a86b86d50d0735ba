//! Fluent builder for configuring a [`Populator`].
//!
//! # Examples
//!
//! ```rust
//! use datarize::Populator;
//!
//! let populator = Populator::builder()
//!     .seed(42)
//!     .string_length(16)
//!     .builder_name("create")
//!     .build()
//!     .expect("valid configuration");
//!
//! assert_eq!(populator.random_string(16).len(), 16);
//! ```

use std::any::Any;

use rand::RngCore;

use crate::config::PopulatorConfig;
use crate::engine::Populator;
use crate::error::PopulateResult;
use crate::generator::ValueGenerators;
use crate::rng::SharedRng;

/// Chainable configuration for a [`Populator`]
pub struct PopulatorBuilder {
    config: PopulatorConfig,
    generators: ValueGenerators,
    rng: Option<SharedRng>,
}

impl PopulatorBuilder {
    /// Start from the default configuration and the standard generators
    pub fn new() -> Self {
        Self {
            config: PopulatorConfig::default(),
            generators: ValueGenerators::standard(),
            rng: None,
        }
    }

    /// Start from an existing configuration
    pub fn from_config(config: PopulatorConfig) -> Self {
        Self {
            config,
            ..Self::new()
        }
    }

    /// Set the default recursion budget for self-referential positions
    pub fn recursion_budget(mut self, budget: u32) -> Self {
        self.config.recursion_budget = budget;
        self
    }

    /// Set the budget handed to the container resolver
    pub fn container_budget(mut self, budget: u32) -> Self {
        self.config.container_budget = budget;
        self
    }

    /// Set the maximum nesting depth
    pub fn max_depth(mut self, depth: usize) -> Self {
        self.config.max_depth = depth;
        self
    }

    /// Set the length of generated strings
    pub fn string_length(mut self, length: usize) -> Self {
        self.config.string_length = length;
        self
    }

    /// Set the upper bound of default container sizes
    pub fn max_collection_size(mut self, size: usize) -> Self {
        self.config.max_collection_size = size;
        self
    }

    /// Set the number of insertions into concrete containers
    pub fn concrete_insertions(mut self, count: usize) -> Self {
        self.config.concrete_insertions = count;
        self
    }

    /// Add a static factory method name to the candidate set
    pub fn builder_name(mut self, name: impl Into<String>) -> Self {
        let name = name.into();
        if !self.config.builder_names.contains(&name) {
            self.config.builder_names.push(name);
        }
        self
    }

    /// Replace the candidate set of static factory method names
    pub fn builder_names<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.builder_names = names.into_iter().map(Into::into).collect();
        self
    }

    /// Set the name prefix of mutator methods
    pub fn mutator_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.config.mutator_prefix = prefix.into();
        self
    }

    /// Seed the random source
    pub fn seed(mut self, seed: u64) -> Self {
        self.config.seed = Some(seed);
        self
    }

    /// Use a specific random number generator; takes precedence over [`seed`](Self::seed)
    pub fn rng<R: RngCore + Send + 'static>(mut self, rng: R) -> Self {
        self.rng = Some(SharedRng::from_rng(rng));
        self
    }

    /// Register or replace the generator of a terminal type
    pub fn generator<T, F>(mut self, generator: F) -> Self
    where
        T: Any + Send,
        F: Fn(&mut dyn RngCore, &PopulatorConfig) -> T + Send + Sync + 'static,
    {
        self.generators.register(generator);
        self
    }

    /// Validate the configuration and build the populator
    pub fn build(self) -> PopulateResult<Populator> {
        self.config.validate()?;
        let rng = match (self.rng, self.config.seed) {
            (Some(rng), _) => rng,
            (None, Some(seed)) => SharedRng::seeded(seed),
            (None, None) => SharedRng::from_entropy(),
        };
        Ok(Populator::from_parts(self.config, self.generators, rng))
    }
}

impl Default for PopulatorBuilder {
    fn default() -> Self {
        Self::new()
    }
}
