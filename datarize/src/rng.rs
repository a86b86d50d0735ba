//! Shared random source used by every generator and strategy.

use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use std::fmt;
use std::sync::{Mutex, PoisonError};

/// Trait for providing random number generators
pub trait RngProvider: Send + Sync {
    /// The type of RNG this provider creates
    type Rng: RngCore + Send + 'static;

    /// Create a new RNG instance with an optional seed
    fn create_rng(&self, seed: Option<u64>) -> Self::Rng;
}

/// Default RNG provider using `StdRng`
#[derive(Debug, Clone)]
pub struct DefaultRngProvider;

impl RngProvider for DefaultRngProvider {
    type Rng = StdRng;

    fn create_rng(&self, seed: Option<u64>) -> Self::Rng {
        match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        }
    }
}

/// Thread-safe random source shared by all instantiation calls of a populator.
///
/// The lock is only held for the duration of a single draw, so concurrent calls interleave
/// freely and no ordering is guaranteed across threads.
pub struct SharedRng {
    inner: Mutex<Box<dyn RngCore + Send>>,
    seed: Option<u64>,
}

impl SharedRng {
    /// Create a random source seeded from OS entropy
    pub fn from_entropy() -> Self {
        Self::from_provider(&DefaultRngProvider, None)
    }

    /// Create a random source with a fixed seed
    pub fn seeded(seed: u64) -> Self {
        Self::from_provider(&DefaultRngProvider, Some(seed))
    }

    /// Create a random source from a provider
    pub fn from_provider<P: RngProvider>(provider: &P, seed: Option<u64>) -> Self {
        Self {
            inner: Mutex::new(Box::new(provider.create_rng(seed))),
            seed,
        }
    }

    /// Wrap an existing generator
    pub fn from_rng<R: RngCore + Send + 'static>(rng: R) -> Self {
        Self {
            inner: Mutex::new(Box::new(rng)),
            seed: None,
        }
    }

    /// The seed this source was created with, if any
    pub fn seed(&self) -> Option<u64> {
        self.seed
    }

    /// Run `f` with exclusive access to the generator
    pub fn with<T>(&self, f: impl FnOnce(&mut dyn RngCore) -> T) -> T {
        let mut guard = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut **guard)
    }
}

impl fmt::Debug for SharedRng {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SharedRng")
            .field("seed", &self.seed)
            .finish_non_exhaustive()
    }
}

impl Default for SharedRng {
    fn default() -> Self {
        Self::from_entropy()
    }
}
