//! Execution context: training mode and random state

use rand::rngs::StdRng;
use rand::SeedableRng;

/// Context threaded through stochastic and mode-dependent operations
pub struct Context {
    training: bool,
    rng: StdRng,
}

impl Context {
    /// Create a new context in training mode, seeded from the OS
    pub fn new() -> Self {
        Self {
            training: true,
            rng: StdRng::from_os_rng(),
        }
    }

    /// Create a reproducible context
    pub fn with_seed(seed: u64) -> Self {
        Self {
            training: true,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Set training mode
    pub fn train(&mut self) {
        self.training = true;
    }

    /// Set evaluation mode
    pub fn eval(&mut self) {
        self.training = false;
    }

    /// Check if in training mode
    pub fn is_training(&self) -> bool {
        self.training
    }

    /// Random generator for noise and initialization
    pub fn rng(&mut self) -> &mut StdRng {
        &mut self.rng
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::new()
    }
}
