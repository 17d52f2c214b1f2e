//! Network configuration.
//!
//! `NetworkBuilder` is the recommended way to define a network. It makes the
//! topology, output mode and rates explicit and validates them before any
//! buffer is allocated:
//!
//! ```rust
//! use hidden_mlp::{NetworkBuilder, Rates};
//!
//! # fn main() -> hidden_mlp::Result<()> {
//! let net = NetworkBuilder::new(2, 4, 1)?
//!     .regression(true)
//!     .rates(Rates::new(0.1, 0.05)?)?
//!     .build_with_seed(0);
//! assert_eq!(net.input_count(), 2);
//! # Ok(())
//! # }
//! ```

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::{Rng, thread_rng};

use crate::{Error, Network, Result};

/// Learning rate and momentum coefficient, fixed for the life of a network.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rates {
    /// Scale of the gradient step.
    pub learning_rate: f64,
    /// Fraction of the previous step carried into the current one.
    pub momentum: f64,
}

impl Default for Rates {
    fn default() -> Self {
        Self {
            learning_rate: 0.25,
            momentum: 0.1,
        }
    }
}

impl Rates {
    pub fn new(learning_rate: f64, momentum: f64) -> Result<Self> {
        let rates = Self {
            learning_rate,
            momentum,
        };
        rates.validate()?;
        Ok(rates)
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.learning_rate.is_finite() && self.learning_rate > 0.0) {
            return Err(Error::InvalidConfig(format!(
                "learning rate must be finite and > 0, got {}",
                self.learning_rate
            )));
        }
        if !(self.momentum.is_finite() && self.momentum >= 0.0) {
            return Err(Error::InvalidConfig(format!(
                "momentum must be finite and >= 0, got {}",
                self.momentum
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
/// Builder for a [`Network`].
pub struct NetworkBuilder {
    inputs: usize,
    hidden: usize,
    outputs: usize,
    regression: bool,
    rates: Rates,
}

impl NetworkBuilder {
    /// Start building a network with the given layer sizes (bias units excluded).
    pub fn new(inputs: usize, hidden: usize, outputs: usize) -> Result<Self> {
        for (name, count) in [("input", inputs), ("hidden", hidden), ("output", outputs)] {
            if count == 0 {
                return Err(Error::InvalidConfig(format!("{name} count must be > 0")));
            }
        }
        Ok(Self {
            inputs,
            hidden,
            outputs,
            regression: false,
            rates: Rates::default(),
        })
    }

    /// Linear output units instead of sigmoid ones.
    pub fn regression(mut self, regression: bool) -> Self {
        self.regression = regression;
        self
    }

    pub fn rates(mut self, rates: Rates) -> Result<Self> {
        rates.validate()?;
        self.rates = rates;
        Ok(self)
    }

    /// Build with weights drawn from a freshly seeded `StdRng`.
    pub fn build_with_seed(self, seed: u64) -> Network {
        let mut rng = StdRng::seed_from_u64(seed);
        self.build_with_rng(&mut rng)
    }

    /// Build with weights drawn from `rng`.
    pub fn build_with_rng<R: Rng + ?Sized>(self, rng: &mut R) -> Network {
        Network::allocate(
            self.inputs,
            self.hidden,
            self.outputs,
            self.regression,
            self.rates,
            rng,
        )
    }

    /// Build with weights drawn from the thread-local entropy source.
    pub fn build(self) -> Network {
        self.build_with_rng(&mut thread_rng())
    }
}
