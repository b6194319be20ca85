//! Probability distributions over chain states.

use rand::Rng;

use crate::EPS;
use crate::error::ChainError;

/// A probability distribution over the `n` states of a chain.
///
/// Entries are non-negative and sum to 1 within `1e-9`. Used both for
/// exact distributions (propagation, stationary solve) and empirical
/// frequency estimates (trajectory histograms).
#[derive(Debug, Clone, PartialEq)]
pub struct Distribution {
    probs: Vec<f64>,
}

impl Distribution {
    /// Constructs a distribution from a probability vector.
    ///
    /// # Errors
    ///
    /// Returns [`ChainError::InvalidArgument`] if the vector is empty,
    /// contains a non-finite or negative entry, or its sum deviates from 1
    /// by more than `1e-9`.
    pub fn from_probs(probs: Vec<f64>) -> Result<Self, ChainError> {
        if probs.is_empty() {
            return Err(ChainError::InvalidArgument {
                reason: "distribution has no entries".to_string(),
            });
        }
        let mut sum = 0.0;
        for (i, &p) in probs.iter().enumerate() {
            if !p.is_finite() {
                return Err(ChainError::InvalidArgument {
                    reason: format!("probs[{i}] is not finite: {p}"),
                });
            }
            if p < 0.0 {
                return Err(ChainError::InvalidArgument {
                    reason: format!("probs[{i}] = {p} is negative"),
                });
            }
            sum += p;
        }
        if (sum - 1.0).abs() > EPS {
            return Err(ChainError::InvalidArgument {
                reason: format!("probabilities sum to {sum}, expected 1 within {EPS:e}"),
            });
        }
        Ok(Self { probs })
    }

    /// Constructs a distribution from a vector already known to be
    /// normalized, skipping validation.
    pub(crate) fn from_normalized(probs: Vec<f64>) -> Self {
        debug_assert!(
            (probs.iter().sum::<f64>() - 1.0).abs() < 1e-6,
            "caller promised a normalized vector"
        );
        Self { probs }
    }

    /// Returns the uniform distribution over `n` states.
    ///
    /// # Panics
    ///
    /// Panics if `n` is 0.
    pub fn uniform(n: usize) -> Self {
        assert!(n > 0, "a distribution needs at least one state");
        Self {
            probs: vec![1.0 / n as f64; n],
        }
    }

    /// Returns the point mass on `state` over `n` states.
    ///
    /// # Errors
    ///
    /// Returns [`ChainError::InvalidArgument`] if `n` is 0 or
    /// `state >= n`.
    pub fn point_mass(state: usize, n: usize) -> Result<Self, ChainError> {
        if n == 0 {
            return Err(ChainError::InvalidArgument {
                reason: "a distribution needs at least one state".to_string(),
            });
        }
        if state >= n {
            return Err(ChainError::InvalidArgument {
                reason: format!("state must be < {n}, got {state}"),
            });
        }
        let mut probs = vec![0.0; n];
        probs[state] = 1.0;
        Ok(Self { probs })
    }

    /// Returns the number of states.
    pub fn n_states(&self) -> usize {
        self.probs.len()
    }

    /// Returns the probability mass on a state.
    ///
    /// # Panics
    ///
    /// Panics if `state` is out of range.
    pub fn prob(&self, state: usize) -> f64 {
        assert!(
            state < self.probs.len(),
            "state must be < {}, got {state}",
            self.probs.len()
        );
        self.probs[state]
    }

    /// Returns the full probability slice.
    pub fn probs(&self) -> &[f64] {
        &self.probs
    }

    /// Samples a state from this distribution, using cumulative CDF.
    pub fn sample(&self, rng: &mut impl Rng) -> usize {
        let u: f64 = rng.random();
        let mut cumulative = 0.0;
        for (state, &p) in self.probs.iter().enumerate() {
            cumulative += p;
            if cumulative >= u {
                return state;
            }
        }
        // Rounding can leave the walk short of u; land on the last state.
        self.probs.len() - 1
    }

    /// Converts each probability into a free-energy-like value
    /// `-kt * ln(p_i)`, where `kt` is the Boltzmann constant times
    /// temperature in the caller's units.
    ///
    /// States with zero mass map to `+inf`. Pure scalar transform for the
    /// presentation layer; the chain machinery never consumes it.
    pub fn free_energies(&self, kt: f64) -> Vec<f64> {
        self.probs.iter().map(|&p| -kt * p.ln()).collect()
    }
}
