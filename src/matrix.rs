//! Row-stochastic transition matrices.

use rand::Rng;

use crate::EPS;
use crate::distribution::Distribution;
use crate::error::ChainError;

/// An `n x n` row-stochastic transition matrix.
///
/// Row `i` contains the probabilities of moving from state `i` to states
/// `0..n`. Entry `(i, j)` is `P(next = j | current = i)`. Every row sums
/// to 1 within `1e-9`; the matrix is immutable after construction, so a
/// held `TransitionMatrix` is always valid.
#[derive(Debug, Clone, PartialEq)]
pub struct TransitionMatrix {
    n: usize,
    /// Row-major `n * n` probabilities.
    probs: Vec<f64>,
    /// Optional display labels, one per state.
    labels: Option<Vec<String>>,
}

impl TransitionMatrix {
    /// Constructs a transition matrix from row vectors.
    ///
    /// # Errors
    ///
    /// Returns [`ChainError::InvalidMatrix`] if the input is empty, not
    /// square, contains a non-finite entry or one outside `[0, 1]`, or any
    /// row sum deviates from 1 by more than `1e-9`.
    pub fn from_rows(rows: Vec<Vec<f64>>) -> Result<Self, ChainError> {
        let n = rows.len();
        if n == 0 {
            return Err(ChainError::InvalidMatrix {
                reason: "matrix has no rows".to_string(),
            });
        }

        let mut probs = Vec::with_capacity(n * n);
        for (i, row) in rows.iter().enumerate() {
            if row.len() != n {
                return Err(ChainError::InvalidMatrix {
                    reason: format!("row {i} has {} columns, expected {n}", row.len()),
                });
            }
            let mut sum = 0.0;
            for (j, &p) in row.iter().enumerate() {
                if !p.is_finite() {
                    return Err(ChainError::InvalidMatrix {
                        reason: format!("entry ({i}, {j}) is not finite: {p}"),
                    });
                }
                if !(0.0..=1.0).contains(&p) {
                    return Err(ChainError::InvalidMatrix {
                        reason: format!("entry ({i}, {j}) = {p} is outside [0, 1]"),
                    });
                }
                sum += p;
            }
            if (sum - 1.0).abs() > EPS {
                return Err(ChainError::InvalidMatrix {
                    reason: format!("row {i} sums to {sum}, expected 1 within {EPS:e}"),
                });
            }
            probs.extend_from_slice(row);
        }

        Ok(Self {
            n,
            probs,
            labels: None,
        })
    }

    /// Attaches display labels, one per state.
    ///
    /// Labels are carried for the caller's presentation layer and never
    /// affect computation.
    ///
    /// # Errors
    ///
    /// Returns [`ChainError::InvalidArgument`] if the label count does not
    /// match the number of states.
    pub fn with_labels(mut self, labels: Vec<String>) -> Result<Self, ChainError> {
        if labels.len() != self.n {
            return Err(ChainError::InvalidArgument {
                reason: format!("got {} labels for {} states", labels.len(), self.n),
            });
        }
        self.labels = Some(labels);
        Ok(self)
    }

    /// Returns the number of states `n`.
    pub fn n_states(&self) -> usize {
        self.n
    }

    /// Returns the probability of transitioning from one state to another.
    ///
    /// # Panics
    ///
    /// Panics if either index is `>= n`.
    pub fn prob(&self, from: usize, to: usize) -> f64 {
        assert!(to < self.n, "state must be < {}, got {to}", self.n);
        self.row(from)[to]
    }

    /// Returns the transition probabilities out of a given state.
    ///
    /// # Panics
    ///
    /// Panics if `from >= n`.
    pub fn row(&self, from: usize) -> &[f64] {
        assert!(from < self.n, "state must be < {}, got {from}", self.n);
        &self.probs[from * self.n..(from + 1) * self.n]
    }

    /// Returns row `from` as a [`Distribution`].
    ///
    /// # Panics
    ///
    /// Panics if `from >= n`.
    pub fn row_distribution(&self, from: usize) -> Distribution {
        Distribution::from_probs(self.row(from).to_vec())
            .expect("matrix rows are validated at construction")
    }

    /// Returns the full row-major probability slice.
    pub fn probs(&self) -> &[f64] {
        &self.probs
    }

    /// Returns the display label for a state, if labels were attached.
    ///
    /// # Panics
    ///
    /// Panics if `state >= n`.
    pub fn label(&self, state: usize) -> Option<&str> {
        assert!(state < self.n, "state must be < {}, got {state}", self.n);
        self.labels.as_ref().map(|l| l[state].as_str())
    }

    /// Samples the next state given the current state, using cumulative CDF.
    ///
    /// Draws a uniform random number and walks through the row's cumulative
    /// distribution, returning the first state whose cumulative probability
    /// meets or exceeds the draw.
    ///
    /// # Panics
    ///
    /// Panics if `from >= n`.
    pub fn sample_next(&self, from: usize, rng: &mut impl Rng) -> usize {
        let row = self.row(from);
        let u: f64 = rng.random();
        let mut cumulative = 0.0;
        for (state, &p) in row.iter().enumerate() {
            cumulative += p;
            if cumulative >= u {
                return state;
            }
        }
        // Rounding can leave the walk short of u; land on the last state.
        self.n - 1
    }
}
