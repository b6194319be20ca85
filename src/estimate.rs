//! Empirical estimation of transition structure from observed trajectories.
//!
//! All estimators fold over consecutive tuples of a trajectory and
//! rebuild their tables from scratch on every call; nothing is mutated in
//! place across calls.

use crate::distribution::Distribution;
use crate::error::ChainError;
use crate::matrix::TransitionMatrix;

/// An `n x n` table of observed transition counts.
///
/// Entry `(i, j)` is the number of times state `i` was immediately
/// followed by state `j`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CountTable {
    n: usize,
    /// Row-major `n * n` counts.
    counts: Vec<u64>,
}

impl CountTable {
    fn zeros(n: usize) -> Self {
        Self {
            n,
            counts: vec![0; n * n],
        }
    }

    /// Returns the number of states `n`.
    pub fn n_states(&self) -> usize {
        self.n
    }

    /// Returns the count for one transition.
    ///
    /// # Panics
    ///
    /// Panics if either index is `>= n`.
    pub fn count(&self, from: usize, to: usize) -> u64 {
        assert!(to < self.n, "state must be < {}, got {to}", self.n);
        self.row(from)[to]
    }

    /// Returns the counts out of a given state.
    ///
    /// # Panics
    ///
    /// Panics if `from >= n`.
    pub fn row(&self, from: usize) -> &[u64] {
        assert!(from < self.n, "state must be < {}, got {from}", self.n);
        &self.counts[from * self.n..(from + 1) * self.n]
    }

    /// Returns the total number of observed transitions.
    pub fn total(&self) -> u64 {
        self.counts.iter().sum()
    }

    /// Row-normalizes the counts into transition-probability estimates.
    ///
    /// Rows whose state was never observed as an origin have no estimate
    /// and come back filled with NaN; the caller decides what that means.
    pub fn row_probabilities(&self) -> Vec<Vec<f64>> {
        (0..self.n)
            .map(|i| {
                let row = self.row(i);
                let row_sum: u64 = row.iter().sum();
                if row_sum == 0 {
                    vec![f64::NAN; self.n]
                } else {
                    row.iter().map(|&c| c as f64 / row_sum as f64).collect()
                }
            })
            .collect()
    }

    /// Dirichlet-smoothed transition-probability estimates.
    ///
    /// Each row is `(c_ij + a) / (row_sum + n * a)` with
    /// `a = alpha / sqrt(total)`, so the pseudo-count fades as evidence
    /// accumulates. Rows with no observations are well-defined here (they
    /// come back uniform), as does an entirely empty table.
    ///
    /// # Panics
    ///
    /// Panics if `alpha` is not finite and positive.
    pub fn row_probabilities_smoothed(&self, alpha: f64) -> Vec<Vec<f64>> {
        assert!(
            alpha.is_finite() && alpha > 0.0,
            "alpha must be finite and positive, got {alpha}"
        );
        let total = self.total();
        if total == 0 {
            return vec![vec![1.0 / self.n as f64; self.n]; self.n];
        }
        let alpha_eff = alpha / (total as f64).sqrt();
        (0..self.n)
            .map(|i| {
                let row = self.row(i);
                let row_sum: u64 = row.iter().sum();
                let denom = row_sum as f64 + self.n as f64 * alpha_eff;
                row.iter().map(|&c| (c as f64 + alpha_eff) / denom).collect()
            })
            .collect()
    }

    /// Row-normalizes the counts into a validated [`TransitionMatrix`].
    ///
    /// # Errors
    ///
    /// Returns [`ChainError::InvalidMatrix`] if any state was never
    /// observed as an origin (its row cannot be normalized).
    pub fn to_matrix(&self) -> Result<TransitionMatrix, ChainError> {
        for i in 0..self.n {
            if self.row(i).iter().sum::<u64>() == 0 {
                return Err(ChainError::InvalidMatrix {
                    reason: format!("state {i} has no observed outgoing transitions"),
                });
            }
        }
        TransitionMatrix::from_rows(self.row_probabilities())
    }
}

fn validate_states(trajectory: &[usize], n_states: usize) -> Result<(), ChainError> {
    if n_states == 0 {
        return Err(ChainError::InvalidArgument {
            reason: "n_states must be >= 1, got 0".to_string(),
        });
    }
    for (t, &s) in trajectory.iter().enumerate() {
        if s >= n_states {
            return Err(ChainError::InvalidArgument {
                reason: format!("trajectory[{t}] = {s} is out of range for {n_states} states"),
            });
        }
    }
    Ok(())
}

/// Counts first-order transitions over consecutive pairs of a trajectory.
///
/// The final element contributes no outgoing transition (no wraparound).
/// A trajectory shorter than 2 yields an all-zero table, not an error.
///
/// # Errors
///
/// Returns [`ChainError::InvalidArgument`] if `n_states` is 0 or any
/// trajectory element is `>= n_states`.
pub fn transition_counts(
    trajectory: &[usize],
    n_states: usize,
) -> Result<CountTable, ChainError> {
    validate_states(trajectory, n_states)?;
    let mut table = CountTable::zeros(n_states);
    for pair in trajectory.windows(2) {
        table.counts[pair[0] * n_states + pair[1]] += 1;
    }
    Ok(table)
}

/// Row-normalized first-order transition-probability estimates.
///
/// Equivalent to [`transition_counts`] followed by
/// [`CountTable::row_probabilities`]; rows for unobserved origin states
/// come back as NaN.
///
/// # Errors
///
/// Returns [`ChainError::InvalidArgument`] if `n_states` is 0 or any
/// trajectory element is `>= n_states`.
pub fn transition_probabilities(
    trajectory: &[usize],
    n_states: usize,
) -> Result<Vec<Vec<f64>>, ChainError> {
    Ok(transition_counts(trajectory, n_states)?.row_probabilities())
}

/// Counts transitions conditioned on a lag-2 history.
///
/// For each consecutive triple `(k, i, j)` of the trajectory, the table at
/// index `k` accumulates the `(i, j)` pair. Comparing the row-normalized
/// tables across `k` against the unconditioned estimate tests whether the
/// source is Markov of order 1: for a genuine order-1 chain they converge
/// to the same matrix as the trajectory grows.
///
/// A trajectory shorter than 3 yields `n_states` all-zero tables.
///
/// # Errors
///
/// Returns [`ChainError::InvalidArgument`] if `n_states` is 0 or any
/// trajectory element is `>= n_states`.
pub fn conditioned_counts(
    trajectory: &[usize],
    n_states: usize,
) -> Result<Vec<CountTable>, ChainError> {
    validate_states(trajectory, n_states)?;
    let mut tables = vec![CountTable::zeros(n_states); n_states];
    for triple in trajectory.windows(3) {
        tables[triple[0]].counts[triple[1] * n_states + triple[2]] += 1;
    }
    Ok(tables)
}

/// Visit-frequency histogram of a trajectory as a [`Distribution`].
///
/// # Errors
///
/// Returns [`ChainError::InvalidArgument`] if the trajectory is empty
/// (a histogram of nothing is not a distribution), `n_states` is 0, or
/// any trajectory element is `>= n_states`.
pub fn occupancy(trajectory: &[usize], n_states: usize) -> Result<Distribution, ChainError> {
    validate_states(trajectory, n_states)?;
    if trajectory.is_empty() {
        return Err(ChainError::InvalidArgument {
            reason: "cannot build an occupancy distribution from an empty trajectory".to_string(),
        });
    }
    let mut counts = vec![0u64; n_states];
    for &s in trajectory {
        counts[s] += 1;
    }
    let total = trajectory.len() as f64;
    Ok(Distribution::from_normalized(
        counts.iter().map(|&c| c as f64 / total).collect(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    // Hand-checkable path over 3 states:
    // pairs: 0->0, 0->1, 1->1, 1->0, 0->1, 1->2, 2->0
    const PATH: [usize; 8] = [0, 0, 1, 1, 0, 1, 2, 0];

    #[test]
    fn counts_known_sequence() {
        let table = transition_counts(&PATH, 3).unwrap();
        assert_eq!(table.count(0, 0), 1);
        assert_eq!(table.count(0, 1), 2);
        assert_eq!(table.count(0, 2), 0);
        assert_eq!(table.count(1, 0), 1);
        assert_eq!(table.count(1, 1), 1);
        assert_eq!(table.count(1, 2), 1);
        assert_eq!(table.count(2, 0), 1);
        assert_eq!(table.count(2, 1), 0);
        assert_eq!(table.count(2, 2), 0);
        assert_eq!(table.total(), 7);
    }

    #[test]
    fn last_element_contributes_no_transition() {
        let table = transition_counts(&[0, 1], 2).unwrap();
        assert_eq!(table.count(0, 1), 1);
        assert_eq!(table.total(), 1);
    }

    #[test]
    fn short_trajectories_yield_empty_tables() {
        assert_eq!(transition_counts(&[], 3).unwrap().total(), 0);
        assert_eq!(transition_counts(&[1], 3).unwrap().total(), 0);
    }

    #[test]
    fn row_probabilities_normalize() {
        let probs = transition_probabilities(&PATH, 3).unwrap();
        assert_relative_eq!(probs[0][0], 1.0 / 3.0, epsilon = 1e-12);
        assert_relative_eq!(probs[0][1], 2.0 / 3.0, epsilon = 1e-12);
        assert_relative_eq!(probs[1][2], 1.0 / 3.0, epsilon = 1e-12);
        assert_relative_eq!(probs[2][0], 1.0, epsilon = 1e-12);
        for row in &probs {
            assert_relative_eq!(row.iter().sum::<f64>(), 1.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn unvisited_origin_rows_are_nan() {
        // State 2 never occurs as an origin.
        let probs = transition_probabilities(&[0, 1, 0, 1], 3).unwrap();
        assert!(probs[2].iter().all(|p| p.is_nan()));
        assert!(probs[0].iter().all(|p| !p.is_nan()));
    }

    #[test]
    fn smoothed_rows_sum_to_one() {
        let table = transition_counts(&PATH, 3).unwrap();
        let probs = table.row_probabilities_smoothed(1.0);
        for row in &probs {
            assert_relative_eq!(row.iter().sum::<f64>(), 1.0, epsilon = 1e-12);
            assert!(row.iter().all(|&p| p > 0.0));
        }
    }

    #[test]
    fn smoothed_known_counts() {
        // total = 7, alpha_eff = 1/sqrt(7); row 0 counts = [1, 2, 0].
        let table = transition_counts(&PATH, 3).unwrap();
        let probs = table.row_probabilities_smoothed(1.0);
        let alpha_eff = 1.0 / 7.0_f64.sqrt();
        let denom = 3.0 + 3.0 * alpha_eff;
        assert_relative_eq!(probs[0][0], (1.0 + alpha_eff) / denom, epsilon = 1e-12);
        assert_relative_eq!(probs[0][1], (2.0 + alpha_eff) / denom, epsilon = 1e-12);
        assert_relative_eq!(probs[0][2], alpha_eff / denom, epsilon = 1e-12);
    }

    #[test]
    fn smoothed_empty_table_is_uniform() {
        let table = transition_counts(&[0], 2).unwrap();
        let probs = table.row_probabilities_smoothed(0.5);
        for row in &probs {
            assert_relative_eq!(row[0], 0.5, epsilon = 1e-12);
            assert_relative_eq!(row[1], 0.5, epsilon = 1e-12);
        }
    }

    #[test]
    fn to_matrix_round_trips_counts() {
        let table = transition_counts(&PATH, 3).unwrap();
        let m = table.to_matrix().unwrap();
        assert_relative_eq!(m.prob(0, 1), 2.0 / 3.0, epsilon = 1e-12);
        assert_relative_eq!(m.prob(2, 0), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn to_matrix_rejects_unvisited_origin() {
        let table = transition_counts(&[0, 1, 0], 3).unwrap();
        assert!(matches!(
            table.to_matrix(),
            Err(ChainError::InvalidMatrix { .. })
        ));
    }

    #[test]
    fn conditioned_counts_known_sequence() {
        // Triples of PATH: (0,0,1) (0,1,1) (1,1,0) (1,0,1) (0,1,2) (1,2,0)
        let tables = conditioned_counts(&PATH, 3).unwrap();
        assert_eq!(tables.len(), 3);
        assert_eq!(tables[0].count(0, 1), 1);
        assert_eq!(tables[0].count(1, 1), 1);
        assert_eq!(tables[0].count(1, 2), 1);
        assert_eq!(tables[0].total(), 3);
        assert_eq!(tables[1].count(1, 0), 1);
        assert_eq!(tables[1].count(0, 1), 1);
        assert_eq!(tables[1].count(2, 0), 1);
        assert_eq!(tables[1].total(), 3);
        assert_eq!(tables[2].total(), 0);
    }

    #[test]
    fn conditioned_short_trajectories_yield_empty_tables() {
        let tables = conditioned_counts(&[0, 1], 3).unwrap();
        assert_eq!(tables.len(), 3);
        assert!(tables.iter().all(|t| t.total() == 0));
    }

    #[test]
    fn occupancy_frequencies() {
        let d = occupancy(&PATH, 3).unwrap();
        assert_relative_eq!(d.prob(0), 4.0 / 8.0, epsilon = 1e-12);
        assert_relative_eq!(d.prob(1), 3.0 / 8.0, epsilon = 1e-12);
        assert_relative_eq!(d.prob(2), 1.0 / 8.0, epsilon = 1e-12);
    }

    #[test]
    fn occupancy_empty_trajectory_error() {
        assert!(matches!(
            occupancy(&[], 3),
            Err(ChainError::InvalidArgument { .. })
        ));
    }

    #[test]
    fn out_of_range_state_error() {
        assert!(matches!(
            transition_counts(&[0, 3, 1], 3),
            Err(ChainError::InvalidArgument { .. })
        ));
        assert!(matches!(
            conditioned_counts(&[0, 3, 1], 3),
            Err(ChainError::InvalidArgument { .. })
        ));
        assert!(matches!(
            occupancy(&[0, 3], 3),
            Err(ChainError::InvalidArgument { .. })
        ));
    }

    #[test]
    fn zero_states_error() {
        assert!(matches!(
            transition_counts(&[], 0),
            Err(ChainError::InvalidArgument { .. })
        ));
    }
}
