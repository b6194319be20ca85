//! Deterministic forward propagation of distributions through a chain.

use crate::distribution::Distribution;
use crate::error::ChainError;
use crate::matrix::TransitionMatrix;

/// Per-step mass drift beyond this triggers a defensive renormalization.
const DRIFT_TOL: f64 = 1e-12;

/// Advances `current` one step through the chain: `next = current · P`.
///
/// Lengths must match the matrix; callers validate.
pub(crate) fn step_in_place(matrix: &TransitionMatrix, current: &[f64], next: &mut [f64]) {
    next.fill(0.0);
    for (i, &mass) in current.iter().enumerate() {
        if mass == 0.0 {
            continue;
        }
        for (j, &p) in matrix.row(i).iter().enumerate() {
            next[j] += mass * p;
        }
    }
}

/// Propagates a distribution forward `steps` time steps.
///
/// Returns `[d_1, ..., d_steps]` where `d_{t+1} = d_t · P` and
/// `d_0 = initial`; the initial distribution itself is not echoed back.
/// Pure and deterministic. Each returned distribution sums to 1; when
/// accumulated floating error drifts the mass beyond `1e-12` the vector is
/// renormalized before it is stored.
///
/// # Errors
///
/// Returns [`ChainError::InvalidArgument`] if `steps` is 0 or the initial
/// distribution's length does not match the chain.
#[tracing::instrument(skip(matrix, initial), fields(n_states = matrix.n_states()))]
pub fn propagate(
    matrix: &TransitionMatrix,
    steps: usize,
    initial: &Distribution,
) -> Result<Vec<Distribution>, ChainError> {
    let n = matrix.n_states();
    if steps == 0 {
        return Err(ChainError::InvalidArgument {
            reason: "steps must be >= 1, got 0".to_string(),
        });
    }
    if initial.n_states() != n {
        return Err(ChainError::InvalidArgument {
            reason: format!(
                "initial distribution has {} states, matrix has {n}",
                initial.n_states()
            ),
        });
    }

    let mut current = initial.probs().to_vec();
    let mut next = vec![0.0; n];
    let mut series = Vec::with_capacity(steps);
    for _ in 0..steps {
        step_in_place(matrix, &current, &mut next);
        std::mem::swap(&mut current, &mut next);

        let sum: f64 = current.iter().sum();
        if (sum - 1.0).abs() > DRIFT_TOL {
            for v in &mut current {
                *v /= sum;
            }
        }
        series.push(Distribution::from_normalized(current.clone()));
    }
    Ok(series)
}

/// Propagates the point mass on state 0 forward `steps` time steps.
///
/// Convenience for the common "start the chain in its first state"
/// convention.
///
/// # Errors
///
/// Returns [`ChainError::InvalidArgument`] if `steps` is 0.
pub fn propagate_from_origin(
    matrix: &TransitionMatrix,
    steps: usize,
) -> Result<Vec<Distribution>, ChainError> {
    let origin = Distribution::point_mass(0, matrix.n_states())
        .expect("a valid matrix has at least one state");
    propagate(matrix, steps, &origin)
}
