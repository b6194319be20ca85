//! Stationary distribution of a transition matrix via eigen-decomposition.

use nalgebra::{DMatrix, DVector};
use tracing::debug;

use crate::EPS;
use crate::distribution::Distribution;
use crate::error::ChainError;
use crate::matrix::TransitionMatrix;
use crate::propagate::step_in_place;

/// Iteration cap for the reducible-chain fallback.
const FALLBACK_MAX_ITERS: usize = 100_000;
/// L1 threshold below which the fallback iteration counts as settled.
const FALLBACK_TOL: f64 = 1e-12;
/// Solutions with entries below this are numerical garbage, not residue.
const NEG_LIMIT: f64 = -1e-6;
/// Acceptable fixed-point residual for the direct solve.
const RESIDUAL_TOL: f64 = 1e-8;

/// Computes the stationary distribution `π` satisfying `π · P = π`.
///
/// The left eigenvector for eigenvalue 1 is extracted by LU-solving the
/// bordered system `(P^T - I)` with its last row replaced by the
/// normalization constraint `Σ π_i = 1`, after confirming via the complex
/// eigenvalue spectrum that a real eigenvalue within `1e-9` of 1 exists.
/// Tiny negative numerical residues are clamped to 0 and the result is
/// renormalized.
///
/// When eigenvalue 1 is degenerate (a reducible chain with more than one
/// recurrent class) the bordered system is singular and the solve falls
/// back to fixed-point iteration from the uniform distribution, a
/// deterministic choice that weights each recurrent class by the mass the
/// uniform distribution sends into it. Chains whose recurrent classes are
/// periodic never settle under that iteration and exhaust the cap.
///
/// # Errors
///
/// Returns [`ChainError::NonConvergent`] if no eigenvalue lies within
/// tolerance of 1 (does not occur for a validated row-stochastic matrix)
/// or the fallback iteration exhausts its budget.
#[tracing::instrument(skip(matrix), fields(n_states = matrix.n_states()))]
pub fn stationary(matrix: &TransitionMatrix) -> Result<Distribution, ChainError> {
    let n = matrix.n_states();
    let p_t = DMatrix::from_row_slice(n, n, matrix.probs()).transpose();

    // Eigenvalues can come back complex; accept one whose imaginary part
    // vanishes within tolerance and whose real part is 1 within tolerance.
    let eigenvalues = p_t.complex_eigenvalues();
    let has_unit = eigenvalues
        .iter()
        .any(|l| l.im.abs() <= EPS && (l.re - 1.0).abs() <= EPS);
    if !has_unit {
        return Err(ChainError::NonConvergent {
            reason: format!("no real eigenvalue within {EPS:e} of 1"),
        });
    }

    if let Some(pi) = solve_unit_eigenvector(matrix, &p_t) {
        return Ok(Distribution::from_normalized(pi));
    }

    debug!("unit eigenvalue is degenerate, falling back to fixed-point iteration");
    fallback_iteration(matrix)
}

/// Direct solve for the unit left eigenvector.
///
/// Returns `None` when the bordered system is singular (unit eigenvalue
/// with multiplicity > 1) or the candidate fails the fixed-point check.
fn solve_unit_eigenvector(matrix: &TransitionMatrix, p_t: &DMatrix<f64>) -> Option<Vec<f64>> {
    let n = matrix.n_states();
    let mut bordered = p_t - DMatrix::identity(n, n);
    for j in 0..n {
        bordered[(n - 1, j)] = 1.0;
    }
    let mut rhs = DVector::zeros(n);
    rhs[n - 1] = 1.0;

    let solution = bordered.lu().solve(&rhs)?;
    let pi = polish(solution.as_slice())?;

    // A near-singular system can slip past LU with a garbage solution;
    // only a genuine fixed point is accepted.
    let mut image = vec![0.0; n];
    step_in_place(matrix, &pi, &mut image);
    let residual = pi
        .iter()
        .zip(&image)
        .map(|(a, b)| (a - b).abs())
        .fold(0.0, f64::max);
    (residual <= RESIDUAL_TOL).then_some(pi)
}

/// Clamps tiny negative residues to zero and normalizes to sum 1.
///
/// Returns `None` if any entry is non-finite or negative beyond residue
/// scale, or the clamped vector has no mass left.
fn polish(raw: &[f64]) -> Option<Vec<f64>> {
    if raw.iter().any(|&v| !v.is_finite() || v < NEG_LIMIT) {
        return None;
    }
    let mut out: Vec<f64> = raw.iter().map(|&v| v.max(0.0)).collect();
    let sum: f64 = out.iter().sum();
    if sum <= 0.0 {
        return None;
    }
    for v in &mut out {
        *v /= sum;
    }
    Some(out)
}

/// Fixed-point iteration from the uniform distribution.
fn fallback_iteration(matrix: &TransitionMatrix) -> Result<Distribution, ChainError> {
    let n = matrix.n_states();
    let mut current = vec![1.0 / n as f64; n];
    let mut next = vec![0.0; n];
    for _ in 0..FALLBACK_MAX_ITERS {
        step_in_place(matrix, &current, &mut next);
        let moved: f64 = current
            .iter()
            .zip(&next)
            .map(|(a, b)| (a - b).abs())
            .sum();
        std::mem::swap(&mut current, &mut next);
        if moved <= FALLBACK_TOL {
            let pi = polish(&current).ok_or_else(|| ChainError::NonConvergent {
                reason: "fixed-point iterate lost all probability mass".to_string(),
            })?;
            return Ok(Distribution::from_normalized(pi));
        }
    }
    Err(ChainError::NonConvergent {
        reason: format!("fixed-point iteration did not settle within {FALLBACK_MAX_ITERS} steps"),
    })
}
