//! Discrete-time, finite-state, homogeneous Markov chains.
//!
//! Everything revolves around a validated, immutable row-stochastic
//! [`TransitionMatrix`]. Three consumers read it independently, and an
//! estimator closes the loop from observed data back to a matrix:
//!
//! ```text
//!                      ┌──────────────────────────────────┐
//!  ┌────────────────┐  │ sample_trajectory   (random walk) │
//!  │ TransitionMatrix│─▶│ propagate           (exact d·P)   │
//!  │ (row-stochastic)│  │ stationary          (eigen-solve) │
//!  └────────────────┘  └──────────────────────────────────┘
//!          ▲                          │ trajectory
//!          │     ┌────────────────────▼───────────────────┐
//!          └─────│ estimate: counts, probabilities,        │
//!                │ lag-2-conditioned tables, occupancy     │
//!                └────────────────────────────────────────┘
//! ```
//!
//! Sampling takes an injected [`rand::Rng`], so results are reproducible
//! from a seed; propagation and the stationary solve are fully
//! deterministic. Nothing here does I/O or holds state across calls.
//!
//! # Quick start
//!
//! ```rust
//! use ergode::{Start, TransitionMatrix, sample_trajectory, stationary, transition_probabilities};
//! use rand::SeedableRng;
//! use rand::rngs::StdRng;
//!
//! let matrix = TransitionMatrix::from_rows(vec![
//!     vec![0.6, 0.3, 0.1],
//!     vec![0.2, 0.3, 0.5],
//!     vec![0.4, 0.1, 0.5],
//! ])?;
//!
//! let mut rng = StdRng::seed_from_u64(42);
//! let path = sample_trajectory(&matrix, 10_000, Start::default(), &mut rng)?;
//! assert_eq!(path.len(), 10_000);
//!
//! // Long-run behavior two ways: eigen-solve and empirical re-estimation.
//! let pi = stationary(&matrix)?;
//! assert!((pi.probs().iter().sum::<f64>() - 1.0).abs() < 1e-9);
//! let estimated = transition_probabilities(&path, matrix.n_states())?;
//! assert!((estimated[0][1] - 0.3).abs() < 0.05);
//! # Ok::<(), ergode::ChainError>(())
//! ```

pub mod distribution;
pub mod error;
pub mod estimate;
pub mod matrix;
pub mod propagate;
pub mod sample;
pub mod stationary;

pub use distribution::Distribution;
pub use error::ChainError;
pub use estimate::{
    CountTable, conditioned_counts, occupancy, transition_counts, transition_probabilities,
};
pub use matrix::TransitionMatrix;
pub use propagate::{propagate, propagate_from_origin};
pub use sample::{Start, sample_trajectory, sample_trajectory_into};
pub use stationary::stationary;

/// Floating tolerance for row sums and probability mass.
pub(crate) const EPS: f64 = 1e-9;
