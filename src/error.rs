//! Error types for the ergode crate.

/// Error type for all fallible operations in the ergode crate.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ChainError {
    /// Returned when a transition matrix is malformed: not square, entries
    /// outside `[0, 1]` or non-finite, or a row sum off from 1 beyond
    /// tolerance. Raised at construction; a constructed matrix is always
    /// valid.
    #[error("invalid transition matrix: {reason}")]
    InvalidMatrix {
        /// Description of the problem.
        reason: String,
    },

    /// Returned when a caller-supplied argument is unusable: zero steps, a
    /// state index outside `[0, n)`, a distribution whose length does not
    /// match the chain, or a malformed probability vector.
    #[error("invalid argument: {reason}")]
    InvalidArgument {
        /// Description of the problem.
        reason: String,
    },

    /// Returned when the stationary solve finds no eigenvalue within
    /// tolerance of 1, or the reducible-chain fallback iteration exhausts
    /// its budget without settling.
    #[error("stationary solve did not converge: {reason}")]
    NonConvergent {
        /// Description of the problem.
        reason: String,
    },
}
