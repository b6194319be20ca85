//! Trajectory sampling from a transition matrix.

use rand::Rng;

use crate::distribution::Distribution;
use crate::error::ChainError;
use crate::matrix::TransitionMatrix;

/// Where a sampled trajectory begins.
#[derive(Debug, Clone)]
pub enum Start {
    /// Begin in a fixed state; it becomes the first element of the
    /// trajectory.
    State(usize),
    /// Draw the first state from a distribution over the chain's states.
    Draw(Distribution),
}

impl Default for Start {
    /// Point mass on state 0.
    fn default() -> Self {
        Start::State(0)
    }
}

/// Samples a state trajectory of length `steps`.
///
/// The first element is the start state (step 1); each subsequent element
/// is drawn from the transition row of its predecessor, consuming entropy
/// from `rng` only. Results are reproducible given a seeded `rng`.
///
/// # Errors
///
/// Returns [`ChainError::InvalidArgument`] if `steps` is 0, the start
/// state is out of range, or the start distribution's length does not
/// match the chain.
#[tracing::instrument(skip(matrix, start, rng), fields(n_states = matrix.n_states()))]
pub fn sample_trajectory(
    matrix: &TransitionMatrix,
    steps: usize,
    start: Start,
    rng: &mut impl Rng,
) -> Result<Vec<usize>, ChainError> {
    if steps == 0 {
        return Err(ChainError::InvalidArgument {
            reason: "steps must be >= 1, got 0".to_string(),
        });
    }
    let mut out = vec![0usize; steps];
    sample_trajectory_into(matrix, start, rng, &mut out)?;
    Ok(out)
}

/// Samples a state trajectory into a pre-allocated buffer.
///
/// The buffer length is the number of steps; its first slot receives the
/// start state.
///
/// # Errors
///
/// Returns [`ChainError::InvalidArgument`] if `out` is empty, the start
/// state is out of range, or the start distribution's length does not
/// match the chain.
pub fn sample_trajectory_into(
    matrix: &TransitionMatrix,
    start: Start,
    rng: &mut impl Rng,
    out: &mut [usize],
) -> Result<(), ChainError> {
    let n = matrix.n_states();
    if out.is_empty() {
        return Err(ChainError::InvalidArgument {
            reason: "output buffer is empty; a trajectory has at least one state".to_string(),
        });
    }
    let first = match start {
        Start::State(s) => {
            if s >= n {
                return Err(ChainError::InvalidArgument {
                    reason: format!("start state must be < {n}, got {s}"),
                });
            }
            s
        }
        Start::Draw(d) => {
            if d.n_states() != n {
                return Err(ChainError::InvalidArgument {
                    reason: format!(
                        "start distribution has {} states, matrix has {n}",
                        d.n_states()
                    ),
                });
            }
            d.sample(rng)
        }
    };

    out[0] = first;
    let mut current = first;
    for slot in out.iter_mut().skip(1) {
        current = matrix.sample_next(current, rng);
        *slot = current;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn three_state_chain() -> TransitionMatrix {
        TransitionMatrix::from_rows(vec![
            vec![0.6, 0.3, 0.1],
            vec![0.2, 0.3, 0.5],
            vec![0.4, 0.1, 0.5],
        ])
        .unwrap()
    }

    // 1. length_and_range
    #[test]
    fn length_and_range() {
        let m = three_state_chain();
        let mut rng = StdRng::seed_from_u64(42);
        let path = sample_trajectory(&m, 500, Start::default(), &mut rng).unwrap();
        assert_eq!(path.len(), 500);
        assert!(path.iter().all(|&s| s < 3));
    }

    // 2. first_element_is_start_state
    #[test]
    fn first_element_is_start_state() {
        let m = three_state_chain();
        let mut rng = StdRng::seed_from_u64(42);
        let path = sample_trajectory(&m, 10, Start::State(2), &mut rng).unwrap();
        assert_eq!(path[0], 2);
    }

    // 3. default_start_is_state_zero
    #[test]
    fn default_start_is_state_zero() {
        let m = three_state_chain();
        let mut rng = StdRng::seed_from_u64(42);
        let path = sample_trajectory(&m, 10, Start::default(), &mut rng).unwrap();
        assert_eq!(path[0], 0);
    }

    // 4. single_step_is_just_the_start
    #[test]
    fn single_step_is_just_the_start() {
        let m = three_state_chain();
        let mut rng = StdRng::seed_from_u64(42);
        let path = sample_trajectory(&m, 1, Start::State(1), &mut rng).unwrap();
        assert_eq!(path, vec![1]);
    }

    // 5. deterministic_with_seed
    #[test]
    fn deterministic_with_seed() {
        let m = three_state_chain();
        let mut rng1 = StdRng::seed_from_u64(123);
        let path1 = sample_trajectory(&m, 50, Start::State(0), &mut rng1).unwrap();
        let mut rng2 = StdRng::seed_from_u64(123);
        let path2 = sample_trajectory(&m, 50, Start::State(0), &mut rng2).unwrap();
        assert_eq!(path1, path2);
    }

    // 6. identity_preserves_state
    #[test]
    fn identity_preserves_state() {
        let m = TransitionMatrix::from_rows(vec![
            vec![1.0, 0.0, 0.0],
            vec![0.0, 1.0, 0.0],
            vec![0.0, 0.0, 1.0],
        ])
        .unwrap();
        let mut rng = StdRng::seed_from_u64(42);
        let path = sample_trajectory(&m, 50, Start::State(1), &mut rng).unwrap();
        assert!(path.iter().all(|&s| s == 1));
    }

    // 7. draw_start_from_point_mass
    #[test]
    fn draw_start_from_point_mass() {
        let m = three_state_chain();
        let d = Distribution::point_mass(2, 3).unwrap();
        let mut rng = StdRng::seed_from_u64(42);
        let path = sample_trajectory(&m, 10, Start::Draw(d), &mut rng).unwrap();
        assert_eq!(path[0], 2);
    }

    // 8. into_matches_allocating
    #[test]
    fn into_matches_allocating() {
        let m = three_state_chain();
        let mut rng1 = StdRng::seed_from_u64(999);
        let allocating = sample_trajectory(&m, 30, Start::State(0), &mut rng1).unwrap();

        let mut rng2 = StdRng::seed_from_u64(999);
        let mut buf = vec![0usize; 30];
        sample_trajectory_into(&m, Start::State(0), &mut rng2, &mut buf).unwrap();

        assert_eq!(allocating, buf);
    }

    // 9. zero_steps_error
    #[test]
    fn zero_steps_error() {
        let m = three_state_chain();
        let mut rng = StdRng::seed_from_u64(42);
        let result = sample_trajectory(&m, 0, Start::default(), &mut rng);
        assert!(matches!(result, Err(ChainError::InvalidArgument { .. })));
    }

    // 10. empty_buffer_error
    #[test]
    fn empty_buffer_error() {
        let m = three_state_chain();
        let mut rng = StdRng::seed_from_u64(42);
        let result = sample_trajectory_into(&m, Start::default(), &mut rng, &mut []);
        assert!(matches!(result, Err(ChainError::InvalidArgument { .. })));
    }

    // 11. start_state_out_of_range
    #[test]
    fn start_state_out_of_range() {
        let m = three_state_chain();
        let mut rng = StdRng::seed_from_u64(42);
        let result = sample_trajectory(&m, 10, Start::State(3), &mut rng);
        assert!(matches!(result, Err(ChainError::InvalidArgument { .. })));
    }

    // 12. start_distribution_wrong_size
    #[test]
    fn start_distribution_wrong_size() {
        let m = three_state_chain();
        let d = Distribution::uniform(4);
        let mut rng = StdRng::seed_from_u64(42);
        let result = sample_trajectory(&m, 10, Start::Draw(d), &mut rng);
        assert!(matches!(result, Err(ChainError::InvalidArgument { .. })));
    }
}
