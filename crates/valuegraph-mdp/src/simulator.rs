use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;
use valuegraph_core::{ActionOutcome, Mdp, PROB_TOLERANCE, Policy, SolverError, validate_mdp};

use crate::{History, MdpError};

/// Seeded simulator executing policies on an MDP.
///
/// The same seed, model and policy always produce the same history.
#[derive(Debug, Clone)]
pub struct Simulator<M> {
    mdp: M,
    rng: ChaCha8Rng,
}

impl<M> Simulator<M>
where
    M: Mdp,
{
    /// Validate `mdp` and create a simulator with a deterministic seed.
    pub fn new(mdp: M, seed: u64) -> Result<Self, MdpError> {
        validate_mdp(&mdp, PROB_TOLERANCE)?;
        Ok(Self {
            mdp,
            rng: ChaCha8Rng::seed_from_u64(seed),
        })
    }

    /// Borrow the simulated MDP.
    pub fn mdp(&self) -> &M {
        &self.mdp
    }

    /// Give the simulated MDP back.
    pub fn into_mdp(self) -> M {
        self.mdp
    }

    /// Sample one `(next_state, reward)` transition.
    ///
    /// Fails with [`SolverError::UnknownEntity`] when `action` is not
    /// applicable in `state`.
    pub fn step(
        &mut self,
        state: &M::State,
        action: &M::Action,
    ) -> Result<(M::State, f64), MdpError> {
        if !self.mdp.applicable_actions(state).contains(action) {
            return Err(SolverError::UnknownEntity {
                kind: "action",
                entity: format!("{action:?} in state {state:?}"),
            }
            .into());
        }
        let outcomes = self.mdp.next_states(state, action);
        let sample = (self.rng.next_u64() as f64) / ((u64::MAX as f64) + 1.0);
        let outcome = pick_outcome(outcomes, sample).ok_or_else(|| MdpError::Sampling {
            state: format!("{state:?}"),
            action: format!("{action:?}"),
        })?;
        Ok((outcome.state, outcome.reward))
    }

    /// Execute `policy` for `steps` steps from the initial state.
    pub fn simulate<P>(
        &mut self,
        policy: &P,
        steps: usize,
    ) -> Result<History<M::State, M::Action>, MdpError>
    where
        P: Policy<M> + ?Sized,
    {
        let initial = self.mdp.initial_state();
        self.simulate_from(policy, initial, steps)
    }

    /// Execute `policy` for `steps` steps from `start`.
    pub fn simulate_from<P>(
        &mut self,
        policy: &P,
        start: M::State,
        steps: usize,
    ) -> Result<History<M::State, M::Action>, MdpError>
    where
        P: Policy<M> + ?Sized,
    {
        let mut history = History::new(start);
        for _ in 0..steps {
            let current = history.last_state().clone();
            let action = policy.action(&self.mdp, &current)?;
            let (next, reward) = self.step(&current, &action)?;
            tracing::trace!(state = ?current, action = ?action, reward, "simulated step");
            history.push(action, reward, next);
        }
        Ok(history)
    }
}

/// Outcome whose cumulative probability first reaches `sample`.
///
/// Rounding can leave the total slightly below 1; samples past it fall on
/// the last outcome.
fn pick_outcome<S>(outcomes: Vec<ActionOutcome<S>>, sample: f64) -> Option<ActionOutcome<S>> {
    let cdf: Vec<f64> = outcomes
        .iter()
        .scan(0.0_f64, |cumulative, outcome| {
            *cumulative += outcome.prob;
            Some(*cumulative)
        })
        .collect();

    let chosen = cdf.partition_point(|p| *p < sample).min(outcomes.len().checked_sub(1)?);
    outcomes.into_iter().nth(chosen)
}

#[cfg(test)]
mod tests {
    use valuegraph_core::ActionOutcome;

    use super::pick_outcome;

    fn outcomes() -> Vec<ActionOutcome<char>> {
        vec![
            ActionOutcome::new(0.2, 'a', 0.0),
            ActionOutcome::new(0.5, 'b', 0.0),
            ActionOutcome::new(0.3, 'c', 0.0),
        ]
    }

    #[test]
    fn samples_follow_cumulative_probabilities() {
        let pick = |sample| pick_outcome(outcomes(), sample).map(|o| o.state);
        assert_eq!(pick(0.0), Some('a'));
        assert_eq!(pick(0.1999), Some('a'));
        assert_eq!(pick(0.35), Some('b'));
        assert_eq!(pick(0.9), Some('c'));
        assert_eq!(pick(0.999_999_999_999), Some('c'));
    }

    #[test]
    fn no_outcome_cannot_be_sampled() {
        assert!(pick_outcome(Vec::<ActionOutcome<char>>::new(), 0.5).is_none());
    }
}
