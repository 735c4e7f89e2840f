use std::{collections::HashSet, fmt::Debug, hash::Hash};

use crate::solver::error::SolverError;

/// Floating point tolerance used when validating probability sums.
pub const PROB_TOLERANCE: f64 = 1e-9;

/// One possible result of executing an action in a state.
#[derive(Debug, Clone, PartialEq)]
pub struct ActionOutcome<S> {
    /// Probability of this outcome, in `(0, 1]`.
    pub prob: f64,
    /// State the process ends up in.
    pub state: S,
    /// Reward collected on this transition.
    pub reward: f64,
}

impl<S> ActionOutcome<S> {
    pub fn new(prob: f64, state: S, reward: f64) -> Self {
        ActionOutcome { prob, state, reward }
    }
}

/// Interface of a finite Markov Decision Process.
///
/// States and actions are value types compared through `Eq`/`Hash`; solvers
/// key their containers on them. Every method must be pure, and the
/// enumerations returned by `states` and `actions` must be stable while a
/// solver runs.
pub trait Mdp {
    type State: Clone + Eq + Hash + Debug;
    type Action: Clone + Eq + Hash + Debug;

    /// Enumerate every state of the model.
    fn states(&self) -> Vec<Self::State>;

    /// Enumerate every action of the model.
    fn actions(&self) -> Vec<Self::Action>;

    /// Actions that may be executed in `state`, in a stable order.
    /// Must be non-empty for every state.
    fn applicable_actions(&self, state: &Self::State) -> Vec<Self::Action>;

    /// Outcomes of executing `action` in `state`; probabilities sum to 1.
    /// Callers only pass actions applicable in `state`.
    fn next_states(
        &self,
        state: &Self::State,
        action: &Self::Action,
    ) -> Vec<ActionOutcome<Self::State>>;

    /// Return the initial state of the process.
    fn initial_state(&self) -> Self::State;
}

impl<M> Mdp for &M
where
    M: Mdp + ?Sized,
{
    type State = M::State;
    type Action = M::Action;

    fn states(&self) -> Vec<Self::State> {
        (**self).states()
    }

    fn actions(&self) -> Vec<Self::Action> {
        (**self).actions()
    }

    fn applicable_actions(&self, state: &Self::State) -> Vec<Self::Action> {
        (**self).applicable_actions(state)
    }

    fn next_states(
        &self,
        state: &Self::State,
        action: &Self::Action,
    ) -> Vec<ActionOutcome<Self::State>> {
        (**self).next_states(state, action)
    }

    fn initial_state(&self) -> Self::State {
        (**self).initial_state()
    }
}

/// Validate the MDP contract over every declared state.
///
/// Checks that each state has an applicable action, that every applicable
/// action is declared, and that outcomes are well formed: at least one,
/// probabilities in `(0, 1]` summing to 1 within `tolerance`, finite rewards,
/// and declared successor states.
pub fn validate_mdp<M>(mdp: &M, tolerance: f64) -> Result<(), SolverError>
where
    M: Mdp + ?Sized,
{
    let states = mdp.states();
    let known_states: HashSet<&M::State> = states.iter().collect();
    let known_actions: HashSet<M::Action> = mdp.actions().into_iter().collect();

    for state in &states {
        let applicable = mdp.applicable_actions(state);
        if applicable.is_empty() {
            return Err(SolverError::no_applicable_actions(state));
        }

        for action in &applicable {
            if !known_actions.contains(action) {
                return Err(SolverError::unknown_action(action));
            }

            let outcomes = mdp.next_states(state, action);
            if outcomes.is_empty() {
                return Err(SolverError::Domain {
                    message: format!("state {state:?} action {action:?} has no outcome"),
                });
            }

            let mut sum = 0.0_f64;
            for (i, outcome) in outcomes.iter().enumerate() {
                if !outcome.prob.is_finite() || outcome.prob <= 0.0 || outcome.prob > 1.0 {
                    return Err(SolverError::Domain {
                        message: format!(
                            "state {state:?} action {action:?} outcome {i} has probability {}",
                            outcome.prob
                        ),
                    });
                }
                if !outcome.reward.is_finite() {
                    return Err(SolverError::Domain {
                        message: format!(
                            "state {state:?} action {action:?} outcome {i} has reward {}",
                            outcome.reward
                        ),
                    });
                }
                if !known_states.contains(&outcome.state) {
                    return Err(SolverError::unknown_state(&outcome.state));
                }
                sum += outcome.prob;
            }

            if (sum - 1.0).abs() > tolerance {
                return Err(SolverError::Domain {
                    message: format!(
                        "probabilities of state {state:?} action {action:?} sum to {sum}, expected 1 within {tolerance}"
                    ),
                });
            }
        }
    }

    Ok(())
}
