//! One-step Bellman operators shared by every solver.
//!
//! All operators read a frozen value function and build a fresh result, so a
//! sweep never observes its own writes.

use crate::solver::{
    error::SolverError,
    mdp::Mdp,
    policy::{ExplicitPolicy, Policy},
    values::{ActionValueFunction, StateValueFunction},
};

/// Policy and value function pair produced by greedy extraction.
pub type GreedyResult<M> = (
    ExplicitPolicy<<M as Mdp>::State, <M as Mdp>::Action>,
    StateValueFunction<<M as Mdp>::State>,
);

/// Expected reward of executing `action` in `state` and then collecting the
/// discounted value of the successor under `v`.
///
/// `action` must be applicable in `state`. The operators do not revalidate
/// the model; the solver entry points run [`validate_mdp`](crate::validate_mdp)
/// first. Debug builds panic on an inapplicable pair, release builds read
/// whatever `next_states` returns for it.
pub fn one_step_lookahead<M>(
    mdp: &M,
    v: &StateValueFunction<M::State>,
    gamma: f64,
    state: &M::State,
    action: &M::Action,
) -> f64
where
    M: Mdp + ?Sized,
{
    debug_assert!(
        mdp.applicable_actions(state).contains(action),
        "action {action:?} is not applicable in state {state:?}"
    );
    mdp.next_states(state, action)
        .iter()
        .map(|outcome| outcome.prob * (outcome.reward + gamma * v.value(&outcome.state)))
        .sum()
}

/// Q-values as the one-step lookahead of `v` for every applicable pair.
pub fn compute_q_from_v<M>(
    mdp: &M,
    v: &StateValueFunction<M::State>,
    gamma: f64,
) -> ActionValueFunction<M::State, M::Action>
where
    M: Mdp + ?Sized,
{
    compute_q_from_v_states(mdp, v, gamma, &mdp.states())
}

/// Q-values restricted to `states`.
pub fn compute_q_from_v_states<M>(
    mdp: &M,
    v: &StateValueFunction<M::State>,
    gamma: f64,
    states: &[M::State],
) -> ActionValueFunction<M::State, M::Action>
where
    M: Mdp + ?Sized,
{
    let mut q = ActionValueFunction::new();
    for state in states {
        for action in mdp.applicable_actions(state) {
            let value = one_step_lookahead(mdp, v, gamma, state, &action);
            q.set_value(state.clone(), action, value);
        }
    }
    q
}

/// Best applicable action in `state` according to `q`, with its value.
///
/// Ties keep the first maximal action in enumeration order.
pub fn greedy_action<M>(
    mdp: &M,
    q: &ActionValueFunction<M::State, M::Action>,
    state: &M::State,
) -> Result<(M::Action, f64), SolverError>
where
    M: Mdp + ?Sized,
{
    let mut best: Option<(M::Action, f64)> = None;
    for action in mdp.applicable_actions(state) {
        let value = q.value(state, &action);
        best = match best {
            Some((_, best_value)) if best_value < value => Some((action, value)),
            None => Some((action, value)),
            kept => kept,
        };
    }
    best.ok_or_else(|| SolverError::no_applicable_actions(state))
}

/// Greedy policy of `q` over every state, with the associated values.
pub fn greedy_policy<M>(
    mdp: &M,
    q: &ActionValueFunction<M::State, M::Action>,
) -> Result<GreedyResult<M>, SolverError>
where
    M: Mdp + ?Sized,
{
    greedy_policy_states(mdp, q, &mdp.states())
}

/// Greedy policy of `q` restricted to `states`.
pub fn greedy_policy_states<M>(
    mdp: &M,
    q: &ActionValueFunction<M::State, M::Action>,
    states: &[M::State],
) -> Result<GreedyResult<M>, SolverError>
where
    M: Mdp + ?Sized,
{
    let mut policy = ExplicitPolicy::new();
    let mut values = StateValueFunction::new();
    for state in states {
        let (action, value) = greedy_action(mdp, q, state)?;
        policy.set_action(state.clone(), action);
        values.set_value(state.clone(), value);
    }
    Ok((policy, values))
}

/// State values obtained by following `policy` for one step under `q`.
pub fn compute_v_from_q_and_policy<M, P>(
    mdp: &M,
    policy: &P,
    q: &ActionValueFunction<M::State, M::Action>,
) -> Result<StateValueFunction<M::State>, SolverError>
where
    M: Mdp + ?Sized,
    P: Policy<M> + ?Sized,
{
    let mut values = StateValueFunction::new();
    for state in mdp.states() {
        let action = policy.action(mdp, &state)?;
        let value = q
            .get(&state, &action)
            .ok_or_else(|| SolverError::unknown_action(&action))?;
        values.set_value(state, value);
    }
    Ok(values)
}

/// One full Bellman optimality sweep: the greedy policy of the lookahead of `v`.
pub fn bellman_backup<M>(
    mdp: &M,
    v: &StateValueFunction<M::State>,
    gamma: f64,
) -> Result<GreedyResult<M>, SolverError>
where
    M: Mdp + ?Sized,
{
    let q = compute_q_from_v(mdp, v, gamma);
    greedy_policy(mdp, &q)
}

/// Bellman optimality sweep restricted to `states`.
pub fn bellman_backup_states<M>(
    mdp: &M,
    v: &StateValueFunction<M::State>,
    gamma: f64,
    states: &[M::State],
) -> Result<GreedyResult<M>, SolverError>
where
    M: Mdp + ?Sized,
{
    let q = compute_q_from_v_states(mdp, v, gamma, states);
    greedy_policy_states(mdp, &q, states)
}
