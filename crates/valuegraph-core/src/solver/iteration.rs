//! Fixed-point solvers built on the Bellman operators.
//!
//! With `gamma < 1` every loop below is a contraction and terminates. With
//! `gamma >= 1` termination is the caller's responsibility; the
//! `*_with_budget` variants bound the number of sweeps.

use crate::solver::{
    bellman::{
        GreedyResult, bellman_backup, compute_q_from_v, compute_v_from_q_and_policy,
        greedy_action, greedy_policy,
    },
    config::IterationBudget,
    error::{SolverError, check_gamma, check_tolerance},
    mdp::{Mdp, PROB_TOLERANCE, validate_mdp},
    policy::{ExplicitPolicy, Policy},
    values::{ActionValueFunction, StateValueFunction, state_value_difference},
};

/// Evaluate `policy` by repeated one-step backups until successive iterates
/// differ by less than `threshold`.
pub fn compute_v_of_policy<M, P>(
    mdp: &M,
    policy: &P,
    gamma: f64,
    threshold: f64,
    starting_value: Option<StateValueFunction<M::State>>,
) -> Result<StateValueFunction<M::State>, SolverError>
where
    M: Mdp + ?Sized,
    P: Policy<M> + ?Sized,
{
    compute_v_of_policy_with_budget(
        mdp,
        policy,
        gamma,
        threshold,
        starting_value,
        IterationBudget::Unbounded,
    )
}

/// Policy evaluation with a sweep budget.
pub fn compute_v_of_policy_with_budget<M, P>(
    mdp: &M,
    policy: &P,
    gamma: f64,
    threshold: f64,
    starting_value: Option<StateValueFunction<M::State>>,
    budget: IterationBudget,
) -> Result<StateValueFunction<M::State>, SolverError>
where
    M: Mdp + ?Sized,
    P: Policy<M> + ?Sized,
{
    check_gamma(gamma)?;
    check_tolerance("threshold", threshold)?;
    validate_mdp(mdp, PROB_TOLERANCE)?;
    evaluate_policy(mdp, policy, gamma, threshold, starting_value, budget)
}

pub(crate) fn evaluate_policy<M, P>(
    mdp: &M,
    policy: &P,
    gamma: f64,
    threshold: f64,
    starting_value: Option<StateValueFunction<M::State>>,
    budget: IterationBudget,
) -> Result<StateValueFunction<M::State>, SolverError>
where
    M: Mdp + ?Sized,
    P: Policy<M> + ?Sized,
{
    let mut current = starting_value.unwrap_or_default();
    let mut sweeps = 0;
    let mut residual = f64::INFINITY;

    while budget.allows(sweeps) {
        let q = compute_q_from_v(mdp, &current, gamma);
        let next = compute_v_from_q_and_policy(mdp, policy, &q)?;
        residual = state_value_difference(mdp, &current, &next);
        sweeps += 1;
        tracing::trace!(sweeps, residual, "policy evaluation sweep");

        if residual < threshold {
            tracing::debug!(sweeps, residual, "policy evaluation converged");
            return Ok(next);
        }
        current = next;
    }

    Err(SolverError::Convergence {
        algorithm: "policy evaluation",
        sweeps,
        residual,
    })
}

/// Value iteration from the zero value function.
///
/// Returns the greedy policy of the last sweep and its values once the
/// residual falls below `epsilon`.
pub fn value_iteration<M>(
    mdp: &M,
    gamma: f64,
    epsilon: f64,
) -> Result<GreedyResult<M>, SolverError>
where
    M: Mdp + ?Sized,
{
    value_iteration_with_budget(mdp, gamma, epsilon, IterationBudget::Unbounded)
}

/// Value iteration with a sweep budget.
pub fn value_iteration_with_budget<M>(
    mdp: &M,
    gamma: f64,
    epsilon: f64,
    budget: IterationBudget,
) -> Result<GreedyResult<M>, SolverError>
where
    M: Mdp + ?Sized,
{
    check_gamma(gamma)?;
    check_tolerance("epsilon", epsilon)?;
    validate_mdp(mdp, PROB_TOLERANCE)?;
    run_value_iteration(mdp, gamma, epsilon, budget)
}

pub(crate) fn run_value_iteration<M>(
    mdp: &M,
    gamma: f64,
    epsilon: f64,
    budget: IterationBudget,
) -> Result<GreedyResult<M>, SolverError>
where
    M: Mdp + ?Sized,
{
    let mut current = StateValueFunction::new();
    let mut sweeps = 0;
    let mut residual = f64::INFINITY;

    while budget.allows(sweeps) {
        let (policy, next) = bellman_backup(mdp, &current, gamma)?;
        residual = state_value_difference(mdp, &current, &next);
        sweeps += 1;
        tracing::trace!(sweeps, residual, "value iteration sweep");

        if residual < epsilon {
            tracing::debug!(sweeps, residual, "value iteration converged");
            return Ok((policy, next));
        }
        current = next;
    }

    Err(SolverError::Convergence {
        algorithm: "value iteration",
        sweeps,
        residual,
    })
}

/// Whether the action `policy` picks in every state is worth at least the
/// greedy value minus `epsilon` under `q`.
pub fn is_policy_nearly_greedy<M, P>(
    mdp: &M,
    policy: &P,
    epsilon: f64,
    q: &ActionValueFunction<M::State, M::Action>,
) -> Result<bool, SolverError>
where
    M: Mdp + ?Sized,
    P: Policy<M> + ?Sized,
{
    for state in mdp.states() {
        let action = policy.action(mdp, &state)?;
        let chosen = q
            .get(&state, &action)
            .ok_or_else(|| SolverError::unknown_action(&action))?;
        let (_, greedy) = greedy_action(mdp, q, &state)?;
        if chosen + epsilon < greedy {
            return Ok(false);
        }
    }
    Ok(true)
}

/// Policy iteration: evaluate the current policy to `stopping_threshold`,
/// stop once it is `epsilon`-nearly greedy for its own Q-values, otherwise
/// switch to the greedy policy.
pub fn policy_iteration<M>(
    mdp: &M,
    gamma: f64,
    epsilon: f64,
    stopping_threshold: f64,
    initial_policy: Option<ExplicitPolicy<M::State, M::Action>>,
) -> Result<ExplicitPolicy<M::State, M::Action>, SolverError>
where
    M: Mdp + ?Sized,
{
    policy_iteration_with_budget(
        mdp,
        gamma,
        epsilon,
        stopping_threshold,
        initial_policy,
        IterationBudget::Unbounded,
    )
}

/// Policy iteration with a budget applied to the number of improvement
/// rounds and to each evaluation.
pub fn policy_iteration_with_budget<M>(
    mdp: &M,
    gamma: f64,
    epsilon: f64,
    stopping_threshold: f64,
    initial_policy: Option<ExplicitPolicy<M::State, M::Action>>,
    budget: IterationBudget,
) -> Result<ExplicitPolicy<M::State, M::Action>, SolverError>
where
    M: Mdp + ?Sized,
{
    check_gamma(gamma)?;
    check_tolerance("epsilon", epsilon)?;
    check_tolerance("stopping_threshold", stopping_threshold)?;
    validate_mdp(mdp, PROB_TOLERANCE)?;
    run_policy_iteration(
        mdp,
        gamma,
        epsilon,
        stopping_threshold,
        initial_policy,
        budget,
    )
}

pub(crate) fn run_policy_iteration<M>(
    mdp: &M,
    gamma: f64,
    epsilon: f64,
    stopping_threshold: f64,
    initial_policy: Option<ExplicitPolicy<M::State, M::Action>>,
    budget: IterationBudget,
) -> Result<ExplicitPolicy<M::State, M::Action>, SolverError>
where
    M: Mdp + ?Sized,
{
    let mut policy = initial_policy.unwrap_or_default();
    let mut rounds = 0;

    while budget.allows(rounds) {
        let v = evaluate_policy(mdp, &policy, gamma, stopping_threshold, None, budget)?;
        let q = compute_q_from_v(mdp, &v, gamma);
        rounds += 1;

        if is_policy_nearly_greedy(mdp, &policy, epsilon, &q)? {
            tracing::debug!(rounds, "policy iteration converged");
            return Ok(policy);
        }
        tracing::trace!(rounds, "policy iteration improvement");
        (policy, _) = greedy_policy(mdp, &q)?;
    }

    Err(SolverError::Convergence {
        algorithm: "policy iteration",
        sweeps: rounds,
        residual: f64::NAN,
    })
}
