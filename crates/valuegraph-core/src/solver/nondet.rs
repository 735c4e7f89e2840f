//! Conservative non-deterministic policies.
//!
//! A non-deterministic policy allows a set of actions per state. It is
//! conservative `subopt_epsilon`-optimal when, even if an adversary always
//! picks the worst allowed action, every state keeps at least
//! `(1 - subopt_epsilon)` times its optimal value.

use crate::solver::{
    bellman::compute_q_from_v,
    config::IterationBudget,
    error::{SolverError, check_gamma, check_subopt_epsilon, check_tolerance},
    iteration::run_value_iteration,
    mdp::{Mdp, PROB_TOLERANCE, validate_mdp},
    policy::NdPolicy,
    values::{ActionValueFunction, StateValueFunction, state_value_difference},
};

/// Candidate counts above this make the augmentation search noticeably slow.
const LARGE_AUGMENTATION_SEARCH: usize = 20;

/// Q-values used by the worst-case operators; identical to the
/// deterministic lookahead.
pub fn nd_compute_q_from_v<M>(
    mdp: &M,
    v: &StateValueFunction<M::State>,
    gamma: f64,
) -> ActionValueFunction<M::State, M::Action>
where
    M: Mdp + ?Sized,
{
    compute_q_from_v(mdp, v, gamma)
}

/// Worst-case state values: the minimum Q-value over the allowed actions.
pub fn nd_compute_v_from_q_and_policy<M>(
    mdp: &M,
    policy: &NdPolicy<M::State, M::Action>,
    q: &ActionValueFunction<M::State, M::Action>,
) -> Result<StateValueFunction<M::State>, SolverError>
where
    M: Mdp + ?Sized,
{
    let mut values = StateValueFunction::new();
    for state in mdp.states() {
        let worst = policy
            .actions(&state)?
            .iter()
            .map(|action| q.value(&state, action))
            .reduce(f64::min)
            .ok_or_else(|| SolverError::no_applicable_actions(&state))?;
        values.set_value(state, worst);
    }
    Ok(values)
}

/// Worst applicable action in `state`, with its value.
///
/// Ties keep the first minimal action in enumeration order.
pub fn nd_greedy_action<M>(
    mdp: &M,
    q: &ActionValueFunction<M::State, M::Action>,
    state: &M::State,
) -> Result<(M::Action, f64), SolverError>
where
    M: Mdp + ?Sized,
{
    let mut worst: Option<(M::Action, f64)> = None;
    for action in mdp.applicable_actions(state) {
        let value = q.value(state, &action);
        worst = match worst {
            Some((_, worst_value)) if worst_value > value => Some((action, value)),
            None => Some((action, value)),
            kept => kept,
        };
    }
    worst.ok_or_else(|| SolverError::no_applicable_actions(state))
}

/// Single-action policy picking the worst action everywhere, with its values.
pub fn nd_greedy_policy<M>(
    mdp: &M,
    q: &ActionValueFunction<M::State, M::Action>,
) -> Result<(NdPolicy<M::State, M::Action>, StateValueFunction<M::State>), SolverError>
where
    M: Mdp + ?Sized,
{
    let mut policy = NdPolicy::new();
    let mut values = StateValueFunction::new();
    for state in mdp.states() {
        let (action, value) = nd_greedy_action(mdp, q, &state)?;
        policy.add(state.clone(), action);
        values.set_value(state, value);
    }
    Ok((policy, values))
}

/// Whether `v_nd(s) >= (1 - subopt_epsilon) * v_opt(s)` in every state.
pub fn nd_is_policy_nearly_greedy<M>(
    mdp: &M,
    v_nd: &StateValueFunction<M::State>,
    v_opt: &StateValueFunction<M::State>,
    subopt_epsilon: f64,
) -> bool
where
    M: Mdp + ?Sized,
{
    mdp.states()
        .iter()
        .all(|state| v_nd.value(state) >= (1.0 - subopt_epsilon) * v_opt.value(state))
}

/// Worst-case value of `policy`, iterated from zero for at most
/// `max_iteration` sweeps.
///
/// When the sweep bound is reached first, the last iterate is returned.
pub fn compute_nd_policy_value<M>(
    mdp: &M,
    policy: &NdPolicy<M::State, M::Action>,
    gamma: f64,
    epsilon: f64,
    max_iteration: usize,
) -> Result<StateValueFunction<M::State>, SolverError>
where
    M: Mdp + ?Sized,
{
    let mut current = StateValueFunction::new();
    let mut residual = f64::INFINITY;

    for _ in 0..max_iteration {
        let q = nd_compute_q_from_v(mdp, &current, gamma);
        let next = nd_compute_v_from_q_and_policy(mdp, policy, &q)?;
        residual = state_value_difference(mdp, &current, &next);
        current = next;
        if residual < epsilon {
            return Ok(current);
        }
    }

    tracing::warn!(
        max_iteration,
        residual,
        "worst-case evaluation stopped before converging"
    );
    Ok(current)
}

/// Compute a maximal conservative non-deterministic policy.
///
/// Starts from the optimal deterministic policy, whose worst-case
/// evaluation is the reference value. Repairs the policy until its
/// worst-case value is within `subopt_epsilon` of that reference, then adds the
/// largest set of extra `(state, action)` pairs that keeps the guarantee.
/// Among equally large sets the first in enumeration order wins.
///
/// The augmentation step enumerates subsets of all missing pairs and is
/// exponential in their number: only use it on small models.
pub fn compute_non_augmentable_policy<M>(
    mdp: &M,
    gamma: f64,
    epsilon: f64,
    subopt_epsilon: f64,
    max_iteration: usize,
) -> Result<NdPolicy<M::State, M::Action>, SolverError>
where
    M: Mdp + ?Sized,
{
    check_gamma(gamma)?;
    check_tolerance("epsilon", epsilon)?;
    check_subopt_epsilon(subopt_epsilon)?;
    if max_iteration == 0 {
        return Err(SolverError::InvalidParameter {
            name: "max_iteration",
            message: "must be greater than 0".to_string(),
        });
    }
    validate_mdp(mdp, PROB_TOLERANCE)?;
    run_non_augmentable_policy(mdp, gamma, epsilon, subopt_epsilon, max_iteration)
}

pub(crate) fn run_non_augmentable_policy<M>(
    mdp: &M,
    gamma: f64,
    epsilon: f64,
    subopt_epsilon: f64,
    max_iteration: usize,
) -> Result<NdPolicy<M::State, M::Action>, SolverError>
where
    M: Mdp + ?Sized,
{
    let (baseline, _) = run_value_iteration(mdp, gamma, epsilon, IterationBudget::Unbounded)?;
    let mut policy = NdPolicy::from_policy(mdp, &baseline)?;
    // Candidates are measured against the baseline evaluated by the same
    // worst-case iteration.
    let optimal = compute_nd_policy_value(mdp, &policy, gamma, epsilon, max_iteration)?;

    let mut repairs = 0;
    loop {
        let worst_case = compute_nd_policy_value(mdp, &policy, gamma, epsilon, max_iteration)?;
        if nd_is_policy_nearly_greedy(mdp, &worst_case, &optimal, subopt_epsilon) {
            break;
        }
        if repairs >= max_iteration {
            return Err(SolverError::Convergence {
                algorithm: "non-deterministic policy repair",
                sweeps: repairs,
                residual: state_value_difference(mdp, &worst_case, &optimal),
            });
        }
        let q = nd_compute_q_from_v(mdp, &worst_case, gamma);
        (policy, _) = nd_greedy_policy(mdp, &q)?;
        repairs += 1;
    }
    tracing::debug!(repairs, "conservative seed policy found");

    let candidates: Vec<(M::State, M::Action)> = mdp
        .states()
        .into_iter()
        .flat_map(|state| {
            mdp.applicable_actions(&state)
                .into_iter()
                .filter(|action| !policy.allows(&state, action))
                .map(|action| (state.clone(), action))
                .collect::<Vec<_>>()
        })
        .collect();

    if candidates.len() > LARGE_AUGMENTATION_SEARCH {
        tracing::warn!(
            candidates = candidates.len(),
            "augmentation search is exponential in the number of candidate pairs"
        );
    }

    let keeps_guarantee = |chosen: &[usize]| -> Result<bool, SolverError> {
        let mut extended = policy.clone();
        for &idx in chosen {
            let (state, action) = &candidates[idx];
            extended.add(state.clone(), action.clone());
        }
        let worst_case = compute_nd_policy_value(mdp, &extended, gamma, epsilon, max_iteration)?;
        Ok(nd_is_policy_nearly_greedy(
            mdp,
            &worst_case,
            &optimal,
            subopt_epsilon,
        ))
    };

    let mut best: Option<Vec<usize>> = None;
    'sizes: for size in (1..=candidates.len()).rev() {
        for chosen in Combinations::new(candidates.len(), size) {
            if keeps_guarantee(&chosen)? {
                best = Some(chosen);
                break 'sizes;
            }
        }
    }

    match best {
        Some(chosen) => {
            tracing::debug!(added = chosen.len(), "policy augmented");
            for idx in chosen {
                let (state, action) = candidates[idx].clone();
                policy.add(state, action);
            }
        }
        None => tracing::debug!("no pair can be added without breaking the guarantee"),
    }

    Ok(policy)
}

/// Lexicographic enumeration of the `k`-element subsets of `0..n`.
struct Combinations {
    n: usize,
    current: Option<Vec<usize>>,
}

impl Combinations {
    fn new(n: usize, k: usize) -> Self {
        let current = (k <= n).then(|| (0..k).collect());
        Combinations { n, current }
    }
}

impl Iterator for Combinations {
    type Item = Vec<usize>;

    fn next(&mut self) -> Option<Self::Item> {
        let result = self.current.clone()?;
        let k = result.len();

        // Advance to the next combination, or stop after the last one.
        let mut next = result.clone();
        let pivot = (0..k).rev().find(|&i| next[i] < self.n - k + i);
        self.current = pivot.map(|i| {
            next[i] += 1;
            for j in i + 1..k {
                next[j] = next[j - 1] + 1;
            }
            next
        });

        Some(result)
    }
}
