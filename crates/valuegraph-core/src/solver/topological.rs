use crate::solver::{
    bellman::{GreedyResult, bellman_backup_states},
    ccgraph::CCGraph,
    config::IterationBudget,
    error::{SolverError, check_gamma, check_tolerance},
    mdp::{Mdp, PROB_TOLERANCE, validate_mdp},
    values::{StateValueFunction, max_difference},
};

/// Value iteration restricted to `states`, warm-started from `starting_value`.
///
/// Backups only touch `states`; every other state keeps its starting value
/// and is read from it. The residual is measured over `states`.
pub fn value_iteration_states<M>(
    mdp: &M,
    gamma: f64,
    epsilon: f64,
    states: &[M::State],
    starting_value: StateValueFunction<M::State>,
) -> Result<GreedyResult<M>, SolverError>
where
    M: Mdp + ?Sized,
{
    check_gamma(gamma)?;
    check_tolerance("epsilon", epsilon)?;
    run_value_iteration_states(
        mdp,
        gamma,
        epsilon,
        states,
        starting_value,
        IterationBudget::Unbounded,
    )
}

fn run_value_iteration_states<M>(
    mdp: &M,
    gamma: f64,
    epsilon: f64,
    states: &[M::State],
    starting_value: StateValueFunction<M::State>,
    budget: IterationBudget,
) -> Result<GreedyResult<M>, SolverError>
where
    M: Mdp + ?Sized,
{
    let mut current = starting_value;
    let mut sweeps = 0;
    let mut residual = f64::INFINITY;

    while budget.allows(sweeps) {
        let (policy, updated) = bellman_backup_states(mdp, &current, gamma, states)?;
        residual = max_difference(states, &current, &updated);
        sweeps += 1;

        let mut next = current.clone();
        for (state, value) in updated.iter() {
            next.set_value(state.clone(), value);
        }

        if residual < epsilon {
            tracing::trace!(sweeps, residual, states = states.len(), "subset converged");
            return Ok((policy, next));
        }
        current = next;
    }

    Err(SolverError::Convergence {
        algorithm: "topological value iteration",
        sweeps,
        residual,
    })
}

/// Value iteration accelerated by the component structure of `graph`.
///
/// Components are processed children first; each one adds its states to a
/// growing subset that is solved warm-started from the previous result, so
/// downstream values are already converged when a component is backed up.
///
/// When `graph` covers every state, the last subset run stops on the same
/// residual test as [`value_iteration`](crate::value_iteration), so both
/// results lie within `gamma * epsilon / (1 - gamma)` of the optimal values
/// and within `2 * gamma * epsilon / (1 - gamma)` of each other. For
/// `gamma > 1/3` that can exceed `epsilon`; pass a smaller `epsilon` when a
/// tighter agreement is needed.
pub fn topological_vi<M>(
    mdp: &M,
    gamma: f64,
    epsilon: f64,
    graph: &CCGraph<M::State>,
) -> Result<StateValueFunction<M::State>, SolverError>
where
    M: Mdp + ?Sized,
{
    topological_vi_with_budget(mdp, gamma, epsilon, graph, IterationBudget::Unbounded)
}

/// Topological value iteration with a sweep budget per subset.
pub fn topological_vi_with_budget<M>(
    mdp: &M,
    gamma: f64,
    epsilon: f64,
    graph: &CCGraph<M::State>,
    budget: IterationBudget,
) -> Result<StateValueFunction<M::State>, SolverError>
where
    M: Mdp + ?Sized,
{
    check_gamma(gamma)?;
    check_tolerance("epsilon", epsilon)?;
    validate_mdp(mdp, PROB_TOLERANCE)?;
    run_topological_vi(mdp, gamma, epsilon, graph, budget)
}

pub(crate) fn run_topological_vi<M>(
    mdp: &M,
    gamma: f64,
    epsilon: f64,
    graph: &CCGraph<M::State>,
    budget: IterationBudget,
) -> Result<StateValueFunction<M::State>, SolverError>
where
    M: Mdp + ?Sized,
{
    let order = graph.topological_order();
    let mut subset: Vec<M::State> = Vec::new();
    let mut value = StateValueFunction::new();

    for id in &order {
        let Some(component) = graph.component(*id) else {
            continue;
        };
        subset.extend(component.states().iter().cloned());
        (_, value) = run_value_iteration_states(mdp, gamma, epsilon, &subset, value, budget)?;
    }

    tracing::debug!(
        components = order.len(),
        states = subset.len(),
        "topological value iteration finished"
    );
    Ok(value)
}
