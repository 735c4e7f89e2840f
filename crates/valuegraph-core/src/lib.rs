mod solver;

pub use solver::bellman::{
    GreedyResult, bellman_backup, bellman_backup_states, compute_q_from_v,
    compute_q_from_v_states, compute_v_from_q_and_policy, greedy_action, greedy_policy,
    greedy_policy_states, one_step_lookahead,
};
pub use solver::ccgraph::{CCGraph, ConnectedComponent};
pub use solver::config::{IterationBudget, SolverConfig, SolverConfigError};
pub use solver::error::SolverError;
pub use solver::ids::ComponentId;
pub use solver::iteration::{
    compute_v_of_policy, compute_v_of_policy_with_budget, is_policy_nearly_greedy,
    policy_iteration, policy_iteration_with_budget, value_iteration, value_iteration_with_budget,
};
pub use solver::mdp::{ActionOutcome, Mdp, PROB_TOLERANCE, validate_mdp};
pub use solver::nondet::{
    compute_nd_policy_value, compute_non_augmentable_policy, nd_compute_q_from_v,
    nd_compute_v_from_q_and_policy, nd_greedy_action, nd_greedy_policy,
    nd_is_policy_nearly_greedy,
};
pub use solver::policy::{ExplicitPolicy, NdPolicy, Policy};
pub use solver::scc::{compute_condensation, compute_connected_components};
pub use solver::topological::{topological_vi, topological_vi_with_budget, value_iteration_states};
pub use solver::values::{ActionValueFunction, StateValueFunction, state_value_difference};
