use crate::solver::tests::fixtures::{LineMdp, TableMdp, agreement_bound, gambler, stay_or_go};
use crate::{
    IterationBudget, SolverConfig, SolverError, StateValueFunction, compute_condensation,
    compute_connected_components, state_value_difference, topological_vi,
    topological_vi_with_budget, value_iteration, value_iteration_states,
};

#[test]
fn chain_topological_vi_matches_value_iteration() {
    let mdp = gambler();
    let (gamma, epsilon) = (0.85, 1e-3);
    let (_, expected) = value_iteration(&mdp, gamma, epsilon).expect("value iteration");

    let graph = compute_connected_components(&mdp).expect("components");
    let v = topological_vi(&mdp, gamma, epsilon, &graph).expect("topological vi");

    assert!(state_value_difference(&mdp, &expected, &v) <= agreement_bound(gamma, epsilon));
}

#[test]
fn coarse_tolerances_stay_within_the_contraction_bound() {
    let mdp = stay_or_go();
    let graph = compute_connected_components(&mdp).expect("components");

    for (gamma, epsilon) in [(0.85, 0.01), (0.9, 0.01), (0.95, 0.05)] {
        let (_, expected) = value_iteration(&mdp, gamma, epsilon).expect("value iteration");
        let v = topological_vi(&mdp, gamma, epsilon, &graph).expect("topological vi");
        let gap = state_value_difference(&mdp, &expected, &v);
        assert!(
            gap <= agreement_bound(gamma, epsilon),
            "gamma {gamma}, epsilon {epsilon}: gap {gap}"
        );

        // Optimal values: state 1 loops on 2, state 0 moves there at once.
        let exact_1 = 2.0 / (1.0 - gamma);
        let exact_0 = gamma * exact_1;
        let to_optimum = gamma * epsilon / (1.0 - gamma) + 1e-9;
        assert!((v.value(&0) - exact_0).abs() <= to_optimum);
        assert!((v.value(&1) - exact_1).abs() <= to_optimum);
    }
}

#[test]
fn condensation_topological_vi_matches_value_iteration() {
    let mdp = TableMdp::new(0)
        .with(0, "left", &[(1, 1.0, 1.0)])
        .with(0, "right", &[(2, 0.5, 0.0), (0, 0.5, 0.5)])
        .with(1, "a", &[(3, 1.0, 2.0)])
        .with(2, "a", &[(3, 0.3, 1.0), (2, 0.7, 0.2)])
        .with(3, "a", &[(3, 1.0, 1.0)]);
    let (gamma, epsilon) = (0.9, 1e-3);
    let (_, expected) = value_iteration(&mdp, gamma, epsilon).expect("value iteration");

    let graph = compute_condensation(&mdp).expect("condensation");
    let v = topological_vi(&mdp, gamma, epsilon, &graph).expect("topological vi");

    assert!(state_value_difference(&mdp, &expected, &v) <= agreement_bound(gamma, epsilon));
}

#[test]
fn long_line_is_solved_component_by_component() {
    let mdp = LineMdp { len: 50 };
    let graph = compute_condensation(&mdp).expect("condensation");
    let v = topological_vi(&mdp, 0.5, 1e-9, &graph).expect("topological vi");

    // Every state earns 1 per step forever.
    for state in 0..50 {
        assert!((v.value(&state) - 2.0).abs() < 1e-6);
    }
}

#[test]
fn subset_iteration_leaves_other_states_untouched() {
    let mdp = stay_or_go();
    let mut start = StateValueFunction::new();
    start.set_value(1, 20.0);

    let (policy, v) = value_iteration_states(&mdp, 0.9, 1e-9, &[0], start).expect("subset vi");

    assert_eq!(policy.decision(&0), Some(&"go"));
    assert_eq!(policy.decision(&1), None);
    assert_eq!(v.value(&1), 20.0);
    assert!((v.value(&0) - 18.0).abs() < 1e-9);
}

#[test]
fn empty_graph_yields_zero_values() {
    let mdp = stay_or_go();
    let v = topological_vi(&mdp, 0.9, 1e-6, &crate::CCGraph::new()).expect("nothing to solve");
    assert!(v.is_empty());
}

#[test]
fn topological_vi_respects_sweep_budget() {
    let mdp = stay_or_go();
    let graph = compute_connected_components(&mdp).expect("components");

    let err = topological_vi_with_budget(&mdp, 0.9, 1e-9, &graph, IterationBudget::Sweeps(2))
        .expect_err("self-loop needs many sweeps");
    assert!(matches!(
        err,
        SolverError::Convergence {
            algorithm: "topological value iteration",
            ..
        }
    ));
}

#[test]
fn config_runs_topological_vi() {
    let mdp = gambler();
    let config = SolverConfig {
        gamma: 0.8,
        epsilon: 1e-9,
        ..SolverConfig::default()
    };
    let (_, expected) = config.value_iteration(&mdp).expect("value iteration");
    let graph = compute_condensation(&mdp).expect("condensation");
    let v = config.topological_vi(&mdp, &graph).expect("topological vi");

    let bound = agreement_bound(config.gamma, config.epsilon);
    assert!(state_value_difference(&mdp, &expected, &v) <= bound);
}
