use std::collections::HashSet;

use crate::solver::tests::fixtures::{TableMdp, gambler};
use crate::{
    NdPolicy, SolverConfig, SolverError, StateValueFunction, compute_nd_policy_value,
    compute_non_augmentable_policy, nd_compute_q_from_v, nd_compute_v_from_q_and_policy,
    nd_greedy_action, nd_greedy_policy, nd_is_policy_nearly_greedy, value_iteration,
};

/// One state, three self-loops earning 1, 0.95 and 0.5.
fn three_loops() -> TableMdp {
    TableMdp::new(0)
        .with(0, "a", &[(0, 1.0, 1.0)])
        .with(0, "b", &[(0, 1.0, 0.95)])
        .with(0, "c", &[(0, 1.0, 0.5)])
}

#[test]
fn worst_case_operators_take_the_minimum() {
    let mdp = three_loops();
    let q = nd_compute_q_from_v(&mdp, &StateValueFunction::new(), 0.5);

    let mut policy = NdPolicy::new();
    policy.add(0, "a");
    policy.add(0, "b");
    let v = nd_compute_v_from_q_and_policy(&mdp, &policy, &q).expect("worst case");
    assert_eq!(v.value(&0), 0.95);

    let (action, value) = nd_greedy_action(&mdp, &q, &0).expect("worst action");
    assert_eq!(action, "c");
    assert_eq!(value, 0.5);

    let (worst, values) = nd_greedy_policy(&mdp, &q).expect("worst policy");
    assert_eq!(worst.actions(&0).expect("state 0"), &HashSet::from(["c"]));
    assert_eq!(values.value(&0), 0.5);
}

#[test]
fn worst_case_ties_keep_first_action() {
    let mdp = TableMdp::new(0)
        .with(0, "x", &[(0, 1.0, 0.0)])
        .with(0, "y", &[(0, 1.0, 0.0)]);
    let q = nd_compute_q_from_v(&mdp, &StateValueFunction::new(), 0.9);

    let (action, _) = nd_greedy_action(&mdp, &q, &0).expect("worst action");
    assert_eq!(action, "x");
}

#[test]
fn worst_case_value_of_policy() {
    let mdp = three_loops();
    let mut policy = NdPolicy::new();
    policy.add(0, "a");
    policy.add(0, "c");

    let v = compute_nd_policy_value(&mdp, &policy, 0.5, 1e-9, 1000).expect("evaluation");
    assert!((v.value(&0) - 1.0).abs() < 1e-8);
}

#[test]
fn policy_missing_a_state_is_unknown_entity() {
    let mdp = three_loops().with(1, "a", &[(1, 1.0, 0.0)]);
    let mut policy = NdPolicy::new();
    policy.add(0, "a");

    let err =
        compute_nd_policy_value(&mdp, &policy, 0.5, 1e-9, 10).expect_err("state 1 missing");
    assert!(matches!(err, SolverError::UnknownEntity { kind: "state", .. }));
}

#[test]
fn nearly_greedy_compares_against_scaled_optimum() {
    let mdp = three_loops();
    let mut v_opt = StateValueFunction::new();
    v_opt.set_value(0, 2.0);
    let mut v_nd = StateValueFunction::new();
    v_nd.set_value(0, 1.9);

    assert!(nd_is_policy_nearly_greedy(&mdp, &v_nd, &v_opt, 0.1));
    assert!(!nd_is_policy_nearly_greedy(&mdp, &v_nd, &v_opt, 0.01));
}

#[test]
fn augmentation_keeps_only_near_optimal_actions() {
    let mdp = three_loops();
    let policy = compute_non_augmentable_policy(&mdp, 0.5, 1e-9, 0.1, 1000).expect("synthesis");

    assert_eq!(policy.actions(&0).expect("state 0"), &HashSet::from(["a", "b"]));
}

#[test]
fn augmentation_never_touches_single_action_states() {
    let mdp = three_loops()
        .with(0, "leave", &[(1, 1.0, 0.0)])
        .with(1, "x", &[(1, 1.0, 0.1)]);
    let policy = compute_non_augmentable_policy(&mdp, 0.5, 1e-9, 0.1, 1000).expect("synthesis");

    assert_eq!(policy.actions(&0).expect("state 0"), &HashSet::from(["a", "b"]));
    assert_eq!(policy.actions(&1).expect("state 1"), &HashSet::from(["x"]));
}

#[test]
fn synthesized_policy_is_conservative_and_maximal() {
    let mdp = gambler();
    let (gamma, epsilon, subopt) = (0.8, 1e-9, 0.1);
    let policy =
        compute_non_augmentable_policy(&mdp, gamma, epsilon, subopt, 1000).expect("synthesis");
    let (_, optimal) = value_iteration(&mdp, gamma, epsilon).expect("value iteration");

    let worst = compute_nd_policy_value(&mdp, &policy, gamma, epsilon, 1000).expect("evaluation");
    assert!(nd_is_policy_nearly_greedy(&mdp, &worst, &optimal, subopt));

    for state in 0..4_u32 {
        for action in crate::Mdp::applicable_actions(&mdp, &state) {
            if policy.allows(&state, &action) {
                continue;
            }
            let mut extended = policy.clone();
            extended.add(state, action);
            let worst =
                compute_nd_policy_value(&mdp, &extended, gamma, epsilon, 1000).expect("evaluation");
            assert!(
                !nd_is_policy_nearly_greedy(&mdp, &worst, &optimal, subopt),
                "({state}, {action}) could still be added"
            );
        }
    }
}

#[test]
fn zero_tolerance_keeps_exactly_the_optimal_policy() {
    let mdp = gambler();
    for (gamma, epsilon) in [(0.8, 1e-3), (0.9, 1e-2)] {
        let (baseline, _) = value_iteration(&mdp, gamma, epsilon).expect("value iteration");
        let policy =
            compute_non_augmentable_policy(&mdp, gamma, epsilon, 0.0, 1000).expect("synthesis");

        // No action of the gambler ties with the optimal one.
        assert_eq!(policy.pair_count(), 4);
        for state in 0..4_u32 {
            let best = baseline.decision(&state).expect("greedy decision");
            assert!(policy.allows(&state, best), "optimal action dropped in {state}");
        }
    }
}

#[test]
fn synthesis_rejects_bad_parameters() {
    let mdp = three_loops();

    let err = compute_non_augmentable_policy(&mdp, 0.5, 1e-9, 1.0, 1000).expect_err("subopt 1");
    assert!(matches!(
        err,
        SolverError::InvalidParameter {
            name: "subopt_epsilon",
            ..
        }
    ));

    let err = compute_non_augmentable_policy(&mdp, 0.5, 1e-9, 0.1, 0).expect_err("no iteration");
    assert!(matches!(
        err,
        SolverError::InvalidParameter {
            name: "max_iteration",
            ..
        }
    ));
}

#[test]
fn config_synthesizes_with_its_parameters() {
    let config = SolverConfig {
        gamma: 0.5,
        epsilon: 1e-9,
        ..SolverConfig::default()
    };
    let policy = config.non_augmentable_policy(&three_loops()).expect("synthesis");

    assert_eq!(policy.pair_count(), 2);
    assert!(policy.allows(&0, &"b"));
}
