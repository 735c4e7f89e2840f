use valuegraph_core::{
    ActionOutcome, Mdp, SolverConfig, StateValueFunction, compute_condensation,
    compute_connected_components, compute_non_augmentable_policy, compute_v_of_policy,
    policy_iteration, state_value_difference, topological_vi, value_iteration,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Room {
    Hall,
    Library,
    Garden,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Move {
    Read,
    Walk,
    Rest,
}

/// Reading in the library pays best; the garden is a pleasant dead end.
struct House;

impl Mdp for House {
    type State = Room;
    type Action = Move;

    fn states(&self) -> Vec<Room> {
        vec![Room::Hall, Room::Library, Room::Garden]
    }

    fn actions(&self) -> Vec<Move> {
        vec![Move::Read, Move::Walk, Move::Rest]
    }

    fn applicable_actions(&self, state: &Room) -> Vec<Move> {
        match state {
            Room::Hall => vec![Move::Walk, Move::Rest],
            Room::Library => vec![Move::Read, Move::Walk],
            Room::Garden => vec![Move::Rest],
        }
    }

    fn next_states(&self, state: &Room, action: &Move) -> Vec<ActionOutcome<Room>> {
        match (state, action) {
            (Room::Hall, Move::Walk) => vec![
                ActionOutcome::new(0.8, Room::Library, 0.0),
                ActionOutcome::new(0.2, Room::Garden, 0.5),
            ],
            (Room::Library, Move::Read) => vec![ActionOutcome::new(1.0, Room::Library, 1.0)],
            (Room::Library, Move::Walk) => vec![ActionOutcome::new(1.0, Room::Hall, 0.0)],
            (Room::Hall | Room::Garden, Move::Rest) => vec![ActionOutcome::new(1.0, *state, 0.2)],
            _ => Vec::new(),
        }
    }

    fn initial_state(&self) -> Room {
        Room::Hall
    }
}

#[test]
fn public_solvers_agree_on_house() {
    let (policy, v) = value_iteration(&House, 0.9, 1e-9).expect("value iteration");
    assert_eq!(policy.decision(&Room::Hall), Some(&Move::Walk));
    assert_eq!(policy.decision(&Room::Library), Some(&Move::Read));
    assert!((v.value(&Room::Library) - 10.0).abs() < 1e-6);

    let improved = policy_iteration(&House, 0.9, 1e-6, 1e-9, None).expect("policy iteration");
    let v_pi = compute_v_of_policy(&House, &improved, 0.9, 1e-9, None).expect("evaluation");
    assert!(state_value_difference(&House, &v, &v_pi) < 1e-4);

    for graph in [
        compute_connected_components(&House).expect("components"),
        compute_condensation(&House).expect("condensation"),
    ] {
        let v_topo = topological_vi(&House, 0.9, 1e-9, &graph).expect("topological vi");
        // Both stop on a residual below 1e-9 at gamma 0.9.
        let bound = 2.0 * 0.9 * 1e-9 / (1.0 - 0.9) + 1e-9;
        assert!(state_value_difference(&House, &v, &v_topo) <= bound);
    }
}

#[test]
fn public_non_augmentable_policy_on_house() {
    let policy =
        compute_non_augmentable_policy(&House, 0.9, 1e-9, 0.1, 1000).expect("synthesis");

    assert!(policy.allows(&Room::Hall, &Move::Walk));
    assert!(policy.allows(&Room::Library, &Move::Read));
    assert!(!policy.allows(&Room::Library, &Move::Walk));
    assert!(!policy.allows(&Room::Hall, &Move::Rest));
    assert!(policy.allows(&Room::Garden, &Move::Rest));
}

#[test]
fn public_default_yaml_config_drives_solvers() {
    let config = SolverConfig::from_default_yaml().expect("default yaml should parse");
    let (_, v) = config.value_iteration(&House).expect("value iteration");
    let zero = StateValueFunction::new();

    assert!(state_value_difference(&House, &v, &zero) > 0.0);
    assert!(config.validate_mdp(&House).is_ok());
}
