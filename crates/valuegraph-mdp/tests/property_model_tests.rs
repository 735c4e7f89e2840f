use proptest::prelude::*;
use valuegraph_core::{ExplicitPolicy, Mdp, value_iteration};
use valuegraph_mdp::{ActionKey, CompiledMdp, MdpBuilder, Simulator, StateKey, explicit_from_mdp};

/// Per state, per action, `(target, weight, reward)` outcomes.
type RawModel = Vec<Vec<Vec<(usize, u32, i32)>>>;

fn raw_model() -> impl Strategy<Value = RawModel> {
    (1usize..7).prop_flat_map(|n| {
        proptest::collection::vec(
            proptest::collection::vec(
                proptest::collection::vec((0..n, 1u32..10, -10i32..10), 1..4),
                1..4,
            ),
            n,
        )
    })
}

fn compile(raw: &RawModel) -> CompiledMdp {
    let mut builder = MdpBuilder::new();
    builder.set_start("s0");
    for state in 0..raw.len() {
        builder.add_state(format!("s{state}"));
    }
    for (state, actions) in raw.iter().enumerate() {
        let state_id = format!("s{state}");
        for (action, outcomes) in actions.iter().enumerate() {
            let action_id = format!("a{action}");
            builder
                .add_action(&state_id, action_id.clone())
                .expect("state is declared");
            let total: u32 = outcomes.iter().map(|(_, weight, _)| weight).sum();
            for &(next, weight, reward) in outcomes {
                builder
                    .add_outcome(
                        &state_id,
                        &action_id,
                        format!("s{next}"),
                        f64::from(weight) / f64::from(total),
                        f64::from(reward) / 10.0,
                    )
                    .expect("action is declared");
            }
        }
    }
    builder.compile().expect("generated model is valid")
}

proptest! {
    #[test]
    fn explicitation_keeps_reachable_values(raw in raw_model()) {
        let mdp = compile(&raw);
        let explicit = explicit_from_mdp(&mdp).expect("explicitation");
        prop_assert!(explicit.mdp().state_count() <= mdp.state_count());

        let (_, original) = value_iteration(&mdp, 0.7, 1e-10).expect("original");
        let (_, copied) = value_iteration(explicit.mdp(), 0.7, 1e-10).expect("explicit");

        for state in mdp.states() {
            if let Some(key) = explicit.state_key(&state) {
                prop_assert!((original.value(&state) - copied.value(&key)).abs() < 1e-6);
                prop_assert_eq!(explicit.original_state(key), Some(&state));
            }
        }
    }

    #[test]
    fn simulations_replay_with_the_same_seed(raw in raw_model(), seed in any::<u64>()) {
        let policy = ExplicitPolicy::<StateKey, ActionKey>::new();
        let mut first = Simulator::new(compile(&raw), seed).expect("valid model");
        let mut second = Simulator::new(compile(&raw), seed).expect("valid model");

        let h1 = first.simulate(&policy, 20).expect("simulation");
        let h2 = second.simulate(&policy, 20).expect("simulation");
        prop_assert_eq!(&h1, &h2);

        for (state, action, reward, next) in h1.steps() {
            let possible = first.mdp().next_states(state, action);
            prop_assert!(possible.iter().any(|o| o.state == *next && o.reward == reward));
        }
    }
}
