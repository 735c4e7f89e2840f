use valuegraph_core::{
    ActionOutcome, Mdp, SolverConfig, compute_condensation, compute_v_of_policy,
};
use valuegraph_mdp::{Simulator, explicit_from_mdp};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Forage {
    Hunt,
    Rest,
}

/// A hunter keeps a food stock between 0 and 3. Resting eats one unit;
/// hunting usually brings food back. Having food left earns a bonus.
#[derive(Debug, Clone, Copy)]
struct Hunting;

impl Mdp for Hunting {
    type State = u8;
    type Action = Forage;

    fn states(&self) -> Vec<u8> {
        vec![0, 1, 2, 3]
    }

    fn actions(&self) -> Vec<Forage> {
        vec![Forage::Hunt, Forage::Rest]
    }

    fn applicable_actions(&self, _state: &u8) -> Vec<Forage> {
        self.actions()
    }

    fn next_states(&self, state: &u8, action: &Forage) -> Vec<ActionOutcome<u8>> {
        let s = *state;
        let reward = f64::from(3 - s) + if s > 0 { 10.0 } else { 0.0 };
        let eaten = s.saturating_sub(1);

        match action {
            Forage::Rest => vec![ActionOutcome::new(1.0, eaten, reward)],
            Forage::Hunt => {
                // Several draws can land on the same stock level.
                let mut outcomes: Vec<ActionOutcome<u8>> = Vec::new();
                for (next, prob) in [(eaten, 0.1), ((s + 1).min(3), 0.7), (s, 0.2)] {
                    match outcomes.iter_mut().find(|outcome| outcome.state == next) {
                        Some(outcome) => outcome.prob += prob,
                        None => outcomes.push(ActionOutcome::new(prob, next, reward)),
                    }
                }
                outcomes
            }
        }
    }

    fn initial_state(&self) -> u8 {
        1
    }
}

fn main() {
    // Step 1: Pick solver parameters from the bundled defaults.
    let config = SolverConfig::from_default_yaml().expect("default config should parse");

    // Step 2: Solve the implicit model directly.
    let (policy, values) = config
        .value_iteration(&Hunting)
        .expect("value iteration should succeed");
    println!("Optimal policy (gamma = {}):", config.gamma);
    for state in Hunting.states() {
        println!(
            "  food {state}: {:?}, value {:.3}",
            policy.decision(&state),
            values.value(&state)
        );
    }

    // Step 3: Keep every action that loses at most 10% in the worst case.
    let cautious = config
        .non_augmentable_policy(&Hunting)
        .expect("synthesis should succeed");
    println!("Conservative choices:");
    for state in Hunting.states() {
        let mut allowed: Vec<_> = cautious
            .actions(&state)
            .expect("every state is covered")
            .iter()
            .collect();
        allowed.sort_by_key(|action| format!("{action:?}"));
        println!("  food {state}: {allowed:?}");
    }

    // Step 4: Explicitate, solve by components, and translate back.
    let explicit = explicit_from_mdp(&Hunting).expect("hunting should explore");
    let graph = compute_condensation(explicit.mdp()).expect("condensation should succeed");
    let topo = config
        .topological_vi(explicit.mdp(), &graph)
        .expect("topological vi should succeed");
    let (explicit_policy, _) = config
        .value_iteration(explicit.mdp())
        .expect("value iteration should succeed");
    let translated = explicit.translate(explicit_policy);
    let translated_values = compute_v_of_policy(
        &Hunting,
        &translated,
        config.gamma,
        config.stopping_threshold,
        None,
    )
    .expect("evaluation should succeed");
    println!(
        "Explicit model: {} states in {} components; start value {:.3} (translated {:.3})",
        explicit.mdp().state_count(),
        graph.len(),
        topo.value(&explicit.mdp().start()),
        translated_values.value(&Hunting.initial_state())
    );

    // Step 5: Replay the optimal policy with a fixed seed.
    let mut simulator = Simulator::new(Hunting, 7).expect("model should validate");
    let history = simulator
        .simulate(&policy, 10)
        .expect("simulation should succeed");
    println!("Ten simulated days:");
    println!("{history}");
    println!(
        "Total reward {:.1}, discounted return {:.3}",
        history.total_reward(),
        history.discounted_return(config.gamma)
    );
}
