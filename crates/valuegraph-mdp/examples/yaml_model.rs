use valuegraph_core::{Mdp, SolverConfig, compute_connected_components};
use valuegraph_mdp::{Simulator, compile_yaml};

const MODEL_PATH: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/models/corridor.yaml");

fn main() {
    let mdp = compile_yaml(MODEL_PATH).expect("bundled model should compile");
    let config = SolverConfig {
        gamma: 0.95,
        ..SolverConfig::default()
    };

    let (policy, values) = config
        .value_iteration(&mdp)
        .expect("value iteration should succeed");
    for state in mdp.states() {
        let name = mdp.state_id(state).unwrap_or("?");
        let action = policy
            .decision(&state)
            .and_then(|action| mdp.action_id(*action))
            .unwrap_or("?");
        println!("{name:>10}: {action:<8} value {:.3}", values.value(&state));
    }

    let graph = compute_connected_components(&mdp).expect("components should be computed");
    println!("{} strongly connected components", graph.len());

    let mut simulator = Simulator::new(mdp, 42).expect("model should validate");
    let history = simulator
        .simulate(&policy, 8)
        .expect("simulation should succeed");
    let names: Vec<&str> = (0..=history.len())
        .filter_map(|i| history.state(i))
        .filter_map(|state| simulator.mdp().state_id(*state))
        .collect();
    println!("Simulated path: {}", names.join(" -> "));
}
