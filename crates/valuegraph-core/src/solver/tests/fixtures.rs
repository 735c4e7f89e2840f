use crate::{ActionOutcome, Mdp};

/// Small explicit MDP keyed by integer states and static action names.
/// States and actions are enumerated in order of first mention.
#[derive(Debug, Clone)]
pub(crate) struct TableMdp {
    initial: u32,
    states: Vec<u32>,
    actions: Vec<&'static str>,
    transitions: Vec<(u32, &'static str, Vec<ActionOutcome<u32>>)>,
}

impl TableMdp {
    pub(crate) fn new(initial: u32) -> Self {
        TableMdp {
            initial,
            states: vec![initial],
            actions: Vec::new(),
            transitions: Vec::new(),
        }
    }

    /// Declare a state without giving it any action.
    pub(crate) fn with_state(mut self, state: u32) -> Self {
        self.register_state(state);
        self
    }

    /// Add `action` in `state` with `(next, prob, reward)` outcomes.
    pub(crate) fn with(mut self, state: u32, action: &'static str, outcomes: &[(u32, f64, f64)]) -> Self {
        self.register_state(state);
        if !self.actions.contains(&action) {
            self.actions.push(action);
        }
        let outcomes = outcomes
            .iter()
            .map(|&(next, prob, reward)| {
                self.register_state(next);
                ActionOutcome::new(prob, next, reward)
            })
            .collect();
        self.transitions.push((state, action, outcomes));
        self
    }

    fn register_state(&mut self, state: u32) {
        if !self.states.contains(&state) {
            self.states.push(state);
        }
    }
}

impl Mdp for TableMdp {
    type State = u32;
    type Action = &'static str;

    fn states(&self) -> Vec<u32> {
        self.states.clone()
    }

    fn actions(&self) -> Vec<&'static str> {
        self.actions.clone()
    }

    fn applicable_actions(&self, state: &u32) -> Vec<&'static str> {
        self.transitions
            .iter()
            .filter(|(origin, _, _)| origin == state)
            .map(|(_, action, _)| *action)
            .collect()
    }

    fn next_states(&self, state: &u32, action: &&'static str) -> Vec<ActionOutcome<u32>> {
        self.transitions
            .iter()
            .find(|(origin, name, _)| origin == state && name == action)
            .map(|(_, _, outcomes)| outcomes.clone())
            .unwrap_or_default()
    }

    fn initial_state(&self) -> u32 {
        self.initial
    }
}

/// Deterministic line `0 -> 1 -> ... -> n-1` with a self-loop at the end.
#[derive(Debug, Clone, Copy)]
pub(crate) struct LineMdp {
    pub(crate) len: u32,
}

impl Mdp for LineMdp {
    type State = u32;
    type Action = ();

    fn states(&self) -> Vec<u32> {
        (0..self.len).collect()
    }

    fn actions(&self) -> Vec<()> {
        vec![()]
    }

    fn applicable_actions(&self, _state: &u32) -> Vec<()> {
        vec![()]
    }

    fn next_states(&self, state: &u32, _action: &()) -> Vec<ActionOutcome<u32>> {
        let next = (*state + 1).min(self.len - 1);
        vec![ActionOutcome::new(1.0, next, 1.0)]
    }

    fn initial_state(&self) -> u32 {
        0
    }
}

/// The two-state model used across tests: in state 0, `stay` earns 1 and
/// loops, `go` moves to state 1 for free; state 1 loops earning 2.
pub(crate) fn stay_or_go() -> TableMdp {
    TableMdp::new(0)
        .with(0, "stay", &[(0, 1.0, 1.0)])
        .with(0, "go", &[(1, 1.0, 0.0)])
        .with(1, "stay", &[(1, 1.0, 2.0)])
}

/// A model mixing stochastic outcomes, cycles and a sink.
pub(crate) fn gambler() -> TableMdp {
    TableMdp::new(0)
        .with(0, "bet", &[(1, 0.4, 1.0), (0, 0.6, -0.5)])
        .with(0, "wait", &[(0, 1.0, 0.1)])
        .with(1, "bet", &[(2, 0.5, 3.0), (0, 0.5, -1.0)])
        .with(1, "cash", &[(3, 1.0, 2.0)])
        .with(2, "cash", &[(3, 1.0, 5.0)])
        .with(2, "bet", &[(1, 1.0, 0.0)])
        .with(3, "rest", &[(3, 1.0, 0.0)])
}

/// Largest gap allowed between two value functions that both stopped on a
/// residual below `epsilon`.
pub(crate) fn agreement_bound(gamma: f64, epsilon: f64) -> f64 {
    2.0 * gamma * epsilon / (1.0 - gamma) + 1e-9
}
