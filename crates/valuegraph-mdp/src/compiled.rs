use std::collections::HashMap;

use valuegraph_core::{ActionOutcome, Mdp, PROB_TOLERANCE, validate_mdp};

use crate::{MdpError, MdpSpec, interner::Interner};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
/// Dense index for states in a compiled MDP.
pub struct StateKey(usize);

impl StateKey {
    /// Return the underlying state index.
    pub fn index(self) -> usize {
        self.0
    }
}

impl From<usize> for StateKey {
    fn from(value: usize) -> Self {
        Self(value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
/// Dense index for action names in a compiled MDP.
///
/// Action names are shared across states: `"left"` declared in two states is
/// the same key.
pub struct ActionKey(usize);

impl ActionKey {
    pub fn index(self) -> usize {
        self.0
    }
}

impl From<usize> for ActionKey {
    fn from(value: usize) -> Self {
        Self(value)
    }
}

#[derive(Debug, Clone)]
/// Runtime form of a state-machine MDP with resolved references.
pub struct CompiledMdp {
    start: StateKey,
    states: Vec<StateRec>,
    state_ids: Vec<String>,
    state_id_to_key: HashMap<String, StateKey>,
    action_ids: Interner<String>,
}

#[derive(Debug, Clone)]
struct StateRec {
    actions: Vec<ActionRec>,
}

#[derive(Debug, Clone)]
struct ActionRec {
    key: ActionKey,
    outcomes: Vec<ActionOutcome<StateKey>>,
}

impl CompiledMdp {
    /// Check the spec's structure, compile it, then check the compiled
    /// transitions against the solver contract.
    pub(crate) fn from_spec(spec: &MdpSpec) -> Result<Self, MdpError> {
        spec.validate()?;

        let mut state_id_to_key = HashMap::with_capacity(spec.states.len());
        let mut state_ids = Vec::with_capacity(spec.states.len());
        for (idx, state) in spec.states.iter().enumerate() {
            state_id_to_key.insert(state.id.clone(), StateKey::from(idx));
            state_ids.push(state.id.clone());
        }

        let start = state_id_to_key
            .get(&spec.start)
            .copied()
            .ok_or_else(|| MdpError::UnknownStart(spec.start.clone()))?;

        let mut action_ids = Interner::new();
        let mut states = Vec::with_capacity(spec.states.len());
        for state in &spec.states {
            let mut actions = Vec::with_capacity(state.actions.len());
            for action in &state.actions {
                let (index, _) = action_ids.intern(action.id.clone());
                let mut outcomes = Vec::with_capacity(action.outcomes.len());
                for outcome in &action.outcomes {
                    let next = state_id_to_key.get(&outcome.next).copied().ok_or_else(|| {
                        MdpError::UnknownNext {
                            state: state.id.clone(),
                            action: action.id.clone(),
                            next: outcome.next.clone(),
                        }
                    })?;
                    outcomes.push(ActionOutcome::new(outcome.prob, next, outcome.reward));
                }
                actions.push(ActionRec {
                    key: ActionKey::from(index),
                    outcomes,
                });
            }
            states.push(StateRec { actions });
        }

        tracing::debug!(
            states = states.len(),
            actions = action_ids.len(),
            "compiled state-machine MDP"
        );

        let compiled = Self {
            start,
            states,
            state_ids,
            state_id_to_key,
            action_ids,
        };
        validate_mdp(&compiled, PROB_TOLERANCE)?;
        Ok(compiled)
    }

    /// Return the start state key.
    pub fn start(&self) -> StateKey {
        self.start
    }

    pub fn state_count(&self) -> usize {
        self.states.len()
    }

    /// Number of distinct action names.
    pub fn action_count(&self) -> usize {
        self.action_ids.len()
    }

    /// Return the number of actions applicable in a state.
    pub fn num_actions(&self, key: StateKey) -> Option<usize> {
        self.states
            .get(key.index())
            .map(|state| state.actions.len())
    }

    /// Convert a state key back to its string id.
    pub fn state_id(&self, key: StateKey) -> Option<&str> {
        self.state_ids.get(key.index()).map(String::as_str)
    }

    /// Convert a string id into a compiled state key.
    pub fn state_key(&self, id: &str) -> Option<StateKey> {
        self.state_id_to_key.get(id).copied()
    }

    /// Convert an action key back to its name.
    pub fn action_id(&self, key: ActionKey) -> Option<&str> {
        self.action_ids.get(key.index()).map(String::as_str)
    }

    /// Convert an action name into its key.
    pub fn action_key(&self, id: &str) -> Option<ActionKey> {
        self.action_ids.index_of(&id.to_string()).map(ActionKey::from)
    }

    fn action_rec(&self, state: StateKey, action: ActionKey) -> Option<&ActionRec> {
        self.states
            .get(state.index())?
            .actions
            .iter()
            .find(|rec| rec.key == action)
    }
}

impl Mdp for CompiledMdp {
    type State = StateKey;
    type Action = ActionKey;

    fn states(&self) -> Vec<StateKey> {
        (0..self.states.len()).map(StateKey::from).collect()
    }

    fn actions(&self) -> Vec<ActionKey> {
        (0..self.action_ids.len()).map(ActionKey::from).collect()
    }

    fn applicable_actions(&self, state: &StateKey) -> Vec<ActionKey> {
        self.states
            .get(state.index())
            .map(|rec| rec.actions.iter().map(|action| action.key).collect())
            .unwrap_or_default()
    }

    /// An undeclared pair has no outcome; `validate_mdp` and the simulator
    /// reject it before it gets here.
    fn next_states(&self, state: &StateKey, action: &ActionKey) -> Vec<ActionOutcome<StateKey>> {
        self.action_rec(*state, *action)
            .map(|rec| rec.outcomes.clone())
            .unwrap_or_default()
    }

    fn initial_state(&self) -> StateKey {
        self.start
    }
}
