use crate::{ActionSpec, CompiledMdp, MdpError, MdpSpec, OutcomeSpec, StateSpec};

#[derive(Debug, Clone, Default)]
/// Incremental construction of a state-machine MDP.
pub struct MdpBuilder {
    start: Option<String>,
    states: Vec<StateSpec>,
}

impl MdpBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Define the initial state.
    pub fn set_start(&mut self, state: impl Into<String>) -> &mut Self {
        self.start = Some(state.into());
        self
    }

    /// Declare a state. States are enumerated in declaration order.
    pub fn add_state(&mut self, id: impl Into<String>) -> &mut Self {
        self.states.push(StateSpec {
            id: id.into(),
            actions: Vec::new(),
        });
        self
    }

    /// Declare an action applicable in an existing state.
    pub fn add_action(
        &mut self,
        state_id: impl AsRef<str>,
        action_id: impl Into<String>,
    ) -> Result<&mut Self, MdpError> {
        let state = self.state_mut(state_id.as_ref())?;
        state.actions.push(ActionSpec {
            id: action_id.into(),
            outcomes: Vec::new(),
        });
        Ok(self)
    }

    /// Append one stochastic outcome to an existing action.
    pub fn add_outcome(
        &mut self,
        state_id: impl AsRef<str>,
        action_id: impl AsRef<str>,
        next: impl Into<String>,
        prob: f64,
        reward: f64,
    ) -> Result<&mut Self, MdpError> {
        let state_id = state_id.as_ref();
        let action_id = action_id.as_ref();

        let action = self
            .state_mut(state_id)?
            .actions
            .iter_mut()
            .find(|a| a.id == action_id)
            .ok_or_else(|| MdpError::BuilderAction {
                state: state_id.to_string(),
                action: action_id.to_string(),
            })?;

        action.outcomes.push(OutcomeSpec {
            next: next.into(),
            prob,
            reward,
        });

        Ok(self)
    }

    /// Add a deterministic transition, declaring the action if needed.
    pub fn add_transition(
        &mut self,
        state_id: impl AsRef<str>,
        action_id: impl AsRef<str>,
        next: impl Into<String>,
        reward: f64,
    ) -> Result<&mut Self, MdpError> {
        let state_id = state_id.as_ref();
        let action_id = action_id.as_ref();

        let declared = self
            .state_mut(state_id)?
            .actions
            .iter()
            .any(|a| a.id == action_id);
        if !declared {
            self.add_action(state_id, action_id)?;
        }
        self.add_outcome(state_id, action_id, next, 1.0, reward)
    }

    fn state_mut(&mut self, state_id: &str) -> Result<&mut StateSpec, MdpError> {
        self.states
            .iter_mut()
            .find(|s| s.id == state_id)
            .ok_or_else(|| MdpError::BuilderState(state_id.to_string()))
    }

    /// Finish into a spec whose ids and references are checked.
    pub fn build_spec(self) -> Result<MdpSpec, MdpError> {
        let start = self.start.ok_or(MdpError::MissingStart)?;
        let spec = MdpSpec {
            version: Some(1),
            start,
            states: self.states,
        };
        spec.validate()?;
        Ok(spec)
    }

    pub fn compile(self) -> Result<CompiledMdp, MdpError> {
        self.build_spec()?.compile()
    }
}
