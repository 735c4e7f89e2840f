use std::collections::HashSet;

use serde::Deserialize;

use crate::{CompiledMdp, MdpError};

/// State-machine MDP as written in YAML: named states, named actions and
/// enumerated transitions.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MdpSpec {
    /// Schema version for future compatibility checks.
    #[serde(default)]
    pub version: Option<u32>,
    /// Id of the initial state.
    pub start: String,
    /// All state declarations, in enumeration order.
    pub states: Vec<StateSpec>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct StateSpec {
    /// Unique state id.
    pub id: String,
    /// Actions applicable in this state, in enumeration order.
    #[serde(default)]
    pub actions: Vec<ActionSpec>,
}

/// A named action and its stochastic outcomes.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ActionSpec {
    pub id: String,
    pub outcomes: Vec<OutcomeSpec>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct OutcomeSpec {
    pub next: String,
    pub prob: f64,
    pub reward: f64,
}

impl MdpSpec {
    /// Check ids and references.
    ///
    /// Every state must declare at least one action: a state the model
    /// should never leave loops on itself explicitly. Outcome probabilities
    /// and rewards are checked when compiling.
    pub fn validate(&self) -> Result<(), MdpError> {
        if self.start.trim().is_empty() {
            return Err(MdpError::MissingStart);
        }

        let mut ids = HashSet::with_capacity(self.states.len());
        for state in &self.states {
            if !ids.insert(state.id.as_str()) {
                return Err(MdpError::DuplicateState(state.id.clone()));
            }
        }
        if !ids.contains(self.start.as_str()) {
            return Err(MdpError::UnknownStart(self.start.clone()));
        }

        for state in &self.states {
            if state.actions.is_empty() {
                return Err(MdpError::NoActions(state.id.clone()));
            }

            let mut seen = HashSet::with_capacity(state.actions.len());
            for action in &state.actions {
                if !seen.insert(action.id.as_str()) {
                    return Err(MdpError::DuplicateAction {
                        state: state.id.clone(),
                        action: action.id.clone(),
                    });
                }
                if let Some(outcome) = action
                    .outcomes
                    .iter()
                    .find(|outcome| !ids.contains(outcome.next.as_str()))
                {
                    return Err(MdpError::UnknownNext {
                        state: state.id.clone(),
                        action: action.id.clone(),
                        next: outcome.next.clone(),
                    });
                }
            }
        }

        Ok(())
    }

    /// Validate and compile this spec into the runtime representation.
    pub fn compile(&self) -> Result<CompiledMdp, MdpError> {
        CompiledMdp::from_spec(self)
    }
}
