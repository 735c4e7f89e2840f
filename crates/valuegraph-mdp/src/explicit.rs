//! Explicitation of arbitrary MDPs into state-machine form.
//!
//! The part of the model reachable from its initial state is explored once
//! and recorded as a [`CompiledMdp`] with generated names (`state_0`,
//! `act_0`, ...). The translation tables map keys back to the original
//! states and actions, so a policy computed on the explicit model can drive
//! the original one through [`TranslatedPolicy`].

use std::collections::VecDeque;

use valuegraph_core::{Mdp, Policy, SolverError};

use crate::{
    ActionKey, ActionSpec, CompiledMdp, MdpError, MdpSpec, OutcomeSpec, StateKey, StateSpec,
    interner::Interner,
};

/// A compiled copy of an MDP's reachable part with its translation tables.
#[derive(Debug, Clone)]
pub struct Explicitation<S, A>
where
    S: Clone + Eq + std::hash::Hash,
    A: Clone + Eq + std::hash::Hash,
{
    mdp: CompiledMdp,
    states: Interner<S>,
    actions: Interner<A>,
}

fn state_name(index: usize) -> String {
    format!("state_{index}")
}

fn action_name(index: usize) -> String {
    format!("act_{index}")
}

/// Explore `mdp` from its initial state and compile what was reached.
///
/// States are numbered in breadth-first discovery order, actions in order of
/// first use. Each reachable state keeps its applicable actions in the order
/// `mdp` enumerates them.
pub fn explicit_from_mdp<M>(mdp: &M) -> Result<Explicitation<M::State, M::Action>, MdpError>
where
    M: Mdp + ?Sized,
{
    let mut states = Interner::new();
    let mut actions = Interner::new();
    let mut specs: Vec<StateSpec> = Vec::new();
    let mut open = VecDeque::new();

    let (initial, _) = states.intern(mdp.initial_state());
    specs.push(StateSpec {
        id: state_name(initial),
        actions: Vec::new(),
    });
    open.push_back(mdp.initial_state());

    while let Some(state) = open.pop_front() {
        let (index, _) = states.intern(state.clone());
        let mut action_specs = Vec::new();

        for action in mdp.applicable_actions(&state) {
            let outcomes = mdp
                .next_states(&state, &action)
                .into_iter()
                .map(|outcome| {
                    let (next, discovered) = states.intern(outcome.state.clone());
                    if discovered {
                        specs.push(StateSpec {
                            id: state_name(next),
                            actions: Vec::new(),
                        });
                        open.push_back(outcome.state);
                    }
                    OutcomeSpec {
                        next: state_name(next),
                        prob: outcome.prob,
                        reward: outcome.reward,
                    }
                })
                .collect();

            let (action_index, _) = actions.intern(action);
            action_specs.push(ActionSpec {
                id: action_name(action_index),
                outcomes,
            });
        }

        specs[index].actions = action_specs;
    }

    tracing::debug!(
        states = states.len(),
        actions = actions.len(),
        "explored reachable state space"
    );

    let spec = MdpSpec {
        version: Some(1),
        start: state_name(initial),
        states: specs,
    };
    let compiled = spec.compile()?;

    Ok(Explicitation {
        mdp: compiled,
        states,
        actions,
    })
}

impl<S, A> Explicitation<S, A>
where
    S: Clone + Eq + std::hash::Hash + std::fmt::Debug,
    A: Clone + Eq + std::hash::Hash + std::fmt::Debug,
{
    /// The explicit model.
    pub fn mdp(&self) -> &CompiledMdp {
        &self.mdp
    }

    /// Original state behind `key`.
    pub fn original_state(&self, key: StateKey) -> Option<&S> {
        self.states.get(key.index())
    }

    /// Original action behind `key`.
    pub fn original_action(&self, key: ActionKey) -> Option<&A> {
        self.actions.get(key.index())
    }

    /// Key of an original state, if it was reached.
    pub fn state_key(&self, state: &S) -> Option<StateKey> {
        self.states.index_of(state).map(StateKey::from)
    }

    /// Key of an original action, if it was used.
    pub fn action_key(&self, action: &A) -> Option<ActionKey> {
        self.actions.index_of(action).map(ActionKey::from)
    }

    /// Wrap a policy of the explicit model so it acts on the original one.
    pub fn translate<P>(&self, policy: P) -> TranslatedPolicy<'_, S, A, P>
    where
        P: Policy<CompiledMdp>,
    {
        TranslatedPolicy {
            explicitation: self,
            policy,
        }
    }
}

/// A policy of the explicit model acting on the original MDP.
#[derive(Debug, Clone)]
pub struct TranslatedPolicy<'e, S, A, P>
where
    S: Clone + Eq + std::hash::Hash,
    A: Clone + Eq + std::hash::Hash,
{
    explicitation: &'e Explicitation<S, A>,
    policy: P,
}

impl<'e, S, A, P> TranslatedPolicy<'e, S, A, P>
where
    S: Clone + Eq + std::hash::Hash,
    A: Clone + Eq + std::hash::Hash,
{
    /// Policy of the explicit model this one delegates to.
    pub fn inner(&self) -> &P {
        &self.policy
    }
}

impl<M, P> Policy<M> for TranslatedPolicy<'_, M::State, M::Action, P>
where
    M: Mdp + ?Sized,
    P: Policy<CompiledMdp>,
{
    fn action(&self, _mdp: &M, state: &M::State) -> Result<M::Action, SolverError> {
        let explicit = self.explicitation;
        let key = explicit
            .state_key(state)
            .ok_or_else(|| SolverError::UnknownEntity {
                kind: "state",
                entity: format!("{state:?}"),
            })?;
        let action = self.policy.action(&explicit.mdp, &key)?;
        explicit
            .original_action(action)
            .cloned()
            .ok_or_else(|| SolverError::UnknownEntity {
                kind: "action",
                entity: format!("{action:?}"),
            })
    }
}
