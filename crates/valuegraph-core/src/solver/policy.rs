use std::{
    collections::{HashMap, HashSet},
    hash::Hash,
};

use crate::solver::{error::SolverError, mdp::Mdp};

/// A deterministic Markov policy.
pub trait Policy<M>
where
    M: Mdp + ?Sized,
{
    /// Return the action this policy executes in `state`.
    fn action(&self, mdp: &M, state: &M::State) -> Result<M::Action, SolverError>;
}

/// Deterministic policy stored as an explicit decision table.
///
/// States without an explicit decision fall back to the *first* action of
/// `applicable_actions`, in the order the MDP enumerates them.
#[derive(Debug, Clone, PartialEq)]
pub struct ExplicitPolicy<S, A>
where
    S: Eq + Hash,
{
    decisions: HashMap<S, A>,
}

impl<S, A> Default for ExplicitPolicy<S, A>
where
    S: Eq + Hash,
{
    fn default() -> Self {
        ExplicitPolicy {
            decisions: HashMap::new(),
        }
    }
}

impl<S, A> ExplicitPolicy<S, A>
where
    S: Clone + Eq + Hash,
    A: Clone,
{
    /// Create a policy with no explicit decision.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the decision for `state`.
    pub fn set_action(&mut self, state: S, action: A) {
        self.decisions.insert(state, action);
    }

    /// Explicit decision for `state`, if any.
    pub fn decision(&self, state: &S) -> Option<&A> {
        self.decisions.get(state)
    }

    /// Resolve the decision for `state` and cache it, falling back to the
    /// first applicable action.
    pub fn resolve<M>(&mut self, mdp: &M, state: &S) -> Result<A, SolverError>
    where
        M: Mdp<State = S, Action = A> + ?Sized,
    {
        if let Some(action) = self.decisions.get(state) {
            return Ok(action.clone());
        }
        let action = first_applicable(mdp, state)?;
        self.decisions.insert(state.clone(), action.clone());
        Ok(action)
    }

    /// Number of explicit decisions.
    pub fn len(&self) -> usize {
        self.decisions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.decisions.is_empty()
    }
}

impl<M> Policy<M> for ExplicitPolicy<M::State, M::Action>
where
    M: Mdp + ?Sized,
{
    fn action(&self, mdp: &M, state: &M::State) -> Result<M::Action, SolverError> {
        match self.decisions.get(state) {
            Some(action) => Ok(action.clone()),
            None => first_applicable(mdp, state),
        }
    }
}

fn first_applicable<M>(mdp: &M, state: &M::State) -> Result<M::Action, SolverError>
where
    M: Mdp + ?Sized,
{
    mdp.applicable_actions(state)
        .into_iter()
        .next()
        .ok_or_else(|| SolverError::no_applicable_actions(state))
}

/// Non-deterministic policy: a set of allowed actions per state.
#[derive(Debug, Clone, PartialEq)]
pub struct NdPolicy<S, A>
where
    S: Eq + Hash,
    A: Eq + Hash,
{
    actions: HashMap<S, HashSet<A>>,
}

impl<S, A> Default for NdPolicy<S, A>
where
    S: Eq + Hash,
    A: Eq + Hash,
{
    fn default() -> Self {
        NdPolicy {
            actions: HashMap::new(),
        }
    }
}

impl<S, A> NdPolicy<S, A>
where
    S: Clone + Eq + Hash,
    A: Clone + Eq + Hash,
{
    /// Create a policy that allows nothing yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the policy allowing exactly the decision of `policy` in every
    /// state of `mdp`.
    pub fn from_policy<M, P>(mdp: &M, policy: &P) -> Result<Self, SolverError>
    where
        M: Mdp<State = S, Action = A> + ?Sized,
        P: Policy<M> + ?Sized,
    {
        let mut result = Self::new();
        result.add_det_policy(mdp, policy)?;
        Ok(result)
    }

    /// Allow `action` in `state`. Returns `false` if it was already allowed.
    pub fn add(&mut self, state: S, action: A) -> bool {
        self.actions.entry(state).or_default().insert(action)
    }

    /// Allow every action `other` allows.
    pub fn add_nd_policy(&mut self, other: &NdPolicy<S, A>) {
        for (state, actions) in &other.actions {
            let allowed = self.actions.entry(state.clone()).or_default();
            allowed.extend(actions.iter().cloned());
        }
    }

    /// Allow the decision of `policy` in every state of `mdp`.
    pub fn add_det_policy<M, P>(&mut self, mdp: &M, policy: &P) -> Result<(), SolverError>
    where
        M: Mdp<State = S, Action = A> + ?Sized,
        P: Policy<M> + ?Sized,
    {
        for state in mdp.states() {
            let action = policy.action(mdp, &state)?;
            self.add(state, action);
        }
        Ok(())
    }

    /// Actions allowed in `state`.
    pub fn actions(&self, state: &S) -> Result<&HashSet<A>, SolverError>
    where
        S: std::fmt::Debug,
    {
        self.actions
            .get(state)
            .ok_or_else(|| SolverError::unknown_state(state))
    }

    /// Whether `action` is allowed in `state`.
    pub fn allows(&self, state: &S, action: &A) -> bool {
        self.actions
            .get(state)
            .is_some_and(|allowed| allowed.contains(action))
    }

    /// Total number of allowed `(state, action)` pairs.
    pub fn pair_count(&self) -> usize {
        self.actions.values().map(HashSet::len).sum()
    }

    /// Number of states with at least one entry.
    pub fn state_count(&self) -> usize {
        self.actions.len()
    }
}
