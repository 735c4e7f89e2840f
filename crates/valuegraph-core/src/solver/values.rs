use std::{collections::HashMap, hash::Hash};

use crate::solver::mdp::Mdp;

/// Value of every state, backed by a sparse map.
/// States that were never set have the value `0.0`.
#[derive(Debug, Clone, PartialEq)]
pub struct StateValueFunction<S>
where
    S: Eq + Hash,
{
    values: HashMap<S, f64>,
}

impl<S> Default for StateValueFunction<S>
where
    S: Eq + Hash,
{
    fn default() -> Self {
        StateValueFunction {
            values: HashMap::new(),
        }
    }
}

impl<S> StateValueFunction<S>
where
    S: Clone + Eq + Hash,
{
    /// Create a value function that is zero everywhere.
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy the values of `other` for every state of `mdp`.
    pub fn restricted_to<M>(mdp: &M, other: &StateValueFunction<S>) -> Self
    where
        M: Mdp<State = S> + ?Sized,
    {
        let values = mdp
            .states()
            .into_iter()
            .map(|state| {
                let value = other.value(&state);
                (state, value)
            })
            .collect();
        StateValueFunction { values }
    }

    /// Value of `state`, `0.0` when unset.
    pub fn value(&self, state: &S) -> f64 {
        self.values.get(state).copied().unwrap_or(0.0)
    }

    /// Value of `state` only if it was explicitly set.
    pub fn get(&self, state: &S) -> Option<f64> {
        self.values.get(state).copied()
    }

    /// Override the value of `state`.
    pub fn set_value(&mut self, state: S, value: f64) {
        self.values.insert(state, value);
    }

    /// Number of explicitly set states.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&S, f64)> {
        self.values.iter().map(|(state, value)| (state, *value))
    }
}

/// Value of every `(state, action)` pair, backed by a sparse map.
/// Pairs that were never set have the value `0.0`.
#[derive(Debug, Clone, PartialEq)]
pub struct ActionValueFunction<S, A>
where
    S: Eq + Hash,
    A: Eq + Hash,
{
    values: HashMap<S, HashMap<A, f64>>,
}

impl<S, A> Default for ActionValueFunction<S, A>
where
    S: Eq + Hash,
    A: Eq + Hash,
{
    fn default() -> Self {
        ActionValueFunction {
            values: HashMap::new(),
        }
    }
}

impl<S, A> ActionValueFunction<S, A>
where
    S: Clone + Eq + Hash,
    A: Clone + Eq + Hash,
{
    pub fn new() -> Self {
        Self::default()
    }

    /// Value of `(state, action)`, `0.0` when unset.
    pub fn value(&self, state: &S, action: &A) -> f64 {
        self.get(state, action).unwrap_or(0.0)
    }

    /// Value of `(state, action)` only if it was explicitly set.
    pub fn get(&self, state: &S, action: &A) -> Option<f64> {
        self.values
            .get(state)
            .and_then(|per_action| per_action.get(action))
            .copied()
    }

    /// Override the value of `(state, action)`.
    pub fn set_value(&mut self, state: S, action: A, value: f64) {
        self.values.entry(state).or_default().insert(action, value);
    }

    /// Number of explicitly set pairs.
    pub fn len(&self) -> usize {
        self.values.values().map(HashMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Sup-norm distance between two value functions over the states of `mdp`.
///
/// This is the Bellman residual used as stopping criterion by every solver.
/// An MDP without states yields `0.0`.
pub fn state_value_difference<M>(
    mdp: &M,
    v1: &StateValueFunction<M::State>,
    v2: &StateValueFunction<M::State>,
) -> f64
where
    M: Mdp + ?Sized,
{
    max_difference(mdp.states().iter(), v1, v2)
}

/// Sup-norm distance restricted to the given states.
pub(crate) fn max_difference<'a, S>(
    states: impl IntoIterator<Item = &'a S>,
    v1: &StateValueFunction<S>,
    v2: &StateValueFunction<S>,
) -> f64
where
    S: Clone + Eq + Hash + 'a,
{
    states
        .into_iter()
        .map(|state| (v1.value(state) - v2.value(state)).abs())
        .fold(0.0, f64::max)
}
