//! Wrappers that derive a new MDP from an existing one.
//!
//! Each wrapper keeps the inner model's states, actions and initial state and
//! changes either rewards or applicability, selected by predicates over
//! states and actions. Wrap a reference (`&mdp`) to keep using the inner
//! model afterwards.

use valuegraph_core::{ActionOutcome, Mdp};

fn charge<S>(outcomes: Vec<ActionOutcome<S>>, cost: f64) -> Vec<ActionOutcome<S>> {
    outcomes
        .into_iter()
        .map(|outcome| ActionOutcome::new(outcome.prob, outcome.state, outcome.reward - cost))
        .collect()
}

/// Charges `cost` on every outcome of the actions matching a predicate.
#[derive(Clone)]
pub struct ActionCost<M, A> {
    mdp: M,
    charged: A,
    cost: f64,
}

/// Subtract `cost` from the reward of every action for which `charged`
/// holds, in every state.
pub fn add_cost_to_actions<M, A>(mdp: M, charged: A, cost: f64) -> ActionCost<M, A>
where
    M: Mdp,
    A: Fn(&M::Action) -> bool,
{
    ActionCost { mdp, charged, cost }
}

impl<M, A> ActionCost<M, A> {
    pub fn inner(&self) -> &M {
        &self.mdp
    }
}

impl<M, A> Mdp for ActionCost<M, A>
where
    M: Mdp,
    A: Fn(&M::Action) -> bool,
{
    type State = M::State;
    type Action = M::Action;

    fn states(&self) -> Vec<M::State> {
        self.mdp.states()
    }

    fn actions(&self) -> Vec<M::Action> {
        self.mdp.actions()
    }

    fn applicable_actions(&self, state: &M::State) -> Vec<M::Action> {
        self.mdp.applicable_actions(state)
    }

    fn next_states(&self, state: &M::State, action: &M::Action) -> Vec<ActionOutcome<M::State>> {
        let outcomes = self.mdp.next_states(state, action);
        if (self.charged)(action) {
            charge(outcomes, self.cost)
        } else {
            outcomes
        }
    }

    fn initial_state(&self) -> M::State {
        self.mdp.initial_state()
    }
}

/// Charges `cost` on matching actions, only in matching states.
#[derive(Clone)]
pub struct StateActionPenalty<M, A, S> {
    mdp: M,
    charged: A,
    in_state: S,
    cost: f64,
}

/// Subtract `cost` from the reward of actions matching `charged` when they
/// are executed in a state matching `in_state`.
pub fn penalise_state_action<M, A, S>(
    mdp: M,
    charged: A,
    in_state: S,
    cost: f64,
) -> StateActionPenalty<M, A, S>
where
    M: Mdp,
    A: Fn(&M::Action) -> bool,
    S: Fn(&M::State) -> bool,
{
    StateActionPenalty {
        mdp,
        charged,
        in_state,
        cost,
    }
}

impl<M, A, S> StateActionPenalty<M, A, S> {
    pub fn inner(&self) -> &M {
        &self.mdp
    }
}

impl<M, A, S> Mdp for StateActionPenalty<M, A, S>
where
    M: Mdp,
    A: Fn(&M::Action) -> bool,
    S: Fn(&M::State) -> bool,
{
    type State = M::State;
    type Action = M::Action;

    fn states(&self) -> Vec<M::State> {
        self.mdp.states()
    }

    fn actions(&self) -> Vec<M::Action> {
        self.mdp.actions()
    }

    fn applicable_actions(&self, state: &M::State) -> Vec<M::Action> {
        self.mdp.applicable_actions(state)
    }

    fn next_states(&self, state: &M::State, action: &M::Action) -> Vec<ActionOutcome<M::State>> {
        let outcomes = self.mdp.next_states(state, action);
        if (self.in_state)(state) && (self.charged)(action) {
            charge(outcomes, self.cost)
        } else {
            outcomes
        }
    }

    fn initial_state(&self) -> M::State {
        self.mdp.initial_state()
    }
}

/// Removes matching actions from matching states.
#[derive(Clone)]
pub struct ForbiddenActions<M, A, S> {
    mdp: M,
    forbidden: A,
    in_state: S,
}

/// Forbid actions matching `forbidden` in states matching `in_state`.
///
/// A state whose every action would be forbidden keeps all of them, so the
/// result still has an applicable action everywhere.
pub fn forbid_actions_in_states<M, A, S>(
    mdp: M,
    forbidden: A,
    in_state: S,
) -> ForbiddenActions<M, A, S>
where
    M: Mdp,
    A: Fn(&M::Action) -> bool,
    S: Fn(&M::State) -> bool,
{
    ForbiddenActions {
        mdp,
        forbidden,
        in_state,
    }
}

impl<M, A, S> ForbiddenActions<M, A, S> {
    pub fn inner(&self) -> &M {
        &self.mdp
    }
}

impl<M, A, S> Mdp for ForbiddenActions<M, A, S>
where
    M: Mdp,
    A: Fn(&M::Action) -> bool,
    S: Fn(&M::State) -> bool,
{
    type State = M::State;
    type Action = M::Action;

    fn states(&self) -> Vec<M::State> {
        self.mdp.states()
    }

    fn actions(&self) -> Vec<M::Action> {
        self.mdp.actions()
    }

    fn applicable_actions(&self, state: &M::State) -> Vec<M::Action> {
        let actions = self.mdp.applicable_actions(state);
        if !(self.in_state)(state) {
            return actions;
        }
        let allowed: Vec<M::Action> = actions
            .iter()
            .filter(|action| !(self.forbidden)(*action))
            .cloned()
            .collect();
        if allowed.is_empty() { actions } else { allowed }
    }

    fn next_states(&self, state: &M::State, action: &M::Action) -> Vec<ActionOutcome<M::State>> {
        self.mdp.next_states(state, action)
    }

    fn initial_state(&self) -> M::State {
        self.mdp.initial_state()
    }
}
