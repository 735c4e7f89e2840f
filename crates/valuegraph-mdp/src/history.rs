use std::fmt;

/// Record of one execution: `s0, a1, r1, s1, ..., ak, rk, sk`.
#[derive(Debug, Clone, PartialEq)]
pub struct History<S, A> {
    states: Vec<S>,
    actions: Vec<A>,
    rewards: Vec<f64>,
}

impl<S, A> History<S, A> {
    /// Start a history in `initial`.
    pub fn new(initial: S) -> Self {
        Self {
            states: vec![initial],
            actions: Vec::new(),
            rewards: Vec::new(),
        }
    }

    /// Record that `action` earned `reward` and led to `next`.
    pub fn push(&mut self, action: A, reward: f64, next: S) {
        self.actions.push(action);
        self.rewards.push(reward);
        self.states.push(next);
    }

    /// Number of executed steps.
    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// State before step `i`; `state(len())` is the last state.
    pub fn state(&self, i: usize) -> Option<&S> {
        self.states.get(i)
    }

    /// Action of step `i`, for `i < len()`.
    pub fn action(&self, i: usize) -> Option<&A> {
        self.actions.get(i)
    }

    /// Reward of step `i`, for `i < len()`.
    pub fn reward(&self, i: usize) -> Option<f64> {
        self.rewards.get(i).copied()
    }

    pub fn last_state(&self) -> &S {
        // `states` always holds the initial state.
        &self.states[self.states.len() - 1]
    }

    pub fn total_reward(&self) -> f64 {
        self.rewards.iter().sum()
    }

    /// `sum_i gamma^i * r_i` over the recorded rewards.
    pub fn discounted_return(&self, gamma: f64) -> f64 {
        self.rewards
            .iter()
            .rev()
            .fold(0.0, |acc, reward| reward + gamma * acc)
    }

    /// Iterate `(state, action, reward, next)` steps.
    pub fn steps(&self) -> impl Iterator<Item = (&S, &A, f64, &S)> {
        self.actions.iter().enumerate().map(|(i, action)| {
            (
                &self.states[i],
                action,
                self.rewards[i],
                &self.states[i + 1],
            )
        })
    }
}

impl<S, A> fmt::Display for History<S, A>
where
    S: fmt::Debug,
    A: fmt::Debug,
{
    /// One line per step, then the last state.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (state, action, reward, _) in self.steps() {
            writeln!(f, "{state:?}\taction: {action:?}\treward: {reward}")?;
        }
        write!(f, "{:?}", self.last_state())
    }
}
