//! Strongly connected components of an MDP's transition graph.
//!
//! The graph has one node per declared state and an edge `s -> s'` for every
//! outcome of every applicable action. Components are found with Tarjan's
//! algorithm driven by an explicit work stack, so deep graphs cannot exhaust
//! the call stack.

use std::collections::HashMap;

use crate::solver::{
    ccgraph::{CCGraph, ConnectedComponent},
    error::SolverError,
    ids::ComponentId,
    mdp::Mdp,
};

/// Transition graph over dense state indices.
struct StateGraph<S> {
    states: Vec<S>,
    successors: Vec<Vec<usize>>,
}

impl<S> StateGraph<S>
where
    S: Clone + Eq + std::hash::Hash + std::fmt::Debug,
{
    fn from_mdp<M>(mdp: &M) -> Result<Self, SolverError>
    where
        M: Mdp<State = S> + ?Sized,
    {
        let states = mdp.states();
        let index: HashMap<&S, usize> = states.iter().enumerate().map(|(i, s)| (s, i)).collect();

        let mut successors = Vec::with_capacity(states.len());
        for state in &states {
            let mut next = Vec::new();
            for action in mdp.applicable_actions(state) {
                for outcome in mdp.next_states(state, &action) {
                    let target = index
                        .get(&outcome.state)
                        .copied()
                        .ok_or_else(|| SolverError::unknown_state(&outcome.state))?;
                    next.push(target);
                }
            }
            successors.push(next);
        }

        Ok(StateGraph { states, successors })
    }
}

/// Bookkeeping of one Tarjan run.
struct Tarjan<'g> {
    successors: &'g [Vec<usize>],
    discovery: Vec<Option<usize>>,
    low: Vec<usize>,
    on_stack: Vec<bool>,
    stack: Vec<usize>,
    time: usize,
    components: Vec<Vec<usize>>,
}

impl<'g> Tarjan<'g> {
    fn new(successors: &'g [Vec<usize>]) -> Self {
        let n = successors.len();
        Tarjan {
            successors,
            discovery: vec![None; n],
            low: vec![0; n],
            on_stack: vec![false; n],
            stack: Vec::new(),
            time: 0,
            components: Vec::new(),
        }
    }

    fn discover(&mut self, node: usize) {
        self.discovery[node] = Some(self.time);
        self.low[node] = self.time;
        self.time += 1;
        self.stack.push(node);
        self.on_stack[node] = true;
    }

    /// Depth-first search from `root`; each frame is a node and the position
    /// of the next successor to visit.
    fn visit(&mut self, root: usize) {
        let successors = self.successors;
        let mut frames: Vec<(usize, usize)> = Vec::new();
        self.discover(root);
        frames.push((root, 0));

        while let Some(frame) = frames.last_mut() {
            let node = frame.0;
            if let Some(&succ) = successors[node].get(frame.1) {
                frame.1 += 1;
                match self.discovery[succ] {
                    None => {
                        self.discover(succ);
                        frames.push((succ, 0));
                    }
                    Some(succ_discovery) if self.on_stack[succ] => {
                        self.low[node] = self.low[node].min(succ_discovery);
                    }
                    Some(_) => {}
                }
                continue;
            }

            frames.pop();
            if Some(self.low[node]) == self.discovery[node] {
                self.close_component(node);
            }
            if let Some(&(parent, _)) = frames.last() {
                self.low[parent] = self.low[parent].min(self.low[node]);
            }
        }
    }

    /// Pop the stack down to and including `root`.
    fn close_component(&mut self, root: usize) {
        let mut component = Vec::new();
        while let Some(member) = self.stack.pop() {
            self.on_stack[member] = false;
            component.push(member);
            if member == root {
                break;
            }
        }
        self.components.push(component);
    }

    /// Components in completion order: a component completes after every
    /// component it can reach.
    fn run(mut self) -> Vec<Vec<usize>> {
        for node in 0..self.successors.len() {
            if self.discovery[node].is_none() {
                self.visit(node);
            }
        }
        self.components
    }
}

fn components_of<M>(mdp: &M) -> Result<(StateGraph<M::State>, Vec<Vec<usize>>), SolverError>
where
    M: Mdp + ?Sized,
{
    let graph = StateGraph::from_mdp(mdp)?;
    let components = Tarjan::new(&graph.successors).run();
    tracing::debug!(
        states = graph.states.len(),
        components = components.len(),
        "strongly connected components computed"
    );
    Ok((graph, components))
}

/// Decompose `mdp` into strongly connected components chained in completion
/// order: each component's only child is the component completed just
/// before it, and the last completed component is the single root.
pub fn compute_connected_components<M>(mdp: &M) -> Result<CCGraph<M::State>, SolverError>
where
    M: Mdp + ?Sized,
{
    let (graph, components) = components_of(mdp)?;
    let mut result = CCGraph::new();
    let mut previous: Option<ComponentId> = None;

    for members in components {
        let states = members.iter().map(|&i| graph.states[i].clone()).collect();
        let component = ConnectedComponent::new(states, previous);
        previous = Some(result.add_connected_component(component)?);
    }

    Ok(result)
}

/// Decompose `mdp` into its condensation DAG: each component's children are
/// all the distinct components it has an edge into.
pub fn compute_condensation<M>(mdp: &M) -> Result<CCGraph<M::State>, SolverError>
where
    M: Mdp + ?Sized,
{
    let (graph, components) = components_of(mdp)?;
    let mut component_of = vec![ComponentId::from(0); graph.states.len()];
    let mut result = CCGraph::new();

    // Completion order guarantees every child is inserted before its parent.
    for (idx, members) in components.iter().enumerate() {
        let own = ComponentId::from(idx);
        for &member in members {
            component_of[member] = own;
        }

        let children: Vec<ComponentId> = members
            .iter()
            .flat_map(|&member| graph.successors[member].iter())
            .map(|&succ| component_of[succ])
            .filter(|&child| child != own)
            .collect();
        let states = members.iter().map(|&i| graph.states[i].clone()).collect();

        let id = result.add_connected_component(ConnectedComponent::new(states, children))?;
        debug_assert_eq!(id, own);
    }

    Ok(result)
}
