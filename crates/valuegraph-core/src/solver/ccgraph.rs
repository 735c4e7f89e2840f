use std::collections::BTreeSet;

use crate::solver::{arena::Arena, error::SolverError, ids::ComponentId};

/// One strongly connected component of an MDP's transition graph.
#[derive(Debug, Clone, PartialEq)]
pub struct ConnectedComponent<S> {
    states: Vec<S>,
    children: BTreeSet<ComponentId>,
}

impl<S> ConnectedComponent<S> {
    /// Create a component from its states and the ids of its children.
    pub fn new(states: Vec<S>, children: impl IntoIterator<Item = ComponentId>) -> Self {
        ConnectedComponent {
            states,
            children: children.into_iter().collect(),
        }
    }

    pub fn states(&self) -> &[S] {
        &self.states
    }

    /// Components this one leads to, already present in the graph.
    pub fn children(&self) -> &BTreeSet<ComponentId> {
        &self.children
    }
}

/// Graph of connected components, stored in an arena and entered from a set
/// of roots. Every component is reachable from some root.
#[derive(Debug, Clone)]
pub struct CCGraph<S> {
    arena: Arena<ConnectedComponent<S>>,
    roots: BTreeSet<ComponentId>,
}

impl<S> Default for CCGraph<S> {
    fn default() -> Self {
        CCGraph {
            arena: Arena::new(),
            roots: BTreeSet::new(),
        }
    }
}

impl<S> CCGraph<S> {
    /// Create an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `component` as a new root.
    ///
    /// Its children stop being roots since they are now reachable through it.
    /// Children must already belong to the graph.
    pub fn add_connected_component(
        &mut self,
        component: ConnectedComponent<S>,
    ) -> Result<ComponentId, SolverError> {
        if let Some(missing) = component
            .children
            .iter()
            .find(|child| self.arena.get(**child).is_none())
        {
            return Err(SolverError::UnknownEntity {
                kind: "component",
                entity: missing.index().to_string(),
            });
        }

        for child in &component.children {
            self.roots.remove(child);
        }
        let id = self.arena.allocate(component);
        self.roots.insert(id);
        Ok(id)
    }

    pub fn roots(&self) -> &BTreeSet<ComponentId> {
        &self.roots
    }

    /// Return the component stored under `id`.
    pub fn component(&self, id: ComponentId) -> Option<&ConnectedComponent<S>> {
        self.arena.get(id)
    }

    /// Number of components ever added.
    pub fn len(&self) -> usize {
        self.arena.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arena.len() == 0
    }

    /// Iterate components in insertion order with their ids.
    pub fn iter(&self) -> impl Iterator<Item = (ComponentId, &ConnectedComponent<S>)> {
        self.arena
            .iter()
            .enumerate()
            .map(|(idx, component)| (ComponentId::from(idx), component))
    }

    /// Count the components reachable from the roots.
    pub fn nb_components(&self) -> usize {
        let mut open: Vec<ComponentId> = self.roots.iter().copied().collect();
        let mut closed: BTreeSet<ComponentId> = self.roots.clone();
        let mut result = 0;

        while let Some(id) = open.pop() {
            result += 1;
            let Some(component) = self.arena.get(id) else {
                continue;
            };
            for child in &component.children {
                if closed.insert(*child) {
                    open.push(*child);
                }
            }
        }

        result
    }

    /// Reachable components ordered so that every child comes before its
    /// parents. Roots are explored in increasing id order.
    pub fn topological_order(&self) -> Vec<ComponentId> {
        let mut order = Vec::with_capacity(self.arena.len());
        let mut visited = vec![false; self.arena.len()];
        // Each frame is a component and the position of its next child.
        let mut stack: Vec<(ComponentId, Vec<ComponentId>, usize)> = Vec::new();

        for root in &self.roots {
            if visited[root.index()] {
                continue;
            }
            visited[root.index()] = true;
            stack.push((*root, self.children_of(*root), 0));

            while let Some((id, children, next)) = stack.last_mut() {
                if let Some(child) = children.get(*next).copied() {
                    *next += 1;
                    if !visited[child.index()] {
                        visited[child.index()] = true;
                        let grandchildren = self.children_of(child);
                        stack.push((child, grandchildren, 0));
                    }
                } else {
                    order.push(*id);
                    stack.pop();
                }
            }
        }

        order
    }

    fn children_of(&self, id: ComponentId) -> Vec<ComponentId> {
        self.arena
            .get(id)
            .map(|component| component.children.iter().copied().collect())
            .unwrap_or_default()
    }
}
