use std::slice::Iter;

use crate::solver::ids::ComponentId;

/// Append-only storage handing out dense `ComponentId`s.
#[derive(Debug, Clone)]
pub(crate) struct Arena<T> {
    storage: Vec<T>,
}

impl<T> Default for Arena<T> {
    fn default() -> Self {
        Arena {
            storage: Vec::new(),
        }
    }
}

impl<T> Arena<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `item` under the next free id.
    pub fn allocate(&mut self, item: T) -> ComponentId {
        let id = ComponentId::from(self.storage.len());
        self.storage.push(item);
        id
    }

    pub fn get(&self, id: ComponentId) -> Option<&T> {
        self.storage.get(id.index())
    }

    pub fn len(&self) -> usize {
        self.storage.len()
    }

    /// Items in allocation order; the position is the id.
    pub fn iter(&self) -> Iter<'_, T> {
        self.storage.iter()
    }
}
