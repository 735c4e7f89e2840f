use std::collections::HashMap;
use std::hash::Hash;

/// Assigns dense, stable indices to values in order of first insertion.
#[derive(Debug, Clone)]
pub struct Interner<T>
where
    T: Clone + Eq + Hash,
{
    values: Vec<T>,
    index_of: HashMap<T, usize>,
}

impl<T> Default for Interner<T>
where
    T: Clone + Eq + Hash,
{
    fn default() -> Self {
        Self {
            values: Vec::new(),
            index_of: HashMap::new(),
        }
    }
}

impl<T> Interner<T>
where
    T: Clone + Eq + Hash,
{
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `value` if needed and return its index together with whether
    /// it was new.
    pub fn intern(&mut self, value: T) -> (usize, bool) {
        if let Some(index) = self.index_of.get(&value) {
            return (*index, false);
        }

        let index = self.values.len();
        self.values.push(value.clone());
        self.index_of.insert(value, index);
        (index, true)
    }

    pub fn get(&self, index: usize) -> Option<&T> {
        self.values.get(index)
    }

    pub fn index_of(&self, value: &T) -> Option<usize> {
        self.index_of.get(value).copied()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Values in index order.
    pub fn values(&self) -> &[T] {
        &self.values
    }
}

#[cfg(test)]
mod tests {
    use super::Interner;

    #[test]
    fn interning_is_stable_and_dense() {
        let mut interner = Interner::new();
        assert_eq!(interner.intern("b"), (0, true));
        assert_eq!(interner.intern("a"), (1, true));
        assert_eq!(interner.intern("b"), (0, false));

        assert_eq!(interner.len(), 2);
        assert_eq!(interner.get(1), Some(&"a"));
        assert_eq!(interner.index_of(&"c"), None);
        assert_eq!(interner.values(), &["b", "a"]);
    }
}
