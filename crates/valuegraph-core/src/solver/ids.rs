/// A wrapper for an integer index used to address components in a `CCGraph`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ComponentId(usize);

impl ComponentId {
    /// Get the position of the component in its graph's arena.
    pub fn index(&self) -> usize {
        self.0
    }
}

impl From<usize> for ComponentId {
    /// Allow for explicit conversion from usize to ComponentId
    fn from(value: usize) -> Self {
        ComponentId(value)
    }
}
