use std::sync::Arc;

use arc_swap::ArcSwapOption;

/// Lock-free holder of the most recently published value.
///
/// Readers get a shared handle to the current value; publishing replaces it
/// without disturbing handles already given out.
#[derive(Debug)]
pub struct Slot<T> {
    value: ArcSwapOption<T>,
}

impl<T> Default for Slot<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Slot<T> {
    pub fn new() -> Self {
        Self {
            value: ArcSwapOption::empty(),
        }
    }

    /// Stores a value, replacing any existing value, and returns the shared handle.
    pub fn publish(&self, val: T) -> Arc<T> {
        let val = Arc::new(val);
        self.value.store(Some(Arc::clone(&val)));
        val
    }

    /// Returns the current value without removing it.
    pub fn latest(&self) -> Option<Arc<T>> {
        self.value.load_full()
    }
}
