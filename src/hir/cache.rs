//! Memoized, invalidatable derived data.

use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;

/// A lazily built value that can be dropped and rebuilt.
///
/// The slot is either empty or holds a fully built value: the builder runs
/// under the write lock and its result is stored in one step, so readers
/// never observe a half-built value.
pub struct Memo<T> {
    slot: RwLock<Option<Arc<T>>>,
}

impl<T> Default for Memo<T> {
    fn default() -> Self {
        Self {
            slot: RwLock::new(None),
        }
    }
}

impl<T> Memo<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the memoized value, building it first if the slot is empty.
    ///
    /// `build` must not touch this same memo.
    pub fn get_or_build(&self, build: impl FnOnce() -> T) -> Arc<T> {
        // Fast path: already built (read lock)
        {
            let slot = self.slot.read();
            if let Some(value) = slot.as_ref() {
                return Arc::clone(value);
            }
        }

        // Slow path: build (write lock)
        let mut slot = self.slot.write();

        // Double-check after acquiring write lock
        if let Some(value) = slot.as_ref() {
            return Arc::clone(value);
        }

        let value = Arc::new(build());
        *slot = Some(Arc::clone(&value));
        value
    }

    /// Discard any memoized value and build a fresh one.
    pub fn rebuild(&self, build: impl FnOnce() -> T) -> Arc<T> {
        let mut slot = self.slot.write();
        let value = Arc::new(build());
        *slot = Some(Arc::clone(&value));
        value
    }

    /// Drop the memoized value.
    pub fn invalidate(&self) {
        *self.slot.write() = None;
    }

    pub fn is_built(&self) -> bool {
        self.slot.read().is_some()
    }
}

impl<T> fmt::Debug for Memo<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Memo")
            .field("built", &self.is_built())
            .finish()
    }
}
