//! Registry of scripting-side values the host holds handles to.
//!
//! The table owns each retained value strongly until the host releases the handle.
//! There is no eviction, reference counting or weak tracking: forgetting to release
//! leaks the entry, which is preferred over a handle that silently stops resolving.

use indexmap::IndexMap;

use crate::{
    error::BridgeError,
    handle::{Handle, HandleKind},
    value::Value,
};

/// Handle → value registry with a monotonically increasing id counter.
#[derive(Debug, Default)]
pub struct RetainTable {
    /// Live entries in mint order.
    entries: IndexMap<Handle, Value>,
    /// Last id handed out; ids start at 1 and are never reused.
    last_id: u64,
}

impl RetainTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `value` under a freshly minted handle of the given kind.
    pub fn retain(&mut self, value: Value, kind: HandleKind) -> Handle {
        self.last_id += 1;
        let handle = Handle::new(kind, self.last_id);
        self.entries.insert(handle, value);
        handle
    }

    /// Removes the entry for `handle` and hands the value back.
    ///
    /// Releasing a handle twice, or one that was never minted, is a programmer error and
    /// fails with [`BridgeError::UnknownHandle`].
    pub fn release(&mut self, handle: Handle) -> Result<Value, BridgeError> {
        self.entries
            .shift_remove(&handle)
            .ok_or_else(|| BridgeError::UnknownHandle {
                handle: handle.to_string(),
            })
    }

    /// Releases every entry, returning the released handles in mint order.
    ///
    /// The id counter is left untouched, so handles minted afterwards are still new.
    pub fn release_all(&mut self) -> Vec<Handle> {
        self.entries.drain(..).map(|(handle, _)| handle).collect()
    }

    /// Resolves a handle to its value.
    #[must_use]
    pub fn get(&self, handle: Handle) -> Option<&Value> {
        self.entries.get(&handle)
    }

    #[must_use]
    pub fn contains(&self, handle: Handle) -> bool {
        self.entries.contains_key(&handle)
    }

    /// Number of live entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Live handles in mint order.
    pub fn handles(&self) -> impl Iterator<Item = Handle> + '_ {
        self.entries.keys().copied()
    }

    /// Id of the most recently minted handle, or 0 before the first retain.
    #[must_use]
    pub fn last_id(&self) -> u64 {
        self.last_id
    }
}
