//! Arena for scripting-side values that have identity.
//!
//! Objects, arrays, functions and host nodes are allocated here and referenced by
//! [`HeapId`]. Because references are plain ids, structures can share children and
//! form cycles (`a.self = a`), which is exactly what the proxification engine has to
//! cope with. The arena never frees: values handed to the retain table stay resolvable
//! for as long as the bridge lives, and releasing a handle only ends the handle's
//! validity.

use std::sync::atomic::{AtomicU64, Ordering};

use indexmap::IndexMap;

use crate::{
    function::{Function, NativeFunction, ScriptFunction},
    handle::parse_canonical,
    value::Value,
};

static NEXT_HEAP_OWNER: AtomicU64 = AtomicU64::new(1);

/// Generate the owner tag for a new heap.
fn generate_heap_owner() -> u64 {
    NEXT_HEAP_OWNER.fetch_add(1, Ordering::Relaxed)
}

/// Index of a value on the [`Heap`] that allocated it.
///
/// The id carries the allocating heap's owner tag, so an id can never address a slot of
/// another heap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HeapId {
    owner: u64,
    index: usize,
}

impl HeapId {
    /// Returns the raw index value.
    #[inline]
    #[must_use]
    pub fn index(self) -> usize {
        self.index
    }
}

/// Own enumerable properties of a plain object, in insertion order.
pub type Properties = IndexMap<String, Value>;

/// Data stored in a heap slot.
#[derive(Debug, Clone, PartialEq)]
pub enum HeapData {
    /// A plain object.
    Object(Properties),
    /// An array; indices are its own enumerable keys.
    Array(Vec<Value>),
    Function(Function),
    /// A host-visible node (e.g. a platform UI element) that must never be copied.
    HostNode(HostNode),
}

/// Opaque node handed to the scripting environment by the host's UI layer.
///
/// The bridge never looks inside; a node crossing the boundary on its own is always
/// retained, and a node nested inside a copied structure degrades to `{}` because it has
/// no own enumerable properties.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostNode {
    /// Node type as reported by the host, e.g. `"div"` or `"#document"`.
    pub node_name: String,
}

/// Arena of scripting-side reference values.
#[derive(Debug)]
pub struct Heap {
    owner: u64,
    entries: Vec<HeapData>,
}

impl Default for Heap {
    fn default() -> Self {
        Self {
            owner: generate_heap_owner(),
            entries: Vec::new(),
        }
    }
}

impl Heap {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocates a new heap entry.
    pub fn allocate(&mut self, data: HeapData) -> HeapId {
        let id = HeapId {
            owner: self.owner,
            index: self.entries.len(),
        };
        self.entries.push(data);
        id
    }

    /// Returns `true` if `id` was allocated by this heap.
    #[must_use]
    pub fn owns(&self, id: HeapId) -> bool {
        id.owner == self.owner && id.index < self.entries.len()
    }

    /// Returns the data stored at the given ID.
    ///
    /// # Panics
    /// Panics if the id was not produced by this heap.
    #[must_use]
    pub fn get(&self, id: HeapId) -> &HeapData {
        self.get_if_live(id)
            .unwrap_or_else(|| panic!("heap id #{} was not allocated by this heap", id.index))
    }

    /// Returns heap data if `id` belongs to this heap.
    #[must_use]
    pub fn get_if_live(&self, id: HeapId) -> Option<&HeapData> {
        if id.owner != self.owner {
            return None;
        }
        self.entries.get(id.index)
    }

    /// Returns a mutable reference to the data stored at the given ID.
    ///
    /// # Panics
    /// Panics if the id was not produced by this heap.
    pub fn get_mut(&mut self, id: HeapId) -> &mut HeapData {
        self.get_mut_if_live(id)
            .unwrap_or_else(|| panic!("heap id #{} was not allocated by this heap", id.index))
    }

    fn get_mut_if_live(&mut self, id: HeapId) -> Option<&mut HeapData> {
        if id.owner != self.owner {
            return None;
        }
        self.entries.get_mut(id.index)
    }

    /// Number of allocated values.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Allocates a plain object with the given properties.
    pub fn object<K: Into<String>>(&mut self, properties: impl IntoIterator<Item = (K, Value)>) -> Value {
        let properties = properties.into_iter().map(|(k, v)| (k.into(), v)).collect();
        Value::Ref(self.allocate(HeapData::Object(properties)))
    }

    /// Allocates an array.
    pub fn array(&mut self, items: impl IntoIterator<Item = Value>) -> Value {
        Value::Ref(self.allocate(HeapData::Array(items.into_iter().collect())))
    }

    /// Allocates a scripting-authored function.
    pub fn script_function(&mut self, name: impl Into<String>) -> Value {
        let function = Function::Script(ScriptFunction { name: name.into() });
        Value::Ref(self.allocate(HeapData::Function(function)))
    }

    /// Allocates a stub for a host-owned native function.
    pub(crate) fn native_function(&mut self, native_id: impl Into<String>) -> Value {
        let function = Function::Native(NativeFunction::new(native_id));
        Value::Ref(self.allocate(HeapData::Function(function)))
    }

    /// Allocates an opaque host node.
    pub fn host_node(&mut self, node_name: impl Into<String>) -> Value {
        let node = HostNode {
            node_name: node_name.into(),
        };
        Value::Ref(self.allocate(HeapData::HostNode(node)))
    }

    /// Sets (or appends) a property on a plain object.
    ///
    /// Returns `false`, leaving the heap untouched, when `id` is not a plain object.
    pub fn set_property(&mut self, id: HeapId, key: impl Into<String>, value: Value) -> bool {
        match self.get_mut_if_live(id) {
            Some(HeapData::Object(properties)) => {
                properties.insert(key.into(), value);
                true
            }
            _ => false,
        }
    }

    /// Appends an element to an array.
    ///
    /// Returns `false`, leaving the heap untouched, when `id` is not an array.
    pub fn push(&mut self, id: HeapId, value: Value) -> bool {
        match self.get_mut_if_live(id) {
            Some(HeapData::Array(items)) => {
                items.push(value);
                true
            }
            _ => false,
        }
    }

    /// Reads a property of a plain object, or an index of an array when `key` is numeric.
    #[must_use]
    pub fn property(&self, id: HeapId, key: &str) -> Option<&Value> {
        match self.get_if_live(id)? {
            HeapData::Object(properties) => properties.get(key),
            HeapData::Array(items) => parse_canonical::<usize>(key).and_then(|index| items.get(index)),
            HeapData::Function(_) | HeapData::HostNode(_) => None,
        }
    }
}
