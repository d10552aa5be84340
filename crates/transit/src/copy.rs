//! Structural copy of plain objects and arrays into inert [`Proxied`] data.
//!
//! The copy follows JSON round-trip semantics, which is what the host side expects of
//! "inert data": object properties holding `undefined` or a function are omitted, array
//! slots holding them become `null`, non-finite numbers become `null`, and a nested host
//! node becomes `{}`. A reference cycle or excessive nesting makes the value
//! non-serializable; the caller then falls back to retaining the whole value.

use std::fmt;

use ahash::AHashSet;
use indexmap::IndexMap;

use crate::{
    heap::{Heap, HeapData, HeapId},
    proxied::Proxied,
    value::Value,
};

/// Why a value could not be structurally copied.
///
/// Never surfaced to callers of `proxify`; it is reported to the bridge tracer and
/// answered by retaining the value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NonSerializableValue {
    /// The value at `at` is reachable from itself.
    Cycle { at: HeapId },
    /// Nesting exceeded the configured `max_copy_depth`.
    TooDeep { limit: usize },
}

impl fmt::Display for NonSerializableValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cycle { at } => write!(f, "cyclic structure through ref #{}", at.index()),
            Self::TooDeep { limit } => write!(f, "structure nested deeper than {limit} levels"),
        }
    }
}

impl std::error::Error for NonSerializableValue {}

/// Copies `value` into inert data, or reports why it cannot be copied.
pub(crate) fn structural_copy(heap: &Heap, value: &Value, max_depth: usize) -> Result<Proxied, NonSerializableValue> {
    let mut copier = StructuralCopy {
        heap,
        path: AHashSet::new(),
        max_depth,
    };
    Ok(copier.copy_member(value, 0)?.unwrap_or_default())
}

struct StructuralCopy<'h> {
    heap: &'h Heap,
    /// Containers on the path from the root to the value being copied.
    ///
    /// Only the current path counts: a child shared by two siblings is copied twice,
    /// not reported as a cycle.
    path: AHashSet<HeapId>,
    max_depth: usize,
}

impl StructuralCopy<'_> {
    /// Copies one member; `None` means the member has no JSON representation
    /// (`undefined` or a function).
    fn copy_member(&mut self, value: &Value, depth: usize) -> Result<Option<Proxied>, NonSerializableValue> {
        let copied = match value {
            Value::Undefined => return Ok(None),
            Value::Null => Proxied::Null,
            Value::Bool(b) => Proxied::Bool(*b),
            Value::Number(n) if n.is_finite() => Proxied::Number(*n),
            Value::Number(_) => Proxied::Null,
            Value::String(s) => Proxied::String(s.clone()),
            Value::Ref(id) => match self.heap.get(*id) {
                HeapData::Function(_) => return Ok(None),
                HeapData::HostNode(_) => Proxied::Object(IndexMap::new()),
                HeapData::Object(_) | HeapData::Array(_) => self.copy_container(*id, depth + 1)?,
            },
        };
        Ok(Some(copied))
    }

    fn copy_container(&mut self, id: HeapId, depth: usize) -> Result<Proxied, NonSerializableValue> {
        if depth > self.max_depth {
            return Err(NonSerializableValue::TooDeep { limit: self.max_depth });
        }
        if !self.path.insert(id) {
            return Err(NonSerializableValue::Cycle { at: id });
        }
        let heap = self.heap;
        let copied = match heap.get(id) {
            HeapData::Object(properties) => {
                let mut map = IndexMap::with_capacity(properties.len());
                for (key, member) in properties {
                    if let Some(copied) = self.copy_member(member, depth)? {
                        map.insert(key.clone(), copied);
                    }
                }
                Proxied::Object(map)
            }
            HeapData::Array(items) => {
                let mut out = Vec::with_capacity(items.len());
                for member in items {
                    out.push(self.copy_member(member, depth)?.unwrap_or(Proxied::Null));
                }
                Proxied::Array(out)
            }
            HeapData::Function(_) | HeapData::HostNode(_) => Proxied::Undefined,
        };
        self.path.remove(&id);
        Ok(copied)
    }
}
