use crate::{
    function::Function,
    heap::{Heap, HeapData},
    value::Value,
};

/// How a value must be represented when it crosses the boundary.
///
/// Produced once per value by [`classify`] and then dispatched on exhaustively, so the
/// proxification rules live in one `match` rather than in scattered type tests.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Classification<'h> {
    /// `undefined`, `null`, booleans, numbers and strings: passed through unchanged.
    Primitive,
    /// A script function (retained) or a native stub (tagged).
    Function(&'h Function),
    /// A host node: always retained, never copied.
    OpaqueHostNode,
    /// A plain object or array: structurally copied when possible.
    PlainObject,
}

impl Classification<'_> {
    /// Name used in error messages.
    #[must_use]
    pub fn type_name(self) -> &'static str {
        match self {
            Self::Primitive => "primitive",
            Self::Function(Function::Script(_)) => "function",
            Self::Function(Function::Native(_)) => "native function",
            Self::OpaqueHostNode => "host node",
            Self::PlainObject => "object",
        }
    }
}

/// Classifies `value` against the heap it was allocated on.
///
/// # Panics
/// Panics if `value` references an id that was not produced by `heap`.
#[must_use]
pub fn classify<'h>(heap: &'h Heap, value: &Value) -> Classification<'h> {
    let Value::Ref(id) = value else {
        return Classification::Primitive;
    };
    match heap.get(*id) {
        HeapData::Function(function) => Classification::Function(function),
        HeapData::HostNode(_) => Classification::OpaqueHostNode,
        HeapData::Object(_) | HeapData::Array(_) => Classification::PlainObject,
    }
}
