use std::fmt;

use crate::heap::HeapId;

/// A scripting-side value.
///
/// Primitives are stored inline; everything with identity (objects, arrays, functions,
/// host nodes) lives on the [`Heap`](crate::Heap) and is referenced through `Ref`.
/// Cloning a `Ref` copies the reference, not the referenced data.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    /// The scripting environment's `undefined`.
    #[default]
    Undefined,
    /// The scripting environment's `null`.
    Null,
    Bool(bool),
    /// IEEE 754 double; the scripting environment has a single number type.
    Number(f64),
    String(String),
    /// Reference to a heap value.
    Ref(HeapId),
}

impl Value {
    /// Returns `true` for every variant except `Ref`.
    #[must_use]
    pub fn is_primitive(&self) -> bool {
        !matches!(self, Self::Ref(_))
    }

    /// Returns the heap id for reference values.
    #[must_use]
    pub fn heap_id(&self) -> Option<HeapId> {
        match self {
            Self::Ref(id) => Some(*id),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Undefined => f.write_str("undefined"),
            Self::Null => f.write_str("null"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Number(n) => write!(f, "{n}"),
            Self::String(s) => f.write_str(s),
            Self::Ref(id) => write!(f, "<ref #{}>", id.index()),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Self::Number(f64::from(n))
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::String(s.to_owned())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<HeapId> for Value {
    fn from(id: HeapId) -> Self {
        Self::Ref(id)
    }
}
