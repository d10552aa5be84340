use crate::handle::NativeTag;

/// A callable living on the scripting-side heap.
#[derive(Debug, Clone, PartialEq)]
pub enum Function {
    /// A function authored in the scripting environment.
    ///
    /// Its body runs inside the scripting engine; the bridge only needs its identity so
    /// it can be retained and later called back by the host.
    Script(ScriptFunction),
    /// A stub created by [`Bridge::native_function`](crate::Bridge::native_function) that
    /// forwards to a host-owned callable.
    Native(NativeFunction),
}

impl Function {
    /// Short name used in error messages and traces.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Script(f) => &f.name,
            Self::Native(f) => f.tag.native_id(),
        }
    }

    /// Returns the native tag when this is a host stub.
    #[must_use]
    pub fn native_tag(&self) -> Option<&NativeTag> {
        match self {
            Self::Native(f) => Some(&f.tag),
            Self::Script(_) => None,
        }
    }
}

/// Identity of a scripting-authored function.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptFunction {
    /// Debug name; empty for anonymous functions.
    pub name: String,
}

/// Stub standing in for a host-owned callable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NativeFunction {
    tag: NativeTag,
}

impl NativeFunction {
    #[must_use]
    pub fn new(native_id: impl Into<String>) -> Self {
        Self {
            tag: NativeTag::new(native_id),
        }
    }

    #[must_use]
    pub fn tag(&self) -> &NativeTag {
        &self.tag
    }
}
