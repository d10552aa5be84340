use crate::{proxied::Proxied, value::Value};

/// What the host dispatcher receives for one invocation.
///
/// Serializes as `{"nativeId": ..., "thisArg": ..., "args": [...]}`; a global receiver
/// renders `thisArg` as `null`.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvocationDescriptor {
    /// Identifies the host-side callable.
    pub native_id: String,
    /// Proxified receiver, or `None` when the call had no explicit receiver.
    pub this_arg: Option<Proxied>,
    /// Proxified arguments, in call order.
    pub args: Vec<Proxied>,
}

/// The receiver (`this`) of a call into the host.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Receiver {
    /// The global/root execution context: the call has no explicit receiver.
    #[default]
    Global,
    /// An explicit receiver, proxified like any argument.
    Value(Value),
}

impl From<Value> for Receiver {
    fn from(value: Value) -> Self {
        Self::Value(value)
    }
}
