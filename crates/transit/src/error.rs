use std::fmt;

use crate::descriptor::InvocationDescriptor;

/// Error type for bridge operations.
///
/// Every variant is surfaced to the immediate caller; the only failure the bridge
/// recovers from locally is a structural copy that cannot be made, which degrades to
/// retaining the whole value.
#[derive(Debug, Clone)]
pub enum BridgeError {
    /// Release or lookup of a handle that is not in the retain table: never minted,
    /// already released, or not a handle at all.
    UnknownHandle { handle: String },
    /// An invocation was attempted before the host installed its dispatcher.
    ///
    /// Carries the fully built descriptor so the caller can see what was attempted.
    DispatcherNotInstalled { descriptor: Box<InvocationDescriptor> },
    /// `retain_element` was called on a primitive, which never needs a handle.
    NotRetainable { type_name: &'static str },
    /// `call` was given something other than a native function stub.
    NotCallable { type_name: &'static str },
    /// The host dispatcher reported a failure.
    Host(HostError),
}

impl fmt::Display for BridgeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownHandle { handle } => write!(f, "no retained element with id {handle}"),
            Self::DispatcherNotInstalled { descriptor } => write!(
                f,
                "no native dispatcher installed, cannot invoke {}",
                serde_json::to_string(descriptor).unwrap_or_else(|_| descriptor.native_id.clone())
            ),
            Self::NotRetainable { type_name } => write!(f, "a {type_name} cannot be retained"),
            Self::NotCallable { type_name } => write!(f, "a {type_name} is not a native function stub"),
            Self::Host(error) => write!(f, "{error}"),
        }
    }
}

impl std::error::Error for BridgeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Host(error) => Some(error),
            _ => None,
        }
    }
}

impl From<HostError> for BridgeError {
    fn from(error: HostError) -> Self {
        Self::Host(error)
    }
}

/// Failure reported by the host's dispatcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostError {
    message: String,
}

impl HostError {
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for HostError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "host error: {}", self.message)
    }
}

impl std::error::Error for HostError {}

impl From<String> for HostError {
    fn from(message: String) -> Self {
        Self { message }
    }
}

impl From<&str> for HostError {
    fn from(message: &str) -> Self {
        Self::new(message)
    }
}
