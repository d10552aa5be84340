//! The host side of an invocation.
//!
//! The bridge never executes native code itself: it builds an
//! [`InvocationDescriptor`] and hands it to whatever [`Dispatcher`] the host installed.
//! Any `FnMut(InvocationDescriptor) -> Result<Proxied, HostError>` closure is a
//! dispatcher; [`NativeRegistry`] is a ready-made one that routes by native id.

use std::collections::HashMap;

use crate::{descriptor::InvocationDescriptor, error::HostError, proxied::Proxied};

/// Host-supplied implementation of `doInvokeNative`.
///
/// Called synchronously; a host whose execution is asynchronous must block or otherwise
/// present a synchronous boundary here.
pub trait Dispatcher {
    /// Performs the invocation described by `descriptor` and returns its result.
    fn dispatch(&mut self, descriptor: InvocationDescriptor) -> Result<Proxied, HostError>;
}

impl<F> Dispatcher for F
where
    F: FnMut(InvocationDescriptor) -> Result<Proxied, HostError>,
{
    fn dispatch(&mut self, descriptor: InvocationDescriptor) -> Result<Proxied, HostError> {
        self(descriptor)
    }
}

/// Handler for one native function: receives the proxified receiver and arguments.
pub type NativeHandlerFn = Box<dyn FnMut(Option<Proxied>, Vec<Proxied>) -> Result<Proxied, HostError>>;

/// Dispatcher that routes invocations to handlers registered by native id.
///
/// An invocation of an unregistered id fails with a [`HostError`].
#[derive(Default)]
pub struct NativeRegistry {
    handlers: HashMap<String, NativeHandlerFn>,
}

impl NativeRegistry {
    /// Creates a new empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers (or replaces) the handler for `native_id`.
    pub fn register(
        &mut self,
        native_id: impl Into<String>,
        handler: impl FnMut(Option<Proxied>, Vec<Proxied>) -> Result<Proxied, HostError> + 'static,
    ) {
        self.handlers.insert(native_id.into(), Box::new(handler));
    }

    /// Check if a handler is registered.
    #[must_use]
    pub fn contains(&self, native_id: &str) -> bool {
        self.handlers.contains_key(native_id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

impl std::fmt::Debug for NativeRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut ids: Vec<&str> = self.handlers.keys().map(String::as_str).collect();
        ids.sort_unstable();
        f.debug_struct("NativeRegistry").field("native_ids", &ids).finish()
    }
}

impl Dispatcher for NativeRegistry {
    fn dispatch(&mut self, descriptor: InvocationDescriptor) -> Result<Proxied, HostError> {
        let InvocationDescriptor {
            native_id,
            this_arg,
            args,
        } = descriptor;
        let handler = self
            .handlers
            .get_mut(&native_id)
            .ok_or_else(|| HostError::new(format!("unknown native function '{native_id}'")))?;
        handler(this_arg, args)
    }
}
