use std::fmt;

use crate::{
    classify::{Classification, classify},
    config::BridgeConfig,
    descriptor::{InvocationDescriptor, Receiver},
    dispatch::Dispatcher,
    error::BridgeError,
    function::Function,
    handle::{Handle, HandleKind},
    heap::Heap,
    proxied::Proxied,
    proxify::{Proxifier, retain_traced},
    retain::RetainTable,
    tracer::{BridgeTracer, NoopTracer},
    value::Value,
};

/// One boundary between a scripting environment and its host.
///
/// The bridge owns the scripting-side [`Heap`], the [`RetainTable`], the host dispatcher
/// slot and the configuration. It is created once at startup and passed by `&mut` to
/// whatever needs to marshal values; independent bridges share nothing.
///
/// Every operation that mints or releases handles takes `&mut self`, so handle
/// allocation is never interleaved with another bridge operation. Sharing a bridge
/// between threads requires wrapping it in a mutex.
pub struct Bridge<Tr: BridgeTracer = NoopTracer> {
    heap: Heap,
    retained: RetainTable,
    dispatcher: Option<Box<dyn Dispatcher>>,
    config: BridgeConfig,
    tracer: Tr,
}

impl Bridge<NoopTracer> {
    /// Creates a bridge with no dispatcher installed.
    #[must_use]
    pub fn new(config: BridgeConfig) -> Self {
        Self::with_tracer(config, NoopTracer)
    }
}

impl Default for Bridge<NoopTracer> {
    fn default() -> Self {
        Self::new(BridgeConfig::default())
    }
}

impl<Tr: BridgeTracer> fmt::Debug for Bridge<Tr> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Bridge")
            .field("heap_len", &self.heap.len())
            .field("retained", &self.retained.len())
            .field("dispatcher_installed", &self.dispatcher.is_some())
            .field("config", &self.config)
            .field("tracer", &self.tracer)
            .finish()
    }
}

impl<Tr: BridgeTracer> Bridge<Tr> {
    /// Creates a bridge that reports events to `tracer`.
    #[must_use]
    pub fn with_tracer(config: BridgeConfig, tracer: Tr) -> Self {
        Self {
            heap: Heap::new(),
            retained: RetainTable::new(),
            dispatcher: None,
            config,
            tracer,
        }
    }

    /// The scripting-side heap.
    #[must_use]
    pub fn heap(&self) -> &Heap {
        &self.heap
    }

    /// Mutable access to the scripting-side heap, for building values.
    pub fn heap_mut(&mut self) -> &mut Heap {
        &mut self.heap
    }

    /// The retain table, for host-side inspection.
    #[must_use]
    pub fn retained(&self) -> &RetainTable {
        &self.retained
    }

    #[must_use]
    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    #[must_use]
    pub fn tracer(&self) -> &Tr {
        &self.tracer
    }

    pub fn tracer_mut(&mut self) -> &mut Tr {
        &mut self.tracer
    }

    /// Installs the host dispatcher, replacing any previous one.
    pub fn install_dispatcher(&mut self, dispatcher: impl Dispatcher + 'static) {
        if self.dispatcher.is_some() {
            log::warn!("replacing the installed native dispatcher");
        }
        self.dispatcher = Some(Box::new(dispatcher));
    }

    /// Removes the host dispatcher; later invocations fail until a new one is installed.
    ///
    /// Returns whether a dispatcher was installed.
    pub fn uninstall_dispatcher(&mut self) -> bool {
        self.dispatcher.take().is_some()
    }

    #[must_use]
    pub fn has_dispatcher(&self) -> bool {
        self.dispatcher.is_some()
    }

    /// Creates a scripting-side stub for the host callable `native_id`.
    ///
    /// Calling the stub through [`Bridge::call`] invokes the host; proxifying it (for
    /// example when it is passed back as a callback) yields its native tag rather than a
    /// new handle.
    pub fn native_function(&mut self, native_id: impl Into<String>) -> Value {
        self.heap.native_function(native_id)
    }

    /// Converts `value` into its boundary-safe representation.
    ///
    /// May mint handles; never releases any.
    ///
    /// # Panics
    /// Panics if `value` references a heap value allocated by another bridge.
    pub fn proxify(&mut self, value: &Value) -> Proxied {
        Proxifier::new(&self.heap, &mut self.retained, &mut self.tracer, &self.config).proxify(value)
    }

    /// Builds the descriptor for a call of `native_id` and hands it to the dispatcher.
    ///
    /// The receiver and the arguments are proxified in one session, receiver first and
    /// arguments in order. The dispatcher's result is returned unchanged. Handles minted
    /// while building the descriptor stay retained even if the call fails.
    ///
    /// # Panics
    /// Panics if the receiver or an argument references a heap value allocated by another
    /// bridge.
    pub fn invoke_native(
        &mut self,
        native_id: &str,
        receiver: &Receiver,
        args: &[Value],
    ) -> Result<Proxied, BridgeError> {
        let descriptor = {
            let mut session = Proxifier::new(&self.heap, &mut self.retained, &mut self.tracer, &self.config);
            let this_arg = match receiver {
                Receiver::Global => None,
                Receiver::Value(value) => Some(session.proxify(value)),
            };
            let args = args.iter().map(|arg| session.proxify(arg)).collect();
            InvocationDescriptor {
                native_id: native_id.to_owned(),
                this_arg,
                args,
            }
        };

        let Some(dispatcher) = self.dispatcher.as_mut() else {
            return Err(BridgeError::DispatcherNotInstalled {
                descriptor: Box::new(descriptor),
            });
        };
        self.tracer.on_invoke(&descriptor);
        let result = dispatcher.dispatch(descriptor);
        self.tracer.on_dispatch_result(native_id, result.is_ok());
        result.map_err(BridgeError::Host)
    }

    /// Calls a native function stub.
    ///
    /// Script-authored functions run inside the scripting engine, not here, so anything
    /// other than a stub from [`Bridge::native_function`] fails with
    /// [`BridgeError::NotCallable`].
    pub fn call(&mut self, callee: &Value, receiver: &Receiver, args: &[Value]) -> Result<Proxied, BridgeError> {
        let native_id = match classify(&self.heap, callee) {
            Classification::Function(Function::Native(stub)) => stub.tag().native_id().to_owned(),
            other => {
                return Err(BridgeError::NotCallable {
                    type_name: other.type_name(),
                });
            }
        };
        self.invoke_native(&native_id, receiver, args)
    }

    /// Retains a function or object and returns its handle.
    ///
    /// The handle kind follows the value: functions (including native stubs) get a
    /// function handle, everything else on the heap an object handle. Primitives never
    /// need a handle and are rejected.
    ///
    /// # Panics
    /// Panics if `value` references a heap value allocated by another bridge.
    pub fn retain_element(&mut self, value: Value) -> Result<Handle, BridgeError> {
        let kind = match classify(&self.heap, &value) {
            Classification::Primitive => {
                return Err(BridgeError::NotRetainable {
                    type_name: Classification::Primitive.type_name(),
                });
            }
            Classification::Function(_) => HandleKind::Function,
            Classification::OpaqueHostNode | Classification::PlainObject => HandleKind::Object,
        };
        Ok(retain_traced(&mut self.retained, &mut self.tracer, value, kind))
    }

    /// Releases `handle`, returning the value it kept alive.
    pub fn release(&mut self, handle: Handle) -> Result<Value, BridgeError> {
        let value = self.retained.release(handle)?;
        self.tracer.on_release(handle);
        Ok(value)
    }

    /// Releases a handle given in its wire form.
    ///
    /// A string that is not a handle at all fails the same way as a handle that was
    /// never minted.
    pub fn release_element_with_id(&mut self, handle: &str) -> Result<Value, BridgeError> {
        let parsed = handle.parse::<Handle>().map_err(|_| BridgeError::UnknownHandle {
            handle: handle.to_owned(),
        })?;
        self.release(parsed)
    }

    /// Resolves a handle given in its wire form.
    #[must_use]
    pub fn resolve(&self, handle: &str) -> Option<&Value> {
        self.retained.get(handle.parse().ok()?)
    }

    /// Releases every retained value, returning the handles in mint order.
    ///
    /// Used when tearing a boundary down; handle ids keep increasing afterwards.
    pub fn release_all(&mut self) -> Vec<Handle> {
        let released = self.retained.release_all();
        for handle in &released {
            self.tracer.on_release(*handle);
        }
        released
    }
}
