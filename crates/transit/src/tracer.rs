//! Bridge tracing infrastructure.
//!
//! The [`BridgeTracer`] trait defines hook points at the events that matter when
//! debugging a boundary: handles minted and released, copies that had to fall back to
//! retention, native tags passed through, and invocations handed to the host.
//!
//! | Tracer | Purpose |
//! |--------|---------|
//! | [`NoopTracer`] | Zero-cost no-op (default) |
//! | [`LogTracer`] | Forwards events to the `log` facade |
//! | [`RecordingTracer`] | Full event recording for tests or post-mortem |
//!
//! The bridge is parameterized as `Bridge<Tr: BridgeTracer>`, so with [`NoopTracer`] every
//! hook compiles away through monomorphization:
//!
//! ```
//! use transit::{Bridge, BridgeConfig, RecordingTracer};
//!
//! let mut bridge = Bridge::with_tracer(BridgeConfig::default(), RecordingTracer::new());
//! let f = bridge.heap_mut().script_function("onDone");
//! bridge.proxify(&f);
//! assert_eq!(bridge.tracer().events().len(), 1);
//! ```

use crate::{
    copy::NonSerializableValue,
    descriptor::InvocationDescriptor,
    handle::{Handle, NativeTag},
};

/// Event recorded by [`RecordingTracer`].
#[derive(Debug, Clone, PartialEq)]
pub enum TraceEvent {
    /// A value was stored in the retain table.
    Retain { handle: Handle },
    /// A handle was released by the host or by `release_all`.
    Release { handle: Handle },
    /// A plain object could not be copied and was retained whole.
    CopyFallback {
        reason: NonSerializableValue,
        handle: Handle,
    },
    /// A native stub crossed the boundary as its tag.
    NativeTag { tag: NativeTag },
    /// An invocation descriptor was handed to the dispatcher.
    Invoke {
        native_id: String,
        has_receiver: bool,
        arg_count: usize,
    },
    /// The dispatcher returned; `ok` is false when it reported a failure.
    DispatchResult { native_id: String, ok: bool },
}

/// Hooks called by the bridge. All methods default to no-ops.
pub trait BridgeTracer: std::fmt::Debug {
    /// Called after a value has been retained under `handle`.
    #[inline(always)]
    fn on_retain(&mut self, _handle: Handle) {}

    /// Called after `handle` has been removed from the retain table.
    #[inline(always)]
    fn on_release(&mut self, _handle: Handle) {}

    /// Called when a structural copy failed and the value was retained under `handle`.
    #[inline(always)]
    fn on_copy_fallback(&mut self, _reason: &NonSerializableValue, _handle: Handle) {}

    /// Called when a native stub is proxified to its tag.
    #[inline(always)]
    fn on_native_tag(&mut self, _tag: &NativeTag) {}

    /// Called just before a descriptor is handed to the dispatcher.
    #[inline(always)]
    fn on_invoke(&mut self, _descriptor: &InvocationDescriptor) {}

    /// Called when the dispatcher returns.
    #[inline(always)]
    fn on_dispatch_result(&mut self, _native_id: &str, _ok: bool) {}
}

/// Tracer that does nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopTracer;

impl BridgeTracer for NoopTracer {}

/// Tracer that forwards every event to the `log` facade.
///
/// Retain/release traffic is logged at `trace`, invocations and copy fallbacks at
/// `debug`, dispatcher failures at `warn`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogTracer;

impl BridgeTracer for LogTracer {
    fn on_retain(&mut self, handle: Handle) {
        log::trace!("retained {handle}");
    }

    fn on_release(&mut self, handle: Handle) {
        log::trace!("released {handle}");
    }

    fn on_copy_fallback(&mut self, reason: &NonSerializableValue, handle: Handle) {
        log::debug!("structural copy failed ({reason}), retained whole value as {handle}");
    }

    fn on_native_tag(&mut self, tag: &NativeTag) {
        log::trace!("passing native function tag {tag}");
    }

    fn on_invoke(&mut self, descriptor: &InvocationDescriptor) {
        log::debug!(
            "invoking native '{}' with {} argument(s), receiver: {}",
            descriptor.native_id,
            descriptor.args.len(),
            if descriptor.this_arg.is_some() { "explicit" } else { "global" }
        );
    }

    fn on_dispatch_result(&mut self, native_id: &str, ok: bool) {
        if !ok {
            log::warn!("native '{native_id}' reported a failure");
        }
    }
}

/// Tracer that records every event in order.
#[derive(Debug, Clone, Default)]
pub struct RecordingTracer {
    events: Vec<TraceEvent>,
}

impl RecordingTracer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Events recorded so far.
    #[must_use]
    pub fn events(&self) -> &[TraceEvent] {
        &self.events
    }

    /// Consumes the tracer and returns the recorded events.
    #[must_use]
    pub fn into_events(self) -> Vec<TraceEvent> {
        self.events
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}

impl BridgeTracer for RecordingTracer {
    fn on_retain(&mut self, handle: Handle) {
        self.events.push(TraceEvent::Retain { handle });
    }

    fn on_release(&mut self, handle: Handle) {
        self.events.push(TraceEvent::Release { handle });
    }

    fn on_copy_fallback(&mut self, reason: &NonSerializableValue, handle: Handle) {
        self.events.push(TraceEvent::CopyFallback {
            reason: *reason,
            handle,
        });
    }

    fn on_native_tag(&mut self, tag: &NativeTag) {
        self.events.push(TraceEvent::NativeTag { tag: tag.clone() });
    }

    fn on_invoke(&mut self, descriptor: &InvocationDescriptor) {
        self.events.push(TraceEvent::Invoke {
            native_id: descriptor.native_id.clone(),
            has_receiver: descriptor.this_arg.is_some(),
            arg_count: descriptor.args.len(),
        });
    }

    fn on_dispatch_result(&mut self, native_id: &str, ok: bool) {
        self.events.push(TraceEvent::DispatchResult {
            native_id: native_id.to_owned(),
            ok,
        });
    }
}
