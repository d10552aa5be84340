#![doc = include_str!("../../../README.md")]

mod bridge;
mod classify;
mod config;
mod copy;
mod descriptor;
mod dispatch;
mod error;
mod function;
mod handle;
mod heap;
mod proxied;
mod proxify;
mod retain;
pub mod tracer;
mod value;

pub use crate::{
    bridge::Bridge,
    classify::{Classification, classify},
    config::{BridgeConfig, MAX_COPY_DEPTH},
    copy::NonSerializableValue,
    descriptor::{InvocationDescriptor, Receiver},
    dispatch::{Dispatcher, NativeHandlerFn, NativeRegistry},
    error::{BridgeError, HostError},
    function::{Function, NativeFunction, ScriptFunction},
    handle::{
        FUNCTION_HANDLE_PREFIX, Handle, HandleKind, NATIVE_TAG_PREFIX, NativeTag, OBJECT_HANDLE_PREFIX,
        ParseHandleError,
    },
    heap::{Heap, HeapData, HeapId, HostNode, Properties},
    proxied::Proxied,
    retain::RetainTable,
    tracer::{BridgeTracer, LogTracer, NoopTracer, RecordingTracer, TraceEvent},
    value::Value,
};
