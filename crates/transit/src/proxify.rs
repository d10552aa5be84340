//! The proxification engine: decides, value by value, how a value crosses the boundary.

use ahash::AHashMap;

use crate::{
    classify::{Classification, classify},
    config::BridgeConfig,
    copy::structural_copy,
    function::Function,
    handle::{Handle, HandleKind},
    heap::{Heap, HeapData, HeapId},
    proxied::Proxied,
    retain::RetainTable,
    tracer::BridgeTracer,
    value::Value,
};

/// One proxification session.
///
/// A session spans a single top-level `proxify` call or a whole invocation (receiver
/// plus arguments). When [`BridgeConfig::reuse_handles_within_call`] is set, a heap value
/// met twice within the session is retained once and both occurrences carry the same
/// handle.
///
/// The session may mint handles but never releases or mutates existing entries.
pub(crate) struct Proxifier<'a, Tr: BridgeTracer> {
    heap: &'a Heap,
    retained: &'a mut RetainTable,
    tracer: &'a mut Tr,
    config: &'a BridgeConfig,
    minted: AHashMap<HeapId, Handle>,
}

impl<'a, Tr: BridgeTracer> Proxifier<'a, Tr> {
    pub fn new(heap: &'a Heap, retained: &'a mut RetainTable, tracer: &'a mut Tr, config: &'a BridgeConfig) -> Self {
        Self {
            heap,
            retained,
            tracer,
            config,
            minted: AHashMap::new(),
        }
    }

    /// Produces the boundary representation of `value`.
    pub fn proxify(&mut self, value: &Value) -> Proxied {
        match classify(self.heap, value) {
            Classification::Primitive => primitive(value),
            Classification::Function(Function::Native(stub)) => {
                self.tracer.on_native_tag(stub.tag());
                Proxied::NativeTag(stub.tag().clone())
            }
            Classification::Function(Function::Script(_)) => Proxied::Handle(self.retain(value, HandleKind::Function)),
            Classification::OpaqueHostNode => Proxied::Handle(self.retain(value, HandleKind::Object)),
            Classification::PlainObject => self.proxify_plain(value),
        }
    }

    fn proxify_plain(&mut self, value: &Value) -> Proxied {
        // already retained whole earlier in this session
        if let Some(handle) = self.reused(value) {
            return Proxied::Handle(handle);
        }
        match structural_copy(self.heap, value, self.config.max_copy_depth) {
            Ok(mut skeleton) => {
                if let Value::Ref(id) = value {
                    self.repair_functions(&mut skeleton, *id);
                }
                skeleton
            }
            Err(reason) => {
                let handle = self.retain(value, HandleKind::Object);
                self.tracer.on_copy_fallback(&reason, handle);
                Proxied::Handle(handle)
            }
        }
    }

    /// Walks the copy in parallel with the original and puts back the functions the
    /// copy dropped.
    ///
    /// For every own enumerable key of the original: a function replaces the copy's
    /// entry with its proxified form (object keys the copy omitted are appended, array
    /// slots the copy nulled are overwritten), and a pair of containers is walked
    /// recursively. Nothing else the copy lost is restored.
    fn repair_functions(&mut self, skeleton: &mut Proxied, original: HeapId) {
        let heap = self.heap;
        match (heap.get(original), skeleton) {
            (HeapData::Object(properties), Proxied::Object(copy)) => {
                for (key, member) in properties {
                    if is_function(heap, member) {
                        let proxied = self.proxify(member);
                        copy.insert(key.clone(), proxied);
                    } else if let Value::Ref(child) = member
                        && let Some(nested) = copy.get_mut(key)
                        && nested.is_container()
                    {
                        self.repair_functions(nested, *child);
                    }
                }
            }
            (HeapData::Array(items), Proxied::Array(copy)) => {
                for (member, slot) in items.iter().zip(copy.iter_mut()) {
                    if is_function(heap, member) {
                        *slot = self.proxify(member);
                    } else if let Value::Ref(child) = member
                        && slot.is_container()
                    {
                        self.repair_functions(slot, *child);
                    }
                }
            }
            _ => {}
        }
    }

    /// Handle minted for `value` earlier in this session, when reuse is enabled.
    fn reused(&self, value: &Value) -> Option<Handle> {
        if !self.config.reuse_handles_within_call {
            return None;
        }
        self.minted.get(&value.heap_id()?).copied()
    }

    fn retain(&mut self, value: &Value, kind: HandleKind) -> Handle {
        if let Some(handle) = self.reused(value) {
            return handle;
        }
        let handle = retain_traced(&mut *self.retained, &mut *self.tracer, value.clone(), kind);
        if let Some(id) = value.heap_id() {
            self.minted.insert(id, handle);
        }
        handle
    }
}

/// Stores `value` and reports the new handle to the tracer.
pub(crate) fn retain_traced(
    retained: &mut RetainTable,
    tracer: &mut impl BridgeTracer,
    value: Value,
    kind: HandleKind,
) -> Handle {
    let handle = retained.retain(value, kind);
    tracer.on_retain(handle);
    handle
}

fn is_function(heap: &Heap, value: &Value) -> bool {
    matches!(classify(heap, value), Classification::Function(_))
}

fn primitive(value: &Value) -> Proxied {
    match value {
        Value::Undefined => Proxied::Undefined,
        Value::Null => Proxied::Null,
        Value::Bool(b) => Proxied::Bool(*b),
        Value::Number(n) => Proxied::Number(*n),
        Value::String(s) => Proxied::String(s.clone()),
        Value::Ref(_) => unreachable!("classified as primitive"),
    }
}
