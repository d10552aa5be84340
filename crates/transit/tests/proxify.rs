//! How values cross the boundary: pass-through, tags, handles, copies and repairs.

use indexmap::IndexMap;
use pretty_assertions::assert_eq;
use transit::{Bridge, BridgeConfig, HandleKind, Proxied, Value};

fn object(pairs: Vec<(&str, Proxied)>) -> Proxied {
    Proxied::Object(pairs.into_iter().map(|(k, v)| (k.to_owned(), v)).collect::<IndexMap<_, _>>())
}

fn keys(proxied: &Proxied) -> Vec<&str> {
    match proxied {
        Proxied::Object(map) => map.keys().map(String::as_str).collect(),
        other => panic!("expected an object, got {other:?}"),
    }
}

#[test]
fn primitives_pass_through_unchanged() {
    let mut bridge = Bridge::default();
    assert_eq!(bridge.proxify(&Value::Undefined), Proxied::Undefined);
    assert_eq!(bridge.proxify(&Value::Null), Proxied::Null);
    assert_eq!(bridge.proxify(&Value::from(true)), Proxied::Bool(true));
    assert_eq!(bridge.proxify(&Value::from(42)), Proxied::Number(42.0));
    assert_eq!(bridge.proxify(&Value::from("hi")), Proxied::String("hi".to_owned()));
    assert!(bridge.retained().is_empty());
}

#[test]
fn non_finite_top_level_numbers_are_not_nulled() {
    let mut bridge = Bridge::default();
    match bridge.proxify(&Value::Number(f64::NAN)) {
        Proxied::Number(n) => assert!(n.is_nan()),
        other => panic!("expected NaN, got {other:?}"),
    }
    assert_eq!(
        bridge.proxify(&Value::Number(f64::INFINITY)),
        Proxied::Number(f64::INFINITY)
    );
}

#[test]
fn native_stub_becomes_its_tag_without_retaining() {
    let mut bridge = Bridge::default();
    let stub = bridge.native_function("alert");

    let first = bridge.proxify(&stub);
    let second = bridge.proxify(&stub);
    assert_eq!(first.to_string(), r#""__TRANSIT_NATIVE_FUNCTION_alert""#);
    assert_eq!(first, second);
    assert!(bridge.retained().is_empty());
}

#[test]
fn script_function_is_retained_as_function_handle() {
    let mut bridge = Bridge::default();
    let f = bridge.heap_mut().script_function("onClick");

    let handle = bridge.proxify(&f).as_handle().unwrap();
    assert_eq!(handle.kind(), HandleKind::Function);
    assert_eq!(bridge.resolve(&handle.to_string()), Some(&f));
}

#[test]
fn host_node_is_retained_as_object_handle() {
    let mut bridge = Bridge::default();
    let node = bridge.heap_mut().host_node("DIV");

    let handle = bridge.proxify(&node).as_handle().unwrap();
    assert_eq!(handle.kind(), HandleKind::Object);
    assert_eq!(bridge.retained().get(handle), Some(&node));
}

#[test]
fn separate_proxify_calls_mint_separate_handles() {
    let mut bridge = Bridge::default();
    let f = bridge.heap_mut().script_function("f");

    let a = bridge.proxify(&f).as_handle().unwrap();
    let b = bridge.proxify(&f).as_handle().unwrap();
    assert!(a != b);
    assert_eq!(bridge.retained().len(), 2);
}

#[test]
fn plain_object_is_copied() {
    let mut bridge = Bridge::default();
    let inner = bridge.heap_mut().array([Value::from(1), Value::from("two")]);
    let value = bridge
        .heap_mut()
        .object([("name", Value::from("x")), ("items", inner), ("ok", Value::from(false))]);

    assert_eq!(
        bridge.proxify(&value),
        object(vec![
            ("name", "x".into()),
            ("items", Proxied::Array(vec![1.into(), "two".into()])),
            ("ok", false.into()),
        ])
    );
    assert!(bridge.retained().is_empty());
}

#[test]
fn copy_is_lossy_like_json() {
    let mut bridge = Bridge::default();
    let nested_node = bridge.heap_mut().host_node("SPAN");
    let list = bridge.heap_mut().array([Value::Undefined, Value::Number(f64::NAN)]);
    let value = bridge.heap_mut().object([
        ("gone", Value::Undefined),
        ("nan", Value::Number(f64::NAN)),
        ("node", nested_node),
        ("list", list),
    ]);

    assert_eq!(
        bridge.proxify(&value),
        object(vec![
            ("nan", Proxied::Null),
            ("node", object(vec![])),
            ("list", Proxied::Array(vec![Proxied::Null, Proxied::Null])),
        ])
    );
}

#[test]
fn nested_function_is_repaired_with_siblings_kept() {
    let mut bridge = Bridge::default();
    let f = bridge.heap_mut().script_function("b");
    let inner = bridge.heap_mut().object([("b", f.clone()), ("keep", Value::from(1))]);
    let value = bridge.heap_mut().object([("a", inner), ("c", Value::from("sibling"))]);

    let proxied = bridge.proxify(&value);
    let handle = proxied.get("a").and_then(|a| a.get("b")).and_then(Proxied::as_handle).unwrap();

    assert_eq!(handle.kind(), HandleKind::Function);
    assert_eq!(bridge.retained().get(handle), Some(&f));
    assert_eq!(proxied.get("c"), Some(&Proxied::from("sibling")));
    assert_eq!(proxied.get("a").and_then(|a| a.get("keep")), Some(&Proxied::from(1)));
    assert_eq!(bridge.retained().len(), 1);
}

#[test]
fn repaired_keys_are_appended_after_copied_keys() {
    let mut bridge = Bridge::default();
    let f = bridge.heap_mut().script_function("first");
    let value = bridge.heap_mut().object([("first", f), ("second", Value::from(2))]);

    let proxied = bridge.proxify(&value);
    assert_eq!(keys(&proxied), vec!["second", "first"]);
}

#[test]
fn array_slots_are_repaired_in_place() {
    let mut bridge = Bridge::default();
    let f = bridge.heap_mut().script_function("cb");
    let stub = bridge.native_function("console.log");
    let value = bridge.heap_mut().array([Value::from(1), f, stub]);

    let proxied = bridge.proxify(&value);
    let Proxied::Array(items) = &proxied else {
        panic!("expected an array, got {proxied:?}");
    };
    assert_eq!(items.len(), 3);
    assert_eq!(items[0], Proxied::from(1));
    assert_eq!(items[1].as_handle().map(|h| h.kind()), Some(HandleKind::Function));
    assert_eq!(
        items[2].as_native_tag().map(|tag| tag.native_id()),
        Some("console.log")
    );
    assert_eq!(bridge.retained().len(), 1);
}

#[test]
fn cyclic_object_is_retained_whole() {
    let mut bridge = Bridge::default();
    let f = bridge.heap_mut().script_function("f");
    let value = bridge.heap_mut().object([("f", f)]);
    let id = value.heap_id().unwrap();
    bridge.heap_mut().set_property(id, "self", value.clone());

    let handle = bridge.proxify(&value).as_handle().unwrap();
    assert_eq!(handle.kind(), HandleKind::Object);
    assert_eq!(bridge.retained().get(handle), Some(&value));
    assert_eq!(bridge.retained().len(), 1);
}

#[test]
fn cycle_through_an_array_is_retained_whole() {
    let mut bridge = Bridge::default();
    let list = bridge.heap_mut().array([Value::from(1)]);
    let holder = bridge.heap_mut().object([("list", list.clone())]);
    bridge.heap_mut().push(list.heap_id().unwrap(), holder.clone());

    let handle = bridge.proxify(&holder).as_handle().unwrap();
    assert_eq!(bridge.retained().get(handle), Some(&holder));
}

#[test]
fn shared_child_is_not_a_cycle() {
    let mut bridge = Bridge::default();
    let shared = bridge.heap_mut().object([("n", Value::from(1))]);
    let value = bridge.heap_mut().object([("left", shared.clone()), ("right", shared)]);

    let copy = object(vec![("n", 1.into())]);
    assert_eq!(bridge.proxify(&value), object(vec![("left", copy.clone()), ("right", copy)]));
}

#[test]
fn too_deep_structure_is_retained_whole() {
    let mut bridge = Bridge::new(BridgeConfig::new().max_copy_depth(2));
    let innermost = bridge.heap_mut().array([Value::from(1)]);
    let middle = bridge.heap_mut().array([innermost]);
    let outer = bridge.heap_mut().array([middle.clone()]);

    let handle = bridge.proxify(&outer).as_handle().unwrap();
    assert_eq!(bridge.retained().get(handle), Some(&outer));

    // two levels fit the limit
    assert_eq!(
        bridge.proxify(&middle),
        Proxied::Array(vec![Proxied::Array(vec![1.into()])])
    );
}

#[test]
fn same_function_twice_in_one_call_shares_a_handle() {
    let mut bridge = Bridge::default();
    let f = bridge.heap_mut().script_function("f");
    let value = bridge.heap_mut().object([("a", f.clone()), ("b", f)]);

    let proxied = bridge.proxify(&value);
    let a = proxied.get("a").and_then(Proxied::as_handle).unwrap();
    let b = proxied.get("b").and_then(Proxied::as_handle).unwrap();
    assert_eq!(a, b);
    assert_eq!(bridge.retained().len(), 1);
}

#[test]
fn handle_reuse_can_be_disabled() {
    let mut bridge = Bridge::new(BridgeConfig::new().reuse_handles_within_call(false));
    let f = bridge.heap_mut().script_function("f");
    let value = bridge.heap_mut().object([("a", f.clone()), ("b", f)]);

    let proxied = bridge.proxify(&value);
    let a = proxied.get("a").and_then(Proxied::as_handle).unwrap();
    let b = proxied.get("b").and_then(Proxied::as_handle).unwrap();
    assert!(a != b);
    assert_eq!(bridge.retained().len(), 2);
}
