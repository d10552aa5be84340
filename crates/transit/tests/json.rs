//! Natural JSON rendering of boundary values and configuration.

use pretty_assertions::assert_eq;
use serde_json::json;
use transit::{Bridge, BridgeConfig, Handle, HandleKind, InvocationDescriptor, NativeTag, Proxied, Value};

#[test]
fn numbers_render_like_javascript() {
    assert_eq!(Proxied::from(42).to_json_value(), json!(42));
    assert_eq!(Proxied::from(-3).to_json_value(), json!(-3));
    assert_eq!(Proxied::from(1.5).to_json_value(), json!(1.5));
    assert_eq!(Proxied::Number(f64::NAN).to_json_value(), json!(null));
    assert_eq!(Proxied::Number(f64::NEG_INFINITY).to_json_value(), json!(null));
    assert_eq!(Proxied::Number(1e300).to_json_value(), json!(1e300));
}

#[test]
fn undefined_renders_as_null_but_displays_as_undefined() {
    assert_eq!(Proxied::Undefined.to_json_value(), json!(null));
    assert_eq!(serde_json::to_string(&Proxied::Undefined).unwrap(), "null");
    assert_eq!(Proxied::Undefined.to_string(), "undefined");
}

#[test]
fn serialize_matches_to_json_value() {
    let proxied = Proxied::Array(vec![
        Proxied::Null,
        Proxied::from(true),
        Proxied::from(2),
        Proxied::from("s"),
        Proxied::Handle(Handle::new(HandleKind::Object, 4)),
        Proxied::NativeTag(NativeTag::new("alert")),
    ]);
    let expected = json!([null, true, 2, "s", "__TRANSIT_OBJECT_PROXY_4", "__TRANSIT_NATIVE_FUNCTION_alert"]);

    assert_eq!(serde_json::to_value(&proxied).unwrap(), expected);
    assert_eq!(proxied.to_json_value(), expected);
}

#[test]
fn prefixed_strings_parse_back_into_handles_and_tags() {
    let parsed = Proxied::from_json_value(json!({
        "cb": "__TRANSIT_JS_FUNCTION_9",
        "native": "__TRANSIT_NATIVE_FUNCTION_fetch",
        "plain": "__TRANSIT_JS_FUNCTION_x",
        "n": 3,
    }));

    assert_eq!(parsed.get("cb"), Some(&Proxied::Handle(Handle::new(HandleKind::Function, 9))));
    assert_eq!(parsed.get("native"), Some(&Proxied::NativeTag(NativeTag::new("fetch"))));
    assert_eq!(parsed.get("plain"), Some(&Proxied::from("__TRANSIT_JS_FUNCTION_x")));
    assert_eq!(parsed.get("n"), Some(&Proxied::from(3)));
}

#[test]
fn proxified_object_keeps_key_order_in_json() {
    let mut bridge = Bridge::default();
    let f = bridge.heap_mut().script_function("f");
    let value = bridge
        .heap_mut()
        .object([("z", Value::from(1)), ("a", Value::from(2)), ("cb", f), ("m", Value::from(3))]);

    let rendered = serde_json::to_string(&bridge.proxify(&value)).unwrap();
    assert_eq!(rendered, r#"{"z":1,"a":2,"m":3,"cb":"__TRANSIT_JS_FUNCTION_1"}"#);
}

#[test]
fn descriptor_deserializes_from_host_json() {
    let descriptor: InvocationDescriptor = serde_json::from_value(json!({
        "nativeId": "setTimeout",
        "thisArg": null,
        "args": ["__TRANSIT_JS_FUNCTION_2", 100],
    }))
    .unwrap();

    assert_eq!(
        descriptor,
        InvocationDescriptor {
            native_id: "setTimeout".to_owned(),
            this_arg: None,
            args: vec![Proxied::Handle(Handle::new(HandleKind::Function, 2)), Proxied::from(100)],
        }
    );
}

#[test]
fn config_fills_defaults_from_partial_json() {
    let config = BridgeConfig::from_json(r#"{"reuse_handles_within_call": false}"#).unwrap();
    assert_eq!(config, BridgeConfig::default().reuse_handles_within_call(false));

    assert_eq!(BridgeConfig::from_json("{}").unwrap(), BridgeConfig::default());
    assert!(BridgeConfig::from_json(r#"{"max_copy_depth": "deep"}"#).is_err());
}

#[test]
fn config_round_trips_through_json() {
    let config = BridgeConfig::new().max_copy_depth(3);
    let json = serde_json::to_string(&config).unwrap();
    assert_eq!(BridgeConfig::from_json(&json).unwrap(), config);
}

#[test]
fn array_lookup_accepts_only_canonical_indices() {
    let list = Proxied::Array(vec![Proxied::from("zero"), Proxied::from("one")]);

    assert_eq!(list.get("1"), Some(&Proxied::from("one")));
    assert_eq!(list.get("0"), Some(&Proxied::from("zero")));
    for key in ["+1", "01", "00", "", " 1"] {
        assert_eq!(list.get(key), None, "key {key:?}");
    }
}
