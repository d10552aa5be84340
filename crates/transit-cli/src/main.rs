use std::{env, fs, process::ExitCode, time::Instant};

use serde_json::Value as Json;
use transit::{Bridge, BridgeConfig, HostError, InvocationDescriptor, LogTracer, Proxied, Receiver, Value};

fn main() -> ExitCode {
    env_logger::Builder::from_default_env().init();

    let args: Vec<String> = env::args().collect();
    let Some(invocation_path) = args.get(1) else {
        eprintln!("usage: transit <invocation.json> [config.json]");
        return ExitCode::FAILURE;
    };
    let config = match args.get(2).map(|path| load_config(path)).transpose() {
        Ok(config) => config.unwrap_or_default(),
        Err(err) => {
            eprintln!("error: {err}");
            return ExitCode::FAILURE;
        }
    };
    let invocation = match read_file(invocation_path).and_then(|text| parse_json(&text, invocation_path)) {
        Ok(invocation) => invocation,
        Err(err) => {
            eprintln!("error: {err}");
            return ExitCode::FAILURE;
        }
    };

    let mut bridge = Bridge::with_tracer(config, LogTracer);
    let (native_id, receiver, call_args) = match load_invocation(&mut bridge, &invocation) {
        Ok(parts) => parts,
        Err(err) => {
            eprintln!("error: {invocation_path}: {err}");
            return ExitCode::FAILURE;
        }
    };

    bridge.install_dispatcher(echo);

    let start = Instant::now();
    let result = bridge.invoke_native(&native_id, &receiver, &call_args);
    let elapsed = start.elapsed();
    let code = match result {
        Ok(value) => {
            eprintln!("success after: {elapsed:?}");
            println!("{value}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("error after: {elapsed:?}\n{err}");
            ExitCode::FAILURE
        }
    };

    for handle in bridge.retained().handles() {
        println!("retained {handle}");
    }
    let released = bridge.release_all();
    log::info!("released {} handle(s)", released.len());
    code
}

/// Dispatcher that prints what it was asked to do and hands the arguments back.
fn echo(descriptor: InvocationDescriptor) -> Result<Proxied, HostError> {
    match serde_json::to_string_pretty(&descriptor) {
        Ok(json) => println!("{json}"),
        Err(err) => return Err(HostError::new(format!("cannot render descriptor: {err}"))),
    }
    Ok(Proxied::Array(descriptor.args))
}

fn read_file(file_path: &str) -> Result<String, String> {
    eprintln!("Reading file: {file_path}");
    match fs::metadata(file_path) {
        Ok(metadata) => {
            if !metadata.is_file() {
                return Err(format!("Error: {file_path} is not a file"));
            }
        }
        Err(err) => {
            return Err(format!("Error reading {file_path}: {err}"));
        }
    }
    match fs::read_to_string(file_path) {
        Ok(contents) => Ok(contents),
        Err(err) => Err(format!("Error reading file: {err}")),
    }
}

fn parse_json(text: &str, file_path: &str) -> Result<Json, String> {
    serde_json::from_str(text).map_err(|err| format!("{file_path} is not valid JSON: {err}"))
}

fn load_config(file_path: &str) -> Result<BridgeConfig, String> {
    let text = read_file(file_path)?;
    BridgeConfig::from_json(&text).map_err(|err| format!("invalid config {file_path}: {err}"))
}

/// Splits the invocation document into native id, receiver and arguments, allocating
/// every value on the bridge heap.
fn load_invocation(bridge: &mut Bridge<LogTracer>, invocation: &Json) -> Result<(String, Receiver, Vec<Value>), String> {
    let Json::Object(fields) = invocation else {
        return Err("the invocation must be a JSON object".to_owned());
    };
    let native_id = match fields.get("nativeId") {
        Some(Json::String(id)) => id.clone(),
        _ => return Err("missing string field 'nativeId'".to_owned()),
    };
    let receiver = match fields.get("thisArg") {
        None | Some(Json::Null) => Receiver::Global,
        Some(this_arg) => Receiver::Value(load_value(bridge, this_arg)?),
    };
    let args = match fields.get("args") {
        None => Vec::new(),
        Some(Json::Array(items)) => items
            .iter()
            .map(|item| load_value(bridge, item))
            .collect::<Result<_, _>>()?,
        Some(_) => return Err("'args' must be an array".to_owned()),
    };
    Ok((native_id, receiver, args))
}

/// Allocates a JSON value on the heap.
///
/// Single-key objects `{"$function": name}`, `{"$native": id}` and `{"$node": tag}` stand
/// for a script function, a native function stub and an opaque host node.
fn load_value(bridge: &mut Bridge<LogTracer>, json: &Json) -> Result<Value, String> {
    let value = match json {
        Json::Null => Value::Null,
        Json::Bool(b) => Value::Bool(*b),
        Json::Number(n) => Value::Number(n.as_f64().ok_or_else(|| format!("unsupported number {n}"))?),
        Json::String(s) => Value::String(s.clone()),
        Json::Array(items) => {
            let items = items
                .iter()
                .map(|item| load_value(bridge, item))
                .collect::<Result<Vec<_>, _>>()?;
            bridge.heap_mut().array(items)
        }
        Json::Object(fields) => {
            if let Some(marked) = load_marker(bridge, fields) {
                return marked;
            }
            let mut properties = Vec::with_capacity(fields.len());
            for (key, member) in fields {
                properties.push((key.clone(), load_value(bridge, member)?));
            }
            bridge.heap_mut().object(properties)
        }
    };
    Ok(value)
}

fn load_marker(bridge: &mut Bridge<LogTracer>, fields: &serde_json::Map<String, Json>) -> Option<Result<Value, String>> {
    if fields.len() != 1 {
        return None;
    }
    let (marker, payload) = fields.iter().next()?;
    if !matches!(marker.as_str(), "$function" | "$native" | "$node") {
        return None;
    }
    let Json::String(name) = payload else {
        return Some(Err(format!("'{marker}' expects a string, got {payload}")));
    };
    let value = match marker.as_str() {
        "$function" => bridge.heap_mut().script_function(name.as_str()),
        "$native" => bridge.native_function(name.as_str()),
        _ => bridge.heap_mut().host_node(name.as_str()),
    };
    Some(Ok(value))
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use transit::{Classification, Function, HeapData, classify};

    use super::*;

    fn bridge() -> Bridge<LogTracer> {
        Bridge::with_tracer(BridgeConfig::default(), LogTracer)
    }

    #[test]
    fn markers_load_as_functions_stubs_and_nodes() {
        let mut bridge = bridge();
        let function = load_value(&mut bridge, &json!({"$function": "onDone"})).unwrap();
        let stub = load_value(&mut bridge, &json!({"$native": "console.log"})).unwrap();
        let node = load_value(&mut bridge, &json!({"$node": "DIV"})).unwrap();

        assert!(matches!(
            classify(bridge.heap(), &function),
            Classification::Function(Function::Script(f)) if f.name == "onDone"
        ));
        assert!(matches!(
            classify(bridge.heap(), &stub),
            Classification::Function(Function::Native(f)) if f.tag().native_id() == "console.log"
        ));
        assert_eq!(classify(bridge.heap(), &node), Classification::OpaqueHostNode);
    }

    #[test]
    fn marker_with_non_string_payload_is_an_error() {
        let mut bridge = bridge();
        let error = load_value(&mut bridge, &json!({"$function": 1})).unwrap_err();
        assert_eq!(error, "'$function' expects a string, got 1");

        let nested = json!({"args": [{"$node": null}]});
        assert!(load_value(&mut bridge, &nested).is_err());
    }

    #[test]
    fn objects_with_more_keys_are_plain_objects() {
        let mut bridge = bridge();
        let value = load_value(&mut bridge, &json!({"$function": "f", "other": 1})).unwrap();

        let HeapData::Object(properties) = bridge.heap().get(value.heap_id().unwrap()) else {
            panic!("expected a plain object");
        };
        assert_eq!(properties.get("$function"), Some(&Value::from("f")));
        assert_eq!(properties.get("other"), Some(&Value::from(1)));
    }

    #[test]
    fn unknown_dollar_key_is_a_plain_object() {
        let mut bridge = bridge();
        let value = load_value(&mut bridge, &json!({"$weird": "x"})).unwrap();

        assert_eq!(classify(bridge.heap(), &value), Classification::PlainObject);
        assert_eq!(bridge.proxify(&value).to_json_value(), json!({"$weird": "x"}));
    }

    #[test]
    fn invocation_with_null_receiver_uses_the_global_receiver() {
        let mut bridge = bridge();
        let invocation = json!({"nativeId": "log", "thisArg": null, "args": ["hello", {"$function": "cb"}]});

        let (native_id, receiver, args) = load_invocation(&mut bridge, &invocation).unwrap();
        assert_eq!(native_id, "log");
        assert_eq!(receiver, Receiver::Global);
        assert_eq!(args.len(), 2);
        assert_eq!(args[0], Value::from("hello"));
    }
}
