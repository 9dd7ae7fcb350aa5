use serde_json::{Map, Value};

/// Serialize a parameter mapping to a canonical string.
///
/// Every nested object's keys are re-sorted recursively (arrays are
/// processed element-wise, scalars pass through), so two mappings that are
/// equal as sets of key/value pairs produce an identical string regardless
/// of insertion order.
pub fn canonicalize_params(params: &Map<String, Value>) -> String {
    sort_value(&Value::Object(params.clone())).to_string()
}

fn sort_value(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            let mut sorted = Map::new();
            for k in keys {
                sorted.insert(k.clone(), sort_value(&map[k]));
            }
            Value::Object(sorted)
        }
        Value::Array(items) => Value::Array(items.iter().map(sort_value).collect()),
        other => other.clone(),
    }
}
