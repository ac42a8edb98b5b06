//! Re-nests an upstream result under the dotted path the local resolver chain expects.

use serde_json::{Map, Value};

/// Wraps `value` so that walking `path` (minus its first segment, which names the field
/// being resolved) leads back to it. Lists are reshaped element by element and `null`
/// stays `null`.
///
/// ```
/// use forward::reshape::reshape;
/// use serde_json::json;
///
/// let flat = json!({ "name": "A", "email": "b" });
/// assert_eq!(
///     reshape(flat, Some("check_in.user")),
///     json!({ "user": { "name": "A", "email": "b" } })
/// );
/// ```
pub fn reshape(value: Value, path: Option<&str>) -> Value {
    let Some(path) = path else {
        return value;
    };
    let segments: Vec<&str> = path.split('.').skip(1).collect();
    nest(value, &segments)
}

fn nest(value: Value, segments: &[&str]) -> Value {
    match value {
        Value::Null => Value::Null,
        Value::Array(items) => {
            Value::Array(items.into_iter().map(|item| nest(item, segments)).collect())
        }
        leaf => segments.iter().rev().fold(leaf, |inner, segment| {
            let mut wrapper = Map::new();
            wrapper.insert((*segment).to_string(), inner);
            Value::Object(wrapper)
        }),
    }
}
