/// JSON-Schema Simplification
///
/// Tool providers describe their inputs with JSON Schema shapes that strict
/// JSON-RPC consumers cannot digest: `anyOf` unions, `additionalProperties`
/// markers, null defaults. This module rewrites a schema tree into the
/// widest shape such a consumer tolerates. The rewrite is intentionally
/// lossy; it never mutates its input and is idempotent.

use serde_json::{Map, Value, json};

/// Simplify a schema node for consumption by a strict JSON-RPC client.
///
/// The transform is total over arbitrary JSON values and applied
/// recursively:
/// - An `anyOf` of exactly `string` and `integer` collapses to
///   `{type: "string"}`, carrying `title` (empty string if absent) and
///   `description` only when non-empty.
/// - Any other non-empty `anyOf` is replaced by its first alternative,
///   simplified; the remaining alternatives are discarded.
/// - `additionalProperties` keys are dropped everywhere; `default: null`
///   is dropped; an `items` schema that itself carries
///   `additionalProperties` is replaced by `{type: <its type or "object">}`.
/// - Sequences simplify element-wise, scalars pass through unchanged.
pub fn simplify(node: &Value) -> Value {
    match node {
        Value::Object(fields) => {
            if let Some(any_of) = fields.get("anyOf") {
                simplify_any_of(fields, any_of)
            } else {
                simplify_object(fields)
            }
        }
        Value::Array(items) => Value::Array(items.iter().map(simplify).collect()),
        scalar => scalar.clone(),
    }
}

/// Collapse an `anyOf` node. `fields` is the mapping holding the `anyOf`
/// key, consulted for `title` and `description` in the union-collapse case.
fn simplify_any_of(fields: &Map<String, Value>, any_of: &Value) -> Value {
    let alternatives = match any_of.as_array() {
        Some(list) => list,
        None => return json!({}),
    };

    if alternatives.len() == 2 && is_string_integer_union(alternatives) {
        let title = fields
            .get("title")
            .and_then(Value::as_str)
            .unwrap_or("");
        let mut collapsed = Map::new();
        collapsed.insert("type".to_string(), json!("string"));
        collapsed.insert("title".to_string(), json!(title));
        // Consumers choke on empty descriptions, so only a non-empty
        // string survives the collapse.
        if let Some(description) = fields.get("description").and_then(Value::as_str) {
            if !description.is_empty() {
                collapsed.insert("description".to_string(), json!(description));
            }
        }
        return Value::Object(collapsed);
    }

    match alternatives.first() {
        Some(first) => simplify(first),
        None => json!({}),
    }
}

fn is_string_integer_union(alternatives: &[Value]) -> bool {
    let mut saw_string = false;
    let mut saw_integer = false;
    for alternative in alternatives {
        match alternative.get("type").and_then(Value::as_str) {
            Some("string") => saw_string = true,
            Some("integer") => saw_integer = true,
            _ => {}
        }
    }
    saw_string && saw_integer
}

/// Rebuild a plain mapping node, dropping the keys the consumer rejects.
fn simplify_object(fields: &Map<String, Value>) -> Value {
    let mut simplified = Map::new();
    for (key, value) in fields {
        match key.as_str() {
            "additionalProperties" => continue,
            "default" if value.is_null() => continue,
            "items" if item_schema_is_open(value) => {
                let item_type = value.get("type").cloned().unwrap_or_else(|| json!("object"));
                simplified.insert(key.clone(), json!({ "type": item_type }));
            }
            _ => {
                simplified.insert(key.clone(), simplify(value));
            }
        }
    }
    Value::Object(simplified)
}

fn item_schema_is_open(value: &Value) -> bool {
    value
        .as_object()
        .is_some_and(|map| map.contains_key("additionalProperties"))
}
