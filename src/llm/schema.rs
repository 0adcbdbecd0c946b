//! Output-schema dialect conversion.
//!
//! Schemas are authored once in OpenAPI style (lower-case `type`, `nullable`).
//! Gemini wants upper-case type names; `OpenAI` structured outputs want JSON
//! Schema, where a nullable field is a `["string", "null"]` type union.

use serde_json::{Map, Value};

#[cfg(test)]
#[path = "schema_test.rs"]
mod tests;

/// Upper-case every `type` name (`"object"` → `"OBJECT"`).
#[must_use]
pub fn to_gemini_schema(schema: &Value) -> Value {
    match schema {
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(key, value)| {
                    let converted = match (key.as_str(), value) {
                        ("type", Value::String(name)) => Value::String(name.to_uppercase()),
                        _ => to_gemini_schema(value),
                    };
                    (key.clone(), converted)
                })
                .collect(),
        ),
        Value::Array(items) => Value::Array(items.iter().map(to_gemini_schema).collect()),
        other => other.clone(),
    }
}

/// Fold `nullable: true` into a `[type, "null"]` union and drop the flag.
#[must_use]
pub fn to_json_schema(schema: &Value) -> Value {
    match schema {
        Value::Object(map) => {
            let nullable = map.get("nullable").and_then(Value::as_bool) == Some(true);
            let mut out = Map::with_capacity(map.len());
            for (key, value) in map {
                match (key.as_str(), value) {
                    ("nullable", _) => {}
                    ("type", Value::String(name)) if nullable => {
                        out.insert(key.clone(), Value::Array(vec![Value::String(name.clone()), "null".into()]));
                    }
                    _ => {
                        out.insert(key.clone(), to_json_schema(value));
                    }
                }
            }
            Value::Object(out)
        }
        Value::Array(items) => Value::Array(items.iter().map(to_json_schema).collect()),
        other => other.clone(),
    }
}
