//! Builders for response schemas in the OpenAPI subset the model accepts.
//!
//! Every property of an [`object`] is required.

use serde_json::{Value, json};

/// A string.
#[must_use]
pub fn string(description: &str) -> Value {
    json!({ "type": "STRING", "description": description })
}

/// A number.
#[must_use]
pub fn number(description: &str) -> Value {
    json!({ "type": "NUMBER", "description": description })
}

/// One of a fixed set of strings.
#[must_use]
pub fn enumeration(description: &str, values: &[&str]) -> Value {
    json!({ "type": "STRING", "description": description, "enum": values })
}

/// A list of `items`.
#[must_use]
pub fn array(description: &str, items: Value) -> Value {
    json!({ "type": "ARRAY", "description": description, "items": items })
}

/// An object whose properties are all required.
#[must_use]
pub fn object(properties: &[(&str, Value)]) -> Value {
    let required: Vec<&str> = properties.iter().map(|(name, _)| *name).collect();
    let properties: serde_json::Map<String, Value> = properties
        .iter()
        .map(|(name, schema)| ((*name).to_owned(), schema.clone()))
        .collect();
    json!({
        "type": "OBJECT",
        "properties": properties,
        "required": required,
    })
}
