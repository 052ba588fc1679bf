//! Key-casing helpers for the wire boundary. The API speaks lowerCamelCase;
//! the domain speaks snake_case.

use serde_json::{Map, Value};

pub fn camelize(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut capitalize_next = false;

    for ch in name.chars() {
        if ch == '_' {
            capitalize_next = true;
        } else if capitalize_next {
            out.extend(ch.to_uppercase());
            capitalize_next = false;
        } else {
            out.push(ch);
        }
    }

    out
}

pub fn underscore(name: &str) -> String {
    let mut out = String::with_capacity(name.len());

    for ch in name.chars() {
        if ch.is_ascii_uppercase() {
            if !out.is_empty() && !out.ends_with('_') {
                out.push('_');
            }
            out.push(ch.to_ascii_lowercase());
        } else {
            out.push(ch);
        }
    }

    out
}

/// Camelizes the top-level keys of a JSON object; any other value is
/// returned unchanged.
pub fn camelize_keys(value: Value) -> Value {
    rename_keys(value, camelize)
}

/// Snake-cases the top-level keys of a JSON object; any other value is
/// returned unchanged.
pub fn underscore_keys(value: Value) -> Value {
    rename_keys(value, underscore)
}

fn rename_keys(value: Value, rename: fn(&str) -> String) -> Value {
    match value {
        Value::Object(fields) => Value::Object(
            fields
                .into_iter()
                .map(|(key, value)| (rename(&key), value))
                .collect::<Map<String, Value>>(),
        ),
        other => other,
    }
}
