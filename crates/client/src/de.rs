//! Lenient field deserializers for upstream JSON.
//!
//! Upstream fields are frequently missing, `null`, a bare string where a list
//! is expected, or a list of objects where a list of strings is expected.
//! These helpers turn all of that into plain Rust values instead of failing
//! the whole record.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use subscope_core::Interaction;

/// `null`, a string, or a list of scalars, as a list of strings.
pub fn string_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(strings_from(Option::<Value>::deserialize(deserializer)?.unwrap_or(Value::Null)))
}

/// `null`, a list of names or `{name, note}` objects, or a `{name: note}` map,
/// as interactions.
pub fn interaction_list<'de, D>(deserializer: D) -> Result<Vec<Interaction>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(interactions_from(Option::<Value>::deserialize(deserializer)?.unwrap_or(Value::Null)))
}

/// Any value, or `None` when it does not fit `T`.
pub fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    Ok(serde_json::from_value(Value::deserialize(deserializer)?).ok())
}

/// A list keeping only the entries that fit `T`. Anything but a list is empty.
pub fn lenient_list<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Array(items) => items.into_iter().filter_map(|item| serde_json::from_value(item).ok()).collect(),
        _ => Vec::new(),
    })
}

pub(crate) fn strings_from(value: Value) -> Vec<String> {
    match value {
        Value::String(s) => non_blank(s).into_iter().collect(),
        Value::Array(items) => items.into_iter().filter_map(scalar_string).collect(),
        _ => Vec::new(),
    }
}

pub(crate) fn interactions_from(value: Value) -> Vec<Interaction> {
    match value {
        Value::Array(items) => items.into_iter().filter_map(interaction_from).collect(),
        Value::Object(map) => map
            .into_iter()
            .filter_map(|(name, note)| {
                non_blank(name).map(|name| Interaction { name, note: scalar_string(note) })
            })
            .collect(),
        Value::String(name) => non_blank(name).map(|name| Interaction { name, note: None }).into_iter().collect(),
        _ => Vec::new(),
    }
}

fn interaction_from(value: Value) -> Option<Interaction> {
    match value {
        Value::String(name) => non_blank(name).map(|name| Interaction { name, note: None }),
        Value::Object(mut map) => {
            let name = map.remove("name").and_then(scalar_string)?;
            let note = map.remove("note").and_then(scalar_string);
            Some(Interaction { name, note })
        }
        _ => None,
    }
}

fn scalar_string(value: Value) -> Option<String> {
    match value {
        Value::String(s) => non_blank(s),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn non_blank(s: String) -> Option<String> {
    if s.trim().is_empty() { None } else { Some(s) }
}
