//! Key path addressing and deep merge over `serde_json::Value` trees.
//!
//! A key path is a string split on `:`, so `logs:console:level` addresses the
//! `level` leaf. Dots are ordinary key characters (`hosts:api.example.com`).
//! The empty path is the root.

use serde_json::{Map, Value};

/// Split a key into its non-empty segments.
pub fn segments(key: &str) -> Vec<&str> {
    key.split(':').filter(|s| !s.is_empty()).collect()
}

/// Look up `key` inside `tree`.
pub fn lookup<'a>(tree: &'a Value, key: &str) -> Option<&'a Value> {
    let mut current = tree;
    for segment in segments(key) {
        current = current.as_object()?.get(segment)?;
    }
    Some(current)
}

/// Write `value` at `key`, creating intermediate objects.
///
/// Any non-object met on the way is replaced by an object.
pub fn insert(tree: &mut Value, key: &str, value: Value) {
    let parts = segments(key);
    let Some((last, parents)) = parts.split_last() else {
        *tree = value;
        return;
    };

    let mut current = tree;
    for segment in parents {
        current = ensure_object(current)
            .entry((*segment).to_string())
            .or_insert_with(|| Value::Object(Map::new()));
    }
    ensure_object(current).insert((*last).to_string(), value);
}

/// Wrap `value` so that it lives at `key` in an otherwise empty tree.
pub fn nest(key: Option<&str>, value: Value) -> Value {
    match key {
        Some(key) if !segments(key).is_empty() => {
            let mut tree = Value::Object(Map::new());
            insert(&mut tree, key, value);
            tree
        }
        _ => value,
    }
}

/// Overlay `upper` onto `lower`.
///
/// Objects merge key by key, everything else (arrays included) replaces the
/// lower value. A `null` upper tree contributes nothing.
pub fn deep_merge(lower: &mut Value, upper: &Value) {
    match (lower, upper) {
        (_, Value::Null) => {}
        (Value::Object(lower_map), Value::Object(upper_map)) => {
            for (key, upper_value) in upper_map {
                match lower_map.get_mut(key) {
                    Some(lower_value) if lower_value.is_object() && upper_value.is_object() => {
                        deep_merge(lower_value, upper_value);
                    }
                    _ => {
                        lower_map.insert(key.clone(), upper_value.clone());
                    }
                }
            }
        }
        (lower, upper) => *lower = upper.clone(),
    }
}

fn ensure_object(value: &mut Value) -> &mut Map<String, Value> {
    if !value.is_object() {
        *value = Value::Object(Map::new());
    }
    match value {
        Value::Object(map) => map,
        _ => unreachable!("value was just replaced by an object"),
    }
}
