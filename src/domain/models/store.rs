//! Precedence-ordered configuration store.
//!
//! Layers, highest precedence first:
//! 1. test overlay (`inject_test_config`)
//! 2. runtime overlay (`set`)
//! 3. declared scopes, in declaration order
//!
//! Reads never fail: a missing key is `None` / `false`.

use parking_lot::RwLock;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::path::PathBuf;

use super::key_path;
use super::scope::{Precedence, ScopeAndValue, ScopeEntry, RUNTIME_SCOPE, TEST_SCOPE};
use crate::domain::errors::{ConfigError, ConfigResult};

#[derive(Debug)]
struct Layers {
    test: Value,
    runtime: Value,
    declared: Vec<ScopeEntry>,
}

/// Merge-aware configuration store shared by handle (`Arc<ConfigStore>`).
#[derive(Debug)]
pub struct ConfigStore {
    base_config_dir: RwLock<PathBuf>,
    layers: RwLock<Layers>,
}

impl ConfigStore {
    /// Empty store; layers are declared during bootstrap.
    pub fn new(base_config_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_config_dir: RwLock::new(base_config_dir.into()),
            layers: RwLock::new(Layers {
                test: Value::Null,
                runtime: Value::Null,
                declared: Vec::new(),
            }),
        }
    }

    /// Build a store from already-resolved `(scope, tree)` pairs, first pair
    /// ranked highest.
    pub fn from_scopes<I, S>(scopes: I) -> Self
    where
        I: IntoIterator<Item = (S, Value)>,
        S: Into<String>,
    {
        let store = Self::new(".");
        for (scope, tree) in scopes {
            let rank = store.declare_scope(scope, "data");
            store.fill_scope(rank, tree);
        }
        store
    }

    /// Directory relative config paths were resolved against.
    pub fn base_config_dir(&self) -> PathBuf {
        self.base_config_dir.read().clone()
    }

    pub(crate) fn set_base_config_dir(&self, dir: impl Into<PathBuf>) {
        *self.base_config_dir.write() = dir.into();
    }

    /// True iff some layer defines `key`.
    pub fn has(&self, key: &str) -> bool {
        let layers = self.layers.read();
        let found = layers.iter().any(|(_, tree)| key_path::lookup(tree, key).is_some());
        found
    }

    /// Value for `key` as seen in the merged view.
    ///
    /// Scalars and arrays come from the highest-precedence layer defining the
    /// key; objects additionally carry the lower layers' keys beneath.
    pub fn get(&self, key: &str) -> Option<Value> {
        let layers = self.layers.read();
        Self::merged_at(&layers, key)
    }

    /// Full merged view of every layer.
    pub fn get_all(&self) -> Value {
        self.get("").unwrap_or(Value::Null)
    }

    /// Typed read; `None` when absent or not deserializable as `T`.
    pub fn get_as<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.get(key).and_then(|value| serde_json::from_value(value).ok())
    }

    /// Like [`get`](Self::get) but also reports the winning layer.
    pub fn get_scope_and_value(&self, key: &str) -> Option<ScopeAndValue> {
        let layers = self.layers.read();
        let winner = layers.entries().find(|(_, _, _, tree)| key_path::lookup(tree, key).is_some());
        let (scope, info, precedence, _) = winner?;
        Some(ScopeAndValue {
            value: Self::merged_at(&layers, key)?,
            scope: scope.to_string(),
            info: info.to_string(),
            precedence,
        })
    }

    /// Write into the runtime overlay.
    pub fn set(&self, key: &str, value: Value) {
        let mut layers = self.layers.write();
        key_path::insert(&mut layers.runtime, key, value);
    }

    /// Replace the test overlay wholesale.
    pub fn inject_test_config(&self, config: Value) {
        self.layers.write().test = config;
    }

    /// Replace the tree of a declared scope without changing its rank.
    ///
    /// With duplicate labels the highest-precedence slot is replaced.
    pub fn replace_scope_config(&self, scope: &str, config: Value) -> ConfigResult<()> {
        let mut layers = self.layers.write();
        let entry = layers
            .declared
            .iter_mut()
            .find(|entry| entry.scope == scope)
            .ok_or_else(|| ConfigError::UnknownScope(scope.to_string()))?;
        entry.tree = config;
        Ok(())
    }

    /// Declared scopes with their rank, highest precedence first.
    pub fn scopes(&self) -> Vec<(String, Precedence)> {
        self.layers
            .read()
            .declared
            .iter()
            .map(|entry| (entry.scope.clone(), entry.precedence))
            .collect()
    }

    /// Append an empty slot ranked below every existing one.
    pub(crate) fn declare_scope(&self, scope: impl Into<String>, info: impl Into<String>) -> usize {
        let mut layers = self.layers.write();
        let rank = layers.declared.len();
        layers
            .declared
            .push(ScopeEntry::new(scope, info, Precedence::Declared(rank)));
        rank
    }

    pub(crate) fn fill_scope(&self, rank: usize, tree: Value) {
        if let Some(entry) = self.layers.write().declared.get_mut(rank) {
            entry.tree = tree;
        }
    }

    /// Drop every layer, keeping the instance.
    pub(crate) fn clear(&self) {
        let mut layers = self.layers.write();
        layers.test = Value::Null;
        layers.runtime = Value::Null;
        layers.declared.clear();
    }

    fn merged_at(layers: &Layers, key: &str) -> Option<Value> {
        let mut merged: Option<Value> = None;
        let stack: Vec<&Value> = layers.iter().map(|(_, tree)| tree).collect();
        for tree in stack.into_iter().rev() {
            let Some(value) = key_path::lookup(tree, key) else {
                continue;
            };
            match merged.as_mut() {
                Some(acc) if value.is_null() && !key.is_empty() => *acc = Value::Null,
                Some(acc) => key_path::deep_merge(acc, value),
                None if value.is_null() && key.is_empty() => {}
                None => merged = Some(value.clone()),
            }
        }
        merged
    }
}

impl Layers {
    /// Every layer, highest precedence first.
    fn entries(&self) -> impl Iterator<Item = (&str, &str, Precedence, &Value)> + '_ {
        [
            (TEST_SCOPE, "injected", Precedence::TestOverride, &self.test),
            (RUNTIME_SCOPE, "set", Precedence::Runtime, &self.runtime),
        ]
        .into_iter()
        .chain(self.declared.iter().map(|entry| {
            (
                entry.scope.as_str(),
                entry.info.as_str(),
                entry.precedence,
                &entry.tree,
            )
        }))
    }

    fn iter(&self) -> impl Iterator<Item = (Precedence, &Value)> + '_ {
        self.entries().map(|(_, _, precedence, tree)| (precedence, tree))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_store() -> ConfigStore {
        ConfigStore::from_scopes([
            ("extra", json!({"service": {"name": "extra"}, "list": [1]})),
            (
                "default",
                json!({"service": {"name": "default", "port": 3000}, "list": [1, 2, 3], "only": "default"}),
            ),
        ])
    }

    #[test]
    fn test_get_earliest_declared_wins() {
        let store = sample_store();
        assert_eq!(store.get("service:name"), Some(json!("extra")));
        assert_eq!(store.get("service:port"), Some(json!(3000)));
        assert_eq!(store.get("only"), Some(json!("default")));
        assert_eq!(store.get("list"), Some(json!([1])));
        assert_eq!(store.get("missing"), None);
    }

    #[test]
    fn test_get_object_merges_lower_layers() {
        let store = sample_store();
        assert_eq!(store.get("service"), Some(json!({"name": "extra", "port": 3000})));
    }

    #[test]
    fn test_get_all_merges_everything() {
        let store = sample_store();
        store.set("runtime", json!(true));
        assert_eq!(
            store.get_all(),
            json!({"service": {"name": "extra", "port": 3000}, "list": [1], "only": "default", "runtime": true})
        );
    }

    #[test]
    fn test_get_all_empty_store_is_null() {
        assert_eq!(ConfigStore::new(".").get_all(), Value::Null);
    }

    #[test]
    fn test_has() {
        let store = sample_store();
        assert!(store.has("service:port"));
        assert!(!store.has("service:host"));
    }

    #[test]
    fn test_dotted_key_is_one_segment() {
        let store = ConfigStore::from_scopes([("hosts", json!({"hosts": {"api.example.com": {"port": 1}}}))]);
        assert!(store.has("hosts:api.example.com"));
        assert_eq!(store.get("hosts:api.example.com:port"), Some(json!(1)));

        store.set("hosts:api.example.com:port", json!(2));
        assert_eq!(store.get("hosts:api.example.com:port"), Some(json!(2)));
        assert_eq!(store.get_all(), json!({"hosts": {"api.example.com": {"port": 2}}}));
    }

    #[test]
    fn test_has_counts_explicit_null() {
        let store = ConfigStore::from_scopes([("a", json!({"nothing": null}))]);
        assert!(store.has("nothing"));
        assert_eq!(store.get("nothing"), Some(Value::Null));
    }

    #[test]
    fn test_set_outranks_declared_but_not_test_overlay() {
        let store = sample_store();
        store.set("service:name", json!("runtime"));
        assert_eq!(store.get("service:name"), Some(json!("runtime")));

        store.inject_test_config(json!({"service": {"name": "test"}}));
        assert_eq!(store.get("service:name"), Some(json!("test")));
        store.set("service:name", json!("runtime-again"));
        assert_eq!(store.get("service:name"), Some(json!("test")));
    }

    #[test]
    fn test_inject_test_config_replaces_wholesale() {
        let store = sample_store();
        store.inject_test_config(json!({"a": 1}));
        store.inject_test_config(json!({"b": 2}));
        assert!(!store.has("a"));
        assert_eq!(store.get("b"), Some(json!(2)));
    }

    #[test]
    fn test_get_scope_and_value_reports_winner() {
        let store = sample_store();
        let found = store.get_scope_and_value("service:port").unwrap();
        assert_eq!(found.scope, "default");
        assert_eq!(found.precedence, Precedence::Declared(1));
        assert_eq!(found.value, json!(3000));

        store.set("service:port", json!(1));
        let found = store.get_scope_and_value("service:port").unwrap();
        assert_eq!(found.scope, RUNTIME_SCOPE);
        assert_eq!(found.precedence, Precedence::Runtime);

        assert!(store.get_scope_and_value("nope").is_none());
    }

    #[test]
    fn test_replace_scope_config_keeps_rank() {
        let store = sample_store();
        store
            .replace_scope_config("default", json!({"service": {"name": "replaced"}, "only": "new"}))
            .unwrap();
        assert_eq!(store.get("service:name"), Some(json!("extra")));
        assert_eq!(store.get("only"), Some(json!("new")));
        assert!(!store.has("service:port"));
    }

    #[test]
    fn test_replace_unknown_scope_fails_and_leaves_store_unchanged() {
        let store = sample_store();
        let before = store.get_all();
        let err = store.replace_scope_config("ghost", json!({"x": 1})).unwrap_err();
        assert_eq!(err, ConfigError::UnknownScope("ghost".to_string()));
        assert_eq!(store.get_all(), before);
    }

    #[test]
    fn test_get_as_typed() {
        let store = sample_store();
        assert_eq!(store.get_as::<u16>("service:port"), Some(3000));
        assert_eq!(store.get_as::<u16>("service:name"), None);
    }

    #[test]
    fn test_duplicate_labels_replace_highest_slot() {
        let store = ConfigStore::from_scopes([("dup", json!({"a": 1})), ("dup", json!({"a": 2, "b": 2}))]);
        store.replace_scope_config("dup", json!({"a": 10})).unwrap();
        assert_eq!(store.get("a"), Some(json!(10)));
        assert_eq!(store.get("b"), Some(json!(2)));
        assert_eq!(store.scopes().len(), 2);
    }
}
