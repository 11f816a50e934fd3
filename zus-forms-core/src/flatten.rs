//! Nested document to dot-path map and back
//!
//! `{"a": {"b": [{"c": 1}]}}` flattens to `a.b.0.c -> 1`. Identity documents
//! (`dokumentTozsamosci` objects) collapse into one `"kind number"` string.
//! Nulls, blank strings and empty containers produce no keys.

use serde_json::{Map, Number, Value};
use std::collections::BTreeMap;
use std::fmt;

/// Key of objects merged into a single string while flattening
pub const IDENTITY_DOCUMENT_KEY: &str = "dokumentTozsamosci";

/// A scalar leaf of the input document
#[derive(Debug, Clone, PartialEq)]
pub enum FlatValue {
    Text(String),
    Bool(bool),
    Number(Number),
}

impl FlatValue {
    /// Boolean reading of the value. Text accepts the usual yes/no spellings
    /// in Polish and English, numbers accept 0 and 1.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            FlatValue::Bool(b) => Some(*b),
            FlatValue::Text(text) => match text.trim().to_lowercase().as_str() {
                "true" | "tak" | "yes" | "1" => Some(true),
                "false" | "nie" | "no" | "0" => Some(false),
                _ => None,
            },
            FlatValue::Number(n) => match n.as_i64() {
                Some(1) => Some(true),
                Some(0) => Some(false),
                _ => None,
            },
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            FlatValue::Text(text) => Some(text),
            _ => None,
        }
    }

    fn to_json(&self) -> Value {
        match self {
            FlatValue::Text(text) => Value::String(text.clone()),
            FlatValue::Bool(b) => Value::Bool(*b),
            FlatValue::Number(n) => Value::Number(n.clone()),
        }
    }
}

impl fmt::Display for FlatValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FlatValue::Text(text) => f.write_str(text),
            FlatValue::Bool(true) => f.write_str("TAK"),
            FlatValue::Bool(false) => f.write_str("NIE"),
            FlatValue::Number(n) => write!(f, "{n}"),
        }
    }
}

impl From<&str> for FlatValue {
    fn from(text: &str) -> Self {
        FlatValue::Text(text.to_string())
    }
}

impl From<bool> for FlatValue {
    fn from(b: bool) -> Self {
        FlatValue::Bool(b)
    }
}

/// Dot path to scalar value, ordered by path
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FlatFieldMap {
    values: BTreeMap<String, FlatValue>,
}

impl FlatFieldMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, path: impl Into<String>, value: impl Into<FlatValue>) {
        self.values.insert(path.into(), value.into());
    }

    pub fn get(&self, path: &str) -> Option<&FlatValue> {
        self.values.get(path)
    }

    pub fn contains(&self, path: &str) -> bool {
        self.values.contains_key(path)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FlatValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }
}

impl FromIterator<(String, FlatValue)> for FlatFieldMap {
    fn from_iter<I: IntoIterator<Item = (String, FlatValue)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}

fn join(prefix: &str, key: &str) -> String {
    if prefix.is_empty() {
        key.to_string()
    } else {
        format!("{prefix}.{key}")
    }
}

/// `"kind number"`, trimmed; `None` when both parts are blank
fn merge_identity_document(map: &Map<String, Value>) -> Option<String> {
    let part = |key: &str| map.get(key).and_then(Value::as_str).unwrap_or("");
    let joined = format!("{} {}", part("rodzaj"), part("seriaINumer"));
    let trimmed = joined.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

fn walk(value: &Value, prefix: &str, out: &mut FlatFieldMap) {
    match value {
        Value::Object(map) => {
            for (key, child) in map {
                let path = join(prefix, key);
                match child {
                    Value::Object(inner) if key == IDENTITY_DOCUMENT_KEY => {
                        if let Some(merged) = merge_identity_document(inner) {
                            out.insert(path, FlatValue::Text(merged));
                        }
                    }
                    _ => walk(child, &path, out),
                }
            }
        }
        Value::Array(items) => {
            for (index, item) in items.iter().enumerate() {
                walk(item, &join(prefix, &index.to_string()), out);
            }
        }
        Value::String(text) => {
            if !text.trim().is_empty() {
                out.insert(prefix, FlatValue::Text(text.clone()));
            }
        }
        Value::Bool(b) => out.insert(prefix, FlatValue::Bool(*b)),
        Value::Number(n) => out.insert(prefix, FlatValue::Number(n.clone())),
        Value::Null => {}
    }
}

/// Flatten a nested document into dot paths
pub fn flatten(input: &Value) -> FlatFieldMap {
    let mut out = FlatFieldMap::new();
    walk(input, "", &mut out);
    out
}

fn insert_path(target: &mut Value, segments: &[&str], leaf: Value) {
    let Some((head, rest)) = segments.split_first() else {
        *target = leaf;
        return;
    };

    match head.parse::<usize>() {
        Ok(index) => {
            if !target.is_array() {
                *target = Value::Array(Vec::new());
            }
            if let Value::Array(items) = target {
                if items.len() <= index {
                    items.resize(index + 1, Value::Null);
                }
                insert_path(&mut items[index], rest, leaf);
            }
        }
        Err(_) => {
            if !target.is_object() {
                *target = Value::Object(Map::new());
            }
            if let Value::Object(map) = target {
                let slot = map.entry(head.to_string()).or_insert(Value::Null);
                insert_path(slot, rest, leaf);
            }
        }
    }
}

/// Rebuild the nested document; numeric segments become array indices
pub fn unflatten(flat: &FlatFieldMap) -> Value {
    let mut root = Value::Object(Map::new());
    for (path, value) in flat.iter() {
        let segments: Vec<&str> = path.split('.').collect();
        insert_path(&mut root, &segments, value.to_json());
    }
    root
}
