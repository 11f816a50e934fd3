//! Proptest strategies for input documents

use proptest::prelude::*;
use serde_json::{Map, Value};

/// Object keys: never numeric, never containing dots
pub fn key_strategy() -> impl Strategy<Value = String> {
    "[a-z][a-zA-Z]{0,10}".prop_filter("reserved key", |k| {
        k != zus_forms::flatten::IDENTITY_DOCUMENT_KEY && k != "value" && k != "parsed"
    })
}

/// Scalar leaves that flattening keeps: non-blank text, booleans, integers
pub fn leaf_strategy() -> impl Strategy<Value = Value> {
    prop_oneof![
        "[A-Za-z0-9ąćęłńóśźżĄĆĘŁŃÓŚŹŻ][A-Za-z0-9ąćęłńóśźż ,.-]{0,20}".prop_map(Value::String),
        any::<bool>().prop_map(Value::Bool),
        any::<i32>().prop_map(Value::from),
    ]
}

/// Nested documents without nulls, blank strings or empty containers
pub fn document_strategy() -> impl Strategy<Value = Value> {
    let leaf = leaf_strategy();
    let tree = leaf.prop_recursive(4, 48, 6, |inner| {
        prop_oneof![
            prop::collection::btree_map(key_strategy(), inner.clone(), 1..6)
                .prop_map(|map| Value::Object(map.into_iter().collect::<Map<_, _>>())),
            prop::collection::vec(inner, 1..4).prop_map(Value::Array),
        ]
    });
    prop::collection::btree_map(key_strategy(), tree, 1..6)
        .prop_map(|map| Value::Object(map.into_iter().collect()))
}

/// Wrap leaves of `value` as annotated extraction results where `mask`
/// says so; the mask is consumed leaf by leaf and cycles
pub fn annotate(value: &Value, mask: &[bool]) -> Value {
    fn walk(value: &Value, mask: &[bool], cursor: &mut usize) -> Value {
        match value {
            Value::Object(map) => Value::Object(
                map.iter()
                    .map(|(k, v)| (k.clone(), walk(v, mask, cursor)))
                    .collect(),
            ),
            Value::Array(items) => {
                Value::Array(items.iter().map(|v| walk(v, mask, cursor)).collect())
            }
            leaf => {
                let wrap = !mask.is_empty() && mask[*cursor % mask.len()];
                *cursor += 1;
                if wrap {
                    serde_json::json!({"value": leaf, "parsed": true, "confidence": 0.9})
                } else {
                    leaf.clone()
                }
            }
        }
    }
    walk(value, mask, &mut 0)
}

/// Insert null-valued keys into every object of `value` whose position in a
/// depth-first walk is selected by `mask`
pub fn sprinkle_nulls(value: &Value, mask: &[bool], null_key: &str) -> Value {
    fn walk(value: &Value, mask: &[bool], null_key: &str, cursor: &mut usize) -> Value {
        match value {
            Value::Object(map) => {
                let selected = !mask.is_empty() && mask[*cursor % mask.len()];
                *cursor += 1;
                let mut out: Map<String, Value> = map
                    .iter()
                    .map(|(k, v)| (k.clone(), walk(v, mask, null_key, cursor)))
                    .collect();
                if selected && !out.contains_key(null_key) {
                    out.insert(null_key.to_string(), Value::Null);
                }
                Value::Object(out)
            }
            Value::Array(items) => {
                let mut out: Vec<Value> = items
                    .iter()
                    .map(|v| walk(v, mask, null_key, cursor))
                    .collect();
                if !mask.is_empty() && mask[*cursor % mask.len()] {
                    out.push(Value::Null);
                }
                Value::Array(out)
            }
            leaf => leaf.clone(),
        }
    }
    walk(value, mask, null_key, &mut 0)
}

/// Valid ISO dates
pub fn iso_date_strategy() -> impl Strategy<Value = (i32, u32, u32)> {
    (1950i32..2030, 1u32..=12, 1u32..=28)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_annotate_wraps_selected_leaves() {
        let value = json!({"a": "x", "b": {"c": true}});
        let annotated = annotate(&value, &[true, false]);
        assert_eq!(annotated["a"]["value"], "x");
        assert_eq!(annotated["b"]["c"], true);
    }

    #[test]
    fn test_sprinkle_nulls_adds_keys() {
        let value = json!({"a": {"b": 1}});
        let sprinkled = sprinkle_nulls(&value, &[true], "extra");
        assert_eq!(sprinkled, json!({"a": {"b": 1, "extra": null}, "extra": null}));
    }
}
