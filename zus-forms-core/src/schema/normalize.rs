//! Input clean-up applied before validation

use serde_json::{Map, Value};

/// Keys that mark an annotated extraction result
const WRAPPER_KEYS: [&str; 2] = ["value", "parsed"];

fn is_wrapper(map: &Map<String, Value>) -> bool {
    WRAPPER_KEYS.iter().all(|key| map.contains_key(*key))
}

/// Replace every `{"value": v, "parsed": .., ..}` object with `v`, at any
/// depth including array elements. The unwrapped value is taken as is.
pub fn unwrap_annotated(value: Value) -> Value {
    match value {
        Value::Object(mut map) => {
            if is_wrapper(&map) {
                return map.remove("value").unwrap_or(Value::Null);
            }
            Value::Object(
                map.into_iter()
                    .map(|(key, v)| (key, unwrap_annotated(v)))
                    .collect(),
            )
        }
        Value::Array(items) => Value::Array(items.into_iter().map(unwrap_annotated).collect()),
        other => other,
    }
}

/// Drop null-valued keys and null array elements recursively
pub fn prune_nulls(value: Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.into_iter()
                .filter(|(_, v)| !v.is_null())
                .map(|(key, v)| (key, prune_nulls(v)))
                .collect(),
        ),
        Value::Array(items) => Value::Array(
            items
                .into_iter()
                .filter(|v| !v.is_null())
                .map(prune_nulls)
                .collect(),
        ),
        other => other,
    }
}

/// Unwrap annotations, then prune nulls
pub fn normalize(value: &Value) -> Value {
    prune_nulls(unwrap_annotated(value.clone()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_unwrap_nested_wrappers() {
        let input = json!({
            "daneOsobyPoszkodowanej": {
                "imie": {"value": "Jan", "annotation": "OCR", "parsed": true},
                "nazwisko": "Kowalski"
            },
            "daneSwiadkowWypadku": [
                {"imie": {"value": "Anna", "parsed": false}}
            ]
        });

        assert_eq!(
            unwrap_annotated(input),
            json!({
                "daneOsobyPoszkodowanej": {"imie": "Jan", "nazwisko": "Kowalski"},
                "daneSwiadkowWypadku": [{"imie": "Anna"}]
            })
        );
    }

    #[test]
    fn test_value_without_parsed_is_not_a_wrapper() {
        let input = json!({"value": "x", "annotation": "only"});
        assert_eq!(unwrap_annotated(input.clone()), input);
    }

    #[test]
    fn test_wrapper_with_null_value_is_pruned() {
        let input = json!({"pesel": {"value": null, "parsed": false}, "imie": "Jan"});
        assert_eq!(normalize(&input), json!({"imie": "Jan"}));
    }

    #[test]
    fn test_prune_nulls_in_objects_and_arrays() {
        let input = json!({
            "a": null,
            "b": {"c": null, "d": 1},
            "e": [null, {"f": null}, "g"]
        });
        assert_eq!(
            prune_nulls(input),
            json!({"b": {"d": 1}, "e": [{}, "g"]})
        );
    }

    #[test]
    fn test_normalize_does_not_touch_input() {
        let input = json!({"a": null});
        let _ = normalize(&input);
        assert_eq!(input, json!({"a": null}));
    }
}
