//! Structural validation of normalized documents

use super::messages;
use super::normalize::normalize;
use super::{ArrayRule, FormSchema, ObjectRule, SchemaNode, StringFormat, StringRule};
use crate::dates::parse_iso;
use crate::error::Result;
use crate::model::{FormDocument, SchemaVariant};
use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;
use serde_json::Value;
use std::fmt;

lazy_static! {
    static ref TIME: Regex = Regex::new(r"^([01]\d|2[0-3]):[0-5]\d$").unwrap();
}

/// One step of an error path: an object key or an array index
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum PathSegment {
    Key(String),
    Index(usize),
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathSegment::Key(key) => f.write_str(key),
            PathSegment::Index(index) => write!(f, "{index}"),
        }
    }
}

/// A single schema violation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldError {
    /// Location of the offending value. For a missing required property the
    /// path ends with that property's name.
    pub path: Vec<PathSegment>,
    /// Human readable message (Polish when the shape is recognized)
    pub message: String,
    /// Message in generic validator wording
    pub raw_message: String,
    /// Display name of the field the error refers to
    pub human_field_name: String,
}

impl FieldError {
    /// Path joined with dots, e.g. `daneSwiadkowWypadku.0.imie`
    pub fn dotted_path(&self) -> String {
        self.path
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(".")
    }
}

/// Result of validating one document
#[derive(Debug, Clone, Serialize)]
pub struct ValidationReport {
    pub variant: SchemaVariant,
    pub success: bool,
    pub errors: Vec<FieldError>,
    #[serde(skip)]
    normalized: Value,
}

impl ValidationReport {
    /// Normalized input (wrappers removed, nulls pruned)
    pub fn normalized(&self) -> &Value {
        &self.normalized
    }

    /// The validated document, or the errors when validation failed
    pub fn into_document(self) -> std::result::Result<ValidatedDocument, Vec<FieldError>> {
        if self.success {
            Ok(ValidatedDocument {
                variant: self.variant,
                normalized: self.normalized,
            })
        } else {
            Err(self.errors)
        }
    }
}

/// Input that passed validation
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedDocument {
    pub variant: SchemaVariant,
    pub normalized: Value,
}

impl ValidatedDocument {
    /// Deserialize into the typed record for this variant
    pub fn typed(&self) -> Result<FormDocument> {
        Ok(match self.variant {
            SchemaVariant::Notification => FormDocument::Notification(Box::new(
                serde_json::from_value(self.normalized.clone())?,
            )),
            SchemaVariant::Explanation => FormDocument::Explanation(Box::new(
                serde_json::from_value(self.normalized.clone())?,
            )),
        })
    }
}

struct Violation {
    path: Vec<PathSegment>,
    raw: String,
}

/// Render an instance for raw validator messages
/// (`'text'`, `True`, `12`)
fn repr(value: &Value) -> String {
    match value {
        Value::String(s) => format!("'{s}'"),
        Value::Bool(true) => "True".to_string(),
        Value::Bool(false) => "False".to_string(),
        Value::Null => "None".to_string(),
        other => other.to_string(),
    }
}

struct Walker {
    violations: Vec<Violation>,
    path: Vec<PathSegment>,
}

impl Walker {
    fn report(&mut self, raw: String) {
        self.violations.push(Violation {
            path: self.path.clone(),
            raw,
        });
    }

    fn report_at(&mut self, key: &str, raw: String) {
        let mut path = self.path.clone();
        path.push(PathSegment::Key(key.to_string()));
        self.violations.push(Violation { path, raw });
    }

    fn type_error(&mut self, value: &Value, expected: &str) {
        self.report(format!("{} is not of type '{}'", repr(value), expected));
    }

    fn node(&mut self, value: &Value, node: &SchemaNode) {
        match node {
            SchemaNode::String(rule) => self.string(value, rule),
            SchemaNode::Boolean => {
                if !value.is_boolean() {
                    self.type_error(value, "boolean");
                }
            }
            SchemaNode::Integer => {
                if !(value.is_i64() || value.is_u64()) {
                    self.type_error(value, "integer");
                }
            }
            SchemaNode::Enum(allowed) => {
                let ok = value.as_str().is_some_and(|s| allowed.contains(&s));
                if !ok {
                    let listed = allowed
                        .iter()
                        .map(|a| format!("'{a}'"))
                        .collect::<Vec<_>>()
                        .join(", ");
                    self.report(format!("{} is not one of [{}]", repr(value), listed));
                }
            }
            SchemaNode::Object(rule) => self.object(value, rule),
            SchemaNode::Array(rule) => self.array(value, rule),
        }
    }

    fn string(&mut self, value: &Value, rule: &StringRule) {
        let Some(text) = value.as_str() else {
            self.type_error(value, "string");
            return;
        };
        let length = text.chars().count();
        if let Some(min) = rule.min_length {
            if length < min {
                self.report(format!("{} is too short", repr(value)));
            }
        }
        if let Some(max) = rule.max_length {
            if length > max {
                self.report(format!("{} is too long", repr(value)));
            }
        }
        if let Some(pattern) = &rule.pattern {
            if !pattern.is_match(text) {
                self.report(format!("{} does not match '{}'", repr(value), pattern.as_str()));
            }
        }
        if let Some(format) = rule.format {
            let ok = match format {
                StringFormat::Date => parse_iso(text).is_some(),
                StringFormat::Time => TIME.is_match(text),
            };
            if !ok {
                self.report(format!("{} is not a '{}'", repr(value), format.name()));
            }
        }
    }

    fn object(&mut self, value: &Value, rule: &ObjectRule) {
        let Some(map) = value.as_object() else {
            self.type_error(value, "object");
            return;
        };

        for key in &rule.required {
            if !map.contains_key(*key) {
                self.report_at(key, format!("'{key}' is a required property"));
            }
        }

        for (key, needs) in &rule.dependencies {
            if !map.contains_key(*key) {
                continue;
            }
            for dependency in needs {
                if !map.contains_key(*dependency) {
                    self.report_at(
                        dependency,
                        format!("'{dependency}' is a dependency of '{key}'"),
                    );
                }
            }
        }

        for (key, child) in &rule.properties {
            if let Some(v) = map.get(*key) {
                self.path.push(PathSegment::Key(key.to_string()));
                self.node(v, child);
                self.path.pop();
            }
        }
    }

    fn array(&mut self, value: &Value, rule: &ArrayRule) {
        let Some(items) = value.as_array() else {
            self.type_error(value, "array");
            return;
        };
        if let Some(max) = rule.max_items {
            if items.len() > max {
                self.report(format!("{value} is too long"));
            }
        }
        for (index, item) in items.iter().enumerate() {
            self.path.push(PathSegment::Index(index));
            self.node(item, &rule.items);
            self.path.pop();
        }
    }
}

pub(super) fn run(schema: &FormSchema, input: &Value) -> ValidationReport {
    let normalized = normalize(input);
    let mut walker = Walker {
        violations: Vec::new(),
        path: Vec::new(),
    };
    walker.object(&normalized, schema.root());

    let errors: Vec<FieldError> = walker
        .violations
        .into_iter()
        .map(|violation| {
            let (message, human_field_name) = messages::humanize(&violation.path, &violation.raw);
            FieldError {
                path: violation.path,
                message,
                raw_message: violation.raw,
                human_field_name,
            }
        })
        .collect();

    tracing::debug!(
        variant = %schema.variant(),
        errors = errors.len(),
        "validated input document"
    );

    ValidationReport {
        variant: schema.variant(),
        success: errors.is_empty(),
        errors,
        normalized,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn schema() -> FormSchema {
        FormSchema::new(
            SchemaVariant::Explanation,
            SchemaNode::object()
                .with("name", SchemaNode::string().max_length(5))
                .with("flag", SchemaNode::boolean())
                .with("when", SchemaNode::date())
                .with("at", SchemaNode::time())
                .with("kind", SchemaNode::one_of(&["a", "b"]))
                .with(
                    "items",
                    SchemaNode::array_of(SchemaNode::object().with("x", SchemaNode::string()))
                        .max_items(2),
                )
                .require(&["name"])
                .depends("flag", &["kind"]),
        )
    }

    fn raw_messages(report: &ValidationReport) -> Vec<String> {
        report.errors.iter().map(|e| e.raw_message.clone()).collect()
    }

    #[test]
    fn test_valid_document() {
        let report = schema().validate(&json!({"name": "Jan", "at": "23:59", "when": "2024-02-29"}));
        assert!(report.success);
        assert!(report.errors.is_empty());
    }

    #[test]
    fn test_required_error_path_names_missing_key() {
        let report = schema().validate(&json!({}));
        assert!(!report.success);
        assert_eq!(report.errors.len(), 1);
        assert_eq!(report.errors[0].path, vec![PathSegment::Key("name".to_string())]);
        assert_eq!(report.errors[0].raw_message, "'name' is a required property");
    }

    #[test]
    fn test_type_enum_and_length_errors() {
        let report = schema().validate(&json!({
            "name": "Bartłomiej",
            "flag": "yes",
            "kind": "c"
        }));
        assert_eq!(
            raw_messages(&report),
            vec![
                "'Bartłomiej' is too long".to_string(),
                "'yes' is not of type 'boolean'".to_string(),
                "'c' is not one of ['a', 'b']".to_string(),
            ]
        );
    }

    #[test]
    fn test_dependency_error() {
        let report = schema().validate(&json!({"name": "Jan", "flag": true}));
        assert_eq!(raw_messages(&report), vec!["'kind' is a dependency of 'flag'"]);
        assert_eq!(report.errors[0].dotted_path(), "kind");
    }

    #[test]
    fn test_format_errors() {
        let report = schema().validate(&json!({"name": "Jan", "when": "2024-02-30", "at": "24:00"}));
        assert_eq!(
            raw_messages(&report),
            vec!["'2024-02-30' is not a 'date'", "'24:00' is not a 'time'"]
        );
    }

    #[test]
    fn test_array_paths_and_max_items() {
        let report = schema().validate(&json!({
            "name": "Jan",
            "items": [{"x": "a"}, {"x": 1}, {"x": "c"}]
        }));
        assert_eq!(report.errors.len(), 2);
        assert!(report.errors[0].raw_message.ends_with("is too long"));
        assert_eq!(report.errors[1].dotted_path(), "items.1.x");
        assert_eq!(report.errors[1].raw_message, "1 is not of type 'string'");
    }

    #[test]
    fn test_nulls_never_reach_type_checks() {
        let report = schema().validate(&json!({"name": "Jan", "flag": null, "kind": null}));
        assert!(report.success);
    }

    #[test]
    fn test_into_document() {
        let ok = schema().validate(&json!({"name": "Jan"})).into_document();
        assert_eq!(ok.unwrap().normalized, json!({"name": "Jan"}));

        let err = schema().validate(&json!({})).into_document();
        assert_eq!(err.unwrap_err().len(), 1);
    }

    #[test]
    fn test_report_serializes_without_normalized_value() {
        let report = schema().validate(&json!({}));
        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(value["success"], json!(false));
        assert_eq!(value["variant"], json!("explanation"));
        assert_eq!(value["errors"][0]["path"], json!(["name"]));
        assert!(value.get("normalized").is_none());
    }
}
