//! Declarative input schemas and their validator
//!
//! A [`FormSchema`] is a tree of [`SchemaNode`]s describing one document
//! shape. Validation runs in three steps over the whole document:
//!
//! 1. annotated extraction wrappers (`{"value": .., "parsed": ..}`) are
//!    replaced by their value ([`unwrap_annotated`]),
//! 2. explicit nulls are removed from objects and arrays ([`prune_nulls`]),
//! 3. the result is checked against the schema.
//!
//! Violations are collected, never raised, and come back as a
//! [`ValidationReport`] whose messages are translated to Polish by
//! [`messages::humanize`].
//!
//! # Example
//!
//! ```rust
//! use serde_json::json;
//! use zus_forms::schema::FormSchema;
//!
//! let schema = FormSchema::explanation();
//! let report = schema.validate(&json!({
//!     "imieNazwisko": "Jan Kowalski",
//!     "dataWypadku": "2024-03-10",
//!     "miejsceWypadku": "Warszawa",
//!     "opisOkolicznosciWypadku": "Upadek",
//!     "godzinaWypadku": null
//! }));
//! assert!(report.success);
//! ```

pub mod messages;
mod normalize;
mod validator;
mod variants;

pub use normalize::{normalize, prune_nulls, unwrap_annotated};
pub use validator::{FieldError, PathSegment, ValidatedDocument, ValidationReport};

use crate::model::SchemaVariant;
use regex::Regex;

/// Semantic string formats checked beyond the pattern
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StringFormat {
    /// Calendar-valid `YYYY-MM-DD`
    Date,
    /// 24-hour `HH:MM`
    Time,
}

impl StringFormat {
    pub fn name(self) -> &'static str {
        match self {
            StringFormat::Date => "date",
            StringFormat::Time => "time",
        }
    }
}

/// Constraints on a string value
#[derive(Debug, Clone, Default)]
pub struct StringRule {
    pub pattern: Option<Regex>,
    pub min_length: Option<usize>,
    pub max_length: Option<usize>,
    pub format: Option<StringFormat>,
}

/// Properties, required keys and dependencies of an object
#[derive(Debug, Clone, Default)]
pub struct ObjectRule {
    /// Known properties in declaration order. Unknown keys are allowed.
    pub properties: Vec<(&'static str, SchemaNode)>,
    pub required: Vec<&'static str>,
    /// `(key, needs)`: when `key` is present every name in `needs` must be too
    pub dependencies: Vec<(&'static str, Vec<&'static str>)>,
}

impl ObjectRule {
    pub fn property(&self, name: &str) -> Option<&SchemaNode> {
        self.properties
            .iter()
            .find(|(key, _)| *key == name)
            .map(|(_, node)| node)
    }
}

#[derive(Debug, Clone)]
pub struct ArrayRule {
    pub items: Box<SchemaNode>,
    pub max_items: Option<usize>,
}

/// One node of a schema tree
#[derive(Debug, Clone)]
pub enum SchemaNode {
    String(StringRule),
    Boolean,
    Integer,
    Enum(Vec<&'static str>),
    Object(ObjectRule),
    Array(ArrayRule),
}

impl SchemaNode {
    pub fn string() -> Self {
        SchemaNode::String(StringRule::default())
    }

    pub fn date() -> Self {
        SchemaNode::String(StringRule {
            format: Some(StringFormat::Date),
            ..StringRule::default()
        })
    }

    pub fn time() -> Self {
        SchemaNode::String(StringRule {
            format: Some(StringFormat::Time),
            ..StringRule::default()
        })
    }

    pub fn boolean() -> Self {
        SchemaNode::Boolean
    }

    pub fn one_of(values: &[&'static str]) -> Self {
        SchemaNode::Enum(values.to_vec())
    }

    pub fn object() -> Self {
        SchemaNode::Object(ObjectRule::default())
    }

    pub fn array_of(items: SchemaNode) -> Self {
        SchemaNode::Array(ArrayRule {
            items: Box::new(items),
            max_items: None,
        })
    }

    /// Attach a regex to a string node
    pub fn matching(mut self, pattern: &Regex) -> Self {
        if let SchemaNode::String(rule) = &mut self {
            rule.pattern = Some(pattern.clone());
        }
        self
    }

    pub fn max_length(mut self, max: usize) -> Self {
        if let SchemaNode::String(rule) = &mut self {
            rule.max_length = Some(max);
        }
        self
    }

    pub fn min_length(mut self, min: usize) -> Self {
        if let SchemaNode::String(rule) = &mut self {
            rule.min_length = Some(min);
        }
        self
    }

    pub fn max_items(mut self, max: usize) -> Self {
        if let SchemaNode::Array(rule) = &mut self {
            rule.max_items = Some(max);
        }
        self
    }

    /// Add a property to an object node
    pub fn with(mut self, name: &'static str, node: SchemaNode) -> Self {
        if let SchemaNode::Object(rule) = &mut self {
            rule.properties.push((name, node));
        }
        self
    }

    pub fn require(mut self, names: &[&'static str]) -> Self {
        if let SchemaNode::Object(rule) = &mut self {
            rule.required.extend_from_slice(names);
        }
        self
    }

    pub fn depends(mut self, key: &'static str, needs: &[&'static str]) -> Self {
        if let SchemaNode::Object(rule) = &mut self {
            rule.dependencies.push((key, needs.to_vec()));
        }
        self
    }

    /// Short type name used in messages
    pub fn type_name(&self) -> &'static str {
        match self {
            SchemaNode::String(_) | SchemaNode::Enum(_) => "string",
            SchemaNode::Boolean => "boolean",
            SchemaNode::Integer => "integer",
            SchemaNode::Object(_) => "object",
            SchemaNode::Array(_) => "array",
        }
    }
}

/// Immutable description of one input document shape
#[derive(Debug, Clone)]
pub struct FormSchema {
    variant: SchemaVariant,
    root: ObjectRule,
}

impl FormSchema {
    /// Build a schema from its root node. Non-object roots yield an empty
    /// object rule.
    pub fn new(variant: SchemaVariant, root: SchemaNode) -> Self {
        let root = match root {
            SchemaNode::Object(rule) => rule,
            _ => ObjectRule::default(),
        };
        Self { variant, root }
    }

    /// Accident notification (ZUS EWYP)
    pub fn notification() -> Self {
        Self::new(SchemaVariant::Notification, variants::notification())
    }

    /// Victim's explanation
    pub fn explanation() -> Self {
        Self::new(SchemaVariant::Explanation, variants::explanation())
    }

    pub fn for_variant(variant: SchemaVariant) -> Self {
        match variant {
            SchemaVariant::Notification => Self::notification(),
            SchemaVariant::Explanation => Self::explanation(),
        }
    }

    pub fn variant(&self) -> SchemaVariant {
        self.variant
    }

    pub fn root(&self) -> &ObjectRule {
        &self.root
    }

    /// Dot paths of every required field reachable through required parents.
    /// Optional blocks contribute their own required keys as well, since
    /// those must be fillable whenever the block is present.
    pub fn required_paths(&self) -> Vec<String> {
        let mut out = Vec::new();
        collect_required(&self.root, "", &mut out);
        out
    }

    /// Normalize and validate an input document
    pub fn validate(&self, input: &serde_json::Value) -> ValidationReport {
        validator::run(self, input)
    }
}

fn collect_required(rule: &ObjectRule, prefix: &str, out: &mut Vec<String>) {
    let join = |key: &str| {
        if prefix.is_empty() {
            key.to_string()
        } else {
            format!("{prefix}.{key}")
        }
    };
    for (key, node) in &rule.properties {
        match node {
            SchemaNode::Object(child) => collect_required(child, &join(key), out),
            _ if rule.required.contains(key) => out.push(join(key)),
            _ => {}
        }
    }
}
