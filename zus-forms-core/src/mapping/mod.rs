//! Logical path to PDF widget mapping
//!
//! A [`FieldMappingTable`] is plain data: one [`FieldMappingEntry`] per
//! logical path the schema can produce, naming the widget(s) it fills and the
//! [`Transform`] applied on the way. Adding a field means adding an entry.
//!
//! [`FieldMappingTable::resolve`] turns a [`FlatFieldMap`] into the widget
//! values consumed by the filler. Widgets targeted by more than one entry
//! must be declared `shared` on every such entry; conflicts are settled by
//! checkbox-over-text, then priority, then logical path order.

mod explanation;
mod notification;

use crate::dates::DateStyle;
use crate::flatten::{FlatFieldMap, FlatValue};
use crate::model::SchemaVariant;
use crate::schema::FormSchema;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;

/// Part of the document an enum choice belongs to. The same enum can be
/// asked in several sections, each with its own checkbox set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Section {
    InjuredPerson,
    Reporter,
    Response,
}

/// How a flat value becomes widget values
#[derive(Debug, Clone, PartialEq)]
pub enum Transform {
    /// Value as text
    Direct,
    /// ISO date reformatted; unparseable input passes through verbatim
    Date(DateStyle),
    /// Tick exactly one of two checkboxes
    BooleanPair {
        when_true: String,
        when_false: String,
    },
    /// Tick the widget when true, leave it alone when false
    Checkbox,
    /// Tick the checkbox registered for the chosen value
    EnumChoice {
        section: Section,
        choices: Vec<(&'static str, String)>,
    },
    /// `TAK` / `NIE` text
    YesNoText,
    /// Enum label appended in parentheses to the widget's other value
    Qualifier {
        labels: Vec<(&'static str, &'static str)>,
    },
    /// Several source fields already merged into one string by the flattener
    CompositeMerge,
}

/// One row of the mapping table
#[derive(Debug, Clone, PartialEq)]
pub struct FieldMappingEntry {
    pub path: String,
    /// Targets of text-like transforms. Checkbox sets live in the transform.
    pub widgets: Vec<String>,
    pub transform: Transform,
    /// Another entry may write the same widget
    pub shared: bool,
    /// Higher wins among shared writers
    pub priority: i32,
}

impl FieldMappingEntry {
    fn new(path: impl Into<String>, widgets: Vec<String>, transform: Transform) -> Self {
        Self {
            path: path.into(),
            widgets,
            transform,
            shared: false,
            priority: 0,
        }
    }

    pub fn direct(path: impl Into<String>, widget: impl Into<String>) -> Self {
        Self::new(path, vec![widget.into()], Transform::Direct)
    }

    pub fn date(path: impl Into<String>, widgets: Vec<String>, style: DateStyle) -> Self {
        Self::new(path, widgets, Transform::Date(style))
    }

    pub fn boolean_pair(
        path: impl Into<String>,
        when_true: impl Into<String>,
        when_false: impl Into<String>,
    ) -> Self {
        Self::new(
            path,
            Vec::new(),
            Transform::BooleanPair {
                when_true: when_true.into(),
                when_false: when_false.into(),
            },
        )
    }

    pub fn checkbox(path: impl Into<String>, widget: impl Into<String>) -> Self {
        Self::new(path, vec![widget.into()], Transform::Checkbox)
    }

    pub fn enum_choice(
        path: impl Into<String>,
        section: Section,
        choices: Vec<(&'static str, String)>,
    ) -> Self {
        Self::new(path, Vec::new(), Transform::EnumChoice { section, choices })
    }

    pub fn yes_no(path: impl Into<String>, widget: impl Into<String>) -> Self {
        Self::new(path, vec![widget.into()], Transform::YesNoText)
    }

    pub fn qualifier(
        path: impl Into<String>,
        widget: impl Into<String>,
        labels: Vec<(&'static str, &'static str)>,
    ) -> Self {
        Self::new(path, vec![widget.into()], Transform::Qualifier { labels })
    }

    pub fn composite(path: impl Into<String>, widget: impl Into<String>) -> Self {
        Self::new(path, vec![widget.into()], Transform::CompositeMerge)
    }

    /// Allow this entry to share its widgets with other shared entries
    pub fn shared(mut self, priority: i32) -> Self {
        self.shared = true;
        self.priority = priority;
        self
    }

    /// Widgets this entry ticks rather than writes text into
    pub fn checkbox_targets(&self) -> Vec<&str> {
        match &self.transform {
            Transform::Checkbox => self.widgets.iter().map(String::as_str).collect(),
            Transform::BooleanPair {
                when_true,
                when_false,
            } => vec![when_true.as_str(), when_false.as_str()],
            Transform::EnumChoice { choices, .. } => {
                choices.iter().map(|(_, widget)| widget.as_str()).collect()
            }
            _ => Vec::new(),
        }
    }

    /// Every widget this entry can write
    pub fn targets(&self) -> Vec<&str> {
        let mut out: Vec<&str> = self.widgets.iter().map(String::as_str).collect();
        match &self.transform {
            Transform::BooleanPair {
                when_true,
                when_false,
            } => {
                out.push(when_true);
                out.push(when_false);
            }
            Transform::EnumChoice { choices, .. } => {
                out.extend(choices.iter().map(|(_, widget)| widget.as_str()));
            }
            _ => {}
        }
        out
    }
}

/// Value written to one widget
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum WidgetValue {
    Text(String),
    Checked,
}

impl WidgetValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            WidgetValue::Text(text) => Some(text),
            WidgetValue::Checked => None,
        }
    }
}

impl fmt::Display for WidgetValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WidgetValue::Text(text) => f.write_str(text),
            WidgetValue::Checked => f.write_str("X"),
        }
    }
}

/// Widget name to value, the output of [`FieldMappingTable::resolve`]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResolvedValues {
    values: BTreeMap<String, WidgetValue>,
}

impl ResolvedValues {
    pub fn get(&self, widget: &str) -> Option<&WidgetValue> {
        self.values.get(widget)
    }

    pub fn insert(&mut self, widget: impl Into<String>, value: WidgetValue) {
        self.values.insert(widget.into(), value);
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &WidgetValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Text view used by hard flatten; checked boxes become `X`
    pub fn to_text_map(&self) -> BTreeMap<String, String> {
        self.values
            .iter()
            .map(|(k, v)| (k.clone(), v.to_string()))
            .collect()
    }
}

/// Problem found by [`FieldMappingTable::check_integrity`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MappingIssue {
    DuplicatePath(String),
    /// Several entries write one widget without all being declared shared
    WidgetCollision { widget: String, paths: Vec<String> },
}

impl fmt::Display for MappingIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MappingIssue::DuplicatePath(path) => write!(f, "duplicate logical path {path}"),
            MappingIssue::WidgetCollision { widget, paths } => {
                write!(f, "widget {widget} written by {}", paths.join(", "))
            }
        }
    }
}

struct PendingWrite<'a> {
    entry: &'a FieldMappingEntry,
    widget: String,
    value: WidgetValue,
}

impl PendingWrite<'_> {
    /// Ordering key: greater wins
    fn rank(&self) -> (bool, i32, std::cmp::Reverse<&str>) {
        (
            matches!(self.value, WidgetValue::Checked),
            self.entry.priority,
            std::cmp::Reverse(self.entry.path.as_str()),
        )
    }
}

/// Static mapping for one document layout
#[derive(Debug, Clone)]
pub struct FieldMappingTable {
    variant: SchemaVariant,
    entries: Vec<FieldMappingEntry>,
}

impl FieldMappingTable {
    pub fn new(variant: SchemaVariant, entries: Vec<FieldMappingEntry>) -> Self {
        Self { variant, entries }
    }

    /// ZUS EWYP notification form
    pub fn notification() -> Self {
        Self::new(SchemaVariant::Notification, notification::entries())
    }

    /// Victim's explanation form
    pub fn explanation() -> Self {
        Self::new(SchemaVariant::Explanation, explanation::entries())
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

    pub fn entries(&self) -> &[FieldMappingEntry] {
        &self.entries
    }

    pub fn entry(&self, path: &str) -> Option<&FieldMappingEntry> {
        self.entries.iter().find(|e| e.path == path)
    }

    /// Every widget the table can write
    pub fn widget_names(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        self.entries
            .iter()
            .flat_map(FieldMappingEntry::targets)
            .filter(|w| seen.insert(*w))
            .collect()
    }

    /// Duplicate paths and widget collisions between entries not declared
    /// `shared`
    pub fn check_integrity(&self) -> Vec<MappingIssue> {
        let mut issues = Vec::new();

        let mut paths = HashSet::new();
        for entry in &self.entries {
            if !paths.insert(entry.path.as_str()) {
                issues.push(MappingIssue::DuplicatePath(entry.path.clone()));
            }
        }

        let mut writers: BTreeMap<&str, Vec<&FieldMappingEntry>> = BTreeMap::new();
        for entry in &self.entries {
            let mut own = HashSet::new();
            for widget in entry.targets() {
                if own.insert(widget) {
                    writers.entry(widget).or_default().push(entry);
                }
            }
        }
        for (widget, entries) in writers {
            if entries.len() > 1 && !entries.iter().all(|e| e.shared) {
                issues.push(MappingIssue::WidgetCollision {
                    widget: widget.to_string(),
                    paths: entries.iter().map(|e| e.path.clone()).collect(),
                });
            }
        }

        issues
    }

    /// Required schema paths with no mapping entry
    pub fn missing_required(&self, schema: &FormSchema) -> Vec<String> {
        schema
            .required_paths()
            .into_iter()
            .filter(|path| self.entry(path).is_none())
            .collect()
    }

    /// Widget writes produced by one entry for one value
    fn writes<'a>(entry: &'a FieldMappingEntry, value: &FlatValue) -> Vec<PendingWrite<'a>> {
        let text_to_all = |text: String| {
            entry
                .widgets
                .iter()
                .map(|widget| PendingWrite {
                    entry,
                    widget: widget.clone(),
                    value: WidgetValue::Text(text.clone()),
                })
                .collect::<Vec<_>>()
        };
        let tick = |widget: &str| {
            vec![PendingWrite {
                entry,
                widget: widget.to_string(),
                value: WidgetValue::Checked,
            }]
        };

        match &entry.transform {
            Transform::Direct | Transform::CompositeMerge => text_to_all(value.to_string()),
            Transform::Date(style) => {
                let raw = value.to_string();
                let text = style.reformat(&raw).unwrap_or_else(|| {
                    tracing::warn!(path = %entry.path, value = %raw, "date not in YYYY-MM-DD, using it verbatim");
                    raw.clone()
                });
                text_to_all(text)
            }
            Transform::YesNoText => match value.as_bool() {
                Some(true) => text_to_all("TAK".to_string()),
                Some(false) => text_to_all("NIE".to_string()),
                None => text_to_all(value.to_string()),
            },
            Transform::BooleanPair {
                when_true,
                when_false,
            } => match value.as_bool() {
                Some(true) => tick(when_true),
                Some(false) => tick(when_false),
                None => {
                    tracing::warn!(path = %entry.path, value = %value, "expected a yes/no value");
                    Vec::new()
                }
            },
            Transform::Checkbox => match value.as_bool() {
                Some(true) => entry.widgets.iter().flat_map(|w| tick(w)).collect(),
                Some(false) => Vec::new(),
                None => {
                    tracing::warn!(path = %entry.path, value = %value, "expected a yes/no value");
                    Vec::new()
                }
            },
            Transform::EnumChoice { section, choices } => {
                let chosen = value.to_string();
                match choices.iter().find(|(code, _)| *code == chosen) {
                    Some((_, widget)) => tick(widget),
                    None => {
                        tracing::warn!(
                            path = %entry.path,
                            ?section,
                            value = %chosen,
                            "no checkbox for enum value"
                        );
                        Vec::new()
                    }
                }
            }
            // Applied after every other write
            Transform::Qualifier { .. } => Vec::new(),
        }
    }

    /// Turn flat values into widget values
    pub fn resolve(&self, flat: &FlatFieldMap) -> ResolvedValues {
        let mut by_widget: HashMap<String, Vec<PendingWrite<'_>>> = HashMap::new();
        let mut qualifiers = Vec::new();

        for entry in &self.entries {
            let Some(value) = flat.get(&entry.path) else {
                continue;
            };
            if let Transform::Qualifier { labels } = &entry.transform {
                qualifiers.push((entry, labels, value));
                continue;
            }
            for write in Self::writes(entry, value) {
                by_widget.entry(write.widget.clone()).or_default().push(write);
            }
        }

        for path in flat.paths() {
            if self.entry(path).is_none() {
                tracing::trace!(path, "no widget mapped for path");
            }
        }

        let mut resolved = ResolvedValues::default();
        for (widget, writes) in by_widget {
            if writes.len() > 1 {
                let distinct: HashSet<&WidgetValue> = writes.iter().map(|w| &w.value).collect();
                if distinct.len() > 1 {
                    let paths: Vec<&str> = writes.iter().map(|w| w.entry.path.as_str()).collect();
                    tracing::warn!(widget = %widget, ?paths, "conflicting values for one widget");
                }
            }
            if let Some(winner) = writes.into_iter().max_by(|a, b| a.rank().cmp(&b.rank())) {
                resolved.insert(widget, winner.value);
            }
        }

        for (entry, labels, value) in qualifiers {
            let code = value.to_string();
            let Some((_, label)) = labels.iter().find(|(c, _)| *c == code) else {
                tracing::warn!(path = %entry.path, value = %code, "unknown qualifier value");
                continue;
            };
            for widget in &entry.widgets {
                let text = match resolved.get(widget).and_then(WidgetValue::as_text) {
                    Some(existing) if !existing.is_empty() => format!("{existing} ({label})"),
                    _ => label.to_string(),
                };
                resolved.insert(widget.clone(), WidgetValue::Text(text));
            }
        }

        tracing::debug!(
            variant = %self.variant,
            flat = flat.len(),
            widgets = resolved.len(),
            "resolved widget values"
        );
        resolved
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn flat(pairs: &[(&str, FlatValue)]) -> FlatFieldMap {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn test_direct_and_date() {
        let table = FieldMappingTable::new(
            SchemaVariant::Notification,
            vec![
                FieldMappingEntry::direct("a.name", "Name[0]"),
                FieldMappingEntry::date("a.born", vec!["Born[0]".to_string()], DateStyle::Compact),
            ],
        );
        let resolved = table.resolve(&flat(&[
            ("a.name", "Jan".into()),
            ("a.born", "1990-01-15".into()),
            ("a.unmapped", "x".into()),
        ]));

        assert_eq!(resolved.len(), 2);
        assert_eq!(resolved.get("Name[0]"), Some(&WidgetValue::Text("Jan".to_string())));
        assert_eq!(resolved.get("Born[0]"), Some(&WidgetValue::Text("15-01-90".to_string())));
    }

    #[test]
    fn test_bad_date_passes_through() {
        let table = FieldMappingTable::new(
            SchemaVariant::Notification,
            vec![FieldMappingEntry::date("d", vec!["D".to_string()], DateStyle::Compact)],
        );
        let resolved = table.resolve(&flat(&[("d", "15.01.1990".into())]));
        assert_eq!(resolved.get("D"), Some(&WidgetValue::Text("15.01.1990".to_string())));
    }

    #[test]
    fn test_boolean_pair_sets_exactly_one() {
        let table = FieldMappingTable::new(
            SchemaVariant::Notification,
            vec![FieldMappingEntry::boolean_pair("b", "TAK", "NIE")],
        );
        let yes = table.resolve(&flat(&[("b", true.into())]));
        assert_eq!(yes.get("TAK"), Some(&WidgetValue::Checked));
        assert_eq!(yes.get("NIE"), None);

        let no = table.resolve(&flat(&[("b", "nie".into())]));
        assert_eq!(no.get("TAK"), None);
        assert_eq!(no.get("NIE"), Some(&WidgetValue::Checked));
    }

    #[test]
    fn test_enum_choice_and_unknown_value() {
        let table = FieldMappingTable::new(
            SchemaVariant::Notification,
            vec![FieldMappingEntry::enum_choice(
                "e",
                Section::Response,
                vec![("a", "A".to_string()), ("b", "B".to_string())],
            )],
        );
        let resolved = table.resolve(&flat(&[("e", "b".into())]));
        assert_eq!(resolved.len(), 1);
        assert_eq!(resolved.get("B"), Some(&WidgetValue::Checked));

        assert!(table.resolve(&flat(&[("e", "z".into())])).is_empty());
    }

    #[test]
    fn test_checkbox_only_when_true() {
        let table = FieldMappingTable::new(
            SchemaVariant::Notification,
            vec![FieldMappingEntry::checkbox("c", "C")],
        );
        assert_eq!(
            table.resolve(&flat(&[("c", true.into())])).get("C"),
            Some(&WidgetValue::Checked)
        );
        assert!(table.resolve(&flat(&[("c", false.into())])).is_empty());
    }

    #[test]
    fn test_qualifier_appends_label() {
        let table = FieldMappingTable::new(
            SchemaVariant::Explanation,
            vec![
                FieldMappingEntry::qualifier("q", "W", vec![("x", "etykieta")]),
                FieldMappingEntry::yes_no("b", "W"),
            ],
        );
        let both = table.resolve(&flat(&[("b", false.into()), ("q", "x".into())]));
        assert_eq!(both.get("W"), Some(&WidgetValue::Text("NIE (etykieta)".to_string())));

        let only = table.resolve(&flat(&[("q", "x".into())]));
        assert_eq!(only.get("W"), Some(&WidgetValue::Text("etykieta".to_string())));
    }

    #[test]
    fn test_shared_conflict_resolution() {
        let table = FieldMappingTable::new(
            SchemaVariant::Notification,
            vec![
                FieldMappingEntry::direct("z.phone", "Phone").shared(0),
                FieldMappingEntry::direct("a.phone", "Phone").shared(0),
                FieldMappingEntry::direct("m.phone", "Phone").shared(1),
            ],
        );
        let values = flat(&[
            ("z.phone", "111".into()),
            ("a.phone", "222".into()),
            ("m.phone", "333".into()),
        ]);
        assert_eq!(
            table.resolve(&values).get("Phone"),
            Some(&WidgetValue::Text("333".to_string()))
        );

        let without_priority = flat(&[("z.phone", "111".into()), ("a.phone", "222".into())]);
        assert_eq!(
            table.resolve(&without_priority).get("Phone"),
            Some(&WidgetValue::Text("222".to_string()))
        );
    }

    #[test]
    fn test_checkbox_beats_text() {
        let table = FieldMappingTable::new(
            SchemaVariant::Notification,
            vec![
                FieldMappingEntry::direct("t", "Box").shared(5),
                FieldMappingEntry::checkbox("c", "Box").shared(0),
            ],
        );
        let resolved = table.resolve(&flat(&[("t", "text".into()), ("c", true.into())]));
        assert_eq!(resolved.get("Box"), Some(&WidgetValue::Checked));
    }

    #[test]
    fn test_integrity_detects_problems() {
        let table = FieldMappingTable::new(
            SchemaVariant::Notification,
            vec![
                FieldMappingEntry::direct("a", "W1"),
                FieldMappingEntry::direct("a", "W2"),
                FieldMappingEntry::direct("b", "W1"),
                FieldMappingEntry::direct("c", "W3").shared(0),
                FieldMappingEntry::direct("d", "W3").shared(1),
            ],
        );
        let issues = table.check_integrity();
        assert_eq!(
            issues,
            vec![
                MappingIssue::DuplicatePath("a".to_string()),
                MappingIssue::WidgetCollision {
                    widget: "W1".to_string(),
                    paths: vec!["a".to_string(), "b".to_string()],
                },
            ]
        );
    }

    #[test]
    fn test_builtin_tables_are_consistent() {
        for table in [FieldMappingTable::notification(), FieldMappingTable::explanation()] {
            assert_eq!(table.check_integrity(), Vec::new(), "{}", table.variant());
            let schema = FormSchema::for_variant(table.variant());
            assert_eq!(table.missing_required(&schema), Vec::<String>::new());
        }
    }
}
