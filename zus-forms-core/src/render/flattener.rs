//! Hard flatten: draw field values into the page content and remove the
//! interactive form
//!
//! Two passes. The first writes values into the widgets like a soft fill and
//! saves an intermediate `<output>.temp.pdf`; the second reloads it, draws
//! each widget's value inside its rectangle, removes the widgets and the
//! `/AcroForm`, and prunes unreachable objects.

use super::fonts::FontSource;
use super::textbox::{fit_text, PADDING};
use crate::error::Result;
use crate::forms::{
    apply_value, collect_widgets, open_template, page_annotations, remove_acro_form, resolve,
    resolve_dict, save_document, WidgetInfo,
};
use crate::geometry::Rectangle;
use crate::mapping::WidgetValue;
use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Document, Object, ObjectId, Stream};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::path::{Path, PathBuf};

/// Resource name of the drawing font on every page
const FONT_RESOURCE: &str = "ZusF1";

/// Font sizes for drawn text
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlattenOptions {
    pub base_font_size: f64,
    pub fallback_font_size: f64,
}

impl Default for FlattenOptions {
    fn default() -> Self {
        Self {
            base_font_size: 9.0,
            fallback_font_size: 7.0,
        }
    }
}

/// A widget value as drawn on the page
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderedField {
    pub name: String,
    pub page: u32,
    #[serde(skip)]
    pub rect: Rectangle,
    pub text: String,
    pub font_size: f64,
    pub lines_drawn: usize,
    pub truncated: bool,
}

/// Outcome of a hard flatten
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FlattenReport {
    pub output_path: PathBuf,
    /// Widgets that received a value from the map
    pub fields_filled: usize,
    /// Named widgets in the template
    pub total_fields: usize,
    pub rendered: Vec<RenderedField>,
}

/// Upper-cased alphanumerics only, so `Victim_Name` matches `VICTIMNAME`
pub fn normalize_widget_name(name: &str) -> String {
    name.chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_uppercase)
        .collect()
}

struct ValueIndex {
    values: HashMap<String, String>,
}

impl ValueIndex {
    fn new(values: &BTreeMap<String, String>) -> Self {
        let values = values
            .iter()
            .filter(|(_, v)| !v.trim().is_empty())
            .map(|(k, v)| (normalize_widget_name(k), v.clone()))
            .collect();
        Self { values }
    }

    fn lookup(&self, widget: &WidgetInfo) -> Option<&str> {
        self.values
            .get(&normalize_widget_name(&widget.qualified_name))
            .or_else(|| self.values.get(&normalize_widget_name(&widget.partial_name)))
            .map(String::as_str)
    }
}

/// Text to draw for a widget; `None` draws nothing
fn display_text(widget: &WidgetInfo, mapped: Option<&str>) -> Option<String> {
    if widget.field_type.is_toggle() {
        return widget.is_checked().then(|| "X".to_string());
    }
    mapped
        .map(str::to_string)
        .or_else(|| widget.value.clone())
        .filter(|text| !text.trim().is_empty())
}

fn real(value: f64) -> Object {
    Object::Real(value as f32)
}

fn draw_operations(
    font: &FontSource,
    rect: &Rectangle,
    lines: &[String],
    font_size: f64,
    line_height: f64,
) -> Vec<Operation> {
    let x = rect.lower_left.x + PADDING;
    let first_baseline = rect.upper_right.y - PADDING - font.ascent() / 1000.0 * font_size;

    let mut ops = vec![
        Operation::new("BT", vec![]),
        Operation::new(
            "Tf",
            vec![Object::Name(FONT_RESOURCE.as_bytes().to_vec()), real(font_size)],
        ),
        Operation::new("g", vec![real(0.0)]),
    ];
    for (index, line) in lines.iter().enumerate() {
        let y = first_baseline - index as f64 * line_height;
        ops.push(Operation::new(
            "Tm",
            vec![real(1.0), real(0.0), real(0.0), real(1.0), real(x), real(y)],
        ));
        ops.push(Operation::new("Tj", vec![font.encode(line)]));
    }
    ops.push(Operation::new("ET", vec![]));
    ops
}

/// Resources of `page_id`, following references and `/Parent` inheritance
fn page_resources(doc: &Document, page_id: ObjectId) -> Dictionary {
    let mut current = doc.get_dictionary(page_id).ok();
    for _ in 0..32 {
        let Some(dict) = current else { break };
        if let Some(resources) = dict.get(b"Resources").ok().and_then(|r| resolve_dict(doc, r)) {
            return resources.clone();
        }
        current = dict
            .get(b"Parent")
            .ok()
            .and_then(|p| p.as_reference().ok())
            .and_then(|id| doc.get_dictionary(id).ok());
    }
    Dictionary::new()
}

/// Give the page its own `/Resources` with the drawing font added
fn install_font(doc: &mut Document, page_id: ObjectId, font_id: ObjectId) -> Result<()> {
    let mut resources = page_resources(doc, page_id);
    let mut fonts = resources
        .get(b"Font")
        .ok()
        .and_then(|f| resolve_dict(doc, f))
        .cloned()
        .unwrap_or_default();
    fonts.set(FONT_RESOURCE, Object::Reference(font_id));
    resources.set("Font", Object::Dictionary(fonts));
    doc.get_dictionary_mut(page_id)?
        .set("Resources", Object::Dictionary(resources));
    Ok(())
}

/// Wrap the existing content in `q`/`Q` and append `operations`
fn append_content(doc: &mut Document, page_id: ObjectId, operations: Vec<Operation>) -> Result<()> {
    let existing: Vec<Object> = match doc.get_dictionary(page_id)?.get(b"Contents") {
        Ok(Object::Array(items)) => items.clone(),
        Ok(reference @ Object::Reference(_)) => match resolve(doc, reference) {
            Some(Object::Array(items)) => items.clone(),
            _ => vec![reference.clone()],
        },
        _ => Vec::new(),
    };

    let save_state = Content {
        operations: vec![Operation::new("q", vec![])],
    };
    let mut drawn = vec![Operation::new("Q", vec![]), Operation::new("q", vec![])];
    drawn.extend(operations);
    drawn.push(Operation::new("Q", vec![]));
    let drawn = Content { operations: drawn };

    let before = doc.add_object(Stream::new(Dictionary::new(), save_state.encode()?));
    let after = doc.add_object(Stream::new(Dictionary::new(), drawn.encode()?));

    let mut contents = vec![Object::Reference(before)];
    contents.extend(existing);
    contents.push(Object::Reference(after));
    doc.get_dictionary_mut(page_id)?
        .set("Contents", Object::Array(contents));
    Ok(())
}

/// Drop `remove` from the page's `/Annots`, wherever the array lives
fn remove_annotations(doc: &mut Document, page_id: ObjectId, remove: &HashSet<ObjectId>) -> Result<()> {
    let keep = |obj: &Object| !matches!(obj, Object::Reference(id) if remove.contains(id));

    let annots_ref = match doc.get_dictionary(page_id)?.get(b"Annots") {
        Ok(Object::Reference(id)) => Some(*id),
        _ => None,
    };
    match annots_ref {
        Some(id) => {
            if let Ok(items) = doc.get_object_mut(id).and_then(Object::as_array_mut) {
                items.retain(keep);
            }
        }
        None => {
            let page = doc.get_dictionary_mut(page_id)?;
            let now_empty = match page.get_mut(b"Annots") {
                Ok(Object::Array(items)) => {
                    items.retain(keep);
                    items.is_empty()
                }
                _ => false,
            };
            if now_empty {
                page.remove(b"Annots");
            }
        }
    }
    Ok(())
}

fn temp_path(output: &Path) -> PathBuf {
    output.with_extension("temp.pdf")
}

/// Fill `template` from `values` (widget name to text), draw every value
/// onto its page and remove the form. Values are matched on normalized
/// widget names; widgets with no mapped value keep their existing text.
pub fn fill_and_flatten(
    template: &Path,
    output: &Path,
    values: &BTreeMap<String, String>,
    font: &FontSource,
    options: &FlattenOptions,
) -> Result<FlattenReport> {
    let mut doc = open_template(template)?;
    let index = ValueIndex::new(values);

    let widgets = collect_widgets(&doc);
    let total_fields = widgets
        .iter()
        .filter(|w| !w.qualified_name.is_empty())
        .count();
    tracing::info!(
        template = %template.display(),
        values = index.values.len(),
        widgets = total_fields,
        "flattening form"
    );

    let mut fields_filled = 0;
    for widget in &widgets {
        if let Some(value) = index.lookup(widget) {
            apply_value(&mut doc, widget, &WidgetValue::Text(value.to_string()))?;
            fields_filled += 1;
        }
    }

    let temp = temp_path(output);
    save_document(&mut doc, &temp)?;
    let result = flatten_saved(&temp, output, &index, font, options);
    if let Err(e) = std::fs::remove_file(&temp) {
        tracing::debug!(path = %temp.display(), error = %e, "could not remove intermediate file");
    }
    let rendered = result?;

    tracing::info!(output = %output.display(), fields_filled, total_fields, "saved flattened form");
    Ok(FlattenReport {
        output_path: output.to_path_buf(),
        fields_filled,
        total_fields,
        rendered,
    })
}

fn flatten_saved(
    temp: &Path,
    output: &Path,
    index: &ValueIndex,
    font: &FontSource,
    options: &FlattenOptions,
) -> Result<Vec<RenderedField>> {
    let mut doc = Document::load(temp)?;
    let widgets = collect_widgets(&doc);

    let texts: Vec<(&WidgetInfo, String)> = widgets
        .iter()
        .filter_map(|w| display_text(w, index.lookup(w)).map(|text| (w, text)))
        .collect();

    let used: BTreeSet<char> = texts.iter().flat_map(|(_, text)| text.chars()).collect();
    let font_id = font.add_to_document(&mut doc, &used)?;

    let mut rendered = Vec::new();
    for (page_number, page_id) in doc.get_pages() {
        let mut operations = Vec::new();
        for (widget, text) in texts.iter().filter(|(w, _)| w.page == page_number) {
            let Some(rect) = widget.rect else {
                continue;
            };
            let laid_out = fit_text(
                text,
                font,
                &rect,
                options.base_font_size,
                options.fallback_font_size,
            );
            if laid_out.overflows() {
                tracing::debug!(
                    widget = %widget.qualified_name,
                    shown = laid_out.visible,
                    lines = laid_out.lines.len(),
                    "text truncated"
                );
            }
            operations.extend(draw_operations(
                font,
                &rect,
                laid_out.visible_lines(),
                laid_out.font_size,
                laid_out.line_height,
            ));
            rendered.push(RenderedField {
                name: widget.qualified_name.clone(),
                page: page_number,
                rect,
                text: text.clone(),
                font_size: laid_out.font_size,
                lines_drawn: laid_out.visible,
                truncated: laid_out.overflows(),
            });
        }

        if !operations.is_empty() {
            install_font(&mut doc, page_id, font_id)?;
            append_content(&mut doc, page_id, operations)?;
        }

        let on_page: HashSet<ObjectId> = page_annotations(&doc, page_id)
            .into_iter()
            .filter(|id| widgets.iter().any(|w| w.object_id == *id))
            .collect();
        remove_annotations(&mut doc, page_id, &on_page)?;
    }

    remove_acro_form(&mut doc)?;
    let pruned = doc.prune_objects();
    tracing::debug!(pruned = pruned.len(), "removed unreachable objects");

    save_document(&mut doc, output)?;
    Ok(rendered)
}
