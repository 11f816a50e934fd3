//! Synthetic AcroForm templates
//!
//! Builds small interactive PDFs with named text fields and check boxes.
//! Dotted names (`topmostSubform[0].Page1[0].Imie[0]`) produce a real field
//! hierarchy with non-terminal parents, the way form designers export them,
//! so the same lookup rules apply to synthetic and production templates.

use super::acro_form::encode_text_string;
use crate::error::Result;
use crate::geometry::Rectangle;
use crate::mapping::FieldMappingTable;
use crate::model::AccidentCard;
use lazy_static::lazy_static;
use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Document, Object, ObjectId, Stream};
use regex::Regex;
use std::collections::{BTreeMap, HashSet};
use std::path::Path;

/// A4 portrait
pub const PAGE_WIDTH: f64 = 595.0;
pub const PAGE_HEIGHT: f64 = 842.0;

const MARGIN: f64 = 40.0;
const ROW_HEIGHT: f64 = 20.0;
const TEXT_HEIGHT: f64 = 14.0;
const CHECKBOX_SIZE: f64 = 10.0;
const DEFAULT_APPEARANCE: &str = "/Helv 0 Tf 0 g";

lazy_static! {
    static ref PAGE_SEGMENT: Regex = Regex::new(r"(?:^|\.)Page(\d+)\[").unwrap();
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WidgetKind {
    Text { multiline: bool },
    CheckBox,
}

#[derive(Debug, Clone)]
struct WidgetSpec {
    name: String,
    kind: WidgetKind,
    rect: Rectangle,
    value: Option<String>,
}

/// Builder for synthetic form templates
#[derive(Debug, Clone, Default)]
pub struct TemplateBuilder {
    pages: Vec<Vec<WidgetSpec>>,
}

impl TemplateBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new page; following widgets are placed on it
    pub fn page(mut self) -> Self {
        self.pages.push(Vec::new());
        self
    }

    fn push(mut self, spec: WidgetSpec) -> Self {
        if self.pages.is_empty() {
            self.pages.push(Vec::new());
        }
        if let Some(page) = self.pages.last_mut() {
            page.push(spec);
        }
        self
    }

    /// Single-line text field
    pub fn text_field(self, name: impl Into<String>, rect: Rectangle) -> Self {
        self.push(WidgetSpec {
            name: name.into(),
            kind: WidgetKind::Text { multiline: false },
            rect,
            value: None,
        })
    }

    /// Multi-line text field
    pub fn text_area(self, name: impl Into<String>, rect: Rectangle) -> Self {
        self.push(WidgetSpec {
            name: name.into(),
            kind: WidgetKind::Text { multiline: true },
            rect,
            value: None,
        })
    }

    /// Text field carrying a value already
    pub fn text_field_with_value(
        self,
        name: impl Into<String>,
        rect: Rectangle,
        value: impl Into<String>,
    ) -> Self {
        self.push(WidgetSpec {
            name: name.into(),
            kind: WidgetKind::Text { multiline: false },
            rect,
            value: Some(value.into()),
        })
    }

    /// Check box with a `Yes` on-state, initially off
    pub fn checkbox(self, name: impl Into<String>, rect: Rectangle) -> Self {
        self.push(WidgetSpec {
            name: name.into(),
            kind: WidgetKind::CheckBox,
            rect,
            value: None,
        })
    }

    pub fn widget_count(&self) -> usize {
        self.pages.iter().map(Vec::len).sum()
    }

    /// Assemble the document
    pub fn build(self) -> Document {
        let mut doc = Document::with_version("1.7");
        let pages_id = doc.new_object_id();

        let mut font = Dictionary::new();
        font.set("Type", Object::Name(b"Font".to_vec()));
        font.set("Subtype", Object::Name(b"Type1".to_vec()));
        font.set("BaseFont", Object::Name(b"Helvetica".to_vec()));
        font.set("Encoding", Object::Name(b"WinAnsiEncoding".to_vec()));
        let font_id = doc.add_object(font);
        let mut fonts = Dictionary::new();
        fonts.set("Helv", Object::Reference(font_id));
        let mut resources = Dictionary::new();
        resources.set("Font", Object::Dictionary(fonts));

        let mut tree = FieldTree::default();
        let mut page_refs = Vec::new();

        let pages = if self.pages.is_empty() {
            vec![Vec::new()]
        } else {
            self.pages
        };

        for specs in pages {
            let page_id = doc.new_object_id();
            let mut annots = Vec::new();
            let mut frame = Vec::new();

            for spec in &specs {
                let widget_id = add_widget(&mut doc, &mut tree, page_id, spec);
                annots.push(Object::Reference(widget_id));
                frame.push(Operation::new(
                    "re",
                    vec![
                        real(spec.rect.lower_left.x),
                        real(spec.rect.lower_left.y),
                        real(spec.rect.width()),
                        real(spec.rect.height()),
                    ],
                ));
            }

            let mut operations = vec![
                Operation::new("q", vec![]),
                Operation::new("w", vec![real(0.5)]),
                Operation::new("G", vec![real(0.6)]),
            ];
            operations.extend(frame);
            operations.push(Operation::new("S", vec![]));
            operations.push(Operation::new("Q", vec![]));
            let content = Content { operations };
            let bytes = content.encode().unwrap_or_default();
            let content_id = doc.add_object(Stream::new(Dictionary::new(), bytes));

            let mut page = Dictionary::new();
            page.set("Type", Object::Name(b"Page".to_vec()));
            page.set("Parent", Object::Reference(pages_id));
            page.set(
                "MediaBox",
                Rectangle::from_position_and_size(0.0, 0.0, PAGE_WIDTH, PAGE_HEIGHT).to_pdf_array(),
            );
            page.set("Contents", Object::Reference(content_id));
            page.set("Resources", Object::Dictionary(resources.clone()));
            page.set("Annots", Object::Array(annots));
            doc.objects.insert(page_id, Object::Dictionary(page));
            page_refs.push(Object::Reference(page_id));
        }

        let mut pages_dict = Dictionary::new();
        pages_dict.set("Type", Object::Name(b"Pages".to_vec()));
        pages_dict.set("Count", Object::Integer(page_refs.len() as i64));
        pages_dict.set("Kids", Object::Array(page_refs));
        doc.objects.insert(pages_id, Object::Dictionary(pages_dict));

        let fields = tree.finish(&mut doc);

        let mut acro_form = Dictionary::new();
        acro_form.set("Fields", Object::Array(fields));
        acro_form.set("DA", Object::string_literal(DEFAULT_APPEARANCE));
        acro_form.set("DR", Object::Dictionary(resources));
        let acro_form_id = doc.add_object(acro_form);

        let mut catalog = Dictionary::new();
        catalog.set("Type", Object::Name(b"Catalog".to_vec()));
        catalog.set("Pages", Object::Reference(pages_id));
        catalog.set("AcroForm", Object::Reference(acro_form_id));
        let catalog_id = doc.add_object(catalog);
        doc.trailer.set("Root", Object::Reference(catalog_id));
        doc
    }

    /// Build and write to `path`, creating parent directories
    pub fn save(self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let mut doc = self.build();
        doc.save(path)?;
        tracing::debug!(path = %path.display(), "wrote template");
        Ok(())
    }
}

/// Non-terminal fields created for dotted names
#[derive(Default)]
struct FieldTree {
    nodes: BTreeMap<String, ObjectId>,
    kids: BTreeMap<ObjectId, Vec<ObjectId>>,
    parents: BTreeMap<ObjectId, ObjectId>,
    roots: Vec<ObjectId>,
}

impl FieldTree {
    /// Parent of the terminal field `name`, creating missing ancestors
    fn attach(&mut self, doc: &mut Document, name: &str, child: ObjectId) -> Option<ObjectId> {
        let segments: Vec<&str> = name.split('.').collect();
        let mut parent: Option<ObjectId> = None;
        for depth in 0..segments.len().saturating_sub(1) {
            let key = segments[..=depth].join(".");
            let id = match self.nodes.get(&key) {
                Some(id) => *id,
                None => {
                    let id = doc.new_object_id();
                    self.nodes.insert(key, id);
                    match parent {
                        Some(p) => {
                            self.kids.entry(p).or_default().push(id);
                            self.parents.insert(id, p);
                        }
                        None => self.roots.push(id),
                    }
                    id
                }
            };
            parent = Some(id);
        }
        match parent {
            Some(p) => self.kids.entry(p).or_default().push(child),
            None => self.roots.push(child),
        }
        parent
    }

    /// Write the non-terminal dictionaries, return `/Fields`
    fn finish(self, doc: &mut Document) -> Vec<Object> {
        for (key, id) in &self.nodes {
            let partial = key.rsplit('.').next().unwrap_or(key);
            let mut dict = Dictionary::new();
            dict.set("T", encode_text_string(partial));
            let kids = self.kids.get(id).cloned().unwrap_or_default();
            dict.set(
                "Kids",
                Object::Array(kids.into_iter().map(Object::Reference).collect()),
            );
            if let Some(parent) = self.parents.get(id) {
                dict.set("Parent", Object::Reference(*parent));
            }
            doc.objects.insert(*id, Object::Dictionary(dict));
        }
        self.roots.into_iter().map(Object::Reference).collect()
    }
}

fn real(value: f64) -> Object {
    Object::Real(value as f32)
}

fn checkbox_appearance(doc: &mut Document, rect: &Rectangle, checked: bool) -> ObjectId {
    let (w, h) = (rect.width(), rect.height());
    let mut operations = vec![Operation::new("q", vec![])];
    if checked {
        operations.extend([
            Operation::new("w", vec![real(1.0)]),
            Operation::new("m", vec![real(1.0), real(1.0)]),
            Operation::new("l", vec![real(w - 1.0), real(h - 1.0)]),
            Operation::new("m", vec![real(1.0), real(h - 1.0)]),
            Operation::new("l", vec![real(w - 1.0), real(1.0)]),
            Operation::new("S", vec![]),
        ]);
    }
    operations.push(Operation::new("Q", vec![]));
    let bytes = Content { operations }.encode().unwrap_or_default();

    let mut dict = Dictionary::new();
    dict.set("Type", Object::Name(b"XObject".to_vec()));
    dict.set("Subtype", Object::Name(b"Form".to_vec()));
    dict.set(
        "BBox",
        Rectangle::from_position_and_size(0.0, 0.0, w, h).to_pdf_array(),
    );
    doc.add_object(Stream::new(dict, bytes))
}

fn add_widget(
    doc: &mut Document,
    tree: &mut FieldTree,
    page_id: ObjectId,
    spec: &WidgetSpec,
) -> ObjectId {
    let widget_id = doc.new_object_id();
    let partial = spec.name.rsplit('.').next().unwrap_or(&spec.name);

    let mut dict = Dictionary::new();
    dict.set("Type", Object::Name(b"Annot".to_vec()));
    dict.set("Subtype", Object::Name(b"Widget".to_vec()));
    dict.set("T", encode_text_string(partial));
    dict.set("Rect", spec.rect.to_pdf_array());
    dict.set("P", Object::Reference(page_id));
    // Print
    dict.set("F", Object::Integer(4));

    let mut mk = Dictionary::new();
    mk.set("BC", Object::Array(vec![Object::Real(0.0)]));
    mk.set("BG", Object::Array(vec![Object::Real(1.0)]));
    dict.set("MK", Object::Dictionary(mk));

    match spec.kind {
        WidgetKind::Text { multiline } => {
            dict.set("FT", Object::Name(b"Tx".to_vec()));
            dict.set("DA", Object::string_literal(DEFAULT_APPEARANCE));
            if multiline {
                dict.set(
                    "Ff",
                    Object::Integer(i64::from(super::FieldFlags::MULTILINE.bits())),
                );
            }
            if let Some(value) = &spec.value {
                dict.set("V", encode_text_string(value));
            }
        }
        WidgetKind::CheckBox => {
            let on = checkbox_appearance(doc, &spec.rect, true);
            let off = checkbox_appearance(doc, &spec.rect, false);
            let mut normal = Dictionary::new();
            normal.set("Yes", Object::Reference(on));
            normal.set("Off", Object::Reference(off));
            let mut ap = Dictionary::new();
            ap.set("N", Object::Dictionary(normal));

            dict.set("FT", Object::Name(b"Btn".to_vec()));
            dict.set("AP", Object::Dictionary(ap));
            dict.set("AS", Object::Name(b"Off".to_vec()));
            dict.set("V", Object::Name(b"Off".to_vec()));
        }
    }

    if let Some(parent) = tree.attach(doc, &spec.name, widget_id) {
        dict.set("Parent", Object::Reference(parent));
    }
    doc.objects.insert(widget_id, Object::Dictionary(dict));
    widget_id
}

/// Row/column cursor for automatic placement
struct GridLayout {
    column: usize,
    y: f64,
}

impl GridLayout {
    const COLUMNS: usize = 2;

    fn new() -> Self {
        Self {
            column: 0,
            y: PAGE_HEIGHT - MARGIN,
        }
    }

    fn column_width() -> f64 {
        (PAGE_WIDTH - 2.0 * MARGIN) / Self::COLUMNS as f64 - 10.0
    }

    /// Next slot of `height`, or `None` when the page is full
    fn next(&mut self, width: f64, height: f64) -> Option<Rectangle> {
        loop {
            let top = self.y;
            if top - height < MARGIN {
                if self.column + 1 >= Self::COLUMNS {
                    return None;
                }
                self.column += 1;
                self.y = PAGE_HEIGHT - MARGIN;
                continue;
            }
            self.y -= height.max(TEXT_HEIGHT) + (ROW_HEIGHT - TEXT_HEIGHT);
            let x = MARGIN + self.column as f64 * (Self::column_width() + 10.0);
            return Some(Rectangle::from_position_and_size(x, top - height, width, height));
        }
    }
}

/// Widgets of one synthetic page
#[derive(Debug, Clone, Default)]
struct PagePlan {
    text: Vec<(String, f64)>,
    checkboxes: Vec<String>,
}

fn lay_out(plans: Vec<PagePlan>) -> TemplateBuilder {
    let mut builder = TemplateBuilder::new();
    for plan in plans {
        builder = builder.page();
        let mut grid = GridLayout::new();
        let widgets = plan
            .text
            .into_iter()
            .map(|(name, height)| (name, Some(height)))
            .chain(plan.checkboxes.into_iter().map(|name| (name, None)));

        for (name, height) in widgets {
            let (width, h) = match height {
                Some(h) => (GridLayout::column_width(), h),
                None => (CHECKBOX_SIZE, CHECKBOX_SIZE),
            };
            let rect = match grid.next(width, h) {
                Some(rect) => rect,
                None => {
                    builder = builder.page();
                    grid = GridLayout::new();
                    match grid.next(width, h) {
                        Some(rect) => rect,
                        None => continue,
                    }
                }
            };
            builder = match height {
                Some(h) if h > TEXT_HEIGHT => builder.text_area(name, rect),
                Some(_) => builder.text_field(name, rect),
                None => builder.checkbox(name, rect),
            };
        }
    }
    builder
}

fn page_of(widget: &str) -> usize {
    PAGE_SEGMENT
        .captures(widget)
        .and_then(|c| c[1].parse::<usize>().ok())
        .unwrap_or(1)
        .max(1)
}

/// Template carrying every widget a mapping table writes. Widgets named
/// `...PageN[0]...` land on page N.
pub fn scaffold_for_table(table: &FieldMappingTable) -> TemplateBuilder {
    let checkboxes: HashSet<&str> = table
        .entries()
        .iter()
        .flat_map(|e| e.checkbox_targets())
        .collect();

    let mut plans: Vec<PagePlan> = Vec::new();
    for widget in table.widget_names() {
        let page = page_of(widget);
        if plans.len() < page {
            plans.resize(page, PagePlan::default());
        }
        let plan = &mut plans[page - 1];
        if checkboxes.contains(widget) {
            plan.checkboxes.push(widget.to_string());
        } else {
            plan.text.push((widget.to_string(), TEXT_HEIGHT));
        }
    }
    lay_out(plans)
}

/// Accident card template; free-text widgets get taller boxes
pub fn scaffold_accident_card() -> TemplateBuilder {
    const TALL: [&str; 3] = ["CIRCUMSTANCESINFORMATION", "DIFFICULTIES", "VICTIMFAULT"];
    let text = AccidentCard::WIDGETS
        .iter()
        .map(|name| {
            let height = if TALL.contains(name) { 3.0 * TEXT_HEIGHT } else { TEXT_HEIGHT };
            (name.to_string(), height)
        })
        .collect();
    lay_out(vec![PagePlan {
        text,
        checkboxes: Vec::new(),
    }])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forms::{collect_widgets, FieldType};
    use std::collections::HashSet;

    #[test]
    fn test_builder_shares_parents() {
        let doc = TemplateBuilder::new()
            .text_field("root[0].Page1[0].A[0]", Rectangle::from_position_and_size(0.0, 0.0, 5.0, 5.0))
            .text_field("root[0].Page1[0].B[0]", Rectangle::from_position_and_size(0.0, 9.0, 5.0, 5.0))
            .build();

        let widgets = collect_widgets(&doc);
        assert_eq!(widgets.len(), 2);
        let parents: HashSet<_> = widgets
            .iter()
            .map(|w| {
                doc.get_dictionary(w.object_id)
                    .and_then(|d| d.get(b"Parent"))
                    .and_then(|p| p.as_reference())
                    .unwrap()
            })
            .collect();
        assert_eq!(parents.len(), 1);
    }

    #[test]
    fn test_page_segment() {
        assert_eq!(page_of("topmostSubform[0].Page4[0].Imie[0]"), 4);
        assert_eq!(page_of("imieNazwisko"), 1);
        assert_eq!(page_of("Page0[0].X"), 1);
    }

    #[test]
    fn test_scaffold_notification_covers_table() {
        let table = FieldMappingTable::notification();
        let doc = scaffold_for_table(&table).build();
        let widgets = collect_widgets(&doc);

        let names: HashSet<&str> = widgets.iter().map(|w| w.qualified_name.as_str()).collect();
        for widget in table.widget_names() {
            assert!(names.contains(widget), "missing {widget}");
        }

        let tick = widgets
            .iter()
            .find(|w| w.qualified_name == "topmostSubform[0].Page2[0].adres[0]")
            .unwrap();
        assert_eq!(tick.field_type, FieldType::CheckBox);
        assert!(doc.get_pages().len() >= 5);
    }

    #[test]
    fn test_scaffold_accident_card() {
        let doc = scaffold_accident_card().build();
        let widgets = collect_widgets(&doc);
        assert_eq!(widgets.len(), AccidentCard::WIDGETS.len());
        let description = widgets
            .iter()
            .find(|w| w.partial_name == "CIRCUMSTANCESINFORMATION")
            .unwrap();
        assert!(description.flags.contains(crate::forms::FieldFlags::MULTILINE));
        assert!(description.rect.unwrap().height() > TEXT_HEIGHT);
    }

    #[test]
    fn test_save_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("template.pdf");
        scaffold_for_table(&FieldMappingTable::explanation())
            .save(&path)
            .unwrap();

        let doc = Document::load(&path).unwrap();
        let widgets = collect_widgets(&doc);
        assert!(widgets.iter().any(|w| w.qualified_name == "dataWypadkuGlowne"));
    }
}
