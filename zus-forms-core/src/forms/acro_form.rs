//! Read access to AcroForm widgets (ISO 32000-1 §12.7)
//!
//! Templates come from different producers, so discovery starts from the
//! pages rather than `/AcroForm /Fields`: every `/Widget` annotation listed in
//! a page's `/Annots` is reported together with the field it belongs to.

use crate::error::Result;
use crate::geometry::Rectangle;
use bitflags::bitflags;
use lopdf::{Dictionary, Document, Object, ObjectId, StringFormat};
use unicode_normalization::UnicodeNormalization;

/// Guard against `/Parent` cycles in damaged files
const MAX_FIELD_DEPTH: usize = 32;

bitflags! {
    /// Field flags (`/Ff`) according to ISO 32000-1 Tables 221, 226, 228
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct FieldFlags: u32 {
        const READ_ONLY = 1;
        const REQUIRED = 1 << 1;
        const NO_EXPORT = 1 << 2;
        const MULTILINE = 1 << 12;
        const NO_TOGGLE_TO_OFF = 1 << 14;
        const RADIO = 1 << 15;
        const PUSHBUTTON = 1 << 16;
        const COMBO = 1 << 17;
    }
}

/// Field type after resolving `/FT` and the button flags
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    Text,
    CheckBox,
    RadioButton,
    PushButton,
    Choice,
    Signature,
    Unknown,
}

impl FieldType {
    fn resolve(ft: Option<&[u8]>, flags: FieldFlags) -> Self {
        match ft {
            Some(b"Tx") => FieldType::Text,
            Some(b"Btn") if flags.contains(FieldFlags::PUSHBUTTON) => FieldType::PushButton,
            Some(b"Btn") if flags.contains(FieldFlags::RADIO) => FieldType::RadioButton,
            Some(b"Btn") => FieldType::CheckBox,
            Some(b"Ch") => FieldType::Choice,
            Some(b"Sig") => FieldType::Signature,
            _ => FieldType::Unknown,
        }
    }

    /// Short label used in listings
    pub fn label(&self) -> &'static str {
        match self {
            FieldType::Text => "text",
            FieldType::CheckBox => "checkbox",
            FieldType::RadioButton => "radio",
            FieldType::PushButton => "button",
            FieldType::Choice => "choice",
            FieldType::Signature => "signature",
            FieldType::Unknown => "unknown",
        }
    }

    /// Check boxes and radio buttons, the widgets with on/off states
    pub fn is_toggle(&self) -> bool {
        matches!(self, FieldType::CheckBox | FieldType::RadioButton)
    }
}

/// One widget annotation and the field it belongs to
#[derive(Debug, Clone, PartialEq)]
pub struct WidgetInfo {
    /// The annotation object
    pub object_id: ObjectId,
    /// Terminal field holding `/T`, `/V` and `/Ff`; equal to `object_id`
    /// when field and widget are merged
    pub field_id: ObjectId,
    /// 1-based page number
    pub page: u32,
    pub qualified_name: String,
    pub partial_name: String,
    pub field_type: FieldType,
    pub flags: FieldFlags,
    pub rect: Option<Rectangle>,
    /// Current `/V`; names are reported without the slash
    pub value: Option<String>,
    /// Appearance state that means "checked"; toggles only
    pub on_state: Option<String>,
}

impl WidgetInfo {
    /// The name a checked state is written with
    pub fn checked_state(&self) -> &str {
        self.on_state.as_deref().unwrap_or("Yes")
    }

    /// True for toggles whose value is anything but `Off`
    pub fn is_checked(&self) -> bool {
        self.field_type.is_toggle()
            && self
                .value
                .as_deref()
                .is_some_and(|v| !v.is_empty() && v != "Off")
    }
}

/// Follow a reference, or return inline objects unchanged
pub(crate) fn resolve<'a>(doc: &'a Document, obj: &'a Object) -> Option<&'a Object> {
    match obj {
        Object::Reference(id) => doc.get_object(*id).ok(),
        other => Some(other),
    }
}

pub(crate) fn resolve_dict<'a>(doc: &'a Document, obj: &'a Object) -> Option<&'a Dictionary> {
    resolve(doc, obj).and_then(|o| o.as_dict().ok())
}

/// Annotation references listed on a page, in order
pub(crate) fn page_annotations(doc: &Document, page_id: ObjectId) -> Vec<ObjectId> {
    let Ok(page) = doc.get_dictionary(page_id) else {
        return Vec::new();
    };
    let Some(annots) = page
        .get(b"Annots")
        .ok()
        .and_then(|obj| resolve(doc, obj))
        .and_then(|obj| obj.as_array().ok())
    else {
        return Vec::new();
    };
    annots
        .iter()
        .filter_map(|obj| obj.as_reference().ok())
        .collect()
}

fn is_widget(dict: &Dictionary) -> bool {
    matches!(dict.get(b"Subtype"), Ok(Object::Name(name)) if name == b"Widget")
}

fn parent_id(dict: &Dictionary) -> Option<ObjectId> {
    dict.get(b"Parent").ok().and_then(|p| p.as_reference().ok())
}

/// First value of an inheritable key along the `/Parent` chain
fn inherited<'a>(doc: &'a Document, start: &'a Dictionary, key: &[u8]) -> Option<&'a Object> {
    let mut dict = start;
    for _ in 0..MAX_FIELD_DEPTH {
        if let Ok(value) = dict.get(key) {
            return resolve(doc, value);
        }
        dict = doc.get_dictionary(parent_id(dict)?).ok()?;
    }
    None
}

/// Partial names from the root field down to `start`
fn name_chain(doc: &Document, start: &Dictionary) -> Vec<String> {
    let mut names = Vec::new();
    let mut dict = start;
    for _ in 0..MAX_FIELD_DEPTH {
        if let Ok(Object::String(bytes, _)) = dict.get(b"T") {
            names.push(decode_text_string(bytes));
        }
        match parent_id(dict).and_then(|id| doc.get_dictionary(id).ok()) {
            Some(parent) => dict = parent,
            None => break,
        }
    }
    names.reverse();
    names
}

fn object_text(obj: &Object) -> Option<String> {
    match obj {
        Object::String(bytes, _) => Some(decode_text_string(bytes)),
        Object::Name(name) => Some(String::from_utf8_lossy(name).into_owned()),
        Object::Integer(i) => Some(i.to_string()),
        Object::Real(r) => Some(r.to_string()),
        _ => None,
    }
}

/// First `/AP /N` state that is not `Off`
fn on_state(doc: &Document, widget: &Dictionary) -> Option<String> {
    let ap = resolve_dict(doc, widget.get(b"AP").ok()?)?;
    let normal = resolve_dict(doc, ap.get(b"N").ok()?)?;
    normal
        .iter()
        .map(|(key, _)| key)
        .find(|key| key.as_slice() != b"Off")
        .map(|key| String::from_utf8_lossy(key).into_owned())
}

fn describe(doc: &Document, page: u32, object_id: ObjectId, dict: &Dictionary) -> WidgetInfo {
    // Widgets without /T are kids of the terminal field
    let field_id = if dict.has(b"T") {
        object_id
    } else {
        parent_id(dict).unwrap_or(object_id)
    };

    let names = name_chain(doc, dict);
    let qualified_name = names.join(".");
    let partial_name = names.last().cloned().unwrap_or_default();

    let flags = inherited(doc, dict, b"Ff")
        .and_then(|o| o.as_i64().ok())
        .map(|bits| FieldFlags::from_bits_retain(bits as u32))
        .unwrap_or_default();
    let ft = inherited(doc, dict, b"FT").and_then(|o| o.as_name().ok());
    let field_type = FieldType::resolve(ft, flags);

    let rect = dict
        .get(b"Rect")
        .ok()
        .and_then(|o| resolve(doc, o))
        .and_then(|o| o.as_array().ok())
        .and_then(|a| Rectangle::from_pdf_array(a));

    let value = inherited(doc, dict, b"V").and_then(object_text);
    let on_state = if field_type.is_toggle() {
        Some(on_state(doc, dict).unwrap_or_else(|| "Yes".to_string()))
    } else {
        None
    };

    WidgetInfo {
        object_id,
        field_id,
        page,
        qualified_name,
        partial_name,
        field_type,
        flags,
        rect,
        value,
        on_state,
    }
}

/// Every widget annotation on every page, in page order
pub fn collect_widgets(doc: &Document) -> Vec<WidgetInfo> {
    let mut widgets = Vec::new();
    for (page, page_id) in doc.get_pages() {
        for annot_id in page_annotations(doc, page_id) {
            let Ok(dict) = doc.get_dictionary(annot_id) else {
                continue;
            };
            if is_widget(dict) {
                widgets.push(describe(doc, page, annot_id, dict));
            }
        }
    }
    tracing::trace!(count = widgets.len(), "collected widgets");
    widgets
}

/// Widgets answering to `name`: qualified matches, or partial matches when
/// no qualified name fits
pub fn find_widgets<'a>(widgets: &'a [WidgetInfo], name: &str) -> Vec<&'a WidgetInfo> {
    let qualified: Vec<_> = widgets.iter().filter(|w| w.qualified_name == name).collect();
    if !qualified.is_empty() {
        return qualified;
    }
    widgets.iter().filter(|w| w.partial_name == name).collect()
}

/// Object id of the interactive form dictionary, when it is indirect
fn acro_form_ref(doc: &Document) -> Result<Option<ObjectId>> {
    let root_id = doc.trailer.get(b"Root")?.as_reference()?;
    let catalog = doc.get_dictionary(root_id)?;
    Ok(catalog
        .get(b"AcroForm")
        .ok()
        .and_then(|o| o.as_reference().ok()))
}

/// Run `edit` on the `/AcroForm` dictionary, wherever it lives
pub(crate) fn with_acro_form<F>(doc: &mut Document, edit: F) -> Result<bool>
where
    F: FnOnce(&mut Dictionary),
{
    if let Some(id) = acro_form_ref(doc)? {
        edit(doc.get_dictionary_mut(id)?);
        return Ok(true);
    }
    let root_id = doc.trailer.get(b"Root")?.as_reference()?;
    match doc.get_dictionary_mut(root_id)?.get_mut(b"AcroForm") {
        Ok(Object::Dictionary(dict)) => {
            edit(dict);
            Ok(true)
        }
        _ => Ok(false),
    }
}

/// Drop `/AcroForm` from the catalog
pub(crate) fn remove_acro_form(doc: &mut Document) -> Result<()> {
    let root_id = doc.trailer.get(b"Root")?.as_reference()?;
    doc.get_dictionary_mut(root_id)?.remove(b"AcroForm");
    Ok(())
}

/// Decode a PDF text string: UTF-16BE with BOM, UTF-8 with BOM, otherwise
/// PDFDocEncoding. The result is NFC-normalized so decomposed Polish
/// letters compare equal to precomposed input.
pub fn decode_text_string(bytes: &[u8]) -> String {
    let decoded: String = if let Some(rest) = bytes.strip_prefix(&[0xFE, 0xFF]) {
        let units: Vec<u16> = rest
            .chunks_exact(2)
            .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
            .collect();
        String::from_utf16_lossy(&units)
    } else if let Some(rest) = bytes.strip_prefix(&[0xEF, 0xBB, 0xBF]) {
        String::from_utf8_lossy(rest).into_owned()
    } else {
        bytes.iter().map(|&b| pdf_doc_char(b)).collect()
    };
    decoded.nfc().collect()
}

/// Encode a value for `/V`: literal for ASCII, UTF-16BE hex otherwise
pub fn encode_text_string(text: &str) -> Object {
    if text.is_ascii() {
        return Object::String(text.as_bytes().to_vec(), StringFormat::Literal);
    }
    let mut bytes = vec![0xFE, 0xFF];
    for unit in text.nfc().collect::<String>().encode_utf16() {
        bytes.extend_from_slice(&unit.to_be_bytes());
    }
    Object::String(bytes, StringFormat::Hexadecimal)
}

fn pdf_doc_char(byte: u8) -> char {
    match byte {
        0x80 => '\u{2022}', // bullet
        0x81 => '\u{2020}',
        0x82 => '\u{2021}',
        0x83 => '\u{2026}',
        0x84 => '\u{2014}',
        0x85 => '\u{2013}',
        0x86 => '\u{0192}',
        0x87 => '\u{2044}',
        0x88 => '\u{2039}',
        0x89 => '\u{203A}',
        0x8A => '\u{2212}',
        0x8B => '\u{2030}',
        0x8C => '\u{201E}',
        0x8D => '\u{201C}',
        0x8E => '\u{201D}',
        0x8F => '\u{2018}',
        0x90 => '\u{2019}',
        0x91 => '\u{201A}',
        0x92 => '\u{2122}',
        0x93 => '\u{FB01}',
        0x94 => '\u{FB02}',
        0x95 => '\u{0141}', // Ł
        0x96 => '\u{0152}',
        0x97 => '\u{0160}',
        0x98 => '\u{0178}',
        0x99 => '\u{017D}',
        0x9A => '\u{0131}',
        0x9B => '\u{0142}', // ł
        0x9C => '\u{0153}',
        0x9D => '\u{0161}',
        0x9E => '\u{017E}',
        0xA0 => '\u{20AC}',
        other => other as char,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forms::scaffold::TemplateBuilder;

    #[test]
    fn test_field_type_resolution() {
        let btn: &[u8] = b"Btn";
        assert_eq!(FieldType::resolve(Some(&b"Tx"[..]), FieldFlags::empty()), FieldType::Text);
        assert_eq!(FieldType::resolve(Some(btn), FieldFlags::empty()), FieldType::CheckBox);
        assert_eq!(FieldType::resolve(Some(btn), FieldFlags::RADIO), FieldType::RadioButton);
        assert_eq!(FieldType::resolve(Some(btn), FieldFlags::PUSHBUTTON), FieldType::PushButton);
        assert_eq!(FieldType::resolve(None, FieldFlags::empty()), FieldType::Unknown);
    }

    #[test]
    fn test_field_flags_keep_unknown_bits() {
        let flags = FieldFlags::from_bits_retain(1 << 23 | 2);
        assert!(flags.contains(FieldFlags::REQUIRED));
        assert_eq!((flags | FieldFlags::READ_ONLY).bits(), 1 << 23 | 3);
    }

    #[test]
    fn test_decode_text_string_variants() {
        assert_eq!(decode_text_string(b"Kowalski"), "Kowalski");
        assert_eq!(decode_text_string(&[0xFE, 0xFF, 0x01, 0x41, 0x00, 0xF3]), "Łó");
        assert_eq!(decode_text_string(&[0x95, 0x9B]), "Łł");
        // decomposed ó is composed
        let decomposed = "o\u{0301}".encode_utf16().flat_map(u16::to_be_bytes);
        let mut bytes = vec![0xFE, 0xFF];
        bytes.extend(decomposed);
        assert_eq!(decode_text_string(&bytes), "ó");
    }

    #[test]
    fn test_encode_text_string() {
        assert_eq!(
            encode_text_string("Jan"),
            Object::String(b"Jan".to_vec(), StringFormat::Literal)
        );
        match encode_text_string("Łódź") {
            Object::String(bytes, StringFormat::Hexadecimal) => {
                assert_eq!(decode_text_string(&bytes), "Łódź");
            }
            other => panic!("unexpected encoding {other:?}"),
        }
    }

    #[test]
    fn test_collect_widgets_from_hierarchy() {
        let doc = TemplateBuilder::new()
            .page()
            .text_field(
                "topmostSubform[0].Page1[0].Imie[0]",
                Rectangle::from_position_and_size(50.0, 700.0, 200.0, 14.0),
            )
            .checkbox(
                "topmostSubform[0].Page1[0].Zgoda[0]",
                Rectangle::from_position_and_size(50.0, 650.0, 10.0, 10.0),
            )
            .page()
            .text_field("Uwagi", Rectangle::from_position_and_size(50.0, 700.0, 200.0, 40.0))
            .build();

        let widgets = collect_widgets(&doc);
        assert_eq!(widgets.len(), 3);

        let name = &widgets[0];
        assert_eq!(name.qualified_name, "topmostSubform[0].Page1[0].Imie[0]");
        assert_eq!(name.partial_name, "Imie[0]");
        assert_eq!(name.field_type, FieldType::Text);
        assert_eq!(name.page, 1);

        let tick = &widgets[1];
        assert_eq!(tick.field_type, FieldType::CheckBox);
        assert_eq!(tick.on_state.as_deref(), Some("Yes"));
        assert!(!tick.is_checked());

        assert_eq!(widgets[2].page, 2);
        assert_eq!(widgets[2].qualified_name, "Uwagi");
        assert_eq!(widgets[2].rect.map(|r| r.height()), Some(40.0));
    }

    #[test]
    fn test_find_widgets_prefers_qualified_names() {
        let doc = TemplateBuilder::new()
            .page()
            .text_field("a.Imie[0]", Rectangle::from_position_and_size(0.0, 0.0, 10.0, 10.0))
            .text_field("Imie[0]", Rectangle::from_position_and_size(0.0, 20.0, 10.0, 10.0))
            .text_field("b.Nazwisko[0]", Rectangle::from_position_and_size(0.0, 40.0, 10.0, 10.0))
            .build();
        let widgets = collect_widgets(&doc);

        let exact = find_widgets(&widgets, "Imie[0]");
        assert_eq!(exact.len(), 1);
        assert_eq!(exact[0].qualified_name, "Imie[0]");

        let partial = find_widgets(&widgets, "Nazwisko[0]");
        assert_eq!(partial.len(), 1);
        assert_eq!(partial[0].qualified_name, "b.Nazwisko[0]");

        assert!(find_widgets(&widgets, "Brak").is_empty());
    }
}
