//! Soft fill: write widget values and keep the form interactive

use super::acro_form::{
    collect_widgets, encode_text_string, find_widgets, with_acro_form, FieldFlags, WidgetInfo,
};
use crate::error::{FormError, Result};
use crate::mapping::{ResolvedValues, WidgetValue};
use lopdf::{Document, Object};
use serde::Serialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Outcome of a soft fill
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FillReport {
    pub output_path: PathBuf,
    /// Mapped widget names found in the template and written
    pub fields_filled: usize,
    /// Widget values handed to the filler
    pub total_mapped: usize,
}

/// Open `template`, fail with [`FormError::TemplateNotFound`] when absent
pub(crate) fn open_template(template: &Path) -> Result<Document> {
    if !template.is_file() {
        return Err(FormError::TemplateNotFound(template.to_path_buf()));
    }
    Ok(Document::load(template)?)
}

/// Widgets of the PDF at `path`
pub fn read_widgets(path: &Path) -> Result<Vec<WidgetInfo>> {
    Ok(collect_widgets(&open_template(path)?))
}

/// Save to `output`, creating parent directories
pub(crate) fn save_document(doc: &mut Document, output: &Path) -> Result<()> {
    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    doc.save(output)?;
    Ok(())
}

/// Checkbox reading of a text value written to a toggle widget
fn text_checks_box(text: &str, widget: &WidgetInfo) -> bool {
    let text = text.trim();
    if text == widget.checked_state() {
        return true;
    }
    !matches!(
        text.to_lowercase().as_str(),
        "" | "off" | "nie" | "no" | "false" | "0"
    )
}

/// Write one value into one widget and its field
pub(crate) fn apply_value(doc: &mut Document, widget: &WidgetInfo, value: &WidgetValue) -> Result<()> {
    if widget.field_type.is_toggle() {
        let checked = match value {
            WidgetValue::Checked => true,
            WidgetValue::Text(text) => text_checks_box(text, widget),
        };
        let state = if checked { widget.checked_state() } else { "Off" };
        let state = Object::Name(state.as_bytes().to_vec());
        doc.get_dictionary_mut(widget.field_id)?.set("V", state.clone());
        doc.get_dictionary_mut(widget.object_id)?.set("AS", state);
        return Ok(());
    }

    let text = value.to_string();
    doc.get_dictionary_mut(widget.field_id)?
        .set("V", encode_text_string(&text));
    // Stale appearance would keep showing the template's empty box
    doc.get_dictionary_mut(widget.object_id)?.remove(b"AP");
    Ok(())
}

/// OR the read-only bit into every terminal field
pub(crate) fn mark_read_only(doc: &mut Document, widgets: &[WidgetInfo]) -> Result<()> {
    let mut seen = HashSet::new();
    for widget in widgets {
        if !seen.insert(widget.field_id) {
            continue;
        }
        let flags = widget.flags | FieldFlags::READ_ONLY;
        doc.get_dictionary_mut(widget.field_id)?
            .set("Ff", Object::Integer(i64::from(flags.bits())));
    }
    Ok(())
}

/// Fill `template` with `values` and write the result to `output`.
/// The template itself is never modified.
pub fn fill(
    template: &Path,
    output: &Path,
    values: &ResolvedValues,
    read_only: bool,
) -> Result<FillReport> {
    let mut doc = open_template(template)?;
    let widgets = collect_widgets(&doc);
    tracing::info!(
        template = %template.display(),
        values = values.len(),
        widgets = widgets.len(),
        "filling form"
    );

    let mut fields_filled = 0;
    for (name, value) in values.iter() {
        let targets = find_widgets(&widgets, name);
        if targets.is_empty() {
            tracing::warn!(widget = name, "mapped widget not present in template");
            continue;
        }
        for widget in targets {
            apply_value(&mut doc, widget, value)?;
        }
        fields_filled += 1;
    }

    if read_only {
        mark_read_only(&mut doc, &widgets)?;
    }

    let found = with_acro_form(&mut doc, |form| {
        form.set("NeedAppearances", Object::Boolean(true));
    })?;
    if !found {
        tracing::warn!("template has no /AcroForm dictionary");
    }

    save_document(&mut doc, output)?;
    tracing::info!(output = %output.display(), fields_filled, "saved filled form");

    Ok(FillReport {
        output_path: output.to_path_buf(),
        fields_filled,
        total_mapped: values.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forms::scaffold::TemplateBuilder;
    use crate::forms::FieldType;
    use crate::geometry::Rectangle;
    use pretty_assertions::assert_eq;

    fn template(dir: &Path) -> PathBuf {
        let path = dir.join("template.pdf");
        TemplateBuilder::new()
            .text_field(
                "topmostSubform[0].Page1[0].Nazwisko[0]",
                Rectangle::from_position_and_size(40.0, 700.0, 200.0, 14.0),
            )
            .checkbox(
                "topmostSubform[0].Page1[0].TAK[0]",
                Rectangle::from_position_and_size(40.0, 660.0, 10.0, 10.0),
            )
            .checkbox(
                "topmostSubform[0].Page1[0].NIE[0]",
                Rectangle::from_position_and_size(60.0, 660.0, 10.0, 10.0),
            )
            .save(&path)
            .unwrap();
        path
    }

    fn values(pairs: &[(&str, WidgetValue)]) -> ResolvedValues {
        let mut out = ResolvedValues::default();
        for (name, value) in pairs {
            out.insert(*name, value.clone());
        }
        out
    }

    #[test]
    fn test_fill_text_and_checkbox() {
        let dir = tempfile::tempdir().unwrap();
        let template = template(dir.path());
        let output = dir.path().join("out").join("filled.pdf");

        let report = fill(
            &template,
            &output,
            &values(&[
                ("topmostSubform[0].Page1[0].Nazwisko[0]", WidgetValue::Text("Wójcik".into())),
                ("topmostSubform[0].Page1[0].TAK[0]", WidgetValue::Checked),
                ("topmostSubform[0].Page1[0].Brak[0]", WidgetValue::Text("x".into())),
            ]),
            false,
        )
        .unwrap();

        assert_eq!(report.fields_filled, 2);
        assert_eq!(report.total_mapped, 3);
        assert_eq!(report.output_path, output);

        let doc = Document::load(&output).unwrap();
        let widgets = collect_widgets(&doc);
        let by_name = |name: &str| widgets.iter().find(|w| w.partial_name == name).unwrap();

        assert_eq!(by_name("Nazwisko[0]").value.as_deref(), Some("Wójcik"));
        assert!(by_name("TAK[0]").is_checked());
        assert!(!by_name("NIE[0]").is_checked());
        assert_eq!(by_name("TAK[0]").field_type, FieldType::CheckBox);
    }

    #[test]
    fn test_fill_leaves_template_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let template = template(dir.path());
        let before = std::fs::read(&template).unwrap();

        fill(
            &template,
            &dir.path().join("filled.pdf"),
            &values(&[("Nazwisko[0]", WidgetValue::Text("Nowak".into()))]),
            true,
        )
        .unwrap();

        assert_eq!(std::fs::read(&template).unwrap(), before);
    }

    #[test]
    fn test_read_only_keeps_other_flags() {
        let dir = tempfile::tempdir().unwrap();
        let template = template(dir.path());
        let output = dir.path().join("filled.pdf");

        // Partial name lookup
        fill(
            &template,
            &output,
            &values(&[("Nazwisko[0]", WidgetValue::Text("Nowak".into()))]),
            true,
        )
        .unwrap();

        let doc = Document::load(&output).unwrap();
        let widgets = collect_widgets(&doc);
        assert!(widgets.iter().all(|w| w.flags.contains(FieldFlags::READ_ONLY)));
        let name = widgets.iter().find(|w| w.partial_name == "Nazwisko[0]").unwrap();
        assert_eq!(name.value.as_deref(), Some("Nowak"));
    }

    #[test]
    fn test_missing_template() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("filled.pdf");
        let err = fill(
            &dir.path().join("absent.pdf"),
            &output,
            &ResolvedValues::default(),
            false,
        )
        .unwrap_err();

        assert!(matches!(err, FormError::TemplateNotFound(_)));
        assert!(err.is_configuration_error());
        assert!(!output.exists());
    }

    #[test]
    fn test_text_into_checkbox() {
        let dir = tempfile::tempdir().unwrap();
        let template = template(dir.path());
        let output = dir.path().join("filled.pdf");

        fill(
            &template,
            &output,
            &values(&[
                ("TAK[0]", WidgetValue::Text("Yes".into())),
                ("NIE[0]", WidgetValue::Text("nie".into())),
            ]),
            false,
        )
        .unwrap();

        let doc = Document::load(&output).unwrap();
        let widgets = collect_widgets(&doc);
        assert!(widgets.iter().find(|w| w.partial_name == "TAK[0]").unwrap().is_checked());
        assert!(!widgets.iter().find(|w| w.partial_name == "NIE[0]").unwrap().is_checked());
    }
}
