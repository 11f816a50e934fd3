//! Integration tests for the validate -> flatten -> map -> fill flow
//!
//! Templates are generated with `TemplateBuilder`, so the tests run without
//! the government PDF assets.

use lopdf::Document;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use std::path::Path;
use tempfile::{tempdir, TempDir};
use zus_forms::forms::{collect_widgets, scaffold_for_table, FieldFlags};
use zus_forms::geometry::Rectangle;
use zus_forms::{
    fill_and_flatten, flatten, DocumentKind, FieldMappingTable, FlattenOptions, FontSource,
    FormPipeline, FormsConfig, SchemaVariant, TemplateBuilder, WidgetInfo,
};

fn widget(name: &str) -> String {
    format!("topmostSubform[0].{name}")
}

fn setup(read_only: bool) -> (TempDir, FormPipeline) {
    let dir = tempdir().expect("Failed to create temp directory");
    let config = FormsConfig {
        templates_dir: dir.path().join("templates"),
        output_dir: dir.path().join("filled_forms"),
        read_only,
        ..FormsConfig::default()
    };
    let pipeline = FormPipeline::new(config);
    for variant in [SchemaVariant::Notification, SchemaVariant::Explanation] {
        scaffold_for_table(pipeline.mapping(variant))
            .save(pipeline.config().template_path(variant.document_kind()))
            .unwrap();
    }
    (dir, pipeline)
}

fn notification() -> Value {
    json!({
        "daneOsobyPoszkodowanej": {
            "imie": "Jan",
            "nazwisko": "Kowalski",
            "dataUrodzenia": "1990-01-15"
        },
        "adresZamieszkaniaOsobyPoszkodowanej": {
            "ulica": "Marszałkowska",
            "numerDomu": "10",
            "kodPocztowy": "00-001",
            "miejscowosc": "Warszawa"
        },
        "informacjaOWypadku": {
            "dataWypadku": "2024-03-10",
            "miejsceWypadku": "Warszawa",
            "opisOkolicznosciMiejscaIPrzyczyn": "Upadek na śliskiej podłodze",
            "pierwszaPomocUdzielona": true
        }
    })
}

fn widgets(path: &Path) -> Vec<WidgetInfo> {
    collect_widgets(&Document::load(path).unwrap())
}

fn find<'a>(widgets: &'a [WidgetInfo], name: &str) -> &'a WidgetInfo {
    widgets
        .iter()
        .find(|w| w.qualified_name == name)
        .unwrap_or_else(|| panic!("widget {name} not in output"))
}

#[test]
fn test_notification_scenario_compact_birth_date() {
    let (_dir, pipeline) = setup(false);
    let input = notification();

    let report = pipeline.validate(SchemaVariant::Notification, &input);
    assert!(report.success, "{:?}", report.errors);

    let flat = flatten(report.normalized());
    assert_eq!(
        flat.get("daneOsobyPoszkodowanej.dataUrodzenia").and_then(|v| v.as_str()),
        Some("1990-01-15")
    );

    let fill = pipeline.fill_notification(report.normalized()).unwrap();
    let filled = widgets(&fill.output_path);
    assert_eq!(
        find(&filled, &widget("Page1[0].Dataurodzenia[0]")).value.as_deref(),
        Some("15-01-90")
    );
    assert_eq!(
        find(&filled, &widget("Page1[0].Imię[0]")).value.as_deref(),
        Some("Jan")
    );

    let template = pipeline.config().template_path(DocumentKind::Notification);
    assert_eq!(
        Document::load(&fill.output_path).unwrap().get_pages().len(),
        Document::load(template).unwrap().get_pages().len()
    );
}

#[test]
fn test_missing_place_of_accident_is_one_error() {
    let (_dir, pipeline) = setup(false);
    let mut input = notification();
    input["informacjaOWypadku"]
        .as_object_mut()
        .unwrap()
        .remove("miejsceWypadku");

    let report = pipeline.validate(SchemaVariant::Notification, &input);

    assert!(!report.success);
    assert_eq!(report.errors.len(), 1);
    let error = &report.errors[0];
    assert_eq!(error.dotted_path(), "informacjaOWypadku.miejsceWypadku");
    assert!(!error.human_field_name.is_empty());
}

#[test]
fn test_boolean_pair_checks_exactly_one_box() {
    let (_dir, pipeline) = setup(false);
    let fill = pipeline.fill_notification(&notification()).unwrap();
    let filled = widgets(&fill.output_path);

    assert!(find(&filled, &widget("Page4[0].TAK6[0]")).is_checked());
    assert!(!find(&filled, &widget("Page4[0].NIE6[0]")).is_checked());
}

#[test]
fn test_annotated_values_reach_the_form() {
    let (_dir, pipeline) = setup(false);
    let mut input = notification();
    input["daneOsobyPoszkodowanej"]["imie"] =
        json!({"value": "Janina", "parsed": true, "confidence": 0.93});
    input["daneOsobyPoszkodowanej"]["pesel"] = Value::Null;

    let outcome = pipeline.submit(SchemaVariant::Notification, &input).unwrap();
    assert!(outcome.is_complete(), "{:?}", outcome.validation.errors);

    let filled = widgets(&outcome.fill.unwrap().output_path);
    assert_eq!(
        find(&filled, &widget("Page1[0].Imię[0]")).value.as_deref(),
        Some("Janina")
    );
    assert_eq!(find(&filled, &widget("Page1[0].PESEL[0]")).value, None);
}

#[test]
fn test_read_only_fill_locks_every_field() {
    let (_dir, pipeline) = setup(true);
    let fill = pipeline
        .fill_explanation(&json!({
            "imieNazwisko": "Jan Kowalski",
            "dataWypadku": "2024-03-10",
            "miejsceWypadku": "Hala B",
            "opisOkolicznosciWypadku": "Upadek z drabiny"
        }))
        .unwrap();

    let filled = widgets(&fill.output_path);
    assert!(!filled.is_empty());
    assert!(filled.iter().all(|w| w.flags.contains(FieldFlags::READ_ONLY)));
    assert_eq!(
        find(&filled, "dataWypadku").value.as_deref(),
        Some("10.03.2024")
    );
}

#[test]
fn test_every_mapped_widget_exists_in_scaffold() {
    for variant in [SchemaVariant::Notification, SchemaVariant::Explanation] {
        let table = FieldMappingTable::for_variant(variant);
        let doc = scaffold_for_table(&table).build();
        let names: Vec<String> = collect_widgets(&doc)
            .into_iter()
            .map(|w| w.qualified_name)
            .collect();
        for name in table.widget_names() {
            assert!(names.iter().any(|n| n == name), "{variant}: {name} missing");
        }
    }
}

#[test]
fn test_long_text_in_narrow_widget_is_fitted() {
    let dir = tempdir().unwrap();
    let template = dir.path().join("narrow.pdf");
    let output = dir.path().join("narrow_filled.pdf");
    TemplateBuilder::new()
        .text_area(
            "CIRCUMSTANCESINFORMATION",
            Rectangle::from_position_and_size(50.0, 700.0, 90.0, 40.0),
        )
        .save(&template)
        .unwrap();

    let text: String = "Pracownik poślizgnął się na rozlanym oleju. "
        .chars()
        .cycle()
        .take(300)
        .collect();
    let values = [("CIRCUMSTANCESINFORMATION".to_string(), text)]
        .into_iter()
        .collect();

    let report = fill_and_flatten(
        &template,
        &output,
        &values,
        &FontSource::Standard,
        &FlattenOptions::default(),
    )
    .unwrap();

    assert_eq!(report.rendered.len(), 1);
    let rendered = &report.rendered[0];
    assert_eq!(rendered.font_size, 7.0);
    assert!(rendered.truncated);
    assert!(widgets(&output).is_empty());
}
