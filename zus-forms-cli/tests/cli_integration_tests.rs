//! Integration tests for the zusforms CLI
//!
//! Tests command-line interface functionality including:
//! - Validation reports and exit codes
//! - Template scaffolding and filling
//! - Accident card rendering
//! - Error handling for missing files

use anyhow::Result;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::{tempdir, TempDir};
use zus_forms::forms::read_widgets;

/// Test helper to run CLI command with an isolated environment
fn run_cli_command(dir: &Path, args: &[&str]) -> Result<Output> {
    let output = Command::new(env!("CARGO_BIN_EXE_zusforms"))
        .args(args)
        .current_dir(dir)
        .env_remove("ZUS_FORMS_TEMPLATES_DIR")
        .env_remove("ZUS_FORMS_OUTPUT_DIR")
        .env_remove("ZUS_FORMS_FONT")
        .env_remove("ZUS_FORMS_READ_ONLY")
        .env("RUST_LOG", "off")
        .output()?;
    Ok(output)
}

fn setup_temp_dir() -> TempDir {
    tempdir().expect("Failed to create temp directory")
}

fn write_file(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, content).expect("Failed to write test input");
    path
}

const EXPLANATION: &str = r#"{
    "imieNazwisko": "Jan Kowalski",
    "dataWypadku": "2024-03-10",
    "miejsceWypadku": "Hala magazynowa",
    "opisOkolicznosciWypadku": "Upadek na śliskiej podłodze",
    "czyAsekuracja": true
}"#;

const NOTIFICATION: &str = r#"{
    "daneOsobyPoszkodowanej": {"imie": "Jan", "nazwisko": "Kowalski", "dataUrodzenia": "1990-01-15"},
    "adresZamieszkaniaOsobyPoszkodowanej": {"miejscowosc": "Warszawa"},
    "informacjaOWypadku": {
        "dataWypadku": "2024-03-10",
        "miejsceWypadku": "Warszawa",
        "opisOkolicznosciMiejscaIPrzyczyn": "Upadek na śliskiej podłodze"
    }
}"#;

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).to_string()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).to_string()
}

#[test]
fn test_cli_validate_valid_document() {
    let temp_dir = setup_temp_dir();
    write_file(temp_dir.path(), "input.json", EXPLANATION);

    let output = run_cli_command(
        temp_dir.path(),
        &["validate", "input.json", "--kind", "explanation"],
    )
    .unwrap();

    assert!(output.status.success(), "{}", stderr(&output));
    assert!(stdout(&output).contains("Document is valid"));
}

#[test]
fn test_cli_validate_reports_missing_field() {
    let temp_dir = setup_temp_dir();
    write_file(
        temp_dir.path(),
        "input.json",
        r#"{"imieNazwisko": "Jan Kowalski", "dataWypadku": "2024-03-10", "opisOkolicznosciWypadku": "x"}"#,
    );

    let output = run_cli_command(
        temp_dir.path(),
        &["validate", "input.json", "--kind", "explanation", "--json"],
    )
    .unwrap();

    assert_eq!(output.status.code(), Some(1));
    let report: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(report["success"], false);
    assert_eq!(report["errors"].as_array().unwrap().len(), 1);
    assert_eq!(report["errors"][0]["path"][0], "miejsceWypadku");
}

#[test]
fn test_cli_scaffold_and_fill_notification() {
    let temp_dir = setup_temp_dir();
    write_file(temp_dir.path(), "input.json", NOTIFICATION);

    let scaffold = run_cli_command(
        temp_dir.path(),
        &["scaffold", "--kind", "notification", "-o", "ewyp.pdf"],
    )
    .unwrap();
    assert!(scaffold.status.success(), "{}", stderr(&scaffold));

    let fill = run_cli_command(
        temp_dir.path(),
        &[
            "fill",
            "input.json",
            "--kind",
            "notification",
            "-t",
            "ewyp.pdf",
            "-o",
            "out/filled.pdf",
        ],
    )
    .unwrap();
    assert!(fill.status.success(), "{}", stderr(&fill));
    assert!(stdout(&fill).contains("filled.pdf"));

    let widgets = read_widgets(&temp_dir.path().join("out/filled.pdf")).unwrap();
    let birth = widgets
        .iter()
        .find(|w| w.qualified_name == "topmostSubform[0].Page1[0].Dataurodzenia[0]")
        .unwrap();
    assert_eq!(birth.value.as_deref(), Some("15-01-90"));
}

#[test]
fn test_cli_fill_missing_template() {
    let temp_dir = setup_temp_dir();
    write_file(temp_dir.path(), "input.json", EXPLANATION);

    let output = run_cli_command(
        temp_dir.path(),
        &["fill", "input.json", "--kind", "explanation", "-t", "nope.pdf"],
    )
    .unwrap();

    assert_eq!(output.status.code(), Some(2));
    assert!(stderr(&output).contains("PDF template not found"));
}

#[test]
fn test_cli_fields_lists_widgets() {
    let temp_dir = setup_temp_dir();
    run_cli_command(
        temp_dir.path(),
        &["scaffold", "--kind", "explanation", "-o", "wyj.pdf"],
    )
    .unwrap();

    let output = run_cli_command(temp_dir.path(), &["fields", "wyj.pdf"]).unwrap();

    assert!(output.status.success(), "{}", stderr(&output));
    let listing = stdout(&output);
    assert!(listing.contains("imieNazwisko"));
    assert!(listing.contains("text"));
}

#[test]
fn test_cli_card_renders_flat_pdf() {
    let temp_dir = setup_temp_dir();
    write_file(
        temp_dir.path(),
        "card.json",
        r#"{"PAYERNAME": "Firma Budowlana Sp. z o.o.", "VICTIMNAME": "Jan Kowalski"}"#,
    );
    run_cli_command(
        temp_dir.path(),
        &["scaffold", "--kind", "card", "-o", "karta.pdf"],
    )
    .unwrap();

    let output = run_cli_command(
        temp_dir.path(),
        &[
            "card",
            "card.json",
            "-t",
            "karta.pdf",
            "-o",
            "karta_out.pdf",
            "--font",
            "missing.ttf",
            "--case-id",
            "90011512345",
        ],
    )
    .unwrap();

    assert!(output.status.success(), "{}", stderr(&output));
    let out = temp_dir.path().join("karta_out.pdf");
    assert!(fs::read(&out).unwrap().starts_with(b"%PDF-"));
    assert!(read_widgets(&out).unwrap().is_empty());
}

#[test]
fn test_cli_check_mapping() {
    let temp_dir = setup_temp_dir();
    let output = run_cli_command(temp_dir.path(), &["check-mapping"]).unwrap();

    assert!(output.status.success(), "{}", stdout(&output));
    assert!(stdout(&output).contains("Mapping tables are consistent"));
}

#[test]
fn test_cli_missing_input_file() {
    let temp_dir = setup_temp_dir();
    let output = run_cli_command(
        temp_dir.path(),
        &["validate", "absent.json", "--kind", "notification"],
    )
    .unwrap();

    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("Failed to read"));
}
