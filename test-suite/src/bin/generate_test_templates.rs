//! Generate Test Templates
//!
//! Writes the synthetic PDF templates used during development into
//! `fixtures/templates`, or into the directory given as first argument.

use anyhow::Result;
use std::path::PathBuf;
use zus_forms::FormsConfig;
use zus_forms_test_suite::utils::write_templates;

fn main() -> Result<()> {
    let templates_dir = match std::env::args_os().nth(1) {
        Some(dir) => PathBuf::from(dir),
        None => PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("fixtures/templates"),
    };

    let config = FormsConfig {
        templates_dir: templates_dir.clone(),
        ..FormsConfig::default()
    };
    println!("Generating templates in {:?}...", templates_dir);
    write_templates(&config)?;

    println!("Template generation complete!");
    Ok(())
}
