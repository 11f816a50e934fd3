//! Test Suite for zus-forms
//!
//! Shared fixtures for the scenario and property tests: a corpus of sample
//! documents, proptest strategies and synthetic templates.

pub mod corpus;
pub mod strategies;

pub use corpus::{ExpectedBehavior, TestCategory, TestCorpus, TestDocument};

/// Common test utilities
pub mod utils {
    use std::path::Path;
    use zus_forms::forms::{scaffold_accident_card, scaffold_for_table};
    use zus_forms::{DocumentKind, FieldMappingTable, FormsConfig, SchemaVariant};

    /// Write the synthetic template of every document kind into
    /// `config.templates_dir`
    pub fn write_templates(config: &FormsConfig) -> anyhow::Result<()> {
        for variant in [SchemaVariant::Notification, SchemaVariant::Explanation] {
            scaffold_for_table(&FieldMappingTable::for_variant(variant))
                .save(config.template_path(variant.document_kind()))?;
        }
        scaffold_accident_card().save(config.template_path(DocumentKind::AccidentCard))?;
        Ok(())
    }

    /// Configuration rooted in `dir` with templates already written
    pub fn test_config(dir: &Path) -> anyhow::Result<FormsConfig> {
        let config = FormsConfig {
            templates_dir: dir.join("templates"),
            output_dir: dir.join("filled_forms"),
            font_path: dir.join("fonts/missing.ttf"),
            ..FormsConfig::default()
        };
        write_templates(&config)?;
        Ok(config)
    }

    /// Create a temporary directory for test outputs
    pub fn create_test_output_dir() -> anyhow::Result<tempfile::TempDir> {
        Ok(tempfile::tempdir()?)
    }
}
