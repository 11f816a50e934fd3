//! End-to-end processing of one submission
//!
//! A [`FormPipeline`] owns its configuration, schemas and mapping tables, so
//! several pipelines with different fixtures can run side by side. Every call
//! opens its own template and writes to its own uniquely named file.

use crate::config::FormsConfig;
use crate::error::{FormError, Result};
use crate::flatten::flatten;
use crate::forms::{self, FillReport};
use crate::mapping::FieldMappingTable;
use crate::model::{AccidentCard, AccidentNotification, DocumentKind, FormDocument, SchemaVariant};
use crate::render::{fill_and_flatten, FlattenOptions, FlattenReport, FontSource};
use crate::schema::{FormSchema, ValidationReport};
use chrono::{DateTime, Local};
use serde_json::Value;
use std::path::{Path, PathBuf};

/// Timestamp layout shared by output PDFs and JSON artifacts
const STAMP_FORMAT: &str = "%Y%m%d_%H%M%S_%6f";

/// Result of [`FormPipeline::submit`]
///
/// Validation problems and PDF problems are reported side by side so the
/// caller can accept the data while flagging the document as missing.
#[derive(Debug)]
pub struct SubmissionOutcome {
    pub validation: ValidationReport,
    /// Typed view of the accepted document
    pub document: Option<FormDocument>,
    /// Normalized JSON written next to the PDFs
    pub artifact: Option<PathBuf>,
    pub fill: Option<FillReport>,
    pub pdf_error: Option<FormError>,
}

impl SubmissionOutcome {
    fn rejected(validation: ValidationReport) -> Self {
        Self {
            validation,
            document: None,
            artifact: None,
            fill: None,
            pdf_error: None,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.validation.success
    }

    /// Validated and rendered without errors
    pub fn is_complete(&self) -> bool {
        self.is_valid() && self.fill.is_some()
    }
}

#[derive(Debug, Clone)]
struct VariantTables {
    schema: FormSchema,
    mapping: FieldMappingTable,
}

impl VariantTables {
    fn for_variant(variant: SchemaVariant) -> Self {
        Self {
            schema: FormSchema::for_variant(variant),
            mapping: FieldMappingTable::for_variant(variant),
        }
    }
}

/// Validate, map and fill ZUS documents
#[derive(Debug, Clone)]
pub struct FormPipeline {
    config: FormsConfig,
    notification: VariantTables,
    explanation: VariantTables,
}

impl FormPipeline {
    pub fn new(config: FormsConfig) -> Self {
        Self {
            config,
            notification: VariantTables::for_variant(SchemaVariant::Notification),
            explanation: VariantTables::for_variant(SchemaVariant::Explanation),
        }
    }

    /// Replace the mapping table of the variant the table was built for
    pub fn with_mapping(mut self, mapping: FieldMappingTable) -> Self {
        let variant = mapping.variant();
        self.tables_mut(variant).mapping = mapping;
        self
    }

    /// Replace the schema of the variant the schema was built for
    pub fn with_schema(mut self, schema: FormSchema) -> Self {
        let variant = schema.variant();
        self.tables_mut(variant).schema = schema;
        self
    }

    pub fn config(&self) -> &FormsConfig {
        &self.config
    }

    pub fn schema(&self, variant: SchemaVariant) -> &FormSchema {
        &self.tables(variant).schema
    }

    pub fn mapping(&self, variant: SchemaVariant) -> &FieldMappingTable {
        &self.tables(variant).mapping
    }

    fn tables(&self, variant: SchemaVariant) -> &VariantTables {
        match variant {
            SchemaVariant::Notification => &self.notification,
            SchemaVariant::Explanation => &self.explanation,
        }
    }

    fn tables_mut(&mut self, variant: SchemaVariant) -> &mut VariantTables {
        match variant {
            SchemaVariant::Notification => &mut self.notification,
            SchemaVariant::Explanation => &mut self.explanation,
        }
    }

    pub fn validate(&self, variant: SchemaVariant, input: &Value) -> ValidationReport {
        let report = self.schema(variant).validate(input);
        if report.success {
            tracing::debug!(%variant, "input document is valid");
        } else {
            tracing::info!(%variant, errors = report.errors.len(), "input document rejected");
        }
        report
    }

    /// Validate, store the normalized JSON and fill the matching template.
    ///
    /// Returns `Err` only when the artifact cannot be written. Validation
    /// failures and PDF failures are carried in the outcome.
    pub fn submit(&self, variant: SchemaVariant, input: &Value) -> Result<SubmissionOutcome> {
        let validation = self.validate(variant, input);
        if !validation.success {
            return Ok(SubmissionOutcome::rejected(validation));
        }

        let normalized = validation.normalized().clone();
        let document = match validation.clone().into_document() {
            Ok(validated) => match validated.typed() {
                Ok(document) => Some(document),
                Err(e) => {
                    tracing::warn!("validated input has no typed form: {}", e);
                    None
                }
            },
            Err(_) => None,
        };
        if let Some(document) = &document {
            tracing::info!(
                person = %document.injured_person_name(),
                date = document.accident_date(),
                "accepted {}",
                variant
            );
        }

        let artifact = self.save_artifact(&normalized)?;

        let (fill, pdf_error) = match self.fill(variant, &normalized) {
            Ok(report) => (Some(report), None),
            Err(e) => {
                tracing::warn!("PDF generation failed for {}: {}", variant, e);
                (None, Some(e))
            }
        };

        Ok(SubmissionOutcome {
            validation,
            document,
            artifact: Some(artifact),
            fill,
            pdf_error,
        })
    }

    /// Soft-fill the notification template into a fresh output file
    pub fn fill_notification(&self, data: &Value) -> Result<FillReport> {
        self.fill(SchemaVariant::Notification, data)
    }

    /// Soft-fill the explanation template into a fresh output file
    pub fn fill_explanation(&self, data: &Value) -> Result<FillReport> {
        self.fill(SchemaVariant::Explanation, data)
    }

    pub fn fill(&self, variant: SchemaVariant, data: &Value) -> Result<FillReport> {
        let output = self.output_path(variant.document_kind());
        self.fill_into(variant, data, &output)
    }

    /// Soft-fill `data` (validated and normalized) into `output`
    pub fn fill_into(&self, variant: SchemaVariant, data: &Value, output: &Path) -> Result<FillReport> {
        let flat = flatten(data);
        let values = self.mapping(variant).resolve(&flat);
        let template = self.config.template_path(variant.document_kind());
        forms::fill(&template, output, &values, self.config.read_only)
    }

    /// Complete a card with defaults and with data taken from the
    /// notification. Values already present are kept.
    pub fn prepare_accident_card(
        &self,
        card: AccidentCard,
        case_id: Option<&str>,
        notification: Option<&AccidentNotification>,
    ) -> AccidentCard {
        let card = match notification {
            Some(notification) => card.prefill_from(notification),
            None => card,
        };
        card.with_defaults(case_id, Local::now().date_naive())
    }

    /// Prepare the card and hard-flatten it into a fresh output file
    pub fn generate_accident_card(
        &self,
        card: AccidentCard,
        case_id: Option<&str>,
        notification: Option<&AccidentNotification>,
    ) -> Result<FlattenReport> {
        let card = self.prepare_accident_card(card, case_id, notification);
        let output = self.output_path(DocumentKind::AccidentCard);
        self.render_accident_card(&card, &output)
    }

    /// Hard-flatten `card` into `output` as it is
    pub fn render_accident_card(&self, card: &AccidentCard, output: &Path) -> Result<FlattenReport> {
        let template = self.config.template_path(DocumentKind::AccidentCard);
        let font = FontSource::load(Some(&self.config.font_path));
        let options = FlattenOptions {
            base_font_size: self.config.base_font_size,
            fallback_font_size: self.config.fallback_font_size,
        };
        fill_and_flatten(&template, output, &card.value_map(), &font, &options)
    }

    /// Unused path `<output_dir>/<PREFIX>_<timestamp>.pdf`
    pub fn output_path(&self, kind: DocumentKind) -> PathBuf {
        unique_path(
            &self.config.output_dir,
            &format!("{}_{}", kind.file_prefix(), stamp(Local::now())),
            "pdf",
        )
    }

    /// Write the normalized input to `<output_dir>/<timestamp>.json`
    pub fn save_artifact(&self, normalized: &Value) -> Result<PathBuf> {
        std::fs::create_dir_all(&self.config.output_dir)?;
        let path = unique_path(&self.config.output_dir, &stamp(Local::now()), "json");
        std::fs::write(&path, serde_json::to_vec_pretty(normalized)?)?;
        tracing::info!("saved input data to {}", path.display());
        Ok(path)
    }
}

fn stamp(now: DateTime<Local>) -> String {
    now.format(STAMP_FORMAT).to_string()
}

/// `dir/stem.ext`, or `dir/stem_N.ext` when that file already exists
fn unique_path(dir: &Path, stem: &str, extension: &str) -> PathBuf {
    let mut path = dir.join(format!("{stem}.{extension}"));
    let mut counter = 1;
    while path.exists() {
        path = dir.join(format!("{stem}_{counter}.{extension}"));
        counter += 1;
    }
    path
}
