//! # zus-forms
//!
//! Schema validation, field mapping and PDF form filling for ZUS workplace
//! accident documents.
//!
//! ## Features
//!
//! - **Validation**: structured, Polish-language error reports for the EWYP
//!   notification and the victim's explanation
//! - **Flattening**: nested JSON to dot-path maps and back
//! - **Mapping**: declarative logical path to widget tables with date,
//!   boolean-pair, enum and composite transforms
//! - **Soft fill**: AcroForm values written in place, optionally read-only
//! - **Hard flatten**: values drawn as page content with an embedded
//!   TrueType font, form fields removed (accident card)
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use serde_json::json;
//! use zus_forms::{FormPipeline, FormsConfig, SchemaVariant};
//!
//! # fn main() -> zus_forms::Result<()> {
//! let pipeline = FormPipeline::new(FormsConfig::from_env()?);
//! let outcome = pipeline.submit(
//!     SchemaVariant::Explanation,
//!     &json!({
//!         "imieNazwisko": "Jan Kowalski",
//!         "dataWypadku": "2024-03-10",
//!         "miejsceWypadku": "Warszawa",
//!         "opisOkolicznosciWypadku": "Upadek na śliskiej podłodze"
//!     }),
//! )?;
//!
//! if let Some(fill) = &outcome.fill {
//!     println!("written to {}", fill.output_path.display());
//! }
//! for error in &outcome.validation.errors {
//!     println!("{}: {}", error.human_field_name, error.message);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Modules
//!
//! - [`schema`] - input schemas and the validator
//! - [`flatten`] - dot-path maps
//! - [`mapping`] - widget mapping tables
//! - [`forms`] - AcroForm access, soft fill and synthetic templates
//! - [`render`] - fonts, text layout and hard flatten
//! - [`pipeline`] - the end-to-end flow

pub mod config;
pub mod dates;
pub mod error;
pub mod flatten;
pub mod forms;
pub mod geometry;
pub mod mapping;
pub mod model;
pub mod pipeline;
pub mod render;
pub mod schema;

pub use config::FormsConfig;
pub use error::{FormError, Result};
pub use flatten::{flatten, unflatten, FlatFieldMap, FlatValue};
pub use forms::{fill, FillReport, TemplateBuilder, WidgetInfo};
pub use mapping::{FieldMappingEntry, FieldMappingTable, ResolvedValues, WidgetValue};
pub use model::{
    AccidentCard, AccidentNotification, DocumentKind, FormDocument, SchemaVariant,
    VictimExplanation,
};
pub use pipeline::{FormPipeline, SubmissionOutcome};
pub use render::{fill_and_flatten, FlattenOptions, FlattenReport, FontSource};
pub use schema::{FieldError, FormSchema, ValidatedDocument, ValidationReport};

/// Current version of zus-forms
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
