use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::prelude::*;
use zus_forms::forms::{read_widgets, scaffold_accident_card, scaffold_for_table};
use zus_forms::{
    AccidentCard, AccidentNotification, DocumentKind, FieldMappingTable, FormDocument, FormError,
    FormPipeline, FormSchema, FormsConfig, SchemaVariant, ValidationReport,
};

#[derive(Parser)]
#[command(
    name = "zusforms",
    about = "Validate accident reports and fill ZUS PDF forms",
    version,
    author
)]
struct Cli {
    /// JSON configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log at debug level
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum Kind {
    Notification,
    Explanation,
}

impl From<Kind> for SchemaVariant {
    fn from(kind: Kind) -> Self {
        match kind {
            Kind::Notification => SchemaVariant::Notification,
            Kind::Explanation => SchemaVariant::Explanation,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum TemplateKind {
    Notification,
    Explanation,
    Card,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a JSON document
    Validate {
        /// Input JSON file
        input: PathBuf,

        /// Document type
        #[arg(short, long, value_enum)]
        kind: Kind,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Validate a JSON document and fill its PDF form
    Fill {
        /// Input JSON file
        input: PathBuf,

        /// Document type
        #[arg(short, long, value_enum)]
        kind: Kind,

        /// Template PDF (defaults to the configured template)
        #[arg(short, long)]
        template: Option<PathBuf>,

        /// Output PDF (defaults to a timestamped file in the output directory)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Mark every field read-only
        #[arg(long)]
        read_only: bool,
    },

    /// Render an accident card proposal as a flattened PDF
    Card {
        /// Card values as JSON, keyed by widget name
        input: PathBuf,

        /// Notification JSON used to complete missing card values
        #[arg(short, long)]
        notification: Option<PathBuf>,

        /// Template PDF (defaults to the configured template)
        #[arg(short, long)]
        template: Option<PathBuf>,

        /// Output PDF (defaults to a timestamped file in the output directory)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// TrueType font to embed
        #[arg(long)]
        font: Option<PathBuf>,

        /// Case identifier used as the victim's PESEL when none is given
        #[arg(long)]
        case_id: Option<String>,
    },

    /// List the form fields of a PDF
    Fields {
        /// Input PDF file
        input: PathBuf,
    },

    /// Write a synthetic template carrying every mapped widget
    Scaffold {
        /// Template type
        #[arg(short, long, value_enum)]
        kind: TemplateKind,

        /// Output PDF
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Check the mapping tables against the schemas
    CheckMapping,
}

fn init_logging(verbose: bool) {
    let default = if verbose {
        "zus_forms=debug,zusforms=debug"
    } else {
        "zus_forms=info,zusforms=info"
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn load_config(path: Option<&Path>) -> Result<FormsConfig> {
    let mut config = match path {
        Some(path) => FormsConfig::from_file(path)
            .with_context(|| format!("Failed to load configuration {}", path.display()))?,
        None => FormsConfig::default(),
    };
    config.apply_env(|key| std::env::var(key).ok())?;
    Ok(config)
}

fn read_json(path: &Path) -> Result<Value> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("{} is not valid JSON", path.display()))
}

/// Point the template of `kind` at `path`, relative to the working directory
fn override_template(config: &mut FormsConfig, kind: DocumentKind, path: &Path) -> Result<()> {
    let path = std::env::current_dir()?.join(path);
    match kind {
        DocumentKind::Notification => config.templates.notification = path,
        DocumentKind::Explanation => config.templates.explanation = path,
        DocumentKind::AccidentCard => config.templates.accident_card = path,
    }
    Ok(())
}

fn print_errors(report: &ValidationReport) {
    eprintln!("Validation failed ({} errors):", report.errors.len());
    for error in &report.errors {
        eprintln!("  - {}: {}", error.human_field_name, error.message);
    }
}

fn run(cli: Cli) -> Result<ExitCode> {
    let mut config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Validate { input, kind, json } => {
            let data = read_json(&input)?;
            let report = FormPipeline::new(config).validate(kind.into(), &data);

            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else if report.success {
                println!("Document is valid");
            } else {
                print_errors(&report);
            }
            if !report.success {
                return Ok(ExitCode::FAILURE);
            }
        }

        Commands::Fill {
            input,
            kind,
            template,
            output,
            read_only,
        } => {
            let variant = SchemaVariant::from(kind);
            if let Some(template) = &template {
                override_template(&mut config, variant.document_kind(), template)?;
            }
            config.read_only |= read_only;
            let pipeline = FormPipeline::new(config);

            let data = read_json(&input)?;
            let report = pipeline.validate(variant, &data);
            if !report.success {
                print_errors(&report);
                return Ok(ExitCode::FAILURE);
            }

            let fill = match &output {
                Some(output) => pipeline.fill_into(variant, report.normalized(), output)?,
                None => pipeline.fill(variant, report.normalized())?,
            };
            println!(
                "Filled {} of {} values into {}",
                fill.fields_filled,
                fill.total_mapped,
                fill.output_path.display()
            );
        }

        Commands::Card {
            input,
            notification,
            template,
            output,
            font,
            case_id,
        } => {
            if let Some(template) = &template {
                override_template(&mut config, DocumentKind::AccidentCard, template)?;
            }
            if let Some(font) = font {
                config.font_path = font;
            }
            let pipeline = FormPipeline::new(config);

            let card: AccidentCard = serde_json::from_value(read_json(&input)?)
                .with_context(|| format!("{} is not an accident card", input.display()))?;

            let source = match &notification {
                Some(path) => {
                    let report = pipeline.validate(SchemaVariant::Notification, &read_json(path)?);
                    if !report.success {
                        print_errors(&report);
                        return Ok(ExitCode::FAILURE);
                    }
                    Some(notification_record(report)?)
                }
                None => None,
            };

            let card = pipeline.prepare_accident_card(card, case_id.as_deref(), source.as_ref());
            let output = match output {
                Some(output) => output,
                None => pipeline.output_path(DocumentKind::AccidentCard),
            };
            let report = pipeline.render_accident_card(&card, &output)?;

            for field in report.rendered.iter().filter(|f| f.truncated) {
                eprintln!(
                    "Warning: {} truncated to {} lines at {} pt",
                    field.name, field.lines_drawn, field.font_size
                );
            }
            println!(
                "Rendered {} of {} fields into {}",
                report.fields_filled,
                report.total_fields,
                report.output_path.display()
            );
        }

        Commands::Fields { input } => {
            let widgets = read_widgets(&input)
                .with_context(|| format!("Failed to read form fields of {}", input.display()))?;
            if widgets.is_empty() {
                println!("No form fields");
            }
            for widget in widgets {
                println!(
                    "{:>3}  {:<9}  {}  {}",
                    widget.page,
                    widget.field_type.label(),
                    widget.qualified_name,
                    widget.value.as_deref().unwrap_or("")
                );
            }
        }

        Commands::Scaffold { kind, output } => {
            let builder = match kind {
                TemplateKind::Notification => scaffold_for_table(&FieldMappingTable::notification()),
                TemplateKind::Explanation => scaffold_for_table(&FieldMappingTable::explanation()),
                TemplateKind::Card => scaffold_accident_card(),
            };
            let count = builder.widget_count();
            builder.save(&output)?;
            println!("Template with {} fields written to {}", count, output.display());
        }

        Commands::CheckMapping => {
            let mut problems = 0;
            for variant in [SchemaVariant::Notification, SchemaVariant::Explanation] {
                let table = FieldMappingTable::for_variant(variant);
                let schema = FormSchema::for_variant(variant);

                for issue in table.check_integrity() {
                    println!("{variant}: {issue}");
                    problems += 1;
                }
                for path in table.missing_required(&schema) {
                    println!("{variant}: required field {path} has no mapping");
                    problems += 1;
                }
                println!("{variant}: {} entries", table.entries().len());
            }
            if problems > 0 {
                return Ok(ExitCode::FAILURE);
            }
            println!("Mapping tables are consistent");
        }
    }

    Ok(ExitCode::SUCCESS)
}

fn notification_record(report: ValidationReport) -> Result<AccidentNotification> {
    let document = report
        .into_document()
        .map_err(|errors| anyhow::anyhow!("{} validation errors", errors.len()))?;
    match document.typed()? {
        FormDocument::Notification(notification) => Ok(*notification),
        FormDocument::Explanation(_) => anyhow::bail!("expected a notification"),
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e:#}");
            let configuration = e
                .downcast_ref::<FormError>()
                .is_some_and(FormError::is_configuration_error);
            ExitCode::from(if configuration { 2 } else { 1 })
        }
    }
}
