use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FormError {
    #[error("PDF template not found: {}", .0.display())]
    TemplateNotFound(PathBuf),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("PDF error: {0}")]
    Pdf(#[from] lopdf::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Font error: {0}")]
    Font(String),

    #[error("Invalid PDF structure: {0}")]
    InvalidStructure(String),

    #[error("Mapping error: {0}")]
    Mapping(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl FormError {
    /// True for deployment defects (missing template, broken configuration)
    /// as opposed to problems with the submitted data or the filesystem.
    pub fn is_configuration_error(&self) -> bool {
        matches!(self, FormError::TemplateNotFound(_) | FormError::Config(_))
    }
}

pub type Result<T> = std::result::Result<T, FormError>;
