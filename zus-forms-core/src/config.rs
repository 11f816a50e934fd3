//! Runtime configuration for the fill pipeline
//!
//! Values come from [`FormsConfig::default`], optionally overlaid by a JSON
//! file and then by `ZUS_FORMS_*` environment variables.

use crate::error::{FormError, Result};
use crate::model::DocumentKind;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable overriding [`FormsConfig::templates_dir`]
pub const ENV_TEMPLATES_DIR: &str = "ZUS_FORMS_TEMPLATES_DIR";
/// Environment variable overriding [`FormsConfig::output_dir`]
pub const ENV_OUTPUT_DIR: &str = "ZUS_FORMS_OUTPUT_DIR";
/// Environment variable overriding [`FormsConfig::font_path`]
pub const ENV_FONT: &str = "ZUS_FORMS_FONT";
/// Environment variable overriding [`FormsConfig::read_only`]
pub const ENV_READ_ONLY: &str = "ZUS_FORMS_READ_ONLY";

/// Template file names per document kind, relative to the templates directory
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TemplateFiles {
    pub notification: PathBuf,
    pub explanation: PathBuf,
    pub accident_card: PathBuf,
}

impl Default for TemplateFiles {
    fn default() -> Self {
        Self {
            notification: PathBuf::from("ZUS_EWYP_template.pdf"),
            explanation: PathBuf::from("wyjasnienia_template.pdf"),
            accident_card: PathBuf::from("karta_wypadku.pdf"),
        }
    }
}

/// Pipeline configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormsConfig {
    /// Directory holding the blank PDF templates
    pub templates_dir: PathBuf,
    /// Template file names
    pub templates: TemplateFiles,
    /// Directory receiving filled PDFs and JSON artifacts
    pub output_dir: PathBuf,
    /// TrueType font with full Polish coverage used by hard flatten
    pub font_path: PathBuf,
    /// Font size tried first when drawing flattened text
    pub base_font_size: f64,
    /// Font size used when the base size overflows the widget
    pub fallback_font_size: f64,
    /// Mark every field read-only after a soft fill
    pub read_only: bool,
}

impl Default for FormsConfig {
    fn default() -> Self {
        Self {
            templates_dir: PathBuf::from("templates"),
            templates: TemplateFiles::default(),
            output_dir: PathBuf::from("filled_forms"),
            font_path: PathBuf::from("/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf"),
            base_font_size: 9.0,
            fallback_font_size: 7.0,
            read_only: false,
        }
    }
}

impl FormsConfig {
    /// Load a JSON configuration file. Missing keys keep their defaults.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&raw).map_err(|e| {
            FormError::Config(format!("cannot parse {}: {}", path.display(), e))
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Defaults overlaid by the process environment
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Overlay values from an environment lookup function. Taking the lookup
    /// as a parameter keeps tests independent of the real process
    /// environment.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(dir) = lookup(ENV_TEMPLATES_DIR) {
            self.templates_dir = PathBuf::from(dir);
        }
        if let Some(dir) = lookup(ENV_OUTPUT_DIR) {
            self.output_dir = PathBuf::from(dir);
        }
        if let Some(font) = lookup(ENV_FONT) {
            self.font_path = PathBuf::from(font);
        }
        if let Some(flag) = lookup(ENV_READ_ONLY) {
            self.read_only = match flag.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => true,
                "0" | "false" | "no" | "off" | "" => false,
                other => {
                    return Err(FormError::Config(format!(
                        "{ENV_READ_ONLY} must be a boolean, got '{other}'"
                    )))
                }
            };
        }
        self.validate()
    }

    /// Reject font sizes that cannot produce readable output
    pub fn validate(&self) -> Result<()> {
        if !(self.base_font_size > 0.0) || !(self.fallback_font_size > 0.0) {
            return Err(FormError::Config(
                "font sizes must be positive".to_string(),
            ));
        }
        if self.fallback_font_size > self.base_font_size {
            return Err(FormError::Config(format!(
                "fallback font size {} exceeds base font size {}",
                self.fallback_font_size, self.base_font_size
            )));
        }
        Ok(())
    }

    /// Full path of the template used for a document kind
    pub fn template_path(&self, kind: DocumentKind) -> PathBuf {
        let file = match kind {
            DocumentKind::Notification => &self.templates.notification,
            DocumentKind::Explanation => &self.templates.explanation,
            DocumentKind::AccidentCard => &self.templates.accident_card,
        };
        self.templates_dir.join(file)
    }
}
