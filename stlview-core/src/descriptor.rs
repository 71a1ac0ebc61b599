/// Model descriptors: the static configuration of a viewer
use serde::{Deserialize, Serialize};

use crate::error::ViewerError;
use crate::material::{Color, RenderStyle};
use crate::variant::{VariantKind, ViewerVariant};

/// One STL file to show, with its color and render style
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelDescriptor {
    pub path: String,
    pub color: String,
    #[serde(alias = "rendr_type")]
    pub render_style: RenderStyle,
    /// Generation timestamp, appended to the URL to defeat HTTP caching
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub part: Option<String>,
}

impl ModelDescriptor {
    pub fn new(path: impl Into<String>, color: impl Into<String>, render_style: RenderStyle) -> Self {
        Self {
            path: path.into(),
            color: color.into(),
            render_style,
            time: None,
            name: None,
            part: None,
        }
    }

    pub fn color(&self) -> Result<Color, ViewerError> {
        self.color.parse()
    }

    pub fn is_hidden(&self) -> bool {
        self.render_style == RenderStyle::Hidden
    }

    /// Display name: explicit name, else the file stem of `path`
    pub fn label(&self) -> &str {
        if let Some(name) = &self.name {
            return name;
        }
        let file = self.path.rsplit('/').next().unwrap_or(&self.path);
        file.split('.').next().unwrap_or(file)
    }

    /// URL to fetch. A timestamped descriptor is resolved relative to the
    /// page and carries a `cache` query parameter.
    pub fn resolved_path(&self) -> String {
        let Some(time) = self.time else {
            return self.path.clone();
        };

        let is_relative = !(self.path.starts_with('/')
            || self.path.starts_with("./")
            || self.path.starts_with("../")
            || self.path.contains("://"));
        let prefix = if is_relative { "./" } else { "" };
        let separator = if self.path.contains('?') { '&' } else { '?' };
        format!("{prefix}{}{separator}cache={time}", self.path)
    }
}

/// Parse and validate a JSON array of descriptors.
///
/// Unknown render styles and malformed colors are rejected here so that a
/// viewer never starts with a model it cannot draw.
pub fn parse_models(json: &str) -> Result<Vec<ModelDescriptor>, ViewerError> {
    let models: Vec<ModelDescriptor> = serde_json::from_str(json)?;
    validate_models(&models)?;
    Ok(models)
}

/// Check the colors of every model that will be drawn
pub fn validate_models(models: &[ModelDescriptor]) -> Result<(), ViewerError> {
    for model in models.iter().filter(|model| !model.is_hidden()) {
        model.color()?;
    }
    Ok(())
}

/// A complete viewer definition, as stored in a viewer file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewerConfig {
    #[serde(default)]
    pub variant: VariantKind,
    /// Top-down rotation angle in degrees
    #[serde(default)]
    pub alpha: f32,
    #[serde(default)]
    pub models: Vec<ModelDescriptor>,
}

impl ViewerConfig {
    pub fn viewer_variant(&self) -> ViewerVariant {
        ViewerVariant::new(self.variant, self.alpha)
    }

    pub fn validate(&self) -> Result<(), ViewerError> {
        validate_models(&self.models)
    }
}
