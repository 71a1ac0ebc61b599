/// Viewer file loading
use anyhow::{Context, Result};
use std::path::Path;
use stlview_core::ViewerConfig;
use tracing::info;

/// Parse a TOML viewer file
pub fn parse_viewer_toml(content: &str) -> Result<ViewerConfig> {
    let config: ViewerConfig = toml::from_str(content)?;
    config.validate()?;
    Ok(config)
}

/// Parse a JSON viewer file: either a full viewer object or a bare model list
pub fn parse_viewer_json(content: &str) -> Result<ViewerConfig> {
    let config = if content.trim_start().starts_with('[') {
        ViewerConfig {
            variant: Default::default(),
            alpha: 0.0,
            models: serde_json::from_str(content)?,
        }
    } else {
        serde_json::from_str(content)?
    };
    config.validate()?;
    Ok(config)
}

/// Load a viewer file, choosing the format from its extension
pub fn load_viewer_file(path: &Path) -> Result<ViewerConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read viewer file {}", path.display()))?;

    let is_json = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    let config = if is_json {
        parse_viewer_json(&content)
    } else {
        parse_viewer_toml(&content)
    }
    .with_context(|| format!("Invalid viewer file {}", path.display()))?;

    info!(
        path = %path.display(),
        variant = %config.variant,
        models = config.models.len(),
        "Loaded viewer file"
    );
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use stlview_core::{RenderStyle, VariantKind, ViewerVariant};

    #[test]
    fn test_parse_toml_viewer() {
        let config = parse_viewer_toml(
            r##"
variant = "top-down"
alpha = 4.0

[[models]]
path = "shell.stl"
color = "#A4D3EE"
render_style = "transparent"

[[models]]
path = "box.stl"
color = "#FFFF00"
rendr_type = "hidden"
name = "box"
"##,
        )
        .unwrap();

        assert_eq!(config.variant, VariantKind::TopDown);
        assert_eq!(config.viewer_variant(), ViewerVariant::TopDown { alpha_deg: 4.0 });
        assert_eq!(config.models.len(), 2);
        assert_eq!(config.models[0].render_style, RenderStyle::Transparent);
        assert!(config.models[1].is_hidden());
    }

    #[test]
    fn test_toml_rejects_unknown_style() {
        let result = parse_viewer_toml(
            r##"
[[models]]
path = "a.stl"
color = "#ffffff"
render_style = "chrome"
"##,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_toml_rejects_bad_color() {
        let result = parse_viewer_toml(
            r#"
[[models]]
path = "a.stl"
color = "red"
render_style = "shaded"
"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_json_model_list() {
        let config = parse_viewer_json(
            r##"[{"path": "foam.stl", "color": "#A9A9A9", "rendr_type": "wireframe"}]"##,
        )
        .unwrap();
        assert_eq!(config.variant, VariantKind::Turntable);
        assert_eq!(config.models[0].render_style, RenderStyle::Wireframe);
    }

    #[test]
    fn test_missing_file_reports_path() {
        let err = load_viewer_file(Path::new("/nonexistent/viewer.toml")).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/viewer.toml"));
    }
}
