/// Page snippets that mount an `<stl-viewer>` element.
///
/// Configuration is baked into the element script when the snippet is
/// generated; the element reads nothing from its markup at runtime.
use serde::Serialize;

use crate::descriptor::{validate_models, ModelDescriptor};
use crate::error::ViewerError;
use crate::variant::ViewerVariant;

/// Element script with `{__NAME__}` placeholders
pub const ELEMENT_TEMPLATE: &str = include_str!("../templates/stl-viewer.js");

pub const ELEMENT_TAG: &str = "stl-viewer";
pub const DEFAULT_HEIGHT_PX: u32 = 500;
pub const DEFAULT_MODULE_URL: &str = "./pkg/stlview_web.js";

#[derive(Debug, Clone, PartialEq)]
pub struct EmbedOptions {
    /// URL of the wasm-bindgen JS module exporting `StlViewer`
    pub module_url: String,
    pub height_px: u32,
}

impl Default for EmbedOptions {
    fn default() -> Self {
        Self {
            module_url: DEFAULT_MODULE_URL.to_string(),
            height_px: DEFAULT_HEIGHT_PX,
        }
    }
}

/// JSON that is safe to inline inside a `<script>` element
fn script_json<T: Serialize + ?Sized>(value: &T) -> Result<String, ViewerError> {
    Ok(serde_json::to_string(value)?.replace("</", "<\\/"))
}

/// Replace each `{__NAME__}` in `template` in a single pass, so substituted
/// values are never scanned for further placeholders.
fn substitute(template: &str, lookup: impl Fn(&str) -> Option<String>) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(start) = rest.find("{__") {
        let Some(len) = rest[start..].find("__}") else {
            break;
        };
        let name = &rest[start + 3..start + len];
        out.push_str(&rest[..start]);
        match lookup(name) {
            Some(value) => out.push_str(&value),
            None => out.push_str(&rest[start..start + len + 3]),
        }
        rest = &rest[start + len + 3..];
    }
    out.push_str(rest);
    out
}

/// Element script with the model list, variant, and alpha filled in
pub fn element_script(
    models: &[ModelDescriptor],
    variant: &ViewerVariant,
    module_url: &str,
) -> Result<String, ViewerError> {
    validate_models(models)?;
    let models_json = script_json(models)?;
    let alpha_json = script_json(&variant.alpha_deg())?;
    let variant_json = script_json(&variant.kind())?;
    let module_json = script_json(module_url)?;

    Ok(substitute(ELEMENT_TEMPLATE, |name| match name {
        "MODELS" => Some(models_json.clone()),
        "ALPHA" => Some(alpha_json.clone()),
        "VARIANT" => Some(variant_json.clone()),
        "MODULE_URL" => Some(module_json.clone()),
        _ => None,
    }))
}

/// Self-contained HTML fragment: a fixed-height box holding the element
/// script and one `<stl-viewer>` tag.
///
/// The element class carries its models, so only the first fragment on a
/// page defines `<stl-viewer>`. Later fragments log a console warning and
/// render with the first fragment's models.
pub fn embed_html(
    models: &[ModelDescriptor],
    variant: &ViewerVariant,
    options: &EmbedOptions,
) -> Result<String, ViewerError> {
    let script = element_script(models, variant, &options.module_url)?;
    Ok(format!(
        "<div style=\"height:{}px;\"><script type=\"module\">\n{}</script><{tag}></{tag}></div>\n",
        options.height_px,
        script,
        tag = ELEMENT_TAG,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::parse_models;
    use crate::material::RenderStyle;

    #[test]
    fn test_substitute_single_pass() {
        let out = substitute("a {__X__} b {__Y__} c {__Z__}", |name| match name {
            "X" => Some("{__Y__}".to_string()),
            "Y" => Some("2".to_string()),
            _ => None,
        });
        assert_eq!(out, "a {__Y__} b 2 c {__Z__}");
    }

    #[test]
    fn test_element_script_round_trips_models() {
        let models = vec![
            ModelDescriptor::new("shell.stl", "#A4D3EE", RenderStyle::Transparent),
            ModelDescriptor::new("box.stl", "#FFFF00", RenderStyle::Hidden),
        ];
        let variant = ViewerVariant::TopDown { alpha_deg: 4.5 };
        let script = element_script(&models, &variant, "/pkg/viewer.js").unwrap();

        assert!(script.starts_with("import init, { StlViewer } from \"/pkg/viewer.js\";"));
        assert!(script.contains("const alpha = 4.5;"));
        assert!(script.contains("const variant = \"top-down\";"));
        assert!(!script.contains("{__"));

        let line = script
            .lines()
            .find_map(|l| l.strip_prefix("const models = "))
            .unwrap();
        let parsed = parse_models(line.trim_end_matches(';')).unwrap();
        assert_eq!(parsed, models);
    }

    #[test]
    fn test_script_breakout_is_escaped() {
        let models = vec![ModelDescriptor::new(
            "</script><script>alert(1)</script>.stl",
            "#fff",
            RenderStyle::Shaded,
        )];
        let html = embed_html(&models, &ViewerVariant::Turntable, &EmbedOptions::default()).unwrap();
        assert_eq!(html.matches("</script>").count(), 1);
    }

    #[test]
    fn test_embed_html_wraps_element() {
        let html = embed_html(&[], &ViewerVariant::Turntable, &EmbedOptions::default()).unwrap();
        assert!(html.starts_with("<div style=\"height:500px;\">"));
        assert!(html.contains("<stl-viewer></stl-viewer>"));
        assert!(html.contains("const alpha = 0.0;"));
    }

    #[test]
    fn test_repeat_definition_is_reported() {
        let script = element_script(&[], &ViewerVariant::Turntable, DEFAULT_MODULE_URL).unwrap();
        assert!(script.contains("customElements.get(\"stl-viewer\")"));
        assert!(script.contains("console.warn("));
    }

    #[test]
    fn test_invalid_color_rejected() {
        let models = vec![ModelDescriptor::new("a.stl", "teal", RenderStyle::Shaded)];
        assert!(element_script(&models, &ViewerVariant::Turntable, DEFAULT_MODULE_URL).is_err());
    }
}
