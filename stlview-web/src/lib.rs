/// STL Viewer Web - WebGL2 `<stl-viewer>` custom element
///
/// The element itself is a small JS class (see the `embed` module of
/// stlview-core) that forwards its connected/disconnected callbacks to
/// [`StlViewer`].

mod fetch;
mod gl;
mod listener;
mod viewer;

use stlview_core::{parse_models, ModelDescriptor, VariantKind, ViewerVariant};
use tracing::info;
use wasm_bindgen::prelude::*;
use web_sys::HtmlElement;

pub use fetch::FetchSource;
pub use viewer::DragMode;

use viewer::Attachment;

/// Entry point for WASM module
#[wasm_bindgen(start)]
pub fn main() {
    // Set panic hook for better error messages
    console_error_panic_hook::set_once();

    tracing_wasm::set_as_global_default_with_config(
        tracing_wasm::WASMLayerConfigBuilder::new()
            .set_max_level(tracing::Level::INFO)
            .build(),
    );
}

/// Viewer behind one `<stl-viewer>` element
#[wasm_bindgen]
pub struct StlViewer {
    host: HtmlElement,
    models: Vec<ModelDescriptor>,
    variant: ViewerVariant,
    attachment: Option<Attachment>,
}

#[wasm_bindgen]
impl StlViewer {
    /// `models_json` is a JSON array of model descriptors; `variant` is
    /// `"top-down"` or `"turntable"`; `alpha` is the top-down rotation in
    /// degrees.
    #[wasm_bindgen(constructor)]
    pub fn new(host: HtmlElement, models_json: &str, variant: &str, alpha: f32) -> Result<StlViewer, JsError> {
        let models = parse_models(models_json)?;
        let kind: VariantKind = variant.parse().map_err(|msg: String| JsError::new(&msg))?;

        Ok(StlViewer {
            host,
            models,
            variant: ViewerVariant::new(kind, alpha),
            attachment: None,
        })
    }

    /// Element inserted into a document: build a fresh scene and start
    /// loading. Connecting an already connected viewer restarts it.
    pub fn connect(&mut self) -> Result<(), JsError> {
        self.attachment = None;
        let attachment = Attachment::start(&self.host, self.models.clone(), self.variant)?;
        info!(
            variant = %self.variant.kind(),
            models = self.models.len(),
            "Viewer connected"
        );
        self.attachment = Some(attachment);
        Ok(())
    }

    /// Element removed from its document: stop after the in-flight frame
    pub fn disconnect(&mut self) {
        if self.attachment.take().is_some() {
            info!("Viewer disconnected");
        }
    }

    #[wasm_bindgen(getter, js_name = isConnected)]
    pub fn is_connected(&self) -> bool {
        self.attachment
            .as_ref()
            .is_some_and(|attachment| attachment.is_connected())
    }
}
