/// Browser `fetch` as a geometry source
use stlview_core::{GeometrySource, ViewerError};
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::Response;

/// Fetches model files relative to the current page
pub struct FetchSource;

impl GeometrySource for FetchSource {
    async fn fetch(&self, path: &str) -> Result<Vec<u8>, ViewerError> {
        let fail = |reason: String| ViewerError::Fetch {
            path: path.to_string(),
            reason,
        };

        let window = web_sys::window().ok_or_else(|| fail("no window".to_string()))?;
        let resp_value = JsFuture::from(window.fetch_with_str(path))
            .await
            .map_err(|err| fail(js_reason(&err)))?;
        let resp: Response = resp_value
            .dyn_into()
            .map_err(|_| fail("not a Response".to_string()))?;

        if !resp.ok() {
            return Err(fail(format!("HTTP {}", resp.status())));
        }

        let body = resp.array_buffer().map_err(|err| fail(js_reason(&err)))?;
        let buffer = JsFuture::from(body)
            .await
            .map_err(|err| fail(js_reason(&err)))?;
        Ok(js_sys::Uint8Array::new(&buffer).to_vec())
    }
}

/// Human-readable text of a thrown JS value
pub(crate) fn js_reason(value: &JsValue) -> String {
    if let Some(text) = value.as_string() {
        return text;
    }
    if let Some(error) = value.dyn_ref::<js_sys::Error>() {
        return String::from(error.message());
    }
    format!("{value:?}")
}
