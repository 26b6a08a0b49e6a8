//! WASM bindings for the preview pipeline

use crate::{PreviewSession, ViewTab};
use js_sys::Array;
use std::time::Duration;
use wasm_bindgen::prelude::*;

/// Split an HTML snapshot into page fragments
#[wasm_bindgen]
pub fn paginate(html: &str) -> Array {
    crate::paginate(html)
        .into_iter()
        .map(|page| JsValue::from_str(&page))
        .collect()
}

/// Editor-session preview wrapper. Times are `performance.now()` milliseconds.
#[wasm_bindgen]
pub struct WasmPreviewSession {
    session: PreviewSession,
}

#[wasm_bindgen]
impl WasmPreviewSession {
    #[wasm_bindgen(constructor)]
    pub fn new(wait_ms: f64, client: &str) -> Result<WasmPreviewSession, JsValue> {
        let session = PreviewSession::builder()
            .debounce_wait(millis(wait_ms))
            .field("client", client)
            .build()
            .map_err(|err| JsValue::from_str(&err.to_string()))?;
        Ok(Self { session })
    }

    pub fn mount(&mut self, html: &str) {
        self.session.mount(html);
    }

    #[wasm_bindgen(js_name = contentChanged)]
    pub fn content_changed(&mut self, html: &str, now_ms: f64) {
        self.session.on_content_change(html, millis(now_ms));
    }

    /// True when a due snapshot changed the pages
    pub fn tick(&mut self, now_ms: f64) -> bool {
        self.session.tick(millis(now_ms))
    }

    /// Milliseconds timestamp of the pending pass, if any
    #[wasm_bindgen(js_name = nextDeadline)]
    pub fn next_deadline(&self) -> Option<f64> {
        self.session
            .next_deadline()
            .map(|deadline| deadline.as_secs_f64() * 1000.0)
    }

    pub fn pages(&self) -> Array {
        self.session
            .pages()
            .into_iter()
            .map(|page| JsValue::from_str(&page.html))
            .collect()
    }

    #[wasm_bindgen(js_name = renderPreview)]
    pub fn render_preview(&self) -> String {
        self.session.render_preview()
    }

    #[wasm_bindgen(js_name = printDocument)]
    pub fn print_document(&self) -> String {
        self.session.print_document()
    }

    #[wasm_bindgen(js_name = showPreview)]
    pub fn show_preview(&mut self, preview: bool) {
        let tab = if preview { ViewTab::Preview } else { ViewTab::Edit };
        self.session.set_active_tab(tab);
    }

    #[wasm_bindgen(js_name = isPreview)]
    pub fn is_preview(&self) -> bool {
        self.session.active_tab() == ViewTab::Preview
    }
}

fn millis(value: f64) -> Duration {
    if value.is_finite() && value > 0.0 {
        Duration::from_secs_f64(value / 1000.0)
    } else {
        Duration::ZERO
    }
}
