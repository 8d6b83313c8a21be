use wasm_bindgen::JsValue;
use web_sys::{Document, Window};

use webgro_core::{Error, Result};

/// Error crossing into JavaScript, as its message string.
pub fn js_error(err: Error) -> JsValue {
    JsValue::from_str(&err.to_string())
}

/// Failure reported by a browser API.
pub fn host_error(value: JsValue) -> Error {
    Error::Host(value.as_string().unwrap_or_else(|| format!("{value:?}")))
}

pub fn window() -> Result<Window> {
    web_sys::window().ok_or_else(|| Error::Host("no global window".into()))
}

pub fn document() -> Result<Document> {
    window()?
        .document()
        .ok_or_else(|| Error::Host("window has no document".into()))
}
