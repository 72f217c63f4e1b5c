use thiserror::Error;
use wasm_bindgen::JsValue;

#[derive(Error, Debug)]
pub enum PageError {
    #[error("element not found: {0}")]
    MissingElement(&'static str),

    #[error("request to {url} failed with status {status}")]
    Status { url: String, status: u16 },

    #[error("request to {0} timed out")]
    Timeout(String),

    #[error("malformed json: {0}")]
    Json(#[from] serde_json::Error),

    #[error("javascript error: {0}")]
    Js(String),
}

impl From<JsValue> for PageError {
    fn from(value: JsValue) -> Self {
        let detail = value
            .as_string()
            .or_else(|| {
                js_sys::Reflect::get(&value, &JsValue::from_str("message"))
                    .ok()
                    .and_then(|m| m.as_string())
            })
            .unwrap_or_else(|| format!("{value:?}"));
        PageError::Js(detail)
    }
}

impl From<serde_wasm_bindgen::Error> for PageError {
    fn from(value: serde_wasm_bindgen::Error) -> Self {
        PageError::Js(value.to_string())
    }
}
