use photoday_sim::ConfigError;

/// Failures surfaced to the host page.
#[derive(Debug, thiserror::Error)]
pub enum WebError {
    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Could not read value from JavaScript: {0}")]
    Conversion(String),
}

#[cfg(target_arch = "wasm32")]
impl From<WebError> for wasm_bindgen::JsValue {
    fn from(err: WebError) -> Self {
        js_sys::Error::new(&err.to_string()).into()
    }
}

#[cfg(target_arch = "wasm32")]
impl From<serde_wasm_bindgen::Error> for WebError {
    fn from(err: serde_wasm_bindgen::Error) -> Self {
        Self::Conversion(err.to_string())
    }
}
