//! Error handling for the browser bindings.
//!
//! Errors cross into JavaScript as `Error` objects carrying a `code`
//! property, so callers can branch without parsing messages.

use wasm_bindgen::prelude::*;
use waymark::ConfigError;

/// Error codes exposed to JavaScript.
#[wasm_bindgen]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    /// The configuration object was malformed or invalid.
    Config,
    /// A browser global (`window`, `document`, ...) was unavailable.
    Environment,
    /// A DOM call failed.
    Dom,
    /// The runtime was used after being destroyed or while busy.
    State,
}

impl ErrorCode {
    fn as_str(self) -> &'static str {
        match self {
            Self::Config => "CONFIG_ERROR",
            Self::Environment => "ENVIRONMENT_ERROR",
            Self::Dom => "DOM_ERROR",
            Self::State => "STATE_ERROR",
        }
    }
}

/// Errors raised by the browser bindings.
#[derive(Debug, thiserror::Error)]
pub enum WebError {
    /// Configuration failed to deserialize or validate.
    #[error("Invalid navigation config: {0}")]
    Config(#[from] ConfigError),

    /// The JavaScript config value could not be converted.
    #[error("Invalid navigation config: {0}")]
    ConfigValue(String),

    /// A required browser global is missing.
    #[error("Browser global '{0}' is not available")]
    MissingGlobal(&'static str),

    /// A DOM API call threw.
    #[error("DOM call '{call}' failed: {message}")]
    Dom { call: &'static str, message: String },

    /// The runtime is already borrowed by a running handler or was destroyed.
    #[error("Navigation runtime is unavailable")]
    Unavailable,
}

impl WebError {
    /// Wrap a thrown JavaScript value.
    pub fn dom(call: &'static str, value: JsValue) -> Self {
        let message = value
            .as_string()
            .or_else(|| {
                value
                    .dyn_ref::<js_sys::Error>()
                    .map(|err| String::from(err.message()))
            })
            .unwrap_or_else(|| format!("{value:?}"));
        Self::Dom { call, message }
    }

    /// The JavaScript-facing code.
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::Config(_) | Self::ConfigValue(_) => ErrorCode::Config,
            Self::MissingGlobal(_) => ErrorCode::Environment,
            Self::Dom { .. } => ErrorCode::Dom,
            Self::Unavailable => ErrorCode::State,
        }
    }
}

impl From<serde_wasm_bindgen::Error> for WebError {
    fn from(err: serde_wasm_bindgen::Error) -> Self {
        Self::ConfigValue(err.to_string())
    }
}

impl From<WebError> for JsValue {
    fn from(err: WebError) -> Self {
        let js_error = js_sys::Error::new(&err.to_string());
        js_sys::Reflect::set(
            &js_error,
            &"code".into(),
            &JsValue::from_str(err.code().as_str()),
        )
        .ok();
        js_error.into()
    }
}

/// Result alias for the browser bindings.
pub type WebResult<T> = Result<T, WebError>;
