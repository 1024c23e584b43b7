// Typed errors with thiserror. Surface meaningful messages to JS.
// The parsing core itself never fails; only the boundaries (config, JS input, JSON) do.

use thiserror::Error;
use wasm_bindgen::JsValue;

/// Errors raised at the edges of the script engine.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScriptError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for ScriptError {
    fn from(err: serde_json::Error) -> Self {
        ScriptError::Serialization(err.to_string())
    }
}

impl From<ScriptError> for JsValue {
    fn from(err: ScriptError) -> Self {
        JsValue::from_str(&err.to_string())
    }
}
