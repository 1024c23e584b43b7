// Async facade: resolve parsed scenes through a JS Promise after an artificial delay,
// so the SPA can show its progress indicator. No retries, no partial results, no cancellation.

use js_sys::{Function, Promise};
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::{future_to_promise, JsFuture};

use crate::error::ScriptError;
use crate::parser::ScriptParser;

/// Delay used when the caller does not pass one.
pub const DEFAULT_DELAY_MS: u32 = 400;

#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_name = setTimeout)]
    fn set_timeout(handler: &Function, timeout: i32) -> JsValue;
}

/// Parse a script with the default configuration and resolve with the Scene JSON.
///
/// Rejects with an `Invalid input` message when `script_text` is not a string.
#[wasm_bindgen(js_name = parseScriptAsync)]
pub fn parse_script_async(
    script_text: JsValue,
    project_id: String,
    delay_ms: Option<u32>,
) -> Promise {
    parse_deferred(ScriptParser::default(), script_text, project_id, delay_ms)
}

/// Shared body of the async entry points.
pub(crate) fn parse_deferred(
    parser: ScriptParser,
    script_text: JsValue,
    project_id: String,
    delay_ms: Option<u32>,
) -> Promise {
    future_to_promise(async move {
        let script_text = script_text_from_js(&script_text)?;
        sleep(delay_ms.unwrap_or(DEFAULT_DELAY_MS)).await?;
        let json = parser.parse_to_json(&script_text, &project_id)?;
        Ok::<JsValue, JsValue>(JsValue::from_str(&json))
    })
}

fn script_text_from_js(value: &JsValue) -> Result<String, ScriptError> {
    value
        .as_string()
        .ok_or_else(|| ScriptError::InvalidInput("script text must be a string".to_string()))
}

async fn sleep(ms: u32) -> Result<(), JsValue> {
    let timeout = i32::try_from(ms).unwrap_or(i32::MAX);
    let promise = Promise::new(&mut |resolve, _reject| {
        set_timeout(&resolve, timeout);
    });
    JsFuture::from(promise).await.map(|_| ())
}
