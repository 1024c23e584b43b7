// storyboard_core: Storyboard Rust/WASM engine
// Screenplay text in, Scene records out. JS is plumbing; parsing rules live here.

mod classifier;
mod dialogue;
mod error;
mod facade;
mod ids;
mod parser;
mod sample;
mod scene_builder;
mod types;

use wasm_bindgen::prelude::*;

pub use classifier::{LineClassifier, LineKind};
pub use dialogue::DialogueAccumulator;
pub use error::ScriptError;
pub use facade::{parse_script_async, DEFAULT_DELAY_MS};
pub use ids::{IdGenerator, RandomIds, SequentialIds};
pub use parser::{parse_script, ScriptParser};
pub use sample::SAMPLE_SCRIPT;
pub use scene_builder::{BuilderState, SceneBuilder};
pub use types::*;

/// Initialize panic hook for better error messages in browser console.
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

/// Script engine handle exposed to JavaScript.
/// Whole scripts cross the boundary in one call; results come back as JSON.
#[wasm_bindgen]
pub struct ScriptEngine {
    parser: ScriptParser,
}

#[wasm_bindgen]
impl ScriptEngine {
    #[wasm_bindgen(constructor)]
    pub fn new(config_json: &str) -> Result<ScriptEngine, JsValue> {
        let config = ParserConfig::from_json(config_json)?;
        Ok(ScriptEngine {
            parser: ScriptParser::new(config),
        })
    }

    /// Parse a script and return its scenes as a JSON array.
    pub fn parse(&self, script_text: &str, project_id: &str) -> Result<String, JsValue> {
        Ok(self.parser.parse_to_json(script_text, project_id)?)
    }

    /// Same as `parse`, resolved through a Promise after `delay_ms` (default 400ms).
    #[wasm_bindgen(js_name = parseAsync)]
    pub fn parse_async(
        &self,
        script_text: JsValue,
        project_id: String,
        delay_ms: Option<u32>,
    ) -> js_sys::Promise {
        facade::parse_deferred(self.parser.clone(), script_text, project_id, delay_ms)
    }

    /// Effective configuration as JSON, defaults filled in.
    pub fn config(&self) -> Result<String, JsValue> {
        serde_json::to_string(self.parser.config())
            .map_err(|e| JsValue::from(ScriptError::from(e)))
    }
}

/// The bundled demo script.
#[wasm_bindgen(js_name = sampleScript)]
pub fn sample_script() -> String {
    SAMPLE_SCRIPT.to_string()
}
