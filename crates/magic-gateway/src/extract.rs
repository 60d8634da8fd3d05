//! Best-effort recovery of a JSON object from free-form model text.
//!
//! The span runs from the first `{` to the last `}`. Prose containing braces
//! before or after the real object, or two top-level objects, select the wrong
//! span and fail to parse. Nothing smarter is attempted.

use magic_core::{MagicError, Result};
use serde_json::{Map, Value};

pub fn extract_json_object(text: &str) -> Result<Map<String, Value>> {
    let (start, end) = match (text.find('{'), text.rfind('}')) {
        (Some(start), Some(end)) if start < end => (start, end),
        _ => return Err(MagicError::MalformedModelOutput("no JSON object found in model output".into())),
    };
    match serde_json::from_str::<Value>(&text[start..=end]) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err(MagicError::MalformedModelOutput("model output is not a JSON object".into())),
        Err(e) => Err(MagicError::MalformedModelOutput(format!(
            "invalid JSON at line {} column {}",
            e.line(),
            e.column()
        ))),
    }
}
