//! Cleanup and decoding of model replies.

use serde_json::{Map, Value};

use super::prediction::Prediction;

/// Reasons a reply could not become a prediction.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("reply is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("reply decoded to {0}, expected a JSON object")]
    NotAnObject(&'static str),

    #[error("classification must be an integer from 1 to 4, got {0}")]
    Classification(String),

    #[error("reply is missing the {0:?} field")]
    Field(String),
}

/// Strip code fences, the literal `json` tag and every newline.
pub fn clean(raw: &str) -> String {
    raw.replace("```", "").replace("json", "").replace('\n', "")
}

/// Decode a cleaned reply as a JSON object.
pub fn parse(raw: &str) -> Result<Map<String, Value>, ParseError> {
    match serde_json::from_str::<Value>(&clean(raw))? {
        Value::Object(map) => Ok(map),
        other => Err(ParseError::NotAnObject(kind(&other))),
    }
}

/// Decode a reply straight into a [`Prediction`].
pub fn parse_prediction(raw: &str) -> Result<Prediction, ParseError> {
    Prediction::from_object(&parse(raw)?)
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
