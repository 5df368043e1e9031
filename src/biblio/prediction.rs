//! Structured fields extracted from one model reply.

use std::fmt;

use serde::Serialize;
use serde_json::{Map, Value};

use super::parse::ParseError;

pub const OBJECT_OF_ANALYSIS: &str = "Objeto de Análise";
pub const METHODOLOGY: &str = "Metodologia";
pub const SCALE_OF_ANALYSIS: &str = "Escala de Análise";
pub const COUNTRY: &str = "País";
pub const POLICY_OR_PRACTICE: &str = "Política/prática";
pub const CLASSIFICATION: &str = "Classificação";

/// Spelling used by the few-shot answers; accepted as a synonym.
const POLICY_OR_PRACTICE_SPACED: &str = "Política/ prática";

/// Column order of the `Predictions` sheet.
pub const PREDICTION_COLUMNS: [&str; 6] = [
    OBJECT_OF_ANALYSIS,
    METHODOLOGY,
    SCALE_OF_ANALYSIS,
    COUNTRY,
    POLICY_OR_PRACTICE,
    CLASSIFICATION,
];

/// Research category 1 through 4.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct Classification(u8);

impl Classification {
    pub fn new(value: u8) -> Option<Self> {
        (1..=4).contains(&value).then_some(Self(value))
    }

    pub fn get(self) -> u8 {
        self.0
    }

    fn from_value(value: &Value) -> Option<Self> {
        let number = match value {
            Value::Number(n) => n
                .as_u64()
                .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as u64)),
            Value::String(s) => s.trim().parse::<u64>().ok(),
            _ => None,
        }?;
        u8::try_from(number).ok().and_then(Self::new)
    }
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One decoded reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Prediction {
    #[serde(rename = "Objeto de Análise")]
    pub object_of_analysis: String,
    #[serde(rename = "Metodologia")]
    pub methodology: String,
    #[serde(rename = "Escala de Análise")]
    pub scale_of_analysis: String,
    #[serde(rename = "País")]
    pub country: String,
    #[serde(rename = "Política/prática")]
    pub policy_or_practice: String,
    #[serde(rename = "Classificação")]
    pub classification: Classification,
}

impl Prediction {
    /// Typed view of a decoded JSON object.
    ///
    /// Missing text fields become empty strings; scalars are stringified and
    /// arrays joined with `"; "`.
    pub fn from_object(object: &Map<String, Value>) -> Result<Self, ParseError> {
        let raw_class = object
            .get(CLASSIFICATION)
            .ok_or_else(|| ParseError::Field(CLASSIFICATION.to_string()))?;
        let classification = Classification::from_value(raw_class)
            .ok_or_else(|| ParseError::Classification(raw_class.to_string()))?;

        Ok(Self {
            object_of_analysis: text(object, OBJECT_OF_ANALYSIS),
            methodology: text(object, METHODOLOGY),
            scale_of_analysis: text(object, SCALE_OF_ANALYSIS),
            country: text(object, COUNTRY),
            policy_or_practice: object
                .get(POLICY_OR_PRACTICE)
                .or_else(|| object.get(POLICY_OR_PRACTICE_SPACED))
                .map(render)
                .unwrap_or_default(),
            classification,
        })
    }

    /// Text cells in sheet column order; the classification is the sixth column.
    pub fn text_cells(&self) -> [&str; 5] {
        [
            self.object_of_analysis.as_str(),
            self.methodology.as_str(),
            self.scale_of_analysis.as_str(),
            self.country.as_str(),
            self.policy_or_practice.as_str(),
        ]
    }
}

fn text(object: &Map<String, Value>, key: &str) -> String {
    object.get(key).map(render).unwrap_or_default()
}

fn render(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Array(items) => items.iter().map(render).collect::<Vec<_>>().join("; "),
        other => other.to_string(),
    }
}
