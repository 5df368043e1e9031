//! Reference rows, prompt construction and reply decoding.

pub mod parse;
pub mod prediction;
pub mod prompt;
pub mod row;

pub use parse::{clean, parse, parse_prediction, ParseError};
pub use prediction::{Classification, Prediction, PREDICTION_COLUMNS};
pub use prompt::{build, Conversation};
pub use row::ReferenceRow;
