//! Bibliographic reference rows read from the uploaded workbook.

use serde::{Deserialize, Serialize};

/// One title/abstract pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceRow {
    pub title: String,
    pub abstract_text: String,
}

impl ReferenceRow {
    pub fn new(title: impl Into<String>, abstract_text: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            abstract_text: abstract_text.into(),
        }
    }

    /// Text block handed to the model for this reference.
    pub fn to_process(&self) -> String {
        format!(
            "- Title: {}\n- Abstract: {}",
            self.title, self.abstract_text
        )
    }
}
