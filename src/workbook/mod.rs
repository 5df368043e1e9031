//! Spreadsheet workbook access: reference rows in, result sheets out.

pub mod reader;
pub mod writer;

use crate::biblio::{Prediction, PREDICTION_COLUMNS};

/// Name of the sheet holding model output.
pub const PREDICTIONS_SHEET: &str = "Predictions";

/// Errors raised while reading or extending a workbook.
#[derive(Debug, thiserror::Error)]
pub enum WorkbookError {
    #[error("unable to open workbook: {0}")]
    Open(#[from] calamine::XlsxError),

    #[error("invalid xlsx container: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("malformed workbook XML: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("malformed workbook XML attribute: {0}")]
    Attr(#[from] quick_xml::events::attributes::AttrError),

    #[error("workbook I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("workbook part {0} is not valid UTF-8")]
    Encoding(String),

    #[error("workbook contains no worksheets")]
    NoSheets,

    #[error("first worksheet has no header row")]
    EmptySheet,

    #[error("first worksheet is missing required column {0:?}")]
    MissingColumn(String),

    #[error("a sheet named {0:?} already exists")]
    SheetExists(String),

    #[error("workbook is missing part {0}")]
    MissingPart(String),
}

/// Sheet names are compared case-insensitively.
pub(crate) fn same_sheet_name(a: &str, b: &str) -> bool {
    a.to_lowercase() == b.to_lowercase()
}

/// Cell value written to a generated sheet.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Text(String),
    Number(f64),
    Empty,
}

/// Header plus rows, ready to become a worksheet.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SheetTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

impl SheetTable {
    /// Result table for a batch, one row per prediction in input order.
    pub fn from_predictions(predictions: &[Prediction]) -> Self {
        let headers = PREDICTION_COLUMNS.iter().map(|c| c.to_string()).collect();
        let rows = predictions
            .iter()
            .map(|p| {
                let mut row: Vec<Cell> = p
                    .text_cells()
                    .iter()
                    .map(|text| Cell::Text(text.to_string()))
                    .collect();
                row.push(Cell::Number(f64::from(p.classification.get())));
                row
            })
            .collect();
        Self { headers, rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// An `.xlsx` workbook held in memory.
#[derive(Debug, Clone)]
pub struct Workbook {
    bytes: Vec<u8>,
}

impl Workbook {
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            bytes: bytes.into(),
        }
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}
