//! Reading workbooks through calamine.

use std::io::Cursor;

use calamine::{open_workbook_from_rs, Data, Range, Reader, Xlsx};
use tracing::debug;

use crate::biblio::ReferenceRow;

use super::{Workbook, WorkbookError};

const TITLE_COLUMN: &str = "Title";
const ABSTRACT_COLUMN: &str = "Abstract";

impl Workbook {
    fn open(&self) -> Result<Xlsx<Cursor<&[u8]>>, WorkbookError> {
        let workbook: Xlsx<_> = open_workbook_from_rs(Cursor::new(self.bytes.as_slice()))?;
        Ok(workbook)
    }

    /// Sheet names in workbook order.
    pub fn sheet_names(&self) -> Result<Vec<String>, WorkbookError> {
        Ok(self.open()?.sheet_names())
    }

    /// Every row of a named sheet, rendered as text.
    pub fn sheet_rows(&self, name: &str) -> Result<Vec<Vec<String>>, WorkbookError> {
        let range = self.open()?.worksheet_range(name)?;
        Ok(render_rows(&range))
    }

    /// Reference rows from the first sheet, located by the `Title` and
    /// `Abstract` headers. Rows with both cells blank are skipped.
    pub fn read_references(&self) -> Result<Vec<ReferenceRow>, WorkbookError> {
        Ok(self
            .read_numbered_references()?
            .into_iter()
            .map(|(_, reference)| reference)
            .collect())
    }

    /// Like [`Workbook::read_references`], paired with the 1-based sheet
    /// row each reference was read from.
    pub fn read_numbered_references(&self) -> Result<Vec<(usize, ReferenceRow)>, WorkbookError> {
        let range = self
            .open()?
            .worksheet_range_at(0)
            .ok_or(WorkbookError::NoSheets)??;
        let first_row = range.start().map_or(0, |(row, _)| row as usize);
        let mut rows = render_rows(&range).into_iter();
        let header = rows.next().ok_or(WorkbookError::EmptySheet)?;
        let title_idx = column_index(&header, TITLE_COLUMN)?;
        let abstract_idx = column_index(&header, ABSTRACT_COLUMN)?;

        let mut references = Vec::new();
        for (offset, row) in rows.enumerate() {
            let sheet_row = first_row + offset + 2;
            let title = row.get(title_idx).cloned().unwrap_or_default();
            let abstract_text = row.get(abstract_idx).cloned().unwrap_or_default();
            if title.trim().is_empty() && abstract_text.trim().is_empty() {
                debug!(row = sheet_row, "skipping blank reference row");
                continue;
            }
            references.push((
                sheet_row,
                ReferenceRow {
                    title,
                    abstract_text,
                },
            ));
        }
        Ok(references)
    }

    /// Whether a sheet with this name exists, ignoring case the way
    /// spreadsheet applications do.
    pub fn has_sheet(&self, name: &str) -> Result<bool, WorkbookError> {
        Ok(self
            .sheet_names()?
            .iter()
            .any(|existing| super::same_sheet_name(existing, name)))
    }
}

fn column_index(header: &[String], name: &str) -> Result<usize, WorkbookError> {
    header
        .iter()
        .position(|h| h.trim() == name)
        .ok_or_else(|| WorkbookError::MissingColumn(name.to_string()))
}

fn render_rows(range: &Range<Data>) -> Vec<Vec<String>> {
    range
        .rows()
        .map(|row| row.iter().map(|cell| cell.to_string()).collect())
        .collect()
}
