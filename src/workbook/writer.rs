//! Appending worksheets to an existing xlsx package.
//!
//! The package is edited at the part level: existing parts are copied
//! untouched except for the workbook manifest, its relationships and the
//! content-type table, which each gain one entry for the new sheet.

use std::{
    borrow::Cow,
    io::{Cursor, Read, Write},
};

use quick_xml::{escape::escape, events::Event, Reader};
use tracing::{debug, info};
use zip::{write::FileOptions, CompressionMethod, ZipArchive, ZipWriter};

use super::{same_sheet_name, Cell, SheetTable, Workbook, WorkbookError};

const PACKAGE_RELS: &str = "_rels/.rels";
const CONTENT_TYPES: &str = "[Content_Types].xml";
const OFFICE_DOCUMENT_REL: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument";
const WORKSHEET_REL: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet";
const RELATIONSHIPS_NS: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
const SPREADSHEET_NS: &str = "http://schemas.openxmlformats.org/spreadsheetml/2006/main";
const WORKSHEET_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml";

struct Part {
    name: String,
    data: Vec<u8>,
    is_dir: bool,
}

/// Position of a closing tag and the namespace prefix it was written with.
struct Closing {
    offset: usize,
    prefix: Option<String>,
}

impl Workbook {
    /// Append `table` as a new worksheet called `name`, keeping every
    /// existing sheet as it is.
    pub fn append_sheet(&mut self, name: &str, table: &SheetTable) -> Result<(), WorkbookError> {
        let mut parts = read_parts(&self.bytes)?;

        let workbook_path = office_document_path(&parts)?;
        let (base_dir, file_name) = match workbook_path.rsplit_once('/') {
            Some((dir, file)) => (format!("{dir}/"), file.to_string()),
            None => (String::new(), workbook_path.clone()),
        };
        let rels_path = format!("{base_dir}_rels/{file_name}.rels");

        let workbook_xml = part_text(&parts, &workbook_path)?;
        let (sheet_names, max_sheet_id, rel_prefix) = sheet_manifest(&workbook_xml)?;
        if sheet_names.iter().any(|existing| same_sheet_name(existing, name)) {
            return Err(WorkbookError::SheetExists(name.to_string()));
        }

        let mut sheet_no = sheet_names.len() + 1;
        let sheet_path = loop {
            let candidate = format!("{base_dir}worksheets/sheet{sheet_no}.xml");
            if !parts.iter().any(|p| p.name == candidate) {
                break candidate;
            }
            sheet_no += 1;
        };
        let target = &sheet_path[base_dir.len()..];

        let rels_xml = part_text(&parts, &rels_path)?;
        let taken = attribute_values(&rels_xml, b"Relationship", "Id")?;
        let mut rel_no = taken.len() + 1;
        let rel_id = loop {
            let candidate = format!("rId{rel_no}");
            if !taken.contains(&candidate) {
                break candidate;
            }
            rel_no += 1;
        };

        let sheet_id = max_sheet_id + 1;
        let workbook_xml = insert_sheet_entry(&workbook_xml, name, sheet_id, &rel_id, rel_prefix)?;
        let rels_xml = insert_before_closing(
            &rels_xml,
            b"Relationships",
            "Relationship",
            &format!(r#" Id="{rel_id}" Type="{WORKSHEET_REL}" Target="{target}""#),
        )?;
        let content_types = insert_before_closing(
            &part_text(&parts, CONTENT_TYPES)?,
            b"Types",
            "Override",
            &format!(r#" PartName="/{sheet_path}" ContentType="{WORKSHEET_CONTENT_TYPE}""#),
        )?;

        replace_part(&mut parts, &workbook_path, workbook_xml);
        replace_part(&mut parts, &rels_path, rels_xml);
        replace_part(&mut parts, CONTENT_TYPES, content_types);
        parts.push(Part {
            name: sheet_path.clone(),
            data: sheet_xml(table).into_bytes(),
            is_dir: false,
        });

        self.bytes = write_parts(&parts)?;
        info!(sheet = %name, part = %sheet_path, rows = table.len(), "appended worksheet");
        Ok(())
    }
}

fn read_parts(bytes: &[u8]) -> Result<Vec<Part>, WorkbookError> {
    let mut archive = ZipArchive::new(Cursor::new(bytes))?;
    let mut parts = Vec::with_capacity(archive.len());
    for i in 0..archive.len() {
        let mut entry = archive.by_index(i)?;
        let mut data = Vec::with_capacity(entry.size() as usize);
        entry.read_to_end(&mut data)?;
        parts.push(Part {
            name: entry.name().to_string(),
            data,
            is_dir: entry.is_dir(),
        });
    }
    debug!(parts = parts.len(), "read xlsx package");
    Ok(parts)
}

fn write_parts(parts: &[Part]) -> Result<Vec<u8>, WorkbookError> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = FileOptions::default().compression_method(CompressionMethod::Deflated);
    for part in parts {
        if part.is_dir {
            writer.add_directory(part.name.as_str(), options)?;
        } else {
            writer.start_file(part.name.as_str(), options)?;
            writer.write_all(&part.data)?;
        }
    }
    Ok(writer.finish()?.into_inner())
}

fn part_text(parts: &[Part], name: &str) -> Result<String, WorkbookError> {
    let part = parts
        .iter()
        .find(|p| p.name == name)
        .ok_or_else(|| WorkbookError::MissingPart(name.to_string()))?;
    String::from_utf8(part.data.clone()).map_err(|_| WorkbookError::Encoding(name.to_string()))
}

fn replace_part(parts: &mut [Part], name: &str, text: String) {
    if let Some(part) = parts.iter_mut().find(|p| p.name == name) {
        part.data = text.into_bytes();
    }
}

/// Path of the main workbook part, from the package relationships.
fn office_document_path(parts: &[Part]) -> Result<String, WorkbookError> {
    let rels = part_text(parts, PACKAGE_RELS)?;
    let mut reader = Reader::from_str(&rels);
    loop {
        match reader.read_event()? {
            Event::Empty(e) | Event::Start(e) if e.local_name().as_ref() == b"Relationship" => {
                let is_office = match e.try_get_attribute("Type")? {
                    Some(kind) => kind.unescape_value()? == OFFICE_DOCUMENT_REL,
                    None => false,
                };
                if let (true, Some(target)) = (is_office, e.try_get_attribute("Target")?) {
                    return Ok(target.unescape_value()?.trim_start_matches('/').to_string());
                }
            }
            Event::Eof => return Err(WorkbookError::MissingPart("xl/workbook.xml".into())),
            _ => {}
        }
    }
}

/// Sheet names, the highest `sheetId` and the prefix bound to the
/// relationships namespace on the root element.
fn sheet_manifest(xml: &str) -> Result<(Vec<String>, u32, Option<String>), WorkbookError> {
    let mut reader = Reader::from_str(xml);
    let mut names = Vec::new();
    let mut max_id = 0u32;
    let mut rel_prefix = None;
    loop {
        match reader.read_event()? {
            Event::Start(e) if e.local_name().as_ref() == b"workbook" => {
                for attr in e.attributes() {
                    let attr = attr?;
                    let key = attr.key.as_ref();
                    if let Some(prefix) = key.strip_prefix(b"xmlns:") {
                        if attr.unescape_value()? == RELATIONSHIPS_NS {
                            rel_prefix = Some(String::from_utf8_lossy(prefix).into_owned());
                        }
                    }
                }
            }
            Event::Empty(e) | Event::Start(e) if e.local_name().as_ref() == b"sheet" => {
                if let Some(name) = e.try_get_attribute("name")? {
                    names.push(name.unescape_value()?.into_owned());
                }
                if let Some(id) = e.try_get_attribute("sheetId")? {
                    let id = id.unescape_value()?.parse().unwrap_or(0);
                    max_id = max_id.max(id);
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }
    Ok((names, max_id, rel_prefix))
}

fn attribute_values(xml: &str, element: &[u8], attr: &str) -> Result<Vec<String>, WorkbookError> {
    let mut reader = Reader::from_str(xml);
    let mut values = Vec::new();
    loop {
        match reader.read_event()? {
            Event::Empty(e) | Event::Start(e) if e.local_name().as_ref() == element => {
                if let Some(value) = e.try_get_attribute(attr)? {
                    values.push(value.unescape_value()?.into_owned());
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }
    Ok(values)
}

fn closing_tag(xml: &str, local: &[u8]) -> Result<Closing, WorkbookError> {
    let mut reader = Reader::from_str(xml);
    loop {
        let offset = reader.buffer_position() as usize;
        match reader.read_event()? {
            Event::End(e) if e.local_name().as_ref() == local => {
                let prefix = e
                    .name()
                    .prefix()
                    .map(|p| String::from_utf8_lossy(p.as_ref()).into_owned());
                return Ok(Closing { offset, prefix });
            }
            Event::Eof => {
                let element = String::from_utf8_lossy(local).into_owned();
                return Err(WorkbookError::MissingPart(format!("</{element}> element")));
            }
            _ => {}
        }
    }
}

/// Insert an empty `element` carrying `attrs` right before `</parent>`,
/// reusing the parent's namespace prefix.
fn insert_before_closing(
    xml: &str,
    parent: &[u8],
    element: &str,
    attrs: &str,
) -> Result<String, WorkbookError> {
    let closing = closing_tag(xml, parent)?;
    let tag = qualified(closing.prefix.as_deref(), element);
    Ok(splice(xml, closing.offset, &format!("<{tag}{attrs}/>")))
}

fn insert_sheet_entry(
    xml: &str,
    name: &str,
    sheet_id: u32,
    rel_id: &str,
    rel_prefix: Option<String>,
) -> Result<String, WorkbookError> {
    let closing = closing_tag(xml, b"sheets")?;
    let tag = qualified(closing.prefix.as_deref(), "sheet");
    let name = escape(name);
    let entry = match rel_prefix {
        Some(r) => format!(r#"<{tag} name="{name}" sheetId="{sheet_id}" {r}:id="{rel_id}"/>"#),
        None => format!(
            r#"<{tag} name="{name}" sheetId="{sheet_id}" xmlns:r="{RELATIONSHIPS_NS}" r:id="{rel_id}"/>"#
        ),
    };
    Ok(splice(xml, closing.offset, &entry))
}

fn qualified(prefix: Option<&str>, local: &str) -> String {
    match prefix {
        Some(p) => format!("{p}:{local}"),
        None => local.to_string(),
    }
}

fn splice(xml: &str, offset: usize, fragment: &str) -> String {
    let mut out = String::with_capacity(xml.len() + fragment.len());
    out.push_str(&xml[..offset]);
    out.push_str(fragment);
    out.push_str(&xml[offset..]);
    out
}

/// Worksheet part with inline strings, so the shared-string table is left alone.
fn sheet_xml(table: &SheetTable) -> String {
    let mut xml = format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<worksheet xmlns="{SPREADSHEET_NS}"><sheetData>"#
    );
    let header: Vec<Cell> = table.headers.iter().cloned().map(Cell::Text).collect();
    for (idx, row) in std::iter::once(&header).chain(table.rows.iter()).enumerate() {
        let row_no = idx + 1;
        xml.push_str(&format!(r#"<row r="{row_no}">"#));
        for (col, cell) in row.iter().enumerate() {
            let cell_ref = format!("{}{row_no}", column_letters(col));
            match cell {
                Cell::Text(text) => xml.push_str(&format!(
                    r#"<c r="{cell_ref}" t="inlineStr"><is><t xml:space="preserve">{}</t></is></c>"#,
                    escape(&*xml_text(text))
                )),
                Cell::Number(value) if value.is_finite() => {
                    xml.push_str(&format!(r#"<c r="{cell_ref}"><v>{value}</v></c>"#))
                }
                Cell::Number(_) | Cell::Empty => {}
            }
        }
        xml.push_str("</row>");
    }
    xml.push_str("</sheetData></worksheet>");
    xml
}

/// Drop characters XML 1.0 does not allow in text content.
fn xml_text(text: &str) -> Cow<'_, str> {
    if text.chars().all(is_xml_char) {
        Cow::Borrowed(text)
    } else {
        Cow::Owned(text.chars().filter(|c| is_xml_char(*c)).collect())
    }
}

fn is_xml_char(c: char) -> bool {
    matches!(
        c,
        '\t' | '\n' | '\r' | '\u{20}'..='\u{D7FF}' | '\u{E000}'..='\u{FFFD}' | '\u{10000}'..='\u{10FFFF}'
    )
}

/// Zero-based column index to spreadsheet letters: 0 → A, 26 → AA.
pub fn column_letters(mut index: usize) -> String {
    let mut letters = Vec::new();
    loop {
        letters.push(b'A' + (index % 26) as u8);
        if index < 26 {
            break;
        }
        index = index / 26 - 1;
    }
    letters.reverse();
    String::from_utf8_lossy(&letters).into_owned()
}
