#![allow(dead_code)]

use std::{
    collections::VecDeque,
    io::{Cursor, Write},
    sync::{
        atomic::{AtomicUsize, Ordering},
        Mutex,
    },
};

use async_trait::async_trait;
use biblio_assistant::llm::{ChatError, ChatRequest, ChatResponse, ChatTransport};
use zip::{write::FileOptions, ZipWriter};

/// The Hong Kong few-shot answer, rewritten as valid JSON.
pub const HONG_KONG_REPLY: &str = r#"{"Objeto de Análise": "Prática educacional", "Metodologia": "Entrevistas", "Escala de Análise": "Local", "País": "Hong Kong", "Política/ prática": "Prática", "Classificação": 4}"#;

/// Build a minimal xlsx package whose sheets hold inline strings.
pub fn workbook(sheets: &[(&str, Vec<Vec<&str>>)]) -> Vec<u8> {
    let mut content_types = String::from(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/>"#,
    );
    let mut sheet_entries = String::new();
    let mut rels = String::from(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
    );
    let mut sheet_parts = Vec::new();
    for (idx, (name, rows)) in sheets.iter().enumerate() {
        let n = idx + 1;
        content_types.push_str(&format!(
            r#"<Override PartName="/xl/worksheets/sheet{n}.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/>"#
        ));
        sheet_entries.push_str(&format!(
            r#"<sheet name="{}" sheetId="{n}" r:id="rId{n}"/>"#,
            escape(name)
        ));
        rels.push_str(&format!(
            r#"<Relationship Id="rId{n}" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet{n}.xml"/>"#
        ));
        sheet_parts.push((format!("xl/worksheets/sheet{n}.xml"), sheet(rows)));
    }
    content_types.push_str("</Types>");
    rels.push_str("</Relationships>");
    let workbook_xml = format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"><sheets>{sheet_entries}</sheets></workbook>"#
    );
    let package_rels = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml"/></Relationships>"#;

    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let options = FileOptions::default();
    let mut add = |name: &str, body: &str| {
        zip.start_file(name, options).unwrap();
        zip.write_all(body.as_bytes()).unwrap();
    };
    add("[Content_Types].xml", &content_types);
    add("_rels/.rels", package_rels);
    add("xl/workbook.xml", &workbook_xml);
    add("xl/_rels/workbook.xml.rels", &rels);
    for (name, body) in &sheet_parts {
        add(name, body);
    }
    zip.finish().unwrap().into_inner()
}

/// Single-sheet workbook with a `Title`/`Abstract` header.
pub fn references(rows: &[(&str, &str)]) -> Vec<u8> {
    let mut data = vec![vec!["Title", "Abstract"]];
    data.extend(rows.iter().map(|(t, a)| vec![*t, *a]));
    workbook(&[("Sheet1", data)])
}

fn sheet(rows: &[Vec<&str>]) -> String {
    let mut xml = String::from(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><sheetData>"#,
    );
    for (r, row) in rows.iter().enumerate() {
        xml.push_str(&format!(r#"<row r="{}">"#, r + 1));
        for (c, value) in row.iter().enumerate() {
            if value.is_empty() {
                continue;
            }
            let col = (b'A' + c as u8) as char;
            xml.push_str(&format!(
                r#"<c r="{col}{}" t="inlineStr"><is><t>{}</t></is></c>"#,
                r + 1,
                escape(value)
            ));
        }
        xml.push_str("</row>");
    }
    xml.push_str("</sheetData></worksheet>");
    xml
}

fn escape(raw: &str) -> String {
    raw.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// Transport replaying a fixed script of outcomes, recording every request.
#[derive(Default)]
pub struct ScriptedTransport {
    script: Mutex<VecDeque<Result<ChatResponse, ChatError>>>,
    requests: Mutex<Vec<ChatRequest>>,
    calls: AtomicUsize,
}

impl ScriptedTransport {
    pub fn new(script: Vec<Result<ChatResponse, ChatError>>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            ..Self::default()
        }
    }

    pub fn replies(replies: &[&str]) -> Self {
        Self::new(
            replies
                .iter()
                .map(|r| Ok(ChatResponse::from_content(*r)))
                .collect(),
        )
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn requests(&self) -> Vec<ChatRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChatTransport for ScriptedTransport {
    async fn complete(&self, request: &ChatRequest) -> Result<ChatResponse, ChatError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push(request.clone());
        self.script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(transport_failure()))
    }
}

/// Transport answering every request with a reply naming the row's title as
/// the country, so output order can be checked against input order.
#[derive(Default)]
pub struct EchoTransport {
    calls: AtomicUsize,
}

impl EchoTransport {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ChatTransport for EchoTransport {
    async fn complete(&self, request: &ChatRequest) -> Result<ChatResponse, ChatError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let last = &request.messages.last().unwrap().content;
        let title = last
            .lines()
            .next()
            .and_then(|line| line.strip_prefix("- Title: "))
            .unwrap_or_default();
        let reply = serde_json::json!({
            "Objeto de Análise": "Prática educacional",
            "Metodologia": "Entrevistas",
            "Escala de Análise": "Local",
            "País": title,
            "Política/prática": "Prática",
            "Classificação": 2,
        });
        Ok(ChatResponse::from_content(format!(
            "```json\n{}\n```",
            serde_json::to_string_pretty(&reply).unwrap()
        )))
    }
}

pub fn transport_failure() -> ChatError {
    ChatError::Transport("connection reset by peer".into())
}
