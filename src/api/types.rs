//! Page templates and JSON payloads.

use askama::Template;
use serde::Serialize;

pub const PAGE_TITLE: &str = "📚 Biblio Assistant 🤓";
pub const THANK_YOU_TOAST: &str = "Thanks for using Biblio Assistant!";

/// Single-page upload UI.
#[derive(Template)]
#[template(path = "index.html")]
pub struct IndexPage<'a> {
    pub title: &'a str,
    pub toast: &'a str,
    pub uploader_key: u64,
    pub download_name: &'a str,
}

#[derive(Debug, Clone, Serialize)]
pub struct UploaderKeyDto {
    pub uploader_key: u64,
}
