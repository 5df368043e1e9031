//! HTTP route handlers for Axum.

use std::sync::atomic::Ordering;

use askama::Template;
use axum::{
    extract::{Multipart, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse, Response},
    Json,
};
use tracing::{info, warn};

use crate::{
    api::types::{IndexPage, UploaderKeyDto, PAGE_TITLE, THANK_YOU_TOAST},
    cli::process::OUTPUT_FILE_NAME,
    llm::ChatTransport,
    pipeline::{self, PipelineError},
};

use super::AppState;

type ApiResult<T> = Result<T, (StatusCode, String)>;

const XLSX_MIME: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";
const UPLOAD_FIELD: &str = "file";

pub async fn index<T: ChatTransport + 'static>(
    State(state): State<AppState<T>>,
) -> ApiResult<Html<String>> {
    let page = IndexPage {
        title: PAGE_TITLE,
        toast: THANK_YOU_TOAST,
        uploader_key: state.uploader_key.load(Ordering::SeqCst),
        download_name: OUTPUT_FILE_NAME,
    };
    page.render()
        .map(Html)
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))
}

pub async fn predict<T: ChatTransport + 'static>(
    State(state): State<AppState<T>>,
    mut multipart: Multipart,
) -> ApiResult<Response> {
    let upload = read_upload(&mut multipart).await?;
    let output = pipeline::process(state.client.as_ref(), &upload)
        .await
        .map_err(|err| {
            warn!(%err, "batch aborted");
            (pipeline_status(&err), err.to_string())
        })?;
    info!(
        predictions = output.predictions.len(),
        "returning predictions workbook"
    );
    let disposition = format!("attachment; filename=\"{OUTPUT_FILE_NAME}\"");
    let headers = [
        (header::CONTENT_TYPE, XLSX_MIME.to_string()),
        (header::CONTENT_DISPOSITION, disposition),
    ];
    Ok((headers, output.workbook).into_response())
}

pub async fn reset_uploader<T: ChatTransport + 'static>(
    State(state): State<AppState<T>>,
) -> Json<UploaderKeyDto> {
    let uploader_key = state.uploader_key.fetch_add(1, Ordering::SeqCst) + 1;
    Json(UploaderKeyDto { uploader_key })
}

async fn read_upload(multipart: &mut Multipart) -> ApiResult<Vec<u8>> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| (e.status(), e.to_string()))?
    {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }
        if let Some(name) = field.file_name() {
            if !name.to_ascii_lowercase().ends_with(".xlsx") {
                return Err((
                    StatusCode::UNPROCESSABLE_ENTITY,
                    format!("{name} is not an .xlsx workbook"),
                ));
            }
        }
        let bytes = field.bytes().await.map_err(|e| (e.status(), e.to_string()))?;
        if bytes.is_empty() {
            return Err((
                StatusCode::UNPROCESSABLE_ENTITY,
                "uploaded file is empty".to_string(),
            ));
        }
        return Ok(bytes.to_vec());
    }
    Err((
        StatusCode::UNPROCESSABLE_ENTITY,
        format!("multipart field {UPLOAD_FIELD:?} is missing"),
    ))
}

fn pipeline_status(err: &PipelineError) -> StatusCode {
    match err {
        PipelineError::Workbook(_) => StatusCode::UNPROCESSABLE_ENTITY,
        PipelineError::Chat { .. } | PipelineError::Parse { .. } => StatusCode::BAD_GATEWAY,
    }
}
