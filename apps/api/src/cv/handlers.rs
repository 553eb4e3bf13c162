//! Axum route handlers for CV upload and improvement.

use axum::{
    extract::{Multipart, State},
    Json,
};
use bytes::Bytes;
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::info;

use crate::cv::extract::{extract_text, sniff};
use crate::cv::processor::{CvProcessor, ImprovedCv};
use crate::errors::{AppError, AppJson};
use crate::state::AppState;

const FILE_FIELD: &str = "file";

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub structured_data: Map<String, Value>,
}

#[derive(Debug, Serialize)]
pub struct ImproveResponse {
    pub improved_cv: ImprovedCv,
}

/// POST /upload/
///
/// Accepts a PDF or DOCX CV as multipart field `file`, extracts its text and
/// returns it structured per section.
pub async fn handle_upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, AppError> {
    let mut upload: Option<(String, Bytes)> = None;
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }
        let file_name = field.file_name().unwrap_or_default().to_string();
        let data = field.bytes().await?;
        upload = Some((file_name, data));
        break;
    }

    let (file_name, data) = upload.ok_or_else(|| {
        AppError::Validation(format!("Missing multipart field '{FILE_FIELD}'"))
    })?;

    let kind = sniff(&file_name, &data)?;
    let size = data.len();
    let text = extract_text(kind, data).await?;
    info!(
        file_name = %file_name,
        kind = kind.label(),
        bytes = size,
        chars = text.chars().count(),
        "Extracted CV text"
    );

    let processor = CvProcessor::new(state.rewriter.as_ref(), state.config.cv_chunk_chars);
    let structured_data = processor.process_cv(&text).await?;

    Ok(Json(UploadResponse { structured_data }))
}

/// POST /improve/
///
/// Rewrites every text field of a structured CV and adds one suggestion per section.
pub async fn handle_improve(
    State(state): State<AppState>,
    AppJson(cv_data): AppJson<Value>,
) -> Result<Json<ImproveResponse>, AppError> {
    let cv = cv_data
        .as_object()
        .ok_or_else(|| AppError::Validation("CV data must be a JSON object".to_string()))?;
    if cv.is_empty() {
        return Err(AppError::Validation("CV data cannot be empty".to_string()));
    }

    let processor = CvProcessor::new(state.rewriter.as_ref(), state.config.cv_chunk_chars);
    let improved_cv = processor.improve_cv(cv).await?;

    Ok(Json(ImproveResponse { improved_cv }))
}
