use axum::{
    body::Body,
    extract::{Multipart, Query, State},
    http::{header, StatusCode},
    response::Response,
    Json,
};
use serde::Deserialize;
use std::path::PathBuf;
use tokio::io::AsyncWriteExt;
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::models::{FileRecord, UploadResponse};
use crate::services::TransferService;
use crate::AppState;

/// Upload a file and receive the retrieval secret.
/// POST /api/UploadTrigger, multipart form field `file`
pub async fn upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>> {
    let mut uploaded: Option<FileRecord> = None;

    while let Some(mut field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("malformed multipart body: {}", e)))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let filename = field
            .file_name()
            .map(str::to_string)
            .filter(|n| !n.is_empty())
            .ok_or_else(|| AppError::BadRequest("file field has no filename".to_string()))?;

        // Spool the field to a temp file before handing it to the blob
        // client. Removal afterwards is best effort only.
        let temp_path = temp_upload_path();
        let mut temp = tokio::fs::File::create(&temp_path).await?;
        while let Some(chunk) = field
            .chunk()
            .await
            .map_err(|e| AppError::BadRequest(format!("failed to read upload: {}", e)))?
        {
            temp.write_all(&chunk).await?;
        }
        temp.flush().await?;
        drop(temp);

        let result =
            TransferService::upload(&state.db, state.storage.as_ref(), &temp_path, &filename)
                .await;
        let _ = tokio::fs::remove_file(&temp_path).await;

        uploaded = Some(result?);
        break;
    }

    let record =
        uploaded.ok_or_else(|| AppError::BadRequest("missing form field: file".to_string()))?;

    Ok(Json(UploadResponse {
        status: StatusCode::OK.as_u16(),
        secret: record.secret,
    }))
}

fn temp_upload_path() -> PathBuf {
    std::env::temp_dir().join(format!("filer_upload_{}", Uuid::new_v4()))
}

// Quote a filename for the Content-Disposition header, escaping
// backslashes, quotes, and line breaks so the header stays well formed.
fn quoted(name: &str) -> String {
    let mut escaped = String::with_capacity(name.len() + 2);
    escaped.push('"');
    for c in name.chars() {
        match c {
            '\\' => escaped.push_str("\\\\"),
            '"' => escaped.push_str("\\\""),
            '\r' => escaped.push_str("\\r"),
            '\n' => escaped.push_str("\\n"),
            _ => escaped.push(c),
        }
    }
    escaped.push('"');
    escaped
}

#[derive(Debug, Deserialize)]
pub struct DownloadQuery {
    #[serde(default)]
    pub secret: String,
}

/// Download a file by presenting its secret.
/// GET /api/DownloadTrigger?secret=...
pub async fn download(
    State(state): State<AppState>,
    Query(query): Query<DownloadQuery>,
) -> Result<Response> {
    let (record, data) =
        TransferService::download(&state.db, state.storage.as_ref(), &query.secret).await?;

    let response = Response::builder()
        .status(StatusCode::OK)
        .header(header::CACHE_CONTROL, "no-store")
        .header(header::CONTENT_TYPE, "application/octet-stream")
        .header(header::CONTENT_LENGTH, data.len())
        .header(
            header::CONTENT_DISPOSITION,
            format!("attachment; filename={}", quoted(&record.filename)),
        )
        .body(Body::from(data))
        .map_err(|e| AppError::Internal(format!("failed to build response: {}", e)))?;

    Ok(response)
}
