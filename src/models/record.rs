use serde::Serialize;
use sqlx::FromRow;

/// One uploaded file. Created after a successful blob upload, looked up
/// by secret on download, never updated or deleted.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct FileRecord {
    pub id: String,
    /// Blob store reference for the uploaded bytes.
    pub blob_url: String,
    /// Retrieval credential; unique per record.
    pub secret: String,
    /// Original upload name, used for the attachment header.
    pub filename: String,
    pub created_at: String,
}

/// Upload success response body
#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub status: u16,
    pub secret: String,
}
