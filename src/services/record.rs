use chrono::Utc;
use uuid::Uuid;

use crate::db::Database;
use crate::error::Result;
use crate::models::FileRecord;

pub struct RecordService;

impl RecordService {
    /// Persist the record linking blob reference, secret, and filename.
    /// The UNIQUE constraint on the secret column backs the generator's
    /// statistical uniqueness.
    pub async fn insert(
        db: &Database,
        blob_url: &str,
        secret: &str,
        filename: &str,
    ) -> Result<FileRecord> {
        let record = FileRecord {
            id: Uuid::new_v4().to_string(),
            blob_url: blob_url.to_string(),
            secret: secret.to_string(),
            filename: filename.to_string(),
            created_at: Utc::now().to_rfc3339(),
        };

        let sql = format!(
            "INSERT INTO {} (id, blob_url, secret, filename, created_at) VALUES (?, ?, ?, ?, ?)",
            db.table()
        );
        sqlx::query(&sql)
            .bind(&record.id)
            .bind(&record.blob_url)
            .bind(&record.secret)
            .bind(&record.filename)
            .bind(&record.created_at)
            .execute(db.pool())
            .await?;

        tracing::info!("Added file record {}", record.id);
        Ok(record)
    }

    /// Look up a record by its secret. `Ok(None)` means the secret is
    /// unknown; a store failure surfaces as an error, never as not-found.
    pub async fn find_by_secret(db: &Database, secret: &str) -> Result<Option<FileRecord>> {
        let sql = format!(
            "SELECT id, blob_url, secret, filename, created_at FROM {} WHERE secret = ?",
            db.table()
        );
        let record = sqlx::query_as::<_, FileRecord>(&sql)
            .bind(secret)
            .fetch_optional(db.pool())
            .await?;
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;

    async fn test_db() -> Database {
        let url = format!("sqlite:file:{}?mode=memory&cache=shared", Uuid::new_v4());
        let db = Database::new(&url, "file_records").await.unwrap();
        db.run_migrations().await.unwrap();
        db
    }

    #[tokio::test]
    async fn test_insert_and_find() {
        let db = test_db().await;

        let record = RecordService::insert(&db, "https://blob/report.pdf", "s3cr3t!?", "report.pdf")
            .await
            .unwrap();
        assert_eq!(record.filename, "report.pdf");

        let found = RecordService::find_by_secret(&db, "s3cr3t!?")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.id, record.id);
        assert_eq!(found.blob_url, "https://blob/report.pdf");
        assert_eq!(found.filename, "report.pdf");
    }

    #[tokio::test]
    async fn test_unknown_secret_is_none() {
        let db = test_db().await;
        let found = RecordService::find_by_secret(&db, "missing1").await.unwrap();
        assert!(found.is_none());
    }

    #[tokio::test]
    async fn test_duplicate_secret_rejected() {
        let db = test_db().await;

        RecordService::insert(&db, "url-a", "same-one", "a.txt")
            .await
            .unwrap();
        let err = RecordService::insert(&db, "url-b", "same-one", "b.txt")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Database(_)));
    }

    #[tokio::test]
    async fn test_store_failure_is_distinct_from_not_found() {
        // No migrations: the table does not exist, so the lookup must
        // surface a database error rather than Ok(None).
        let url = format!("sqlite:file:{}?mode=memory&cache=shared", Uuid::new_v4());
        let db = Database::new(&url, "file_records").await.unwrap();

        let err = RecordService::find_by_secret(&db, "whatever").await.unwrap_err();
        assert!(matches!(err, AppError::Database(_)));
    }
}
