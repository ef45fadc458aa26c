use std::path::Path;

use bytes::Bytes;

use crate::db::Database;
use crate::error::{AppError, Result};
use crate::models::FileRecord;
use crate::secret;
use crate::services::RecordService;
use crate::storage::StorageProvider;

pub struct TransferService;

impl TransferService {
    /// Upload workflow: store the bytes, generate a secret, persist the
    /// record. The record is created only after the blob upload succeeds.
    /// If the record insert fails the blob stays behind with no
    /// compensating delete; that inconsistency window is accepted.
    pub async fn upload(
        db: &Database,
        provider: &dyn StorageProvider,
        local_path: &Path,
        filename: &str,
    ) -> Result<FileRecord> {
        provider.put_file(filename, local_path).await?;
        let blob_url = provider.reference(filename);

        let token = secret::generate(secret::SECRET_LEN)?;

        let record = RecordService::insert(db, &blob_url, &token, filename).await?;
        tracing::info!("Uploaded {} as record {}", filename, record.id);
        Ok(record)
    }

    /// Download workflow: resolve the secret to a record, then fetch the
    /// blob. An empty secret never reaches the record store; an unknown
    /// secret never reaches the blob store.
    pub async fn download(
        db: &Database,
        provider: &dyn StorageProvider,
        token: &str,
    ) -> Result<(FileRecord, Bytes)> {
        if token.is_empty() {
            return Err(AppError::BadRequest("missing secret".to_string()));
        }

        let record = RecordService::find_by_secret(db, token)
            .await?
            .ok_or_else(|| AppError::NotFound("unknown secret".to_string()))?;

        if record.filename.is_empty() {
            return Err(AppError::BadRequest("record has no filename".to_string()));
        }

        let data = provider.get(&record.filename).await?;
        Ok((record, data))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LocalStorageConfig;
    use crate::storage::LocalStorage;
    use async_trait::async_trait;
    use std::io::Write;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use uuid::Uuid;

    async fn test_db() -> Database {
        let url = format!("sqlite:file:{}?mode=memory&cache=shared", Uuid::new_v4());
        let db = Database::new(&url, "file_records").await.unwrap();
        db.run_migrations().await.unwrap();
        db
    }

    fn local_storage(dir: &tempfile::TempDir) -> LocalStorage {
        LocalStorage::new(LocalStorageConfig {
            base_path: dir.path().to_string_lossy().to_string(),
        })
    }

    fn temp_upload(content: &[u8]) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content).unwrap();
        file.flush().unwrap();
        file
    }

    /// Provider that counts blob fetches, for asserting a lookup miss
    /// never touches the blob store.
    struct CountingProvider {
        gets: AtomicUsize,
    }

    impl CountingProvider {
        fn new() -> Self {
            Self {
                gets: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl StorageProvider for CountingProvider {
        async fn put(&self, _path: &str, _data: Bytes) -> Result<()> {
            Ok(())
        }

        async fn get(&self, _path: &str) -> Result<Bytes> {
            self.gets.fetch_add(1, Ordering::SeqCst);
            Ok(Bytes::new())
        }

        async fn exists(&self, _path: &str) -> Result<bool> {
            Ok(false)
        }

        fn reference(&self, path: &str) -> String {
            path.to_string()
        }

        fn storage_type(&self) -> &'static str {
            "counting"
        }
    }

    #[tokio::test]
    async fn test_upload_download_round_trip() {
        let db = test_db().await;
        let dir = tempfile::tempdir().unwrap();
        let storage = local_storage(&dir);
        let upload = temp_upload(b"abc");

        let record = TransferService::upload(&db, &storage, upload.path(), "report.pdf")
            .await
            .unwrap();
        assert_eq!(record.secret.len(), secret::SECRET_LEN);
        assert_eq!(record.filename, "report.pdf");

        let (found, data) = TransferService::download(&db, &storage, &record.secret)
            .await
            .unwrap();
        assert_eq!(found.id, record.id);
        assert_eq!(&data[..], b"abc");
    }

    #[tokio::test]
    async fn test_unknown_secret_skips_blob_fetch() {
        let db = test_db().await;
        let provider = CountingProvider::new();

        let err = TransferService::download(&db, &provider, "n0tThere")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
        assert_eq!(provider.gets.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_empty_secret_skips_record_store() {
        // No migrations: any record store query would fail, so a clean
        // BadRequest proves the lookup never ran.
        let url = format!("sqlite:file:{}?mode=memory&cache=shared", Uuid::new_v4());
        let db = Database::new(&url, "file_records").await.unwrap();
        let provider = CountingProvider::new();

        let err = TransferService::download(&db, &provider, "")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
        assert_eq!(provider.gets.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_record_without_filename_is_bad_request() {
        let db = test_db().await;
        let provider = CountingProvider::new();

        RecordService::insert(&db, "https://blob/unnamed", "n0nameXX", "")
            .await
            .unwrap();

        let err = TransferService::download(&db, &provider, "n0nameXX")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
        assert_eq!(provider.gets.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_store_failure_surfaces_as_error() {
        let url = format!("sqlite:file:{}?mode=memory&cache=shared", Uuid::new_v4());
        let db = Database::new(&url, "file_records").await.unwrap();
        let provider = CountingProvider::new();

        let err = TransferService::download(&db, &provider, "s0meSecr")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Database(_)));
    }

    #[tokio::test]
    async fn test_distinct_secrets_across_uploads() {
        let db = test_db().await;
        let dir = tempfile::tempdir().unwrap();
        let storage = local_storage(&dir);

        let mut secrets = std::collections::HashSet::new();
        for i in 0..20 {
            let upload = temp_upload(b"data");
            let record =
                TransferService::upload(&db, &storage, upload.path(), &format!("f{}.bin", i))
                    .await
                    .unwrap();
            secrets.insert(record.secret);
        }
        assert_eq!(secrets.len(), 20);
    }
}
