//! Blob operations: container setup, upload, download.

use bytes::Bytes;
use reqwest::header::{HeaderValue, CONTENT_LENGTH, CONTENT_TYPE};
use reqwest::StatusCode;
use std::collections::HashMap;

use crate::error::{AppError, Result};
use crate::storage::azure::client::Client;

/// Transport-level retry bound for downloads.
const MAX_DOWNLOAD_ATTEMPTS: usize = 20;

impl Client {
    /// Create the container. Already-exists (409) is treated as success;
    /// container setup is idempotent.
    pub async fn create_container(&self) -> Result<()> {
        let path = self.container_path();
        let mut query = HashMap::new();
        query.insert("restype".to_string(), "container".to_string());

        let mut headers = self.common_headers();
        headers.insert(CONTENT_LENGTH, HeaderValue::from(0u64));
        self.authorize("PUT", &path, &mut headers, Some(&query))?;

        let url = format!("{}?restype=container", self.url_from_path(&path));
        let resp = self.http().put(url).headers(headers).send().await?;

        let status = resp.status();
        if status.is_success() {
            Ok(())
        } else if status == StatusCode::CONFLICT {
            tracing::debug!("container {} already exists", self.container());
            Ok(())
        } else {
            Err(AppError::Storage(format!(
                "container create failed: {}",
                status
            )))
        }
    }

    /// Upload a block blob under `name`, returning its URL.
    pub async fn put_object(&self, name: &str, data: Bytes) -> Result<String> {
        let path = self.blob_path(name);

        let mut headers = self.common_headers();
        headers.insert(
            CONTENT_TYPE,
            HeaderValue::from_static("application/octet-stream"),
        );
        headers.insert(CONTENT_LENGTH, HeaderValue::from(data.len()));
        headers.insert("x-ms-blob-type", HeaderValue::from_static("BlockBlob"));
        self.authorize("PUT", &path, &mut headers, None)?;

        tracing::info!("Uploading blob {}", name);
        let resp = self
            .http()
            .put(self.url_from_path(&path))
            .headers(headers)
            .body(data)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(AppError::Storage(format!(
                "blob upload failed: {} {}",
                status, body
            )));
        }

        Ok(self.blob_url(name))
    }

    /// Download a blob. Transport failures are retried up to the bound;
    /// HTTP status errors are not retried. A 404 maps to not-found.
    pub async fn get_object(&self, name: &str) -> Result<Bytes> {
        let path = self.blob_path(name);
        let mut last_err: Option<reqwest::Error> = None;

        for attempt in 1..=MAX_DOWNLOAD_ATTEMPTS {
            let mut headers = self.common_headers();
            self.authorize("GET", &path, &mut headers, None)?;

            match self
                .http()
                .get(self.url_from_path(&path))
                .headers(headers)
                .send()
                .await
            {
                Ok(resp) => {
                    let status = resp.status();
                    if status == StatusCode::NOT_FOUND {
                        return Err(AppError::NotFound(format!("blob not found: {}", name)));
                    }
                    if !status.is_success() {
                        return Err(AppError::Storage(format!(
                            "blob download failed: {}",
                            status
                        )));
                    }
                    match resp.bytes().await {
                        Ok(data) => return Ok(data),
                        Err(e) => last_err = Some(e),
                    }
                }
                Err(e) => last_err = Some(e),
            }

            tracing::debug!("blob download attempt {} for {} failed", attempt, name);
        }

        Err(AppError::Storage(format!(
            "blob download failed after {} attempts: {}",
            MAX_DOWNLOAD_ATTEMPTS,
            last_err.map(|e| e.to_string()).unwrap_or_default()
        )))
    }

    /// Check whether a blob exists.
    pub async fn head_object(&self, name: &str) -> Result<bool> {
        let path = self.blob_path(name);
        let mut headers = self.common_headers();
        self.authorize("HEAD", &path, &mut headers, None)?;

        let resp = self
            .http()
            .head(self.url_from_path(&path))
            .headers(headers)
            .send()
            .await?;

        let status = resp.status();
        if status.is_success() {
            Ok(true)
        } else if status == StatusCode::NOT_FOUND {
            Ok(false)
        } else {
            Err(AppError::Storage(format!("blob head failed: {}", status)))
        }
    }
}
