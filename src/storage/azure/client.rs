//! Blob store client core: account identity, endpoint URLs, and request
//! authorization.

use chrono::Utc;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use std::collections::HashMap;
use urlencoding::encode;

use crate::error::Result;
use crate::storage::azure::signer::Signer;

/// Blob service REST API version sent with every request.
pub const API_VERSION: &str = "2021-08-06";

/// Azure Blob Storage client for a single container
#[derive(Debug, Clone)]
pub struct Client {
    account: String,
    access_key: String,
    container: String,
    http: reqwest::Client,
}

impl Client {
    pub fn new(
        account: impl Into<String>,
        access_key: impl Into<String>,
        container: impl Into<String>,
    ) -> Self {
        Self {
            account: account.into(),
            access_key: access_key.into(),
            container: container.into(),
            http: reqwest::Client::new(),
        }
    }

    pub fn container(&self) -> &str {
        &self.container
    }

    pub(crate) fn http(&self) -> &reqwest::Client {
        &self.http
    }

    /// Blob service endpoint host for this account
    pub fn host(&self) -> String {
        format!("{}.blob.core.windows.net", self.account)
    }

    /// URL path of the container
    pub fn container_path(&self) -> String {
        format!("/{}", self.container)
    }

    /// URL path of a named blob inside the container
    pub fn blob_path(&self, name: &str) -> String {
        format!("/{}/{}", self.container, encode(name))
    }

    /// Full URL from a path
    pub fn url_from_path(&self, path: &str) -> String {
        format!("https://{}{}", self.host(), path)
    }

    /// Reference stored on the record for an uploaded blob
    pub fn blob_url(&self, name: &str) -> String {
        self.url_from_path(&self.blob_path(name))
    }

    /// Headers every request carries: date and API version.
    pub fn common_headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        let now_str = Utc::now().format("%a, %d %b %Y %T GMT").to_string();
        headers.insert(
            "x-ms-date",
            HeaderValue::from_str(&now_str).expect("formatted date is a valid header"),
        );
        headers.insert("x-ms-version", HeaderValue::from_static(API_VERSION));
        headers
    }

    /// Sign the request and insert the Authorization header.
    pub fn authorize(
        &self,
        method: &str,
        url_path: &str,
        headers: &mut HeaderMap,
        query: Option<&HashMap<String, String>>,
    ) -> Result<()> {
        let signature = Signer::new(method, url_path, headers, query)
            .authorization(&self.account, &self.access_key)?;
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&signature)
                .expect("shared key signature is a valid header"),
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_host() {
        let client = Client::new("acct", "a2V5", "filer");
        assert_eq!(client.host(), "acct.blob.core.windows.net");
    }

    #[test]
    fn test_blob_path_encoding() {
        let client = Client::new("acct", "a2V5", "filer");
        assert_eq!(client.blob_path("report.pdf"), "/filer/report.pdf");
        assert_eq!(client.blob_path("my report.pdf"), "/filer/my%20report.pdf");
    }

    #[test]
    fn test_blob_url() {
        let client = Client::new("acct", "a2V5", "filer");
        assert_eq!(
            client.blob_url("report.pdf"),
            "https://acct.blob.core.windows.net/filer/report.pdf"
        );
    }
}
