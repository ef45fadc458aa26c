//! Shared Key signing for the blob store REST API.
//! Reference: https://learn.microsoft.com/rest/api/storageservices/authorize-with-shared-key

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use hmac::{Hmac, Mac};
use reqwest::header::HeaderMap;
use sha2::Sha256;
use std::collections::HashMap;

use crate::error::{AppError, Result};

type HmacSha256 = Hmac<Sha256>;

/// Standard headers, in the order the string-to-sign requires them.
const STANDARD_HEADERS: [&str; 11] = [
    "content-encoding",
    "content-language",
    "content-length",
    "content-md5",
    "content-type",
    "date",
    "if-modified-since",
    "if-match",
    "if-none-match",
    "if-unmodified-since",
    "range",
];

/// Shared Key signer for one request
pub struct Signer<'a> {
    method: &'a str,
    url_path: &'a str,
    headers: &'a HeaderMap,
    query: Option<&'a HashMap<String, String>>,
}

impl<'a> Signer<'a> {
    pub fn new(
        method: &'a str,
        url_path: &'a str,
        headers: &'a HeaderMap,
        query: Option<&'a HashMap<String, String>>,
    ) -> Self {
        Self {
            method,
            url_path,
            headers,
            query,
        }
    }

    /// Value of a standard header for the string-to-sign, empty when
    /// absent. A zero Content-Length signs as empty.
    fn standard_header(&self, name: &str) -> String {
        let value = self
            .headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .trim()
            .to_string();
        if name == "content-length" && value == "0" {
            return String::new();
        }
        value
    }

    /// All x-ms-* headers, lowercased, sorted, one `name:value\n` each.
    fn canonicalized_headers(&self) -> String {
        let mut entries: Vec<(String, String)> = self
            .headers
            .iter()
            .filter(|(k, _)| k.as_str().starts_with("x-ms-"))
            .map(|(k, v)| {
                (
                    k.as_str().to_lowercase(),
                    v.to_str().unwrap_or("").trim().to_string(),
                )
            })
            .collect();
        entries.sort();

        let mut res = String::new();
        for (k, v) in entries {
            res.push_str(&k);
            res.push(':');
            res.push_str(&v);
            res.push('\n');
        }
        res
    }

    /// `/{account}{path}` plus sorted `\nkey:value` query entries.
    fn canonicalized_resource(&self, account: &str) -> String {
        let mut res = format!("/{}{}", account, self.url_path);
        if let Some(query) = self.query {
            let mut keys: Vec<&String> = query.keys().collect();
            keys.sort();
            for key in keys {
                res.push('\n');
                res.push_str(&key.to_lowercase());
                res.push(':');
                res.push_str(query.get(key).map(String::as_str).unwrap_or(""));
            }
        }
        res
    }

    /// Build the canonical string-to-sign for this request.
    fn string_to_sign(&self, account: &str) -> String {
        let mut parts: Vec<String> = Vec::with_capacity(STANDARD_HEADERS.len() + 1);
        parts.push(self.method.to_uppercase());
        for name in STANDARD_HEADERS {
            parts.push(self.standard_header(name));
        }

        let mut s = parts.join("\n");
        s.push('\n');
        s.push_str(&self.canonicalized_headers());
        s.push_str(&self.canonicalized_resource(account));
        s
    }

    /// Produce the Authorization header value:
    /// `SharedKey {account}:{base64(hmac-sha256(string-to-sign))}`.
    pub fn authorization(&self, account: &str, access_key: &str) -> Result<String> {
        let key = BASE64
            .decode(access_key)
            .map_err(|e| AppError::Storage(format!("invalid storage account key: {}", e)))?;

        let mut mac =
            HmacSha256::new_from_slice(&key).expect("HMAC can take key of any size");
        mac.update(self.string_to_sign(account).as_bytes());
        let signature = BASE64.encode(mac.finalize().into_bytes());

        Ok(format!("SharedKey {}:{}", account, signature))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::{HeaderValue, CONTENT_LENGTH};

    fn test_headers() -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            "x-ms-date",
            HeaderValue::from_static("Tue, 26 Aug 2025 00:00:00 GMT"),
        );
        headers.insert("x-ms-version", HeaderValue::from_static("2021-08-06"));
        headers
    }

    #[test]
    fn test_canonicalized_headers_sorted() {
        let mut headers = test_headers();
        headers.insert("x-ms-blob-type", HeaderValue::from_static("BlockBlob"));
        let signer = Signer::new("put", "/filer/report.pdf", &headers, None);
        assert_eq!(
            signer.canonicalized_headers(),
            "x-ms-blob-type:BlockBlob\nx-ms-date:Tue, 26 Aug 2025 00:00:00 GMT\nx-ms-version:2021-08-06\n"
        );
    }

    #[test]
    fn test_canonicalized_resource_with_query() {
        let headers = test_headers();
        let mut query = HashMap::new();
        query.insert("restype".to_string(), "container".to_string());
        let signer = Signer::new("put", "/filer", &headers, Some(&query));
        assert_eq!(
            signer.canonicalized_resource("acct"),
            "/acct/filer\nrestype:container"
        );
    }

    #[test]
    fn test_string_to_sign_layout() {
        let mut headers = test_headers();
        headers.insert(CONTENT_LENGTH, HeaderValue::from_static("3"));
        let signer = Signer::new("put", "/filer/report.pdf", &headers, None);
        assert_eq!(
            signer.string_to_sign("acct"),
            "PUT\n\n\n3\n\n\n\n\n\n\n\n\n\
             x-ms-date:Tue, 26 Aug 2025 00:00:00 GMT\nx-ms-version:2021-08-06\n\
             /acct/filer/report.pdf"
        );
    }

    #[test]
    fn test_zero_content_length_signs_empty() {
        let mut headers = test_headers();
        headers.insert(CONTENT_LENGTH, HeaderValue::from_static("0"));
        let signer = Signer::new("put", "/filer", &headers, None);
        assert_eq!(signer.standard_header("content-length"), "");
    }

    #[test]
    fn test_authorization_shape() {
        let headers = test_headers();
        let signer = Signer::new("get", "/filer/report.pdf", &headers, None);
        // "c2VjcmV0" is base64("secret")
        let auth = signer.authorization("acct", "c2VjcmV0").unwrap();
        assert!(auth.starts_with("SharedKey acct:"));
        // HMAC-SHA256 output is 32 bytes, 44 characters in base64
        assert_eq!(auth.len(), "SharedKey acct:".len() + 44);
    }

    #[test]
    fn test_authorization_rejects_bad_key() {
        let headers = test_headers();
        let signer = Signer::new("get", "/filer", &headers, None);
        assert!(signer.authorization("acct", "not base64!").is_err());
    }
}
