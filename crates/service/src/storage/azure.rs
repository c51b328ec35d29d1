//! Azure Blob Storage over the REST API with Shared Key authorization.

use std::time::Duration;

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use chrono::Utc;
use hmac::{Hmac, Mac};
use reqwest::{header, Method, StatusCode};
use sha2::Sha256;
use tracing::debug;

use super::{Blob, BlobRead, BlobStore, StorageError, WriteCondition};

const API_VERSION: &str = "2021-08-06";
const JSON_CONTENT_TYPE: &str = "application/json";

pub struct AzureBlobStore {
    client: reqwest::Client,
    account: String,
    key: Vec<u8>,
    endpoint: String,
    /// Path of the endpoint URL, empty for host-style endpoints and
    /// `/<account>` for path-style ones such as Azurite.
    endpoint_path: String,
    container: String,
}

impl AzureBlobStore {
    /// `key` is the base64 account key as shown in the portal.
    pub fn new(
        account: impl Into<String>,
        key: &str,
        endpoint: impl Into<String>,
        container: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, StorageError> {
        let key = STANDARD
            .decode(key.trim())
            .map_err(|e| StorageError::NotConfigured(format!("storage account key is not valid base64: {e}")))?;
        let endpoint = endpoint.into().trim_end_matches('/').to_string();
        let endpoint_path = reqwest::Url::parse(&endpoint)
            .map_err(|e| StorageError::NotConfigured(format!("invalid storage endpoint {endpoint:?}: {e}")))?
            .path()
            .trim_end_matches('/')
            .to_string();
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| StorageError::Backend(format!("build http client: {e}")))?;
        Ok(Self {
            client,
            account: account.into(),
            key,
            endpoint,
            endpoint_path,
            container: container.into(),
        })
    }

    fn url(&self, blob: &str) -> String {
        format!("{}/{}/{}", self.endpoint, self.container, blob)
    }

    /// `/<account><url path>`: the account name followed by the request path.
    fn canonical_resource(&self, blob: &str) -> String {
        format!("/{}{}/{}/{}", self.account, self.endpoint_path, self.container, blob)
    }

    fn authorization(&self, string_to_sign: &str) -> Result<String, StorageError> {
        let mut mac = Hmac::<Sha256>::new_from_slice(&self.key)
            .map_err(|e| StorageError::NotConfigured(format!("invalid storage account key: {e}")))?;
        mac.update(string_to_sign.as_bytes());
        let signature = STANDARD.encode(mac.finalize().into_bytes());
        Ok(format!("SharedKey {}:{}", self.account, signature))
    }

    async fn send(&self, req: SignedRequest<'_>) -> Result<reqwest::Response, StorageError> {
        let date = Utc::now().format("%a, %d %b %Y %H:%M:%S GMT").to_string();
        let mut ms_headers = vec![
            ("x-ms-date".to_string(), date),
            ("x-ms-version".to_string(), API_VERSION.to_string()),
        ];
        if req.body.is_some() {
            ms_headers.push(("x-ms-blob-type".into(), "BlockBlob".into()));
            ms_headers.push(("x-ms-blob-content-type".into(), JSON_CONTENT_TYPE.into()));
        }
        let to_sign = string_to_sign(&StringToSign {
            method: req.method.as_str(),
            content_length: req.body.map(|b| b.len()).unwrap_or(0),
            content_type: req.body.map(|_| JSON_CONTENT_TYPE).unwrap_or(""),
            if_match: req.if_match,
            if_none_match: req.if_none_match,
            ms_headers: &ms_headers,
            resource: &self.canonical_resource(req.blob),
        });
        let auth = self.authorization(&to_sign)?;

        let mut builder = self
            .client
            .request(req.method.clone(), self.url(req.blob))
            .header(header::AUTHORIZATION, auth);
        for (name, value) in &ms_headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(etag) = req.if_match {
            builder = builder.header(header::IF_MATCH, etag);
        }
        if let Some(v) = req.if_none_match {
            builder = builder.header(header::IF_NONE_MATCH, v);
        }
        if let Some(body) = req.body {
            builder = builder
                .header(header::CONTENT_TYPE, JSON_CONTENT_TYPE)
                .body(body.to_vec());
        }
        builder
            .send()
            .await
            .map_err(|e| StorageError::Backend(format!("{} {}: {e}", req.method, req.blob)))
    }
}

struct SignedRequest<'a> {
    method: Method,
    blob: &'a str,
    body: Option<&'a [u8]>,
    if_match: Option<&'a str>,
    if_none_match: Option<&'a str>,
}

struct StringToSign<'a> {
    method: &'a str,
    content_length: usize,
    content_type: &'a str,
    if_match: Option<&'a str>,
    if_none_match: Option<&'a str>,
    ms_headers: &'a [(String, String)],
    resource: &'a str,
}

/// Shared Key string-to-sign for the blob service (version 2015-02-21+).
/// A zero content length is signed as an empty line.
fn string_to_sign(s: &StringToSign<'_>) -> String {
    let content_length = if s.content_length == 0 { String::new() } else { s.content_length.to_string() };
    let mut headers: Vec<(String, &str)> = s
        .ms_headers
        .iter()
        .map(|(k, v)| (k.to_ascii_lowercase(), v.trim()))
        .collect();
    headers.sort_by(|a, b| a.0.cmp(&b.0));
    let canonical_headers: String = headers.iter().map(|(k, v)| format!("{k}:{v}\n")).collect();

    [
        s.method,
        "",                 // Content-Encoding
        "",                 // Content-Language
        content_length.as_str(),
        "",                 // Content-MD5
        s.content_type,
        "",                 // Date (x-ms-date is used instead)
        "",                 // If-Modified-Since
        s.if_match.unwrap_or(""),
        s.if_none_match.unwrap_or(""),
        "",                 // If-Unmodified-Since
        "",                 // Range
    ]
    .iter()
    .map(|line| format!("{line}\n"))
    .collect::<String>()
        + &canonical_headers
        + s.resource
}

async fn error_body(resp: reqwest::Response) -> String {
    let status = resp.status();
    let code = resp
        .headers()
        .get("x-ms-error-code")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_string();
    let text = resp.text().await.unwrap_or_default();
    format!("status {status} {code} {}", text.chars().take(200).collect::<String>())
}

#[async_trait]
impl BlobStore for AzureBlobStore {
    async fn download(&self, blob: &str) -> Result<BlobRead, StorageError> {
        let resp = self
            .send(SignedRequest { method: Method::GET, blob, body: None, if_match: None, if_none_match: None })
            .await?;
        match resp.status() {
            StatusCode::OK => {
                let etag = resp
                    .headers()
                    .get(header::ETAG)
                    .and_then(|v| v.to_str().ok())
                    .map(str::to_string);
                let content = resp
                    .bytes()
                    .await
                    .map_err(|e| StorageError::Backend(format!("read body of {blob}: {e}")))?
                    .to_vec();
                debug!(%blob, bytes = content.len(), "azure blob downloaded");
                Ok(BlobRead::Found(Blob { content, etag }))
            }
            StatusCode::NOT_FOUND => Ok(BlobRead::Missing),
            _ => Err(StorageError::Backend(format!("download {blob}: {}", error_body(resp).await))),
        }
    }

    async fn upload(
        &self,
        blob: &str,
        content: Vec<u8>,
        condition: WriteCondition,
    ) -> Result<(), StorageError> {
        let (if_match, if_none_match) = match &condition {
            WriteCondition::Unconditional => (None, None),
            WriteCondition::IfMatch(etag) => (Some(etag.as_str()), None),
            WriteCondition::IfAbsent => (None, Some("*")),
        };
        let resp = self
            .send(SignedRequest { method: Method::PUT, blob, body: Some(&content), if_match, if_none_match })
            .await?;
        match resp.status() {
            s if s.is_success() => {
                debug!(%blob, bytes = content.len(), "azure blob uploaded");
                Ok(())
            }
            StatusCode::PRECONDITION_FAILED | StatusCode::CONFLICT
                if condition != WriteCondition::Unconditional =>
            {
                Err(StorageError::PreconditionFailed(format!("upload {blob}: {}", error_body(resp).await)))
            }
            _ => Err(StorageError::Backend(format!("upload {blob}: {}", error_body(resp).await))),
        }
    }
}
