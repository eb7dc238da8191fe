//! HTTP client for the remote emoji cipher service.
//!
//! The service owns the cryptography and the emoji codec; this crate only
//! speaks its two-endpoint JSON contract and classifies failures.

use async_trait::async_trait;
use reqwest::Client;
use serde::{de::DeserializeOwned, Serialize};
use shared::{
    domain::Operation,
    error::ErrorBody,
    protocol::{DecryptRequest, DecryptResponse, EncryptRequest, EncryptResponse},
};
use tracing::{debug, warn};
use url::Url;

pub mod error;

pub use error::{CipherClientError, CipherClientErrorKind};

pub type Result<T, E = CipherClientError> = std::result::Result<T, E>;

/// Remote encrypt/decrypt operations. Implemented over HTTP by
/// [`HttpCipherClient`]; tests substitute in-memory services.
#[async_trait]
pub trait CipherService: Send + Sync {
    /// Returns the emoji ciphertext for `request.message`.
    async fn encrypt(&self, request: &EncryptRequest) -> Result<String>;
    /// Returns the plaintext recovered from `request.emojis`.
    async fn decrypt(&self, request: &DecryptRequest) -> Result<String>;
}

#[derive(Debug, Clone)]
pub struct HttpCipherClient {
    http: Client,
    server_url: String,
}

impl HttpCipherClient {
    pub fn new(server_url: impl Into<String>) -> Result<Self> {
        Self::with_http_client(Client::new(), server_url)
    }

    pub fn with_http_client(http: Client, server_url: impl Into<String>) -> Result<Self> {
        let server_url = normalize_server_url(&server_url.into())?;
        Ok(Self { http, server_url })
    }

    async fn post_operation<Req, Resp>(&self, operation: Operation, body: &Req) -> Result<Resp>
    where
        Req: Serialize + Sync,
        Resp: DeserializeOwned,
    {
        let url = format!("{}{}", self.server_url, operation.endpoint());
        debug!(operation = operation.as_str(), %url, "posting cipher request");

        let response = self.http.post(&url).json(body).send().await?;
        let status = response.status();
        if !status.is_success() {
            // An unreadable error body still yields the per-operation default reason.
            let raw = response.bytes().await.unwrap_or_default();
            let message = ErrorBody::from_bytes(&raw).reason_or(operation.default_failure_reason());
            warn!(
                operation = operation.as_str(),
                status = status.as_u16(),
                reason = %message,
                "cipher service rejected request"
            );
            return Err(CipherClientError::Remote {
                operation,
                status: status.as_u16(),
                message,
            });
        }

        let raw = response.bytes().await?;
        serde_json::from_slice(&raw).map_err(|err| CipherClientError::MalformedResponse {
            operation,
            detail: err.to_string(),
        })
    }
}

#[async_trait]
impl CipherService for HttpCipherClient {
    async fn encrypt(&self, request: &EncryptRequest) -> Result<String> {
        let body: EncryptResponse = self.post_operation(Operation::Encrypt, request).await?;
        Ok(body.emojis)
    }

    async fn decrypt(&self, request: &DecryptRequest) -> Result<String> {
        let body: DecryptResponse = self.post_operation(Operation::Decrypt, request).await?;
        Ok(body.message)
    }
}

/// Trims whitespace and trailing slashes and checks that the URL is http(s).
pub fn normalize_server_url(raw: &str) -> Result<String> {
    let trimmed = raw.trim().trim_end_matches('/');
    let invalid = |reason: String| CipherClientError::InvalidServerUrl {
        url: raw.to_string(),
        reason,
    };

    if trimmed.is_empty() {
        return Err(invalid("server url is empty".to_string()));
    }
    let parsed = Url::parse(trimmed).map_err(|err| invalid(err.to_string()))?;
    match parsed.scheme() {
        "http" | "https" => Ok(trimmed.to_string()),
        other => Err(invalid(format!("unsupported scheme '{other}'"))),
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
