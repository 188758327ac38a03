//! Shared HTTP client configuration and error mapping.

use std::time::Duration;

use reqwest::{Client, Response};
use tracing::info;

use blinko_core::defaults::HTTP_TIMEOUT_SECS;
use blinko_core::{Error, Result};

use crate::types::RemoteErrorBody;

/// Transport settings shared by the Blinko and LLM clients.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Request timeout in seconds.
    pub timeout_seconds: u64,
    /// Skip TLS verification (self-hosted Blinko behind a self-signed cert).
    pub skip_tls_verify: bool,
    /// Value of the `User-Agent` header.
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: HTTP_TIMEOUT_SECS,
            skip_tls_verify: false,
            user_agent: format!("blinko-clip/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl ClientConfig {
    /// Read `BLINKO_TIMEOUT_SECS` and `BLINKO_SKIP_TLS_VERIFY`.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            timeout_seconds: std::env::var("BLINKO_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.timeout_seconds),
            skip_tls_verify: std::env::var("BLINKO_SKIP_TLS_VERIFY")
                .map(|v| v == "1" || v.to_lowercase() == "true")
                .unwrap_or(false),
            ..defaults
        }
    }

    /// Build the underlying `reqwest` client.
    pub fn build_client(&self) -> Result<Client> {
        let mut builder = Client::builder()
            .timeout(Duration::from_secs(self.timeout_seconds))
            .user_agent(self.user_agent.clone());

        if self.skip_tls_verify {
            builder = builder.danger_accept_invalid_certs(true);
        }

        let client = builder
            .build()
            .map_err(|e| Error::Config(format!("Failed to create HTTP client: {}", e)))?;

        info!(
            subsystem = "http",
            component = "client",
            timeout_secs = self.timeout_seconds,
            skip_tls_verify = self.skip_tls_verify,
            "HTTP client initialized"
        );
        Ok(client)
    }
}

/// Map a transport failure (DNS, refused connection, timeout) to `Error::Request`.
pub(crate) fn request_error(e: reqwest::Error) -> Error {
    if e.is_timeout() {
        Error::Request(format!("Request timed out: {}", e))
    } else {
        Error::Request(format!("Request failed: {}", e))
    }
}

/// Turn a non-success response into `Error::RemoteApi`.
///
/// The message comes from the error body when the server sent one, else
/// the status's canonical reason.
pub(crate) async fn remote_error(response: Response) -> Error {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    let parsed: RemoteErrorBody = serde_json::from_str(&body).unwrap_or_default();
    let message = parsed
        .message()
        .map(str::to_string)
        .or_else(|| status.canonical_reason().map(str::to_string))
        .unwrap_or_else(|| "Unknown error".to_string());

    Error::RemoteApi {
        status: status.as_u16(),
        message,
    }
}
