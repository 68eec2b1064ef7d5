//! reqwest-backed transport.

use super::{Method, Transport, TransportRequest, TransportResponse};
use reqwest::Client;
use std::time::{Duration, Instant};
use subscope_core::{AppConfig, Error};

/// Configuration for the HTTP transport.
#[derive(Debug, Clone)]
pub struct HttpConfig {
    /// User agent string (default: "subscope/0.1")
    pub user_agent: String,

    /// Request timeout (default: 20s)
    pub timeout: Duration,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self { user_agent: "subscope/0.1".to_string(), timeout: Duration::from_millis(20000) }
    }
}

impl From<&AppConfig> for HttpConfig {
    fn from(config: &AppConfig) -> Self {
        Self { user_agent: config.user_agent.clone(), timeout: config.timeout() }
    }
}

/// Transport that performs real HTTP requests.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    http: Client,
}

impl HttpTransport {
    /// Create a new transport with the given configuration.
    pub fn new(config: HttpConfig) -> Result<Self, Error> {
        let http = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(config.timeout)
            .use_rustls_tls()
            .gzip(true)
            .brotli(true)
            .deflate(true)
            .build()
            .map_err(|e| Error::Transport(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self { http })
    }
}

#[async_trait::async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: TransportRequest) -> Result<TransportResponse, Error> {
        let start = Instant::now();

        let mut builder = match request.method {
            Method::Get => self.http.get(&request.url),
            Method::Post => self.http.post(&request.url),
        };
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await.map_err(|e| {
            if e.is_timeout() {
                Error::Transport(format!("request timeout: {}", e))
            } else {
                Error::Transport(format!("network error: {}", e))
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            tracing::debug!("{} returned status {}", request.url, status);
            return Ok(TransportResponse { ok: false, status: status.as_u16(), json: None });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| Error::Transport(format!("failed to read response: {}", e)))?;

        let json = if bytes.is_empty() {
            None
        } else {
            Some(serde_json::from_slice(&bytes).map_err(|e| Error::Parse(format!("invalid JSON body: {}", e)))?)
        };

        tracing::debug!("{} -> {} in {:?} ({} bytes)", request.url, status, start.elapsed(), bytes.len());

        Ok(TransportResponse { ok: true, status: status.as_u16(), json })
    }
}
