//! The "send request, get response" capability.
//!
//! Source clients never talk to the network directly; they hand a
//! [`TransportRequest`] to a [`Transport`]. The production implementation is
//! [`HttpTransport`]. With the `test-util` feature, `ScriptedTransport`
//! answers from a closure and records what it was asked.
//!
//! A non-ok status is returned as a response, not as an error. Interpreting
//! it is up to the caller.

pub mod http;
#[cfg(any(test, feature = "test-util"))]
pub mod scripted;

pub use http::{HttpConfig, HttpTransport};
#[cfg(any(test, feature = "test-util"))]
pub use scripted::ScriptedTransport;

use serde_json::Value;
use subscope_core::Error;

/// HTTP method used by the upstream protocols.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

/// Outgoing request.
#[derive(Debug, Clone, PartialEq)]
pub struct TransportRequest {
    pub url: String,
    pub method: Method,
    pub headers: Vec<(String, String)>,
    pub body: Option<Value>,
}

impl TransportRequest {
    /// GET expecting a JSON answer.
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            method: Method::Get,
            headers: vec![("Accept".into(), "application/json".into())],
            body: None,
        }
    }

    /// POST with a JSON body, expecting a JSON answer.
    pub fn post_json(url: impl Into<String>, body: Value) -> Self {
        Self {
            url: url.into(),
            method: Method::Post,
            headers: vec![
                ("Content-Type".into(), "application/json".into()),
                ("Accept".into(), "application/json".into()),
            ],
            body: Some(body),
        }
    }
}

/// What came back.
#[derive(Debug, Clone, PartialEq)]
pub struct TransportResponse {
    pub ok: bool,
    pub status: u16,
    pub json: Option<Value>,
}

impl TransportResponse {
    /// 200 with a JSON body.
    pub fn ok(json: Value) -> Self {
        Self { ok: true, status: 200, json: Some(json) }
    }

    /// Bodiless response with the given status.
    pub fn status(status: u16) -> Self {
        Self { ok: (200..300).contains(&status), status, json: None }
    }
}

/// Sends requests to the network (or something that pretends to be it).
#[async_trait::async_trait]
pub trait Transport: Send + Sync {
    /// Send `request`.
    ///
    /// Errors are reserved for failures that produced no response at all.
    async fn send(&self, request: TransportRequest) -> Result<TransportResponse, Error>;
}
