//! In-process transport driven by a closure.

use super::{Transport, TransportRequest, TransportResponse};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;
use subscope_core::Error;

type Responder = dyn Fn(&TransportRequest) -> Result<TransportResponse, Error> + Send + Sync;

/// Transport that answers every request with a closure and keeps a log.
///
/// Lets the source clients run without a network.
pub struct ScriptedTransport {
    responder: Box<Responder>,
    latency: Option<Duration>,
    requests: Mutex<Vec<TransportRequest>>,
}

impl ScriptedTransport {
    pub fn new<F>(responder: F) -> Self
    where
        F: Fn(&TransportRequest) -> Result<TransportResponse, Error> + Send + Sync + 'static,
    {
        Self { responder: Box::new(responder), latency: None, requests: Mutex::new(Vec::new()) }
    }

    /// Sleep this long before answering each request.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Every request received so far, in order.
    pub fn requests(&self) -> Vec<TransportRequest> {
        self.requests.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// Number of requests whose URL contains `fragment`.
    pub fn count_matching(&self, fragment: &str) -> usize {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|req| req.url.contains(fragment))
            .count()
    }
}

impl std::fmt::Debug for ScriptedTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScriptedTransport").field("latency", &self.latency).finish_non_exhaustive()
    }
}

#[async_trait::async_trait]
impl Transport for ScriptedTransport {
    async fn send(&self, request: TransportRequest) -> Result<TransportResponse, Error> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(request.clone());

        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }

        (self.responder)(&request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_records_requests() {
        let transport = ScriptedTransport::new(|_| Ok(TransportResponse::ok(json!({ "data": {} }))));

        transport.send(TransportRequest::get("https://a.example/x")).await.unwrap();
        transport.send(TransportRequest::get("https://b.example/y")).await.unwrap();

        assert_eq!(transport.requests().len(), 2);
        assert_eq!(transport.count_matching("a.example"), 1);
    }

    #[tokio::test]
    async fn test_propagates_responder_error() {
        let transport = ScriptedTransport::new(|_| Err(Error::Transport("refused".into())));
        let result = transport.send(TransportRequest::get("https://a.example")).await;
        assert!(matches!(result, Err(Error::Transport(_))));
    }
}
