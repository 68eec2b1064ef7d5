//! Request plumbing shared by the source clients.
//!
//! Every upstream call goes through three layers, outermost first:
//!
//! 1. [`RequestDeduplicator`]: concurrent identical requests share one call.
//! 2. [`RetryingFetcher`]: breaker check, then bounded backoff retries.
//! 3. [`Transport`]: the actual send.

use crate::transport::{Transport, TransportRequest};
use serde_json::{Value, json};
use std::sync::Arc;
use subscope_core::dedup::{graphql_request_key, url_request_key};
use subscope_core::{Error, RequestDeduplicator, RetryingFetcher};
use url::Url;

/// Breaker/retry endpoint id for the GraphQL API.
pub const PSYCHONAUT_ENDPOINT: &str = "psychonaut";

/// Deduplicated, retried access to the two upstream protocols.
#[derive(Clone)]
pub struct ApiGateway {
    transport: Arc<dyn Transport>,
    fetcher: RetryingFetcher,
    in_flight: RequestDeduplicator<Value>,
    graphql_url: String,
}

impl std::fmt::Debug for ApiGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiGateway")
            .field("graphql_url", &self.graphql_url)
            .field("fetcher", &self.fetcher)
            .field("in_flight", &self.in_flight)
            .finish_non_exhaustive()
    }
}

impl ApiGateway {
    pub fn new(transport: Arc<dyn Transport>, fetcher: RetryingFetcher, graphql_url: impl Into<String>) -> Self {
        Self { transport, fetcher, in_flight: RequestDeduplicator::new(), graphql_url: graphql_url.into() }
    }

    /// Number of upstream requests currently pending.
    pub fn in_flight(&self) -> usize {
        self.in_flight.in_flight()
    }

    /// POST a GraphQL query.
    ///
    /// The answer is always returned with a top-level `data` member, wrapping
    /// the body in one if upstream did not.
    ///
    /// # Errors
    ///
    /// - `Error::InvalidInput` if `query` is blank (no request is made).
    /// - `Error::CircuitOpen` / `Error::RetriesExhausted` from the retry layer.
    pub async fn graphql(&self, query: &str, variables: Value) -> Result<Value, Error> {
        if query.trim().is_empty() {
            return Err(Error::InvalidInput("query is required".into()));
        }

        let key = graphql_request_key(query, &variables);
        let request = TransportRequest::post_json(&self.graphql_url, json!({ "query": query, "variables": variables }));
        let transport = Arc::clone(&self.transport);
        let fetcher = self.fetcher.clone();

        self.in_flight
            .get_or_create(&key, move || async move {
                let body = fetcher
                    .execute(PSYCHONAUT_ENDPOINT, || send_json(transport.as_ref(), request.clone()))
                    .await?;
                Ok(with_data_envelope(body))
            })
            .await
    }

    /// GET a JSON document.
    ///
    /// The URL's host is the breaker/retry endpoint id.
    ///
    /// # Errors
    ///
    /// - `Error::InvalidInput` if `url` is empty or unparseable (no request is made).
    /// - `Error::CircuitOpen` / `Error::RetriesExhausted` from the retry layer.
    pub async fn get_json(&self, url: &str) -> Result<Value, Error> {
        if url.trim().is_empty() {
            return Err(Error::InvalidInput("URL is required".into()));
        }
        let parsed = Url::parse(url).map_err(|e| Error::InvalidInput(format!("invalid URL {url}: {e}")))?;
        let endpoint = parsed
            .host_str()
            .ok_or_else(|| Error::InvalidInput(format!("URL has no host: {url}")))?
            .to_string();

        let key = url_request_key(parsed.as_str());
        let request = TransportRequest::get(parsed.as_str());
        let transport = Arc::clone(&self.transport);
        let fetcher = self.fetcher.clone();

        self.in_flight
            .get_or_create(&key, move || async move {
                fetcher.execute(&endpoint, || send_json(transport.as_ref(), request.clone())).await
            })
            .await
    }
}

/// One attempt: send and insist on an ok status with a JSON body.
async fn send_json(transport: &dyn Transport, request: TransportRequest) -> Result<Value, Error> {
    let response = transport.send(request).await?;

    if !response.ok {
        return Err(Error::HttpStatus { status: response.status });
    }

    match response.json {
        None | Some(Value::Null) => Err(Error::EmptyResponse),
        Some(json) => Ok(json),
    }
}

fn with_data_envelope(body: Value) -> Value {
    if body.get("data").is_some_and(|data| !data.is_null()) { body } else { json!({ "data": body }) }
}
