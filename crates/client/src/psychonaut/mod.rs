//! PsychonautWiki GraphQL client.
//!
//! ### Lookup
//!
//! - **Endpoint**: POST to the configured GraphQL URL (`https://api.psychonautwiki.org`).
//! - **Batching**: one query per lookup carrying every unique normalized miss as `$names`.
//! - **Caching**: records are stored under `pw_<normalized name>`, and under
//!   `pw_<normalized alias>` when a caller asked for an alternate name.
//! - **Failures**: never surfaced. A failed batch logs and returns the cache
//!   hits, a malformed record logs and is skipped.

pub mod query;
pub mod response;

pub use query::{SUBSTANCES_QUERY, VOCABULARY_LIMIT, VOCABULARY_QUERY};
pub use response::{parse_substance, parse_substances, parse_vocabulary};

use crate::gateway::ApiGateway;
use crate::resolve::{self, LookupResults};
use serde_json::json;
use std::sync::Arc;
use subscope_core::{Error, ExpiringCache, Source, SubstanceRecord};

/// PsychonautWiki client.
#[derive(Debug, Clone)]
pub struct PsychonautClient {
    gateway: ApiGateway,
    cache: Arc<ExpiringCache<SubstanceRecord>>,
    enabled: bool,
}

impl PsychonautClient {
    pub fn new(gateway: ApiGateway, cache: Arc<ExpiringCache<SubstanceRecord>>) -> Self {
        Self { gateway, cache, enabled: true }
    }

    /// Enable or disable the source. A disabled client answers every lookup
    /// with an empty map and makes no requests.
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Look up substances by raw name.
    ///
    /// The result is keyed by the names as given; names that resolve to
    /// nothing are absent.
    pub async fn lookup<S: AsRef<str>>(&self, names: &[S]) -> LookupResults {
        if !self.enabled {
            return LookupResults::new();
        }

        let (mut results, misses) = resolve::partition(names, &self.cache, Source::PsychonautWiki);
        if misses.is_empty() {
            return results;
        }

        tracing::debug!(count = misses.len(), "querying PsychonautWiki");

        let body = match self.gateway.graphql(SUBSTANCES_QUERY, json!({ "names": misses })).await {
            Ok(body) => body,
            Err(e) => {
                tracing::error!(error = %e, names = ?misses, "PsychonautWiki lookup failed");
                return results;
            }
        };

        for parsed in parse_substances(&body) {
            match parsed {
                Ok(record) => {
                    resolve::absorb(record, names, &self.cache, Source::PsychonautWiki, &mut results);
                }
                Err(e) => tracing::warn!(error = %e, "skipping PsychonautWiki record"),
            }
        }

        results
    }

    /// Every name and common name PsychonautWiki knows about.
    ///
    /// # Errors
    ///
    /// Propagates the gateway error; returns an empty list when disabled.
    pub async fn vocabulary(&self) -> Result<Vec<String>, Error> {
        if !self.enabled {
            return Ok(Vec::new());
        }

        let body = self.gateway.graphql(VOCABULARY_QUERY, json!({ "limit": VOCABULARY_LIMIT })).await?;
        Ok(parse_vocabulary(&body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::{ScriptedTransport, TransportResponse};
    use serde_json::Value;
    use std::time::Duration;
    use subscope_core::{ErrorBreaker, RetryPolicy, RetryingFetcher, SourceDetails};

    fn client(transport: Arc<ScriptedTransport>) -> PsychonautClient {
        let fetcher = RetryingFetcher::new(
            Arc::new(ErrorBreaker::default()),
            RetryPolicy { max_attempts: 1, base_delay: Duration::from_millis(1) },
        );
        let gateway = ApiGateway::new(transport, fetcher, "https://api.psychonautwiki.org");
        PsychonautClient::new(gateway, Arc::new(ExpiringCache::new(Duration::from_secs(3600))))
    }

    fn substances(body: Value) -> Arc<ScriptedTransport> {
        Arc::new(ScriptedTransport::new(move |_| Ok(TransportResponse::ok(body.clone()))))
    }

    #[tokio::test]
    async fn test_sends_unique_normalized_misses() {
        let transport = substances(json!({ "data": { "substances": [] } }));
        let client = client(transport.clone());

        let results = client.lookup(&["MDMA", "m.d.m.a", "Ketamine"]).await;
        assert!(results.is_empty());

        let sent = transport.requests();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].body.as_ref().unwrap()["variables"]["names"], json!(["mdma", "ketamine"]));
    }

    #[tokio::test]
    async fn test_malformed_record_does_not_drop_batch() {
        let transport = substances(json!({
            "data": { "substances": [
                { "name": "MDMA", "roas": 7 },
                { "name": 42 },
                "LSD",
                { "name": "Ketamine" }
            ] }
        }));
        let client = client(transport);

        let results = client.lookup(&["MDMA", "Ketamine", "LSD"]).await;
        assert_eq!(results.len(), 2);
        assert_eq!(results["Ketamine"].name, "Ketamine");
        let SourceDetails::Psychonaut(details) = &results["MDMA"].details else {
            panic!("expected psychonaut details");
        };
        assert!(details.routes.is_empty());
    }

    #[tokio::test]
    async fn test_blank_names_make_no_request() {
        let transport = substances(json!({ "data": { "substances": [] } }));
        let client = client(transport.clone());

        assert!(client.lookup(&["", "  ", "--"]).await.is_empty());
        assert!(transport.requests().is_empty());
    }

    #[tokio::test]
    async fn test_failed_batch_returns_hits_only() {
        let transport = Arc::new(ScriptedTransport::new(|req| {
            let names = &req.body.as_ref().unwrap()["variables"]["names"];
            if names == &json!(["lsd"]) {
                Ok(TransportResponse::ok(json!({ "data": { "substances": [{ "name": "LSD" }] } })))
            } else {
                Ok(TransportResponse::status(503))
            }
        }));
        let client = client(transport);

        assert_eq!(client.lookup(&["LSD"]).await.len(), 1);

        let results = client.lookup(&["LSD", "DMT"]).await;
        assert_eq!(results.len(), 1);
        assert!(results.contains_key("LSD"));
    }

    #[tokio::test]
    async fn test_vocabulary() {
        let transport = substances(json!({
            "data": { "substances": [{ "name": "LSD", "commonNames": ["Acid"] }] }
        }));
        let client = client(transport.clone());

        assert_eq!(client.vocabulary().await.unwrap(), vec!["LSD", "Acid"]);
        assert_eq!(transport.requests()[0].body.as_ref().unwrap()["variables"]["limit"], VOCABULARY_LIMIT);
    }

    #[tokio::test]
    async fn test_disabled_client_is_silent() {
        let transport = substances(json!({ "data": { "substances": [{ "name": "LSD" }] } }));
        let client = client(transport.clone()).with_enabled(false);

        assert!(client.lookup(&["LSD"]).await.is_empty());
        assert!(client.vocabulary().await.unwrap().is_empty());
        assert!(transport.requests().is_empty());
    }
}
