//! Combined lookup over both sources.

use crate::gateway::ApiGateway;
use crate::psychonaut::PsychonautClient;
use crate::resolve::LookupResults;
use crate::transport::{HttpConfig, HttpTransport, Transport};
use crate::tripsit::{TripSitClient, TripSitEndpoints};
use serde::Serialize;
use std::collections::BTreeSet;
use std::sync::Arc;
use subscope_core::{
    AppConfig, CacheStats, Clock, Error, ErrorBreaker, ExpiringCache, RetryingFetcher, SubstanceRecord, SystemClock,
    builtin_names,
};

/// Per-source results side by side, never merged.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SourceResults {
    pub psychonaut_wiki: LookupResults,
    pub tripsit: LookupResults,
}

/// Both source clients over one transport, breaker and record cache.
#[derive(Debug, Clone)]
pub struct SubstanceLookup {
    psychonaut: PsychonautClient,
    tripsit: TripSitClient,
    cache: Arc<ExpiringCache<SubstanceRecord>>,
    breaker: Arc<ErrorBreaker>,
    custom_substances: Vec<String>,
}

impl SubstanceLookup {
    /// Build a lookup that talks HTTP.
    ///
    /// # Errors
    ///
    /// Returns `Error::Transport` if the HTTP client cannot be built.
    pub fn from_config(config: &AppConfig) -> Result<Self, Error> {
        let transport = HttpTransport::new(HttpConfig::from(config))?;
        Ok(Self::with_transport(config, Arc::new(transport), Arc::new(SystemClock)))
    }

    /// Build a lookup over any transport and clock.
    pub fn with_transport(config: &AppConfig, transport: Arc<dyn Transport>, clock: Arc<dyn Clock>) -> Self {
        let breaker = Arc::new(ErrorBreaker::with_clock(
            config.breaker_threshold,
            config.breaker_reset_interval(),
            Arc::clone(&clock),
        ));
        let fetcher = RetryingFetcher::new(breaker.clone(), config.retry_policy());
        let gateway = ApiGateway::new(transport, fetcher, config.psychonaut_url.clone());
        let cache = Arc::new(ExpiringCache::with_clock(config.cache_ttl(), clock));

        let psychonaut =
            PsychonautClient::new(gateway.clone(), Arc::clone(&cache)).with_enabled(config.enable_psychonaut_wiki);
        let tripsit = TripSitClient::new(gateway, Arc::clone(&cache), TripSitEndpoints::from(config))
            .with_enabled(config.enable_tripsit);

        Self { psychonaut, tripsit, cache, breaker, custom_substances: config.custom_substances.clone() }
    }

    pub fn psychonaut(&self) -> &PsychonautClient {
        &self.psychonaut
    }

    pub fn tripsit(&self) -> &TripSitClient {
        &self.tripsit
    }

    /// One record per resolvable name, PsychonautWiki first.
    ///
    /// TripSit is only asked for the names PsychonautWiki left unresolved.
    pub async fn lookup<S: AsRef<str>>(&self, names: &[S]) -> LookupResults {
        let mut results = self.psychonaut.lookup(names).await;

        let remaining: Vec<&str> =
            names.iter().map(AsRef::as_ref).filter(|name| !results.contains_key(*name)).collect();
        if remaining.is_empty() {
            return results;
        }

        for (name, record) in self.tripsit.lookup(&remaining).await {
            results.entry(name).or_insert(record);
        }

        results
    }

    /// Both sources queried concurrently, results kept apart.
    pub async fn lookup_all<S: AsRef<str> + Sync>(&self, names: &[S]) -> SourceResults {
        let (psychonaut_wiki, tripsit) = tokio::join!(self.psychonaut.lookup(names), self.tripsit.lookup(names));
        SourceResults { psychonaut_wiki, tripsit }
    }

    /// Lowercase names and aliases known to the enabled sources, plus the
    /// built-in seed names and the configured custom substances.
    ///
    /// A source that fails is logged and left out; the seed names are
    /// always present.
    pub async fn vocabulary(&self) -> BTreeSet<String> {
        let (psychonaut, tripsit) = tokio::join!(self.psychonaut.vocabulary(), self.tripsit.vocabulary());

        let mut names = builtin_names();
        for (source, outcome) in [("PsychonautWiki", psychonaut), ("TripSit", tripsit)] {
            match outcome {
                Ok(list) => names.extend(list.iter().filter_map(|name| lowercase(name))),
                Err(e) => tracing::warn!(error = %e, source, "vocabulary source unavailable"),
            }
        }
        names.extend(self.custom_substances.iter().filter_map(|name| lowercase(name)));

        tracing::debug!(count = names.len(), "vocabulary built");
        names
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    /// Failure streak recorded against `endpoint`.
    pub fn failure_count(&self, endpoint: &str) -> u32 {
        self.breaker.failure_count(endpoint)
    }
}

fn lowercase(name: &str) -> Option<String> {
    let trimmed = name.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::{ScriptedTransport, TransportResponse};
    use serde_json::json;
    use subscope_core::ManualClock;

    fn config() -> AppConfig {
        AppConfig { retry_max_attempts: 1, custom_substances: vec![" Kava ".into(), "".into()], ..AppConfig::default() }
    }

    #[tokio::test]
    async fn test_vocabulary_skips_failed_source() {
        let transport = Arc::new(ScriptedTransport::new(|req| {
            if req.url.contains("psychonautwiki") {
                Ok(TransportResponse::ok(json!({
                    "data": { "substances": [{ "name": "1P-LSD", "commonNames": ["1P"] }] }
                })))
            } else {
                Ok(TransportResponse::status(500))
            }
        }));
        let lookup = SubstanceLookup::with_transport(&config(), transport, Arc::new(ManualClock::new()));

        let vocabulary = lookup.vocabulary().await;
        let extra: Vec<_> = vocabulary.difference(&builtin_names()).cloned().collect();
        assert_eq!(extra, vec!["1p", "1p-lsd", "kava"]);
    }

    #[tokio::test]
    async fn test_vocabulary_keeps_seed_when_sources_fail() {
        let transport = Arc::new(ScriptedTransport::new(|_| Ok(TransportResponse::status(503))));
        let lookup = SubstanceLookup::with_transport(&config(), transport, Arc::new(ManualClock::new()));

        let vocabulary = lookup.vocabulary().await;
        assert!(builtin_names().is_subset(&vocabulary));
        assert!(vocabulary.contains("molly"));
        assert!(vocabulary.contains("kava"));
    }

    #[test]
    fn test_lowercase() {
        assert_eq!(lowercase("  MDMA "), Some("mdma".to_string()));
        assert_eq!(lowercase("   "), None);
    }
}
