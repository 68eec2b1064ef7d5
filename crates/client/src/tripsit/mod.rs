//! TripSit REST client.
//!
//! A lookup resolves misses in two steps: the drug directory (`getAllDrugs`)
//! is searched by name and alias, then each matched drug is fetched from
//! `getDrug?name=` one at a time. The directory is cached with the same TTL
//! as records.

pub mod response;

pub use response::{DirectoryEntry, drug_payload, parse_directory, parse_drug, parse_names};

use crate::gateway::ApiGateway;
use crate::resolve::{self, LookupResults};
use std::sync::Arc;
use subscope_core::{AppConfig, Error, ExpiringCache, Source, SubstanceRecord, normalize};
use url::Url;

const DIRECTORY_KEY: &str = "tripsit_directory";

/// The three TripSit endpoints.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TripSitEndpoints {
    pub names: String,
    pub drugs: String,
    pub drug: String,
}

impl From<&AppConfig> for TripSitEndpoints {
    fn from(config: &AppConfig) -> Self {
        Self { names: config.tripsit_names_url(), drugs: config.tripsit_drugs_url(), drug: config.tripsit_drug_url() }
    }
}

impl Default for TripSitEndpoints {
    fn default() -> Self {
        Self::from(&AppConfig::default())
    }
}

/// TripSit client.
#[derive(Debug, Clone)]
pub struct TripSitClient {
    gateway: ApiGateway,
    cache: Arc<ExpiringCache<SubstanceRecord>>,
    directory: Arc<ExpiringCache<Arc<[DirectoryEntry]>>>,
    endpoints: TripSitEndpoints,
    enabled: bool,
}

impl TripSitClient {
    /// The directory cache shares the record cache's TTL and clock.
    pub fn new(gateway: ApiGateway, cache: Arc<ExpiringCache<SubstanceRecord>>, endpoints: TripSitEndpoints) -> Self {
        let directory = Arc::new(ExpiringCache::with_clock(cache.ttl(), cache.clock()));
        Self { gateway, cache, directory, endpoints, enabled: true }
    }

    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Look up substances by raw name.
    ///
    /// The result is keyed by the names as given. A directory failure logs and
    /// returns the cache hits; a failed detail fetch logs and skips that drug.
    pub async fn lookup<S: AsRef<str>>(&self, names: &[S]) -> LookupResults {
        if !self.enabled {
            return LookupResults::new();
        }

        let (mut results, misses) = resolve::partition(names, &self.cache, Source::TripSit);
        if misses.is_empty() {
            return results;
        }

        let directory = match self.directory().await {
            Ok(directory) => directory,
            Err(e) => {
                tracing::error!(error = %e, names = ?misses, "TripSit lookup failed");
                return results;
            }
        };

        let mut matched: Vec<&DirectoryEntry> = Vec::new();
        for key in &misses {
            if let Some(entry) = directory.iter().find(|entry| entry.matches(key))
                && !matched.iter().any(|m| m.name == entry.name)
            {
                matched.push(entry);
            }
        }

        tracing::debug!(misses = misses.len(), matched = matched.len(), "TripSit directory search");

        for entry in matched {
            match self.drug(entry).await {
                Ok(record) => {
                    resolve::absorb(record, names, &self.cache, Source::TripSit, &mut results);
                }
                Err(e) => tracing::warn!(error = %e, drug = %entry.name, "skipping TripSit drug"),
            }
        }

        results
    }

    /// Every drug name TripSit knows about (`getAllDrugNames`).
    ///
    /// # Errors
    ///
    /// Propagates the gateway error; returns an empty list when disabled.
    pub async fn drug_names(&self) -> Result<Vec<String>, Error> {
        if !self.enabled {
            return Ok(Vec::new());
        }
        let body = self.gateway.get_json(&self.endpoints.names).await?;
        Ok(parse_names(&body))
    }

    /// Names and aliases from the drug directory.
    ///
    /// # Errors
    ///
    /// Propagates the gateway or directory parse error; returns an empty list
    /// when disabled.
    pub async fn vocabulary(&self) -> Result<Vec<String>, Error> {
        if !self.enabled {
            return Ok(Vec::new());
        }
        let directory = self.directory().await?;
        Ok(directory.iter().flat_map(|entry| std::iter::once(entry.name.clone()).chain(entry.aliases.clone())).collect())
    }

    async fn directory(&self) -> Result<Arc<[DirectoryEntry]>, Error> {
        if let Some(directory) = self.directory.get(DIRECTORY_KEY) {
            return Ok(directory);
        }

        let body = self.gateway.get_json(&self.endpoints.drugs).await?;
        let directory: Arc<[DirectoryEntry]> = parse_directory(&body)?.into();
        self.directory.set(DIRECTORY_KEY, Arc::clone(&directory));
        Ok(directory)
    }

    /// Fetch and parse one drug, folding in the directory's aliases.
    async fn drug(&self, entry: &DirectoryEntry) -> Result<SubstanceRecord, Error> {
        let url = Url::parse_with_params(&self.endpoints.drug, &[("name", entry.name.as_str())])
            .map_err(|e| Error::InvalidInput(format!("invalid TripSit URL: {e}")))?;

        let body = self.gateway.get_json(url.as_str()).await?;
        let payload = drug_payload(&body).ok_or_else(|| Error::Parse(format!("no drug object for {}", entry.name)))?;
        let mut record = parse_drug(payload)?;

        for alias in &entry.aliases {
            let key = normalize(alias);
            if !key.is_empty() && !record.matches(&key) {
                record.alternate_names.push(alias.clone());
            }
        }

        Ok(record)
    }
}
