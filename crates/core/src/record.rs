//! Normalized substance records.
//!
//! A record always comes from exactly one [`Source`]; records from different
//! sources are never merged.

use crate::normalize::normalize;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

/// Upstream provider a record was fetched from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, schemars::JsonSchema)]
pub enum Source {
    PsychonautWiki,
    TripSit,
}

impl Source {
    /// Provenance label (`"PsychonautWiki"` / `"TripSit"`).
    pub fn as_str(&self) -> &'static str {
        match self {
            Source::PsychonautWiki => "PsychonautWiki",
            Source::TripSit => "TripSit",
        }
    }

    /// Source-prefixed cache key for a normalized name, e.g. `pw_lsd`.
    pub fn cache_key(&self, normalized: &str) -> String {
        let prefix = match self {
            Source::PsychonautWiki => "pw",
            Source::TripSit => "tripsit",
        };
        format!("{prefix}_{normalized}")
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One interacting substance and an optional note.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, schemars::JsonSchema)]
pub struct Interaction {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

/// Interactions grouped by severity.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, schemars::JsonSchema)]
pub struct Interactions {
    #[serde(default)]
    pub dangerous: Vec<Interaction>,
    #[serde(default, rename = "unsafe")]
    pub unsafe_: Vec<Interaction>,
    #[serde(default)]
    pub uncertain: Vec<Interaction>,
}

impl Interactions {
    pub fn is_empty(&self) -> bool {
        self.dangerous.is_empty() && self.unsafe_.is_empty() && self.uncertain.is_empty()
    }
}

/// Chemical and psychoactive classes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, schemars::JsonSchema)]
pub struct Classification {
    #[serde(default)]
    pub chemical: Vec<String>,
    #[serde(default)]
    pub psychoactive: Vec<String>,
}

/// Time to tolerance levels, as free text (e.g. "3-7 days").
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, schemars::JsonSchema)]
pub struct Tolerance {
    #[serde(default)]
    pub full: Option<String>,
    #[serde(default)]
    pub half: Option<String>,
    #[serde(default)]
    pub zero: Option<String>,
}

/// Inclusive amount range.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize, schemars::JsonSchema)]
pub struct AmountRange {
    #[serde(default)]
    pub min: Option<f64>,
    #[serde(default)]
    pub max: Option<f64>,
}

/// Dose table for one route.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, schemars::JsonSchema)]
pub struct Dose {
    #[serde(default)]
    pub units: Option<String>,
    #[serde(default)]
    pub threshold: Option<f64>,
    #[serde(default)]
    pub light: Option<AmountRange>,
    #[serde(default)]
    pub common: Option<AmountRange>,
    #[serde(default)]
    pub strong: Option<AmountRange>,
    #[serde(default)]
    pub heavy: Option<f64>,
}

/// Time range with units (e.g. 20-40 minutes).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, schemars::JsonSchema)]
pub struct TimeRange {
    #[serde(default)]
    pub min: Option<f64>,
    #[serde(default)]
    pub max: Option<f64>,
    #[serde(default)]
    pub units: Option<String>,
}

/// Duration phases for one route.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, schemars::JsonSchema)]
pub struct DurationProfile {
    #[serde(default)]
    pub onset: Option<TimeRange>,
    #[serde(default)]
    pub comeup: Option<TimeRange>,
    #[serde(default)]
    pub peak: Option<TimeRange>,
    #[serde(default)]
    pub offset: Option<TimeRange>,
    #[serde(default)]
    pub afterglow: Option<TimeRange>,
    #[serde(default)]
    pub total: Option<TimeRange>,
}

/// Dose and duration for one route of administration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, schemars::JsonSchema)]
pub struct Route {
    pub name: String,
    #[serde(default)]
    pub dose: Option<Dose>,
    #[serde(default)]
    pub duration: Option<DurationProfile>,
}

/// PsychonautWiki-specific fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, schemars::JsonSchema)]
pub struct PsychonautDetails {
    #[serde(default)]
    pub classification: Classification,
    #[serde(default)]
    pub tolerance: Tolerance,
    #[serde(default)]
    pub routes: Vec<Route>,
}

/// TripSit-specific fields.
///
/// Dosage and duration tables are kept as TripSit shapes them, keyed by route
/// or level.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, schemars::JsonSchema)]
pub struct TripSitDetails {
    #[serde(default)]
    pub dosage: BTreeMap<String, Value>,
    #[serde(default)]
    pub duration: BTreeMap<String, Value>,
    #[serde(default)]
    pub effects: Vec<String>,
    #[serde(default)]
    pub warnings: Vec<String>,
    #[serde(default)]
    pub categories: Vec<String>,
}

/// Source-specific part of a record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SourceDetails {
    Psychonaut(PsychonautDetails),
    TripSit(TripSitDetails),
}

/// A normalized substance record from one source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, schemars::JsonSchema)]
pub struct SubstanceRecord {
    pub name: String,
    #[serde(default)]
    pub alternate_names: Vec<String>,
    pub source: Source,
    #[serde(default)]
    pub interactions: Interactions,
    pub details: SourceDetails,
}

impl SubstanceRecord {
    /// Normalized key of the canonical name.
    pub fn normalized_name(&self) -> String {
        normalize(&self.name)
    }

    /// Whether `key` (already normalized) names this substance, by canonical
    /// name or by any alternate name. An empty key never matches.
    pub fn matches(&self, key: &str) -> bool {
        if key.is_empty() {
            return false;
        }
        self.normalized_name() == key || self.alternate_names.iter().any(|alt| normalize(alt) == key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lsd() -> SubstanceRecord {
        SubstanceRecord {
            name: "LSD".to_string(),
            alternate_names: vec!["Acid".to_string(), "Lucy".to_string()],
            source: Source::PsychonautWiki,
            interactions: Interactions::default(),
            details: SourceDetails::Psychonaut(PsychonautDetails::default()),
        }
    }

    #[test]
    fn test_cache_key_prefix() {
        assert_eq!(Source::PsychonautWiki.cache_key("lsd"), "pw_lsd");
        assert_eq!(Source::TripSit.cache_key("lsd"), "tripsit_lsd");
    }

    #[test]
    fn test_matches_name_and_alternates() {
        let record = lsd();
        assert!(record.matches("lsd"));
        assert!(record.matches("acid"));
        assert!(!record.matches("mdma"));
        assert!(!record.matches(""));
    }

    #[test]
    fn test_serialized_shape() {
        let mut record = lsd();
        record.interactions.unsafe_.push(Interaction { name: "Lithium".to_string(), note: None });

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["source"], "PsychonautWiki");
        assert_eq!(json["details"]["kind"], "psychonaut");
        assert_eq!(json["interactions"]["unsafe"][0]["name"], "Lithium");
        assert!(json["interactions"]["unsafe"][0].get("note").is_none());
    }

    #[test]
    fn test_source_display() {
        assert_eq!(Source::TripSit.to_string(), "TripSit");
    }
}
