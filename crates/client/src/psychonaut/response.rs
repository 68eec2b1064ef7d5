//! PsychonautWiki response types and normalization.

use crate::de;
use serde::Deserialize;
use serde_json::Value;
use subscope_core::record::{Classification, Dose, DurationProfile, PsychonautDetails, Route, Tolerance};
use subscope_core::{Interaction, Interactions, ParseError, Source, SourceDetails, SubstanceRecord};

/// Raw substance object from the GraphQL API.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawSubstance {
    pub name: Option<String>,
    #[serde(deserialize_with = "de::string_list")]
    pub common_names: Vec<String>,
    #[serde(deserialize_with = "de::lenient")]
    pub class: Option<RawClass>,
    #[serde(deserialize_with = "de::lenient")]
    pub tolerance: Option<Tolerance>,
    #[serde(deserialize_with = "de::lenient_list")]
    pub roas: Vec<RawRoute>,
    #[serde(deserialize_with = "de::interaction_list")]
    pub uncertain_interactions: Vec<Interaction>,
    #[serde(deserialize_with = "de::interaction_list")]
    pub unsafe_interactions: Vec<Interaction>,
    #[serde(deserialize_with = "de::interaction_list")]
    pub dangerous_interactions: Vec<Interaction>,
}

/// Raw classification.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RawClass {
    #[serde(deserialize_with = "de::string_list")]
    pub chemical: Vec<String>,
    #[serde(deserialize_with = "de::string_list")]
    pub psychoactive: Vec<String>,
}

/// Raw route of administration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RawRoute {
    pub name: Option<String>,
    #[serde(deserialize_with = "de::lenient")]
    pub dose: Option<Dose>,
    #[serde(deserialize_with = "de::lenient")]
    pub duration: Option<DurationProfile>,
}

impl TryFrom<RawSubstance> for SubstanceRecord {
    type Error = ParseError;

    fn try_from(raw: RawSubstance) -> Result<Self, Self::Error> {
        let name = raw.name.filter(|n| !n.trim().is_empty()).ok_or(ParseError::MissingName)?;
        let class = raw.class.unwrap_or_default();

        let routes = raw
            .roas
            .into_iter()
            .filter_map(|roa| roa.name.map(|name| Route { name, dose: roa.dose, duration: roa.duration }))
            .collect();

        Ok(SubstanceRecord {
            name,
            alternate_names: raw.common_names,
            source: Source::PsychonautWiki,
            interactions: Interactions {
                dangerous: raw.dangerous_interactions,
                unsafe_: raw.unsafe_interactions,
                uncertain: raw.uncertain_interactions,
            },
            details: SourceDetails::Psychonaut(PsychonautDetails {
                classification: Classification { chemical: class.chemical, psychoactive: class.psychoactive },
                tolerance: raw.tolerance.unwrap_or_default(),
                routes,
            }),
        })
    }
}

/// Map one substance object into a record.
///
/// Nested parts that do not fit are dropped; only a non-object or a record
/// without a name is an error.
pub fn parse_substance(value: Value) -> Result<SubstanceRecord, ParseError> {
    let raw: RawSubstance = serde_json::from_value(value)?;
    SubstanceRecord::try_from(raw)
}

/// Map every entry of `data.substances`, one result per entry.
///
/// A missing or non-list `substances` member yields no entries.
pub fn parse_substances(body: &Value) -> Vec<Result<SubstanceRecord, ParseError>> {
    match body.pointer("/data/substances") {
        Some(Value::Array(items)) => items.iter().cloned().map(parse_substance).collect(),
        _ => Vec::new(),
    }
}

/// Names and common names from a vocabulary query answer.
pub fn parse_vocabulary(body: &Value) -> Vec<String> {
    let Some(Value::Array(items)) = body.pointer("/data/substances") else {
        return Vec::new();
    };

    items
        .iter()
        .flat_map(|item| {
            let name = item.get("name").cloned().map(de::strings_from).unwrap_or_default();
            let common = item.get("commonNames").cloned().map(de::strings_from).unwrap_or_default();
            name.into_iter().chain(common)
        })
        .collect()
}
