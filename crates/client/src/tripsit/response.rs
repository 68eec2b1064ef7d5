//! TripSit response shapes.
//!
//! Every TripSit answer nests its payload under `data.data`: the drug
//! directory as `{drugs: {key: drug}}`, a single drug as an object (sometimes
//! wrapped in a one-element list), and the name list as a list of lists.

use crate::de;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use subscope_core::record::TripSitDetails;
use subscope_core::{Error, Interaction, Interactions, ParseError, Source, SourceDetails, SubstanceRecord, normalize};

/// One drug in the TripSit directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryEntry {
    pub name: String,
    pub aliases: Vec<String>,
}

impl DirectoryEntry {
    /// Whether `key` (already normalized) is this drug's name or one of its aliases.
    pub fn matches(&self, key: &str) -> bool {
        !key.is_empty() && (normalize(&self.name) == key || self.aliases.iter().any(|alias| normalize(alias) == key))
    }
}

/// Parse the `getAllDrugs` answer.
///
/// Non-object entries are skipped; entries without a usable name take their
/// directory key as name.
///
/// # Errors
///
/// `Error::Parse` if `data.data.drugs` is missing or not an object.
pub fn parse_directory(body: &Value) -> Result<Vec<DirectoryEntry>, Error> {
    let drugs = body
        .pointer("/data/data/drugs")
        .and_then(Value::as_object)
        .ok_or_else(|| Error::Parse("TripSit directory has no drugs object".into()))?;

    Ok(drugs
        .iter()
        .filter_map(|(key, drug)| {
            let drug = drug.as_object()?;
            let name = drug
                .get("name")
                .and_then(Value::as_str)
                .filter(|name| !name.trim().is_empty())
                .unwrap_or(key.as_str());
            if name.trim().is_empty() {
                return None;
            }
            let aliases = drug.get("aliases").cloned().map(de::strings_from).unwrap_or_default();
            Some(DirectoryEntry { name: name.to_string(), aliases })
        })
        .collect())
}

/// Parse the `getAllDrugNames` answer into a flat list.
pub fn parse_names(body: &Value) -> Vec<String> {
    match body.pointer("/data/data") {
        Some(Value::Array(items)) => items.iter().cloned().flat_map(de::strings_from).collect(),
        _ => Vec::new(),
    }
}

/// The drug object of a `getDrug` answer, if any.
pub fn drug_payload(body: &Value) -> Option<Value> {
    match body.pointer("/data/data")? {
        Value::Array(items) => items.first().filter(|item| item.is_object()).cloned(),
        Value::Object(drug) => Some(Value::Object(drug.clone())),
        _ => None,
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawDrug {
    name: Option<String>,
    #[serde(deserialize_with = "de::string_list")]
    aliases: Vec<String>,
    properties: Option<RawProperties>,
    #[serde(deserialize_with = "de::string_list")]
    categories: Vec<String>,
    formatted_dose: Option<Value>,
    formatted_duration: Option<Value>,
    interactions: Option<Value>,
    combos: Option<Value>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawProperties {
    dosage: Option<Value>,
    duration: Option<Value>,
    #[serde(deserialize_with = "de::string_list")]
    effects: Vec<String>,
    #[serde(deserialize_with = "de::string_list")]
    warnings: Vec<String>,
    #[serde(deserialize_with = "de::string_list")]
    categories: Vec<String>,
}

/// Map one TripSit drug object into a record.
pub fn parse_drug(value: Value) -> Result<SubstanceRecord, ParseError> {
    let raw: RawDrug = serde_json::from_value(value)?;
    let name = raw.name.filter(|n| !n.trim().is_empty()).ok_or(ParseError::MissingName)?;

    let properties = raw.properties.unwrap_or_default();
    let categories = if properties.categories.is_empty() { raw.categories } else { properties.categories };
    let interactions = raw.interactions.or(raw.combos).map(interactions_from).unwrap_or_default();

    Ok(SubstanceRecord {
        name,
        alternate_names: raw.aliases,
        source: Source::TripSit,
        interactions,
        details: SourceDetails::TripSit(TripSitDetails {
            dosage: table(properties.dosage.or(raw.formatted_dose)),
            duration: table(properties.duration.or(raw.formatted_duration)),
            effects: properties.effects,
            warnings: properties.warnings,
            categories,
        }),
    })
}

/// An object as a table; a bare string is kept under `summary`.
fn table(value: Option<Value>) -> BTreeMap<String, Value> {
    match value {
        Some(Value::Object(map)) => map.into_iter().collect(),
        Some(Value::String(text)) if !text.trim().is_empty() => {
            BTreeMap::from([("summary".to_string(), Value::String(text))])
        }
        _ => BTreeMap::new(),
    }
}

/// Interactions either pre-bucketed (`{dangerous, unsafe, uncertain}`) or as
/// a combo table keyed by drug with a `status` per entry.
fn interactions_from(value: Value) -> Interactions {
    let Value::Object(mut map) = value else {
        return Interactions { uncertain: de::interactions_from(value), ..Interactions::default() };
    };

    if ["dangerous", "unsafe", "uncertain"].iter().any(|bucket| map.contains_key(*bucket)) {
        let mut bucket = |key: &str| map.remove(key).map(de::interactions_from).unwrap_or_default();
        return Interactions { dangerous: bucket("dangerous"), unsafe_: bucket("unsafe"), uncertain: bucket("uncertain") };
    }

    combos_from(map)
}

fn combos_from(map: Map<String, Value>) -> Interactions {
    let mut interactions = Interactions::default();

    for (name, combo) in map {
        if name.trim().is_empty() {
            continue;
        }
        let (status, note) = match &combo {
            Value::Object(fields) => (
                fields.get("status").and_then(Value::as_str).unwrap_or_default().to_lowercase(),
                fields.get("note").and_then(Value::as_str).map(str::to_string),
            ),
            Value::String(status) => (status.to_lowercase(), None),
            _ => (String::new(), None),
        };

        let interaction = Interaction { name, note };
        if status.contains("dangerous") {
            interactions.dangerous.push(interaction);
        } else if status.contains("unsafe") {
            interactions.unsafe_.push(interaction);
        } else {
            interactions.uncertain.push(interaction);
        }
    }

    interactions
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_directory() {
        let body = json!({
            "data": { "data": { "drugs": {
                "lsd": { "name": "lsd", "aliases": ["acid", "lucy"] },
                "2c-b": { "aliases": null },
                "broken": 7
            } } }
        });

        let entries = parse_directory(&body).unwrap();
        assert_eq!(entries.len(), 2);

        let lsd = entries.iter().find(|e| e.name == "lsd").unwrap();
        assert!(lsd.matches("acid"));
        assert!(!lsd.matches(""));
        assert!(entries.iter().any(|e| e.name == "2c-b" && e.matches("2cb")));
    }

    #[test]
    fn test_directory_requires_drugs_object() {
        assert!(matches!(parse_directory(&json!({ "data": { "data": [] } })), Err(Error::Parse(_))));
        assert!(matches!(parse_directory(&json!({})), Err(Error::Parse(_))));
    }

    #[test]
    fn test_parse_names_flattens() {
        let body = json!({ "data": { "data": [["lsd", "mdma"], "dmt"] } });
        assert_eq!(parse_names(&body), vec!["lsd", "mdma", "dmt"]);
    }

    #[test]
    fn test_drug_payload_shapes() {
        assert!(drug_payload(&json!({ "data": { "data": { "name": "lsd" } } })).is_some());
        assert_eq!(drug_payload(&json!({ "data": { "data": [{ "name": "lsd" }] } })).unwrap()["name"], "lsd");
        assert!(drug_payload(&json!({ "data": { "data": [] } })).is_none());
        assert!(drug_payload(&json!({ "data": null })).is_none());
    }

    #[test]
    fn test_parse_drug_properties() {
        let record = parse_drug(json!({
            "name": "mdma",
            "aliases": ["molly", "ecstasy"],
            "properties": {
                "dosage": { "oral": "75-125mg" },
                "duration": "3-5 hours",
                "effects": ["Euphoria", "Empathy"],
                "warnings": "Overheating",
                "categories": ["empathogen", "stimulant"]
            },
            "combos": {
                "tramadol": { "status": "Dangerous", "note": "seizure risk" },
                "alcohol": { "status": "Caution" },
                "mxe": "Unsafe"
            }
        }))
        .unwrap();

        assert_eq!(record.source, Source::TripSit);
        assert!(record.matches("molly"));

        let SourceDetails::TripSit(details) = &record.details else {
            panic!("expected tripsit details");
        };
        assert_eq!(details.dosage["oral"], "75-125mg");
        assert_eq!(details.duration["summary"], "3-5 hours");
        assert_eq!(details.warnings, vec!["Overheating"]);
        assert_eq!(details.categories, vec!["empathogen", "stimulant"]);

        assert_eq!(record.interactions.dangerous[0].name, "tramadol");
        assert_eq!(record.interactions.dangerous[0].note.as_deref(), Some("seizure risk"));
        assert_eq!(record.interactions.unsafe_[0].name, "mxe");
        assert_eq!(record.interactions.uncertain[0].name, "alcohol");
    }

    #[test]
    fn test_parse_drug_bucketed_interactions() {
        let record = parse_drug(json!({
            "name": "lsd",
            "interactions": { "dangerous": ["lithium"], "uncertain": [{ "name": "cannabis" }] }
        }))
        .unwrap();
        assert_eq!(record.interactions.dangerous[0].name, "lithium");
        assert!(record.interactions.unsafe_.is_empty());
        assert_eq!(record.interactions.uncertain[0].name, "cannabis");
    }

    #[test]
    fn test_parse_drug_defaults() {
        let record = parse_drug(json!({ "name": "dmt", "categories": ["psychedelic"], "properties": null })).unwrap();
        assert!(record.alternate_names.is_empty());
        assert!(record.interactions.is_empty());
        let SourceDetails::TripSit(details) = &record.details else {
            panic!("expected tripsit details");
        };
        assert!(details.dosage.is_empty());
        assert_eq!(details.categories, vec!["psychedelic"]);
    }

    #[test]
    fn test_parse_drug_requires_name() {
        assert_eq!(parse_drug(json!({ "aliases": ["x"] })), Err(ParseError::MissingName));
    }
}
