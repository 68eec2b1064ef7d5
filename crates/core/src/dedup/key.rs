//! Deterministic in-flight request keys.

use serde_json::{Value, json};
use sha2::{Digest, Sha256};

/// Key for a GraphQL request: SHA-256 of the serialized `{query, variables}` pair.
///
/// `serde_json` objects serialize with sorted keys, so equal variables always
/// produce the same key.
pub fn graphql_request_key(query: &str, variables: &Value) -> String {
    let params = json!({ "query": query, "variables": variables });

    let mut hasher = Sha256::new();
    hasher.update(params.to_string().as_bytes());
    hex::encode(hasher.finalize())
}

/// Key for a plain GET of `url`.
pub fn url_request_key(url: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(b"GET\n");
    hasher.update(url.as_bytes());
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_graphql_key_stability() {
        let a = graphql_request_key("query { x }", &json!({ "names": ["lsd", "mdma"] }));
        let b = graphql_request_key("query { x }", &json!({ "names": ["lsd", "mdma"] }));
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_graphql_key_depends_on_variables() {
        let a = graphql_request_key("query { x }", &json!({ "names": ["lsd"] }));
        let b = graphql_request_key("query { x }", &json!({ "names": ["mdma"] }));
        assert_ne!(a, b);
    }

    #[test]
    fn test_graphql_key_ignores_object_key_order() {
        let a: Value = serde_json::from_str(r#"{"b": 1, "a": 2}"#).unwrap();
        let b: Value = serde_json::from_str(r#"{"a": 2, "b": 1}"#).unwrap();
        assert_eq!(graphql_request_key("q", &a), graphql_request_key("q", &b));
    }

    #[test]
    fn test_url_key_differs_from_graphql_key() {
        let url = "https://tripbot.tripsit.me/api/tripsit/getAllDrugs";
        assert_eq!(url_request_key(url), url_request_key(url));
        assert_ne!(url_request_key(url), graphql_request_key(url, &Value::Null));
    }
}
