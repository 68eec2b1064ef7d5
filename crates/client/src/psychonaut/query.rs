//! GraphQL documents sent to PsychonautWiki.

/// Full records for a list of normalized names (`$names`).
pub const SUBSTANCES_QUERY: &str = r#"
query getSubstances($names: [String!]!) {
    substances(query: $names) {
        name
        commonNames
        class { chemical psychoactive }
        tolerance { full half zero }
        roas {
            name
            dose {
                units
                threshold
                heavy
                light { min max }
                common { min max }
                strong { min max }
            }
            duration {
                onset { min max units }
                comeup { min max units }
                peak { min max units }
                offset { min max units }
                afterglow { min max units }
                total { min max units }
            }
        }
        uncertainInteractions { name note }
        unsafeInteractions { name note }
        dangerousInteractions { name note }
    }
}
"#;

/// Names and common names of every substance, up to `$limit`.
pub const VOCABULARY_QUERY: &str = r#"
query getSubstanceNames($limit: Int) {
    substances(limit: $limit) {
        name
        commonNames
    }
}
"#;

/// Upper bound passed as `$limit` to [`VOCABULARY_QUERY`].
pub const VOCABULARY_LIMIT: u32 = 10_000;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interactions_request_notes() {
        for list in ["uncertainInteractions", "unsafeInteractions", "dangerousInteractions"] {
            assert!(SUBSTANCES_QUERY.contains(&format!("{list} {{ name note }}")), "{list} without note");
        }
    }
}
