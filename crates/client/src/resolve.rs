//! Cache partitioning and result assembly shared by the source clients.

use std::collections::HashMap;
use subscope_core::{ExpiringCache, Source, SubstanceRecord, normalize};

/// Records found so far, keyed by the caller's raw names.
pub type LookupResults = HashMap<String, SubstanceRecord>;

/// Split `names` into cache hits and the unique normalized keys still missing.
///
/// Names that normalize to nothing are dropped.
pub(crate) fn partition<S: AsRef<str>>(
    names: &[S], cache: &ExpiringCache<SubstanceRecord>, source: Source,
) -> (LookupResults, Vec<String>) {
    let mut hits = LookupResults::new();
    let mut misses: Vec<String> = Vec::new();

    for raw in names {
        let raw = raw.as_ref();
        let key = normalize(raw);
        if key.is_empty() {
            continue;
        }

        match cache.get(&source.cache_key(&key)) {
            Some(record) => {
                tracing::debug!(source = %source, name = raw, "cache hit");
                hits.insert(raw.to_string(), record);
            }
            None if !misses.contains(&key) => misses.push(key),
            None => {}
        }
    }

    (hits, misses)
}

/// Cache `record` and add it to `results` for every input it answers.
///
/// The record is stored under its canonical key and under each requested key
/// it matched through an alternate name. Inputs already resolved keep their
/// first record. Returns the number of inputs newly resolved.
pub(crate) fn absorb<S: AsRef<str>>(
    record: SubstanceRecord, names: &[S], cache: &ExpiringCache<SubstanceRecord>, source: Source,
    results: &mut LookupResults,
) -> usize {
    let canonical = record.normalized_name();
    cache.set(&source.cache_key(&canonical), record.clone());

    let mut resolved = 0;
    for raw in names {
        let raw = raw.as_ref();
        let key = normalize(raw);
        if !record.matches(&key) || results.contains_key(raw) {
            continue;
        }
        if key != canonical {
            cache.set(&source.cache_key(&key), record.clone());
        }
        results.insert(raw.to_string(), record.clone());
        resolved += 1;
    }

    resolved
}
