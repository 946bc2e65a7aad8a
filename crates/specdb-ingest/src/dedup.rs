//! Pure intersection logic for the deduplication engine.
//!
//! Two variant spec entries are considered equal when they share the same
//! `(key_id, value)` pair: content equality, never row identity. The same
//! literal value under a different key is a different spec.

use std::collections::BTreeMap;

/// One variant-level spec link, as loaded from `variant_specs` joined with
/// `spec_values`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariantSpecEntry {
    pub spec_value_id: i64,
    pub key_id: i64,
    pub value: String,
}

/// A spec shared by every variant of a product, ready to be promoted.
///
/// `spec_value_id` is the canonical row to link at product level.
/// `matching_value_ids` lists every `spec_values` id that carried the same
/// `(key_id, value)` content across the variants, normally just the
/// canonical id, but duplicates are tolerated and all of them must be
/// pruned from `variant_specs`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommonSpec {
    pub spec_value_id: i64,
    pub matching_value_ids: Vec<i64>,
}

/// Computes the specs common to every variant.
///
/// Returns an empty result for fewer than two variant sets: a product with
/// zero or one variant has nothing to deduplicate. When several spec_value
/// rows share the same `(key_id, value)` content, the smallest id wins as
/// canonical so promotion is deterministic.
#[must_use]
pub fn common_specs(variant_sets: &[Vec<VariantSpecEntry>]) -> Vec<CommonSpec> {
    if variant_sets.len() < 2 {
        return Vec::new();
    }

    let mut acc = index_entries(&variant_sets[0]);

    for set in &variant_sets[1..] {
        let indexed = index_entries(set);
        acc.retain(|pair, _| indexed.contains_key(pair));
        for (pair, ids) in indexed {
            if let Some(existing) = acc.get_mut(&pair) {
                existing.extend(ids);
            }
        }
        if acc.is_empty() {
            return Vec::new();
        }
    }

    acc.into_values()
        .map(|mut ids| {
            ids.sort_unstable();
            ids.dedup();
            CommonSpec {
                spec_value_id: ids[0],
                matching_value_ids: ids,
            }
        })
        .collect()
}

/// Index one variant's entries by content pair, collecting every id that
/// maps to the pair.
fn index_entries(entries: &[VariantSpecEntry]) -> BTreeMap<(i64, &str), Vec<i64>> {
    let mut map: BTreeMap<(i64, &str), Vec<i64>> = BTreeMap::new();
    for entry in entries {
        map.entry((entry.key_id, entry.value.as_str()))
            .or_default()
            .push(entry.spec_value_id);
    }
    map
}

#[cfg(test)]
#[path = "dedup_test.rs"]
mod tests;
