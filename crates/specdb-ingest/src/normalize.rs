//! Normalization from raw sheet entries to flat `(group, key, value)` rows.
//!
//! List values are collapsed to a single comma-joined string so that a
//! value is always one row in `spec_values`. Entries whose normalized
//! value is empty are skipped, never stored.

use crate::sheet::{SheetValue, SpecSheet};

/// A flattened, normalized spec entry ready for upsert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedEntry {
    pub group: String,
    pub key: String,
    pub value: String,
}

/// Collapses a sheet value to a single trimmed string.
///
/// Lists are joined with `","` before trimming, so `["A", "B"]` becomes
/// `"A,B"` and `"  X  "` becomes `"X"`.
#[must_use]
pub fn normalize_value(value: &SheetValue) -> String {
    let joined = match value {
        SheetValue::Scalar(s) => s.clone(),
        SheetValue::List(items) => items.join(","),
    };
    joined.trim().to_owned()
}

/// Flattens a parsed sheet into normalized entries.
///
/// Group and key names are trimmed. Entries with an empty normalized value
/// are dropped with a warning; the second element of the returned tuple
/// counts how many were dropped.
#[must_use]
pub fn normalized_entries(sheet: &SpecSheet) -> (Vec<NormalizedEntry>, usize) {
    let mut entries = Vec::new();
    let mut skipped = 0usize;

    for group in &sheet.specs {
        let group_name = group.group_name.trim();
        for entry in &group.specs {
            let value = normalize_value(&entry.value);
            if value.is_empty() {
                tracing::warn!(
                    group = group_name,
                    key = %entry.key,
                    "skipping spec entry with empty normalized value"
                );
                skipped += 1;
                continue;
            }
            entries.push(NormalizedEntry {
                group: group_name.to_owned(),
                key: entry.key.trim().to_owned(),
                value,
            });
        }
    }

    (entries, skipped)
}

#[cfg(test)]
#[path = "normalize_test.rs"]
mod tests;
