//! Parsing, normalization, and deduplication logic for vendor spec sheets.
//!
//! This crate is deliberately database-free: it turns raw vendor JSON into
//! normalized `(group, key, value)` entries and computes which spec values
//! are common to every variant of a product. Persistence lives in
//! `specdb-db`, orchestration in `specdb-cli`.

mod dedup;
mod error;
mod normalize;
mod sheet;

pub use dedup::{common_specs, CommonSpec, VariantSpecEntry};
pub use error::IngestError;
pub use normalize::{normalize_value, normalized_entries, NormalizedEntry};
pub use sheet::{parse_sheet, SheetEntry, SheetGroup, SheetValue, SpecSheet};
