//! Serde types for the vendor spec-sheet format.
//!
//! A sheet is a list of named groups, each holding `{key, value}` pairs
//! where `value` is either a single string or a list of strings:
//!
//! ```json
//! { "specs": [ { "group_name": "Display",
//!                "specs": [ { "key": "Screen size", "value": "6.1 inch" },
//!                           { "key": "Features", "value": ["HDR10", "120Hz"] } ] } ] }
//! ```

use serde::{Deserialize, Serialize};

use crate::error::IngestError;

/// A full vendor spec sheet for one product variant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpecSheet {
    pub specs: Vec<SheetGroup>,
}

/// A named group of spec entries (e.g. "Display", "Camera").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SheetGroup {
    pub group_name: String,
    pub specs: Vec<SheetEntry>,
}

/// One attribute within a group.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SheetEntry {
    pub key: String,
    pub value: SheetValue,
}

/// A spec value as vendors ship it: a scalar string or a list of strings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SheetValue {
    Scalar(String),
    List(Vec<String>),
}

/// Parses a raw JSON blob into a [`SpecSheet`].
///
/// `context` identifies the owning variant in error messages (e.g. a SKU).
///
/// # Errors
///
/// Returns [`IngestError::MalformedSheet`] if the blob is missing the
/// `specs` field or any group/entry has the wrong shape.
pub fn parse_sheet(raw: &serde_json::Value, context: &str) -> Result<SpecSheet, IngestError> {
    serde_json::from_value(raw.clone()).map_err(|source| IngestError::MalformedSheet {
        context: context.to_owned(),
        source,
    })
}
