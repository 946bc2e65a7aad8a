use super::*;
use crate::sheet::{SheetEntry, SheetGroup};

// -----------------------------------------------------------------------
// normalize_value
// -----------------------------------------------------------------------

#[test]
fn normalize_value_joins_list_with_commas() {
    let value = SheetValue::List(vec!["A".to_owned(), "B".to_owned(), "C".to_owned()]);
    assert_eq!(normalize_value(&value), "A,B,C");
}

#[test]
fn normalize_value_trims_scalar() {
    let value = SheetValue::Scalar("  X  ".to_owned());
    assert_eq!(normalize_value(&value), "X");
}

#[test]
fn normalize_value_empty_list_yields_empty_string() {
    let value = SheetValue::List(vec![]);
    assert_eq!(normalize_value(&value), "");
}

#[test]
fn normalize_value_whitespace_scalar_yields_empty_string() {
    let value = SheetValue::Scalar("   ".to_owned());
    assert_eq!(normalize_value(&value), "");
}

// -----------------------------------------------------------------------
// normalized_entries
// -----------------------------------------------------------------------

fn entry(key: &str, value: SheetValue) -> SheetEntry {
    SheetEntry {
        key: key.to_owned(),
        value,
    }
}

fn sheet(groups: Vec<SheetGroup>) -> SpecSheet {
    SpecSheet { specs: groups }
}

#[test]
fn normalized_entries_flattens_groups() {
    let s = sheet(vec![
        SheetGroup {
            group_name: "Display".to_owned(),
            specs: vec![
                entry("Screen size", SheetValue::Scalar("6.1 inch".to_owned())),
                entry(
                    "Features",
                    SheetValue::List(vec!["HDR10".to_owned(), "120Hz".to_owned()]),
                ),
            ],
        },
        SheetGroup {
            group_name: "Camera".to_owned(),
            specs: vec![entry("Rear", SheetValue::Scalar("48 MP".to_owned()))],
        },
    ]);

    let (entries, skipped) = normalized_entries(&s);
    assert_eq!(skipped, 0);
    assert_eq!(
        entries,
        vec![
            NormalizedEntry {
                group: "Display".to_owned(),
                key: "Screen size".to_owned(),
                value: "6.1 inch".to_owned(),
            },
            NormalizedEntry {
                group: "Display".to_owned(),
                key: "Features".to_owned(),
                value: "HDR10,120Hz".to_owned(),
            },
            NormalizedEntry {
                group: "Camera".to_owned(),
                key: "Rear".to_owned(),
                value: "48 MP".to_owned(),
            },
        ]
    );
}

#[test]
fn normalized_entries_skips_empty_values() {
    let s = sheet(vec![SheetGroup {
        group_name: "Misc".to_owned(),
        specs: vec![
            entry("Blank", SheetValue::Scalar("   ".to_owned())),
            entry("Kept", SheetValue::Scalar("value".to_owned())),
            entry("EmptyList", SheetValue::List(vec![])),
        ],
    }]);

    let (entries, skipped) = normalized_entries(&s);
    assert_eq!(skipped, 2);
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].key, "Kept");
}

#[test]
fn normalized_entries_trims_group_and_key_names() {
    let s = sheet(vec![SheetGroup {
        group_name: " Display ".to_owned(),
        specs: vec![entry(" Screen size ", SheetValue::Scalar("6.1".to_owned()))],
    }]);

    let (entries, _) = normalized_entries(&s);
    assert_eq!(entries[0].group, "Display");
    assert_eq!(entries[0].key, "Screen size");
}
