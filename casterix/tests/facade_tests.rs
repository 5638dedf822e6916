//! Smoke tests for the facade re-exports.

use casterix::{DecodeOptions, FieldValue, decode_packet, describe, is_category_defined};
use test_utils::{catalog, data_block};

#[test]
fn decode_through_the_facade() {
    let catalog = catalog();
    let packet = data_block(48, &[0x80, 0x12, 0x34]);

    let result = decode_packet(&catalog, &packet, 0, &DecodeOptions::default());

    assert!(result.errors.is_empty());
    let record = &result.blocks[0].records[0];
    assert_eq!(
        record.item("010").unwrap().field("SAC").unwrap().value,
        FieldValue::Unsigned(0x12)
    );
}

#[test]
fn catalog_queries_through_the_facade() {
    let catalog = catalog();

    assert!(is_category_defined(&catalog, 48));
    assert!(!is_category_defined(&catalog, 21));

    assert_eq!(
        describe(&catalog, 48, None, None, None),
        "Monoradar Target Reports"
    );
    assert_eq!(
        describe(&catalog, 48, Some("010"), None, None),
        "Data Source Identifier"
    );
    assert_eq!(
        describe(&catalog, 48, Some("020"), Some("TYP"), Some(1)),
        "Single PSR detection"
    );
    assert_eq!(describe(&catalog, 48, Some("020"), Some("TYP"), Some(99)), "");
    assert_eq!(describe(&catalog, 99, None, None, None), "");
}

#[test]
fn filtering_through_the_facade() {
    use casterix::{FilterRule, filter_build};

    let filter = filter_build([FilterRule::include().category(48).item("010")]);
    assert!(filter.matches(48, "010", "SAC"));
    assert!(!filter.matches(62, "010", "SAC"));
}
