//! Layout engine tests: extents, anchoring, ordering and schema checks.
#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::panic
)]

mod common;

use common::{narrow_component, project_component, sample_screen, staffing_component};
use test_case::test_case;
use xlstack::layout::{derive_columns, next_anchor, place_table, to_rows, TableStack, GAP};
use xlstack::{
    layout_all, render, Component, Coordinate, LayoutConfig, Record, Scalar, XlstackError,
};

fn b3() -> Coordinate {
    "B3".parse().unwrap()
}

// ============================================================================
// Single table placement
// ============================================================================

#[test]
fn test_extent_of_four_by_four_table() {
    let block = place_table(&staffing_component(), &Coordinate::new(2, 3).unwrap()).unwrap();

    assert_eq!(
        (block.origin.column(), block.origin.letter(), block.origin.row()),
        (2, "B", 3)
    );
    assert_eq!(
        (block.extent.column(), block.extent.letter(), block.extent.row()),
        (5, "E", 8)
    );
    assert_eq!(block.range_ref(), "B3:E8");
    assert_eq!(block.column_count(), 4);

    let anchor = next_anchor(&block, 2).unwrap();
    assert_eq!((anchor.column(), anchor.letter(), anchor.row()), (2, "B", 10));
}

#[test]
fn test_header_and_rows_follow_first_record() {
    let records = vec![
        Record::new().with("name", "a").with("value", 1),
        Record::new().with("name", "b").with("value", 2),
    ];
    let columns = derive_columns(&records).unwrap();
    assert_eq!(columns, vec!["name", "value"]);
    assert_eq!(
        to_rows(&records, &columns),
        vec![
            vec![Scalar::from("a"), Scalar::from(1)],
            vec![Scalar::from("b"), Scalar::from(2)],
        ]
    );
}

#[test_case(1, 1, "B3:B5"  ; "one row one column")]
#[test_case(3, 1, "B3:B7"  ; "three rows")]
#[test_case(1, 26, "B3:AA5" ; "past Z")]
fn test_extent_arithmetic(rows: usize, columns: usize, expected: &str) {
    let component = Component {
        id: "t".into(),
        rows: (0..rows)
            .map(|r| {
                (0..columns).fold(Record::new(), |rec, c| {
                    rec.with(format!("f{c}"), format!("{r}-{c}"))
                })
            })
            .collect(),
        ..Default::default()
    };
    let block = place_table(&component, &b3()).unwrap();
    assert_eq!(block.range_ref(), expected);
}

// ============================================================================
// Stacking
// ============================================================================

#[test]
fn test_two_components_reanchor_at_left_margin() {
    let screen = sample_screen();
    let blocks = render(&screen.components, &b3(), 2).unwrap();

    assert_eq!(blocks.len(), 2);
    assert_eq!(blocks[0].origin.to_string(), "B3");
    assert_eq!(blocks[0].extent.to_string(), "E8");
    assert_eq!(blocks[1].origin.to_string(), "B10");
    assert_eq!(blocks[1].extent.to_string(), "C15");
}

#[test]
fn test_layout_all_uses_anchor_column_as_margin() {
    let screen = sample_screen();
    assert_eq!(
        layout_all(&screen.components, &b3()).unwrap(),
        render(&screen.components, &b3(), 2).unwrap()
    );
}

#[test]
fn test_explicit_left_margin_differs_from_anchor() {
    let components = vec![narrow_component("a", 1), narrow_component("b", 1)];
    let blocks = render(&components, &"D2".parse().unwrap(), 1).unwrap();
    assert_eq!(blocks[0].origin.to_string(), "D2");
    assert_eq!(blocks[1].origin.to_string(), "A6");
}

#[test]
fn test_blocks_never_overlap_and_keep_order() {
    let components: Vec<Component> = (0..12)
        .map(|i| narrow_component(&format!("c{i}"), i % 5 + 1))
        .collect();
    let blocks = layout_all(&components, &b3()).unwrap();

    assert_eq!(blocks.len(), components.len());
    for (block, component) in blocks.iter().zip(&components) {
        assert_eq!(block.rows.len(), component.rows.len());
        assert!(block.extent.row() >= block.origin.row());
        assert!(block.extent.column() >= block.origin.column());
    }
    for pair in blocks.windows(2) {
        assert!(pair[1].origin.row() > pair[0].extent.row());
        assert_eq!(pair[1].origin.row(), pair[0].extent.row() + GAP);
        assert_eq!(pair[1].origin.column(), 2);
    }
}

#[test]
fn test_layout_is_deterministic() {
    let screen = sample_screen();
    let first = layout_all(&screen.components, &b3()).unwrap();
    let second = layout_all(&screen.components, &b3()).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_empty_component_list() {
    assert!(layout_all(&[], &b3()).unwrap().is_empty());
}

#[test]
fn test_config_gap() {
    let config = LayoutConfig {
        gap: 5,
        ..Default::default()
    };
    let blocks = config
        .layout(&[project_component(), project_component()])
        .unwrap();
    assert_eq!(blocks[1].origin.row(), blocks[0].extent.row() + 5);
}

#[test]
fn test_config_from_json() {
    let config: LayoutConfig =
        serde_json::from_str(r#"{"anchor": "C4", "leftMarginColumn": 1}"#).unwrap();
    assert_eq!(config.anchor.to_string(), "C4");
    assert_eq!(config.gap, GAP);
    assert_eq!(config.left_margin(), 1);

    let err = serde_json::from_str::<LayoutConfig>(r#"{"anchor": "3C"}"#);
    assert!(err.is_err());
}

#[test]
fn test_stack_can_skip_bad_component() {
    let bad = Component {
        id: "bad".into(),
        rows: vec![
            Record::new().with("a", 1),
            Record::new().with("b", 1),
        ],
        ..Default::default()
    };
    let mut stack = TableStack::new(&LayoutConfig::default());
    let first = stack.place(&project_component()).unwrap();
    assert!(stack.place(&bad).is_err());
    let third = stack.place(&project_component()).unwrap();
    assert_eq!(third.origin.row(), first.extent.row() + GAP);
}

// ============================================================================
// Schema validation
// ============================================================================

#[test]
fn test_schema_mismatch_names_component() {
    let component = Component {
        id: "c9".into(),
        rows: vec![
            Record::new().with("name", "a").with("value", 1),
            Record::new().with("name", "b").with("amount", 2),
        ],
        ..Default::default()
    };
    match place_table(&component, &b3()) {
        Err(XlstackError::SchemaMismatch { component, detail }) => {
            assert_eq!(component, "c9");
            assert!(detail.contains("record 1"));
        }
        other => panic!("expected SchemaMismatch, got {other:?}"),
    }
}

#[test]
fn test_schema_mismatch_on_extra_field() {
    let records = vec![
        Record::new().with("name", "a"),
        Record::new().with("name", "b").with("value", 2),
    ];
    assert!(matches!(
        derive_columns(&records),
        Err(XlstackError::SchemaMismatch { .. })
    ));
}

#[test_case(vec![] ; "no records")]
#[test_case(vec![Record::new()] ; "no fields")]
fn test_zero_width_component_rejected(rows: Vec<Record>) {
    let component = Component {
        id: "z".into(),
        rows,
        ..Default::default()
    };
    assert!(matches!(
        place_table(&component, &b3()),
        Err(XlstackError::SchemaMismatch { .. })
    ));
}

#[test]
fn test_table_past_last_column_is_invalid_address() {
    let wide = (0..30).fold(Record::new(), |rec, c| rec.with(format!("f{c}"), c));
    let component = Component {
        id: "wide".into(),
        rows: vec![wide],
        ..Default::default()
    };
    let anchor = Coordinate::new(16_380, 1).unwrap();
    assert!(matches!(
        place_table(&component, &anchor),
        Err(XlstackError::InvalidAddress(_))
    ));
}
