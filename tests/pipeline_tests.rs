//! End-to-end tests for the decode and nest pipeline
//!
//! Tests cover:
//! - Polygon and surface reduction from hand-built tags
//! - Decoding a whole features section and nesting it
//! - Error propagation out of constructors and reducers
//! - Permissive handling of foreign and truncated input

use odbpp::Error;
use odbpp::decoder::{decode_stream, decode_tags};
use odbpp::linerecord::LineRecords;
use odbpp::polygon::{
    Contour, ContourKind, ContourTag, Polygon, PolygonStep, PolygonType, Segment,
    polygon_treeify_rules,
};
use odbpp::structures::{Point, Polarity};
use odbpp::surface::{contour_decoder_options, contour_treeify_rules};
use odbpp::treeifier::{NestingRule, Node, treeify};

fn p(x: &str, y: &str) -> Point {
    Point::parse(x, y).unwrap()
}

#[test]
fn test_single_polygon_from_tags() {
    let tags = vec![
        ContourTag::PolygonBegin {
            start: p("0", "0"),
            polygon_type: PolygonType::Island,
        },
        ContourTag::Segment { end: p("1", "1") },
        ContourTag::PolygonEnd,
    ];

    let out = treeify(tags, &polygon_treeify_rules()).unwrap();

    let expected = Polygon {
        polygon_type: PolygonType::Island,
        steps: vec![PolygonStep::Segment(Segment {
            start: p("0", "0"),
            end: p("1", "1"),
        })],
    };
    assert_eq!(out, vec![Node::Reduced(Contour::Polygon(expected))]);
}

#[test]
fn test_surface_with_rectangle_from_section() {
    let records = LineRecords::parse(
        "UNITS=MM
#
#Layer features
#
P 0 0 1 P 0 0
S P 0
OB 0 0 I
OS 0 10
OS 20 10
OS 20 0
OS 0 0
OE
SE
L 0 0 1 1 0 P 0
",
    );

    let section = records.section("Layer features");
    let slots: Vec<_> = decode_stream(section, contour_decoder_options())
        .collect::<Result<_, _>>()
        .unwrap();
    assert_eq!(slots.len(), section.len());
    assert!(slots[0].is_none());
    assert!(slots.last().unwrap().is_none());

    let tags = decode_tags(section, contour_decoder_options()).unwrap();
    let out = treeify(tags, &contour_treeify_rules()).unwrap();
    assert_eq!(out.len(), 1);

    let Some(Contour::Surface(surface)) = out[0].as_reduced() else {
        panic!("expected a surface, got {:?}", out[0]);
    };
    assert_eq!(surface.polarity, Polarity::Positive);
    assert_eq!(surface.polygons.len(), 1);

    let steps = &surface.polygons[0].steps;
    assert_eq!(steps.len(), 4);
    assert_eq!(steps[0].start(), p("0", "0"));
    assert_eq!(steps[3].end(), p("0", "0"));
    assert_eq!(surface.polygons[0].min(), Some(p("0", "0")));
    assert_eq!(surface.polygons[0].max(), Some(p("20", "10")));
}

#[test]
fn test_malformed_record_keeps_line() {
    // Two decimal points still match the number pattern but cannot be parsed.
    let lines = ["OB 0 0 I", "OS 1.2.3 4", "OE"];
    let err = decode_tags(lines, contour_decoder_options()).unwrap_err();
    match err {
        Error::MalformedRecord { line, .. } => assert_eq!(line, "OS 1.2.3 4"),
        other => panic!("unexpected error {other:?}"),
    }
}

#[test]
fn test_empty_surface() {
    let tags = vec![
        ContourTag::SurfaceBegin {
            polarity: Polarity::Negative,
            dcode: 0,
            attributes: Default::default(),
        },
        ContourTag::SurfaceEnd,
    ];
    let out = treeify(tags, &contour_treeify_rules()).unwrap();
    let Some(Contour::Surface(surface)) = out[0].as_reduced() else {
        panic!("expected a surface");
    };
    assert_eq!(surface.polarity, Polarity::Negative);
    assert!(surface.polygons.is_empty());
}

#[test]
fn test_reducer_failure_propagates() {
    // The polygon reducer rejects scopes that do not start with `OB`.
    let misconfigured = vec![NestingRule::new(
        ContourKind::Segment,
        ContourKind::PolygonEnd,
        polygon_treeify_rules()[0].reduce,
    )];
    let tags = vec![ContourTag::Segment { end: p("1", "1") }, ContourTag::PolygonEnd];
    match treeify(tags, &misconfigured) {
        Err(Error::Reduction { scope, .. }) => assert!(scope.starts_with("Segment")),
        other => panic!("unexpected result {other:?}"),
    }
}

#[test]
fn test_truncated_export_is_permissive() {
    let lines = ["S P 0", "OB 0 0 I", "OS 1 1", "OE", "OB 5 5 H"];
    let tags = decode_tags(lines, contour_decoder_options()).unwrap();
    let out = treeify(tags, &contour_treeify_rules()).unwrap();
    assert!(out.is_empty());

    let stray = ["OS 1 1", "OE", "garbage line"];
    let tags = decode_tags(stray, contour_decoder_options()).unwrap();
    let out = treeify(tags, &contour_treeify_rules()).unwrap();
    assert_eq!(out.len(), 2);
    assert!(out.iter().all(|node| node.as_tag().is_some()));
}
