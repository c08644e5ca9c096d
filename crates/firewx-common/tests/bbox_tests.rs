//! Tests for BoundingBox parsing and geometry.

use firewx_common::bbox::{BboxParseError, BoundingBox};
use firewx_common::FireWxError;

// ============================================================================
// Parsing
// ============================================================================

#[test]
fn test_parse_with_whitespace() {
    let bbox = BoundingBox::from_bounds_string(" -120.5 , 35.25, -110 ,42 ").unwrap();
    assert!((bbox.west + 120.5).abs() < 1e-9);
    assert!((bbox.south - 35.25).abs() < 1e-9);
    assert_eq!(bbox.east, -110.0);
    assert_eq!(bbox.north, 42.0);
}

#[test]
fn test_parse_wrong_count() {
    let result = BoundingBox::from_bounds_string("-120,35,-110");
    assert!(matches!(result, Err(BboxParseError::InvalidFormat(_))));
}

#[test]
fn test_parse_bad_number() {
    let result = BoundingBox::from_bounds_string("-120,35,east,42");
    assert!(matches!(result, Err(BboxParseError::InvalidNumber(_))));
}

#[test]
fn test_parse_inverted() {
    let result = BoundingBox::from_bounds_string("-110,35,-120,42");
    assert!(matches!(result, Err(BboxParseError::Inverted(_))));

    let result = BoundingBox::from_bounds_string("-120,42,-110,35");
    assert!(matches!(result, Err(BboxParseError::Inverted(_))));
}

#[test]
fn test_parse_out_of_range() {
    let result = BoundingBox::from_bounds_string("-200,35,-110,42");
    assert!(matches!(result, Err(BboxParseError::OutOfRange(_))));
}

#[test]
fn test_parse_error_converts() {
    let err: FireWxError = BoundingBox::from_bounds_string("nope").unwrap_err().into();
    assert!(matches!(err, FireWxError::InvalidBbox(_)));
}

// ============================================================================
// Geometry
// ============================================================================

#[test]
fn test_dimensions_and_center() {
    let bbox = BoundingBox::new(-124.0, 32.0, -114.0, 42.0);
    assert_eq!(bbox.width(), 10.0);
    assert_eq!(bbox.height(), 10.0);
    assert_eq!(bbox.area(), 100.0);
    assert_eq!(bbox.center(), (37.0, -119.0));
}

#[test]
fn test_contains_point_edges() {
    let bbox = BoundingBox::new(-124.0, 32.0, -114.0, 42.0);
    assert!(bbox.contains_point(32.0, -124.0));
    assert!(bbox.contains_point(42.0, -114.0));
    assert!(!bbox.contains_point(42.01, -120.0));
    assert!(!bbox.contains_point(35.0, -113.9));
}

#[test]
fn test_covers() {
    let outer = BoundingBox::new(-125.0, 31.5, -113.5, 42.5);
    let inner = BoundingBox::new(-124.6, 32.4, -114.1, 42.1);
    assert!(outer.covers(&inner));
    assert!(!inner.covers(&outer));
    assert!(outer.covers(&outer));
}

#[test]
fn test_touching_boxes_do_not_intersect() {
    let a = BoundingBox::new(0.0, 0.0, 10.0, 10.0);
    let b = BoundingBox::new(10.0, 0.0, 20.0, 10.0);
    assert!(!a.intersects(&b));
}

#[test]
fn test_expand_clamps() {
    let bbox = BoundingBox::new(-179.5, 89.0, -170.0, 89.5).expand(1.0);
    assert_eq!(bbox.west, -180.0);
    assert_eq!(bbox.north, 90.0);
    assert_eq!(bbox.south, 88.0);
    assert_eq!(bbox.east, -169.0);
}
