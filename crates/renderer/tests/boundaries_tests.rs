//! Tests for GeoJSON boundary loading and stroking.

use firewx_common::BoundingBox;
use projection::MapView;
use renderer::{BoundarySet, BoundaryStyle, RenderError};
use tiny_skia::Pixmap;

const STATES: &str = r#"{
    "type": "FeatureCollection",
    "features": [
        {
            "type": "Feature",
            "properties": { "name": "Box" },
            "geometry": {
                "type": "Polygon",
                "coordinates": [[[-122, 34], [-118, 34], [-118, 38], [-122, 38], [-122, 34]]]
            }
        },
        {
            "type": "Feature",
            "properties": {},
            "geometry": {
                "type": "MultiPolygon",
                "coordinates": [
                    [[[-100, 40], [-99, 40], [-99, 41], [-100, 40]]],
                    [[[-98, 40], [-97, 40], [-97, 41], [-98, 40]], [[-97.8, 40.2], [-97.5, 40.2], [-97.5, 40.5], [-97.8, 40.2]]]
                ]
            }
        },
        { "type": "Feature", "properties": {}, "geometry": null },
        {
            "type": "Feature",
            "properties": {},
            "geometry": { "type": "Point", "coordinates": [-120, 36] }
        }
    ]
}"#;

#[test]
fn test_feature_collection_rings() {
    let set = BoundarySet::from_geojson("states", STATES).unwrap();
    // One polygon ring plus three multipolygon rings; null and point geometries add nothing
    assert_eq!(set.lines.len(), 4);
    assert_eq!(set.lines[0][0], (-122.0, 34.0));
    assert_eq!(set.vertex_count(), 5 + 4 + 4 + 4);
}

#[test]
fn test_line_geometries() {
    let json = r#"{
        "type": "GeometryCollection",
        "geometries": [
            { "type": "LineString", "coordinates": [[-120, 35], [-119, 36]] },
            { "type": "MultiLineString", "coordinates": [[[-110, 30], [-111, 31]], [[-112, 32], [-113, 33]]] }
        ]
    }"#;
    let set = BoundarySet::from_geojson("lines", json).unwrap();
    assert_eq!(set.lines.len(), 3);
}

#[test]
fn test_bounds() {
    let set = BoundarySet::from_geojson("states", STATES).unwrap();
    let b = set.bounds().unwrap();
    assert_eq!((b.west, b.south, b.east, b.north), (-122.0, 34.0, -97.0, 41.0));
    assert!(BoundarySet::default().bounds().is_none());
}

#[test]
fn test_invalid_geojson() {
    assert!(matches!(
        BoundarySet::from_geojson("bad", r#"{"type": "Polygon"}"#),
        Err(RenderError::Boundary(_))
    ));
    assert!(matches!(
        BoundarySet::from_geojson("bad", r#"{"type": "Polygon", "coordinates": [[[1]]]}"#),
        Err(RenderError::Boundary(_))
    ));
    assert!(matches!(BoundarySet::from_geojson("bad", "not json"), Err(RenderError::Json(_))));
}

#[test]
fn test_from_file_uses_stem_as_name() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("gacc.geojson");
    std::fs::write(&path, STATES).unwrap();
    let set = BoundarySet::from_file(&path).unwrap();
    assert_eq!(set.name, "gacc");
    assert!(!set.is_empty());
}

#[test]
fn test_stroke_only_visible_lines() {
    let set = BoundarySet::from_geojson("states", STATES).unwrap();
    let view = MapView::new(BoundingBox::new(-124.0, 32.0, -116.0, 40.0), 80, 80);
    let mut pixmap = Pixmap::new(80, 80).unwrap();

    let drawn = set.stroke(&mut pixmap, &view, (0.0, 0.0), &BoundaryStyle::default(), None);
    assert_eq!(drawn, 1);

    // West edge of the box sits at lon -122, i.e. x = 20
    let px = pixmap.pixel(20, 40).unwrap();
    assert!(px.alpha() > 0);
    // Interior stays empty
    assert_eq!(pixmap.pixel(40, 40).unwrap().alpha(), 0);
}
