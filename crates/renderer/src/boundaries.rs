//! Boundary overlays loaded from GeoJSON.
//!
//! Only geometry is read; properties are ignored. Polygon rings and lines are
//! all kept as polylines since boundaries are only ever stroked.

use std::path::Path;

use firewx_common::BoundingBox;
use projection::MapView;
use serde_json::Value;
use tiny_skia::{LineCap, LineJoin, Paint, PathBuilder, Pixmap, Stroke, Transform};
use tracing::debug;

use crate::colormap::Rgba;
use crate::error::{RenderError, RenderResult};

/// A set of polylines, each a list of (lon, lat) vertices.
#[derive(Debug, Clone, Default)]
pub struct BoundarySet {
    pub name: String,
    pub lines: Vec<Vec<(f64, f64)>>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundaryStyle {
    pub color: Rgba,
    pub width: f32,
}

impl Default for BoundaryStyle {
    fn default() -> Self {
        Self {
            color: [0, 0, 0, 255],
            width: 1.0,
        }
    }
}

impl BoundarySet {
    pub fn from_file(path: &Path) -> RenderResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self::from_geojson(&name, &content)
    }

    pub fn from_geojson(name: &str, json: &str) -> RenderResult<Self> {
        let value: Value = serde_json::from_str(json)?;
        let mut set = BoundarySet {
            name: name.to_string(),
            lines: Vec::new(),
        };
        collect_object(&value, &mut set.lines)?;
        debug!(name = %name, lines = set.lines.len(), "Loaded boundaries");
        Ok(set)
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Total vertex count.
    pub fn vertex_count(&self) -> usize {
        self.lines.iter().map(Vec::len).sum()
    }

    /// Extent of all vertices.
    pub fn bounds(&self) -> Option<BoundingBox> {
        let mut points = self.lines.iter().flatten();
        let &(lon, lat) = points.next()?;
        let init = BoundingBox::new(lon, lat, lon, lat);
        Some(points.fold(init, |b, &(lon, lat)| {
            BoundingBox::new(b.west.min(lon), b.south.min(lat), b.east.max(lon), b.north.max(lat))
        }))
    }

    /// Stroke every line that touches the view's extent.
    ///
    /// `offset` is where the view's pixel (0, 0) sits on `pixmap`; drawing is
    /// clipped to the view rectangle by the caller's panel mask.
    pub fn stroke(
        &self,
        pixmap: &mut Pixmap,
        view: &MapView,
        offset: (f32, f32),
        style: &BoundaryStyle,
        clip: Option<&tiny_skia::Mask>,
    ) -> usize {
        let [r, g, b, a] = style.color;
        let mut paint = Paint::default();
        paint.set_color_rgba8(r, g, b, a);
        paint.anti_alias = true;

        let stroke = Stroke {
            width: style.width,
            line_cap: LineCap::Round,
            line_join: LineJoin::Round,
            ..Stroke::default()
        };
        let transform = Transform::from_translate(offset.0, offset.1);
        let margin = view.extent.expand(0.5);

        let mut drawn = 0;
        for line in &self.lines {
            if line.len() < 2 || !line_touches(line, &margin) {
                continue;
            }

            let mut pb = PathBuilder::new();
            for (i, &(lon, lat)) in line.iter().enumerate() {
                let (x, y) = view.geo_to_pixel(lat, lon);
                if i == 0 {
                    pb.move_to(x as f32, y as f32);
                } else {
                    pb.line_to(x as f32, y as f32);
                }
            }

            if let Some(path) = pb.finish() {
                pixmap.stroke_path(&path, &paint, &stroke, transform, clip);
                drawn += 1;
            }
        }
        drawn
    }
}

fn line_touches(line: &[(f64, f64)], extent: &BoundingBox) -> bool {
    let (mut w, mut s, mut e, mut n) = (f64::MAX, f64::MAX, f64::MIN, f64::MIN);
    for &(lon, lat) in line {
        w = w.min(lon);
        e = e.max(lon);
        s = s.min(lat);
        n = n.max(lat);
    }
    extent.intersects(&BoundingBox::new(w, s, e, n))
}

fn collect_object(value: &Value, out: &mut Vec<Vec<(f64, f64)>>) -> RenderResult<()> {
    let kind = value
        .get("type")
        .and_then(Value::as_str)
        .ok_or_else(|| RenderError::Boundary("object without a type".to_string()))?;

    match kind {
        "FeatureCollection" => {
            let features = value
                .get("features")
                .and_then(Value::as_array)
                .ok_or_else(|| RenderError::Boundary("FeatureCollection without features".to_string()))?;
            for feature in features {
                collect_object(feature, out)?;
            }
        }
        "Feature" => match value.get("geometry") {
            // Null geometry is legal GeoJSON
            Some(Value::Null) | None => {}
            Some(geometry) => collect_object(geometry, out)?,
        },
        "GeometryCollection" => {
            let geometries = value
                .get("geometries")
                .and_then(Value::as_array)
                .ok_or_else(|| RenderError::Boundary("GeometryCollection without geometries".to_string()))?;
            for geometry in geometries {
                collect_object(geometry, out)?;
            }
        }
        "Point" | "MultiPoint" => {}
        geometry => {
            let coords = value
                .get("coordinates")
                .ok_or_else(|| RenderError::Boundary(format!("{} without coordinates", geometry)))?;
            collect_geometry(geometry, coords, out)?;
        }
    }
    Ok(())
}

fn collect_geometry(kind: &str, coords: &Value, out: &mut Vec<Vec<(f64, f64)>>) -> RenderResult<()> {
    // Nesting depth of the line arrays for each geometry type
    let depth = match kind {
        "LineString" => 0,
        "MultiLineString" | "Polygon" => 1,
        "MultiPolygon" => 2,
        other => return Err(RenderError::Boundary(format!("unsupported geometry '{}'", other))),
    };
    collect_lines(coords, depth, out)
}

fn collect_lines(coords: &Value, depth: usize, out: &mut Vec<Vec<(f64, f64)>>) -> RenderResult<()> {
    let items = coords
        .as_array()
        .ok_or_else(|| RenderError::Boundary("coordinates must be arrays".to_string()))?;

    if depth > 0 {
        for item in items {
            collect_lines(item, depth - 1, out)?;
        }
        return Ok(());
    }

    let line = items
        .iter()
        .map(position)
        .collect::<RenderResult<Vec<_>>>()?;
    if !line.is_empty() {
        out.push(line);
    }
    Ok(())
}

fn position(value: &Value) -> RenderResult<(f64, f64)> {
    let pair = value.as_array().filter(|p| p.len() >= 2);
    match pair.map(|p| (p[0].as_f64(), p[1].as_f64())) {
        Some((Some(lon), Some(lat))) => Ok((lon, lat)),
        _ => Err(RenderError::Boundary(format!("bad position {}", value))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position() {
        assert_eq!(position(&serde_json::json!([-120.5, 38.0, 100.0])).unwrap(), (-120.5, 38.0));
        assert!(position(&serde_json::json!([1.0])).is_err());
        assert!(position(&serde_json::json!("x")).is_err());
    }

    #[test]
    fn test_line_touches() {
        let extent = BoundingBox::new(-125.0, 32.0, -114.0, 42.0);
        assert!(line_touches(&[(-130.0, 35.0), (-120.0, 35.0)], &extent));
        assert!(!line_touches(&[(-100.0, 35.0), (-90.0, 35.0)], &extent));
    }
}
