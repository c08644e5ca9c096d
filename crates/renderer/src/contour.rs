//! Outlines of boolean masks.
//!
//! Marching squares over a 0/1 raster puts every crossing on a cell edge
//! midpoint, so nodes are kept in doubled integer coordinates and joined
//! exactly rather than by distance.

use std::collections::HashMap;

use tiny_skia::{LineCap, LineJoin, Paint, PathBuilder, Pixmap, Stroke, Transform};

use crate::colormap::Rgba;

/// A point in raster pixel space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    fn lerp(self, other: Point, t: f32) -> Point {
        Point::new(self.x + t * (other.x - self.x), self.y + t * (other.y - self.y))
    }
}

/// One connected piece of a mask edge.
#[derive(Debug, Clone, PartialEq)]
pub struct Outline {
    pub points: Vec<Point>,
    /// The last point joins back to the first.
    pub closed: bool,
}

/// Edge midpoint in doubled pixel coordinates.
type Node = (u32, u32);

#[derive(Debug, Clone, Copy)]
enum Edge {
    Top,
    Right,
    Bottom,
    Left,
}

impl Edge {
    fn node(self, x: u32, y: u32) -> Node {
        let (x2, y2) = (2 * x, 2 * y);
        match self {
            Edge::Top => (x2 + 1, y2),
            Edge::Right => (x2 + 2, y2 + 1),
            Edge::Bottom => (x2 + 1, y2 + 2),
            Edge::Left => (x2, y2 + 1),
        }
    }
}

/// Edges crossed inside a cell; corner bits are tl=1, tr=2, br=4, bl=8.
fn crossings(case: u8) -> &'static [(Edge, Edge)] {
    use Edge::*;
    match case {
        1 | 14 => &[(Left, Top)],
        2 | 13 => &[(Top, Right)],
        3 | 12 => &[(Left, Right)],
        4 | 11 => &[(Right, Bottom)],
        6 | 9 => &[(Top, Bottom)],
        7 | 8 => &[(Left, Bottom)],
        // Saddles keep the set corners apart
        5 => &[(Left, Top), (Right, Bottom)],
        10 => &[(Top, Right), (Left, Bottom)],
        _ => &[],
    }
}

fn edge_segments(mask: &[bool], width: usize, height: usize) -> Vec<(Node, Node)> {
    if width < 2 || height < 2 || mask.len() != width * height {
        return Vec::new();
    }

    let at = |x: usize, y: usize| mask[y * width + x];
    let mut segments = Vec::new();
    for y in 0..height - 1 {
        for x in 0..width - 1 {
            let case = at(x, y) as u8
                | (at(x + 1, y) as u8) << 1
                | (at(x + 1, y + 1) as u8) << 2
                | (at(x, y + 1) as u8) << 3;
            for &(a, b) in crossings(case) {
                segments.push((a.node(x as u32, y as u32), b.node(x as u32, y as u32)));
            }
        }
    }
    segments
}

/// Follow unused segments from `tip`, returning the nodes reached in order.
fn walk(mut tip: Node, segments: &[(Node, Node)], by_node: &HashMap<Node, Vec<usize>>, used: &mut [bool]) -> Vec<Node> {
    let mut nodes = Vec::new();
    while let Some(&i) = by_node
        .get(&tip)
        .and_then(|ids| ids.iter().find(|&&i| !used[i]))
    {
        used[i] = true;
        let (a, b) = segments[i];
        tip = if a == tip { b } else { a };
        nodes.push(tip);
    }
    nodes
}

/// Edges between `true` and `false` pixels of a row-major mask.
///
/// Set pixels touching the raster border leave the outline open there.
pub fn trace_outline(mask: &[bool], width: usize, height: usize) -> Vec<Outline> {
    let segments = edge_segments(mask, width, height);
    let mut by_node: HashMap<Node, Vec<usize>> = HashMap::new();
    for (i, &(a, b)) in segments.iter().enumerate() {
        by_node.entry(a).or_default().push(i);
        by_node.entry(b).or_default().push(i);
    }

    let mut used = vec![false; segments.len()];
    let mut outlines = Vec::new();
    for start in 0..segments.len() {
        if used[start] {
            continue;
        }
        used[start] = true;
        let (head, tail) = segments[start];

        let ahead = walk(tail, &segments, &by_node, &mut used);
        let behind = walk(head, &segments, &by_node, &mut used);
        let mut nodes: Vec<Node> = behind.into_iter().rev().collect();
        nodes.push(head);
        nodes.push(tail);
        nodes.extend(ahead);

        let closed = nodes.len() > 3 && nodes.first() == nodes.last();
        if closed {
            nodes.pop();
        }
        outlines.push(Outline {
            points: nodes
                .into_iter()
                .map(|(x, y)| Point::new(x as f32 / 2.0, y as f32 / 2.0))
                .collect(),
            closed,
        });
    }

    tracing::debug!(outlines = outlines.len(), segments = segments.len(), "Traced mask outline");
    outlines
}

/// Chaikin corner cutting; open outlines keep their end points.
pub fn smooth(outline: &Outline, passes: u32) -> Outline {
    let mut points = outline.points.clone();
    for _ in 0..passes {
        if points.len() < 3 {
            break;
        }
        let n = points.len();
        let edges: Vec<(Point, Point)> = if outline.closed {
            (0..n).map(|i| (points[i], points[(i + 1) % n])).collect()
        } else {
            points.windows(2).map(|w| (w[0], w[1])).collect()
        };

        let mut next: Vec<Point> = edges
            .iter()
            .flat_map(|&(a, b)| [a.lerp(b, 0.25), a.lerp(b, 0.75)])
            .collect();
        if !outline.closed {
            next.insert(0, points[0]);
            next.push(points[n - 1]);
        }
        points = next;
    }

    Outline {
        points,
        closed: outline.closed,
    }
}

/// Stroke outlines onto `pixmap`, raster pixel (0, 0) landing at `offset`.
///
/// Outline coordinates index pixel centres, hence the half-pixel shift.
pub fn stroke_outlines(pixmap: &mut Pixmap, outlines: &[Outline], color: Rgba, width: f32, offset: (f32, f32)) {
    let [r, g, b, a] = color;
    let mut paint = Paint::default();
    paint.set_color_rgba8(r, g, b, a);
    paint.anti_alias = true;

    let stroke = Stroke {
        width,
        line_cap: LineCap::Round,
        line_join: LineJoin::Round,
        ..Stroke::default()
    };
    let transform = Transform::from_translate(offset.0 + 0.5, offset.1 + 0.5);

    for outline in outlines {
        let Some((first, rest)) = outline.points.split_first() else {
            continue;
        };
        if rest.is_empty() {
            continue;
        }
        let mut pb = PathBuilder::new();
        pb.move_to(first.x, first.y);
        for p in rest {
            pb.line_to(p.x, p.y);
        }
        if outline.closed {
            pb.close();
        }
        if let Some(path) = pb.finish() {
            pixmap.stroke_path(&path, &paint, &stroke, transform, None);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_pixel_is_closed_diamond() {
        #[rustfmt::skip]
        let mask = vec![
            false, false, false,
            false, true, false,
            false, false, false,
        ];
        let outlines = trace_outline(&mask, 3, 3);
        assert_eq!(outlines.len(), 1);
        assert!(outlines[0].closed);
        assert_eq!(outlines[0].points.len(), 4);
        assert!(outlines[0].points.contains(&Point::new(1.0, 0.5)));
    }

    #[test]
    fn test_crossings_on_edge_midpoints() {
        let mask = vec![false, true, false, true];
        let outlines = trace_outline(&mask, 2, 2);
        assert_eq!(outlines.len(), 1);
        assert!(!outlines[0].closed);
        assert!(outlines[0].points.iter().all(|p| p.x == 0.5));
    }

    #[test]
    fn test_smoothing_keeps_open_endpoints() {
        let outline = Outline {
            points: vec![Point::new(0.0, 0.0), Point::new(1.0, 1.0), Point::new(2.0, 0.0)],
            closed: false,
        };
        let smoothed = smooth(&outline, 1);
        assert_eq!(smoothed.points.first(), outline.points.first());
        assert_eq!(smoothed.points.last(), outline.points.last());
        assert_eq!(smoothed.points.len(), 6);
    }
}
