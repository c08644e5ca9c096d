//! Horizontal colorbar drawn in the band under the map panel.
//!
//! Every bin gets the same width regardless of its value span. Extended
//! colormaps get a triangle at the open end(s).

use tiny_skia::{FillRule, Paint, PathBuilder, Pixmap, Rect, Stroke, Transform};

use crate::colormap::{Colormap, Extend};
use crate::text::format_value;

/// Bar geometry in figure pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorbarLayout {
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
}

/// A tick label to be drawn under the bar, centered on `x`.
#[derive(Debug, Clone, PartialEq)]
pub struct TickLabel {
    pub x: f32,
    pub y: f32,
    pub text: String,
}

impl ColorbarLayout {
    /// Centered bar spanning `shrink` of the figure width.
    pub fn new(figure_width: u32, band_top: u32, shrink: f32) -> Self {
        let width = figure_width as f32 * shrink.clamp(0.1, 1.0);
        Self {
            left: (figure_width as f32 - width) / 2.0,
            top: band_top as f32 + 14.0,
            width,
            height: 22.0,
        }
    }

    /// Horizontal position of `value` along the bar, if it falls inside.
    pub fn x_for(&self, cmap: &Colormap, value: f32) -> Option<f32> {
        let bin_w = self.width / cmap.num_bins() as f32;
        let k = cmap
            .levels
            .windows(2)
            .position(|w| value >= w[0] && value <= w[1])?;
        let (lo, hi) = (cmap.levels[k], cmap.levels[k + 1]);
        let t = (value - lo) / (hi - lo);
        Some(self.left + (k as f32 + t) * bin_w)
    }
}

/// Draw the bar and return where its tick labels go.
pub fn draw_colorbar(pixmap: &mut Pixmap, cmap: &Colormap, layout: &ColorbarLayout) -> Vec<TickLabel> {
    let bins = cmap.num_bins();
    let bin_w = layout.width / bins as f32;
    let mut paint = Paint::default();
    paint.anti_alias = false;

    for (k, color) in cmap.colors.iter().enumerate() {
        let Some(rect) = Rect::from_xywh(layout.left + k as f32 * bin_w, layout.top, bin_w.max(1.0), layout.height)
        else {
            continue;
        };
        paint.set_color_rgba8(color[0], color[1], color[2], 255);
        pixmap.fill_rect(rect, &paint, Transform::identity(), None);
    }

    paint.anti_alias = true;
    let tri = layout.height * 0.8;
    let mid = layout.top + layout.height / 2.0;
    let right = layout.left + layout.width;
    if matches!(cmap.extend, Extend::Min | Extend::Both) {
        let c = cmap.colors[0];
        paint.set_color_rgba8(c[0], c[1], c[2], 255);
        fill_triangle(pixmap, &paint, [(layout.left, layout.top), (layout.left - tri, mid), (layout.left, layout.top + layout.height)]);
    }
    if matches!(cmap.extend, Extend::Max | Extend::Both) {
        let c = cmap.colors[bins - 1];
        paint.set_color_rgba8(c[0], c[1], c[2], 255);
        fill_triangle(pixmap, &paint, [(right, layout.top), (right + tri, mid), (right, layout.top + layout.height)]);
    }

    // Outline and ticks
    paint.set_color_rgba8(0, 0, 0, 255);
    let stroke = Stroke {
        width: 1.0,
        ..Stroke::default()
    };
    if let Some(outline) = Rect::from_xywh(layout.left, layout.top, layout.width, layout.height) {
        let path = PathBuilder::from_rect(outline);
        pixmap.stroke_path(&path, &paint, &stroke, Transform::identity(), None);
    }

    let decimals = tick_decimals(&cmap.ticks);
    let bottom = layout.top + layout.height;
    let mut labels = Vec::with_capacity(cmap.ticks.len());
    for &tick in &cmap.ticks {
        let Some(x) = layout.x_for(cmap, tick) else {
            continue;
        };
        let mut pb = PathBuilder::new();
        pb.move_to(x, bottom);
        pb.line_to(x, bottom + 5.0);
        if let Some(path) = pb.finish() {
            pixmap.stroke_path(&path, &paint, &stroke, Transform::identity(), None);
        }
        labels.push(TickLabel {
            x,
            y: bottom + 7.0,
            text: format_value(tick, decimals),
        });
    }
    labels
}

fn fill_triangle(pixmap: &mut Pixmap, paint: &Paint, corners: [(f32, f32); 3]) {
    let mut pb = PathBuilder::new();
    pb.move_to(corners[0].0, corners[0].1);
    pb.line_to(corners[1].0, corners[1].1);
    pb.line_to(corners[2].0, corners[2].1);
    pb.close();
    if let Some(path) = pb.finish() {
        pixmap.fill_path(&path, paint, FillRule::Winding, Transform::identity(), None);
    }
}

/// Decimals needed to show every tick distinctly (0 or 1).
fn tick_decimals(ticks: &[f32]) -> usize {
    if ticks.iter().all(|t| (t - t.round()).abs() < 1e-3) {
        0
    } else {
        1
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::colormap::builtin;

    #[test]
    fn test_layout_centered() {
        let layout = ColorbarLayout::new(1000, 800, 0.8);
        assert_eq!(layout.width, 800.0);
        assert_eq!(layout.left, 100.0);
        assert_eq!(layout.top, 814.0);
    }

    #[test]
    fn test_x_for_bin_edges() {
        let cmap = builtin::relative_humidity();
        let layout = ColorbarLayout::new(1000, 0, 0.8);
        assert_eq!(layout.x_for(&cmap, 0.0), Some(100.0));
        assert_eq!(layout.x_for(&cmap, 100.0), Some(900.0));
        assert_eq!(layout.x_for(&cmap, 50.0), Some(500.0));
        assert_eq!(layout.x_for(&cmap, 120.0), None);
    }

    #[test]
    fn test_tick_labels() {
        let cmap = builtin::relative_humidity();
        let mut pixmap = Pixmap::new(1000, 200).unwrap();
        let labels = draw_colorbar(&mut pixmap, &cmap, &ColorbarLayout::new(1000, 0, 0.8));
        assert_eq!(labels.len(), 11);
        assert_eq!(labels[0].text, "0");
        assert_eq!(labels[10].text, "100");
    }

    #[test]
    fn test_tick_decimals() {
        assert_eq!(tick_decimals(&[0.0, 5.0]), 0);
        assert_eq!(tick_decimals(&[0.0, 2.5]), 1);
    }
}
