//! Figure composition: title band, map panel, colorbar band.
//!
//! ```text
//! +------------------------------+  0
//! | title / subtitle             |
//! +------------------------------+  TITLE_BAND_PX
//! |                              |
//! | map panel (MapView)          |
//! |                              |
//! +------------------------------+  TITLE_BAND_PX + map height
//! | colorbar, signature          |
//! +------------------------------+  figure height
//! ```
//!
//! Geometry is drawn immediately with tiny-skia. Text is queued and drawn
//! last in [`Figure::render`] so it sits on top of everything.

use firewx_common::region::{COLORBAR_BAND_PX, TITLE_BAND_PX};
use firewx_common::BoundingBox;
use image::RgbaImage;
use projection::MapView;
use tiny_skia::{Color, FillRule, Mask, Paint, PathBuilder, Pixmap, PixmapPaint, Rect, Stroke, Transform};
use tracing::{debug, warn};

use crate::boundaries::{BoundarySet, BoundaryStyle};
use crate::colorbar::{draw_colorbar, ColorbarLayout};
use crate::colormap::{Colormap, Rgba};
use crate::contour::{smooth, stroke_outlines, trace_outline};
use crate::error::{RenderError, RenderResult};
use crate::fill::{fill_mask, fill_raster};
use crate::raster::{BoolRaster, GridSource, Raster};
use crate::text::{draw_text_background, stroke_supported, stroke_text, Anchor, FontSet};

const BLACK: Rgba = [0, 0, 0, 255];
const OUTLINE_SMOOTHING: u32 = 2;

/// A value label at a geographic point.
#[derive(Debug, Clone, PartialEq)]
pub struct StationLabel {
    pub lat: f64,
    pub lon: f64,
    pub text: String,
}

#[derive(Debug, Clone)]
struct TextItem {
    text: String,
    pos: (i32, i32),
    size: f32,
    color: Rgba,
    anchor: Anchor,
    background: bool,
}

/// One output image under construction.
pub struct Figure {
    pixmap: Pixmap,
    view: MapView,
    panel_clip: Mask,
    texts: Vec<TextItem>,
}

impl Figure {
    /// White figure `width` wide with a map panel of `map_height` over `extent`.
    pub fn new(extent: BoundingBox, width: u32, map_height: u32) -> RenderResult<Self> {
        let height = TITLE_BAND_PX + map_height + COLORBAR_BAND_PX;
        let mut pixmap = Pixmap::new(width, height).ok_or(RenderError::Canvas { width, height })?;
        pixmap.fill(Color::WHITE);

        let mut panel_clip = Mask::new(width, height).ok_or(RenderError::Canvas { width, height })?;
        let panel_rect = Rect::from_xywh(0.0, TITLE_BAND_PX as f32, width as f32, map_height as f32)
            .ok_or(RenderError::Canvas { width, height: map_height })?;
        panel_clip.fill_path(
            &PathBuilder::from_rect(panel_rect),
            FillRule::Winding,
            false,
            Transform::identity(),
        );

        Ok(Self {
            pixmap,
            view: MapView::new(extent, width, map_height),
            panel_clip,
            texts: Vec::new(),
        })
    }

    pub fn view(&self) -> &MapView {
        &self.view
    }

    pub fn width(&self) -> u32 {
        self.pixmap.width()
    }

    pub fn height(&self) -> u32 {
        self.pixmap.height()
    }

    fn panel_offset(&self) -> (f32, f32) {
        (0.0, TITLE_BAND_PX as f32)
    }

    fn composite(&mut self, layer: &Pixmap) {
        self.pixmap.draw_pixmap(
            0,
            TITLE_BAND_PX as i32,
            layer.as_ref(),
            &PixmapPaint::default(),
            Transform::identity(),
            None,
        );
    }

    /// Sample `source` over the panel and fill it through `cmap`.
    ///
    /// Returns the sampled raster so callers can contour or mask it.
    pub fn fill_field<S: GridSource + ?Sized>(&mut self, source: &S, cmap: &Colormap) -> RenderResult<Raster> {
        let raster = Raster::sample(source, &self.view);
        if raster.valid_count() == 0 {
            warn!(colormap = %cmap.name, "No data inside the map extent");
        }
        let layer = fill_raster(&raster, cmap, 1.0)?;
        self.composite(&layer);
        Ok(raster)
    }

    /// Fill a pre-sampled raster through `cmap`.
    pub fn fill_raster(&mut self, raster: &Raster, cmap: &Colormap) -> RenderResult<()> {
        let layer = fill_raster(raster, cmap, 1.0)?;
        self.composite(&layer);
        Ok(())
    }

    /// Shade the `true` pixels of a panel-sized mask.
    pub fn fill_mask(&mut self, mask: &BoolRaster, color: Rgba, opacity: f32) -> RenderResult<()> {
        let layer = fill_mask(mask, color, opacity)?;
        self.composite(&layer);
        debug!(pixels = mask.count(), "Filled mask");
        Ok(())
    }

    /// Outline the edge of a mask.
    pub fn outline_mask(&mut self, mask: &BoolRaster, color: Rgba, line_width: f32) {
        let outlines: Vec<_> = trace_outline(&mask.values, mask.width as usize, mask.height as usize)
            .iter()
            .map(|o| smooth(o, OUTLINE_SMOOTHING))
            .collect();
        let offset = self.panel_offset();
        stroke_outlines(&mut self.pixmap, &outlines, color, line_width, offset);
    }

    /// Stroke a boundary layer, clipped to the map panel.
    pub fn draw_boundaries(&mut self, set: &BoundarySet, style: &BoundaryStyle) -> usize {
        let offset = self.panel_offset();
        let drawn = set.stroke(&mut self.pixmap, &self.view, offset, style, Some(&self.panel_clip));
        debug!(layer = %set.name, drawn, "Drew boundaries");
        drawn
    }

    /// Queue value labels at station points inside the panel.
    pub fn plot_stations(&mut self, labels: &[StationLabel], font_size: f32, color: Rgba) -> usize {
        let (ox, oy) = self.panel_offset();
        let mut placed = 0;
        for label in labels {
            let (x, y) = self.view.geo_to_pixel(label.lat, label.lon);
            if !self.view.contains_pixel(x, y) {
                continue;
            }
            self.texts.push(TextItem {
                text: label.text.clone(),
                pos: ((x as f32 + ox).round() as i32, (y as f32 + oy).round() as i32),
                size: font_size,
                color,
                anchor: Anchor::Center,
                background: true,
            });
            placed += 1;
        }
        placed
    }

    pub fn title(&mut self, text: &str, size: f32) {
        let x = self.width() as i32 / 2;
        self.queue(text, (x, 8), size, Anchor::TopCenter);
    }

    pub fn subtitle(&mut self, text: &str, size: f32, title_size: f32) {
        let x = self.width() as i32 / 2;
        let y = 8 + title_size.ceil() as i32 + 10;
        self.queue(text, (x, y), size, Anchor::TopCenter);
    }

    /// Creation stamp in the bottom-right corner.
    pub fn signature(&mut self, text: &str, size: f32) {
        let pos = (self.width() as i32 - 8, self.height() as i32 - 6);
        self.queue(text, pos, size, Anchor::BottomRight);
    }

    /// Colorbar in the bottom band with ticks and a units caption.
    pub fn colorbar(&mut self, cmap: &Colormap, shrink: f32, font_size: f32, caption: &str) {
        let band_top = self.height() - COLORBAR_BAND_PX;
        let layout = ColorbarLayout::new(self.width(), band_top, shrink);
        let ticks = draw_colorbar(&mut self.pixmap, cmap, &layout);

        for tick in &ticks {
            self.queue(&tick.text, (tick.x.round() as i32, tick.y as i32), font_size, Anchor::TopCenter);
        }
        if !caption.is_empty() {
            let y = (layout.top + layout.height) as i32 + 9 + font_size.ceil() as i32;
            self.queue(caption, (self.width() as i32 / 2, y), font_size, Anchor::TopCenter);
        }
    }

    fn queue(&mut self, text: &str, pos: (i32, i32), size: f32, anchor: Anchor) {
        self.texts.push(TextItem {
            text: text.to_string(),
            pos,
            size,
            color: BLACK,
            anchor,
            background: false,
        });
    }

    fn frame_panel(&mut self) {
        let rect = Rect::from_xywh(
            0.5,
            TITLE_BAND_PX as f32 + 0.5,
            self.view.width as f32 - 1.0,
            self.view.height as f32 - 1.0,
        );
        if let Some(rect) = rect {
            let mut paint = Paint::default();
            paint.set_color_rgba8(0, 0, 0, 255);
            let stroke = Stroke {
                width: 1.0,
                ..Stroke::default()
            };
            self.pixmap
                .stroke_path(&PathBuilder::from_rect(rect), &paint, &stroke, Transform::identity(), None);
        }
    }

    /// Flatten into an RGBA image, drawing queued text with `fonts`.
    ///
    /// Without a font, numeric labels are stroked and other text is dropped.
    pub fn render(mut self, fonts: &FontSet) -> RgbaImage {
        self.frame_panel();

        let mut skipped = 0usize;
        if !fonts.has_font() {
            for item in &self.texts {
                if stroke_supported(&item.text) {
                    stroke_text(
                        &mut self.pixmap,
                        &item.text,
                        (item.pos.0 as f32, item.pos.1 as f32),
                        item.size,
                        item.color,
                    );
                } else {
                    skipped += 1;
                }
            }
        }

        let (width, height) = (self.pixmap.width(), self.pixmap.height());
        let mut data = Vec::with_capacity((width * height * 4) as usize);
        for px in self.pixmap.pixels() {
            let c = px.demultiply();
            data.extend_from_slice(&[c.red(), c.green(), c.blue(), c.alpha()]);
        }
        let mut img = RgbaImage::from_raw(width, height, data).unwrap_or_else(|| RgbaImage::new(width, height));

        if fonts.has_font() {
            for item in &self.texts {
                if item.background {
                    let (w, h) = fonts.measure(&item.text, item.size);
                    let (left, top) = item.anchor.top_left(item.pos.0, item.pos.1, w as i32, h as i32);
                    draw_text_background(&mut img, left, top, w, h, 1);
                }
                fonts.draw(&mut img, &item.text, item.pos, item.size, item.color, item.anchor);
            }
        } else if skipped > 0 {
            warn!(skipped, "No font loaded; omitted text labels");
        }

        img
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extent() -> BoundingBox {
        BoundingBox::new(-124.0, 32.0, -114.0, 42.0)
    }

    #[test]
    fn test_figure_dimensions() {
        let fig = Figure::new(extent(), 400, 300).unwrap();
        assert_eq!(fig.width(), 400);
        assert_eq!(fig.height(), 300 + TITLE_BAND_PX + COLORBAR_BAND_PX);
        assert_eq!(fig.view().height, 300);
    }

    #[test]
    fn test_zero_width_is_error() {
        assert!(Figure::new(extent(), 0, 300).is_err());
    }

    #[test]
    fn test_stations_outside_panel_skipped() {
        let mut fig = Figure::new(extent(), 400, 300).unwrap();
        let labels = vec![
            StationLabel { lat: 37.0, lon: -119.0, text: "12".into() },
            StationLabel { lat: 50.0, lon: -119.0, text: "40".into() },
        ];
        assert_eq!(fig.plot_stations(&labels, 10.0, BLACK), 1);
    }

    #[test]
    fn test_render_background_white() {
        let fig = Figure::new(extent(), 200, 100).unwrap();
        let img = fig.render(&FontSet::none());
        assert_eq!(img.dimensions(), (200, 100 + TITLE_BAND_PX + COLORBAR_BAND_PX));
        assert_eq!(img.get_pixel(100, 5).0, [255, 255, 255, 255]);
    }
}
