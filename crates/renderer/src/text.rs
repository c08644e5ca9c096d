//! Text drawing.
//!
//! TrueType text goes through rusttype and imageproc when a font could be
//! loaded. Without one, numeric labels fall back to stroked segment glyphs
//! and everything else is left out by the caller.

use std::path::{Path, PathBuf};

use image::{Rgba as ImageRgba, RgbaImage};
use imageproc::drawing::draw_text_mut;
use rusttype::{point, Font, Scale};
use tiny_skia::{LineCap, LineJoin, Paint, PathBuilder, Pixmap, Stroke, Transform};
use tracing::{debug, warn};

use crate::colormap::Rgba;
use crate::error::{RenderError, RenderResult};

/// Common install locations tried when no font is configured.
const SYSTEM_FONTS: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "/Library/Fonts/Arial.ttf",
    "C:\\Windows\\Fonts\\arial.ttf",
];

/// Where a piece of text is positioned relative to its reference point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Anchor {
    TopLeft,
    TopCenter,
    TopRight,
    Center,
    BottomLeft,
    BottomRight,
}

impl Anchor {
    /// Top-left corner of a `w` x `h` box anchored at (x, y).
    pub fn top_left(&self, x: i32, y: i32, w: i32, h: i32) -> (i32, i32) {
        match self {
            Anchor::TopLeft => (x, y),
            Anchor::TopCenter => (x - w / 2, y),
            Anchor::TopRight => (x - w, y),
            Anchor::Center => (x - w / 2, y - h / 2),
            Anchor::BottomLeft => (x, y - h),
            Anchor::BottomRight => (x - w, y - h),
        }
    }
}

/// The figure font, if one could be found.
#[derive(Clone, Default)]
pub struct FontSet {
    font: Option<Font<'static>>,
}

impl std::fmt::Debug for FontSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FontSet")
            .field("loaded", &self.font.is_some())
            .finish()
    }
}

impl FontSet {
    /// Load `explicit` if given, else the first system font found.
    ///
    /// Never fails: a figure without a font still renders, minus its text.
    pub fn load(explicit: Option<&Path>) -> Self {
        let candidates = explicit
            .map(Path::to_path_buf)
            .into_iter()
            .chain(SYSTEM_FONTS.iter().map(PathBuf::from));

        for path in candidates {
            match std::fs::read(&path) {
                Ok(data) => match Self::from_bytes(data) {
                    Ok(fonts) => {
                        debug!(path = %path.display(), "Loaded font");
                        return fonts;
                    }
                    Err(e) => warn!(path = %path.display(), error = %e, "Unusable font file"),
                },
                Err(_) if explicit == Some(path.as_path()) => {
                    warn!(path = %path.display(), "Configured font not found");
                }
                Err(_) => {}
            }
        }

        warn!("No TrueType font available; titles and colorbar labels will be omitted");
        Self::none()
    }

    pub fn from_bytes(data: Vec<u8>) -> RenderResult<Self> {
        let font = Font::try_from_vec(data)
            .ok_or_else(|| RenderError::Font("not a TrueType/OpenType font".to_string()))?;
        Ok(Self { font: Some(font) })
    }

    pub fn none() -> Self {
        Self { font: None }
    }

    pub fn has_font(&self) -> bool {
        self.font.is_some()
    }

    /// Pixel size of `text` at `size`. Falls back to the segment glyph metrics.
    pub fn measure(&self, text: &str, size: f32) -> (u32, u32) {
        let Some(font) = &self.font else {
            let (w, h) = stroke_text_size(text, size);
            return (w.ceil() as u32, h.ceil() as u32);
        };

        let scale = Scale::uniform(size);
        let v = font.v_metrics(scale);
        let width = font
            .layout(text, scale, point(0.0, v.ascent))
            .last()
            .map(|g| g.position().x + g.unpositioned().h_metrics().advance_width)
            .unwrap_or(0.0);
        (width.ceil() as u32, (v.ascent - v.descent).ceil() as u32)
    }

    /// Draw `text` onto `img`. Returns false when no font is loaded.
    pub fn draw(
        &self,
        img: &mut RgbaImage,
        text: &str,
        (x, y): (i32, i32),
        size: f32,
        color: Rgba,
        anchor: Anchor,
    ) -> bool {
        let Some(font) = &self.font else {
            return false;
        };
        let (w, h) = self.measure(text, size);
        let (left, top) = anchor.top_left(x, y, w as i32, h as i32);
        draw_text_mut(img, ImageRgba(color), left, top, Scale::uniform(size), font, text);
        true
    }
}

/// Fill a rectangle behind text so it stays readable over filled fields.
pub fn draw_text_background(img: &mut RgbaImage, left: i32, top: i32, w: u32, h: u32, padding: i32) {
    let bg = [255u8, 255, 255, 200];
    for py in (top - padding)..(top + h as i32 + padding) {
        for px in (left - padding)..(left + w as i32 + padding) {
            if px < 0 || py < 0 || px >= img.width() as i32 || py >= img.height() as i32 {
                continue;
            }
            let dst = img.get_pixel_mut(px as u32, py as u32);
            let a = bg[3] as u16;
            for k in 0..3 {
                dst.0[k] = ((bg[k] as u16 * a + dst.0[k] as u16 * (255 - a)) / 255) as u8;
            }
        }
    }
}

/// Format a label value with a fixed number of decimals.
pub fn format_value(value: f32, decimals: usize) -> String {
    let text = format!("{:.*}", decimals, value);
    // Avoid "-0"
    if text.trim_start_matches('-').chars().all(|c| c == '0' || c == '.') {
        text.trim_start_matches('-').to_string()
    } else {
        text
    }
}

/// Whether the segment glyphs can draw every character of `text`.
pub fn stroke_supported(text: &str) -> bool {
    text.chars().all(|c| c.is_ascii_digit() || matches!(c, '-' | '.' | '%'))
}

fn glyph_metrics(size: f32) -> (f32, f32, f32) {
    let char_w = size * 0.55;
    let char_h = size * 0.9;
    let spacing = size * 0.15;
    (char_w, char_h, spacing)
}

/// Size of stroked text.
pub fn stroke_text_size(text: &str, size: f32) -> (f32, f32) {
    let (char_w, char_h, spacing) = glyph_metrics(size);
    let n = text.chars().count() as f32;
    ((n * (char_w + spacing) - spacing).max(0.0), char_h)
}

/// Draw numeric text centered at (cx, cy) using segment glyphs.
pub fn stroke_text(pixmap: &mut Pixmap, text: &str, (cx, cy): (f32, f32), size: f32, color: Rgba) {
    let (char_w, char_h, spacing) = glyph_metrics(size);
    let (total_w, _) = stroke_text_size(text, size);

    let [r, g, b, a] = color;
    let mut paint = Paint::default();
    paint.set_color_rgba8(r, g, b, a);
    paint.anti_alias = true;
    let stroke = Stroke {
        width: (char_w * 0.18).max(1.0),
        line_cap: LineCap::Round,
        line_join: LineJoin::Round,
        ..Stroke::default()
    };

    let mut pb = PathBuilder::new();
    for (i, ch) in text.chars().enumerate() {
        let x0 = cx - total_w / 2.0 + i as f32 * (char_w + spacing) + char_w / 2.0;
        for &((x1, y1), (x2, y2)) in glyph_segments(ch) {
            pb.move_to(x0 + x1 * char_w / 2.0, cy + y1 * char_h / 2.0);
            pb.line_to(x0 + x2 * char_w / 2.0, cy + y2 * char_h / 2.0);
        }
    }

    if let Some(path) = pb.finish() {
        pixmap.stroke_path(&path, &paint, &stroke, Transform::identity(), None);
    }
}

type GlyphSegment = ((f32, f32), (f32, f32));

/// Segment glyphs on a unit box: x and y in [-1, 1], y down.
fn glyph_segments(ch: char) -> &'static [GlyphSegment] {
    const TOP: GlyphSegment = ((-1.0, -1.0), (1.0, -1.0));
    const MID: GlyphSegment = ((-1.0, 0.0), (1.0, 0.0));
    const BOT: GlyphSegment = ((-1.0, 1.0), (1.0, 1.0));
    const UL: GlyphSegment = ((-1.0, -1.0), (-1.0, 0.0));
    const LL: GlyphSegment = ((-1.0, 0.0), (-1.0, 1.0));
    const UR: GlyphSegment = ((1.0, -1.0), (1.0, 0.0));
    const LR: GlyphSegment = ((1.0, 0.0), (1.0, 1.0));

    match ch {
        '0' => &[TOP, UR, LR, BOT, LL, UL],
        '1' => &[((0.0, -1.0), (0.0, 1.0))],
        '2' => &[TOP, UR, MID, LL, BOT],
        '3' => &[TOP, UR, LR, BOT, MID],
        '4' => &[UL, MID, UR, LR],
        '5' => &[TOP, UL, MID, LR, BOT],
        '6' => &[TOP, UL, LL, BOT, LR, MID],
        '7' => &[TOP, ((1.0, -1.0), (0.0, 1.0))],
        '8' => &[TOP, UR, LR, BOT, LL, UL, MID],
        '9' => &[MID, UL, TOP, UR, LR],
        '-' => &[((-0.7, 0.0), (0.7, 0.0))],
        '.' => &[((0.0, 0.8), (0.0, 0.9))],
        '%' => &[((1.0, -1.0), (-1.0, 1.0)), ((-0.8, -0.8), (-0.6, -0.8)), ((0.6, 0.8), (0.8, 0.8))],
        _ => &[],
    }
}
