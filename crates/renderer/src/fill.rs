//! Filled layers: colormapped value rasters and single-color mask fills.
//!
//! Each function returns a transparent panel-sized pixmap that the figure
//! composites at the map panel offset. Pixels with no class stay transparent
//! so the white background (and anything drawn under) shows through.

use tiny_skia::{ColorU8, Pixmap, PremultipliedColorU8};

use crate::colormap::{Colormap, Rgba};
use crate::error::{RenderError, RenderResult};
use crate::raster::{BoolRaster, Raster};

fn panel(width: u32, height: u32) -> RenderResult<Pixmap> {
    Pixmap::new(width, height).ok_or(RenderError::Canvas { width, height })
}

fn premultiplied(color: Rgba, opacity: f32) -> PremultipliedColorU8 {
    let a = (color[3] as f32 * opacity.clamp(0.0, 1.0)).round() as u8;
    ColorU8::from_rgba(color[0], color[1], color[2], a).premultiply()
}

/// Color every pixel by its colormap bin.
pub fn fill_raster(raster: &Raster, cmap: &Colormap, opacity: f32) -> RenderResult<Pixmap> {
    let mut pixmap = panel(raster.width, raster.height)?;

    // Precompute one premultiplied color per bin
    let bins: Vec<PremultipliedColorU8> =
        cmap.colors.iter().map(|&c| premultiplied(c, opacity)).collect();

    let mut filled = 0usize;
    for (px, &value) in pixmap.pixels_mut().iter_mut().zip(&raster.values) {
        if let Some(bin) = cmap.classify(value) {
            *px = bins[bin];
            filled += 1;
        }
    }

    tracing::debug!(
        colormap = %cmap.name,
        filled,
        total = raster.values.len(),
        "Filled raster"
    );
    Ok(pixmap)
}

/// Paint every `true` pixel of a mask with one color.
pub fn fill_mask(mask: &BoolRaster, color: Rgba, opacity: f32) -> RenderResult<Pixmap> {
    let mut pixmap = panel(mask.width, mask.height)?;
    let paint = premultiplied(color, opacity);

    for (px, &hit) in pixmap.pixels_mut().iter_mut().zip(&mask.values) {
        if hit {
            *px = paint;
        }
    }
    Ok(pixmap)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::colormap::Extend;

    fn two_bin() -> Colormap {
        Colormap::new(
            "test",
            "",
            vec![0.0, 10.0, 20.0],
            vec![[255, 0, 0, 255], [0, 0, 255, 255]],
            Extend::Neither,
        )
        .unwrap()
    }

    #[test]
    fn test_fill_raster_classes() {
        let raster = Raster::new(2, 2, vec![5.0, 15.0, f32::NAN, 25.0]);
        let pixmap = fill_raster(&raster, &two_bin(), 1.0).unwrap();
        let px = pixmap.pixels();
        assert_eq!((px[0].red(), px[0].blue(), px[0].alpha()), (255, 0, 255));
        assert_eq!((px[1].red(), px[1].blue(), px[1].alpha()), (0, 255, 255));
        assert_eq!(px[2].alpha(), 0);
        assert_eq!(px[3].alpha(), 0);
    }

    #[test]
    fn test_fill_mask_opacity() {
        let mask = BoolRaster {
            width: 2,
            height: 1,
            values: vec![true, false],
        };
        let pixmap = fill_mask(&mask, [200, 0, 0, 255], 0.5).unwrap();
        let px = pixmap.pixels();
        assert_eq!(px[0].alpha(), 128);
        assert_eq!(px[1].alpha(), 0);
    }

    #[test]
    fn test_zero_size_panel_is_error() {
        let raster = Raster::new(0, 0, vec![]);
        assert!(matches!(
            fill_raster(&raster, &two_bin(), 1.0),
            Err(RenderError::Canvas { .. })
        ));
    }
}
