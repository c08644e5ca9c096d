//! JPEG frames and animated GIFs.

use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use image::codecs::gif::{GifEncoder, Repeat};
use image::codecs::jpeg::JpegEncoder;
use image::{ColorType, Delay, DynamicImage, Frame, RgbaImage};
use tracing::{info, warn};

use crate::error::{RenderError, RenderResult};

/// Write `img` as a JPEG at `quality` (1-100). Alpha is dropped.
pub fn save_jpeg(img: &RgbaImage, path: &Path, quality: u8) -> RenderResult<()> {
    let rgb = DynamicImage::ImageRgba8(img.clone()).to_rgb8();
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    let mut encoder = JpegEncoder::new_with_quality(&mut writer, quality.clamp(1, 100));
    encoder.encode(rgb.as_raw(), rgb.width(), rgb.height(), ColorType::Rgb8)?;
    Ok(())
}

/// Collate frame images, in order, into a looping GIF.
///
/// Unreadable frames are skipped; at least one frame must load.
pub fn write_gif(frames: &[PathBuf], out: &Path, delay_ms: u32) -> RenderResult<usize> {
    let file = File::create(out)?;
    let mut encoder = GifEncoder::new_with_speed(BufWriter::new(file), 10);
    encoder.set_repeat(Repeat::Infinite)?;

    let mut written = 0;
    for path in frames {
        let img = match image::open(path) {
            Ok(img) => img.to_rgba8(),
            Err(e) => {
                warn!(frame = %path.display(), error = %e, "Skipping unreadable frame");
                continue;
            }
        };
        let delay = Delay::from_numer_denom_ms(delay_ms, 1);
        encoder.encode_frame(Frame::from_parts(img, 0, 0, delay))?;
        written += 1;
    }

    if written == 0 {
        drop(encoder);
        std::fs::remove_file(out).ok();
        return Err(RenderError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "no frames to animate",
        )));
    }

    info!(gif = %out.display(), frames = written, delay_ms, "Wrote animation");
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_save_jpeg_roundtrip_dimensions() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("frame.jpg");
        let img = RgbaImage::from_pixel(32, 16, image::Rgba([200, 30, 30, 255]));

        save_jpeg(&img, &path, 90).unwrap();
        let back = image::open(&path).unwrap();
        assert_eq!((back.width(), back.height()), (32, 16));
    }

    #[test]
    fn test_gif_without_frames_fails() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("anim.gif");
        assert!(write_gif(&[], &out, 500).is_err());
        assert!(!out.exists());
    }
}
