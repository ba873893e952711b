//! Raster re-encoding to lossy WebP.

use cardcraft_core::{Error, Result};

/// Default WebP quality: a good size/fidelity balance for course media.
pub const DEFAULT_QUALITY: u8 = 85;

/// Re-encode arbitrary raster bytes as lossy WebP at the given quality.
///
/// Images with an alpha channel or palette are flattened to plain RGB
/// first; this pipeline never ships translucent WebP. Pure
/// bytes-in/bytes-out: nothing is written on failure.
///
/// # Errors
///
/// [`Error::Upstream`] with stage "image conversion" when the input cannot
/// be decoded.
pub fn to_webp(bytes: &[u8], quality: u8) -> Result<Vec<u8>> {
    let decoded = image::load_from_memory(bytes)
        .map_err(|e| Error::upstream("image conversion", e))?;

    let rgb = decoded.to_rgb8();
    let (width, height) = rgb.dimensions();

    let encoded = webp::Encoder::from_rgb(rgb.as_raw(), width, height).encode(f32::from(quality));
    Ok(encoded.to_vec())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn png_with_alpha() -> Vec<u8> {
        let img = image::RgbaImage::from_pixel(8, 8, image::Rgba([200, 40, 40, 128]));
        let mut buf = Cursor::new(Vec::new());
        image::DynamicImage::ImageRgba8(img)
            .write_to(&mut buf, image::ImageFormat::Png)
            .unwrap();
        buf.into_inner()
    }

    fn is_webp(bytes: &[u8]) -> bool {
        bytes.len() > 12 && &bytes[0..4] == b"RIFF" && &bytes[8..12] == b"WEBP"
    }

    #[test]
    fn test_to_webp_flattens_alpha_and_emits_webp() {
        let out = to_webp(&png_with_alpha(), DEFAULT_QUALITY).unwrap();
        assert!(is_webp(&out), "output is not a WebP container");
    }

    #[test]
    fn test_to_webp_handles_opaque_jpeg_input() {
        let img = image::RgbImage::from_pixel(8, 8, image::Rgb([10, 20, 30]));
        let mut buf = Cursor::new(Vec::new());
        image::DynamicImage::ImageRgb8(img)
            .write_to(&mut buf, image::ImageFormat::Jpeg)
            .unwrap();

        let out = to_webp(&buf.into_inner(), 50).unwrap();
        assert!(is_webp(&out));
    }

    #[test]
    fn test_to_webp_rejects_undecodable_bytes() {
        let err = to_webp(b"definitely not an image", DEFAULT_QUALITY).unwrap_err();
        assert!(err.is_upstream());
        assert!(err.to_string().starts_with("image conversion failed"));
    }
}
