//! Pluggable JPEG decoding, resizing, and re-encoding.
//!
//! [`Store`](crate::store::Store) is generic over [`ImageCodec`] so tests (and callers
//! embedding this crate) can swap in a fake encoder without pulling in the `image` crate.

use std::io::Cursor;

use image::{GenericImageView, ImageFormat};

use crate::error::{Error, Result};

/// Decodes, probes, and resizes JPEG bytes.
pub trait ImageCodec: Send + Sync {
    /// Returns the `(width, height)` of the image encoded in `bytes`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ImgLib`] if `bytes` do not decode as a JPEG.
    fn dimensions(&self, bytes: &[u8]) -> Result<(u32, u32)>;

    /// Resizes `bytes` to fit within `(max_w, max_h)`, preserving aspect ratio, and
    /// re-encodes the result as JPEG.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ImgLib`] if decoding or encoding fails.
    fn resize_to_fit(&self, bytes: &[u8], max_w: u16, max_h: u16) -> Result<Vec<u8>>;
}

/// The default [`ImageCodec`], backed by the `image` crate's JPEG support.
#[derive(Debug, Clone, Copy, Default)]
pub struct JpegCodec;

impl ImageCodec for JpegCodec {
    fn dimensions(&self, bytes: &[u8]) -> Result<(u32, u32)> {
        let img = image::load_from_memory_with_format(bytes, ImageFormat::Jpeg)
            .map_err(|e| Error::ImgLib(e.to_string()))?;
        Ok(img.dimensions())
    }

    fn resize_to_fit(&self, bytes: &[u8], max_w: u16, max_h: u16) -> Result<Vec<u8>> {
        let img = image::load_from_memory_with_format(bytes, ImageFormat::Jpeg)
            .map_err(|e| Error::ImgLib(e.to_string()))?;
        let (w, h) = img.dimensions();

        let h_shrink = f64::from(max_w) / f64::from(w);
        let v_shrink = f64::from(max_h) / f64::from(h);
        let ratio = h_shrink.min(v_shrink);
        let new_w = ((f64::from(w) * ratio).round() as u32).max(1);
        let new_h = ((f64::from(h) * ratio).round() as u32).max(1);

        let resized = img.resize_exact(new_w, new_h, image::imageops::FilterType::Lanczos3);
        let mut out = Vec::new();
        resized
            .write_to(&mut Cursor::new(&mut out), ImageFormat::Jpeg)
            .map_err(|e| Error::ImgLib(e.to_string()))?;
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tiny_jpeg(w: u32, h: u32) -> Vec<u8> {
        let img = image::RgbImage::from_pixel(w, h, image::Rgb([10, 20, 30]));
        let mut out = Vec::new();
        image::DynamicImage::ImageRgb8(img)
            .write_to(&mut Cursor::new(&mut out), ImageFormat::Jpeg)
            .unwrap();
        out
    }

    #[test]
    fn dimensions_reports_the_encoded_size() {
        let codec = JpegCodec;
        let bytes = tiny_jpeg(64, 32);
        assert_eq!(codec.dimensions(&bytes).unwrap(), (64, 32));
    }

    #[test]
    fn resize_to_fit_preserves_aspect_ratio() {
        let codec = JpegCodec;
        let bytes = tiny_jpeg(200, 100);
        let resized = codec.resize_to_fit(&bytes, 64, 64).unwrap();
        let (w, h) = codec.dimensions(&resized).unwrap();
        assert_eq!(w, 64);
        assert_eq!(h, 32);
    }

    #[test]
    fn resize_rejects_garbage_bytes() {
        let codec = JpegCodec;
        assert!(codec.resize_to_fit(b"not a jpeg", 10, 10).is_err());
    }
}
