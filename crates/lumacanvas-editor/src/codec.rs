//! Image decoding and encoding helpers.
//!
//! Thin wrappers over the `image` crate that map failures onto
//! [`ImageError`] so callers never see codec-specific error types.

use image::{DynamicImage, ImageFormat, ImageReader, RgbaImage};
use std::io::Cursor;

use lumacanvas_core::{ImageError, Size};

/// Read the natural size from the image header without decoding pixels.
pub fn decode_dimensions(bytes: &[u8]) -> Result<Size, ImageError> {
    let reader = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| ImageError::Decode {
            reason: e.to_string(),
        })?;
    let (width, height) = reader.into_dimensions().map_err(|e| ImageError::Decode {
        reason: e.to_string(),
    })?;
    Ok(Size::new(width as f64, height as f64))
}

/// Decode encoded bytes into an RGBA bitmap.
pub fn decode_rgba(bytes: &[u8]) -> Result<RgbaImage, ImageError> {
    let image = image::load_from_memory(bytes).map_err(|e| ImageError::Decode {
        reason: e.to_string(),
    })?;
    Ok(image.to_rgba8())
}

/// Encode an RGBA bitmap as PNG.
pub fn encode_png(image: RgbaImage) -> Result<Vec<u8>, ImageError> {
    let mut buffer = Cursor::new(Vec::new());
    DynamicImage::ImageRgba8(image)
        .write_to(&mut buffer, ImageFormat::Png)
        .map_err(|e| ImageError::Encode {
            format: "png".to_string(),
            reason: e.to_string(),
        })?;
    Ok(buffer.into_inner())
}
