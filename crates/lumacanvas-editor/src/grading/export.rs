//! Export of the graded image.
//!
//! Export replays the brightness, contrast and saturation sliders onto the
//! natural-size bitmap and encodes the result as PNG. Presets and the
//! temperature/tint clauses only affect the live preview.

use std::path::{Path, PathBuf};

use lumacanvas_core::constants::EXPORT_SUFFIX;
use lumacanvas_core::ImageError;

use super::filter::export_clauses;
use super::params::ColorParameters;
use super::raster::apply_clauses;
use crate::codec::{decode_rgba, encode_png};

/// Stem used when the image has no file name.
const DEFAULT_STEM: &str = "image";

/// An encoded export ready to be written.
#[derive(Debug, Clone, PartialEq)]
pub struct GradedExport {
    /// `<stem><suffix>.png`
    pub file_name: String,
    /// PNG bytes.
    pub bytes: Vec<u8>,
}

impl GradedExport {
    /// Write into `dir`, creating it if needed. Returns the full path.
    pub fn write_to(&self, dir: &Path) -> std::io::Result<PathBuf> {
        std::fs::create_dir_all(dir)?;
        let path = dir.join(&self.file_name);
        std::fs::write(&path, &self.bytes)?;
        Ok(path)
    }
}

/// Name of the exported file for an image called `file_name`.
pub fn export_file_name(file_name: Option<&str>, suffix: &str) -> String {
    let stem = file_name
        .and_then(|name| Path::new(name).file_stem())
        .and_then(|stem| stem.to_str())
        .filter(|stem| !stem.is_empty())
        .unwrap_or(DEFAULT_STEM);
    format!("{}{}.png", stem, suffix)
}

/// Grade encoded image bytes for export using the default suffix.
pub fn export_graded(
    bytes: &[u8],
    params: &ColorParameters,
    file_name: Option<&str>,
) -> Result<GradedExport, ImageError> {
    export_graded_with_suffix(bytes, params, file_name, EXPORT_SUFFIX)
}

/// Grade encoded image bytes for export.
pub fn export_graded_with_suffix(
    bytes: &[u8],
    params: &ColorParameters,
    file_name: Option<&str>,
    suffix: &str,
) -> Result<GradedExport, ImageError> {
    let mut bitmap = decode_rgba(bytes)?;
    apply_clauses(&mut bitmap, &export_clauses(params));
    let bytes = encode_png(bitmap)?;

    Ok(GradedExport {
        file_name: export_file_name(file_name, suffix),
        bytes,
    })
}
