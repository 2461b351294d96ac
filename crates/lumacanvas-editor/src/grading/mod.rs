//! # Color Grading
//!
//! Pure mapping from slider values to a composable filter expression, plus
//! the raster replay used by export and by the local transform fallback.
//!
//! ```text
//! ColorParameters ──► filter_clauses ──► FilterExpression ──► "brightness(110%) ..."
//!                          │
//!                          └──► apply_clauses (RgbaImage) ──► PNG export
//! ```

mod export;
mod filter;
mod params;
mod raster;

pub use export::{export_file_name, export_graded, export_graded_with_suffix, GradedExport};
pub use filter::{
    build_filter_expression, export_clauses, filter_clauses, FilterClause, FilterExpression,
};
pub use params::{ColorParameters, LutPreset};
pub use raster::apply_clauses;

use lumacanvas_core::ImageError;

/// Decode `bytes`, apply `clauses` and re-encode as PNG.
pub fn apply_to_encoded(bytes: &[u8], clauses: &[FilterClause]) -> Result<Vec<u8>, ImageError> {
    let mut bitmap = crate::codec::decode_rgba(bytes)?;
    apply_clauses(&mut bitmap, clauses);
    crate::codec::encode_png(bitmap)
}
