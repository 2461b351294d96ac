//! Filter clauses and the parameter → expression mapping.
//!
//! Clause amounts are kept in the units of their textual form: percentages
//! for brightness, contrast, saturate, sepia, grayscale and invert, degrees
//! for hue-rotate. 100% is the identity for the multiplicative clauses.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::params::ColorParameters;

/// Temperature → warming (sepia) scale for positive values.
const TEMPERATURE_WARM_SCALE: f64 = 0.3;

/// Temperature → hue rotation scale for negative values.
const TEMPERATURE_COOL_SCALE: f64 = TEMPERATURE_WARM_SCALE * 2.0;

/// Tint → hue rotation scale.
const TINT_SCALE: f64 = 0.5;

/// One composable filter operation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum FilterClause {
    /// Multiply every channel, in percent.
    Brightness(f64),
    /// Scale around mid-grey, in percent.
    Contrast(f64),
    /// Scale chroma, in percent.
    Saturate(f64),
    /// Blend toward sepia, in percent.
    Sepia(f64),
    /// Rotate hue, in degrees.
    HueRotate(f64),
    /// Blend toward luminance, in percent.
    Grayscale(f64),
    /// Blend toward the negative, in percent.
    Invert(f64),
}

impl fmt::Display for FilterClause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterClause::Brightness(v) => write!(f, "brightness({}%)", format_number(*v)),
            FilterClause::Contrast(v) => write!(f, "contrast({}%)", format_number(*v)),
            FilterClause::Saturate(v) => write!(f, "saturate({}%)", format_number(*v)),
            FilterClause::Sepia(v) => write!(f, "sepia({}%)", format_number(*v)),
            FilterClause::HueRotate(v) => write!(f, "hue-rotate({}deg)", format_number(*v)),
            FilterClause::Grayscale(v) => write!(f, "grayscale({}%)", format_number(*v)),
            FilterClause::Invert(v) => write!(f, "invert({}%)", format_number(*v)),
        }
    }
}

/// Ordered list of clauses; displays as the space-separated filter string.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FilterExpression(Vec<FilterClause>);

impl FilterExpression {
    pub fn new(clauses: Vec<FilterClause>) -> Self {
        Self(clauses)
    }

    pub fn clauses(&self) -> &[FilterClause] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<&[FilterClause]> for FilterExpression {
    fn from(clauses: &[FilterClause]) -> Self {
        Self(clauses.to_vec())
    }
}

impl fmt::Display for FilterExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, clause) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{}", clause)?;
        }
        Ok(())
    }
}

/// Clauses for a parameter set, in fixed order:
/// brightness, contrast, saturation, temperature, tint, preset.
pub fn filter_clauses(params: &ColorParameters) -> Vec<FilterClause> {
    let mut clauses = Vec::new();

    if is_active(params.brightness) {
        clauses.push(FilterClause::Brightness(100.0 + params.brightness));
    }
    if is_active(params.contrast) {
        clauses.push(FilterClause::Contrast(100.0 + params.contrast));
    }
    if is_active(params.saturation) {
        clauses.push(FilterClause::Saturate(100.0 + params.saturation));
    }
    if is_active(params.temperature) {
        if params.temperature > 0.0 {
            clauses.push(FilterClause::Sepia(
                params.temperature * TEMPERATURE_WARM_SCALE,
            ));
        } else {
            clauses.push(FilterClause::HueRotate(
                params.temperature * TEMPERATURE_COOL_SCALE,
            ));
        }
    }
    if is_active(params.tint) {
        clauses.push(FilterClause::HueRotate(params.tint * TINT_SCALE));
    }

    clauses.extend_from_slice(params.preset.clauses());
    clauses
}

/// Clauses export replays onto the bitmap: the brightness, contrast and
/// saturation sliders only.
pub fn export_clauses(params: &ColorParameters) -> Vec<FilterClause> {
    let mut clauses = Vec::new();
    if is_active(params.brightness) {
        clauses.push(FilterClause::Brightness(100.0 + params.brightness));
    }
    if is_active(params.contrast) {
        clauses.push(FilterClause::Contrast(100.0 + params.contrast));
    }
    if is_active(params.saturation) {
        clauses.push(FilterClause::Saturate(100.0 + params.saturation));
    }
    clauses
}

/// Build the live-preview filter string. Empty when nothing is active.
pub fn build_filter_expression(params: &ColorParameters) -> String {
    FilterExpression::new(filter_clauses(params)).to_string()
}

fn is_active(value: f64) -> bool {
    value.is_finite() && value != 0.0
}

/// Deterministic number text: at most four decimals, no trailing zeros.
fn format_number(value: f64) -> String {
    let rounded = (value * 10_000.0).round() / 10_000.0;
    if rounded == 0.0 {
        return "0".to_string();
    }
    format!("{}", rounded)
}
