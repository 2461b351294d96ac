//! Color grading parameters and named looks.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::filter::FilterClause;

/// Flat record of grading sliders.
///
/// Every numeric field is signed and centered at zero. Only brightness,
/// contrast, saturation, temperature and tint are realized as filter
/// clauses; the rest are carried for panels that edit them and are ignored
/// when building the expression.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ColorParameters {
    pub brightness: f64,
    pub contrast: f64,
    pub highlights: f64,
    pub shadows: f64,
    pub whites: f64,
    pub blacks: f64,
    pub temperature: f64,
    pub tint: f64,
    pub saturation: f64,
    pub vibrance: f64,
    pub hue_shift: f64,
    pub red_hue: f64,
    pub red_saturation: f64,
    pub red_lightness: f64,
    pub green_hue: f64,
    pub green_saturation: f64,
    pub green_lightness: f64,
    pub blue_hue: f64,
    pub blue_saturation: f64,
    pub blue_lightness: f64,
    pub clarity: f64,
    pub texture: f64,
    pub dehaze: f64,
    pub preset: LutPreset,
}

impl ColorParameters {
    /// True when nothing would change the image.
    pub fn is_neutral(&self) -> bool {
        super::filter::filter_clauses(self).is_empty()
    }

    /// Set a slider by its display name (`"brightness"`, `"redHue"`, ...).
    ///
    /// Returns false for unknown names.
    pub fn set_by_name(&mut self, name: &str, value: f64) -> bool {
        let slot = match name {
            "brightness" => &mut self.brightness,
            "contrast" => &mut self.contrast,
            "highlights" => &mut self.highlights,
            "shadows" => &mut self.shadows,
            "whites" => &mut self.whites,
            "blacks" => &mut self.blacks,
            "temperature" => &mut self.temperature,
            "tint" => &mut self.tint,
            "saturation" => &mut self.saturation,
            "vibrance" => &mut self.vibrance,
            "hueShift" => &mut self.hue_shift,
            "redHue" => &mut self.red_hue,
            "redSaturation" => &mut self.red_saturation,
            "redLightness" => &mut self.red_lightness,
            "greenHue" => &mut self.green_hue,
            "greenSaturation" => &mut self.green_saturation,
            "greenLightness" => &mut self.green_lightness,
            "blueHue" => &mut self.blue_hue,
            "blueSaturation" => &mut self.blue_saturation,
            "blueLightness" => &mut self.blue_lightness,
            "clarity" => &mut self.clarity,
            "texture" => &mut self.texture,
            "dehaze" => &mut self.dehaze,
            _ => return false,
        };
        *slot = value;
        true
    }
}

/// Named, fixed looks applied on top of the sliders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum LutPreset {
    #[default]
    None,
    Vintage,
    Film,
    Cyberpunk,
    Horror,
    Warm,
    Cool,
    Cinematic,
}

impl LutPreset {
    /// Every preset in display order.
    pub const ALL: [LutPreset; 8] = [
        LutPreset::None,
        LutPreset::Vintage,
        LutPreset::Film,
        LutPreset::Cyberpunk,
        LutPreset::Horror,
        LutPreset::Warm,
        LutPreset::Cool,
        LutPreset::Cinematic,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            LutPreset::None => "None",
            LutPreset::Vintage => "Vintage",
            LutPreset::Film => "Film",
            LutPreset::Cyberpunk => "Cyberpunk",
            LutPreset::Horror => "Horror",
            LutPreset::Warm => "Warm",
            LutPreset::Cool => "Cool",
            LutPreset::Cinematic => "Cinematic",
        }
    }

    /// The composite clause list this preset contributes.
    pub fn clauses(&self) -> &'static [FilterClause] {
        use FilterClause::*;
        match self {
            LutPreset::None => &[],
            LutPreset::Vintage => &[Sepia(30.0), Contrast(120.0), Brightness(90.0)],
            LutPreset::Film => &[Contrast(110.0), Saturate(90.0), Brightness(95.0)],
            LutPreset::Cyberpunk => &[HueRotate(180.0), Saturate(150.0), Contrast(130.0)],
            LutPreset::Horror => &[Brightness(80.0), Contrast(140.0), Saturate(70.0)],
            LutPreset::Warm => &[Sepia(20.0), Brightness(105.0)],
            LutPreset::Cool => &[HueRotate(200.0), Saturate(110.0)],
            LutPreset::Cinematic => &[Contrast(120.0), Saturate(110.0), Brightness(95.0)],
        }
    }
}

impl fmt::Display for LutPreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for LutPreset {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        LutPreset::ALL
            .iter()
            .find(|preset| preset.name().eq_ignore_ascii_case(s.trim()))
            .copied()
            .ok_or_else(|| format!("Unknown preset: {}", s))
    }
}
