//! Local fallback for failed submissions.
//!
//! When the remote service cannot be reached, the prompt is matched against
//! an ordered keyword table and the first matching lighting style is
//! rasterized onto the image locally.
//!
//! Matching is a case-insensitive substring test in table order and the
//! first hit wins. Short keywords are greedy: "cool" anywhere in a prompt
//! selects moonlight unless an earlier style matched. That is a known
//! limitation of the heuristic and is kept as is.

use lumacanvas_editor::FilterClause::{self, *};

/// A named look with the keywords that select it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LightingStyle {
    /// Stable identifier, e.g. `"sunset-glow"`.
    pub id: &'static str,
    /// Human-readable name.
    pub name: &'static str,
    /// Lowercase keywords; any substring hit selects the style.
    pub keywords: &'static [&'static str],
    /// Clauses applied to the image.
    pub clauses: &'static [FilterClause],
}

impl LightingStyle {
    fn matches(&self, prompt_lower: &str) -> bool {
        self.keywords.iter().any(|k| prompt_lower.contains(*k))
    }
}

/// Every style, in matching order.
pub const LIGHTING_STYLES: &[LightingStyle] = &[
    LightingStyle {
        id: "blue-hour",
        name: "Blue Hour",
        keywords: &["blue hour", "blue", "7000", "9000k"],
        clauses: &[Brightness(80.0), Contrast(120.0), Saturate(70.0), HueRotate(200.0)],
    },
    LightingStyle {
        id: "sunset-glow",
        name: "Sunset Glow",
        keywords: &["sunset", "golden", "3200", "4000k"],
        clauses: &[
            Brightness(110.0),
            Contrast(110.0),
            Saturate(130.0),
            HueRotate(30.0),
            Sepia(30.0),
        ],
    },
    LightingStyle {
        id: "moonlight",
        name: "Moonlight",
        keywords: &["moonlight", "cool", "4200k", "silver-blue"],
        clauses: &[Brightness(90.0), Contrast(110.0), Saturate(60.0), HueRotate(220.0)],
    },
    LightingStyle {
        id: "campfire",
        name: "Campfire",
        keywords: &["campfire", "warm", "2200", "2800k"],
        clauses: &[
            Brightness(120.0),
            Contrast(110.0),
            Saturate(140.0),
            HueRotate(15.0),
            Sepia(40.0),
        ],
    },
    LightingStyle {
        id: "midday-sun",
        name: "Midday Sun",
        keywords: &["midday", "overhead", "12 o'clock"],
        clauses: &[Brightness(120.0), Contrast(130.0), Saturate(110.0)],
    },
    LightingStyle {
        id: "split-lighting",
        name: "Split Lighting",
        keywords: &["split", "90°", "camera-left"],
        clauses: &[Brightness(90.0), Contrast(140.0), Saturate(100.0)],
    },
    LightingStyle {
        id: "butterfly-lighting",
        name: "Butterfly Lighting",
        keywords: &["butterfly", "above", "centered"],
        clauses: &[Brightness(110.0), Contrast(110.0), Saturate(100.0)],
    },
    LightingStyle {
        id: "clamshell-beauty",
        name: "Clamshell Beauty",
        keywords: &["clamshell", "beauty", "glowing skin"],
        clauses: &[Brightness(120.0), Contrast(100.0), Saturate(110.0)],
    },
    LightingStyle {
        id: "rim-fill",
        name: "Rim + Fill",
        keywords: &["rim", "edge", "back-left"],
        clauses: &[Brightness(90.0), Contrast(120.0), Saturate(100.0)],
    },
    LightingStyle {
        id: "hard-spotlight",
        name: "Hard Spotlight",
        keywords: &["spotlight", "hard", "circle"],
        clauses: &[Brightness(130.0), Contrast(150.0), Saturate(90.0)],
    },
    LightingStyle {
        id: "noir-hard-light",
        name: "Noir Hard Light",
        keywords: &["noir", "tungsten", "chiaroscuro"],
        clauses: &[
            Brightness(80.0),
            Contrast(160.0),
            Saturate(80.0),
            Grayscale(30.0),
        ],
    },
    LightingStyle {
        id: "underlight-horror",
        name: "Underlight Horror",
        keywords: &["underlight", "horror", "low camera-front"],
        clauses: &[
            Brightness(110.0),
            Contrast(140.0),
            Saturate(120.0),
            Invert(10.0),
        ],
    },
    LightingStyle {
        id: "teal-orange",
        name: "Teal & Orange",
        keywords: &["teal", "orange", "blockbuster"],
        clauses: &[
            Brightness(100.0),
            Contrast(120.0),
            Saturate(130.0),
            HueRotate(180.0),
            Sepia(20.0),
        ],
    },
    LightingStyle {
        id: "backlit-halo",
        name: "Backlit Halo",
        keywords: &["backlit", "halo", "120°"],
        clauses: &[Brightness(110.0), Contrast(110.0), Saturate(100.0)],
    },
    LightingStyle {
        id: "studio-portrait",
        name: "Studio Portrait",
        keywords: &["studio", "portrait", "professional"],
        clauses: &[Brightness(110.0), Contrast(110.0), Saturate(100.0)],
    },
    LightingStyle {
        id: "cinematic",
        name: "Cinematic",
        keywords: &["cinematic", "dramatic", "moody"],
        clauses: &[Brightness(90.0), Contrast(130.0), Saturate(110.0)],
    },
    LightingStyle {
        id: "natural-ambient",
        name: "Natural Ambient",
        keywords: &["natural", "ambient", "soft"],
        clauses: &[Brightness(100.0), Contrast(100.0), Saturate(100.0)],
    },
    LightingStyle {
        id: "fashion-beauty",
        name: "Fashion Beauty",
        keywords: &["fashion", "glamour"],
        clauses: &[Brightness(120.0), Contrast(100.0), Saturate(120.0)],
    },
    LightingStyle {
        id: "vintage",
        name: "Vintage",
        keywords: &["vintage", "retro", "classic"],
        clauses: &[
            Brightness(90.0),
            Contrast(110.0),
            Saturate(80.0),
            Sepia(40.0),
        ],
    },
    LightingStyle {
        id: "modern-clean",
        name: "Modern Clean",
        keywords: &["modern", "contemporary", "clean"],
        clauses: &[Brightness(110.0), Contrast(110.0), Saturate(100.0)],
    },
];

/// First style whose keywords appear in `prompt`.
pub fn match_style(prompt: &str) -> Option<&'static LightingStyle> {
    let lower = prompt.to_lowercase();
    LIGHTING_STYLES.iter().find(|style| style.matches(&lower))
}
