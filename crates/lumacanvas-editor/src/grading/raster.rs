//! Raster replay of filter clauses onto a bitmap.
//!
//! Each clause is turned into a per-pixel color operation following the
//! filter-effects color matrices and applied in sequence, clamping after
//! every step the way a browser compositor does. Alpha is never touched.

use image::RgbaImage;

use super::filter::FilterClause;

type Matrix = [[f32; 3]; 3];

/// A single color operation on normalized RGB.
#[derive(Debug, Clone, Copy, PartialEq)]
enum ColorOp {
    /// `c' = c * slope + intercept` on every channel.
    Linear { slope: f32, intercept: f32 },
    /// `c' = M · c`
    Matrix(Matrix),
    /// `c' = c * (1 - a) + (1 - c) * a`
    Invert(f32),
}

impl ColorOp {
    fn from_clause(clause: &FilterClause) -> ColorOp {
        match *clause {
            FilterClause::Brightness(pct) => ColorOp::Linear {
                slope: fraction(pct).max(0.0),
                intercept: 0.0,
            },
            FilterClause::Contrast(pct) => {
                let a = fraction(pct).max(0.0);
                ColorOp::Linear {
                    slope: a,
                    intercept: 0.5 - 0.5 * a,
                }
            }
            FilterClause::Saturate(pct) => ColorOp::Matrix(saturate_matrix(fraction(pct).max(0.0))),
            FilterClause::Sepia(pct) => ColorOp::Matrix(sepia_matrix(unit(pct))),
            FilterClause::HueRotate(deg) => ColorOp::Matrix(hue_rotate_matrix(deg as f32)),
            FilterClause::Grayscale(pct) => ColorOp::Matrix(grayscale_matrix(unit(pct))),
            FilterClause::Invert(pct) => ColorOp::Invert(unit(pct)),
        }
    }

    fn apply(&self, rgb: [f32; 3]) -> [f32; 3] {
        let out = match self {
            ColorOp::Linear { slope, intercept } => rgb.map(|c| c * slope + intercept),
            ColorOp::Matrix(m) => [
                m[0][0] * rgb[0] + m[0][1] * rgb[1] + m[0][2] * rgb[2],
                m[1][0] * rgb[0] + m[1][1] * rgb[1] + m[1][2] * rgb[2],
                m[2][0] * rgb[0] + m[2][1] * rgb[1] + m[2][2] * rgb[2],
            ],
            ColorOp::Invert(a) => rgb.map(|c| c * (1.0 - a) + (1.0 - c) * a),
        };
        out.map(|c| c.clamp(0.0, 1.0))
    }
}

/// Apply clauses to an RGBA bitmap in place.
pub fn apply_clauses(image: &mut RgbaImage, clauses: &[FilterClause]) {
    if clauses.is_empty() {
        return;
    }

    let ops: Vec<ColorOp> = clauses.iter().map(ColorOp::from_clause).collect();
    for pixel in image.pixels_mut() {
        let mut rgb = [
            pixel[0] as f32 / 255.0,
            pixel[1] as f32 / 255.0,
            pixel[2] as f32 / 255.0,
        ];
        for op in &ops {
            rgb = op.apply(rgb);
        }
        pixel[0] = to_byte(rgb[0]);
        pixel[1] = to_byte(rgb[1]);
        pixel[2] = to_byte(rgb[2]);
    }
}

fn fraction(pct: f64) -> f32 {
    (pct / 100.0) as f32
}

fn unit(pct: f64) -> f32 {
    fraction(pct).clamp(0.0, 1.0)
}

fn to_byte(c: f32) -> u8 {
    (c * 255.0).round().clamp(0.0, 255.0) as u8
}

fn saturate_matrix(s: f32) -> Matrix {
    [
        [0.213 + 0.787 * s, 0.715 - 0.715 * s, 0.072 - 0.072 * s],
        [0.213 - 0.213 * s, 0.715 + 0.285 * s, 0.072 - 0.072 * s],
        [0.213 - 0.213 * s, 0.715 - 0.715 * s, 0.072 + 0.928 * s],
    ]
}

fn sepia_matrix(a: f32) -> Matrix {
    let k = 1.0 - a;
    [
        [0.393 + 0.607 * k, 0.769 - 0.769 * k, 0.189 - 0.189 * k],
        [0.349 - 0.349 * k, 0.686 + 0.314 * k, 0.168 - 0.168 * k],
        [0.272 - 0.272 * k, 0.534 - 0.534 * k, 0.131 + 0.869 * k],
    ]
}

fn grayscale_matrix(a: f32) -> Matrix {
    let k = 1.0 - a;
    [
        [0.2126 + 0.7874 * k, 0.7152 - 0.7152 * k, 0.0722 - 0.0722 * k],
        [0.2126 - 0.2126 * k, 0.7152 + 0.2848 * k, 0.0722 - 0.0722 * k],
        [0.2126 - 0.2126 * k, 0.7152 - 0.7152 * k, 0.0722 + 0.9278 * k],
    ]
}

fn hue_rotate_matrix(degrees: f32) -> Matrix {
    let (sin, cos) = degrees.to_radians().sin_cos();
    [
        [
            0.213 + cos * 0.787 - sin * 0.213,
            0.715 - cos * 0.715 - sin * 0.715,
            0.072 - cos * 0.072 + sin * 0.928,
        ],
        [
            0.213 - cos * 0.213 + sin * 0.143,
            0.715 + cos * 0.285 + sin * 0.140,
            0.072 - cos * 0.072 - sin * 0.283,
        ],
        [
            0.213 - cos * 0.213 - sin * 0.787,
            0.715 - cos * 0.715 + sin * 0.715,
            0.072 + cos * 0.928 + sin * 0.072,
        ],
    ]
}
