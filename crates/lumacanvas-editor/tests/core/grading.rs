use image::{Rgba, RgbaImage};
use lumacanvas_editor::codec::{decode_rgba, encode_png};
use lumacanvas_editor::grading::{
    apply_to_encoded, build_filter_expression, export_graded, filter_clauses, ColorParameters,
    FilterClause, FilterExpression, LutPreset,
};

fn swatch() -> Vec<u8> {
    encode_png(RgbaImage::from_pixel(4, 2, Rgba([100, 150, 200, 255]))).unwrap()
}

#[test]
fn test_full_expression_order() {
    let params = ColorParameters {
        brightness: 10.0,
        contrast: -10.0,
        saturation: 25.0,
        temperature: -10.0,
        tint: 8.0,
        preset: LutPreset::Cool,
        ..Default::default()
    };
    assert_eq!(
        build_filter_expression(&params),
        "brightness(110%) contrast(90%) saturate(125%) hue-rotate(-6deg) hue-rotate(4deg) \
         hue-rotate(200deg) saturate(110%)"
    );
}

#[test]
fn test_every_preset_has_clauses() {
    for preset in LutPreset::ALL {
        let params = ColorParameters {
            preset,
            ..Default::default()
        };
        let expression = build_filter_expression(&params);
        if preset == LutPreset::None {
            assert!(expression.is_empty());
        } else {
            assert!(!expression.is_empty(), "{} produced nothing", preset);
        }
    }
}

#[test]
fn test_expression_display_matches_builder() {
    let params = ColorParameters {
        contrast: 30.0,
        preset: LutPreset::Horror,
        ..Default::default()
    };
    let expression = FilterExpression::new(filter_clauses(&params));
    assert_eq!(expression.to_string(), build_filter_expression(&params));
    assert_eq!(expression.clauses().len(), 4);
}

#[test]
fn test_parameters_deserialize_from_camel_case() {
    let params: ColorParameters = serde_json::from_str(
        r#"{"brightness": 12, "hueShift": 3, "redSaturation": -4, "preset": "Film"}"#,
    )
    .unwrap();
    assert_eq!(params.brightness, 12.0);
    assert_eq!(params.hue_shift, 3.0);
    assert_eq!(params.red_saturation, -4.0);
    assert_eq!(params.preset, LutPreset::Film);
    assert_eq!(params.contrast, 0.0);
}

#[test]
fn test_export_replays_brightness() {
    let params = ColorParameters {
        brightness: -50.0,
        preset: LutPreset::Cyberpunk,
        ..Default::default()
    };
    let export = export_graded(&swatch(), &params, Some("shot.webp")).unwrap();
    assert_eq!(export.file_name, "shot_color_graded.png");

    let bitmap = decode_rgba(&export.bytes).unwrap();
    assert_eq!(bitmap.dimensions(), (4, 2));
    assert_eq!(bitmap.get_pixel(0, 0).0, [50, 75, 100, 255]);
}

#[test]
fn test_export_writes_file() {
    let dir = tempfile::tempdir().unwrap();
    let export = export_graded(&swatch(), &ColorParameters::default(), None).unwrap();
    let path = export.write_to(&dir.path().join("out")).unwrap();
    assert!(path.ends_with("image_color_graded.png"));
    assert_eq!(std::fs::read(&path).unwrap(), export.bytes);
}

#[test]
fn test_apply_to_encoded_grayscale() {
    let bytes = apply_to_encoded(&swatch(), &[FilterClause::Grayscale(100.0)]).unwrap();
    let [r, g, b, a] = decode_rgba(&bytes).unwrap().get_pixel(1, 1).0;
    assert!((r as i32 - g as i32).abs() <= 1);
    assert!((g as i32 - b as i32).abs() <= 1);
    assert_eq!(a, 255);
}

#[test]
fn test_apply_to_encoded_rejects_garbage() {
    assert!(apply_to_encoded(b"nope", &[FilterClause::Invert(100.0)]).is_err());
}
