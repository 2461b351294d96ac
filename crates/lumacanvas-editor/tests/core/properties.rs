use std::sync::Arc;
use std::time::Duration;

use lumacanvas_core::{ManualClock, Point, Size, ViewportTransform};
use lumacanvas_editor::grading::{build_filter_expression, ColorParameters, LutPreset};
use lumacanvas_editor::history::HistoryManager;
use lumacanvas_editor::placement::{place_centered, PlacementLimits};
use lumacanvas_editor::viewport::Viewport;
use lumacanvas_editor::EditorSession;
use proptest::prelude::*;

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() <= 1e-6 * a.abs().max(b.abs()).max(1.0)
}

proptest! {
    #[test]
    fn zoom_keeps_point_under_cursor(
        px in -5_000.0f64..5_000.0,
        py in -5_000.0f64..5_000.0,
        factor in 0.01f64..100.0,
        zoom in 0.05f64..20.0,
        ox in -2_000.0f64..2_000.0,
        oy in -2_000.0f64..2_000.0,
    ) {
        let mut vp = Viewport::new(1200.0, 800.0);
        vp.set_transform(ViewportTransform::new(zoom, Point::new(ox, oy)));
        let cursor = Point::new(px, py);

        let before = vp.screen_to_canvas(cursor);
        prop_assert!(vp.zoom_at(cursor, factor));
        let after = vp.screen_to_canvas(cursor);

        prop_assert!(close(before.x, after.x), "{} vs {}", before, after);
        prop_assert!(close(before.y, after.y), "{} vs {}", before, after);
    }

    #[test]
    fn history_never_exceeds_capacity(captures in 51usize..200) {
        let mut history = HistoryManager::new();
        for i in 0..captures {
            let transform = ViewportTransform::new(1.0 + i as f64, Point::ORIGIN);
            prop_assert!(history.capture(None, transform, i as u64 * 100).is_accepted());
        }
        prop_assert_eq!(history.len(), 50);
        prop_assert_eq!(history.current_index(), Some(49));
    }

    #[test]
    fn identical_captures_inside_window_store_one(gap in 0u64..100, zoom in 0.1f64..10.0) {
        let mut history = HistoryManager::new();
        let transform = ViewportTransform::new(zoom, Point::new(3.0, 4.0));
        history.capture(None, transform, 5_000);
        history.capture(None, transform, 5_000 + gap);
        prop_assert_eq!(history.len(), 1);
    }

    #[test]
    fn undo_then_redo_is_identity(
        edits in prop::collection::vec(
            (-500.0f64..500.0, -500.0f64..500.0, 0.5f64..2.0, 0u64..250, 0u64..250),
            1..20,
        )
    ) {
        let clock = Arc::new(ManualClock::new());
        let mut session = EditorSession::with_defaults(clock.clone());
        clock.advance(Duration::from_millis(200));
        session.load_image(b"placeholder".to_vec(), None);

        // Gaps under the debounce window leave the last edit pending
        for (dx, dy, factor, pan_gap, zoom_gap) in edits {
            clock.advance(Duration::from_millis(pan_gap));
            session.pan_by(Point::new(dx, dy));
            clock.advance(Duration::from_millis(zoom_gap));
            session.zoom_at(Point::new(dx, dy), factor);
        }

        let image = session.image().cloned();
        let transform = session.transform();

        session.undo();
        session.redo();

        prop_assert_eq!(session.transform(), transform);
        let restored = session.image().cloned();
        prop_assert_eq!(restored.as_ref().map(|i| i.id), image.as_ref().map(|i| i.id));
        prop_assert_eq!(restored.as_ref().map(|i| i.position), image.as_ref().map(|i| i.position));
        prop_assert_eq!(restored.as_ref().map(|i| i.scale), image.as_ref().map(|i| i.scale));
    }

    #[test]
    fn filter_expression_is_pure(
        brightness in -100.0f64..100.0,
        contrast in -100.0f64..100.0,
        saturation in -100.0f64..100.0,
        temperature in -100.0f64..100.0,
        tint in -100.0f64..100.0,
        clarity in -100.0f64..100.0,
        preset in 0usize..8,
    ) {
        let params = ColorParameters {
            brightness,
            contrast,
            saturation,
            temperature,
            tint,
            clarity,
            preset: LutPreset::ALL[preset],
            ..Default::default()
        };
        let first = build_filter_expression(&params);
        let second = build_filter_expression(&params.clone());
        prop_assert_eq!(first, second);
    }

    #[test]
    fn placement_scale_is_bounded(
        w in 1.0f64..10_000.0,
        h in 1.0f64..10_000.0,
        vw in 1.0f64..5_000.0,
        vh in 1.0f64..5_000.0,
    ) {
        let natural = Size::new(w, h);
        let placement = place_centered(natural, Size::new(vw, vh));
        let limits = PlacementLimits::default();
        let floor = limits.min_scale_for(natural).min(limits.max_scale);

        prop_assert!(placement.scale >= floor - 1e-12);
        prop_assert!(placement.scale <= limits.max_scale);
        prop_assert!(placement.position.is_finite());
    }
}
