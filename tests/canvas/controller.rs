use serde_json::json;

use lumacanvas::{
    command_channel, CanvasCommand, CanvasEvent, ImageSource, KeyPress, Point, TransformError,
    ViewportTransform,
};
use lumacanvas_core::event_bus::{
    ErrorEvent, ExportEvent, ImageEvent, TransformEvent, TransformOutcomeKind,
};
use lumacanvas_editor::KeyOutcome;
use lumacanvas_transform::TransformOutcome;

use crate::support::{png, wait_for_polls, Harness};

fn finished(events: &[CanvasEvent]) -> Vec<(TransformOutcomeKind, bool)> {
    events
        .iter()
        .filter_map(|event| match event {
            CanvasEvent::Transform(TransformEvent::Finished {
                outcome, applied, ..
            }) => Some((*outcome, *applied)),
            _ => None,
        })
        .collect()
}

fn surfaced(events: &[CanvasEvent]) -> Vec<(String, String)> {
    events
        .iter()
        .filter_map(|event| match event {
            CanvasEvent::Error(ErrorEvent::Surfaced { context, message }) => {
                Some((context.clone(), message.clone()))
            }
            _ => None,
        })
        .collect()
}

#[tokio::test]
async fn test_command_channel_drives_session() {
    let h = Harness::new();
    h.service.ready("job-1", "https://cdn.example/relit.png");

    let (tx, rx) = command_channel(16);
    tx.send(CanvasCommand::LoadImage {
        bytes: png(600, 400),
        file_name: Some("photo.png".to_string()),
    })
    .unwrap();
    tx.send(CanvasCommand::Wheel {
        point: Point::new(600.0, 400.0),
        delta_y: -120.0,
    })
    .unwrap();
    tx.run_transform("relight", "golden hour").unwrap();
    drop(tx);

    h.controller.run(rx).await;

    let image = h.controller.with_session(|s| s.image().cloned()).unwrap();
    assert_eq!(image.source, ImageSource::remote("https://cdn.example/relit.png"));
    assert_eq!(image.scale, 2.0);
    assert_eq!(image.position, Point::new(0.0, 0.0));

    let zoom = h.controller.with_session(|s| s.transform().zoom_scale);
    assert!((zoom - 1.1).abs() < 1e-9);

    let events = h.events();
    assert!(events
        .iter()
        .any(|e| matches!(e, CanvasEvent::Image(ImageEvent::Loaded { .. }))));
    assert!(events
        .iter()
        .any(|e| matches!(e, CanvasEvent::Image(ImageEvent::Replaced { .. }))));
    assert_eq!(finished(&events), vec![(TransformOutcomeKind::Succeeded, true)]);

    let frame = h.frames.last().unwrap();
    assert_eq!(
        frame.image.unwrap().source,
        ImageSource::remote("https://cdn.example/relit.png")
    );
    assert_eq!(frame.status, None);
}

#[tokio::test]
async fn test_result_for_undone_image_is_discarded() {
    let h = Harness::new();
    h.service.on_submit(Ok(json!({ "id": "job-u" })));
    h.service.on_poll(
        "job-u",
        Ok(json!({ "status": "Ready", "result": { "sample": "https://cdn.example/late.png" } })),
    );
    let gate = h.service.hold("job-u");

    h.tick();
    h.controller.on_load_image(png(300, 300), None);
    let task = h
        .controller
        .on_run_transform("relight".to_string(), "studio light".to_string())
        .unwrap();
    wait_for_polls(&h.service, "job-u", 1).await;

    assert!(h.controller.on_undo());
    assert!(h.controller.with_session(|s| s.image().is_none()));

    gate.notify_one();
    let report = task.await.unwrap();

    assert!(matches!(report.outcome, TransformOutcome::Succeeded { .. }));
    assert!(h.controller.with_session(|s| s.image().is_none()));
    assert_eq!(
        finished(&h.events()),
        vec![(TransformOutcomeKind::Succeeded, false)]
    );
}

#[tokio::test]
async fn test_superseded_transform_never_lands() {
    let h = Harness::new();
    h.service.on_submit(Ok(json!({ "id": "job-a" })));
    let gate = h.service.hold("job-a");
    h.service.on_poll(
        "job-a",
        Ok(json!({ "status": "Ready", "result": { "sample": "https://cdn.example/stale.png" } })),
    );
    h.service.ready("job-b", "https://cdn.example/fresh.png");

    h.tick();
    let original = h.controller.on_load_image(png(300, 200), None);
    let task_a = h
        .controller
        .on_run_transform("relight".to_string(), "moonlight".to_string())
        .unwrap();
    wait_for_polls(&h.service, "job-a", 1).await;

    let task_b = h
        .controller
        .on_run_transform("relight".to_string(), "golden hour".to_string())
        .unwrap();
    let report_b = task_b.await.unwrap();
    assert!(matches!(report_b.outcome, TransformOutcome::Succeeded { .. }));

    gate.notify_one();
    let report_a = task_a.await.unwrap();
    assert!(matches!(report_a.outcome, TransformOutcome::Cancelled));

    let image = h.controller.with_session(|s| s.image().cloned()).unwrap();
    assert_ne!(image.id, original);
    assert_eq!(image.source, ImageSource::remote("https://cdn.example/fresh.png"));

    let outcomes = finished(&h.events());
    assert!(outcomes.contains(&(TransformOutcomeKind::Succeeded, true)));
    assert!(outcomes.contains(&(TransformOutcomeKind::Cancelled, false)));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_transform_started_while_previous_finishes() {
    for _ in 0..20 {
        let h = Harness::new();
        h.service.on_submit(Ok(json!({ "id": "job-a" })));
        let gate = h.service.hold("job-a");
        h.service.on_poll(
            "job-a",
            Ok(json!({ "status": "Ready", "result": { "sample": "https://cdn.example/stale.png" } })),
        );
        h.service.ready("job-b", "https://cdn.example/fresh.png");

        h.tick();
        h.controller.on_load_image(png(300, 200), None);
        let task_a = h
            .controller
            .on_run_transform("relight".to_string(), "moonlight".to_string())
            .unwrap();
        wait_for_polls(&h.service, "job-a", 1).await;

        // Release the first job and start the second at the same time
        gate.notify_one();
        let task_b = h
            .controller
            .on_run_transform("relight".to_string(), "golden hour".to_string())
            .unwrap();
        let report_b = task_b.await.unwrap();
        task_a.await.unwrap();

        assert!(matches!(report_b.outcome, TransformOutcome::Succeeded { .. }));
        let image = h.controller.with_session(|s| s.image().cloned()).unwrap();
        assert_eq!(image.source, ImageSource::remote("https://cdn.example/fresh.png"));
        assert!(finished(&h.events()).contains(&(TransformOutcomeKind::Succeeded, true)));
    }
}

#[tokio::test]
async fn test_offline_fallback_replaces_content() {
    let h = Harness::new();
    h.service.on_submit(Err(TransformError::Network {
        reason: "dns".to_string(),
    }));

    h.tick();
    let original = h.controller.on_load_image(png(40, 30), Some("beach.png".to_string()));
    let report = h
        .controller
        .on_run_transform("relight".to_string(), "sunset over the sea".to_string())
        .unwrap()
        .await
        .unwrap();

    assert!(matches!(
        report.outcome,
        TransformOutcome::LocalFallback { style: "sunset-glow", .. }
    ));
    let image = h.controller.with_session(|s| s.image().cloned()).unwrap();
    assert_ne!(image.id, original);
    assert!(!image.source.is_remote());
    assert_eq!(image.file_name.as_deref(), Some("beach.png"));
    assert_eq!(
        finished(&h.events()),
        vec![(TransformOutcomeKind::LocalFallback, true)]
    );
}

#[tokio::test]
async fn test_unmatched_offline_prompt_is_surfaced() {
    let h = Harness::new();
    h.tick();
    let original = h.controller.on_load_image(png(40, 30), None);

    let report = h
        .controller
        .on_run_transform("erase".to_string(), "remove the person".to_string())
        .unwrap()
        .await
        .unwrap();

    assert!(matches!(report.outcome, TransformOutcome::Failed(_)));
    assert_eq!(h.controller.with_session(|s| s.image_id()), Some(original));

    let errors = surfaced(&h.events());
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].0, "transform");
    assert!(errors[0].1.starts_with("No matching filter found"));
}

#[tokio::test]
async fn test_timeout_is_surfaced_and_status_cleared() {
    let h = Harness::with_config(|config| config.polling.max_attempts = 3);
    h.service.on_submit(Ok(json!({ "id": "job-slow" })));

    h.tick();
    h.controller.on_load_image(png(40, 30), None);
    let report = h
        .controller
        .on_run_transform("relight".to_string(), "neon".to_string())
        .unwrap()
        .await
        .unwrap();

    assert!(matches!(
        report.outcome,
        TransformOutcome::TimedOut { attempts: 3, .. }
    ));
    assert_eq!(h.service.poll_count("job-slow"), 3);
    assert_eq!(h.controller.with_session(|s| s.status().map(str::to_string)), None);

    let errors = surfaced(&h.events());
    assert!(errors[0].1.contains("longer than expected"));
}

#[tokio::test]
async fn test_transform_without_image() {
    let h = Harness::new();
    assert!(h
        .controller
        .on_run_transform("relight".to_string(), "sunset".to_string())
        .is_none());
    assert_eq!(surfaced(&h.events())[0].0, "transform");
}

#[tokio::test]
async fn test_export_writes_graded_png() {
    let h = Harness::new();
    h.tick();
    h.controller.on_load_image(png(20, 10), Some("photo.jpg".to_string()));

    let mut params = lumacanvas::ColorParameters::default();
    params.brightness = 20.0;
    h.controller.set_color_parameters(params);
    assert_eq!(h.frames.last().unwrap().filter, "brightness(120%)");

    let path = h.controller.on_export().await.unwrap();
    assert_eq!(path, h.dir.path().join("photo_color_graded.png"));

    let exported = image::open(&path).unwrap().to_rgba8();
    assert_eq!(exported.dimensions(), (20, 10));
    assert_eq!(exported.get_pixel(0, 0)[0], 168);

    assert!(h.events().iter().any(|e| matches!(
        e,
        CanvasEvent::Export(ExportEvent::Completed { .. })
    )));
}

#[tokio::test]
async fn test_export_downloads_remote_result() {
    let h = Harness::new();
    h.service.ready("job-r", "https://cdn.example/result.png");
    h.service.serve("https://cdn.example/result.png", png(12, 8));

    h.tick();
    h.controller.on_load_image(png(30, 20), None);
    h.controller
        .on_run_transform("relight".to_string(), "blue hour".to_string())
        .unwrap()
        .await
        .unwrap();

    let path = h.controller.on_export().await.unwrap();
    assert_eq!(path.file_name().unwrap(), "image_color_graded.png");
    let exported = image::open(&path).unwrap();
    assert_eq!((exported.width(), exported.height()), (12, 8));
}

#[tokio::test]
async fn test_export_without_image_fails() {
    let h = Harness::new();
    assert!(h.controller.on_export().await.is_err());
    assert_eq!(surfaced(&h.events())[0].0, "export");
}

#[tokio::test]
async fn test_failed_export_command_keeps_loop_running() {
    let h = Harness::new();
    let (tx, rx) = command_channel(4);
    tx.export().unwrap();
    tx.send(CanvasCommand::LoadImage {
        bytes: png(20, 10),
        file_name: None,
    })
    .unwrap();
    drop(tx);

    h.controller.run(rx).await;

    assert!(h.controller.with_session(|s| s.image().is_some()));
    assert_eq!(surfaced(&h.events())[0].0, "export");
}

#[tokio::test]
async fn test_keyboard_shortcuts() {
    let h = Harness::new();
    h.tick();
    let id = h.controller.on_load_image(png(100, 100), None);

    assert_eq!(h.controller.on_key(KeyPress::Delete), KeyOutcome::Ignored);
    assert!(h.controller.on_select());
    h.tick();
    assert_eq!(h.controller.on_key(KeyPress::Backspace), KeyOutcome::Removed(id));
    assert!(h.controller.with_session(|s| s.image().is_none() && !s.is_selected()));
    assert!(h
        .events()
        .iter()
        .any(|e| matches!(e, CanvasEvent::Image(ImageEvent::Removed { .. }))));

    h.tick();
    assert!(h.controller.on_wheel(Point::new(10.0, 10.0), 100.0));
    h.tick();
    assert_eq!(h.controller.on_key(KeyPress::Char('0')), KeyOutcome::ViewReset);
    assert_eq!(
        h.controller.with_session(|s| s.transform()),
        ViewportTransform::IDENTITY
    );
}

#[tokio::test]
async fn test_undo_redo_round_trip() {
    let h = Harness::new();
    h.tick();
    h.controller.on_load_image(png(100, 100), None);
    h.tick();
    h.controller.on_drag_start(Point::new(0.0, 0.0));
    h.controller.on_drag_move(Point::new(40.0, -20.0));
    h.controller.on_drag_end();
    let dragged = h.controller.with_session(|s| s.transform());
    assert_eq!(dragged.offset, Point::new(40.0, -20.0));

    h.tick();
    assert!(h.controller.on_undo());
    assert_eq!(
        h.controller.with_session(|s| s.transform()),
        ViewportTransform::IDENTITY
    );
    h.tick();
    assert!(h.controller.on_redo());
    assert_eq!(h.controller.with_session(|s| s.transform()), dragged);
}

#[tokio::test]
async fn test_close_cancels_in_flight_transform() {
    let h = Harness::new();
    h.service.on_submit(Ok(json!({ "id": "job-c" })));
    let _gate = h.service.hold("job-c");

    h.tick();
    h.controller.on_load_image(png(40, 30), None);

    let (tx, rx) = command_channel(4);
    tx.run_transform("relight", "noir").unwrap();
    let controller = h.controller.clone();
    let runner = tokio::spawn(async move { controller.run(rx).await });

    wait_for_polls(&h.service, "job-c", 1).await;
    tx.send(CanvasCommand::Close).unwrap();
    runner.await.unwrap();

    assert_eq!(
        finished(&h.events()),
        vec![(TransformOutcomeKind::Cancelled, false)]
    );
    assert!(!h.controller.orchestrator().is_busy());
}
