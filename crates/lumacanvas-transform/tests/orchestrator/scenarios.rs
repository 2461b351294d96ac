use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use serde_json::json;

use lumacanvas_core::event_bus::TransformOutcomeKind;
use lumacanvas_core::{Clock, ImageSource, TransformError};
use lumacanvas_transform::{Engine, OrchestratorState, TransformFailure, TransformOutcome};

use crate::support::{orchestrator, png, request, wait_for_polls, ScriptedService};

#[tokio::test]
async fn test_times_out_after_sixty_ticks() {
    let service = ScriptedService::new();
    service.on_submit(Ok(json!({ "id": "job-1" })));
    let (clock, orchestrator) = orchestrator(&service);

    let report = orchestrator
        .run_transform(request("add a neon sign", ImageSource::blob(png(8, 6))))
        .await;

    match &report.outcome {
        TransformOutcome::TimedOut { job_id, attempts } => {
            assert_eq!(job_id, "job-1");
            assert_eq!(*attempts, 60);
        }
        other => panic!("expected a timeout, got {:?}", other),
    }
    assert!(report.outcome.message().contains("longer than expected"));
    assert_eq!(clock.sleep_count(), 60);
    assert_eq!(clock.now_ms(), 60_000);
    assert_eq!(service.poll_count("job-1"), 60);
    assert_eq!(orchestrator.state(), OrchestratorState::Idle);
    assert!(!orchestrator.is_busy());
}

#[tokio::test]
async fn test_ready_with_alternate_field_succeeds() {
    let service = ScriptedService::new();
    service.on_submit(Ok(json!({ "id": "job-2" })));
    service.on_poll("job-2", Ok(json!({ "status": "Pending" })));
    service.on_poll(
        "job-2",
        Ok(json!({ "status": "Ready", "result": { "sample": "https://cdn.example/out.png" } })),
    );
    let (clock, orchestrator) = orchestrator(&service);

    let report = orchestrator
        .run_transform(request("relight from the left", ImageSource::blob(png(8, 6))))
        .await;

    match &report.outcome {
        TransformOutcome::Succeeded { source, job_id } => {
            assert_eq!(source, &ImageSource::remote("https://cdn.example/out.png"));
            assert_eq!(job_id, "job-2");
        }
        other => panic!("expected success, got {:?}", other),
    }
    assert_eq!(clock.sleep_count(), 2);
    assert!(orchestrator.is_current(&report.ticket));
    assert_eq!(orchestrator.state(), OrchestratorState::Idle);
}

#[tokio::test]
async fn test_submission_carries_encoded_image() {
    let service = ScriptedService::new();
    service.on_submit(Ok(json!({ "id": "job-3" })));
    service.on_poll(
        "job-3",
        Ok(json!({ "status": "succeeded", "output": { "image_url": "https://cdn.example/3.png" } })),
    );
    let (_clock, orchestrator) = orchestrator(&service);

    orchestrator
        .run_transform(request("studio lighting", ImageSource::blob(png(8, 6))))
        .await;

    let submitted = service.submitted();
    assert_eq!(submitted.len(), 1);
    let (engine, body) = &submitted[0];
    assert_eq!(*engine, Engine::KontextMax);
    assert_eq!(body.prompt, "studio lighting");
    assert_eq!(body.output_format, "png");
    assert_eq!(body.safety_tolerance, 2);
    assert!(!body.prompt_upsampling);

    let decoded = BASE64.decode(&body.input_image).unwrap();
    assert_eq!(&decoded[..4], b"\x89PNG");
    let image = image::load_from_memory(&decoded).unwrap();
    assert_eq!((image.width(), image.height()), (8, 6));
}

#[tokio::test]
async fn test_polling_url_is_forwarded() {
    let service = ScriptedService::new();
    service.on_submit(Ok(json!({
        "id": "job-4",
        "polling_url": "https://api.example/v1/get_result?id=job-4"
    })));
    service.on_poll("job-4", Ok(json!({ "status": "Ready", "result": { "url": "https://cdn.example/4.png" } })));
    let (_clock, orchestrator) = orchestrator(&service);

    let report = orchestrator
        .run_transform(request("soft window light", ImageSource::blob(png(4, 4))))
        .await;

    assert_eq!(report.outcome.kind(), TransformOutcomeKind::Succeeded);
    let polled = service.polled();
    assert_eq!(
        polled[0].polling_url.as_deref(),
        Some("https://api.example/v1/get_result?id=job-4")
    );
}

#[tokio::test]
async fn test_network_failure_falls_back_to_local_style() {
    let service = ScriptedService::new();
    service.on_submit(Err(TransformError::Network {
        reason: "connection refused".to_string(),
    }));
    let (clock, orchestrator) = orchestrator(&service);

    let report = orchestrator
        .run_transform(request("Warm SUNSET light from behind", ImageSource::blob(png(8, 6))))
        .await;

    match &report.outcome {
        TransformOutcome::LocalFallback {
            source,
            style,
            style_name,
            cause,
        } => {
            assert_eq!(*style, "sunset-glow");
            assert_eq!(*style_name, "Sunset Glow");
            assert!(matches!(cause, TransformError::Network { .. }));
            let bytes = source.bytes().unwrap();
            let image = image::load_from_memory(bytes).unwrap();
            assert_eq!((image.width(), image.height()), (8, 6));
        }
        other => panic!("expected local fallback, got {:?}", other),
    }
    assert_eq!(report.outcome.message(), "Applied Sunset Glow filter (offline)");
    assert_eq!(clock.sleep_count(), 0);
    assert_eq!(orchestrator.state(), OrchestratorState::Idle);
}

#[tokio::test]
async fn test_inline_rejection_falls_back() {
    let service = ScriptedService::new();
    service.on_submit(Ok(json!({ "error": "quota exceeded" })));
    let (_clock, orchestrator) = orchestrator(&service);

    let report = orchestrator
        .run_transform(request("make it vintage", ImageSource::blob(png(4, 4))))
        .await;

    assert!(matches!(
        report.outcome,
        TransformOutcome::LocalFallback { style: "vintage", cause: TransformError::Rejected { .. }, .. }
    ));
}

#[tokio::test]
async fn test_no_fallback_match_fails() {
    let service = ScriptedService::new();
    service.on_submit(Err(TransformError::HttpStatus { status: 401 }));
    let (_clock, orchestrator) = orchestrator(&service);

    let report = orchestrator
        .run_transform(request("remove the background", ImageSource::blob(png(4, 4))))
        .await;

    match &report.outcome {
        TransformOutcome::Failed(TransformFailure::NoFallbackMatch { cause }) => {
            assert!(cause.is_auth_error());
        }
        other => panic!("expected failure, got {:?}", other),
    }
    assert!(report.outcome.message().starts_with("No matching filter found"));
    assert!(report.outcome.result_source().is_none());
    assert_eq!(orchestrator.state(), OrchestratorState::Idle);
}

#[tokio::test]
async fn test_explicit_remote_failure_stops_polling() {
    let service = ScriptedService::new();
    service.on_submit(Ok(json!({ "id": "job-5" })));
    service.on_poll("job-5", Ok(json!({ "status": "processing" })));
    service.on_poll("job-5", Ok(json!({ "status": "Content Moderated" })));
    let (clock, orchestrator) = orchestrator(&service);

    let report = orchestrator
        .run_transform(request("blue hour", ImageSource::blob(png(4, 4))))
        .await;

    match &report.outcome {
        TransformOutcome::Failed(TransformFailure::Remote { job_id, reason }) => {
            assert_eq!(job_id, "job-5");
            assert_eq!(reason, "Content Moderated");
        }
        other => panic!("expected remote failure, got {:?}", other),
    }
    assert_eq!(clock.sleep_count(), 2);
    assert_eq!(service.poll_count("job-5"), 2);
}

#[tokio::test]
async fn test_transient_poll_errors_keep_polling() {
    let service = ScriptedService::new();
    service.on_submit(Ok(json!({ "id": "job-6" })));
    service.on_poll(
        "job-6",
        Err(TransformError::Network {
            reason: "reset".to_string(),
        }),
    );
    service.on_poll("job-6", Err(TransformError::HttpStatus { status: 502 }));
    service.on_poll("job-6", Ok(json!({ "status": "Warming Up" })));
    service.on_poll("job-6", Ok(json!({ "unexpected": true })));
    service.on_poll(
        "job-6",
        Ok(json!({ "status": "succeeded", "output": { "image_url": "https://cdn.example/6.png" } })),
    );
    let (clock, orchestrator) = orchestrator(&service);

    let report = orchestrator
        .run_transform(request("cinematic", ImageSource::blob(png(4, 4))))
        .await;

    assert_eq!(report.outcome.kind(), TransformOutcomeKind::Succeeded);
    assert_eq!(clock.sleep_count(), 5);
}

#[tokio::test]
async fn test_remote_source_is_downloaded_first() {
    let service = ScriptedService::new();
    service.serve("https://cdn.example/previous.png", png(5, 3));
    service.on_submit(Ok(json!({ "id": "job-7" })));
    service.on_poll(
        "job-7",
        Ok(json!({ "status": "Ready", "result": { "image_url": "https://cdn.example/7.png" } })),
    );
    let (_clock, orchestrator) = orchestrator(&service);

    let report = orchestrator
        .run_transform(request(
            "backlit halo",
            ImageSource::remote("https://cdn.example/previous.png"),
        ))
        .await;

    assert_eq!(report.outcome.kind(), TransformOutcomeKind::Succeeded);
    let (_, body) = &service.submitted()[0];
    let decoded = BASE64.decode(&body.input_image).unwrap();
    let image = image::load_from_memory(&decoded).unwrap();
    assert_eq!((image.width(), image.height()), (5, 3));
}

#[tokio::test]
async fn test_unreachable_remote_source_fails() {
    let service = ScriptedService::new();
    let (_clock, orchestrator) = orchestrator(&service);

    let report = orchestrator
        .run_transform(request("sunset", ImageSource::remote("https://cdn.example/gone.png")))
        .await;

    assert!(matches!(
        report.outcome,
        TransformOutcome::Failed(TransformFailure::Source(TransformError::HttpStatus { status: 404 }))
    ));
    assert!(service.submitted().is_empty());
}

#[tokio::test]
async fn test_newer_transform_supersedes_polling_job() {
    let service = ScriptedService::new();
    service.on_submit(Ok(json!({ "id": "job-a" })));
    service.on_submit(Ok(json!({ "id": "job-b" })));
    let gate = service.hold("job-a");
    service.on_poll(
        "job-a",
        Ok(json!({ "status": "Ready", "result": { "sample": "https://cdn.example/stale.png" } })),
    );
    service.on_poll(
        "job-b",
        Ok(json!({ "status": "Ready", "result": { "sample": "https://cdn.example/fresh.png" } })),
    );
    let (_clock, orchestrator) = orchestrator(&service);

    let pending_a = orchestrator.start(request("moonlight", ImageSource::blob(png(4, 4))));
    let ticket_a = pending_a.ticket();
    let runner = orchestrator.clone();
    let job_a = tokio::spawn(async move { runner.run(pending_a).await });

    wait_for_polls(&service, "job-a", 1).await;
    assert_eq!(
        orchestrator.state(),
        OrchestratorState::Polling {
            attempt: 1,
            max_attempts: 60
        }
    );

    let report_b = orchestrator
        .run_transform(request("golden hour", ImageSource::blob(png(4, 4))))
        .await;

    // Release A's stale answer after B has finished.
    gate.notify_one();
    let report_a = job_a.await.unwrap();

    assert!(matches!(report_a.outcome, TransformOutcome::Cancelled));
    assert!(!orchestrator.is_current(&ticket_a));
    assert!(report_a.outcome.result_source().is_none());

    assert!(orchestrator.is_current(&report_b.ticket));
    assert_eq!(
        report_b.outcome.result_source(),
        Some(&ImageSource::remote("https://cdn.example/fresh.png"))
    );
    assert_eq!(orchestrator.state(), OrchestratorState::Idle);
}

#[tokio::test]
async fn test_explicit_cancel_returns_to_idle() {
    let service = ScriptedService::new();
    service.on_submit(Ok(json!({ "id": "job-c" })));
    let _gate = service.hold("job-c");
    let (_clock, orchestrator) = orchestrator(&service);

    let mut states = orchestrator.subscribe_state();
    let pending = orchestrator.start(request("noir", ImageSource::blob(png(4, 4))));
    let ticket = pending.ticket();
    let runner = orchestrator.clone();
    let job = tokio::spawn(async move { runner.run(pending).await });

    wait_for_polls(&service, "job-c", 1).await;
    assert!(orchestrator.state().is_busy());
    assert!(orchestrator.cancel());

    let report = job.await.unwrap();
    assert!(matches!(report.outcome, TransformOutcome::Cancelled));
    assert!(!orchestrator.is_current(&ticket));
    assert!(!orchestrator.cancel());
    assert_eq!(*states.borrow_and_update(), OrchestratorState::Idle);
}
