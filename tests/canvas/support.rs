//! Test harness: a controller wired to a scripted service, a manual clock,
//! a frame recorder and an event log.

use async_trait::async_trait;
use image::{Rgba, RgbaImage};
use parking_lot::Mutex;
use serde_json::{json, Value};
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tokio::sync::Notify;

use lumacanvas::controller::CanvasController;
use lumacanvas::{CanvasEvent, Config, EventFilter, FrameRecorder, ManualClock, TransformError};
use lumacanvas_editor::codec::encode_png;
use lumacanvas_transform::{Engine, SubmitRequest, SubmittedJob, TransformService};

type Reply = Result<Value, TransformError>;

#[derive(Default)]
pub struct FakeService {
    submits: Mutex<VecDeque<Reply>>,
    polls: Mutex<HashMap<String, VecDeque<Reply>>>,
    held: Mutex<HashMap<String, Arc<Notify>>>,
    downloads: Mutex<HashMap<String, Vec<u8>>>,
    poll_log: Mutex<Vec<String>>,
}

impl FakeService {
    pub fn on_submit(&self, reply: Reply) {
        self.submits.lock().push_back(reply);
    }

    pub fn on_poll(&self, job: &str, reply: Reply) {
        self.polls
            .lock()
            .entry(job.to_string())
            .or_default()
            .push_back(reply);
    }

    /// Answer with a result URL on the first poll of `job`.
    pub fn ready(&self, job: &str, url: &str) {
        self.on_submit(Ok(json!({ "id": job })));
        self.on_poll(job, Ok(json!({ "status": "Ready", "result": { "sample": url } })));
    }

    pub fn hold(&self, job: &str) -> Arc<Notify> {
        let notify = Arc::new(Notify::new());
        self.held.lock().insert(job.to_string(), notify.clone());
        notify
    }

    pub fn serve(&self, url: &str, bytes: Vec<u8>) {
        self.downloads.lock().insert(url.to_string(), bytes);
    }

    pub fn poll_count(&self, job: &str) -> usize {
        self.poll_log.lock().iter().filter(|id| *id == job).count()
    }
}

#[async_trait]
impl TransformService for FakeService {
    async fn submit(&self, _engine: Engine, _request: &SubmitRequest) -> Reply {
        self.submits.lock().pop_front().unwrap_or_else(|| {
            Err(TransformError::Network {
                reason: "offline".to_string(),
            })
        })
    }

    async fn poll(&self, job: &SubmittedJob) -> Reply {
        self.poll_log.lock().push(job.id.clone());
        let gate = self.held.lock().get(&job.id).cloned();
        if let Some(gate) = gate {
            gate.notified().await;
        }
        self.polls
            .lock()
            .get_mut(&job.id)
            .and_then(VecDeque::pop_front)
            .unwrap_or_else(|| Ok(json!({ "status": "processing" })))
    }

    async fn download(&self, url: &str) -> Result<Vec<u8>, TransformError> {
        self.downloads
            .lock()
            .get(url)
            .cloned()
            .ok_or(TransformError::HttpStatus { status: 404 })
    }
}

pub struct Harness {
    pub controller: CanvasController,
    pub service: Arc<FakeService>,
    pub clock: Arc<ManualClock>,
    pub frames: FrameRecorder,
    pub events: Arc<Mutex<Vec<CanvasEvent>>>,
    pub dir: TempDir,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_config(|_| {})
    }

    pub fn with_config(adjust: impl FnOnce(&mut Config)) -> Self {
        let dir = TempDir::new().unwrap();
        let mut config = Config::default();
        config.export.directory = dir.path().to_path_buf();
        adjust(&mut config);

        let service = Arc::new(FakeService::default());
        let clock = Arc::new(ManualClock::starting_at(1_000));
        let frames = FrameRecorder::new();
        let controller = CanvasController::from_config(
            &config,
            service.clone(),
            clock.clone(),
            Box::new(frames.clone()),
        );

        let events = Arc::new(Mutex::new(Vec::new()));
        let log = events.clone();
        controller
            .events()
            .subscribe(EventFilter::All, move |event| log.lock().push(event));

        Self {
            controller,
            service,
            clock,
            frames,
            events,
            dir,
        }
    }

    /// Step past the history debounce window.
    pub fn tick(&self) {
        self.clock.advance(Duration::from_millis(150));
    }

    pub fn events(&self) -> Vec<CanvasEvent> {
        self.events.lock().clone()
    }
}

pub fn png(width: u32, height: u32) -> Vec<u8> {
    encode_png(RgbaImage::from_pixel(width, height, Rgba([140, 110, 90, 255]))).unwrap()
}

pub async fn wait_for_polls(service: &FakeService, job: &str, count: usize) {
    for _ in 0..10_000 {
        if service.poll_count(job) >= count {
            return;
        }
        tokio::task::yield_now().await;
    }
    panic!("{} was never polled {} times", job, count);
}
