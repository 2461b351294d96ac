//! Canvas controller.
//!
//! Wires the inbound command channel to the editor session and the transform
//! orchestrator, publishes [`CanvasEvent`]s and presents a fresh
//! [`RenderFrame`](lumacanvas_editor::RenderFrame) after every change.
//!
//! The session lives behind a `parking_lot` lock that is never held across
//! an `.await`. Transforms run on their own tasks so gestures, undo and redo
//! keep working while a job polls; a finished transform is applied only if
//! its ticket is still current and its target image is still on the canvas.

use parking_lot::Mutex;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::task::JoinHandle;

use lumacanvas_core::event_bus::{
    ErrorEvent, ExportEvent, HistoryEvent, ImageEvent, TransformEvent, TransformOutcomeKind,
    ViewportEvent,
};
use lumacanvas_core::{
    thread_safe_rw, CanvasCommand, CanvasEvent, Clock, CommandReceiver, Error, EventBus,
    ImageError, ImageId, ImageSource, KeyPress, Point, Size, ThreadSafeRw,
};
use lumacanvas_editor::{ColorParameters, EditorSession, KeyOutcome, RenderSink};
use lumacanvas_settings::Config;
use lumacanvas_transform::{
    OrchestratorState, TransformOrchestrator, TransformReport, TransformRequest,
    TransformService,
};

/// Position of the history cursor, used to detect history changes.
type HistoryMarker = (usize, Option<usize>, Option<u64>);

/// Drives one editor session.
#[derive(Clone)]
pub struct CanvasController {
    session: ThreadSafeRw<EditorSession>,
    orchestrator: Arc<TransformOrchestrator>,
    events: Arc<EventBus>,
    sink: Arc<Mutex<Box<dyn RenderSink>>>,
    export_dir: PathBuf,
}

impl CanvasController {
    pub fn new(
        session: EditorSession,
        orchestrator: Arc<TransformOrchestrator>,
        events: Arc<EventBus>,
        sink: Box<dyn RenderSink>,
        export_dir: PathBuf,
    ) -> Self {
        Self {
            session: thread_safe_rw(session),
            orchestrator,
            events,
            sink: Arc::new(Mutex::new(sink)),
            export_dir,
        }
    }

    /// Build a controller from the application configuration.
    pub fn from_config(
        config: &Config,
        service: Arc<dyn TransformService>,
        clock: Arc<dyn Clock>,
        sink: Box<dyn RenderSink>,
    ) -> Self {
        let session = EditorSession::new(config.session_config(), clock.clone());
        let orchestrator =
            TransformOrchestrator::new(service, clock, config.orchestrator_config());
        Self::new(
            session,
            Arc::new(orchestrator),
            Arc::new(EventBus::new()),
            sink,
            config.export.directory.clone(),
        )
    }

    pub fn events(&self) -> &Arc<EventBus> {
        &self.events
    }

    pub fn orchestrator(&self) -> &Arc<TransformOrchestrator> {
        &self.orchestrator
    }

    pub fn export_dir(&self) -> &PathBuf {
        &self.export_dir
    }

    /// Read the session.
    pub fn with_session<R>(&self, f: impl FnOnce(&EditorSession) -> R) -> R {
        f(&*self.session.read())
    }

    /// Process commands until `Close` arrives or every sender is gone.
    ///
    /// On `Close` the in-flight transform is cancelled; when the channel
    /// simply ends, in-flight transforms are allowed to finish.
    pub async fn run(&self, mut commands: CommandReceiver) {
        let forwarder = self.spawn_state_forwarder();
        let mut transforms: Vec<JoinHandle<TransformReport>> = Vec::new();

        tracing::info!("Canvas controller started");
        while let Some(command) = commands.recv().await {
            tracing::debug!("Command: {}", command.name());
            transforms.retain(|handle| !handle.is_finished());

            match command {
                CanvasCommand::RunTransform { tool, prompt } => {
                    if let Some(handle) = self.on_run_transform(tool, prompt) {
                        transforms.push(handle);
                    }
                }
                CanvasCommand::Undo => {
                    self.on_undo();
                }
                CanvasCommand::Redo => {
                    self.on_redo();
                }
                CanvasCommand::Export => match self.on_export().await {
                    Ok(path) => tracing::debug!("Export command wrote {}", path.display()),
                    Err(e) => tracing::debug!("Export command failed: {}", e),
                },
                CanvasCommand::LoadImage { bytes, file_name } => {
                    self.on_load_image(bytes, file_name);
                }
                CanvasCommand::Key(key) => {
                    self.on_key(key);
                }
                CanvasCommand::Wheel { point, delta_y } => {
                    self.on_wheel(point, delta_y);
                }
                CanvasCommand::DragStart(point) => self.on_drag_start(point),
                CanvasCommand::DragMove(point) => {
                    self.on_drag_move(point);
                }
                CanvasCommand::DragEnd => self.on_drag_end(),
                CanvasCommand::SelectImage => {
                    self.on_select();
                }
                CanvasCommand::ClearSelection => self.on_clear_selection(),
                CanvasCommand::ResizeViewport(size) => self.on_resize(size),
                CanvasCommand::Close => {
                    self.on_close();
                    break;
                }
            }
        }

        for handle in transforms {
            if let Err(e) = handle.await {
                tracing::error!("Transform task failed: {}", e);
            }
        }
        forwarder.abort();
        tracing::info!("Canvas controller stopped");
    }

    /// Mirror orchestrator progress into the session status and the bus.
    ///
    /// The task holds a clone of the controller and runs until aborted.
    pub fn spawn_state_forwarder(&self) -> JoinHandle<()> {
        let mut states = self.orchestrator.subscribe_state();
        let controller = self.clone();
        tokio::spawn(async move {
            while states.changed().await.is_ok() {
                let state = *states.borrow_and_update();
                controller.on_orchestrator_state(state);
            }
        })
    }

    // ---------------------------------------------------------------------
    // Inbound signals
    // ---------------------------------------------------------------------

    /// Start an AI transform of the current image.
    ///
    /// Returns the task driving it, or `None` when the canvas is empty.
    pub fn on_run_transform(
        &self,
        tool: String,
        prompt: String,
    ) -> Option<JoinHandle<TransformReport>> {
        self.settle();

        // The target is read and the job started under one write lock so a
        // finishing job cannot replace the image in between.
        let pending = {
            let session = self.session.write();
            session.image().map(|image| {
                self.orchestrator.start(TransformRequest {
                    tool: tool.clone(),
                    prompt: prompt.clone(),
                    target: image.id,
                    source: image.source.clone(),
                })
            })
        };
        let Some(pending) = pending else {
            self.surface("transform", &ImageError::NoImage.to_string());
            return None;
        };
        self.emit(CanvasEvent::Transform(TransformEvent::Started { tool, prompt }));

        let controller = self.clone();
        Some(tokio::spawn(async move {
            let report = controller.orchestrator.run(pending).await;
            controller.finish_transform(&report);
            report
        }))
    }

    pub fn on_undo(&self) -> bool {
        self.settle();
        let changed = self.mutate(EditorSession::undo);
        if changed {
            self.emit_viewport();
            self.present();
        }
        changed
    }

    pub fn on_redo(&self) -> bool {
        self.settle();
        let changed = self.mutate(EditorSession::redo);
        if changed {
            self.emit_viewport();
            self.present();
        }
        changed
    }

    /// Grade the current image and write it to the export directory.
    pub async fn on_export(&self) -> lumacanvas_core::Result<PathBuf> {
        self.settle();

        let source = self.session.read().image().map(|image| image.source.clone());
        let result = match source {
            Some(source) => self.export_source(source).await,
            None => Err(Error::Image(ImageError::NoImage)),
        };

        match &result {
            Ok(path) => tracing::info!("Exported {}", path.display()),
            Err(e) => self.surface("export", &e.to_string()),
        }
        result
    }

    // ---------------------------------------------------------------------
    // Image and gestures
    // ---------------------------------------------------------------------

    /// Put a new image on the canvas. Cancels any in-flight transform.
    pub fn on_load_image(&self, bytes: Vec<u8>, file_name: Option<String>) -> ImageId {
        self.settle();
        if self.orchestrator.cancel() {
            tracing::info!("New image loaded, in-flight transform cancelled");
        }

        let id = self.mutate(|session| session.load_image(bytes, file_name));
        let loaded = self
            .session
            .read()
            .image()
            .map(|image| (image.natural_size, image.scale));
        if let Some((natural_size, scale)) = loaded {
            self.emit(CanvasEvent::Image(ImageEvent::Loaded {
                id,
                natural_size,
                scale,
            }));
        }
        self.present();
        id
    }

    pub fn on_key(&self, key: KeyPress) -> KeyOutcome {
        self.settle();
        let outcome = self.mutate(|session| session.handle_key(key));
        match outcome {
            KeyOutcome::Removed(id) => {
                self.emit(CanvasEvent::Image(ImageEvent::Removed { id }));
                self.present();
            }
            KeyOutcome::ViewReset => {
                self.emit(CanvasEvent::Viewport(ViewportEvent::Reset));
                self.present();
            }
            KeyOutcome::Ignored => {}
        }
        outcome
    }

    pub fn on_wheel(&self, point: Point, delta_y: f64) -> bool {
        self.settle();
        self.viewport_gesture(|session| session.wheel(point, delta_y))
    }

    pub fn on_drag_start(&self, point: Point) {
        self.settle();
        self.session.write().begin_drag(point);
    }

    pub fn on_drag_move(&self, point: Point) -> bool {
        self.viewport_gesture(|session| session.drag_to(point))
    }

    pub fn on_drag_end(&self) {
        self.mutate(EditorSession::end_drag);
    }

    pub fn on_select(&self) -> bool {
        let selected = self.session.write().select_image();
        self.present();
        selected
    }

    pub fn on_clear_selection(&self) {
        self.session.write().clear_selection();
        self.present();
    }

    pub fn on_resize(&self, size: Size) {
        self.session.write().set_viewport_size(size);
    }

    pub fn set_color_parameters(&self, params: ColorParameters) {
        self.session.write().set_color_parameters(params);
        self.present();
    }

    /// Stop the in-flight transform, if any.
    pub fn on_close(&self) {
        self.settle();
        if self.orchestrator.cancel() {
            tracing::info!("Editor closed, in-flight transform cancelled");
        }
    }

    /// Retry a debounced capture.
    pub fn settle(&self) -> bool {
        self.mutate(EditorSession::settle)
    }

    // ---------------------------------------------------------------------
    // Internals
    // ---------------------------------------------------------------------

    fn on_orchestrator_state(&self, state: OrchestratorState) {
        if !state.is_busy() {
            return;
        }
        let status = state.to_string();
        self.session.write().set_status(Some(status.clone()));
        self.emit(CanvasEvent::Transform(TransformEvent::Progress { status }));
        self.present();
    }

    fn finish_transform(&self, report: &TransformReport) {
        let target = report.ticket.target;

        // Checked under the session lock, which `on_run_transform` holds
        // while starting a newer job.
        let replaced = self.mutate(|session| {
            if !self.orchestrator.is_current(&report.ticket) {
                if report.outcome.result_source().is_some() {
                    tracing::info!(
                        "Discarding result of superseded transform #{}",
                        report.ticket.generation
                    );
                }
                return None;
            }
            session.set_status(None);
            report
                .outcome
                .result_source()
                .and_then(|source| session.apply_transform_result(target, source.clone()))
        });

        if let Some(id) = replaced {
            self.emit(CanvasEvent::Image(ImageEvent::Replaced {
                previous: target,
                current: id,
            }));
        }

        let kind = report.outcome.kind();
        let message = report.outcome.message();
        self.emit(CanvasEvent::Transform(TransformEvent::Finished {
            tool: report.tool.clone(),
            outcome: kind,
            message: message.clone(),
            applied: replaced.is_some(),
        }));
        if matches!(
            kind,
            TransformOutcomeKind::Failed | TransformOutcomeKind::TimedOut
        ) {
            self.surface("transform", &message);
        }
        self.present();
    }

    async fn export_source(&self, source: ImageSource) -> lumacanvas_core::Result<PathBuf> {
        let bytes = match source {
            ImageSource::Blob(bytes) => bytes.to_vec(),
            ImageSource::Remote(url) => self.orchestrator.service().download(&url).await?,
        };

        let export = self.session.read().export(&bytes)?;
        let path = export.write_to(&self.export_dir)?;
        self.emit(CanvasEvent::Export(ExportEvent::Completed {
            path: path.clone(),
            bytes: export.bytes.len(),
        }));
        Ok(path)
    }

    fn viewport_gesture(&self, f: impl FnOnce(&mut EditorSession) -> bool) -> bool {
        let changed = self.mutate(f);
        if changed {
            self.emit_viewport();
            self.present();
        }
        changed
    }

    /// Run `f` on the session and publish a history event if it moved.
    fn mutate<R>(&self, f: impl FnOnce(&mut EditorSession) -> R) -> R {
        let (result, before, after) = {
            let mut session = self.session.write();
            let before = history_marker(&session);
            let result = f(&mut *session);
            (result, before, history_marker(&session))
        };

        if before != after {
            let event = self.with_session(|session| {
                let history = session.history();
                HistoryEvent::Changed {
                    can_undo: history.can_undo(),
                    can_redo: history.can_redo(),
                    len: history.len(),
                    current_index: history.current_index(),
                }
            });
            self.emit(CanvasEvent::History(event));
        }
        result
    }

    fn emit_viewport(&self) {
        let transform = self.session.read().transform();
        self.emit(CanvasEvent::Viewport(ViewportEvent::Changed { transform }));
    }

    fn present(&self) {
        let frame = self.session.read().render_frame();
        self.sink.lock().present(&frame);
    }

    fn surface(&self, context: &str, message: &str) {
        tracing::error!("{}: {}", context, message);
        self.emit(CanvasEvent::Error(ErrorEvent::Surfaced {
            context: context.to_string(),
            message: message.to_string(),
        }));
    }

    fn emit(&self, event: CanvasEvent) {
        self.events.emit(event);
    }
}

fn history_marker(session: &EditorSession) -> HistoryMarker {
    let history = session.history();
    (
        history.len(),
        history.current_index(),
        history.last_capture_ms(),
    )
}

impl std::fmt::Debug for CanvasController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CanvasController")
            .field("orchestrator", &self.orchestrator)
            .field("export_dir", &self.export_dir)
            .finish()
    }
}
