//! AI transform orchestration.
//!
//! One [`TransformOrchestrator`] serves a whole editor session. Each call to
//! [`TransformOrchestrator::start`] mints a new generation and cancels the
//! polling loop of the previous one through its watch channel, so at most one
//! job is ever live. Results are tagged with a [`JobTicket`]; callers check
//! [`TransformOrchestrator::is_current`] and the ticket's target image before
//! applying anything.
//!
//! Every failure is folded into a [`TransformOutcome`]. Nothing here returns
//! an `Err` to the caller.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use parking_lot::Mutex;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::watch;

use lumacanvas_core::constants::{DEFAULT_SAFETY_TOLERANCE, MAX_POLL_ATTEMPTS, POLL_INTERVAL_MS};
use lumacanvas_core::event_bus::TransformOutcomeKind;
use lumacanvas_core::{Clock, ImageError, ImageId, ImageSource, TransformError};
use lumacanvas_editor::codec::{decode_rgba, encode_png};
use lumacanvas_editor::grading::apply_to_encoded;

use crate::fallback::match_style;
use crate::job::{JobStatus, TransformJob};
use crate::service::{Engine, SubmitRequest, TransformService};
use crate::status::{PollStatus, SubmittedJob};

/// Orchestrator settings.
#[derive(Debug, Clone, PartialEq)]
pub struct OrchestratorConfig {
    pub engine: Engine,
    pub poll_interval: Duration,
    pub max_attempts: u32,
    pub safety_tolerance: u8,
    pub output_format: String,
    pub prompt_upsampling: bool,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            engine: Engine::default(),
            poll_interval: Duration::from_millis(POLL_INTERVAL_MS),
            max_attempts: MAX_POLL_ATTEMPTS,
            safety_tolerance: DEFAULT_SAFETY_TOLERANCE,
            output_format: "png".to_string(),
            prompt_upsampling: false,
        }
    }
}

/// Observable state of the orchestrator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrchestratorState {
    Idle,
    Submitting,
    Polling { attempt: u32, max_attempts: u32 },
    Succeeded,
    Failed,
    TimedOut,
}

impl OrchestratorState {
    /// Whether a job is in flight.
    pub fn is_busy(&self) -> bool {
        matches!(
            self,
            OrchestratorState::Submitting | OrchestratorState::Polling { .. }
        )
    }
}

impl fmt::Display for OrchestratorState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrchestratorState::Idle => write!(f, "Idle"),
            OrchestratorState::Submitting => write!(f, "Submitting..."),
            OrchestratorState::Polling {
                attempt,
                max_attempts,
            } => write!(f, "Polling attempt {}/{}...", attempt, max_attempts),
            OrchestratorState::Succeeded => write!(f, "Succeeded"),
            OrchestratorState::Failed => write!(f, "Failed"),
            OrchestratorState::TimedOut => write!(f, "Timed out"),
        }
    }
}

/// A transform to run against a specific image.
#[derive(Debug, Clone)]
pub struct TransformRequest {
    /// Tool that triggered the transform, e.g. `"relight"`.
    pub tool: String,
    pub prompt: String,
    /// Identity of the image the result is meant for.
    pub target: ImageId,
    /// Content to transform.
    pub source: ImageSource,
}

/// Identifies one run of the orchestrator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JobTicket {
    pub generation: u64,
    pub target: ImageId,
}

/// Why a transform produced nothing.
#[derive(Error, Debug, Clone)]
pub enum TransformFailure {
    /// Submission failed and no local style matches the prompt.
    #[error("No matching filter found for this prompt ({cause})")]
    NoFallbackMatch { cause: TransformError },

    /// The service reported the job as failed.
    #[error("Transform failed: {reason}")]
    Remote { job_id: String, reason: String },

    /// The bytes of the source image could not be fetched.
    #[error("Could not read the source image: {0}")]
    Source(TransformError),

    /// The source image could not be decoded or re-encoded.
    #[error(transparent)]
    Image(#[from] ImageError),
}

/// Result of one orchestrator run.
#[derive(Debug, Clone)]
pub enum TransformOutcome {
    /// The remote job finished with a result.
    Succeeded { source: ImageSource, job_id: String },
    /// Submission failed; a local style was applied instead.
    LocalFallback {
        source: ImageSource,
        style: &'static str,
        style_name: &'static str,
        cause: TransformError,
    },
    Failed(TransformFailure),
    /// The polling budget ran out.
    TimedOut { job_id: String, attempts: u32 },
    /// Superseded by a newer transform or cancelled explicitly.
    Cancelled,
}

impl TransformOutcome {
    pub fn kind(&self) -> TransformOutcomeKind {
        match self {
            TransformOutcome::Succeeded { .. } => TransformOutcomeKind::Succeeded,
            TransformOutcome::LocalFallback { .. } => TransformOutcomeKind::LocalFallback,
            TransformOutcome::Failed(_) => TransformOutcomeKind::Failed,
            TransformOutcome::TimedOut { .. } => TransformOutcomeKind::TimedOut,
            TransformOutcome::Cancelled => TransformOutcomeKind::Cancelled,
        }
    }

    /// New image content, if the outcome carries one.
    pub fn result_source(&self) -> Option<&ImageSource> {
        match self {
            TransformOutcome::Succeeded { source, .. }
            | TransformOutcome::LocalFallback { source, .. } => Some(source),
            _ => None,
        }
    }

    /// User-facing message.
    pub fn message(&self) -> String {
        match self {
            TransformOutcome::Succeeded { .. } => "Image transformed successfully".to_string(),
            TransformOutcome::LocalFallback { style_name, .. } => {
                format!("Applied {} filter (offline)", style_name)
            }
            TransformOutcome::Failed(failure) => failure.to_string(),
            TransformOutcome::TimedOut { .. } => {
                "Processing is taking longer than expected. Please try again.".to_string()
            }
            TransformOutcome::Cancelled => "Transform cancelled".to_string(),
        }
    }
}

/// What [`TransformOrchestrator::run`] hands back.
#[derive(Debug, Clone)]
pub struct TransformReport {
    pub ticket: JobTicket,
    pub tool: String,
    pub outcome: TransformOutcome,
}

/// A started, not yet driven transform.
#[derive(Debug)]
pub struct PendingTransform {
    ticket: JobTicket,
    request: TransformRequest,
    cancel_rx: watch::Receiver<bool>,
}

impl PendingTransform {
    pub fn ticket(&self) -> JobTicket {
        self.ticket
    }

    pub fn request(&self) -> &TransformRequest {
        &self.request
    }
}

struct ActiveJob {
    generation: u64,
    cancel: watch::Sender<bool>,
}

/// Drives transforms against a [`TransformService`].
pub struct TransformOrchestrator {
    service: Arc<dyn TransformService>,
    clock: Arc<dyn Clock>,
    config: OrchestratorConfig,
    generation: AtomicU64,
    active: Mutex<Option<ActiveJob>>,
    state: watch::Sender<OrchestratorState>,
}

impl TransformOrchestrator {
    pub fn new(
        service: Arc<dyn TransformService>,
        clock: Arc<dyn Clock>,
        config: OrchestratorConfig,
    ) -> Self {
        let (state, _) = watch::channel(OrchestratorState::Idle);
        Self {
            service,
            clock,
            config,
            generation: AtomicU64::new(0),
            active: Mutex::new(None),
            state,
        }
    }

    pub fn config(&self) -> &OrchestratorConfig {
        &self.config
    }

    pub fn service(&self) -> &Arc<dyn TransformService> {
        &self.service
    }

    pub fn state(&self) -> OrchestratorState {
        *self.state.borrow()
    }

    /// Receive every state transition.
    pub fn subscribe_state(&self) -> watch::Receiver<OrchestratorState> {
        self.state.subscribe()
    }

    /// Whether a job is registered as live.
    pub fn is_busy(&self) -> bool {
        self.active.lock().is_some()
    }

    /// Whether `ticket` belongs to the most recent run.
    pub fn is_current(&self, ticket: &JobTicket) -> bool {
        ticket.generation == self.generation.load(Ordering::SeqCst)
    }

    /// Register a new run, cancelling the previous one.
    pub fn start(&self, request: TransformRequest) -> PendingTransform {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let (cancel, cancel_rx) = watch::channel(false);

        let previous = self
            .active
            .lock()
            .replace(ActiveJob { generation, cancel });
        if let Some(previous) = previous {
            tracing::info!(
                "Transform #{} supersedes #{}",
                generation,
                previous.generation
            );
            previous.cancel.send_replace(true);
        }

        PendingTransform {
            ticket: JobTicket {
                generation,
                target: request.target,
            },
            request,
            cancel_rx,
        }
    }

    /// Drive a started transform to its outcome.
    pub async fn run(&self, pending: PendingTransform) -> TransformReport {
        let PendingTransform {
            ticket,
            request,
            mut cancel_rx,
        } = pending;

        tracing::info!(
            "Transform #{} [{}] for {}: {}",
            ticket.generation,
            request.tool,
            ticket.target,
            request.prompt
        );

        let outcome = tokio::select! {
            biased;
            _ = cancelled(&mut cancel_rx) => {
                tracing::info!("Transform #{} cancelled", ticket.generation);
                TransformOutcome::Cancelled
            }
            outcome = self.execute(ticket.generation, &request) => outcome,
        };

        self.finish(ticket.generation, &outcome);

        TransformReport {
            ticket,
            tool: request.tool,
            outcome,
        }
    }

    /// [`start`](Self::start) followed by [`run`](Self::run).
    pub async fn run_transform(&self, request: TransformRequest) -> TransformReport {
        let pending = self.start(request);
        self.run(pending).await
    }

    /// Cancel the live job, if any. Tickets issued so far stop being current.
    pub fn cancel(&self) -> bool {
        let taken = self.active.lock().take();
        self.generation.fetch_add(1, Ordering::SeqCst);

        match taken {
            Some(active) => {
                tracing::info!("Cancelling transform #{}", active.generation);
                active.cancel.send_replace(true);
                self.state.send_replace(OrchestratorState::Idle);
                true
            }
            None => false,
        }
    }

    async fn execute(&self, generation: u64, request: &TransformRequest) -> TransformOutcome {
        self.set_state(generation, OrchestratorState::Submitting);

        let bytes = match self.source_bytes(&request.source).await {
            Ok(bytes) => bytes,
            Err(failure) => return TransformOutcome::Failed(failure),
        };

        let input_image = match encode_for_submission(&bytes) {
            Ok(encoded) => encoded,
            Err(e) => return TransformOutcome::Failed(TransformFailure::Image(e)),
        };

        let submit = SubmitRequest {
            prompt: request.prompt.clone(),
            input_image,
            output_format: self.config.output_format.clone(),
            safety_tolerance: self.config.safety_tolerance,
            prompt_upsampling: self.config.prompt_upsampling,
        };

        let submitted = self
            .service
            .submit(self.config.engine, &submit)
            .await
            .and_then(|response| SubmittedJob::from_response(&response));

        match submitted {
            Ok(job) => self.poll_until_done(generation, &job).await,
            Err(cause) => self.fallback(request, &bytes, cause),
        }
    }

    async fn source_bytes(&self, source: &ImageSource) -> Result<Vec<u8>, TransformFailure> {
        match source {
            ImageSource::Blob(bytes) => Ok(bytes.to_vec()),
            ImageSource::Remote(url) => self
                .service
                .download(url)
                .await
                .map_err(TransformFailure::Source),
        }
    }

    fn fallback(
        &self,
        request: &TransformRequest,
        bytes: &[u8],
        cause: TransformError,
    ) -> TransformOutcome {
        tracing::warn!("Submission failed ({}), trying local fallback", cause);

        let Some(style) = match_style(&request.prompt) else {
            tracing::error!("No local filter matches prompt '{}'", request.prompt);
            return TransformOutcome::Failed(TransformFailure::NoFallbackMatch { cause });
        };

        match apply_to_encoded(bytes, style.clauses) {
            Ok(png) => {
                tracing::info!("Applied local {} filter", style.name);
                TransformOutcome::LocalFallback {
                    source: ImageSource::blob(png),
                    style: style.id,
                    style_name: style.name,
                    cause,
                }
            }
            Err(e) => TransformOutcome::Failed(TransformFailure::Image(e)),
        }
    }

    async fn poll_until_done(&self, generation: u64, submitted: &SubmittedJob) -> TransformOutcome {
        let mut job = TransformJob::new(submitted.id.clone(), self.clock.now_ms());
        job.transition(JobStatus::Polling);

        let max_attempts = self.config.max_attempts;
        for attempt in 1..=max_attempts {
            self.clock.sleep(self.config.poll_interval).await;
            self.set_state(
                generation,
                OrchestratorState::Polling {
                    attempt,
                    max_attempts,
                },
            );

            let response = match self.service.poll(submitted).await {
                Ok(response) => response,
                Err(e) => {
                    tracing::warn!(
                        "Poll {}/{} for job {} failed: {}",
                        attempt,
                        max_attempts,
                        job.job_id,
                        e
                    );
                    continue;
                }
            };

            match PollStatus::from_response(&response) {
                PollStatus::Succeeded { image_url } => {
                    let source = ImageSource::remote(image_url);
                    job.succeed(source.clone());
                    tracing::info!(
                        "Job {} succeeded after {} ms",
                        job.job_id,
                        job.elapsed_ms(self.clock.now_ms())
                    );
                    return TransformOutcome::Succeeded {
                        source,
                        job_id: job.job_id,
                    };
                }
                PollStatus::Failed { reason } => {
                    job.transition(JobStatus::Failed);
                    tracing::error!("Job {} failed: {}", job.job_id, reason);
                    return TransformOutcome::Failed(TransformFailure::Remote {
                        job_id: job.job_id,
                        reason,
                    });
                }
                PollStatus::Pending { raw } => {
                    tracing::debug!(
                        "Job {} pending ({})",
                        job.job_id,
                        raw.as_deref().unwrap_or("no status")
                    );
                }
            }
        }

        job.transition(JobStatus::TimedOut);
        tracing::warn!(
            "Job {} timed out after {} polls",
            job.job_id,
            max_attempts
        );
        TransformOutcome::TimedOut {
            job_id: job.job_id,
            attempts: max_attempts,
        }
    }

    /// Publish `state` if `generation` still owns the orchestrator.
    fn set_state(&self, generation: u64, state: OrchestratorState) -> bool {
        let active = self.active.lock();
        if active.as_ref().map(|a| a.generation) != Some(generation) {
            return false;
        }
        self.state.send_replace(state);
        true
    }

    fn finish(&self, generation: u64, outcome: &TransformOutcome) {
        let mut active = self.active.lock();
        if active.as_ref().map(|a| a.generation) != Some(generation) {
            return;
        }
        *active = None;

        let terminal = match outcome.kind() {
            TransformOutcomeKind::Succeeded | TransformOutcomeKind::LocalFallback => {
                Some(OrchestratorState::Succeeded)
            }
            TransformOutcomeKind::Failed => Some(OrchestratorState::Failed),
            TransformOutcomeKind::TimedOut => Some(OrchestratorState::TimedOut),
            TransformOutcomeKind::Cancelled => None,
        };
        if let Some(terminal) = terminal {
            self.state.send_replace(terminal);
        }
        self.state.send_replace(OrchestratorState::Idle);
    }
}

impl fmt::Debug for TransformOrchestrator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransformOrchestrator")
            .field("config", &self.config)
            .field("generation", &self.generation.load(Ordering::SeqCst))
            .field("state", &self.state())
            .finish()
    }
}

/// Resolves once the run is cancelled.
async fn cancelled(rx: &mut watch::Receiver<bool>) {
    loop {
        if *rx.borrow_and_update() {
            return;
        }
        if rx.changed().await.is_err() {
            // Sender gone without cancelling: never resolves.
            std::future::pending::<()>().await;
        }
    }
}

/// Re-encode as PNG and base64 it.
fn encode_for_submission(bytes: &[u8]) -> Result<String, ImageError> {
    let png = encode_png(decode_rgba(bytes)?)?;
    Ok(BASE64.encode(png))
}
