//! # LumaCanvas Transform
//!
//! Orchestrates AI image transforms against a remote, job-based service:
//!
//! ```text
//! Idle ──► Submitting ──► Polling ──► Succeeded | Failed | TimedOut ──► Idle
//!              │
//!              └── submission failed ──► local fallback ──► Succeeded | Failed
//! ```
//!
//! - [`service`]: the remote service seam and its HTTP implementation
//! - [`status`]: canonical mapping of raw poll responses
//! - [`fallback`]: keyword → lighting style table used when submission fails
//! - [`job`]: the per-run job record
//! - [`orchestrator`]: the state machine, cancellation and outcome reporting
//!
//! Only one job runs at a time; starting a new one cancels the previous
//! polling loop. Time is read and awaited through an injected
//! [`lumacanvas_core::Clock`] so the 60-attempt budget can be exercised in
//! tests without real delays.

pub mod fallback;
pub mod job;
pub mod orchestrator;
pub mod service;
pub mod status;

pub use fallback::{match_style, LightingStyle, LIGHTING_STYLES};
pub use job::{JobStatus, TransformJob};
pub use orchestrator::{
    JobTicket, OrchestratorConfig, OrchestratorState, PendingTransform, TransformFailure,
    TransformOrchestrator, TransformOutcome, TransformReport, TransformRequest,
};
pub use service::{Engine, HttpTransformService, ServiceEndpoints, SubmitRequest, TransformService};
pub use status::{PollStatus, SubmittedJob};
