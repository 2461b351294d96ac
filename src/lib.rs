//! # LumaCanvas
//!
//! An infinite pan/zoom canvas hosting a single editable image, with:
//! - Debounced, bounded undo/redo over image geometry and the viewport
//! - Live color grading rendered as a composable filter expression
//! - AI image transforms against a remote job service, with a local fallback
//!
//! ## Architecture
//!
//! LumaCanvas is organized as a workspace with multiple crates:
//!
//! 1. **lumacanvas-core** - Data model, errors, clock, command channel, notification bus
//! 2. **lumacanvas-editor** - Viewport, placement, history, grading, session, render frames
//! 3. **lumacanvas-transform** - Remote service, status mapping, fallback, orchestrator
//! 4. **lumacanvas-settings** - Configuration files and validation
//! 5. **lumacanvas** - Logging, the canvas controller and the headless driver
//!
//! ```text
//! page chrome ──CanvasCommand──► CanvasController ──► EditorSession ──► RenderSink
//!                                      │                    ▲
//!                                      └──► TransformOrchestrator (result reconciled by id)
//!                                      └──► EventBus ──CanvasEvent──► page chrome
//! ```

pub mod controller;

pub use controller::CanvasController;

pub use lumacanvas_core::{
    command_channel, CanvasCommand, CanvasEvent, CanvasImage, Clock, CommandReceiver,
    CommandSender, Error, EventBus, EventCategory, EventFilter, ImageError, ImageId, ImageSource,
    KeyPress, ManualClock, Point, Result, Size, SystemClock, TransformError, ViewportTransform,
};

pub use lumacanvas_editor::{
    build_filter_expression, ColorParameters, EditorSession, FrameRecorder, LutPreset,
    RenderFrame, RenderSink, SessionConfig, TracingSink,
};

pub use lumacanvas_transform::{
    Engine, HttpTransformService, OrchestratorState, TransformOrchestrator, TransformOutcome,
    TransformReport, TransformService,
};

pub use lumacanvas_settings::{Config, SettingsError};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Build date (set at compile time)
pub const BUILD_DATE: &str = env!("LUMACANVAS_BUILD_DATE");

/// Initialize logging with the default configuration
///
/// Sets up structured logging with:
/// - Console output with pretty formatting
/// - RUST_LOG environment variable support, `info` by default
/// - Targets, thread ids and line numbers
pub fn init_logging() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stdout)
        .with_target(true)
        .with_level(true)
        .with_thread_ids(true)
        .with_thread_names(true)
        .with_line_number(true)
        .pretty();

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()?;

    Ok(())
}
