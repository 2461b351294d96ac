//! # LumaCanvas Editor
//!
//! The interactive part of the canvas: everything that reacts to gestures
//! and turns editor state into something a renderer can draw.
//!
//! ## Core Components
//!
//! - **Viewport**: pan offset and zoom of the infinite canvas, wheel and drag gestures
//! - **Placement**: initial centered position and scale of a freshly loaded image
//! - **History**: debounced, bounded undo/redo over image geometry and viewport
//! - **Grading**: color parameters, filter expressions and raster replay for export
//! - **Session**: the editor state tying the above together
//! - **Renderer**: pure state → frame mapping presented to a [`RenderSink`]
//!
//! ## Architecture
//!
//! ```text
//! EditorSession
//!   ├── Viewport (zoom/pan, drag, wheel)
//!   ├── CanvasImage (at most one)
//!   ├── HistoryManager (snapshots, replay guard)
//!   └── ColorParameters ──► filter expression ──► RenderFrame ──► RenderSink
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use lumacanvas_editor::EditorSession;
//! use lumacanvas_core::{Point, SystemClock};
//! use std::sync::Arc;
//!
//! let mut session = EditorSession::with_defaults(Arc::new(SystemClock));
//! session.load_image(bytes, Some("portrait.jpg".into()));
//! session.wheel(Point::new(600.0, 400.0), -120.0);
//! let frame = session.render_frame();
//! ```

pub mod codec;
pub mod grading;
pub mod history;
pub mod placement;
pub mod renderer;
pub mod session;
pub mod viewport;

pub use grading::{
    build_filter_expression, ColorParameters, FilterClause, FilterExpression, GradedExport,
    LutPreset,
};
pub use history::{CaptureOutcome, HistoryManager, HistorySnapshot};
pub use placement::{place_centered, Placement, PlacementLimits};
pub use renderer::{FrameRecorder, RenderFrame, RenderSink, RenderedImage, TracingSink};
pub use session::{EditorSession, KeyOutcome, SessionConfig};
pub use viewport::Viewport;
