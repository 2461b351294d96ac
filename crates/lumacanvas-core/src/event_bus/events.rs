//! Event type definitions for the notification bus.
//!
//! Events flow outward from the canvas to whoever renders status, toasts and
//! progress indicators. They are cloneable and serializable for logging.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::geometry::Size;
use crate::model::{ImageId, ViewportTransform};

/// Root event enum for all canvas notifications
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum CanvasEvent {
    /// Image load, removal and content replacement
    Image(ImageEvent),
    /// Pan and zoom changes
    Viewport(ViewportEvent),
    /// Undo/redo bookkeeping
    History(HistoryEvent),
    /// AI transform lifecycle
    Transform(TransformEvent),
    /// Export results
    Export(ExportEvent),
    /// Errors surfaced to the user
    Error(ErrorEvent),
}

impl CanvasEvent {
    /// Get the category of this event
    pub fn category(&self) -> EventCategory {
        match self {
            CanvasEvent::Image(_) => EventCategory::Image,
            CanvasEvent::Viewport(_) => EventCategory::Viewport,
            CanvasEvent::History(_) => EventCategory::History,
            CanvasEvent::Transform(_) => EventCategory::Transform,
            CanvasEvent::Export(_) => EventCategory::Export,
            CanvasEvent::Error(_) => EventCategory::Error,
        }
    }

    /// Get a short description of this event for logging
    pub fn description(&self) -> String {
        match self {
            CanvasEvent::Image(e) => e.description(),
            CanvasEvent::Viewport(e) => e.description(),
            CanvasEvent::History(e) => e.description(),
            CanvasEvent::Transform(e) => e.description(),
            CanvasEvent::Export(e) => e.description(),
            CanvasEvent::Error(e) => e.description(),
        }
    }
}

/// Event category for filtering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventCategory {
    Image,
    Viewport,
    History,
    Transform,
    Export,
    Error,
}

impl std::fmt::Display for EventCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EventCategory::Image => write!(f, "Image"),
            EventCategory::Viewport => write!(f, "Viewport"),
            EventCategory::History => write!(f, "History"),
            EventCategory::Transform => write!(f, "Transform"),
            EventCategory::Export => write!(f, "Export"),
            EventCategory::Error => write!(f, "Error"),
        }
    }
}

/// Image lifecycle events
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ImageEvent {
    /// A new image was placed on the canvas.
    Loaded {
        id: ImageId,
        natural_size: Size,
        scale: f64,
    },
    /// The image was deleted from the canvas.
    Removed { id: ImageId },
    /// The content was replaced by a transform result.
    Replaced { previous: ImageId, current: ImageId },
}

impl ImageEvent {
    fn description(&self) -> String {
        match self {
            ImageEvent::Loaded {
                id,
                natural_size,
                scale,
            } => format!("Loaded {} ({} at {:.2}x)", id, natural_size, scale),
            ImageEvent::Removed { id } => format!("Removed {}", id),
            ImageEvent::Replaced { previous, current } => {
                format!("Replaced {} with {}", previous, current)
            }
        }
    }
}

/// Viewport events
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ViewportEvent {
    /// Pan or zoom changed.
    Changed { transform: ViewportTransform },
    /// View reset to 1:1 at the origin.
    Reset,
}

impl ViewportEvent {
    fn description(&self) -> String {
        match self {
            ViewportEvent::Changed { transform } => format!("Viewport {}", transform),
            ViewportEvent::Reset => "Viewport reset".to_string(),
        }
    }
}

/// History events
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum HistoryEvent {
    /// The snapshot list or cursor moved.
    Changed {
        can_undo: bool,
        can_redo: bool,
        len: usize,
        current_index: Option<usize>,
    },
}

impl HistoryEvent {
    fn description(&self) -> String {
        match self {
            HistoryEvent::Changed {
                can_undo,
                can_redo,
                len,
                current_index,
            } => format!(
                "History {}/{} (undo: {}, redo: {})",
                current_index.map(|i| i + 1).unwrap_or(0),
                len,
                can_undo,
                can_redo
            ),
        }
    }
}

/// Discriminant of a finished transform, mirrored from the orchestrator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransformOutcomeKind {
    Succeeded,
    LocalFallback,
    Failed,
    TimedOut,
    Cancelled,
}

/// AI transform events
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum TransformEvent {
    /// A job was started for a tool.
    Started { tool: String, prompt: String },
    /// Human-readable progress line (e.g. "Polling attempt 3/60...").
    Progress { status: String },
    /// The job reached a terminal state.
    Finished {
        tool: String,
        outcome: TransformOutcomeKind,
        message: String,
        applied: bool,
    },
}

impl TransformEvent {
    fn description(&self) -> String {
        match self {
            TransformEvent::Started { tool, prompt } => {
                format!("Transform started [{}]: {}", tool, prompt)
            }
            TransformEvent::Progress { status } => status.clone(),
            TransformEvent::Finished {
                tool,
                outcome,
                message,
                applied,
            } => format!(
                "Transform finished [{}]: {:?} - {}{}",
                tool,
                outcome,
                message,
                if *applied { "" } else { " (discarded)" }
            ),
        }
    }
}

/// Export events
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ExportEvent {
    /// The graded image was written.
    Completed { path: PathBuf, bytes: usize },
}

impl ExportEvent {
    fn description(&self) -> String {
        match self {
            ExportEvent::Completed { path, bytes } => {
                format!("Exported {} ({} bytes)", path.display(), bytes)
            }
        }
    }
}

/// Error events
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ErrorEvent {
    /// An operation failed in a way the user should see.
    Surfaced { context: String, message: String },
}

impl ErrorEvent {
    fn description(&self) -> String {
        match self {
            ErrorEvent::Surfaced { context, message } => format!("{}: {}", context, message),
        }
    }
}
