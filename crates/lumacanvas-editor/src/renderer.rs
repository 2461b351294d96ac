//! Render frames and sinks.
//!
//! A [`RenderFrame`] is a pure function of editor state: the viewport
//! transform, the placed image, the live filter string and a few status
//! flags. A [`RenderSink`] is the only place that touches presentation.

use lumacanvas_core::{
    thread_safe, ImageId, ImageSource, Point, Size, ThreadSafe, ViewportTransform,
};

/// The image as it should appear on screen.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedImage {
    pub id: ImageId,
    pub source: ImageSource,
    /// Top-left in canvas coordinates.
    pub position: Point,
    /// Size in canvas coordinates (natural size times image scale).
    pub size: Size,
    /// Top-left in screen coordinates.
    pub screen_origin: Point,
    /// Size in screen pixels.
    pub screen_size: Size,
}

/// Everything a renderer needs to draw the canvas once.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderFrame {
    pub transform: ViewportTransform,
    pub image: Option<RenderedImage>,
    /// Live filter string, empty when no grading is active.
    pub filter: String,
    /// Whether the image carries a selection outline.
    pub selected: bool,
    /// Processing indicator text, e.g. while a transform is polling.
    pub status: Option<String>,
}

impl RenderFrame {
    pub fn is_empty(&self) -> bool {
        self.image.is_none()
    }
}

/// Side-effecting consumer of frames.
pub trait RenderSink: Send {
    fn present(&mut self, frame: &RenderFrame);
}

/// Writes a one-line summary of every frame to the log.
#[derive(Debug, Default)]
pub struct TracingSink;

impl RenderSink for TracingSink {
    fn present(&mut self, frame: &RenderFrame) {
        match &frame.image {
            Some(image) => tracing::debug!(
                "Frame: {} | {} {:?} at {} size {} | filter: '{}'{}{}",
                frame.transform,
                image.id,
                image.source,
                image.screen_origin,
                image.screen_size,
                frame.filter,
                if frame.selected { " [selected]" } else { "" },
                frame
                    .status
                    .as_deref()
                    .map(|s| format!(" | {}", s))
                    .unwrap_or_default()
            ),
            None => tracing::debug!("Frame: {} | empty canvas", frame.transform),
        }
    }
}

/// Keeps every presented frame in memory.
///
/// Clones share the same buffer, so a handle can be kept for inspection
/// while another is handed to the controller.
#[derive(Debug, Clone, Default)]
pub struct FrameRecorder {
    frames: ThreadSafe<Vec<RenderFrame>>,
}

impl FrameRecorder {
    pub fn new() -> Self {
        Self {
            frames: thread_safe(Vec::new()),
        }
    }

    pub fn frames(&self) -> Vec<RenderFrame> {
        self.frames.lock().clone()
    }

    pub fn last(&self) -> Option<RenderFrame> {
        self.frames.lock().last().cloned()
    }

    pub fn len(&self) -> usize {
        self.frames.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.lock().is_empty()
    }
}

impl RenderSink for FrameRecorder {
    fn present(&mut self, frame: &RenderFrame) {
        self.frames.lock().push(frame.clone());
    }
}
