//! Editor session state.
//!
//! One [`EditorSession`] owns everything mutable about the canvas: the
//! single image, the viewport, the selection, the grading parameters and the
//! undo history. Every geometric edit goes through [`EditorSession::commit`],
//! which offers the new state to the history manager.

use std::sync::Arc;

use lumacanvas_core::constants::{
    DEFAULT_VIEWPORT_HEIGHT, DEFAULT_VIEWPORT_WIDTH, EXPORT_SUFFIX, HISTORY_CAPACITY,
    HISTORY_DEBOUNCE_MS, PLACEHOLDER_HEIGHT, PLACEHOLDER_WIDTH, WHEEL_ZOOM_IN, WHEEL_ZOOM_OUT,
};
use lumacanvas_core::{
    CanvasImage, Clock, ImageError, ImageId, ImageSource, KeyPress, Point, Size,
    ViewportTransform,
};

use crate::codec;
use crate::grading::{
    build_filter_expression, export_graded_with_suffix, ColorParameters, GradedExport,
};
use crate::history::{CaptureOutcome, HistoryManager, HistorySnapshot};
use crate::placement::{place_centered_with, PlacementLimits};
use crate::renderer::{RenderFrame, RenderedImage};
use crate::viewport::Viewport;

/// Tunables of a session.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionConfig {
    pub viewport_size: Size,
    pub history_capacity: usize,
    pub history_debounce_ms: u64,
    pub wheel_zoom_in: f64,
    pub wheel_zoom_out: f64,
    pub placement: PlacementLimits,
    pub export_suffix: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            viewport_size: Size::new(DEFAULT_VIEWPORT_WIDTH, DEFAULT_VIEWPORT_HEIGHT),
            history_capacity: HISTORY_CAPACITY,
            history_debounce_ms: HISTORY_DEBOUNCE_MS,
            wheel_zoom_in: WHEEL_ZOOM_IN,
            wheel_zoom_out: WHEEL_ZOOM_OUT,
            placement: PlacementLimits::default(),
            export_suffix: EXPORT_SUFFIX.to_string(),
        }
    }
}

/// What a key press did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyOutcome {
    /// The selected image was deleted.
    Removed(ImageId),
    /// The viewport went back to 1:1 at the origin.
    ViewReset,
    /// Nothing to do for this key in the current state.
    Ignored,
}

/// The editable state of one canvas.
#[derive(Debug)]
pub struct EditorSession {
    image: Option<CanvasImage>,
    viewport: Viewport,
    history: HistoryManager,
    selection: Option<ImageId>,
    grading: ColorParameters,
    placement: PlacementLimits,
    export_suffix: String,
    status: Option<String>,
    pending_capture: bool,
    clock: Arc<dyn Clock>,
}

impl EditorSession {
    /// Create a session and record the empty canvas as the first snapshot.
    pub fn new(config: SessionConfig, clock: Arc<dyn Clock>) -> Self {
        let viewport = Viewport::new(config.viewport_size.width, config.viewport_size.height)
            .with_wheel_factors(config.wheel_zoom_in, config.wheel_zoom_out);

        let mut session = Self {
            image: None,
            viewport,
            history: HistoryManager::with_limits(
                config.history_capacity,
                config.history_debounce_ms,
            ),
            selection: None,
            grading: ColorParameters::default(),
            placement: config.placement,
            export_suffix: config.export_suffix,
            status: None,
            pending_capture: false,
            clock,
        };
        session.commit();
        session
    }

    pub fn with_defaults(clock: Arc<dyn Clock>) -> Self {
        Self::new(SessionConfig::default(), clock)
    }

    // ---------------------------------------------------------------------
    // Accessors
    // ---------------------------------------------------------------------

    pub fn image(&self) -> Option<&CanvasImage> {
        self.image.as_ref()
    }

    pub fn image_id(&self) -> Option<ImageId> {
        self.image.as_ref().map(|image| image.id)
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn transform(&self) -> ViewportTransform {
        self.viewport.transform()
    }

    pub fn history(&self) -> &HistoryManager {
        &self.history
    }

    pub fn selection(&self) -> Option<ImageId> {
        self.selection
    }

    pub fn is_selected(&self) -> bool {
        self.selection.is_some()
    }

    pub fn color_parameters(&self) -> &ColorParameters {
        &self.grading
    }

    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    /// True when the last edit is waiting for the debounce window to pass.
    pub fn has_pending_capture(&self) -> bool {
        self.pending_capture
    }

    // ---------------------------------------------------------------------
    // Image
    // ---------------------------------------------------------------------

    /// Put a new image on the canvas, replacing any existing one.
    ///
    /// Undecodable bytes are still loaded, with a placeholder natural size.
    pub fn load_image(&mut self, bytes: Vec<u8>, file_name: Option<String>) -> ImageId {
        let natural = match codec::decode_dimensions(&bytes) {
            Ok(size) if size.is_valid() => size,
            Ok(size) => {
                tracing::warn!("Image reports unusable size {}, using placeholder", size);
                Size::new(PLACEHOLDER_WIDTH, PLACEHOLDER_HEIGHT)
            }
            Err(e) => {
                tracing::warn!("{}; using placeholder size", e);
                Size::new(PLACEHOLDER_WIDTH, PLACEHOLDER_HEIGHT)
            }
        };

        let placement = place_centered_with(natural, self.viewport.size(), &self.placement);
        let mut image = CanvasImage::new(
            ImageSource::blob(bytes),
            natural,
            placement.position,
            placement.scale,
        );
        if let Some(name) = file_name {
            image = image.with_file_name(name);
        }

        let id = image.id;
        tracing::info!(
            "Loaded {} ({}) at {} scale {:.3}",
            id,
            natural,
            placement.position,
            placement.scale
        );

        self.image = Some(image);
        self.selection = None;
        self.commit_now();
        id
    }

    /// Remove the image and clear the selection.
    pub fn remove_image(&mut self) -> Option<ImageId> {
        let removed = self.image.take().map(|image| image.id);
        if let Some(id) = removed {
            tracing::info!("Removed {}", id);
            self.selection = None;
            self.commit_now();
        }
        removed
    }

    /// Swap in the result of a transform that targeted `target`.
    ///
    /// Position and scale are kept; the content gets a new identity. Returns
    /// `None` and changes nothing when `target` is no longer the current
    /// image (it was replaced, removed or undone away).
    pub fn apply_transform_result(
        &mut self,
        target: ImageId,
        source: ImageSource,
    ) -> Option<ImageId> {
        let next = match &self.image {
            Some(current) if current.id == target => current.replaced_with(source),
            _ => {
                tracing::info!("Discarding transform result for {}: no longer current", target);
                return None;
            }
        };

        let id = next.id;
        tracing::info!("Replaced {} with {} ({:?})", target, id, next.source);
        if self.selection == Some(target) {
            self.selection = Some(id);
        }
        self.image = Some(next);
        self.commit_now();
        Some(id)
    }

    // ---------------------------------------------------------------------
    // Viewport
    // ---------------------------------------------------------------------

    pub fn zoom_at(&mut self, point: Point, factor: f64) -> bool {
        let changed = self.viewport.zoom_at(point, factor);
        if changed {
            self.commit();
        }
        changed
    }

    pub fn wheel(&mut self, point: Point, delta_y: f64) -> bool {
        let changed = self.viewport.wheel(point, delta_y);
        if changed {
            self.commit();
        }
        changed
    }

    pub fn pan_by(&mut self, delta: Point) -> bool {
        let changed = self.viewport.pan_by(delta);
        if changed {
            self.commit();
        }
        changed
    }

    pub fn begin_drag(&mut self, screen: Point) {
        self.viewport.begin_drag(screen);
    }

    pub fn drag_to(&mut self, screen: Point) -> bool {
        let changed = self.viewport.drag_to(screen);
        if changed {
            self.commit();
        }
        changed
    }

    pub fn end_drag(&mut self) -> bool {
        let ended = self.viewport.end_drag();
        if ended {
            self.commit();
        }
        ended
    }

    pub fn reset_view(&mut self) {
        self.viewport.reset();
        self.commit();
    }

    /// Record the host's visible area for subsequent placements.
    pub fn set_viewport_size(&mut self, size: Size) {
        self.viewport.set_size(size);
    }

    // ---------------------------------------------------------------------
    // Selection and keys
    // ---------------------------------------------------------------------

    /// Select the image. Returns false when the canvas is empty.
    pub fn select_image(&mut self) -> bool {
        self.selection = self.image_id();
        self.selection.is_some()
    }

    pub fn clear_selection(&mut self) {
        self.selection = None;
    }

    pub fn handle_key(&mut self, key: KeyPress) -> KeyOutcome {
        match key {
            KeyPress::Delete | KeyPress::Backspace => {
                if self.selection.is_some() && self.selection == self.image_id() {
                    match self.remove_image() {
                        Some(id) => KeyOutcome::Removed(id),
                        None => KeyOutcome::Ignored,
                    }
                } else {
                    KeyOutcome::Ignored
                }
            }
            KeyPress::Char('0') => {
                self.reset_view();
                KeyOutcome::ViewReset
            }
            KeyPress::Char(_) => KeyOutcome::Ignored,
        }
    }

    // ---------------------------------------------------------------------
    // History
    // ---------------------------------------------------------------------

    /// Restore the previous snapshot. No-op at the start of history.
    ///
    /// A debounced edit is recorded first so redo can bring it back.
    pub fn undo(&mut self) -> bool {
        self.flush_pending();
        match self.history.undo() {
            Some(snapshot) => {
                self.restore(snapshot);
                true
            }
            None => false,
        }
    }

    /// Restore the next snapshot. No-op at the end of history.
    pub fn redo(&mut self) -> bool {
        self.flush_pending();
        match self.history.redo() {
            Some(snapshot) => {
                self.restore(snapshot);
                true
            }
            None => false,
        }
    }

    /// Retry a capture that was debounced, once the window has passed.
    ///
    /// Returns true if a snapshot was recorded.
    pub fn settle(&mut self) -> bool {
        if !self.pending_capture {
            return false;
        }
        self.commit().is_accepted()
    }

    fn restore(&mut self, snapshot: HistorySnapshot) {
        self.history.enter_replay();
        self.pending_capture = false;

        self.viewport.set_transform(snapshot.transform);
        self.image = snapshot.image;
        if self.selection.is_some() && self.selection != self.image_id() {
            self.selection = None;
        }

        // Rejected by the replay guard
        self.commit();
        self.history.exit_replay();

        tracing::debug!(
            "Restored snapshot {}/{}",
            self.history.current_index().map(|i| i + 1).unwrap_or(0),
            self.history.len()
        );
    }

    fn flush_pending(&mut self) {
        if self.pending_capture {
            tracing::debug!("Recording debounced edit before leaving it");
            self.commit_now();
        }
    }

    fn commit(&mut self) -> CaptureOutcome {
        let outcome = self.history.capture(
            self.image.as_ref(),
            self.viewport.transform(),
            self.clock.now_ms(),
        );
        self.track(outcome)
    }

    fn commit_now(&mut self) -> CaptureOutcome {
        let outcome = self.history.capture_now(
            self.image.as_ref(),
            self.viewport.transform(),
            self.clock.now_ms(),
        );
        self.track(outcome)
    }

    fn track(&mut self, outcome: CaptureOutcome) -> CaptureOutcome {
        match outcome {
            CaptureOutcome::Accepted | CaptureOutcome::Duplicate => self.pending_capture = false,
            CaptureOutcome::Debounced => self.pending_capture = true,
            CaptureOutcome::Replaying => {}
        }
        outcome
    }

    // ---------------------------------------------------------------------
    // Grading, rendering and export
    // ---------------------------------------------------------------------

    pub fn set_color_parameters(&mut self, params: ColorParameters) {
        self.grading = params;
    }

    /// The live filter string for the current parameters.
    pub fn filter_expression(&self) -> String {
        build_filter_expression(&self.grading)
    }

    /// Processing indicator shown over the canvas.
    pub fn set_status(&mut self, status: Option<String>) {
        self.status = status;
    }

    /// Map the current state to a frame.
    pub fn render_frame(&self) -> RenderFrame {
        let transform = self.viewport.transform();
        let image = self.image.as_ref().map(|image| {
            let size = image.displayed_size();
            RenderedImage {
                id: image.id,
                source: image.source.clone(),
                position: image.position,
                size,
                screen_origin: transform.canvas_to_screen(image.position),
                screen_size: size.scaled(transform.zoom_scale),
            }
        });

        RenderFrame {
            transform,
            image,
            filter: self.filter_expression(),
            selected: self.selection.is_some(),
            status: self.status.clone(),
        }
    }

    /// Grade `bytes` (the current image's content) for export.
    pub fn export(&self, bytes: &[u8]) -> Result<GradedExport, ImageError> {
        let image = self.image.as_ref().ok_or(ImageError::NoImage)?;
        export_graded_with_suffix(
            bytes,
            &self.grading,
            image.file_name.as_deref(),
            &self.export_suffix,
        )
    }
}
