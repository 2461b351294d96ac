//! Data model of the editable canvas.
//!
//! The canvas hosts at most one [`CanvasImage`]. Its bytes live behind an
//! [`ImageSource`] that is replaced wholesale whenever the content changes;
//! geometry (position and scale) is independent of the content.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use uuid::Uuid;

use crate::geometry::{Point, Size};

/// Opaque identity of a canvas image, minted on load and on every content replacement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ImageId(Uuid);

impl ImageId {
    /// Create a new unique image ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ImageId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ImageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Img({})", &self.0.to_string()[..8])
    }
}

/// Handle to the bytes of an image.
///
/// Blob bytes are immutable and shared by reference between the live image
/// and history snapshots.
#[derive(Clone, PartialEq, Eq)]
pub enum ImageSource {
    /// Encoded image bytes held locally.
    Blob(Arc<Vec<u8>>),
    /// An image hosted remotely, typically the result of an AI transform.
    Remote(String),
}

impl ImageSource {
    /// Wrap encoded bytes.
    pub fn blob(bytes: Vec<u8>) -> Self {
        ImageSource::Blob(Arc::new(bytes))
    }

    /// Reference a remote image by URL.
    pub fn remote(url: impl Into<String>) -> Self {
        ImageSource::Remote(url.into())
    }

    pub fn is_remote(&self) -> bool {
        matches!(self, ImageSource::Remote(_))
    }

    /// Locally held bytes, if any.
    pub fn bytes(&self) -> Option<&[u8]> {
        match self {
            ImageSource::Blob(bytes) => Some(bytes.as_slice()),
            ImageSource::Remote(_) => None,
        }
    }

    /// Short description suitable for logs and render output.
    pub fn describe(&self) -> String {
        match self {
            ImageSource::Blob(bytes) => format!("blob({} bytes)", bytes.len()),
            ImageSource::Remote(url) => format!("remote({})", url),
        }
    }
}

impl fmt::Debug for ImageSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.describe())
    }
}

/// The single editable subject of the canvas.
#[derive(Debug, Clone, PartialEq)]
pub struct CanvasImage {
    /// Identity of this content revision.
    pub id: ImageId,
    /// Where the encoded bytes come from.
    pub source: ImageSource,
    /// Top-left corner in canvas logical units (pre-zoom).
    pub position: Point,
    /// Scale applied on top of the viewport zoom.
    pub scale: f64,
    /// Size of the decoded image in source pixels.
    pub natural_size: Size,
    /// Original file name, used to name exports.
    pub file_name: Option<String>,
}

impl CanvasImage {
    /// Create an image with a fresh identity.
    pub fn new(source: ImageSource, natural_size: Size, position: Point, scale: f64) -> Self {
        Self {
            id: ImageId::new(),
            source,
            position,
            scale,
            natural_size,
            file_name: None,
        }
    }

    pub fn with_file_name(mut self, name: impl Into<String>) -> Self {
        self.file_name = Some(name.into());
        self
    }

    /// Produce the next content revision: new identity and bytes, same geometry.
    pub fn replaced_with(&self, source: ImageSource) -> Self {
        Self {
            id: ImageId::new(),
            source,
            position: self.position,
            scale: self.scale,
            natural_size: self.natural_size,
            file_name: self.file_name.clone(),
        }
    }

    /// Size the image occupies on the canvas before viewport zoom.
    pub fn displayed_size(&self) -> Size {
        self.natural_size.scaled(self.scale)
    }

    /// Identity and geometry equality, ignoring the byte source.
    pub fn same_placement(&self, other: &CanvasImage) -> bool {
        self.id == other.id && self.position == other.position && self.scale == other.scale
    }
}

/// Pan offset and zoom scale of the infinite canvas.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewportTransform {
    /// Zoom factor, 1.0 = 100%. Unbounded but always finite and positive.
    pub zoom_scale: f64,
    /// Screen-space translation of the canvas origin.
    pub offset: Point,
}

impl ViewportTransform {
    pub const IDENTITY: ViewportTransform = ViewportTransform {
        zoom_scale: 1.0,
        offset: Point::ORIGIN,
    };

    pub fn new(zoom_scale: f64, offset: Point) -> Self {
        Self { zoom_scale, offset }
    }

    /// True when the zoom is finite and positive and the offset is finite.
    pub fn is_valid(&self) -> bool {
        self.zoom_scale.is_finite() && self.zoom_scale > 0.0 && self.offset.is_finite()
    }

    /// Converts a screen point to canvas logical coordinates.
    ///
    /// ```text
    /// canvas = (screen - offset) / zoom
    /// ```
    pub fn screen_to_canvas(&self, screen: Point) -> Point {
        (screen - self.offset) * (1.0 / self.zoom_scale)
    }

    /// Converts canvas logical coordinates to a screen point.
    ///
    /// ```text
    /// screen = canvas * zoom + offset
    /// ```
    pub fn canvas_to_screen(&self, canvas: Point) -> Point {
        canvas * self.zoom_scale + self.offset
    }
}

impl Default for ViewportTransform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl fmt::Display for ViewportTransform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Zoom: {:.2}x | Pan: ({:.1}, {:.1})",
            self.zoom_scale, self.offset.x, self.offset.y
        )
    }
}
