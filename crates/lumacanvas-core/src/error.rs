//! Error handling for LumaCanvas
//!
//! Provides error types for all layers of the canvas subsystem:
//! - Image errors (decoding, encoding, unavailable sources)
//! - Transform errors (remote service communication)
//! - Command errors (inbound command channel)
//!
//! All error types use `thiserror` for ergonomic error handling.

use thiserror::Error;

/// Image error type
///
/// Represents failures while turning an image source into pixels or back.
#[derive(Error, Debug, Clone)]
pub enum ImageError {
    /// The bytes could not be decoded as an image
    #[error("Failed to decode image: {reason}")]
    Decode {
        /// The reason decoding failed.
        reason: String,
    },

    /// The pixels could not be encoded
    #[error("Failed to encode image as {format}: {reason}")]
    Encode {
        /// The target format.
        format: String,
        /// The reason encoding failed.
        reason: String,
    },

    /// The bytes behind a source could not be obtained
    #[error("Image source unavailable: {reason}")]
    Unavailable {
        /// The reason the source is unavailable.
        reason: String,
    },

    /// There is no image on the canvas
    #[error("No image on the canvas")]
    NoImage,
}

/// Transform error type
///
/// Represents errors talking to the remote image-transformation service.
#[derive(Error, Debug, Clone)]
pub enum TransformError {
    /// Transport-level failure (DNS, TLS, connection reset, timeout)
    #[error("Network error: {reason}")]
    Network {
        /// The reason for the network error.
        reason: String,
    },

    /// The service answered with a non-success HTTP status
    #[error("Service returned HTTP {status}")]
    HttpStatus {
        /// The HTTP status code.
        status: u16,
    },

    /// No credentials are configured
    #[error("Missing API key (expected in environment variable {variable})")]
    MissingApiKey {
        /// The environment variable that was consulted.
        variable: String,
    },

    /// The service rejected the request inline
    #[error("Service rejected request: {message}")]
    Rejected {
        /// The message returned by the service.
        message: String,
    },

    /// The response body did not have a usable shape
    #[error("Malformed service response: {reason}")]
    MalformedResponse {
        /// What was wrong with the response.
        reason: String,
    },
}

impl TransformError {
    /// Check if this error originates from authentication
    pub fn is_auth_error(&self) -> bool {
        matches!(
            self,
            TransformError::MissingApiKey { .. }
                | TransformError::HttpStatus {
                    status: 401 | 403
                }
        )
    }
}

/// Command error type
///
/// Raised when an inbound command cannot be delivered to the canvas.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    /// The canvas side of the channel has shut down
    #[error("Command channel is closed")]
    Closed,

    /// The bounded queue is full
    #[error("Command queue is full")]
    Full,
}

/// Main error type for LumaCanvas
///
/// A unified error type that can represent any error from all layers.
#[derive(Error, Debug)]
pub enum Error {
    /// Image error
    #[error(transparent)]
    Image(#[from] ImageError),

    /// Transform error
    #[error(transparent)]
    Transform(#[from] TransformError),

    /// Command error
    #[error(transparent)]
    Command(#[from] CommandError),

    /// Standard I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create an error from a string message
    pub fn other(msg: impl Into<String>) -> Self {
        Error::Other(msg.into())
    }

    /// Check if this is an image error
    pub fn is_image_error(&self) -> bool {
        matches!(self, Error::Image(_))
    }

    /// Check if this is a transform error
    pub fn is_transform_error(&self) -> bool {
        matches!(self, Error::Transform(_))
    }
}

/// Result type using Error
pub type Result<T> = std::result::Result<T, Error>;
