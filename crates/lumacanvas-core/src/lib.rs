//! # LumaCanvas Core
//!
//! Core types, traits, and utilities for LumaCanvas.
//! Provides the shared data model of the editable canvas, the error
//! taxonomy, the injectable clock used by every time-dependent component,
//! and the typed channels connecting the page chrome to the canvas.

pub mod clock;
pub mod command;
pub mod constants;
pub mod error;
pub mod event_bus;
pub mod geometry;
pub mod model;
pub mod types;

pub use clock::{Clock, ManualClock, SystemClock};

pub use command::{command_channel, CanvasCommand, CommandReceiver, CommandSender, KeyPress};

pub use error::{CommandError, Error, ImageError, Result, TransformError};

pub use event_bus::{
    CanvasEvent, EventBus, EventBusError, EventCategory, EventFilter, SubscriptionId,
};

pub use geometry::{Point, Size};

pub use model::{CanvasImage, ImageId, ImageSource, ViewportTransform};

pub use types::{thread_safe, thread_safe_rw, ThreadSafe, ThreadSafeRw};
