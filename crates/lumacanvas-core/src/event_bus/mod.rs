//! # Notification Bus Module
//!
//! Carries [`CanvasEvent`]s from the canvas core to the page chrome:
//! - The canvas publishes typed events without knowing who listens
//! - Subscribers filter by [`EventCategory`]
//! - Supports both synchronous handlers and async broadcast receivers
//!
//! ## Usage
//!
//! ```rust,ignore
//! use lumacanvas_core::event_bus::{CanvasEvent, EventBus, EventCategory, EventFilter};
//!
//! let bus = EventBus::new();
//! let subscription = bus.subscribe(
//!     EventFilter::Categories(vec![EventCategory::Transform]),
//!     |event| println!("{}", event.description()),
//! );
//! bus.unsubscribe(subscription);
//! ```

mod bus;
mod events;

pub use bus::*;
pub use events::*;
