//! Shared constants for the canvas editor.
//!
//! Defaults used when no configuration overrides them.

/// Maximum number of history snapshots retained.
pub const HISTORY_CAPACITY: usize = 50;

/// Minimum age difference between two accepted snapshots, in milliseconds.
pub const HISTORY_DEBOUNCE_MS: u64 = 100;

/// Smallest on-canvas extent (logical units) a freshly placed image may have.
pub const MIN_VISIBLE_EXTENT: f64 = 200.0;

/// Upper bound on the scale chosen by initial placement.
pub const MAX_PLACEMENT_SCALE: f64 = 3.0;

/// Natural size assumed when an image cannot be decoded.
pub const PLACEHOLDER_WIDTH: f64 = 300.0;

/// Natural size assumed when an image cannot be decoded.
pub const PLACEHOLDER_HEIGHT: f64 = 400.0;

/// Zoom multiplier applied when the wheel scrolls up.
pub const WHEEL_ZOOM_IN: f64 = 1.1;

/// Zoom multiplier applied when the wheel scrolls down.
pub const WHEEL_ZOOM_OUT: f64 = 0.9;

/// Delay between two status polls of a remote job, in milliseconds.
pub const POLL_INTERVAL_MS: u64 = 1_000;

/// Number of polls before a remote job is declared timed out.
pub const MAX_POLL_ATTEMPTS: u32 = 60;

/// Safety tolerance sent with every remote transform request.
pub const DEFAULT_SAFETY_TOLERANCE: u8 = 2;

/// Suffix appended to the file stem of exported images.
pub const EXPORT_SUFFIX: &str = "_color_graded";

/// Default viewport size used before the host reports its real size.
pub const DEFAULT_VIEWPORT_WIDTH: f64 = 1200.0;

/// Default viewport size used before the host reports its real size.
pub const DEFAULT_VIEWPORT_HEIGHT: f64 = 800.0;
