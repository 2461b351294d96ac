//! Type aliases for shared state.
//!
//! The editor session is shared between the command loop and the tasks that
//! finish AI transforms, so it lives behind `Arc<RwLock<_>>`. These aliases
//! keep that spelled the same way in every crate.
//!
//! ```rust,ignore
//! use lumacanvas_core::types::*;
//!
//! let session: ThreadSafeRw<EditorSession> = thread_safe_rw(EditorSession::default());
//! ```

use parking_lot::{Mutex, RwLock};
use std::sync::Arc;

/// A thread-safe, mutex-protected value.
pub type ThreadSafe<T> = Arc<Mutex<T>>;

/// A thread-safe value with reader/writer locking, for read-mostly state.
pub type ThreadSafeRw<T> = Arc<RwLock<T>>;

/// Wrap a value in [`ThreadSafe`].
pub fn thread_safe<T>(value: T) -> ThreadSafe<T> {
    Arc::new(Mutex::new(value))
}

/// Wrap a value in [`ThreadSafeRw`].
pub fn thread_safe_rw<T>(value: T) -> ThreadSafeRw<T> {
    Arc::new(RwLock::new(value))
}
