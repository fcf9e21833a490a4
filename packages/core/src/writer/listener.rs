//! Writer observer
//!
//! An optional observer notified when the payload completes or when the
//! writer first enters the error state. Callbacks run synchronously on the
//! driving thread; implementations must tolerate that.

use crate::error::WriteError;

/// Completion and error notifications from one writer
pub trait WriterObserver: Send {
    /// Called exactly once when the payload reaches the completed state.
    fn on_completed(&mut self) {}

    /// Called exactly once, on the first transition into the error state.
    fn on_exception(&mut self, _error: &WriteError) {}
}
