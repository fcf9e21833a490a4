//! Writer error handling
//!
//! Error taxonomy for the payload writer: a single domain error type, a
//! central message table, and constructor helpers. Nothing in the engine
//! catches errors internally; the driver's interceptor moves the writer to
//! the error state and re-raises.

pub mod constructors;
mod messages;
mod types;

pub use types::{WriteError, WriteErrorKind, WriteResult};
