//! # Signals
//!
//! Typed multi-subscriber events used for change notification across the
//! scene tree.
//!
//! A signal is split into two capabilities by [`channel`]:
//!
//! - [`SignalEmitter`] - held by the owner, the only handle that can `emit`
//!   or `destroy`
//! - [`Signal`] - cloneable subscriber view handed out to everyone else, with
//!   `connect`, `once` and `wait`
//!
//! ## Lifecycle
//!
//! A signal is active until its emitter calls `destroy`, which drops every
//! handler and is terminal. After that `connect`, `once`, `wait` and `emit`
//! return [`SignalError::Destroyed`](crate::error::SignalError::Destroyed).
//!
//! ## Fault isolation
//!
//! A handler that panics is caught and logged at `error` level; the
//! remaining handlers still receive the value.

pub mod signal;

// Re-export main types
pub use signal::{channel, Connection, ScopedConnection, Signal, SignalEmitter};
