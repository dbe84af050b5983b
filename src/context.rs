//! Per-call request context.
//!
//! A [`RequestContext`] carries the ambient state of one call: an optional
//! deadline, the peer identity, and a cancellation flag. The transport
//! constructs it and keeps a clone; handlers receive it by reference. The
//! dispatch layer itself never inspects any of these fields; it only passes
//! the context through to the handler, which is responsible for observing
//! cancellation and deadlines.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

/// Ambient state for a single in-flight call.
///
/// Clones share the cancellation flag, so the transport can cancel a call it
/// handed off to a handler task.
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    deadline: Option<Instant>,
    peer: Option<String>,
    cancelled: Arc<AtomicBool>,
}

impl RequestContext {
    /// Create an empty context: no deadline, no peer, not cancelled.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the call deadline.
    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Set the peer identity (e.g. remote address or authenticated user).
    pub fn with_peer(mut self, peer: impl Into<String>) -> Self {
        self.peer = Some(peer.into());
        self
    }

    /// The call deadline, if one was set.
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// The peer identity, if known.
    pub fn peer(&self) -> Option<&str> {
        self.peer.as_deref()
    }

    /// Mark the call as cancelled. Called by the transport.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    /// Whether the call has been cancelled. Polled by handlers.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }
}
