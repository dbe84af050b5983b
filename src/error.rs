//! Error types for dispatchwire.

use thiserror::Error;

use crate::handler::{HandlerKind, MethodKey};

/// Configuration errors raised by registration and typed handler recovery.
///
/// Every variant is a startup-time bug (a duplicate or malformed
/// registration, or a call site wired to the wrong handler shape), not a
/// per-request condition. A missing handler is NOT an error: lookups signal
/// absence with `Option::None` so the transport can map it to a
/// protocol-level "unimplemented method" response.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DispatchError {
    /// Service or method name was empty at registration.
    #[error("invalid method key \"{0}\": service and method names must be non-empty")]
    EmptyMethodKey(MethodKey),

    /// A handler was already registered under this key.
    #[error("duplicate handler registration for {0}")]
    DuplicateHandler(MethodKey),

    /// The call site expected the other handler shape (unary vs streaming).
    #[error("handler for {key} is {actual}, but the call site expected {expected}")]
    ShapeMismatch {
        key: MethodKey,
        expected: HandlerKind,
        actual: HandlerKind,
    },

    /// The call site named request/response types the handler was not
    /// registered with.
    #[error("handler for {0} was registered with different request/response types")]
    TypeMismatch(MethodKey),
}

/// Result type alias using DispatchError.
pub type Result<T> = std::result::Result<T, DispatchError>;
