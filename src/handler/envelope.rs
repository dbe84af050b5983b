//! Method identity and the registry-storable handler envelope.
//!
//! [`HandlerEnvelope`] erases the request/response types of a
//! [`UnaryHandler`] or [`StreamingHandler`] so handlers for heterogeneous
//! message types can live in one registry. Call sites know which shape and
//! which message types they expect (the transport generated them from the
//! same service definition), so they recover the concrete wrapper with
//! [`HandlerEnvelope::as_unary`] / [`HandlerEnvelope::as_streaming`]; a
//! mismatch there is a wiring bug, reported as a [`DispatchError`], never a
//! panic.

use std::any::Any;
use std::fmt;

use crate::error::DispatchError;
use crate::message::Message;

use super::streaming::StreamingHandler;
use super::unary::UnaryHandler;

/// The (service name, method name) identity of a dispatchable method.
///
/// Displays as `"<service>.<method>"`, which is also the tag used on every
/// log record the interception pipeline emits for the method.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MethodKey {
    service: String,
    method: String,
}

impl MethodKey {
    /// Create a key. Names are validated at registration time.
    pub fn new(service: impl Into<String>, method: impl Into<String>) -> Self {
        Self {
            service: service.into(),
            method: method.into(),
        }
    }

    /// The service name.
    pub fn service(&self) -> &str {
        &self.service
    }

    /// The method name.
    pub fn method(&self) -> &str {
        &self.method
    }

    pub(crate) fn is_well_formed(&self) -> bool {
        !self.service.is_empty() && !self.method.is_empty()
    }
}

impl fmt::Display for MethodKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.service, self.method)
    }
}

/// The two call shapes a handler can have.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandlerKind {
    /// One request, one response.
    Unary,
    /// One request, an ordered stream of responses.
    Streaming,
}

impl fmt::Display for HandlerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HandlerKind::Unary => f.write_str("unary"),
            HandlerKind::Streaming => f.write_str("streaming"),
        }
    }
}

/// A registered handler with its message types erased.
///
/// Created once at startup, stored in the registry for the life of the
/// process, and shared read-only across all concurrent calls.
pub struct HandlerEnvelope {
    key: MethodKey,
    kind: HandlerKind,
    handler: Box<dyn Any + Send + Sync>,
}

impl HandlerEnvelope {
    /// Wrap a unary handler for registration.
    pub fn unary<Req, Resp>(handler: UnaryHandler<Req, Resp>) -> Self
    where
        Req: Message,
        Resp: Message,
    {
        Self {
            key: handler.key().clone(),
            kind: HandlerKind::Unary,
            handler: Box::new(handler),
        }
    }

    /// Wrap a streaming handler for registration.
    pub fn streaming<Req, Resp>(handler: StreamingHandler<Req, Resp>) -> Self
    where
        Req: Message,
        Resp: Message,
    {
        Self {
            key: handler.key().clone(),
            kind: HandlerKind::Streaming,
            handler: Box::new(handler),
        }
    }

    /// The method key this envelope is registered under.
    pub fn key(&self) -> &MethodKey {
        &self.key
    }

    /// The service name.
    pub fn service_name(&self) -> &str {
        self.key.service()
    }

    /// The method name.
    pub fn method_name(&self) -> &str {
        self.key.method()
    }

    /// Which call shape the wrapped handler has.
    pub fn kind(&self) -> HandlerKind {
        self.kind
    }

    /// Recover the concrete unary handler.
    ///
    /// # Errors
    ///
    /// [`DispatchError::ShapeMismatch`] if the handler is streaming,
    /// [`DispatchError::TypeMismatch`] if it was registered with different
    /// request/response types.
    pub fn as_unary<Req, Resp>(&self) -> Result<&UnaryHandler<Req, Resp>, DispatchError>
    where
        Req: Message,
        Resp: Message,
    {
        match self.kind {
            HandlerKind::Unary => self
                .handler
                .downcast_ref::<UnaryHandler<Req, Resp>>()
                .ok_or_else(|| DispatchError::TypeMismatch(self.key.clone())),
            HandlerKind::Streaming => Err(DispatchError::ShapeMismatch {
                key: self.key.clone(),
                expected: HandlerKind::Unary,
                actual: HandlerKind::Streaming,
            }),
        }
    }

    /// Recover the concrete streaming handler.
    ///
    /// # Errors
    ///
    /// Same contract as [`HandlerEnvelope::as_unary`], with the shapes
    /// swapped.
    pub fn as_streaming<Req, Resp>(&self) -> Result<&StreamingHandler<Req, Resp>, DispatchError>
    where
        Req: Message,
        Resp: Message,
    {
        match self.kind {
            HandlerKind::Streaming => self
                .handler
                .downcast_ref::<StreamingHandler<Req, Resp>>()
                .ok_or_else(|| DispatchError::TypeMismatch(self.key.clone())),
            HandlerKind::Unary => Err(DispatchError::ShapeMismatch {
                key: self.key.clone(),
                expected: HandlerKind::Streaming,
                actual: HandlerKind::Unary,
            }),
        }
    }
}

impl fmt::Debug for HandlerEnvelope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerEnvelope")
            .field("key", &self.key)
            .field("kind", &self.kind)
            .finish_non_exhaustive()
    }
}
