//! Method registry - name-keyed handler lookup.
//!
//! Registration happens once, during startup, through a [`RegistryBuilder`];
//! [`RegistryBuilder::build`] seals the set into an immutable [`Registry`]
//! that is safe for unbounded concurrent lookups (share it in an `Arc`).
//! Handing the builder off by value is the open→sealed transition: no
//! registration can race a lookup because the registry does not exist until
//! building is finished.
//!
//! Duplicate or malformed registrations are configuration bugs, caught
//! before serving traffic: the builder records them and `build` fails, so a
//! shadowed handler can never reach the serving phase.
//!
//! # Example
//!
//! ```
//! use dispatchwire::registry::RegistryBuilder;
//! use dispatchwire::{BoxFuture, HandlerResult, RequestContext};
//!
//! fn echo<'a>(
//!     _ctx: &'a RequestContext,
//!     request: &'a String,
//!     response: &'a mut String,
//! ) -> BoxFuture<'a, HandlerResult> {
//!     Box::pin(async move {
//!         response.push_str(request);
//!         Ok(())
//!     })
//! }
//!
//! let registry = RegistryBuilder::new()
//!     .unary("Echo", "Say", echo)
//!     .build()
//!     .unwrap();
//!
//! assert!(registry.lookup("Echo", "Say").is_some());
//! assert!(registry.lookup("Echo", "Missing").is_none());
//! ```

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::Arc;

use crate::context::RequestContext;
use crate::error::{DispatchError, Result};
use crate::handler::{
    BoxFuture, HandlerEnvelope, HandlerResult, MethodKey, StreamSink, StreamingHandler,
    UnaryHandler,
};
use crate::logging::{CallLogger, TracingCallLogger};
use crate::message::Message;

/// Collects handler registrations during startup.
pub struct RegistryBuilder {
    logger: Arc<dyn CallLogger>,
    handlers: HashMap<MethodKey, HandlerEnvelope>,
    errors: Vec<DispatchError>,
}

impl RegistryBuilder {
    /// Create an empty builder using the default `tracing`-backed logger.
    pub fn new() -> Self {
        Self {
            logger: Arc::new(TracingCallLogger),
            handlers: HashMap::new(),
            errors: Vec::new(),
        }
    }

    /// Use `logger` for every handler registered after this call.
    pub fn with_logger(mut self, logger: Arc<dyn CallLogger>) -> Self {
        self.logger = logger;
        self
    }

    /// Register a unary handler function under `(service, method)`.
    ///
    /// Registration failures are recorded and surface from [`build`].
    ///
    /// [`build`]: RegistryBuilder::build
    pub fn unary<Req, Resp, F>(
        mut self,
        service: impl Into<String>,
        method: impl Into<String>,
        f: F,
    ) -> Self
    where
        Req: Message,
        Resp: Message,
        F: for<'a> Fn(&'a RequestContext, &'a Req, &'a mut Resp) -> BoxFuture<'a, HandlerResult>
            + Send
            + Sync
            + 'static,
    {
        let handler = UnaryHandler::new(service, method, f).with_logger(self.logger.clone());
        let _ = self.register(HandlerEnvelope::unary(handler));
        self
    }

    /// Register a server-streaming handler function under `(service, method)`.
    ///
    /// Registration failures are recorded and surface from [`build`].
    ///
    /// [`build`]: RegistryBuilder::build
    pub fn streaming<Req, Resp, F>(
        mut self,
        service: impl Into<String>,
        method: impl Into<String>,
        f: F,
    ) -> Self
    where
        Req: Message,
        Resp: Message,
        F: for<'a> Fn(
                &'a RequestContext,
                &'a Req,
                StreamSink<'a, Resp>,
            ) -> BoxFuture<'a, HandlerResult>
            + Send
            + Sync
            + 'static,
    {
        let handler = StreamingHandler::new(service, method, f).with_logger(self.logger.clone());
        let _ = self.register(HandlerEnvelope::streaming(handler));
        self
    }

    /// Register a pre-built envelope.
    ///
    /// On failure the envelope is discarded, the first registration under
    /// the key is kept, and the error is additionally recorded so that
    /// [`build`](RegistryBuilder::build) fails: a duplicate or malformed
    /// registration must never survive into the serving phase.
    pub fn register(&mut self, envelope: HandlerEnvelope) -> Result<()> {
        if !envelope.key().is_well_formed() {
            let err = DispatchError::EmptyMethodKey(envelope.key().clone());
            self.errors.push(err.clone());
            return Err(err);
        }

        match self.handlers.entry(envelope.key().clone()) {
            Entry::Occupied(_) => {
                let err = DispatchError::DuplicateHandler(envelope.key().clone());
                self.errors.push(err.clone());
                Err(err)
            }
            Entry::Vacant(slot) => {
                slot.insert(envelope);
                Ok(())
            }
        }
    }

    /// Seal the registrations into an immutable [`Registry`].
    ///
    /// # Errors
    ///
    /// Returns the first recorded registration error, if any. A failed
    /// build yields no registry at all; startup must halt.
    pub fn build(self) -> Result<Registry> {
        if let Some(err) = self.errors.into_iter().next() {
            return Err(err);
        }
        Ok(Registry {
            handlers: self.handlers,
        })
    }
}

impl Default for RegistryBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Immutable name-keyed handler lookup, shared across the serving phase.
#[derive(Debug)]
pub struct Registry {
    handlers: HashMap<MethodKey, HandlerEnvelope>,
}

impl Registry {
    /// Create a new registry builder.
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::new()
    }

    /// Find the handler registered under `(service, method)`.
    ///
    /// Names are matched exactly (case-sensitive). Returns `None` if no
    /// handler was registered under the key; the transport maps that to a
    /// protocol-level "unimplemented method" response.
    pub fn lookup(&self, service: &str, method: &str) -> Option<&HandlerEnvelope> {
        self.handlers.get(&MethodKey::new(service, method))
    }

    /// Whether a handler is registered under `(service, method)`.
    pub fn contains(&self, service: &str, method: &str) -> bool {
        self.lookup(service, method).is_some()
    }

    /// Number of registered methods.
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Iterate over all registered method keys (unspecified order).
    pub fn keys(&self) -> impl Iterator<Item = &MethodKey> {
        self.handlers.keys()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ok_unary<'a>(
        _ctx: &'a RequestContext,
        _request: &'a String,
        response: &'a mut String,
    ) -> BoxFuture<'a, HandlerResult> {
        Box::pin(async move {
            response.push_str("first");
            Ok(())
        })
    }

    fn other_unary<'a>(
        _ctx: &'a RequestContext,
        _request: &'a String,
        response: &'a mut String,
    ) -> BoxFuture<'a, HandlerResult> {
        Box::pin(async move {
            response.push_str("second");
            Ok(())
        })
    }

    fn ok_streaming<'a>(
        _ctx: &'a RequestContext,
        _request: &'a String,
        _stream: StreamSink<'a, String>,
    ) -> BoxFuture<'a, HandlerResult> {
        Box::pin(async { Ok(()) })
    }

    #[test]
    fn test_lookup_hit_and_miss() {
        let registry = RegistryBuilder::new()
            .unary("Spanner", "GetSession", ok_unary)
            .streaming("Spanner", "ListSessions", ok_streaming)
            .build()
            .unwrap();

        assert_eq!(registry.len(), 2);
        assert!(registry.contains("Spanner", "GetSession"));
        assert!(registry.lookup("Spanner", "ListSessions").is_some());
        assert!(registry.lookup("Spanner", "Nonexistent").is_none());
        // Matching is case-sensitive and exact.
        assert!(registry.lookup("spanner", "GetSession").is_none());
    }

    #[test]
    fn test_duplicate_registration_fails_build() {
        let builder = RegistryBuilder::new()
            .unary("Spanner", "GetSession", ok_unary)
            .unary("Spanner", "GetSession", other_unary);

        let err = builder.build().unwrap_err();
        assert_eq!(
            err,
            DispatchError::DuplicateHandler(MethodKey::new("Spanner", "GetSession"))
        );
    }

    #[tokio::test]
    async fn test_duplicate_registration_keeps_first_handler() {
        let mut builder = RegistryBuilder::new().unary("Spanner", "GetSession", ok_unary);

        let duplicate =
            HandlerEnvelope::unary(UnaryHandler::new("Spanner", "GetSession", other_unary));
        let err = builder.register(duplicate).unwrap_err();
        assert_eq!(
            err,
            DispatchError::DuplicateHandler(MethodKey::new("Spanner", "GetSession"))
        );

        // The stored envelope still runs the first registration's function.
        let envelope = &builder.handlers[&MethodKey::new("Spanner", "GetSession")];
        let handler = envelope.as_unary::<String, String>().unwrap();
        let ctx = RequestContext::new();
        let mut response = String::new();
        handler
            .run(&ctx, &"req".to_string(), &mut response)
            .await
            .unwrap();
        assert_eq!(response, "first");
    }

    #[test]
    fn test_empty_names_fail_build() {
        let err = RegistryBuilder::new()
            .unary("", "GetSession", ok_unary)
            .build()
            .unwrap_err();
        assert_eq!(
            err,
            DispatchError::EmptyMethodKey(MethodKey::new("", "GetSession"))
        );

        let err = RegistryBuilder::new()
            .unary("Spanner", "", ok_unary)
            .build()
            .unwrap_err();
        assert_eq!(
            err,
            DispatchError::EmptyMethodKey(MethodKey::new("Spanner", ""))
        );
    }

    #[test]
    fn test_register_error_poisons_build() {
        let mut builder = RegistryBuilder::new();
        let first = HandlerEnvelope::unary(UnaryHandler::new("Spanner", "GetSession", ok_unary));
        let second = HandlerEnvelope::unary(UnaryHandler::new("Spanner", "GetSession", ok_unary));

        builder.register(first).unwrap();
        // Caller ignoring the per-call error must not reach serving.
        let _ = builder.register(second);

        assert!(builder.build().is_err());
    }

    #[test]
    fn test_empty_registry_builds() {
        let registry = RegistryBuilder::new().build().unwrap();
        assert!(registry.is_empty());
        assert_eq!(registry.keys().count(), 0);
    }

    #[test]
    fn test_concurrent_lookups() {
        let registry = Arc::new(
            RegistryBuilder::new()
                .unary("Spanner", "GetSession", ok_unary)
                .unary("Spanner", "CreateSession", other_unary)
                .streaming("Spanner", "ListSessions", ok_streaming)
                .build()
                .unwrap(),
        );

        let threads: Vec<_> = (0..8)
            .map(|_| {
                let registry = registry.clone();
                std::thread::spawn(move || {
                    for _ in 0..1000 {
                        assert!(registry.lookup("Spanner", "GetSession").is_some());
                        assert!(registry.lookup("Spanner", "CreateSession").is_some());
                        assert!(registry.lookup("Spanner", "ListSessions").is_some());
                        assert!(registry.lookup("Spanner", "DeleteSession").is_none());
                    }
                })
            })
            .collect();

        for thread in threads {
            thread.join().unwrap();
        }
    }
}
