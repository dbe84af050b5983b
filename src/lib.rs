//! # dispatchwire
//!
//! Typed method dispatch and logging interception for RPC servers.
//!
//! This crate decouples a transport (which only knows a service name, a
//! method name, and message values) from business-logic handlers (which are
//! ordinary typed async functions), while guaranteeing every call is
//! observable and every method is registered exactly once:
//!
//! - **Registration**: handler functions are wrapped in [`UnaryHandler`] or
//!   [`StreamingHandler`] and collected by a [`RegistryBuilder`] during
//!   startup. Duplicate or malformed registrations fail the build.
//! - **Dispatch**: the sealed [`Registry`] resolves `(service, method)` to a
//!   [`HandlerEnvelope`]; the call site recovers the typed wrapper and runs
//!   it. Lookups are lock-free and safe for any number of concurrent
//!   callers.
//! - **Interception**: the wrappers log the request, the response (or each
//!   streamed message, via [`StreamSink`]), and the outcome - without the
//!   handler's knowledge, and only when verbose logging is enabled.
//!
//! Serialization, network I/O, and authentication stay with the transport;
//! this crate never touches payload bytes.
//!
//! ## Example
//!
//! ```ignore
//! use dispatchwire::{
//!     config, BoxFuture, HandlerResult, RegistryBuilder, RequestContext, Status,
//! };
//!
//! fn get_session<'a>(
//!     _ctx: &'a RequestContext,
//!     request: &'a GetSessionRequest,
//!     response: &'a mut Session,
//! ) -> BoxFuture<'a, HandlerResult> {
//!     Box::pin(async move {
//!         if request.name.is_empty() {
//!             return Err(Status::invalid_argument("missing session name"));
//!         }
//!         response.name = request.name.clone();
//!         Ok(())
//!     })
//! }
//!
//! config::set_log_requests(true);
//!
//! let registry = RegistryBuilder::new()
//!     .unary("Spanner", "GetSession", get_session)
//!     .build()?;
//!
//! // Transport side, per incoming call:
//! let envelope = registry.lookup("Spanner", "GetSession").expect("unimplemented");
//! let handler = envelope.as_unary::<GetSessionRequest, Session>()?;
//! let mut response = Session::default();
//! let outcome = handler.run(&ctx, &request, &mut response).await;
//! ```

pub mod config;
pub mod context;
pub mod error;
pub mod handler;
pub mod logging;
pub mod message;
pub mod registry;
pub mod status;

pub use context::RequestContext;
pub use error::DispatchError;
pub use handler::{
    BoxFuture, HandlerEnvelope, HandlerKind, HandlerResult, MethodKey, StreamSink, StreamWriter,
    StreamingHandler, UnaryHandler,
};
pub use logging::{CallLogger, RecordingLogger, TracingCallLogger};
pub use message::Message;
pub use registry::{Registry, RegistryBuilder};
pub use status::{Status, StatusCode};
