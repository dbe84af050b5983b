//! Handler module - typed call wrappers and the registry-storable envelope.
//!
//! Provides:
//! - [`MethodKey`] - the (service, method) identity of a dispatchable unit
//! - [`UnaryHandler`] - wraps a request/response function with logging
//! - [`StreamingHandler`] / [`StreamSink`] - the server-streaming equivalents
//! - [`HandlerEnvelope`] - the type-erased unit the registry stores
//!
//! # Example
//!
//! ```ignore
//! use dispatchwire::{BoxFuture, HandlerResult, RequestContext, UnaryHandler};
//!
//! fn get_session<'a>(
//!     _ctx: &'a RequestContext,
//!     request: &'a GetSessionRequest,
//!     response: &'a mut Session,
//! ) -> BoxFuture<'a, HandlerResult> {
//!     Box::pin(async move {
//!         response.name = request.name.clone();
//!         Ok(())
//!     })
//! }
//!
//! let handler = UnaryHandler::new("Spanner", "GetSession", get_session);
//! ```

use std::future::Future;
use std::pin::Pin;

use crate::status::Status;

mod envelope;
mod streaming;
mod unary;

pub use envelope::{HandlerEnvelope, HandlerKind, MethodKey};
pub use streaming::{StreamSink, StreamWriter, StreamingFn, StreamingHandler};
pub use unary::{UnaryFn, UnaryHandler};

/// Boxed future for handler and writer results.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Outcome of a handler invocation or a streaming send: success, or a
/// [`Status`] describing the failure.
pub type HandlerResult = std::result::Result<(), Status>;
