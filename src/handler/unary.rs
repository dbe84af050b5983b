//! Unary handler wrapper.
//!
//! [`UnaryHandler`] adapts a typed `(context, request, response) -> outcome`
//! function into a dispatchable unit and intercepts every invocation for
//! logging. The wrapped function is unaware of the interception: it sees the
//! same arguments the transport supplied, and its outcome crosses the
//! wrapper unchanged.

use std::sync::Arc;

use tracing::Level;

use crate::context::RequestContext;
use crate::logging::{CallLogger, TracingCallLogger};
use crate::message::Message;

use super::envelope::MethodKey;
use super::{BoxFuture, HandlerResult};

/// Signature of the user-defined unary handler function.
///
/// The function reads the request, populates the response in place, and
/// reports the outcome.
pub type UnaryFn<Req, Resp> = Box<
    dyn for<'a> Fn(&'a RequestContext, &'a Req, &'a mut Resp) -> BoxFuture<'a, HandlerResult>
        + Send
        + Sync,
>;

/// Wrapper around a user-defined unary handler function.
pub struct UnaryHandler<Req, Resp> {
    key: MethodKey,
    logger: Arc<dyn CallLogger>,
    f: UnaryFn<Req, Resp>,
}

impl<Req, Resp> std::fmt::Debug for UnaryHandler<Req, Resp> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UnaryHandler")
            .field("key", &self.key)
            .finish_non_exhaustive()
    }
}

impl<Req, Resp> UnaryHandler<Req, Resp>
where
    Req: Message,
    Resp: Message,
{
    /// Wrap `f` as the handler for `<service>.<method>`.
    pub fn new<F>(service: impl Into<String>, method: impl Into<String>, f: F) -> Self
    where
        F: for<'a> Fn(&'a RequestContext, &'a Req, &'a mut Resp) -> BoxFuture<'a, HandlerResult>
            + Send
            + Sync
            + 'static,
    {
        Self {
            key: MethodKey::new(service, method),
            logger: Arc::new(TracingCallLogger),
            f: Box::new(f),
        }
    }

    /// Replace the logging collaborator (default: [`TracingCallLogger`]).
    pub fn with_logger(mut self, logger: Arc<dyn CallLogger>) -> Self {
        self.logger = logger;
        self
    }

    /// The method key this handler serves.
    pub fn key(&self) -> &MethodKey {
        &self.key
    }

    /// Invoke the wrapped handler function.
    ///
    /// When verbose logging is enabled this records the request before the
    /// call and the populated response plus the outcome after it: exactly
    /// one record per phase, whether the function succeeds or fails. The
    /// function's outcome is returned unchanged.
    pub async fn run(
        &self,
        ctx: &RequestContext,
        request: &Req,
        response: &mut Resp,
    ) -> HandlerResult {
        if self.logger.verbose() {
            self.logger.record(
                Level::INFO,
                &format!("Request[{}] {}", self.key, request.debug_string()),
            );
        }

        let result = (self.f)(ctx, request, &mut *response).await;

        if self.logger.verbose() {
            let outcome = match &result {
                Ok(()) => "OK".to_owned(),
                Err(status) => format!("Error: {status}"),
            };
            self.logger.record(
                Level::INFO,
                &format!(
                    "Response[{}] {} {}",
                    self.key,
                    response.debug_string(),
                    outcome
                ),
            );
        }

        result
    }
}
