//! Server-streaming handler wrapper and the per-call emission sink.
//!
//! Streaming handlers do not receive the transport's writer directly.
//! Instead, [`StreamingHandler::run`] wraps the writer in a [`StreamSink`]
//! scoped to that one invocation, so every emitted message passes through
//! the interception pipeline (per-message logging) before reaching the
//! transport. The sink is passed to the handler by value; its borrow of the
//! writer ends when the invocation returns, so it cannot be retained or
//! reused across calls.

use std::sync::Arc;

use tracing::Level;

use crate::context::RequestContext;
use crate::logging::{CallLogger, TracingCallLogger};
use crate::message::Message;

use super::envelope::MethodKey;
use super::{BoxFuture, HandlerResult};

/// The transport-owned destination for streaming responses.
///
/// `write` may block (transport backpressure) or fail (the downstream
/// consumer is gone); both are opaque to the dispatch layer and surface to
/// the handler through [`StreamSink::send`] unchanged.
pub trait StreamWriter<T>: Send {
    /// Write one message to the underlying transport.
    fn write<'a>(&'a mut self, message: &'a T) -> BoxFuture<'a, HandlerResult>;
}

/// One-directional emission channel handed to a streaming handler.
///
/// Messages are forwarded to the writer in the exact order `send` is
/// called; nothing is buffered, reordered, or dropped.
pub struct StreamSink<'a, T> {
    key: MethodKey,
    logger: Arc<dyn CallLogger>,
    writer: &'a mut (dyn StreamWriter<T> + 'a),
}

impl<'a, T: Message> StreamSink<'a, T> {
    /// Wrap `writer` for one call under `key`.
    pub fn new(
        key: MethodKey,
        logger: Arc<dyn CallLogger>,
        writer: &'a mut (dyn StreamWriter<T> + 'a),
    ) -> Self {
        Self { key, logger, writer }
    }

    /// Emit one response message.
    ///
    /// Records the message first (verbose logging permitting), then forwards
    /// it to the writer. A transport failure is returned to the handler,
    /// which decides whether to abort the stream.
    pub async fn send(&mut self, message: &T) -> HandlerResult {
        if self.logger.verbose() {
            self.logger.record(
                Level::INFO,
                &format!("Send[{}] {}", self.key, message.debug_string()),
            );
        }
        self.writer.write(message).await
    }
}

/// Signature of the user-defined streaming handler function.
///
/// The function reads the request and emits zero or more responses through
/// the sink before reporting the overall outcome.
pub type StreamingFn<Req, Resp> = Box<
    dyn for<'a> Fn(&'a RequestContext, &'a Req, StreamSink<'a, Resp>) -> BoxFuture<'a, HandlerResult>
        + Send
        + Sync,
>;

/// Wrapper around a user-defined server-streaming handler function.
///
/// Logging around the whole call is this wrapper's job; per-message logging
/// is the sink's. The completion record therefore carries only the outcome,
/// not the emitted messages.
pub struct StreamingHandler<Req, Resp> {
    key: MethodKey,
    logger: Arc<dyn CallLogger>,
    f: StreamingFn<Req, Resp>,
}

impl<Req, Resp> StreamingHandler<Req, Resp>
where
    Req: Message,
    Resp: Message,
{
    /// Wrap `f` as the handler for `<service>.<method>`.
    pub fn new<F>(service: impl Into<String>, method: impl Into<String>, f: F) -> Self
    where
        F: for<'a> Fn(
                &'a RequestContext,
                &'a Req,
                StreamSink<'a, Resp>,
            ) -> BoxFuture<'a, HandlerResult>
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

    /// Invoke the wrapped handler function with a fresh sink over `writer`.
    ///
    /// Records the request before the call and the completion status after
    /// it (verbose logging permitting). The function's outcome is returned
    /// unchanged.
    pub async fn run<'a>(
        &'a self,
        ctx: &'a RequestContext,
        request: &'a Req,
        writer: &'a mut (dyn StreamWriter<Resp> + 'a),
    ) -> HandlerResult {
        if self.logger.verbose() {
            self.logger.record(
                Level::INFO,
                &format!("Request[{}] {}", self.key, request.debug_string()),
            );
        }

        let sink = StreamSink::new(self.key.clone(), self.logger.clone(), writer);
        let result = (self.f)(ctx, request, sink).await;

        if self.logger.verbose() {
            let outcome = match &result {
                Ok(()) => "OK".to_owned(),
                Err(status) => format!("Error: {status}"),
            };
            self.logger
                .record(Level::INFO, &format!("Response[{}] {}", self.key, outcome));
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::RecordingLogger;
    use crate::status::Status;

    #[derive(Debug, Default)]
    struct ListSessionsRequest {
        count: usize,
    }

    #[derive(Debug, Clone, PartialEq)]
    struct Session {
        name: String,
    }

    /// Collects written messages in memory.
    #[derive(Default)]
    struct VecWriter {
        sent: Vec<Session>,
    }

    impl StreamWriter<Session> for VecWriter {
        fn write<'a>(&'a mut self, message: &'a Session) -> BoxFuture<'a, HandlerResult> {
            self.sent.push(message.clone());
            Box::pin(async { Ok(()) })
        }
    }

    /// Fails every write with UNAVAILABLE.
    struct BrokenWriter;

    impl StreamWriter<Session> for BrokenWriter {
        fn write<'a>(&'a mut self, _message: &'a Session) -> BoxFuture<'a, HandlerResult> {
            Box::pin(async { Err(Status::unavailable("peer disconnected")) })
        }
    }

    fn list_sessions<'a>(
        _ctx: &'a RequestContext,
        request: &'a ListSessionsRequest,
        mut stream: StreamSink<'a, Session>,
    ) -> BoxFuture<'a, HandlerResult> {
        Box::pin(async move {
            for i in 0..request.count {
                stream
                    .send(&Session {
                        name: format!("sessions/{i}"),
                    })
                    .await?;
            }
            Ok(())
        })
    }

    #[tokio::test]
    async fn test_messages_forwarded_in_order() {
        let handler = StreamingHandler::new("Spanner", "ListSessions", list_sessions);
        let ctx = RequestContext::new();
        let request = ListSessionsRequest { count: 3 };
        let mut writer = VecWriter::default();

        handler.run(&ctx, &request, &mut writer).await.unwrap();

        let names: Vec<_> = writer.sent.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, ["sessions/0", "sessions/1", "sessions/2"]);
    }

    #[tokio::test]
    async fn test_logging_counts_for_n_messages() {
        let logger = Arc::new(RecordingLogger::new(true));
        let handler = StreamingHandler::new("Spanner", "ListSessions", list_sessions)
            .with_logger(logger.clone());

        let ctx = RequestContext::new();
        let request = ListSessionsRequest { count: 3 };
        let mut writer = VecWriter::default();
        handler.run(&ctx, &request, &mut writer).await.unwrap();

        // One request record, one send record per message, one completion.
        let messages = logger.messages();
        assert_eq!(messages.len(), 5);
        assert!(messages[0].starts_with("Request[Spanner.ListSessions]"));
        for (i, message) in messages[1..4].iter().enumerate() {
            assert!(message.starts_with("Send[Spanner.ListSessions]"));
            assert!(message.contains(&format!("sessions/{i}")));
        }
        assert_eq!(messages[4], "Response[Spanner.ListSessions] OK");
    }

    #[tokio::test]
    async fn test_logging_disabled_emits_nothing() {
        let logger = Arc::new(RecordingLogger::new(false));
        let handler = StreamingHandler::new("Spanner", "ListSessions", list_sessions)
            .with_logger(logger.clone());

        let ctx = RequestContext::new();
        let request = ListSessionsRequest { count: 2 };
        let mut writer = VecWriter::default();
        handler.run(&ctx, &request, &mut writer).await.unwrap();

        assert!(logger.records().is_empty());
        assert_eq!(writer.sent.len(), 2);
    }

    #[tokio::test]
    async fn test_empty_stream_failure_keeps_outcome() {
        fn failing<'a>(
            _ctx: &'a RequestContext,
            _request: &'a ListSessionsRequest,
            _stream: StreamSink<'a, Session>,
        ) -> BoxFuture<'a, HandlerResult> {
            Box::pin(async { Err(Status::internal("backend lost")) })
        }

        let logger = Arc::new(RecordingLogger::new(true));
        let handler =
            StreamingHandler::new("Spanner", "ListSessions", failing).with_logger(logger.clone());

        let ctx = RequestContext::new();
        let mut writer = VecWriter::default();
        let result = handler
            .run(&ctx, &ListSessionsRequest::default(), &mut writer)
            .await;

        assert_eq!(result.unwrap_err(), Status::internal("backend lost"));
        assert!(writer.sent.is_empty());

        // No send records: just request and completion.
        let messages = logger.messages();
        assert_eq!(messages.len(), 2);
        assert!(messages[0].starts_with("Request[Spanner.ListSessions]"));
        assert_eq!(
            messages[1],
            "Response[Spanner.ListSessions] Error: INTERNAL: backend lost"
        );
    }

    #[tokio::test]
    async fn test_write_failure_surfaces_to_handler() {
        let handler = StreamingHandler::new("Spanner", "ListSessions", list_sessions);
        let ctx = RequestContext::new();
        let request = ListSessionsRequest { count: 3 };
        let mut writer = BrokenWriter;

        let result = handler.run(&ctx, &request, &mut writer).await;

        // The handler aborts on the first failed send and the failure
        // crosses the wrapper unchanged.
        assert_eq!(
            result.unwrap_err(),
            Status::unavailable("peer disconnected")
        );
    }
}
