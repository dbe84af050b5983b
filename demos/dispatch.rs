//! Dispatch demo - registers unary and streaming handlers and drives a
//! round-trip the way a transport would.
//!
//! Run with request/response logging on:
//!
//! ```text
//! RUST_LOG=info cargo run --example dispatch
//! ```

use dispatchwire::{
    config, BoxFuture, HandlerResult, RegistryBuilder, RequestContext, Status, StreamSink,
    StreamWriter,
};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Default)]
struct GetSessionRequest {
    name: String,
}

#[derive(Debug, Default)]
struct Session {
    name: String,
}

#[derive(Debug, Default)]
struct ListSessionsRequest {
    count: usize,
}

fn get_session<'a>(
    _ctx: &'a RequestContext,
    request: &'a GetSessionRequest,
    response: &'a mut Session,
) -> BoxFuture<'a, HandlerResult> {
    Box::pin(async move {
        if request.name.is_empty() {
            return Err(Status::invalid_argument("missing session name"));
        }
        response.name = request.name.clone();
        Ok(())
    })
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

            // Simulate some work per emitted message.
            tokio::time::sleep(tokio::time::Duration::from_millis(10)).await;
        }
        Ok(())
    })
}

/// Stand-in for the transport's outbound stream: prints each message.
#[derive(Default)]
struct StdoutWriter;

impl StreamWriter<Session> for StdoutWriter {
    fn write<'a>(&'a mut self, message: &'a Session) -> BoxFuture<'a, HandlerResult> {
        println!("  -> {message:?}");
        Box::pin(async { Ok(()) })
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();
    config::set_log_requests(true);

    let registry = RegistryBuilder::new()
        .unary("Spanner", "GetSession", get_session)
        .streaming("Spanner", "ListSessions", list_sessions)
        .build()?;

    let ctx = RequestContext::new().with_peer("demo-client");

    // Unary round-trip.
    println!("calling Spanner.GetSession:");
    let handler = registry
        .lookup("Spanner", "GetSession")
        .ok_or("method not found")?
        .as_unary::<GetSessionRequest, Session>()?;
    let request = GetSessionRequest {
        name: "sessions/1".to_string(),
    };
    let mut response = Session::default();
    handler.run(&ctx, &request, &mut response).await?;
    println!("  -> {response:?}");

    // Streaming round-trip.
    println!("calling Spanner.ListSessions:");
    let handler = registry
        .lookup("Spanner", "ListSessions")
        .ok_or("method not found")?
        .as_streaming::<ListSessionsRequest, Session>()?;
    let request = ListSessionsRequest { count: 3 };
    let mut writer = StdoutWriter;
    handler.run(&ctx, &request, &mut writer).await?;

    // A miss is a normal outcome the transport maps to "unimplemented".
    assert!(registry.lookup("Spanner", "Nonexistent").is_none());
    println!("Spanner.Nonexistent is unimplemented, as expected");

    Ok(())
}
