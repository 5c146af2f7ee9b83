use std::convert::Infallible;
use std::time::Duration;

use axum::response::Sse;
use axum::response::sse::{Event, KeepAlive, KeepAliveStream};
use futures::Stream;
use tokio::sync::mpsc;

use crate::types::AnalysisSseEvent;

pub type SseItem = Result<Event, Infallible>;
pub type SseSender = mpsc::Sender<SseItem>;

/// Generation can run for minutes, so a keep-alive comment goes out every
/// 5 seconds while the job is quiet.
pub fn sse_response<S>(stream: S) -> Sse<KeepAliveStream<S>>
where
    S: Stream<Item = SseItem> + Send + 'static,
{
    Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(5))
            .text("keepalive"),
    )
}

/// Named SSE event whose data is the JSON form of `event`.
pub fn sse_event(event: &AnalysisSseEvent) -> SseItem {
    let data = serde_json::to_string(event).unwrap_or_else(|_| "{}".into());
    Ok(Event::default().event(event.name()).data(data))
}

/// Final event of every analysis stream.
pub fn sse_done() -> SseItem {
    Ok(Event::default().event("done").data("[DONE]"))
}
