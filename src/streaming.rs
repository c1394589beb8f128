//! Assembly of streamed generation responses.
//!
//! A streamed generation arrives as a sequence of events whose payloads
//! carry the *cumulative* response text rather than deltas. This module
//! turns that sequence into an incrementally rendered message and a final
//! [`GenerationChunk`]: for each fragment only the newly appended suffix
//! is emitted for display, and the last decoded fragment (which carries
//! the usage accounting and request id) is returned to the caller once
//! the stream is exhausted.

use futures::{Stream, StreamExt};

use crate::observability::{STREAM_DELTAS, STREAM_ERRORS};
use crate::render::Renderer;
use crate::sse::SseEvent;
use crate::types::GenerationChunk;
use crate::{Error, Result};

/// Tracks the cumulative text of one streamed response.
///
/// Each fragment's text must extend the previous fragment's text under
/// prefix order; [`DeltaTracker::advance`] enforces that invariant and
/// yields only the newly appended suffix.
#[derive(Debug, Default)]
pub struct DeltaTracker {
    current: String,
}

impl DeltaTracker {
    /// Creates a tracker with no text seen yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// Advances to `text`, returning the newly appended suffix.
    ///
    /// Replaying the text seen so far yields an empty delta. Text that
    /// does not start with the previously seen text is a violation of the
    /// protocol's monotonicity contract and fails with
    /// [`Error::Protocol`] rather than being silently truncated.
    pub fn advance<'a>(&mut self, text: &'a str) -> Result<&'a str> {
        if !text.starts_with(self.current.as_str()) {
            STREAM_ERRORS.click();
            return Err(Error::protocol(format!(
                "cumulative text does not extend the previous fragment \
                 (had {} bytes, fragment carries {} bytes)",
                self.current.len(),
                text.len(),
            )));
        }
        let delta = &text[self.current.len()..];
        self.current = text.to_string();
        Ok(delta)
    }

    /// The full text seen so far.
    pub fn text(&self) -> &str {
        &self.current
    }
}

/// Decode one event payload into a [`GenerationChunk`].
///
/// Decoding happens in two phases so the failure modes stay distinct: a
/// payload that is not well-formed JSON is a serialization error, while
/// well-formed JSON that lacks the required fields (`output.text`,
/// `request_id`) is a shape error. Both are fatal to the turn; neither is
/// retried.
fn decode_chunk(data: &str) -> Result<GenerationChunk> {
    let value: serde_json::Value = serde_json::from_str(data).map_err(|e| {
        Error::serialization(
            format!("Failed to parse event JSON: {e}"),
            Some(Box::new(e)),
        )
    })?;
    serde_json::from_value(value).map_err(|e| {
        Error::shape(
            format!("event does not match the generation response shape: {e}"),
            None,
        )
    })
}

/// Consume a stream of SSE events, rendering text incrementally and
/// returning the final decoded chunk.
///
/// The events are processed strictly in arrival order, suspending
/// cooperatively while the next one is awaited:
///
/// - an `error`-named event aborts immediately with a streaming error
///   carrying the raw payload; nothing further is consumed and no partial
///   message is returned;
/// - every other payload is decoded, its newly appended suffix is emitted
///   via [`Renderer::print_text`], and the terminal `stop` sentinel ends
///   the displayed message with [`Renderer::finish_response`] while
///   consumption continues until the source is exhausted;
/// - a stream that ends before producing a single event is a streaming
///   error.
pub async fn accumulate<S>(events: S, renderer: &mut dyn Renderer) -> Result<GenerationChunk>
where
    S: Stream<Item = Result<SseEvent>>,
{
    futures::pin_mut!(events);

    let mut tracker = DeltaTracker::new();
    let mut last: Option<GenerationChunk> = None;

    while let Some(event) = events.next().await {
        let event = event?;

        if event.name.as_deref() == Some("error") {
            STREAM_ERRORS.click();
            return Err(Error::streaming(
                format!("Server signaled an error event: {}", event.data),
                None,
            ));
        }

        let chunk = decode_chunk(&event.data)?;
        let delta = tracker.advance(chunk.text())?;
        STREAM_DELTAS.click();
        renderer.print_text(delta);

        if chunk.is_stop() {
            renderer.finish_response();
        }

        last = Some(chunk);
    }

    last.ok_or_else(|| Error::streaming("stream ended before any events arrived", None))
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::stream;
    use serde_json::json;

    /// Renderer that records everything it is asked to display.
    #[derive(Default)]
    struct RecordingRenderer {
        deltas: Vec<String>,
        errors: Vec<String>,
        finishes: usize,
    }

    impl Renderer for RecordingRenderer {
        fn print_text(&mut self, text: &str) {
            self.deltas.push(text.to_string());
        }

        fn print_info(&mut self, _info: &str) {}

        fn print_verbose(&mut self, _info: &str) {}

        fn print_error(&mut self, error: &str) {
            self.errors.push(error.to_string());
        }

        fn finish_response(&mut self) {
            self.finishes += 1;
        }
    }

    fn result_event(text: &str, finish_reason: &str) -> Result<SseEvent> {
        Ok(SseEvent {
            name: Some("result".to_string()),
            data: json!({
                "output": {"text": text, "finish_reason": finish_reason},
                "request_id": "req-test",
            })
            .to_string(),
        })
    }

    fn final_event(text: &str) -> Result<SseEvent> {
        Ok(SseEvent {
            name: Some("result".to_string()),
            data: json!({
                "output": {"text": text, "finish_reason": "stop"},
                "usage": {"input_tokens": 4, "output_tokens": 2},
                "request_id": "req-test",
            })
            .to_string(),
        })
    }

    #[tokio::test]
    async fn deltas_concatenate_to_final_text() {
        let events = stream::iter(vec![
            result_event("Hel", "null"),
            result_event("Hello", "null"),
            final_event("Hello!"),
        ]);
        let mut renderer = RecordingRenderer::default();

        let chunk = accumulate(events, &mut renderer).await.unwrap();
        assert_eq!(renderer.deltas, vec!["Hel", "lo", "!"]);
        assert_eq!(renderer.deltas.concat(), chunk.text());
        assert_eq!(chunk.text(), "Hello!");
        assert_eq!(renderer.finishes, 1);
    }

    #[tokio::test]
    async fn final_chunk_carries_usage_and_request_id() {
        let events = stream::iter(vec![result_event("hi", "null"), final_event("hi there")]);
        let mut renderer = RecordingRenderer::default();

        let chunk = accumulate(events, &mut renderer).await.unwrap();
        assert_eq!(chunk.usage.unwrap().total(), 6);
        assert_eq!(chunk.request_id, "req-test");
    }

    #[tokio::test]
    async fn replayed_fragment_emits_empty_delta() {
        let events = stream::iter(vec![
            result_event("Hello", "null"),
            result_event("Hello", "null"),
            final_event("Hello"),
        ]);
        let mut renderer = RecordingRenderer::default();

        accumulate(events, &mut renderer).await.unwrap();
        assert_eq!(renderer.deltas, vec!["Hello", "", ""]);
    }

    #[tokio::test]
    async fn events_after_stop_are_still_processed() {
        let events = stream::iter(vec![final_event("done"), result_event("done!", "null")]);
        let mut renderer = RecordingRenderer::default();

        let chunk = accumulate(events, &mut renderer).await.unwrap();
        assert_eq!(renderer.deltas, vec!["done", "!"]);
        assert_eq!(chunk.text(), "done!");
    }

    #[tokio::test]
    async fn error_event_aborts_with_streaming_error() {
        let events = stream::iter(vec![
            result_event("partial", "null"),
            Ok(SseEvent {
                name: Some("error".to_string()),
                data: r#"{"message":"rate limited"}"#.to_string(),
            }),
            // Anything after the error must never be consumed.
            result_event("partial more", "null"),
        ]);
        let mut renderer = RecordingRenderer::default();

        let err = accumulate(events, &mut renderer).await.unwrap_err();
        assert!(err.is_streaming());
        assert!(err.to_string().contains("rate limited"));
        assert_eq!(renderer.deltas, vec!["partial"]);
    }

    #[tokio::test]
    async fn malformed_json_is_a_serialization_error() {
        let events = stream::iter(vec![Ok(SseEvent {
            name: Some("result".to_string()),
            data: "not json".to_string(),
        })]);
        let mut renderer = RecordingRenderer::default();

        let err = accumulate(events, &mut renderer).await.unwrap_err();
        assert!(matches!(err, Error::Serialization { .. }));
    }

    #[tokio::test]
    async fn missing_output_text_is_a_shape_error() {
        let events = stream::iter(vec![Ok(SseEvent {
            name: Some("result".to_string()),
            data: json!({
                "output": {"finish_reason": "stop"},
                "request_id": "req-test",
            })
            .to_string(),
        })]);
        let mut renderer = RecordingRenderer::default();

        let err = accumulate(events, &mut renderer).await.unwrap_err();
        assert!(err.is_shape());
    }

    #[tokio::test]
    async fn shrinking_text_is_a_protocol_error() {
        let events = stream::iter(vec![
            result_event("Hello", "null"),
            result_event("He", "null"),
        ]);
        let mut renderer = RecordingRenderer::default();

        let err = accumulate(events, &mut renderer).await.unwrap_err();
        assert!(err.is_protocol());
        assert_eq!(renderer.deltas, vec!["Hello"]);
    }

    #[tokio::test]
    async fn empty_stream_is_a_streaming_error() {
        let events = stream::iter(Vec::<Result<SseEvent>>::new());
        let mut renderer = RecordingRenderer::default();

        let err = accumulate(events, &mut renderer).await.unwrap_err();
        assert!(err.is_streaming());
    }

    #[test]
    fn delta_tracker_rejects_divergent_text() {
        let mut tracker = DeltaTracker::new();
        assert_eq!(tracker.advance("abc").unwrap(), "abc");
        assert!(tracker.advance("abd").is_err());
        // A failed advance leaves the tracker untouched.
        assert_eq!(tracker.text(), "abc");
    }
}
