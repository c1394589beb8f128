//! Server-Sent Events (SSE) processing for streaming responses.
//!
//! This module turns the raw byte stream of an HTTP response into a lazy,
//! finite sequence of [`SseEvent`]s. It only does framing; decoding the
//! event payloads is the job of [`crate::streaming`].

use bytes::Bytes;
use futures::stream::{self, Stream, StreamExt};

use crate::observability::{STREAM_BYTES, STREAM_EVENTS};
use crate::{Error, Result};

/// One named text event from an SSE stream.
///
/// Events are ephemeral: produced one at a time, consumed immediately,
/// never stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SseEvent {
    /// The event name from the `event:` field, if any. DashScope uses
    /// `result` for ordinary fragments and `error` for failures.
    pub name: Option<String>,

    /// The payload assembled from the `data:` field(s).
    pub data: String,
}

/// Process a stream of bytes into a stream of server-sent events.
///
/// This function takes a byte stream from an HTTP response and converts it
/// into a stream of [`SseEvent`]s, handling buffering of events split
/// across chunks and error conditions. Events are yielded strictly in
/// arrival order.
pub fn process_sse<S>(byte_stream: S) -> impl Stream<Item = Result<SseEvent>>
where
    S: Stream<Item = std::result::Result<Bytes, reqwest::Error>> + Unpin + 'static,
{
    // Convert reqwest errors to our error type
    let stream = byte_stream.map(|result| {
        result
            .map_err(|e| Error::streaming(format!("Error in HTTP stream: {e}"), Some(Box::new(e))))
    });

    // Use a state machine to process the SSE stream. `pending` holds raw
    // bytes whose trailing UTF-8 sequence may still be incomplete; only
    // fully decoded text moves into `buffer` for framing.
    let pending: Vec<u8> = Vec::new();
    let buffer = String::new();

    stream::unfold(
        (stream, pending, buffer),
        move |(mut stream, mut pending, mut buffer)| async move {
            loop {
                // First check if we have a complete event in the buffer
                if let Some((event, remaining)) = extract_event(&buffer) {
                    buffer = remaining;
                    STREAM_EVENTS.click();
                    return Some((event, (stream, pending, buffer)));
                }

                // Read more data
                match stream.next().await {
                    Some(Ok(bytes)) => {
                        STREAM_BYTES.count(bytes.len() as u64);
                        pending.extend_from_slice(&bytes);
                        if let Err(e) = drain_valid_utf8(&mut pending, &mut buffer) {
                            return Some((Err(e), (stream, pending, buffer)));
                        }
                    }
                    Some(Err(e)) => {
                        return Some((Err(e), (stream, pending, buffer)));
                    }
                    None => {
                        // End of stream
                        if !pending.is_empty() {
                            pending.clear();
                            return Some((
                                Err(Error::encoding(
                                    "Invalid UTF-8 in stream: truncated multi-byte sequence at end of stream",
                                    None,
                                )),
                                (stream, pending, buffer),
                            ));
                        }
                        if !buffer.is_empty() {
                            if let Some((event, _)) = extract_event(&buffer) {
                                STREAM_EVENTS.click();
                                return Some((event, (stream, pending, buffer)));
                            }
                        }
                        return None;
                    }
                }
            }
        },
    )
}

/// Move the longest valid UTF-8 prefix of `pending` into `buffer`.
///
/// A multi-byte character split across network chunks leaves an incomplete
/// sequence at the end of `pending`; those bytes stay behind until the next
/// chunk completes them. Only a byte that can never begin or continue a
/// valid sequence is an encoding error.
fn drain_valid_utf8(pending: &mut Vec<u8>, buffer: &mut String) -> Result<()> {
    let valid = match std::str::from_utf8(pending) {
        Ok(text) => {
            buffer.push_str(text);
            pending.clear();
            return Ok(());
        }
        Err(e) if e.error_len().is_none() => e.valid_up_to(),
        Err(e) => {
            let message = format!("Invalid UTF-8 in stream: {e}");
            pending.clear();
            return Err(Error::encoding(message, None));
        }
    };
    let text = std::str::from_utf8(&pending[..valid])
        .map_err(|e| Error::encoding(format!("Invalid UTF-8 in stream: {e}"), None))?;
    buffer.push_str(text);
    pending.drain(..valid);
    Ok(())
}

/// Extract a complete SSE event from a buffer string.
///
/// Events are delimited by blank lines. Within an event, `event:` lines
/// carry the name, `data:` lines carry the payload (joined by newlines
/// when repeated), and `id:` lines and `:` comments are skipped.
fn extract_event(buffer: &str) -> Option<(Result<SseEvent>, String)> {
    let parts: Vec<&str> = buffer.splitn(2, "\n\n").collect();
    if parts.len() != 2 {
        return None;
    }
    let event_text = parts[0];
    let rest = parts[1].to_string();

    let mut name = None;
    let mut data: Option<String> = None;
    for line in event_text.lines() {
        if let Some(value) = line.strip_prefix("event:") {
            name = Some(value.trim().to_string());
        } else if let Some(value) = line.strip_prefix("data:") {
            let value = value.strip_prefix(' ').unwrap_or(value);
            match data {
                Some(ref mut data) => {
                    data.push('\n');
                    data.push_str(value);
                }
                None => data = Some(value.to_string()),
            }
        }
        // id: fields and comment lines (leading ':') carry no payload.
    }

    let Some(data) = data else {
        return Some((
            Err(Error::serialization(
                format!("Malformed SSE event: no 'data:' line in '{event_text}'"),
                None,
            )),
            rest,
        ));
    };

    Some((Ok(SseEvent { name, data }), rest))
}
