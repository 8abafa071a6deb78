//! Server-Sent Events (SSE) processing for streaming responses.
//!
//! This module handles parsing of SSE streams from the chat-completion
//! endpoint, converting raw byte streams into structured
//! `ChatCompletionChunk` objects.  The `data: [DONE]` marker terminates
//! the stream.

use bytes::Bytes;
use futures::stream::{self, Stream, StreamExt};

use crate::error::{Error, Result};
use crate::observability::{STREAM_BYTES, STREAM_ERRORS, STREAM_EVENTS};
use crate::types::ChatCompletionChunk;

/// Outcome of scanning the buffer for one SSE event.
enum Extracted {
    /// A parsed (or unparseable) event.
    Event(Result<ChatCompletionChunk>),
    /// The `[DONE]` end-of-stream marker.
    Done,
    /// An event with no data line; skipped.
    Empty,
}

/// Process a stream of bytes into a stream of completion chunks.
///
/// This function takes a byte stream from an HTTP response and converts
/// it into a stream of parsed `ChatCompletionChunk` objects, handling
/// SSE framing, buffering, and error conditions.
pub fn process_sse<S>(byte_stream: S) -> impl Stream<Item = Result<ChatCompletionChunk>>
where
    S: Stream<Item = std::result::Result<Bytes, reqwest::Error>> + Unpin + 'static,
{
    // Convert reqwest errors to our error type
    let stream = byte_stream.map(|result| {
        result
            .map_err(|e| Error::streaming(format!("Error in HTTP stream: {e}"), Some(Box::new(e))))
    });

    // Use a state machine to process the SSE stream
    let buffer = String::new();

    stream::unfold(
        (stream, buffer, false),
        move |(mut stream, mut buffer, mut done)| async move {
            loop {
                if done {
                    return None;
                }

                // First check if we have a complete event in the buffer
                if let Some((extracted, remaining)) = extract_event(&buffer) {
                    buffer = remaining;
                    match extracted {
                        Extracted::Event(event) => {
                            STREAM_EVENTS.click();
                            if event.is_err() {
                                STREAM_ERRORS.click();
                            }
                            return Some((event, (stream, buffer, done)));
                        }
                        Extracted::Done => {
                            return None;
                        }
                        Extracted::Empty => {
                            continue;
                        }
                    }
                }

                // Read more data
                match stream.next().await {
                    Some(Ok(bytes)) => {
                        STREAM_BYTES.count(bytes.len() as u64);
                        match String::from_utf8(bytes.to_vec()) {
                            Ok(text) => buffer.push_str(&text),
                            Err(e) => {
                                STREAM_ERRORS.click();
                                done = true;
                                return Some((
                                    Err(Error::encoding(
                                        format!("Invalid UTF-8 in stream: {e}"),
                                        Some(Box::new(e)),
                                    )),
                                    (stream, buffer, done),
                                ));
                            }
                        }
                    }
                    Some(Err(e)) => {
                        STREAM_ERRORS.click();
                        done = true;
                        return Some((Err(e), (stream, buffer, done)));
                    }
                    None => {
                        // End of stream; drain anything left in the buffer
                        if !buffer.is_empty()
                            && let Some((Extracted::Event(event), _)) = extract_event(&buffer)
                        {
                            buffer.clear();
                            done = true;
                            return Some((event, (stream, buffer, done)));
                        }
                        return None;
                    }
                }
            }
        },
    )
}

/// Extract a complete SSE event from a buffer string.
///
/// Events are delimited by double newlines; the payload is the last
/// `data:` line of the event.
fn extract_event(buffer: &str) -> Option<(Extracted, String)> {
    let parts: Vec<&str> = buffer.splitn(2, "\n\n").collect();
    if parts.len() != 2 {
        return None;
    }

    let event_text = parts[0];
    let rest = parts[1].to_string();

    let mut data = None;
    for line in event_text.lines() {
        if let Some(payload) = line.strip_prefix("data: ") {
            data = Some(payload);
        } else if let Some(payload) = line.strip_prefix("data:") {
            data = Some(payload.trim_start());
        }
    }

    match data {
        Some("[DONE]") => Some((Extracted::Done, rest)),
        Some(json_str) => match serde_json::from_str::<ChatCompletionChunk>(json_str) {
            Ok(event) => Some((Extracted::Event(Ok(event)), rest)),
            Err(e) => Some((
                Extracted::Event(Err(Error::serialization(
                    format!("Failed to parse event JSON: {e}"),
                    Some(Box::new(e)),
                ))),
                rest,
            )),
        },
        None => Some((Extracted::Empty, rest)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn byte_stream(
        frames: Vec<&'static str>,
    ) -> impl Stream<Item = std::result::Result<Bytes, reqwest::Error>> + Unpin {
        stream::iter(
            frames
                .into_iter()
                .map(|frame| Ok(Bytes::from_static(frame.as_bytes())))
                .collect::<Vec<_>>(),
        )
    }

    #[tokio::test]
    async fn parses_chunks_until_done() {
        let frames = vec![
            "data: {\"choices\":[{\"index\":0,\"delta\":{\"role\":\"assistant\",\"content\":\"Hel\"}}]}\n\n",
            "data: {\"choices\":[{\"index\":0,\"delta\":{\"content\":\"lo\"}}]}\n\n",
            "data: [DONE]\n\n",
        ];
        let events: Vec<_> = process_sse(byte_stream(frames)).collect().await;
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].as_ref().unwrap().content(), Some("Hel"));
        assert_eq!(events[1].as_ref().unwrap().content(), Some("lo"));
    }

    #[tokio::test]
    async fn reassembles_split_frames() {
        let frames = vec![
            "data: {\"choices\":[{\"index\":0,\"delta\"",
            ":{\"content\":\"ok\"}}]}\n\ndata: [DONE]\n\n",
        ];
        let events: Vec<_> = process_sse(byte_stream(frames)).collect().await;
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].as_ref().unwrap().content(), Some("ok"));
    }

    #[tokio::test]
    async fn malformed_json_is_a_serialization_error() {
        let frames = vec!["data: {not json}\n\ndata: [DONE]\n\n"];
        let events: Vec<_> = process_sse(byte_stream(frames)).collect().await;
        assert_eq!(events.len(), 1);
        assert!(matches!(
            events[0],
            Err(Error::Serialization { .. })
        ));
    }

    #[tokio::test]
    async fn keepalive_comments_are_skipped() {
        let frames = vec![
            ": keepalive\n\n",
            "data: {\"choices\":[{\"index\":0,\"delta\":{\"content\":\"x\"}}]}\n\n",
            "data: [DONE]\n\n",
        ];
        let events: Vec<_> = process_sse(byte_stream(frames)).collect().await;
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].as_ref().unwrap().content(), Some("x"));
    }
}
