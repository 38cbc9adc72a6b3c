//! Event-stream relay between the upstream analysis service and the client
//!
//! Both modes produce a stream of already-framed byte chunks:
//! - Canned mode replays a [`CannedScript`](crate::analysis::CannedScript)
//! - Live mode runs a task that posts `{url}` upstream and forwards each
//!   received line (reframed) through a bounded channel
//!
//! The live task owns the upstream response. It stops as soon as the client
//! side of the channel is dropped, which releases the upstream connection.

use bytes::Bytes;
use futures::stream::{self, Stream, StreamExt};
use reqwest::header::ACCEPT;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tracing::Instrument;
use uuid::Uuid;

use crate::analysis::AnalysisRequest;
use crate::error::{FactGuardError, Result};
use crate::sse::{EVENT_STREAM_CONTENT_TYPE, LineSplitter, StreamEvent, reframe_line};

/// Frames buffered between the relay task and the response body
const RELAY_CHANNEL_CAPACITY: usize = 32;

/// How a live relay ended without an upstream failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelayOutcome {
    /// Upstream finished; number of lines forwarded
    Completed { lines: usize },
    /// The client went away first
    ClientGone,
}

/// Replay pre-built events, pausing `delay` before each one
pub fn canned_stream(events: Vec<StreamEvent>, delay: Duration) -> impl Stream<Item = Bytes> {
    stream::iter(events).then(move |event| async move {
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        Bytes::from(event.to_frame())
    })
}

/// Start relaying the upstream analysis of `request` and return the client stream
///
/// Must be called from within a tokio runtime.
pub fn spawn_live_relay(
    client: reqwest::Client,
    upstream_url: String,
    request: AnalysisRequest,
) -> ReceiverStream<Bytes> {
    let (tx, rx) = mpsc::channel(RELAY_CHANNEL_CAPACITY);
    let stream_id = Uuid::new_v4();
    let span = tracing::info_span!("relay", %stream_id, url = %request.url);

    tokio::spawn(
        async move {
            tracing::debug!("Opening upstream stream to {upstream_url}");

            let mut at_boundary = true;
            let outcome = tokio::select! {
                outcome = relay_lines(&client, &upstream_url, &request, &tx, &mut at_boundary) => outcome,
                _ = tx.closed() => Ok(RelayOutcome::ClientGone),
            };

            match outcome {
                Ok(RelayOutcome::Completed { lines }) => {
                    tracing::info!(lines, "Upstream stream completed");
                }
                Ok(RelayOutcome::ClientGone) => {
                    tracing::info!("Client disconnected, upstream stream released");
                }
                Err(e) => {
                    tracing::warn!(error_type = "stream_failed", error_message = %e, "Upstream stream failed");
                    let details = match e {
                        FactGuardError::Upstream(details) => details,
                        other => other.to_string(),
                    };
                    let mut frame = String::new();
                    if !at_boundary {
                        frame.push('\n');
                    }
                    frame.push_str(&StreamEvent::stream_failed(&details).to_frame());
                    // Nothing left to do if the client is already gone
                    let _ = tx.send(Bytes::from(frame)).await;
                }
            }
        }
        .instrument(span),
    );

    ReceiverStream::new(rx)
}

/// Forward upstream lines until upstream ends, fails, or the client leaves
///
/// `at_boundary` tracks whether the last forwarded line closed a frame, so a
/// failure event is never glued onto a half-written one.
async fn relay_lines(
    client: &reqwest::Client,
    upstream_url: &str,
    request: &AnalysisRequest,
    tx: &mpsc::Sender<Bytes>,
    at_boundary: &mut bool,
) -> Result<RelayOutcome> {
    let response = client
        .post(upstream_url)
        .header(ACCEPT, EVENT_STREAM_CONTENT_TYPE)
        .json(request)
        .send()
        .await
        .map_err(|e| FactGuardError::Upstream(describe_request_error(&e)))?;

    // Error bodies are relayed like any other
    let status = response.status();
    if !status.is_success() {
        tracing::warn!(status = status.as_u16(), "Upstream responded with an error status");
    }

    let mut body = response.bytes_stream();
    let mut splitter = LineSplitter::new();
    let mut lines = 0usize;

    while let Some(chunk) = body.next().await {
        let chunk = chunk.map_err(|e| {
            FactGuardError::Upstream(format!("Failed to read upstream stream: {e}"))
        })?;

        for line in splitter.push(&chunk) {
            if !forward(tx, &line, at_boundary).await {
                return Ok(RelayOutcome::ClientGone);
            }
            lines += 1;
        }
    }

    if let Some(line) = splitter.finish() {
        if !forward(tx, &line, at_boundary).await {
            return Ok(RelayOutcome::ClientGone);
        }
        lines += 1;
    }

    Ok(RelayOutcome::Completed { lines })
}

/// Send one reframed line; false once the client is gone
async fn forward(tx: &mpsc::Sender<Bytes>, line: &str, at_boundary: &mut bool) -> bool {
    *at_boundary = line.is_empty();
    tx.send(Bytes::from(reframe_line(line))).await.is_ok()
}

fn describe_request_error(e: &reqwest::Error) -> String {
    if e.is_timeout() {
        format!("Upstream request timed out: {e}")
    } else if e.is_connect() {
        format!("Failed to connect to upstream: {e}")
    } else {
        format!("Upstream request failed: {e}")
    }
}
