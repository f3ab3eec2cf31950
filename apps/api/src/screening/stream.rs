//! Streaming response writer — encodes batch outcomes as newline-delimited
//! JSON and streams them to the client as they arrive.

use std::convert::Infallible;

use axum::{
    body::Body,
    http::{header, StatusCode},
    response::Response,
};
use bytes::Bytes;
use serde::Serialize;
use tokio::sync::mpsc;

#[cfg(test)]
use crate::models::screening::RankedCandidate;
use crate::screening::orchestrator::BatchOutcome;

pub const CONTENT_TYPE: &str = "application/json; charset=utf-8";

/// The `error` label every failed-batch record carries.
pub const BATCH_ERROR_LABEL: &str = "Batch Processing Error";

/// Wire shape of a failed batch.
#[derive(Debug, Serialize)]
struct BatchErrorRecord<'a> {
    error: &'static str,
    details: &'a str,
    batch_index: usize,
    resumes: &'a [String],
}

/// Encodes one outcome as a single JSON line.
///
/// A success is a JSON array of candidates; a failure is an object with
/// `error` and `details`, so readers can tell them apart by shape alone.
pub fn encode_outcome(outcome: &BatchOutcome) -> Bytes {
    let mut line = match outcome {
        BatchOutcome::Success {
            batch_index,
            candidates,
        } => to_json(candidates, *batch_index),
        BatchOutcome::Failure {
            batch_index,
            resume_names,
            message,
        } => to_json(
            &BatchErrorRecord {
                error: BATCH_ERROR_LABEL,
                details: message,
                batch_index: *batch_index,
                resumes: resume_names,
            },
            *batch_index,
        ),
    };
    line.push(b'\n');
    Bytes::from(line)
}

// Candidates and error records are plain strings and numbers; serde_json
// cannot fail on them, but a broken line must never reach the client.
fn to_json<T: Serialize + ?Sized>(value: &T, batch_index: usize) -> Vec<u8> {
    serde_json::to_vec(value).unwrap_or_else(|e| {
        tracing::error!(batch = batch_index, "Failed to encode stream record: {e}");
        serde_json::to_vec(&BatchErrorRecord {
            error: BATCH_ERROR_LABEL,
            details: "failed to encode batch result",
            batch_index,
            resumes: &[],
        })
        .unwrap_or_default()
    })
}

/// Builds a chunked 200 response whose body yields one encoded line per
/// outcome received on `outcomes`. The body ends when every sender is dropped.
pub fn ndjson_response(outcomes: mpsc::Receiver<BatchOutcome>) -> Response {
    let stream = futures::stream::unfold(outcomes, |mut rx| async move {
        let outcome = rx.recv().await?;
        Some((Ok::<_, Infallible>(encode_outcome(&outcome)), rx))
    });

    let mut response = Response::new(Body::from_stream(stream));
    *response.status_mut() = StatusCode::OK;
    response
        .headers_mut()
        .insert(header::CONTENT_TYPE, header::HeaderValue::from_static(CONTENT_TYPE));
    response
}

/// A decoded stream line, as a client would see it.
#[cfg(test)]
#[derive(Debug, Clone, PartialEq)]
pub enum StreamRecord {
    Candidates(Vec<RankedCandidate>),
    Error { error: String, details: String },
}

#[cfg(test)]
pub fn decode_records(body: &[u8]) -> Result<Vec<StreamRecord>, serde_json::Error> {
    body.split(|b| *b == b'\n')
        .filter(|line| !line.iter().all(u8::is_ascii_whitespace))
        .map(|line| -> Result<StreamRecord, serde_json::Error> {
            let value: serde_json::Value = serde_json::from_slice(line)?;
            if value.is_array() {
                Ok(StreamRecord::Candidates(serde_json::from_value(value)?))
            } else {
                let error = value["error"].as_str().unwrap_or_default().to_string();
                let details = value["details"].as_str().unwrap_or_default().to_string();
                Ok(StreamRecord::Error { error, details })
            }
        })
        .collect()
}
