use axum::body::Body;
use axum::http::header;
use axum::response::{IntoResponse, Response};
use axum::BoxError;
use bytes::Bytes;
use futures::{Stream, StreamExt};
use serde::Serialize;

pub const NDJSON_CONTENT_TYPE: &str = "application/x-ndjson";

fn encode_line<T: Serialize>(value: &T) -> Result<Bytes, BoxError> {
    let mut line = serde_json::to_vec(value)?;
    line.push(b'\n');
    Ok(Bytes::from(line))
}

/// Streams `items` as newline-delimited JSON. The body is pulled by the
/// connection, so the next item is only requested once the previous line
/// was handed to the transport. An error item aborts the response.
pub fn ndjson_response<S, T, E>(items: S) -> Response
where
    S: Stream<Item = Result<T, E>> + Send + 'static,
    T: Serialize,
    E: Into<BoxError>,
{
    let lines = items.map(|item| item.map_err(Into::into).and_then(|value| encode_line(&value)));

    (
        [(header::CONTENT_TYPE, NDJSON_CONTENT_TYPE)],
        Body::from_stream(lines),
    )
        .into_response()
}
