//! Newline-delimited JSON decoding over a chunked byte stream.

use bytes::Bytes;
use futures::{Stream, StreamExt};
use serde::de::DeserializeOwned;

use crate::utils::error::ClientFault;

fn parse_line<T: DeserializeOwned>(line: &[u8]) -> Result<T, ClientFault> {
    serde_json::from_slice(line).map_err(|e| ClientFault::Decode {
        message: e.to_string(),
    })
}

/// Splits `chunks` on `\n` and decodes each non-blank line as one `T`.
/// Lines may span chunk boundaries; a final line without a terminator is
/// still decoded. The stream ends after the first transport error.
pub fn decode_ndjson<S, E, T>(chunks: S) -> impl Stream<Item = Result<T, ClientFault>> + Send
where
    S: Stream<Item = Result<Bytes, E>> + Send + 'static,
    E: Into<ClientFault> + Send + 'static,
    T: DeserializeOwned + Send + 'static,
{
    let state = (Box::pin(chunks), Vec::<u8>::new(), false);

    futures::stream::unfold(state, |(mut chunks, mut buffer, mut done)| async move {
        loop {
            if let Some(pos) = buffer.iter().position(|b| *b == b'\n') {
                let line: Vec<u8> = buffer.drain(..=pos).collect();
                let line = line.trim_ascii();
                if line.is_empty() {
                    continue;
                }
                let item = parse_line(line);
                return Some((item, (chunks, buffer, done)));
            }

            if done {
                let rest = std::mem::take(&mut buffer);
                let rest = rest.trim_ascii();
                if rest.is_empty() {
                    return None;
                }
                let item = parse_line(rest);
                return Some((item, (chunks, buffer, done)));
            }

            match chunks.next().await {
                Some(Ok(chunk)) => buffer.extend_from_slice(&chunk),
                Some(Err(e)) => {
                    buffer.clear();
                    return Some((Err(e.into()), (chunks, buffer, true)));
                }
                None => done = true,
            }
        }
    })
}
