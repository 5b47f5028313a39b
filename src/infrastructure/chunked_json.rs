// Chunked JSON streaming utilities
use crate::domain::snapshot::FeedSnapshot;
use crate::infrastructure::http_response::{brotli_compress, JSON_CONTENT_TYPE};
use axum::body::Body;
use axum::http::{header, Response, StatusCode};
use axum::response::IntoResponse;
use bytes::{BufMut, Bytes, BytesMut};
use futures::stream::Stream;
use futures::StreamExt;
use serde::Serialize;
use tokio::sync::broadcast;
use tokio_stream::wrappers::errors::BroadcastStreamRecvError;
use tokio_stream::wrappers::BroadcastStream;

/// Create a chunked streaming response of length-prefixed JSON frames
pub async fn chunked_json_stream<S, T>(
    stream: S,
    compress: bool,
) -> Result<Response<Body>, StatusCode>
where
    S: Stream<Item = T> + Send + 'static,
    T: Serialize + Send + Sync + 'static,
{
    let byte_stream = stream.then(move |msg| async move { serialize_chunk(&msg, compress).await });

    let body = Body::from_stream(byte_stream);

    // Frames are compressed one by one, so no Content-Encoding on the response.
    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, JSON_CONTENT_TYPE)
        .header(header::TRANSFER_ENCODING, "chunked")
        .body(body)
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)
}

/// Serialize one message to a frame: 4-byte big-endian length, then payload
pub async fn serialize_chunk<T: Serialize>(msg: &T, compress: bool) -> Result<Bytes, std::io::Error> {
    let json = serde_json::to_vec(msg).map_err(std::io::Error::other)?;

    let payload = if compress {
        brotli_compress(json).await?
    } else {
        json
    };

    let length = payload.len() as u32;
    let mut chunk = BytesMut::with_capacity(4 + payload.len());
    chunk.put_u32(length);
    chunk.put_slice(&payload);

    Ok(chunk.freeze())
}

/// Stream `initial` followed by every snapshot published on `rx`
pub async fn stream_from_broadcast(
    initial: FeedSnapshot,
    rx: broadcast::Receiver<FeedSnapshot>,
    compress: bool,
) -> impl IntoResponse {
    let mut updates = BroadcastStream::new(rx);
    let stream = async_stream::stream! {
        yield initial;
        while let Some(update) = updates.next().await {
            match update {
                Ok(snapshot) => yield snapshot,
                Err(BroadcastStreamRecvError::Lagged(skipped)) => {
                    tracing::warn!("Stream subscriber lagged, skipped {} snapshot(s)", skipped);
                }
            }
        }
    };

    match chunked_json_stream(stream, compress).await {
        Ok(response) => response,
        Err(status) => status.into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Buf;

    #[tokio::test]
    async fn test_frame_length_prefix() {
        let frame = serialize_chunk(&serde_json::json!({"cpu": 12.5}), false).await.unwrap();
        let mut buf = frame.clone();
        let length = buf.get_u32() as usize;
        assert_eq!(length, frame.len() - 4);
        assert_eq!(&buf[..], br#"{"cpu":12.5}"#);
    }

    #[tokio::test]
    async fn test_compressed_frame_length_prefix() {
        let frame = serialize_chunk(&vec!["running"; 64], true).await.unwrap();
        let mut buf = frame.clone();
        let length = buf.get_u32() as usize;
        assert_eq!(length, buf.remaining());
        assert!(length < serde_json::to_vec(&vec!["running"; 64]).unwrap().len());
    }
}
