// Chunked streaming of live tick events
use crate::domain::monitor::MonitorId;
use crate::domain::telemetry::TickEvent;
use crate::infrastructure::http_response::brotli_compress;
use axum::body::Body;
use axum::http::{header, Response, StatusCode};
use axum::response::IntoResponse;
use bytes::{BufMut, Bytes, BytesMut};
use futures::stream::Stream;
use futures::StreamExt;
use tokio::sync::broadcast;
use tokio::sync::broadcast::error::RecvError;

/// Create a chunked streaming response of length-prefixed JSON events
pub fn chunked_json_stream<S>(stream: S, compress: bool) -> Result<Response<Body>, StatusCode>
where
    S: Stream<Item = TickEvent> + Send + 'static,
{
    let byte_stream = stream.then(move |event| async move { serialize_chunk(&event, compress).await });

    let body = Body::from_stream(byte_stream);

    // Chunks are compressed individually, so the response itself carries no
    // Content-Encoding header.
    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "application/x-ndjson-framed")
        .header(header::TRANSFER_ENCODING, "chunked")
        .body(body)
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)
}

/// Encode one event as a 4-byte big-endian length followed by the payload
pub async fn serialize_chunk(event: &TickEvent, compress: bool) -> Result<Bytes, std::io::Error> {
    let json = serde_json::to_vec(event)?;

    let payload = if compress {
        brotli_compress(&json).await?
    } else {
        json
    };

    let length = payload.len() as u32;
    let mut chunk = BytesMut::with_capacity(4 + payload.len());
    chunk.put_u32(length);
    chunk.put_slice(&payload);

    Ok(chunk.freeze())
}

/// Stream the events of one monitor from the live feed
pub fn stream_from_receiver(
    mut rx: broadcast::Receiver<TickEvent>,
    monitor_id: MonitorId,
    compress: bool,
) -> impl IntoResponse {
    let stream = async_stream::stream! {
        loop {
            match rx.recv().await {
                Ok(event) => {
                    if event.monitor_id == monitor_id {
                        yield event;
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!("Feed for monitor {} lagged, skipped {} ticks", monitor_id, skipped);
                }
                Err(RecvError::Closed) => break,
            }
        }
    };

    match chunked_json_stream(stream, compress) {
        Ok(response) => response,
        Err(status) => status.into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::frequency::FrequencyVariant;
    use crate::domain::telemetry::SamplePoint;
    use chrono::Utc;

    fn event(monitor_id: MonitorId, tick_number: u64) -> TickEvent {
        TickEvent {
            monitor_id,
            frequency: FrequencyVariant::Hz2,
            tick_number,
            total_ticks: tick_number,
            timestamp: Utc::now(),
            samples: vec![SamplePoint {
                sub_cycle: 1,
                degree: 90,
                time: 0.125,
                planned: 50.0,
                actual: 51.2,
            }],
        }
    }

    #[tokio::test]
    async fn test_chunk_is_length_prefixed() {
        let chunk = serialize_chunk(&event(1, 3), false).await.unwrap();
        let length = u32::from_be_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]) as usize;
        assert_eq!(length, chunk.len() - 4);

        let decoded: serde_json::Value = serde_json::from_slice(&chunk[4..]).unwrap();
        assert_eq!(decoded["tick_number"], 3);
        assert_eq!(decoded["frequency"], "2hz");
        assert_eq!(decoded["samples"][0]["degree"], 90);
    }

    #[tokio::test]
    async fn test_stream_filters_other_monitors() {
        let (tx, rx) = broadcast::channel(8);
        let response = stream_from_receiver(rx, 2, false).into_response();

        tx.send(event(1, 1)).unwrap();
        tx.send(event(2, 1)).unwrap();
        tx.send(event(2, 2)).unwrap();
        drop(tx);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let mut ticks = Vec::new();
        let mut rest = &body[..];
        while !rest.is_empty() {
            let length = u32::from_be_bytes([rest[0], rest[1], rest[2], rest[3]]) as usize;
            let decoded: serde_json::Value = serde_json::from_slice(&rest[4..4 + length]).unwrap();
            assert_eq!(decoded["monitor_id"], 2);
            ticks.push(decoded["tick_number"].as_u64().unwrap());
            rest = &rest[4 + length..];
        }
        assert_eq!(ticks, vec![1, 2]);
    }
}
