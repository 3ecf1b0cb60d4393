//! Block data handlers.

use axum::{
    body::{Body, Bytes},
    extract::State,
    response::Response,
};
use chainwatch_core::store::BlockDataReader;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;

use super::extractors::{BlockIndex, BlockIndex0};
use super::{ApiError, json_response, json_stream_response};
use crate::state::AppState;

/// Serialized range elements buffered ahead of the client.
const RANGE_STREAM_BUFFER: usize = 16;

/// `GET /block/best` - summary of the best block.
pub(super) async fn latest_block(State(state): State<AppState>) -> Result<Response, ApiError> {
    let summary = state.store.best_block_summary().await;
    if summary.is_none() {
        tracing::error!("Unable to get latest block summary");
    }
    json_response(&summary)
}

/// `GET /block/{idx}` - block summary.
pub(super) async fn block_summary(
    State(state): State<AppState>,
    BlockIndex(idx): BlockIndex,
) -> Result<Response, ApiError> {
    let summary = state.store.summary(idx).await;
    if summary.is_none() {
        tracing::error!(idx, "Unable to get block summary");
    }
    json_response(&summary)
}

/// `GET /block/{idx}/header` - block header.
pub(super) async fn block_header(
    State(state): State<AppState>,
    BlockIndex(idx): BlockIndex,
) -> Result<Response, ApiError> {
    let header = state.store.header(idx).await;
    if header.is_none() {
        tracing::error!(idx, "Unable to get block header");
    }
    json_response(&header)
}

/// `GET /block/{idx}/fee` - ticket fee info.
pub(super) async fn block_fee_info(
    State(state): State<AppState>,
    BlockIndex(idx): BlockIndex,
) -> Result<Response, ApiError> {
    let fee_info = state.store.fee_info(idx).await;
    if fee_info.is_none() {
        tracing::error!(idx, "Unable to get block fee info");
    }
    json_response(&fee_info)
}

/// `GET /block/{idx}/stake` - extended stake info.
pub(super) async fn block_stake_info(
    State(state): State<AppState>,
    BlockIndex(idx): BlockIndex,
) -> Result<Response, ApiError> {
    let stake_info = state.store.stake_info_extended(idx).await;
    if stake_info.is_none() {
        tracing::error!(idx, "Unable to get block stake info");
    }
    json_response(&stake_info)
}

/// `GET /block/range/{idx0}/{idx}` - summaries for `idx0..=idx`.
///
/// Indices missing from the store are returned as `null` in place. An
/// inverted range yields an empty array. The array is streamed, so memory
/// stays bounded for wide ranges.
pub(super) async fn block_range_summary(
    State(state): State<AppState>,
    BlockIndex0(idx0): BlockIndex0,
    BlockIndex(idx): BlockIndex,
) -> Response {
    // TODO: check that the store holds every block in range before fetching.
    let (tx, rx) = mpsc::channel(RANGE_STREAM_BUFFER);
    tokio::spawn(stream_range_summaries(state.store, idx0, idx, tx));
    json_stream_response(Body::from_stream(ReceiverStream::new(rx)))
}

type ChunkSender = mpsc::Sender<Result<Bytes, serde_json::Error>>;

/// Write the JSON array for `idx0..=idx` into `tx`, one element per chunk.
async fn stream_range_summaries(
    store: Arc<dyn BlockDataReader>,
    idx0: u32,
    idx: u32,
    tx: ChunkSender,
) {
    if tx.send(Ok(Bytes::from_static(b"["))).await.is_err() {
        return;
    }
    if idx0 <= idx {
        for i in idx0..=idx {
            let summary = store.summary(i).await;
            let mut chunk = if i == idx0 { Vec::new() } else { vec![b','] };
            if let Err(e) = serde_json::to_writer(&mut chunk, &summary) {
                tracing::info!(error = %e, "JSON encode error");
                let _ = tx.send(Err(e)).await;
                return;
            }
            if tx.send(Ok(Bytes::from(chunk))).await.is_err() {
                tracing::debug!(idx0, idx, at = i, "Range response dropped by client");
                return;
            }
        }
    }
    let _ = tx.send(Ok(Bytes::from_static(b"]"))).await;
}
