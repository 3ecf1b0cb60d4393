//! Explorer read API.
//!
//! # Endpoints
//!
//! - `GET /`                          – liveness probe
//! - `GET /status`                    – chain status
//! - `GET /status/height`             – best height, plain text
//! - `GET /block/best`                – best block summary
//! - `GET /block/{idx}`               – block summary
//! - `GET /block/{idx}/header`        – block header
//! - `GET /block/{idx}/fee`           – ticket fee info
//! - `GET /block/{idx}/stake`         – extended stake info
//! - `GET /block/range/{idx0}/{idx}`  – block summaries in `[idx0, idx]`
//!
//! Store misses are logged and serialized as `null` rather than turned into
//! an HTTP error; clients detect missing data themselves.

use axum::{
    Router,
    body::Body,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};
use serde::Serialize;

use crate::state::AppState;

mod block;
pub mod extractors;
mod status;

/// Body of the liveness probe.
pub const ROOT_BODY: &str = "chainwatch api running";

/// Build the API router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(root))
        .route("/status", get(status::status))
        .route("/status/height", get(status::current_height))
        .route("/block/best", get(block::latest_block))
        .route("/block/range/{idx0}/{idx}", get(block::block_range_summary))
        .route("/block/{idx}", get(block::block_summary))
        .route("/block/{idx}/header", get(block::block_header))
        .route("/block/{idx}/fee", get(block::block_fee_info))
        .route("/block/{idx}/stake", get(block::block_stake_info))
        .fallback(not_found)
}

/// `GET /` - liveness probe.
async fn root() -> &'static str {
    ROOT_BODY
}

async fn not_found() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, "404 page not found")
}

// ---------------------------------------------------------------------------
// Shared error type
// ---------------------------------------------------------------------------

/// Errors that can occur in API handlers.
#[derive(Debug)]
pub enum ApiError {
    /// A block index in the path is missing, malformed or negative.
    InvalidIndex,
    /// No chain status has been published yet.
    MissingStatus,
    Encode(serde_json::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::InvalidIndex | ApiError::MissingStatus => {
                StatusCode::UNPROCESSABLE_ENTITY.into_response()
            }
            ApiError::Encode(e) => {
                tracing::info!(error = %e, "JSON encode error");
                StatusCode::INTERNAL_SERVER_ERROR.into_response()
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Response helpers
// ---------------------------------------------------------------------------

const JSON_CONTENT_TYPE: &str = "application/json; charset=utf-8";
const TEXT_CONTENT_TYPE: &str = "text/plain; charset=utf-8";

/// Serialize `value` as a JSON response with an explicit charset.
pub(crate) fn json_response<T: Serialize>(value: &T) -> Result<Response, ApiError> {
    let body = serde_json::to_vec(value).map_err(ApiError::Encode)?;
    Ok(([(header::CONTENT_TYPE, JSON_CONTENT_TYPE)], body).into_response())
}

/// JSON response whose body is produced incrementally.
pub(crate) fn json_stream_response(body: Body) -> Response {
    ([(header::CONTENT_TYPE, JSON_CONTENT_TYPE)], body).into_response()
}

pub(crate) fn text_response(body: String) -> Response {
    ([(header::CONTENT_TYPE, TEXT_CONTENT_TYPE)], body).into_response()
}
