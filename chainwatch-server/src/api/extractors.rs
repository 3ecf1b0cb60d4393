//! Request context extractors.
//!
//! Provides:
//! - `BlockIndex` - the `{idx}` path segment as a non-negative block index
//! - `BlockIndex0` - the `{idx0}` path segment (start of a range)
//! - `ApiStatus` - the current chain status
//!
//! Each rejects with `422 Unprocessable Entity` when its value can't be
//! resolved, before the handler runs.

use axum::{
    extract::{FromRequestParts, Path},
    http::request::Parts,
};
use chainwatch_sdk::objects::Status;
use std::collections::HashMap;

use super::ApiError;
use crate::state::AppState;

/// Block index from the `{idx}` path segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockIndex(pub u32);

/// Block index from the `{idx0}` path segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockIndex0(pub u32);

/// Current chain status.
#[derive(Debug, Clone)]
pub struct ApiStatus(pub Status);

async fn path_index<S: Send + Sync>(
    parts: &mut Parts,
    state: &S,
    name: &'static str,
) -> Result<u32, ApiError> {
    let Path(params) = Path::<HashMap<String, String>>::from_request_parts(parts, state)
        .await
        .map_err(|e| {
            tracing::error!(param = name, error = %e, "block index not set");
            ApiError::InvalidIndex
        })?;

    let raw = params.get(name).ok_or_else(|| {
        tracing::error!(param = name, "block index not set");
        ApiError::InvalidIndex
    })?;

    raw.parse::<u32>().map_err(|_| {
        tracing::debug!(param = name, value = %raw, "unresolvable block index");
        ApiError::InvalidIndex
    })
}

impl<S: Send + Sync> FromRequestParts<S> for BlockIndex {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        path_index(parts, state, "idx").await.map(BlockIndex)
    }
}

impl<S: Send + Sync> FromRequestParts<S> for BlockIndex0 {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        path_index(parts, state, "idx0").await.map(BlockIndex0)
    }
}

impl FromRequestParts<AppState> for ApiStatus {
    type Rejection = ApiError;

    async fn from_request_parts(
        _parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        state.status.current().map(ApiStatus).ok_or_else(|| {
            tracing::error!("chain status not set");
            ApiError::MissingStatus
        })
    }
}
