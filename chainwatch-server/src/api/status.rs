use axum::response::Response;

use super::extractors::ApiStatus;
use super::{ApiError, json_response, text_response};

/// `GET /status` - current chain status.
pub(super) async fn status(ApiStatus(status): ApiStatus) -> Result<Response, ApiError> {
    json_response(&status)
}

/// `GET /status/height` - best block height as plain text.
pub(super) async fn current_height(ApiStatus(status): ApiStatus) -> Response {
    text_response(status.height.to_string())
}
