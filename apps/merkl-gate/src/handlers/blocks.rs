//! Block and pin handlers

use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use merkl_domain::{ports::DagService, Cid};
use tracing::warn;

use super::status_for;
use crate::{
    dto::add::{ErrorResponse, PinDto},
    AppState,
};

/// Fetch the encoded bytes of a stored block
#[utoipa::path(
    get,
    path = "/blocks/{cid}",
    params(("cid" = String, Path, description = "Block identifier")),
    responses(
        (status = 200, description = "Block bytes", content_type = "application/octet-stream", body = Vec<u8>),
        (status = 400, description = "Malformed identifier", body = ErrorResponse),
        (status = 404, description = "Unknown block", body = ErrorResponse)
    ),
    tag = "blocks"
)]
pub async fn get_block_handler(State(state): State<AppState>, Path(cid): Path<String>) -> Response {
    let cid: Cid = match cid.parse() {
        Ok(cid) => cid,
        Err(err) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse {
                    error: err.to_string(),
                }),
            )
                .into_response()
        }
    };

    match state.dag.get(&cid).await {
        Ok(node) => (
            [(header::CONTENT_TYPE, "application/octet-stream")],
            node.encoded().clone(),
        )
            .into_response(),
        Err(err) => {
            warn!(cid = %cid, error = ?err, "Failed to fetch block");
            (
                status_for(&err),
                Json(ErrorResponse {
                    error: err.to_string(),
                }),
            )
                .into_response()
        }
    }
}

/// List roots pinned by this node
#[utoipa::path(
    get,
    path = "/pins",
    responses(
        (status = 200, description = "Pinned roots, oldest first", body = Vec<PinDto>)
    ),
    tag = "blocks"
)]
pub async fn list_pins_handler(State(state): State<AppState>) -> Json<Vec<PinDto>> {
    Json(state.dag.pins().into_iter().map(PinDto::from).collect())
}
