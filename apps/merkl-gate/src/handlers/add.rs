//! Add handler

use std::sync::Arc;

use axum::{
    extract::{Multipart, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use merkl_dag::new_adder;
use merkl_domain::{adder::output_channel, AddParams};
use tracing::{error, info};

use super::status_for;
use crate::{
    dto::add::{AddResponse, AddedOutputDto, ErrorResponse},
    source::MultipartFileSource,
    AppState,
};

/// Add the files of a multipart body
///
/// Add options come from the query string, e.g.
/// `/add?layout=trickle&raw-leaves=true&cid-version=1&hash-fun=blake3&progress=true`.
#[utoipa::path(
    post,
    path = "/add",
    request_body(content = String, content_type = "multipart/form-data", description = "One part per file; directory parts use application/x-directory"),
    responses(
        (status = 201, description = "Content added and pinned", body = AddResponse),
        (status = 400, description = "Bad add parameters or malformed body", body = ErrorResponse),
        (status = 503, description = "Add cancelled by shutdown", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "add"
)]
pub async fn add_handler(
    State(state): State<AppState>,
    Query(params): Query<AddParams>,
    multipart: Multipart,
) -> impl IntoResponse {
    info!(params = ?params, "Received add request");

    let (tx, mut rx) = output_channel();
    let collector = tokio::spawn(async move {
        let mut outputs = Vec::new();
        while let Some(output) = rx.recv().await {
            outputs.push(AddedOutputDto::from(output));
        }
        outputs
    });

    let adder = new_adder(Arc::clone(&state.dag), params, Some(tx));
    let result = adder
        .ingest(&state.shutdown, MultipartFileSource::new(multipart))
        .await;
    let outputs = collector.await.unwrap_or_default();

    match result {
        Ok(cid) => {
            info!(cid = %cid, files = outputs.len(), "Successfully added content");
            (
                StatusCode::CREATED,
                Json(AddResponse {
                    cid: cid.to_string(),
                    outputs,
                }),
            )
                .into_response()
        }
        Err(err) => {
            error!(error = ?err, "Failed to add content");
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
