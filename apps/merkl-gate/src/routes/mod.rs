//! API routes

pub mod add;

use axum::Router;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    dto::add::{AddResponse, AddedOutputDto, ErrorResponse, PinDto},
    handlers, AppState,
};

/// OpenAPI documentation structure
#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::add::add_handler,
        handlers::blocks::get_block_handler,
        handlers::blocks::list_pins_handler,
        health_handler
    ),
    components(
        schemas(AddResponse, AddedOutputDto, PinDto, ErrorResponse)
    ),
    tags(
        (name = "add", description = "Content add endpoints"),
        (name = "blocks", description = "Stored blocks and pins"),
        (name = "health", description = "Health check endpoints")
    ),
    info(
        title = "MerklGate API",
        version = "0.1.0",
        description = "Adds file trees to Merkl content-addressed storage"
    )
)]
pub struct ApiDoc;

/// Create the main application router
pub fn create_router(state: AppState, max_upload_bytes: usize) -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .merge(add::routes(max_upload_bytes))
        .route("/health", axum::routing::get(health_handler))
        .with_state(state)
}

/// Health check endpoint
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service is healthy", body = String)
    ),
    tag = "health"
)]
async fn health_handler() -> &'static str {
    "OK"
}
