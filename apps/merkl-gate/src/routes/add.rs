//! Add and block routes

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::{
    handlers::{
        add::add_handler,
        blocks::{get_block_handler, list_pins_handler},
    },
    AppState,
};

/// Create add and block routes
///
/// Upload bodies may be up to `max_upload_bytes`; the extractor default of
/// 2 MiB would cap every add.
pub fn routes(max_upload_bytes: usize) -> Router<AppState> {
    let add_route = Router::new()
        .route("/add", post(add_handler))
        .layer(DefaultBodyLimit::max(max_upload_bytes));

    Router::new()
        .merge(add_route)
        .route("/blocks/:cid", get(get_block_handler))
        .route("/pins", get(list_pins_handler))
}
