use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use super::{handlers, AppState};

pub fn create_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(handlers::index))
        .route("/search", get(handlers::search))
        .route("/posts", post(handlers::create_post))
        .route("/posts/create", get(handlers::new_post))
        .route(
            "/posts/:id",
            get(handlers::show_post).post(handlers::update_post),
        )
        .route("/posts/:id/edit", get(handlers::edit_post))
        .route("/posts/:id/delete", post(handlers::delete_post))
        .route("/health", get(handlers::health))
}
