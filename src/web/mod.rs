pub mod handlers;
pub mod routes;
mod views;

#[cfg(test)]
mod tests;

use axum::Router;
use std::sync::Arc;
use tower_cookies::CookieManagerLayer;
use tower_http::{services::ServeDir, trace::TraceLayer};

use crate::{api::PostsApi, Config};

#[derive(Clone)]
pub struct AppState {
    pub api: Arc<dyn PostsApi>,
    pub config: Config,
}

impl AppState {
    pub fn new(api: Arc<dyn PostsApi>, config: Config) -> Arc<Self> {
        Arc::new(Self { api, config })
    }
}

pub fn app(state: Arc<AppState>) -> Router {
    Router::new()
        .merge(routes::create_routes())
        .nest_service("/static", ServeDir::new("static"))
        .layer(CookieManagerLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn serve(addr: String, state: Arc<AppState>) -> crate::Result<()> {
    let app = app(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Web server listening on {}", addr);

    axum::serve(listener, app)
        .await
        .map_err(|e| crate::Error::Internal(e.to_string()))?;

    Ok(())
}
