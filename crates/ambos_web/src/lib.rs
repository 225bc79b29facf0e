use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;

pub mod alerts;
pub mod handlers;
pub mod state;

pub use alerts::AlertDispatcher;
pub use state::AppState;

pub fn create_app(state: AppState) -> Router {
    let cors = CorsLayer::permissive();

    Router::new()
        .route("/api/search", post(handlers::search))
        .route("/api/enrich", post(handlers::enrich))
        .route("/api/analyze", post(handlers::analyze))
        .route("/api/sources", get(handlers::list_sources))
        .route(
            "/api/layouts/:id",
            get(handlers::get_layout)
                .put(handlers::put_layout)
                .delete(handlers::delete_layout),
        )
        .route("/api/alerts/trigger", post(handlers::trigger_alert))
        .layer(cors)
        .with_state(Arc::new(state))
}

pub mod prelude {
    pub use crate::{create_app, AlertDispatcher, AppState};
    pub use ambos_core::{Article, Error, Result};
}
