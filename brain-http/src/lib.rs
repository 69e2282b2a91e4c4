#![deny(missing_docs)]
//! HTTP surface for the Brain (SPEC_FULL.md §4.10).
//!
//! One unauthenticated health route, one bearer-token-gated router for
//! everything else: the synchronous and streaming chat loop, CRUD over
//! conversations/messages/memories/secrets/skills/schedules/config, and
//! hook forwarding for external plugin triggers.

mod auth;
mod error;
mod routes;
mod state;

pub use error::ApiError;
pub use state::AppState;

use axum::routing::{delete, get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Build the full router. `state` is cloned into every handler (it's an
/// `Arc` internally, so this is cheap).
pub fn router(state: AppState) -> Router {
    let gated = Router::new()
        .route("/chat", post(routes::chat::chat))
        .route("/chat/stream", post(routes::chat::chat_stream))
        .route("/conversations", get(routes::conversations::list).post(routes::conversations::create))
        .route("/conversations/:id", get(routes::conversations::get))
        .route(
            "/conversations/:id/messages",
            get(routes::messages::list).post(routes::messages::create),
        )
        .route("/memories", post(routes::memories::create))
        .route("/memories/search", get(routes::memories::search))
        .route("/memories/:id", delete(routes::memories::delete))
        .route("/secrets/:key", get(routes::secrets::get).put(routes::secrets::put).delete(routes::secrets::delete))
        .route("/secrets/restart", post(routes::secrets::restart))
        .route("/skills", get(routes::skills::list).put(routes::skills::put))
        .route("/skills/:id", get(routes::skills::get).delete(routes::skills::delete))
        .route("/schedules", get(routes::schedules::list).post(routes::schedules::create))
        .route(
            "/schedules/:id",
            get(routes::schedules::get).put(routes::schedules::update).delete(routes::schedules::delete),
        )
        .route("/schedules/:id/trigger", post(routes::schedules::trigger))
        .route("/config/:key", get(routes::config::get).put(routes::config::put))
        .route("/hooks/:plugin", post(routes::hooks::trigger))
        .route_layer(axum::middleware::from_fn_with_state(state.clone(), auth::require_bearer));

    Router::new()
        .route("/ping", get(ping))
        .merge(gated)
        .layer(CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn ping() -> &'static str {
    "pong"
}
