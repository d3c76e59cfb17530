use axum::{middleware, Router};
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::errors::{attach_error_path, handle_panic};
use crate::routes::{accounts, health};
use crate::state::AppState;

pub fn create_app(state: AppState) -> Router {
    Router::<AppState>::new()
        .nest("/health", health::router())
        .nest("/accounts", accounts::router())
        .nest("/api/accounts", accounts::router())
        .with_state(state)
        // panic responses must pass through attach_error_path
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(middleware::from_fn(attach_error_path))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
