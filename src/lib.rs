use std::any::Any;
use std::sync::Arc;

use axum::{http::StatusCode, response::Response, Router};
use sea_orm::DatabaseConnection;
use tower_http::{catch_panic::CatchPanicLayer, services::ServeDir};

pub mod config;
pub mod db;
pub mod entities;
pub mod errors;
pub mod handlers;
pub mod middleware_helpers;
pub mod models;
pub mod services;
pub mod tracing;
pub mod views;

// App state definition
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<DatabaseConnection>,
    pub config: config::AppConfig,
    pub products: services::ProductService,
}

impl AppState {
    pub fn new(db: Arc<DatabaseConnection>, config: config::AppConfig) -> Self {
        let products = services::ProductService::new(db.clone());
        Self {
            db,
            config,
            products,
        }
    }
}

/// Full application router: HTML pages, JSON API, static assets and the
/// 404 fallback, wrapped in panic recovery, HTTP tracing and request ids.
pub fn app_router(state: AppState) -> Router {
    let static_files = ServeDir::new(&state.config.static_dir);

    Router::new()
        .merge(handlers::products::product_routes())
        .nest("/api", handlers::api::api_routes())
        .nest_service("/static", static_files)
        .fallback(handlers::products::not_found)
        .with_state(state)
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(crate::tracing::configure_http_tracing())
        .layer(axum::middleware::from_fn(
            middleware_helpers::request_id_middleware,
        ))
}

fn panic_response(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.as_str()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        *s
    } else {
        "unknown panic payload"
    };
    ::tracing::error!(panic = %detail, "request handler panicked");
    views::error_page(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
}
