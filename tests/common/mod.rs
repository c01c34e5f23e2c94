#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request},
    response::Response,
    Router,
};
use inventory_web::{
    config::AppConfig,
    db::{self, DbConfig},
    models::ProductInput,
    services::ProductService,
    AppState,
};
use serde_json::Value;
use tower::ServiceExt;

/// Opens a fresh in-memory store with the schema in place.
///
/// An in-memory SQLite database lives inside one connection, so the pool is
/// capped at a single connection.
pub async fn memory_store() -> ProductService {
    let pool = db::establish_connection_with_config(&DbConfig {
        url: "sqlite::memory:".to_string(),
        max_connections: 1,
        min_connections: 1,
        ..Default::default()
    })
    .await
    .expect("failed to open in-memory sqlite");

    let store = ProductService::new(Arc::new(pool));
    store
        .initialize()
        .await
        .expect("failed to create products table");
    store
}

/// Helper harness for driving the full router against an in-memory SQLite database.
pub struct TestApp {
    router: Router,
    pub state: AppState,
}

impl TestApp {
    /// Construct a new test application with fresh database state.
    pub async fn new() -> Self {
        let mut cfg = AppConfig::new(
            "sqlite::memory:".to_string(),
            "127.0.0.1".to_string(),
            0,
            "test".to_string(),
        );
        cfg.db_max_connections = 1;
        cfg.db_min_connections = 1;
        cfg.static_dir = concat!(env!("CARGO_MANIFEST_DIR"), "/public").to_string();

        let pool = db::establish_connection_from_app_config(&cfg)
            .await
            .expect("failed to create test database");

        let state = AppState::new(Arc::new(pool), cfg);
        state
            .products
            .initialize()
            .await
            .expect("failed to create products table");

        let router = inventory_web::app_router(state.clone());
        Self { router, state }
    }

    pub fn store(&self) -> &ProductService {
        &self.state.products
    }

    /// Seed a product straight through the store.
    pub async fn seed(&self, input: ProductInput) -> i32 {
        self.state
            .products
            .create(input)
            .await
            .expect("failed to seed product")
    }

    /// Send a request against the router.
    pub async fn request(&self, method: Method, uri: &str, body: Body) -> Response {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .body(body)
            .expect("failed to build request");
        self.send(request).await
    }

    pub async fn get(&self, uri: &str) -> Response {
        self.request(Method::GET, uri, Body::empty()).await
    }

    /// POST a url-encoded form, the way the HTML pages submit.
    pub async fn post_form(&self, uri: &str, fields: &[(&str, &str)]) -> Response {
        let body = serde_urlencoded::to_string(fields).expect("failed to encode form body");
        let request = Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body))
            .expect("failed to build request");
        self.send(request).await
    }

    /// POST a JSON body, the way API clients submit.
    pub async fn post_json(&self, uri: &str, body: &Value) -> Response {
        self.post_body(uri, Some("application/json"), body.to_string())
            .await
    }

    /// POST a raw body with an optional content type.
    pub async fn post_body(
        &self,
        uri: &str,
        content_type: Option<&str>,
        body: impl Into<Body>,
    ) -> Response {
        let mut builder = Request::builder().method(Method::POST).uri(uri);
        if let Some(content_type) = content_type {
            builder = builder.header(header::CONTENT_TYPE, content_type);
        }
        let request = builder.body(body.into()).expect("failed to build request");
        self.send(request).await
    }

    async fn send(&self, request: Request<Body>) -> Response {
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("router error during test request")
    }
}

pub async fn response_text(response: Response) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("response body bytes");
    String::from_utf8(bytes.to_vec()).expect("utf-8 response body")
}

pub async fn response_json(response: Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("response body bytes");
    serde_json::from_slice(&bytes).expect("json response")
}

pub fn content_type(response: &Response) -> String {
    response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string()
}

pub fn location(response: &Response) -> Option<&str> {
    response
        .headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
}

/// Product input with every field populated.
pub fn product(nome: &str, preco: f64, estoque: i32, categoria: &str) -> ProductInput {
    ProductInput {
        nome: nome.to_string(),
        descricao: Some(format!("{} description", nome)),
        preco,
        estoque: Some(estoque),
        categoria: Some(categoria.to_string()),
        ativo: Some(true),
    }
}
