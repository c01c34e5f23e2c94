use super::common::parse_id;
use super::AppState;
use crate::errors::ServiceError;
use crate::models::{Product, ProductFilters};
use axum::{
    extract::{Json, Path, State},
    routing::get,
    Router,
};

/// Every product, newest first. Listing filters are not applied here.
async fn list_products(State(state): State<AppState>) -> Result<Json<Vec<Product>>, ServiceError> {
    let products = state.products.list(&ProductFilters::default()).await?;
    Ok(Json(products))
}

async fn get_product(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> Result<Json<Product>, ServiceError> {
    let id = parse_id(&raw_id).ok_or_else(|| ServiceError::not_found_product(&raw_id))?;
    let product = state
        .products
        .get(id)
        .await?
        .ok_or_else(|| ServiceError::not_found_product(id))?;
    Ok(Json(product))
}

pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/products", get(list_products))
        .route("/products/:id", get(get_product))
}
