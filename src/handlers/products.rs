use super::common::{parse_id, ListQuery, ProductBody};
use super::AppState;
use crate::errors::PageError;
use crate::models::{Product, ProductInput, CATEGORY_SUGGESTIONS};
use crate::views::{self, format_price, ProductView};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
    Router,
};
use tera::Context;
use tracing::info;

/// Listing page with filters, categories in use and stock statistics.
async fn index(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Response, PageError> {
    let filters = query.to_filters();
    let produtos = state.products.list(&filters).await?;
    let categorias = state.products.distinct_categories().await?;
    let estatisticas = state.products.statistics().await?;

    let rows: Vec<ProductView> = produtos.iter().map(ProductView::from).collect();
    let mut context = Context::new();
    context.insert("produtos", &rows);
    context.insert("categorias", &categorias);
    context.insert("estatisticas", &estatisticas);
    context.insert("preco_medio", &format_price(estatisticas.preco_medio));
    context.insert("filtros", &query.echo());

    Ok(views::render("index.html", &context, StatusCode::OK))
}

fn form_page(titulo: &str, produto: Option<&Product>) -> Response {
    let mut context = Context::new();
    context.insert("titulo", titulo);
    context.insert("produto", &produto.map(ProductView::from));
    context.insert("categorias", &CATEGORY_SUGGESTIONS);
    views::render("form.html", &context, StatusCode::OK)
}

async fn new_form() -> Response {
    form_page("New Product", None)
}

async fn create(
    State(state): State<AppState>,
    ProductBody(form): ProductBody,
) -> Result<Redirect, PageError> {
    let input = ProductInput::try_from(form)?;
    let nome = input.nome.clone();
    let id = state.products.create(input).await?;
    info!("Product created: {} (id {})", nome, id);
    Ok(Redirect::to(&format!("/products/{}", id)))
}

async fn show(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> Result<Response, PageError> {
    let id = parse_id(&raw_id).ok_or_else(PageError::not_found)?;
    let produto = state
        .products
        .get(id)
        .await?
        .ok_or_else(PageError::not_found)?;

    let mut context = Context::new();
    context.insert("produto", &ProductView::from(&produto));
    Ok(views::render("details.html", &context, StatusCode::OK))
}

async fn edit_form(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> Result<Response, PageError> {
    let id = parse_id(&raw_id).ok_or_else(PageError::not_found)?;
    let produto = state
        .products
        .get(id)
        .await?
        .ok_or_else(PageError::not_found)?;

    Ok(form_page("Edit Product", Some(&produto)))
}

async fn update(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
    ProductBody(form): ProductBody,
) -> Result<Redirect, PageError> {
    let id = parse_id(&raw_id).ok_or_else(PageError::not_found)?;
    let input = ProductInput::try_from(form)?;
    let nome = input.nome.clone();

    if state.products.update(id, input).await? == 0 {
        return Err(PageError::not_found());
    }

    info!("Product updated: {} (id {})", nome, id);
    Ok(Redirect::to(&format!("/products/{}", id)))
}

async fn delete(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> Result<Redirect, PageError> {
    let id = parse_id(&raw_id).ok_or_else(PageError::not_found)?;

    if state.products.delete(id).await? == 0 {
        return Err(PageError::not_found());
    }

    info!("Product deleted: id {}", id);
    Ok(Redirect::to("/"))
}

/// Fallback for every unmatched route.
pub async fn not_found() -> impl IntoResponse {
    views::not_found_page()
}

pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(index))
        .route("/new-form", get(new_form))
        .route("/products", post(create))
        .route("/products/:id", get(show))
        .route("/products/:id/edit", get(edit_form))
        .route("/products/:id/update", post(update))
        .route("/products/:id/delete", post(delete))
}
