//! Server-rendered pages.
//!
//! Templates are compiled into the binary and parsed once into a shared
//! [`Tera`] instance. Rendering never fails outward: if a template cannot be
//! rendered the caller gets a minimal inline HTML page instead.

use std::sync::OnceLock;

use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use serde::Serialize;
use tera::{Context, Tera};

use crate::models::Product;

const TEMPLATES: [(&str, &str); 6] = [
    ("layout.html", include_str!("../../templates/layout.html")),
    ("index.html", include_str!("../../templates/index.html")),
    ("form.html", include_str!("../../templates/form.html")),
    ("details.html", include_str!("../../templates/details.html")),
    ("404.html", include_str!("../../templates/404.html")),
    ("error.html", include_str!("../../templates/error.html")),
];

static ENGINE: OnceLock<Tera> = OnceLock::new();

fn engine() -> &'static Tera {
    ENGINE.get_or_init(|| {
        let mut tera = Tera::default();
        match tera.add_raw_templates(TEMPLATES) {
            Ok(()) => tera,
            Err(e) => {
                tracing::error!(error = %e, "failed to load page templates");
                Tera::default()
            }
        }
    })
}

/// A product plus the display-only values the templates need.
#[derive(Debug, Serialize)]
pub struct ProductView<'a> {
    #[serde(flatten)]
    pub product: &'a Product,
    pub preco_formatado: String,
    pub estoque_baixo: bool,
}

impl<'a> From<&'a Product> for ProductView<'a> {
    fn from(product: &'a Product) -> Self {
        Self {
            product,
            preco_formatado: format_price(product.preco),
            estoque_baixo: product.is_low_stock(),
        }
    }
}

pub fn format_price(value: f64) -> String {
    format!("{:.2}", value)
}

/// Renders `template` with `status`, or the fallback error page on failure.
pub fn render(template: &str, context: &Context, status: StatusCode) -> Response {
    match engine().render(template, context) {
        Ok(html) => (status, Html(html)).into_response(),
        Err(e) => {
            tracing::error!(template, error = %e, "template rendering failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Html(fallback_page(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error",
                )),
            )
                .into_response()
        }
    }
}

pub fn not_found_page() -> Response {
    let status = StatusCode::NOT_FOUND;
    match engine().render("404.html", &Context::new()) {
        Ok(html) => (status, Html(html)).into_response(),
        Err(e) => {
            tracing::error!(error = %e, "template rendering failed");
            (status, Html(fallback_page(status, "Page not found"))).into_response()
        }
    }
}

/// Generic error view. `message` must already be safe to show to users.
pub fn error_page(status: StatusCode, message: &str) -> Response {
    let mut context = Context::new();
    context.insert("status", &status.as_u16());
    context.insert("reason", status.canonical_reason().unwrap_or("Error"));
    context.insert("message", message);

    match engine().render("error.html", &context) {
        Ok(html) => (status, Html(html)).into_response(),
        Err(e) => {
            tracing::error!(error = %e, "template rendering failed");
            (status, Html(fallback_page(status, message))).into_response()
        }
    }
}

fn fallback_page(status: StatusCode, message: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html>\n<head><title>{code} {reason}</title></head>\n\
         <body>\n<h1>{code} {reason}</h1>\n<p>{message}</p>\n<p><a href=\"/\">Back to products</a></p>\n</body>\n</html>\n",
        code = status.as_u16(),
        reason = status.canonical_reason().unwrap_or("Error"),
        message = tera::escape_html(message),
    )
}
