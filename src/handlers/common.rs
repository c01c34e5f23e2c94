use crate::errors::{PageError, ServiceError};
use crate::models::{ProductFilters, ProductInput};
use axum::{
    extract::{FromRequest, Request},
    http::{header, HeaderValue},
    Form, Json,
};
use serde::{Deserialize, Deserializer, Serialize};

/// Query string accepted by the listing page. Values stay raw so the page
/// can echo them back into the filter form.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct ListQuery {
    pub search: Option<String>,
    pub categoria: Option<String>,
    #[serde(rename = "minPrice")]
    pub min_price: Option<String>,
    #[serde(rename = "maxPrice")]
    pub max_price: Option<String>,
    pub ativo: Option<String>,
}

/// Raw filter values as shown in the filter form; absent values become "".
#[derive(Debug, Default, Clone, PartialEq, Serialize)]
pub struct FilterEcho {
    pub search: String,
    pub categoria: String,
    #[serde(rename = "minPrice")]
    pub min_price: String,
    #[serde(rename = "maxPrice")]
    pub max_price: String,
    pub ativo: String,
}

impl ListQuery {
    /// Blank values are ignored and prices that do not parse are skipped.
    pub fn to_filters(&self) -> ProductFilters {
        ProductFilters {
            search: non_blank(&self.search).map(str::to_string),
            categoria: non_blank(&self.categoria).map(str::to_string),
            min_price: parse_price(&self.min_price),
            max_price: parse_price(&self.max_price),
            ativo: non_blank(&self.ativo).map(|v| v == "true"),
        }
    }

    pub fn echo(&self) -> FilterEcho {
        FilterEcho {
            search: self.search.clone().unwrap_or_default(),
            categoria: self.categoria.clone().unwrap_or_default(),
            min_price: self.min_price.clone().unwrap_or_default(),
            max_price: self.max_price.clone().unwrap_or_default(),
            ativo: self.ativo.clone().unwrap_or_default(),
        }
    }
}

/// Body of the create and edit requests, url-encoded or JSON.
///
/// Every value is kept as text so both encodings go through the same
/// conversion; JSON numbers and booleans are rendered to their text form.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct ProductForm {
    #[serde(default, deserialize_with = "scalar_as_text")]
    pub nome: Option<String>,
    #[serde(default, deserialize_with = "scalar_as_text")]
    pub descricao: Option<String>,
    #[serde(default, deserialize_with = "scalar_as_text")]
    pub preco: Option<String>,
    #[serde(default, deserialize_with = "scalar_as_text")]
    pub estoque: Option<String>,
    #[serde(default, deserialize_with = "scalar_as_text")]
    pub categoria: Option<String>,
    /// Checkbox: only present when ticked.
    #[serde(default, deserialize_with = "scalar_as_text")]
    pub ativo: Option<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Scalar {
    Text(String),
    Integer(i64),
    Float(f64),
    Flag(bool),
}

fn scalar_as_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Scalar>::deserialize(deserializer)?;
    Ok(value.map(|scalar| match scalar {
        Scalar::Text(text) => text,
        Scalar::Integer(n) => n.to_string(),
        Scalar::Float(x) => x.to_string(),
        Scalar::Flag(flag) => flag.to_string(),
    }))
}

/// Extracts a [`ProductForm`] from either a url-encoded or a JSON body,
/// chosen by `Content-Type`. A request without a content type is read as a
/// form. Malformed or unsupported bodies render the HTML error view.
#[derive(Debug)]
pub struct ProductBody(pub ProductForm);

#[axum::async_trait]
impl<S> FromRequest<S> for ProductBody
where
    S: Send + Sync,
{
    type Rejection = PageError;

    async fn from_request(mut req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let content_type = req
            .headers()
            .get(header::CONTENT_TYPE)
            .map(|v| v.to_str().unwrap_or_default().to_ascii_lowercase());

        match content_type.as_deref() {
            Some(ct) if ct.starts_with("application/json") => {
                let Json(form) = Json::<ProductForm>::from_request(req, state)
                    .await
                    .map_err(|rejection| invalid_body(rejection.body_text()))?;
                Ok(ProductBody(form))
            }
            Some(ct) if ct.starts_with("application/x-www-form-urlencoded") => {
                read_form(req, state).await
            }
            None => {
                req.headers_mut().insert(
                    header::CONTENT_TYPE,
                    HeaderValue::from_static("application/x-www-form-urlencoded"),
                );
                read_form(req, state).await
            }
            Some(other) => Err(invalid_body(format!(
                "unsupported content type '{}'",
                other
            ))),
        }
    }
}

async fn read_form<S>(req: Request, state: &S) -> Result<ProductBody, PageError>
where
    S: Send + Sync,
{
    let Form(form) = Form::<ProductForm>::from_request(req, state)
        .await
        .map_err(|rejection| invalid_body(rejection.body_text()))?;
    Ok(ProductBody(form))
}

fn invalid_body(detail: String) -> PageError {
    PageError(ServiceError::InvalidInput(detail))
}

impl TryFrom<ProductForm> for ProductInput {
    type Error = ServiceError;

    fn try_from(form: ProductForm) -> Result<Self, Self::Error> {
        let preco = match non_blank(&form.preco) {
            None => {
                return Err(ServiceError::ValidationError(
                    "preco is required".to_string(),
                ))
            }
            Some(raw) => raw.trim().parse::<f64>().map_err(|_| {
                ServiceError::ValidationError(format!("preco must be a number, got '{}'", raw))
            })?,
        };

        let estoque = match non_blank(&form.estoque) {
            None => None,
            Some(raw) => Some(raw.trim().parse::<i32>().map_err(|_| {
                ServiceError::ValidationError(format!("estoque must be an integer, got '{}'", raw))
            })?),
        };

        Ok(ProductInput {
            nome: form.nome.unwrap_or_default(),
            descricao: form.descricao,
            preco,
            estoque,
            categoria: form.categoria,
            ativo: Some(form.ativo.as_deref() == Some("true")),
        })
    }
}

/// Path ids that are not integers are treated as missing records.
pub fn parse_id(raw: &str) -> Option<i32> {
    raw.trim().parse::<i32>().ok()
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.trim().is_empty())
}

fn parse_price(value: &Option<String>) -> Option<f64> {
    non_blank(value)
        .and_then(|v| v.trim().parse::<f64>().ok())
        .filter(|v| v.is_finite())
}
