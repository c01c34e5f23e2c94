use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::entities::product;

/// Category stored when a product is saved without one.
pub const DEFAULT_CATEGORY: &str = "Outros";

/// Categories offered by the create/edit form.
pub const CATEGORY_SUGGESTIONS: [&str; 5] = ["Electronics", "Clothing", "Food", "Books", "Other"];

/// Upper bound (inclusive) of the "low stock" band used by the statistics.
pub const LOW_STOCK_THRESHOLD: i32 = 10;

/// A product record as seen by everything above the store.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: i32,
    pub nome: String,
    pub descricao: String,
    pub preco: f64,
    pub estoque: i32,
    pub categoria: String,
    pub ativo: bool,
    pub criado_em: DateTime<Utc>,
    pub atualizado_em: DateTime<Utc>,
}

impl Product {
    /// True when the product has stock but no more than [`LOW_STOCK_THRESHOLD`] units.
    pub fn is_low_stock(&self) -> bool {
        self.estoque > 0 && self.estoque <= LOW_STOCK_THRESHOLD
    }
}

impl From<product::Model> for Product {
    fn from(row: product::Model) -> Self {
        Self {
            id: row.id,
            nome: row.nome,
            descricao: row.descricao.unwrap_or_default(),
            preco: row.preco,
            estoque: row.estoque,
            categoria: row
                .categoria
                .unwrap_or_else(|| DEFAULT_CATEGORY.to_string()),
            ativo: row.ativo,
            criado_em: row.criado_em,
            atualizado_em: row.atualizado_em,
        }
    }
}

/// Payload for create and update. Update replaces every field, so both
/// operations share the same defaulting rules.
#[derive(Clone, Debug, PartialEq, Deserialize, Validate)]
pub struct ProductInput {
    #[validate(custom = "validate_nome")]
    pub nome: String,

    #[serde(default)]
    pub descricao: Option<String>,

    #[validate(custom = "validate_preco")]
    pub preco: f64,

    #[serde(default)]
    pub estoque: Option<i32>,

    #[serde(default)]
    pub categoria: Option<String>,

    #[serde(default)]
    pub ativo: Option<bool>,
}

impl ProductInput {
    /// Input with only the required fields set; everything else takes its default.
    pub fn new(nome: impl Into<String>, preco: f64) -> Self {
        Self {
            nome: nome.into(),
            descricao: None,
            preco,
            estoque: None,
            categoria: None,
            ativo: None,
        }
    }

    pub fn descricao_or_default(&self) -> String {
        self.descricao.clone().unwrap_or_default()
    }

    pub fn estoque_or_default(&self) -> i32 {
        self.estoque.unwrap_or(0)
    }

    /// Blank categories fall back to [`DEFAULT_CATEGORY`] as well.
    pub fn categoria_or_default(&self) -> String {
        match self.categoria.as_deref().map(str::trim) {
            Some(categoria) if !categoria.is_empty() => categoria.to_string(),
            _ => DEFAULT_CATEGORY.to_string(),
        }
    }

    pub fn ativo_or_default(&self) -> bool {
        self.ativo.unwrap_or(true)
    }
}

fn validate_nome(nome: &str) -> Result<(), ValidationError> {
    if nome.trim().is_empty() {
        let mut err = ValidationError::new("nome");
        err.message = Some("nome is required".into());
        return Err(err);
    }
    Ok(())
}

fn validate_preco(preco: f64) -> Result<(), ValidationError> {
    if !preco.is_finite() {
        let mut err = ValidationError::new("preco");
        err.message = Some("preco must be a finite number".into());
        return Err(err);
    }
    Ok(())
}

/// Optional narrowing for [`crate::services::product_service::ProductService::list`].
/// Every populated field is ANDed with the others.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ProductFilters {
    /// Substring matched against `nome` or `descricao`.
    pub search: Option<String>,
    pub categoria: Option<String>,
    /// Inclusive lower bound on `preco`.
    pub min_price: Option<f64>,
    /// Inclusive upper bound on `preco`.
    pub max_price: Option<f64>,
    pub ativo: Option<bool>,
}

/// Aggregates over active products only. Every field is zero when there are none.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ProductStatistics {
    pub total: i64,
    pub com_estoque: i64,
    pub sem_estoque: i64,
    pub estoque_baixo: i64,
    pub preco_medio: f64,
    pub total_estoque: i64,
}
