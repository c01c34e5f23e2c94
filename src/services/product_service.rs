use std::sync::Arc;

use chrono::Utc;
use sea_orm::{
    sea_query::{ColumnDef, Expr, Index, LikeExpr, Table},
    ActiveValue::Set,
    ColumnTrait, Condition, ConnectionTrait, EntityTrait, FromQueryResult, QueryFilter,
    QueryOrder, QuerySelect,
};
use tracing::instrument;
use validator::Validate;

use crate::{
    db::DbPool,
    entities::product::{self, Column as ProductColumn, Entity as ProductEntity},
    errors::ServiceError,
    models::product::{
        Product, ProductFilters, ProductInput, ProductStatistics, LOW_STOCK_THRESHOLD,
    },
};

/// Raw aggregate row; SQL aggregates come back NULL over an empty set.
#[derive(Debug, FromQueryResult)]
struct StatisticsRow {
    total: Option<i64>,
    com_estoque: Option<i64>,
    sem_estoque: Option<i64>,
    estoque_baixo: Option<i64>,
    preco_medio: Option<f64>,
    total_estoque: Option<i64>,
}

impl From<StatisticsRow> for ProductStatistics {
    fn from(row: StatisticsRow) -> Self {
        Self {
            total: row.total.unwrap_or(0),
            com_estoque: row.com_estoque.unwrap_or(0),
            sem_estoque: row.sem_estoque.unwrap_or(0),
            estoque_baixo: row.estoque_baixo.unwrap_or(0),
            preco_medio: row.preco_medio.unwrap_or(0.0),
            total_estoque: row.total_estoque.unwrap_or(0),
        }
    }
}

/// Sole gateway to the `products` table.
///
/// Each method is a single statement against the shared pool; there are no
/// transactions spanning calls. Failures come back as
/// [`ServiceError::DatabaseError`] with the driver message intact, and nothing
/// here logs: the HTTP layer decides what to report.
#[derive(Clone)]
pub struct ProductService {
    db_pool: Arc<DbPool>,
}

impl ProductService {
    pub fn new(db_pool: Arc<DbPool>) -> Self {
        Self { db_pool }
    }

    /// Creates the `products` table and its ordering index when missing.
    /// Safe to run on every start.
    #[instrument(level = "debug", skip(self))]
    pub async fn initialize(&self) -> Result<(), ServiceError> {
        let db = &*self.db_pool;
        let backend = db.get_database_backend();

        let table = Table::create()
            .table(ProductEntity)
            .if_not_exists()
            .col(
                ColumnDef::new(ProductColumn::Id)
                    .integer()
                    .not_null()
                    .auto_increment()
                    .primary_key(),
            )
            .col(ColumnDef::new(ProductColumn::Nome).text().not_null())
            .col(ColumnDef::new(ProductColumn::Descricao).text().null())
            .col(ColumnDef::new(ProductColumn::Preco).double().not_null())
            .col(
                ColumnDef::new(ProductColumn::Estoque)
                    .integer()
                    .not_null()
                    .default(0),
            )
            .col(ColumnDef::new(ProductColumn::Categoria).text().null())
            .col(
                ColumnDef::new(ProductColumn::Ativo)
                    .boolean()
                    .not_null()
                    .default(true),
            )
            .col(
                ColumnDef::new(ProductColumn::CriadoEm)
                    .timestamp_with_time_zone()
                    .not_null()
                    .default(Expr::current_timestamp()),
            )
            .col(
                ColumnDef::new(ProductColumn::AtualizadoEm)
                    .timestamp_with_time_zone()
                    .not_null()
                    .default(Expr::current_timestamp()),
            )
            .to_owned();
        db.execute(backend.build(&table)).await?;

        let index = Index::create()
            .if_not_exists()
            .name("idx_products_criado_em")
            .table(ProductEntity)
            .col(ProductColumn::CriadoEm)
            .to_owned();
        db.execute(backend.build(&index)).await?;

        Ok(())
    }

    /// Inserts a product and returns its new id. Both timestamps share one clock reading.
    #[instrument(level = "debug", skip(self))]
    pub async fn create(&self, input: ProductInput) -> Result<i32, ServiceError> {
        input.validate()?;

        let now = Utc::now();
        let mut row = assign_fields(&input);
        row.criado_em = Set(now);
        row.atualizado_em = Set(now);

        let result = ProductEntity::insert(row).exec(&*self.db_pool).await?;
        Ok(result.last_insert_id)
    }

    /// `Ok(None)` is the not-found outcome.
    #[instrument(level = "debug", skip(self))]
    pub async fn get(&self, id: i32) -> Result<Option<Product>, ServiceError> {
        let row = ProductEntity::find_by_id(id).one(&*self.db_pool).await?;
        Ok(row.map(Product::from))
    }

    /// Products matching every populated filter, newest first.
    #[instrument(level = "debug", skip(self))]
    pub async fn list(&self, filters: &ProductFilters) -> Result<Vec<Product>, ServiceError> {
        let mut query = ProductEntity::find();

        if let Some(search) = filters.search.as_deref().filter(|s| !s.is_empty()) {
            let pattern = substring_pattern(search);
            query = query.filter(
                Condition::any()
                    .add(ProductColumn::Nome.like(LikeExpr::new(pattern.clone()).escape('\\')))
                    .add(
                        ProductColumn::Descricao.like(LikeExpr::new(pattern).escape('\\')),
                    ),
            );
        }

        if let Some(categoria) = filters.categoria.as_deref().filter(|c| !c.is_empty()) {
            query = query.filter(ProductColumn::Categoria.eq(categoria));
        }

        if let Some(min_price) = filters.min_price {
            query = query.filter(ProductColumn::Preco.gte(min_price));
        }

        if let Some(max_price) = filters.max_price {
            query = query.filter(ProductColumn::Preco.lte(max_price));
        }

        if let Some(ativo) = filters.ativo {
            query = query.filter(ProductColumn::Ativo.eq(ativo));
        }

        let rows = query
            .order_by_desc(ProductColumn::CriadoEm)
            .order_by_desc(ProductColumn::Id)
            .all(&*self.db_pool)
            .await?;

        Ok(rows.into_iter().map(Product::from).collect())
    }

    /// Overwrites every editable field and refreshes `atualizado_em`.
    /// Returns the number of rows touched; 0 means no product has that id.
    #[instrument(level = "debug", skip(self))]
    pub async fn update(&self, id: i32, input: ProductInput) -> Result<u64, ServiceError> {
        input.validate()?;

        let mut changes = assign_fields(&input);
        changes.atualizado_em = Set(Utc::now());

        let result = ProductEntity::update_many()
            .set(changes)
            .filter(ProductColumn::Id.eq(id))
            .exec(&*self.db_pool)
            .await?;

        Ok(result.rows_affected)
    }

    /// Hard delete. Returns the number of rows removed; 0 means no product has that id.
    #[instrument(level = "debug", skip(self))]
    pub async fn delete(&self, id: i32) -> Result<u64, ServiceError> {
        let result = ProductEntity::delete_by_id(id)
            .exec(&*self.db_pool)
            .await?;
        Ok(result.rows_affected)
    }

    /// Categories currently in use, ascending and without duplicates.
    #[instrument(level = "debug", skip(self))]
    pub async fn distinct_categories(&self) -> Result<Vec<String>, ServiceError> {
        let categories = ProductEntity::find()
            .select_only()
            .column(ProductColumn::Categoria)
            .distinct()
            .filter(ProductColumn::Categoria.is_not_null())
            .order_by_asc(ProductColumn::Categoria)
            .into_tuple::<String>()
            .all(&*self.db_pool)
            .await?;

        Ok(categories)
    }

    /// Stock and price aggregates over active products.
    #[instrument(level = "debug", skip(self))]
    pub async fn statistics(&self) -> Result<ProductStatistics, ServiceError> {
        let row = ProductEntity::find()
            .select_only()
            .column_as(Expr::cust("COUNT(*)"), "total")
            .column_as(
                Expr::cust("SUM(CASE WHEN estoque > 0 THEN 1 ELSE 0 END)"),
                "com_estoque",
            )
            .column_as(
                Expr::cust("SUM(CASE WHEN estoque = 0 THEN 1 ELSE 0 END)"),
                "sem_estoque",
            )
            .column_as(
                Expr::cust(format!(
                    "SUM(CASE WHEN estoque > 0 AND estoque <= {} THEN 1 ELSE 0 END)",
                    LOW_STOCK_THRESHOLD
                )),
                "estoque_baixo",
            )
            .column_as(Expr::cust("AVG(preco)"), "preco_medio")
            .column_as(Expr::cust("SUM(estoque)"), "total_estoque")
            .filter(ProductColumn::Ativo.eq(true))
            .into_model::<StatisticsRow>()
            .one(&*self.db_pool)
            .await?;

        Ok(row.map(ProductStatistics::from).unwrap_or_default())
    }
}

/// Editable columns with create/update defaulting applied. Timestamps are left unset.
/// `%text%` with LIKE metacharacters escaped, so user input matches literally.
fn substring_pattern(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len() + 2);
    escaped.push('%');
    for c in text.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

fn assign_fields(input: &ProductInput) -> product::ActiveModel {
    product::ActiveModel {
        nome: Set(input.nome.clone()),
        descricao: Set(Some(input.descricao_or_default())),
        preco: Set(input.preco),
        estoque: Set(input.estoque_or_default()),
        categoria: Set(Some(input.categoria_or_default())),
        ativo: Set(input.ativo_or_default()),
        ..Default::default()
    }
}
