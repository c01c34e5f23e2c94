use sea_orm::entity::prelude::*;

/// Stored product row.
///
/// `ativo` lives in SQLite as 0/1; sea-orm decodes it to `bool`. Callers outside
/// the store work with [`crate::models::Product`] instead of this row type.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "products")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub nome: String,

    pub descricao: Option<String>,

    #[sea_orm(column_type = "Double")]
    pub preco: f64,

    pub estoque: i32,

    pub categoria: Option<String>,

    pub ativo: bool,

    pub criado_em: DateTimeUtc,

    pub atualizado_em: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
