use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "pictures")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub filename_thumb: String,
    pub filename_medium: String,
    pub filename_original: String,
    #[sea_orm(column_type = "String(StringLen::N(100))")]
    pub creator: String,
    pub date: Date,
    #[sea_orm(column_type = "String(StringLen::N(100))")]
    pub project: String,
    #[sea_orm(column_type = "String(StringLen::N(50))", nullable)]
    pub color: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
