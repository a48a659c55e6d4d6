use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "file")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    /// Sanitized name the upload is stored under.
    #[sea_orm(column_type = "String(StringLen::N(128))")]
    pub filename: String,

    #[sea_orm(has_many)]
    pub songs: HasMany<super::song::Entity>,
}

impl ActiveModelBehavior for ActiveModel {}
