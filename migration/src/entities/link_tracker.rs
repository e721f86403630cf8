//! Campaign link tracker entity

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "link_trackers")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Short opaque code, uppercase, unique
    #[sea_orm(unique)]
    pub code: String,
    pub product_id: i64,
    pub variant_id: Option<i64>,
    /// PDP | ADD_TO_CART
    pub target: String,
    pub redirect_to: Option<String>,
    pub label: String,
    pub medium: Option<String>,
    /// Fully-built public URL for this tracker
    #[sea_orm(column_type = "Text")]
    pub url: String,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
