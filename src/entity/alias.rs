//! Username alias entity - maps a lowercased username to the login email
//! and account id. Keys are stored lowercased, so login resolution is
//! case-insensitive by construction.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "aliases")]
pub struct Model {
  #[sea_orm(primary_key, auto_increment = false)]
  pub username: String,
  pub email: String,
  pub uid: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
  #[sea_orm(
    belongs_to = "super::record::Entity",
    from = "Column::Uid",
    to = "super::record::Column::Uid"
  )]
  Record,
}

impl Related<super::record::Entity> for Entity {
  fn to() -> RelationDef {
    Relation::Record.def()
  }
}

impl ActiveModelBehavior for ActiveModel {}
