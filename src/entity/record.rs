//! License record entity - one row per account, keyed by the identity
//! provider's account id.

use chrono::NaiveDateTime;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// License tier. The string values are the persisted schema and the wire
/// format; anything else is rejected at the API boundary.
#[derive(
  Clone, Copy, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize,
  Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "Text")]
pub enum Tier {
  #[sea_orm(string_value = "none")]
  #[serde(rename = "none")]
  None,
  #[sea_orm(string_value = "30-day")]
  #[serde(rename = "30-day")]
  ThirtyDay,
  #[sea_orm(string_value = "1-year")]
  #[serde(rename = "1-year")]
  OneYear,
  #[sea_orm(string_value = "lifetime")]
  #[serde(rename = "lifetime")]
  Lifetime,
}

impl Default for Tier {
  fn default() -> Self {
    Self::None
  }
}

impl std::fmt::Display for Tier {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    let name = match self {
      Self::None => "none",
      Self::ThirtyDay => "30-day",
      Self::OneYear => "1-year",
      Self::Lifetime => "lifetime",
    };
    f.write_str(name)
  }
}

impl std::str::FromStr for Tier {
  type Err = crate::error::Error;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "none" => Ok(Self::None),
      "30-day" => Ok(Self::ThirtyDay),
      "1-year" => Ok(Self::OneYear),
      "lifetime" => Ok(Self::Lifetime),
      other => Err(crate::error::Error::InvalidTier(other.to_string())),
    }
  }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "records")]
#[serde(rename_all = "camelCase")]
pub struct Model {
  #[sea_orm(primary_key, auto_increment = false)]
  pub uid: String,
  #[sea_orm(unique)]
  pub username: String,
  pub is_admin: bool,
  pub is_banned: bool,
  pub license_tier: Tier,
  pub license_key: Option<String>,
  pub expiry_date: Option<NaiveDateTime>,
  /// Optimistic-concurrency token, bumped on every write.
  pub version: i32,
  pub created_at: NaiveDateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
  #[sea_orm(has_one = "super::alias::Entity")]
  Alias,
}

impl Related<super::alias::Entity> for Entity {
  fn to() -> RelationDef {
    Relation::Alias.def()
  }
}

impl ActiveModelBehavior for ActiveModel {}
