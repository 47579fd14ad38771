pub use std::time::Duration;

pub use anyhow::Context;
pub use chrono::{NaiveDateTime as DateTime, TimeDelta, Utc};
pub use sea_orm::{
  ActiveModelTrait, ColumnTrait, ConnectionTrait, Database, DatabaseConnection,
  EntityTrait, QueryFilter, QueryOrder, Set,
};
pub use sea_orm_migration::MigratorTrait;
pub use tracing::{error, info, warn};

pub use crate::error::{Error, Result};
pub(crate) use crate::utils;
