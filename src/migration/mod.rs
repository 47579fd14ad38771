//! Database migrations using SeaORM

use sea_orm_migration::prelude::*;

mod m20260810_000001_create_records;
mod m20260810_000002_create_aliases;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
  fn migrations() -> Vec<Box<dyn MigrationTrait>> {
    vec![
      Box::new(m20260810_000001_create_records::Migration),
      Box::new(m20260810_000002_create_aliases::Migration),
    ]
  }
}
