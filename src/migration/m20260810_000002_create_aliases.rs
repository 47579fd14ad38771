use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
  async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
    manager
      .create_table(
        Table::create()
          .table(Aliases::Table)
          .if_not_exists()
          .col(
            ColumnDef::new(Aliases::Username)
              .string()
              .not_null()
              .primary_key(),
          )
          .col(ColumnDef::new(Aliases::Email).string().not_null())
          .col(ColumnDef::new(Aliases::Uid).string().not_null())
          .to_owned(),
      )
      .await?;

    manager
      .create_index(
        Index::create()
          .name("idx_aliases_uid")
          .table(Aliases::Table)
          .col(Aliases::Uid)
          .to_owned(),
      )
      .await
  }

  async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
    manager.drop_table(Table::drop().table(Aliases::Table).to_owned()).await
  }
}

#[derive(DeriveIden)]
pub enum Aliases {
  Table,
  Username,
  Email,
  Uid,
}
