use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
  async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
    manager
      .create_table(
        Table::create()
          .table(Records::Table)
          .if_not_exists()
          .col(ColumnDef::new(Records::Uid).string().not_null().primary_key())
          .col(
            ColumnDef::new(Records::Username)
              .string()
              .not_null()
              .unique_key(),
          )
          .col(
            ColumnDef::new(Records::IsAdmin)
              .boolean()
              .not_null()
              .default(false),
          )
          .col(
            ColumnDef::new(Records::IsBanned)
              .boolean()
              .not_null()
              .default(false),
          )
          .col(
            ColumnDef::new(Records::LicenseTier)
              .string()
              .not_null()
              .default("none"),
          )
          .col(ColumnDef::new(Records::LicenseKey).string().null())
          .col(ColumnDef::new(Records::ExpiryDate).date_time().null())
          .col(
            ColumnDef::new(Records::Version).integer().not_null().default(0),
          )
          .col(ColumnDef::new(Records::CreatedAt).date_time().not_null())
          .to_owned(),
      )
      .await?;

    manager
      .create_index(
        Index::create()
          .name("idx_records_username")
          .table(Records::Table)
          .col(Records::Username)
          .to_owned(),
      )
      .await
  }

  async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
    manager.drop_table(Table::drop().table(Records::Table).to_owned()).await
  }
}

#[derive(DeriveIden)]
pub enum Records {
  Table,
  Uid,
  Username,
  IsAdmin,
  IsBanned,
  LicenseTier,
  LicenseKey,
  ExpiryDate,
  Version,
  CreatedAt,
}
