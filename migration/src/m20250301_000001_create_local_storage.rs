use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(LocalStorage::Table)
                    .if_not_exists()
                    .col(string(LocalStorage::Key).primary_key())
                    .col(text(LocalStorage::Value))
                    .col(big_integer(LocalStorage::UpdatedAt))
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(LocalStorage::Table).to_owned()).await?;
        Ok(())
    }
}

#[derive(DeriveIden)]
enum LocalStorage {
    Table,
    Key,
    Value,
    UpdatedAt,
}
