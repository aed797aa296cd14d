use crate::db::portable_id::IdBackend;
use crate::entities::prelude::*;
use crate::entities::users::Column;
use crate::models::password::{DIGEST_LEN, SALT_LEN};
use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let ids = IdBackend::for_backend(manager.get_database_backend());

        manager
            .create_table(
                Table::create()
                    .table(Users)
                    .if_not_exists()
                    .col(ids.column_def(Column::Id).not_null().primary_key())
                    .col(ColumnDef::new(Column::Username).string().not_null().unique_key())
                    .col(
                        ColumnDef::new(Column::Salt)
                            .binary_len(SALT_LEN as u32)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Column::PasswordHash)
                            .binary_len(DIGEST_LEN as u32)
                            .not_null(),
                    )
                    .col(ColumnDef::new(Column::Email).string().null())
                    .col(
                        ColumnDef::new(Column::Admin)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Users).to_owned())
            .await?;

        Ok(())
    }
}
