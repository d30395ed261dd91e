use sea_orm_migration::prelude::*;

use crate::m20260801_000002_labels::Labels;
use crate::m20260801_000003_transactions::Transactions;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Details::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Details::Uuid)
                            .string_len(36)
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Details::TransactionUuid)
                            .string_len(36)
                            .not_null(),
                    )
                    .col(ColumnDef::new(Details::LabelName).string().not_null())
                    .col(ColumnDef::new(Details::Amount).big_integer().not_null())
                    .col(ColumnDef::new(Details::Flags).integer().not_null())
                    .col(ColumnDef::new(Details::Headers).text().not_null())
                    .col(ColumnDef::new(Details::CreatedAt).timestamp().not_null())
                    .col(ColumnDef::new(Details::UpdatedAt).timestamp().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-details-transaction_uuid")
                            .from(Details::Table, Details::TransactionUuid)
                            .to(Transactions::Table, Transactions::Uuid),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-details-label_name")
                            .from(Details::Table, Details::LabelName)
                            .to(Labels::Table, Labels::Name),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-details-transaction_uuid")
                    .table(Details::Table)
                    .col(Details::TransactionUuid)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Details::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
pub enum Details {
    Table,
    Uuid,
    TransactionUuid,
    LabelName,
    Amount,
    Flags,
    Headers,
    CreatedAt,
    UpdatedAt,
}
