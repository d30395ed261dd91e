use sea_orm_migration::prelude::*;

use crate::m20260801_000001_actors::Actors;
use crate::m20260801_000002_labels::Labels;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Transactions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Transactions::Uuid)
                            .string_len(36)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Transactions::Date).date().not_null())
                    .col(
                        ColumnDef::new(Transactions::Amount)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Transactions::LabelName).string().not_null())
                    .col(
                        ColumnDef::new(Transactions::SenderName)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Transactions::ReceiverName)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Transactions::Flags).integer().not_null())
                    .col(ColumnDef::new(Transactions::Headers).text().not_null())
                    .col(
                        ColumnDef::new(Transactions::CreatedAt)
                            .timestamp()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Transactions::UpdatedAt)
                            .timestamp()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-transactions-label_name")
                            .from(Transactions::Table, Transactions::LabelName)
                            .to(Labels::Table, Labels::Name),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-transactions-sender_name")
                            .from(Transactions::Table, Transactions::SenderName)
                            .to(Actors::Table, Actors::Name),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-transactions-receiver_name")
                            .from(Transactions::Table, Transactions::ReceiverName)
                            .to(Actors::Table, Actors::Name),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-transactions-date")
                    .table(Transactions::Table)
                    .col(Transactions::Date)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Transactions::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
pub enum Transactions {
    Table,
    Uuid,
    Date,
    Amount,
    LabelName,
    SenderName,
    ReceiverName,
    Flags,
    Headers,
    CreatedAt,
    UpdatedAt,
}
