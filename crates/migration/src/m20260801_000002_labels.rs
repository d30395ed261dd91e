use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Labels::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Labels::Name)
                            .string_len(100)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Labels::ParentName).string_len(100))
                    .col(ColumnDef::new(Labels::Flags).integer().not_null())
                    .col(ColumnDef::new(Labels::Headers).text().not_null())
                    .col(ColumnDef::new(Labels::CreatedAt).timestamp().not_null())
                    .col(ColumnDef::new(Labels::UpdatedAt).timestamp().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-labels-parent_name")
                            .from(Labels::Table, Labels::ParentName)
                            .to(Labels::Table, Labels::Name),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Labels::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
pub enum Labels {
    Table,
    Name,
    ParentName,
    Flags,
    Headers,
    CreatedAt,
    UpdatedAt,
}
