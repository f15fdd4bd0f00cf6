//! Ledger schema.
//!
//! A single `transactions` table: one row per recorded entry, scoped by the
//! conversation it was written in.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(Iden)]
enum Transactions {
    Table,
    Id,
    ConversationKey,
    Timestamp,
    Amount,
    Description,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Transactions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Transactions::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Transactions::ConversationKey)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Transactions::Timestamp).date_time().not_null())
                    .col(ColumnDef::new(Transactions::Amount).big_integer().not_null())
                    .col(
                        ColumnDef::new(Transactions::Description)
                            .string()
                            .not_null()
                            .default("No description"),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx-transactions-conversation_key")
                    .table(Transactions::Table)
                    .col(Transactions::ConversationKey)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(
                Index::drop()
                    .name("idx-transactions-conversation_key")
                    .table(Transactions::Table)
                    .to_owned(),
            )
            .await?;

        manager
            .drop_table(Table::drop().table(Transactions::Table).to_owned())
            .await
    }
}
