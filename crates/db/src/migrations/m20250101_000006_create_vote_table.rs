//! Create vote table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Vote::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Vote::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Vote::UserId).string_len(32).not_null())
                    .col(ColumnDef::new(Vote::TargetType).string_len(16).not_null())
                    .col(ColumnDef::new(Vote::TargetId).string_len(32).not_null())
                    .col(ColumnDef::new(Vote::Kind).string_len(8).not_null())
                    .col(
                        ColumnDef::new(Vote::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_vote_user")
                            .from(Vote::Table, Vote::UserId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Unique index: one vote per user per target
        manager
            .create_index(
                Index::create()
                    .name("idx_vote_user_target")
                    .table(Vote::Table)
                    .col(Vote::UserId)
                    .col(Vote::TargetType)
                    .col(Vote::TargetId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // Index: (target_type, target_id, kind) for counting
        manager
            .create_index(
                Index::create()
                    .name("idx_vote_target_kind")
                    .table(Vote::Table)
                    .col(Vote::TargetType)
                    .col(Vote::TargetId)
                    .col(Vote::Kind)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Vote::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Vote {
    Table,
    Id,
    UserId,
    TargetType,
    TargetId,
    Kind,
    CreatedAt,
}

#[derive(Iden)]
enum User {
    Table,
    Id,
}
