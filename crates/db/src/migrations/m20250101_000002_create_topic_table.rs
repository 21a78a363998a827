//! Create trending topic table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Topic::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Topic::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Topic::Title).string_len(256).not_null())
                    .col(ColumnDef::new(Topic::Content).text().not_null())
                    .col(ColumnDef::new(Topic::Topic).string_len(128).not_null())
                    .col(ColumnDef::new(Topic::AuthorId).string_len(32).not_null())
                    .col(
                        ColumnDef::new(Topic::Tags)
                            .json_binary()
                            .not_null()
                            .default(Expr::cust("'[]'::jsonb")),
                    )
                    .col(
                        ColumnDef::new(Topic::Views)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Topic::TrendingScore)
                            .double()
                            .not_null()
                            .default(0.0),
                    )
                    .col(ColumnDef::new(Topic::TrendingRank).integer())
                    .col(
                        ColumnDef::new(Topic::Status)
                            .string_len(16)
                            .not_null()
                            .default("rising"),
                    )
                    .col(
                        ColumnDef::new(Topic::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Topic::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Topic::LastActivityAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_topic_author")
                            .from(Topic::Table, Topic::AuthorId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Index: (trending_score, created_at) for the trending feed sort
        manager
            .create_index(
                Index::create()
                    .name("idx_topic_score_created_at")
                    .table(Topic::Table)
                    .col((Topic::TrendingScore, IndexOrder::Desc))
                    .col((Topic::CreatedAt, IndexOrder::Desc))
                    .to_owned(),
            )
            .await?;

        // Index: topic (for subject filtering)
        manager
            .create_index(
                Index::create()
                    .name("idx_topic_topic")
                    .table(Topic::Table)
                    .col(Topic::Topic)
                    .to_owned(),
            )
            .await?;

        // Index: author_id (for listing a user's topics)
        manager
            .create_index(
                Index::create()
                    .name("idx_topic_author_id")
                    .table(Topic::Table)
                    .col(Topic::AuthorId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Topic::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Topic {
    Table,
    Id,
    Title,
    Content,
    Topic,
    AuthorId,
    Tags,
    Views,
    TrendingScore,
    TrendingRank,
    Status,
    CreatedAt,
    UpdatedAt,
    LastActivityAt,
}

#[derive(Iden)]
enum User {
    Table,
    Id,
}
