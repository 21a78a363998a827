//! Create topic reply table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(TopicReply::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(TopicReply::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(TopicReply::TopicId).string_len(32).not_null())
                    .col(ColumnDef::new(TopicReply::AuthorId).string_len(32).not_null())
                    .col(ColumnDef::new(TopicReply::Content).text().not_null())
                    .col(
                        ColumnDef::new(TopicReply::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_topic_reply_topic")
                            .from(TopicReply::Table, TopicReply::TopicId)
                            .to(Topic::Table, Topic::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_topic_reply_author")
                            .from(TopicReply::Table, TopicReply::AuthorId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Index: (topic_id, created_at) for listing replies in order
        manager
            .create_index(
                Index::create()
                    .name("idx_topic_reply_topic_created_at")
                    .table(TopicReply::Table)
                    .col(TopicReply::TopicId)
                    .col(TopicReply::CreatedAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(TopicReply::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum TopicReply {
    Table,
    Id,
    TopicId,
    AuthorId,
    Content,
    CreatedAt,
}

#[derive(Iden)]
enum Topic {
    Table,
    Id,
}

#[derive(Iden)]
enum User {
    Table,
    Id,
}
