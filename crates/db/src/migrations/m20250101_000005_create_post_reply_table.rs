//! Create post reply table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(PostReply::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(PostReply::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(PostReply::PostId).string_len(32).not_null())
                    .col(ColumnDef::new(PostReply::AuthorId).string_len(32).not_null())
                    .col(ColumnDef::new(PostReply::Content).text().not_null())
                    .col(
                        ColumnDef::new(PostReply::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_post_reply_post")
                            .from(PostReply::Table, PostReply::PostId)
                            .to(Post::Table, Post::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_post_reply_author")
                            .from(PostReply::Table, PostReply::AuthorId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Index: (post_id, created_at) for listing replies in order
        manager
            .create_index(
                Index::create()
                    .name("idx_post_reply_post_created_at")
                    .table(PostReply::Table)
                    .col(PostReply::PostId)
                    .col(PostReply::CreatedAt)
                    .to_owned(),
            )
            .await?;

        // Index: author_id (for a user's responses)
        manager
            .create_index(
                Index::create()
                    .name("idx_post_reply_author_id")
                    .table(PostReply::Table)
                    .col(PostReply::AuthorId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(PostReply::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum PostReply {
    Table,
    Id,
    PostId,
    AuthorId,
    Content,
    CreatedAt,
}

#[derive(Iden)]
enum Post {
    Table,
    Id,
}

#[derive(Iden)]
enum User {
    Table,
    Id,
}
