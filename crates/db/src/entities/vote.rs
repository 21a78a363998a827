//! Vote entity (likes and dislikes).
//!
//! One row per user per target. The unique index on
//! `(user_id, target_type, target_id)` keeps a user out of both the like
//! and the dislike set of the same item.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Kind of item a vote applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "snake_case")]
pub enum VoteTarget {
    #[sea_orm(string_value = "topic")]
    Topic,
    #[sea_orm(string_value = "topic_reply")]
    TopicReply,
    #[sea_orm(string_value = "post")]
    Post,
    #[sea_orm(string_value = "post_reply")]
    PostReply,
}

/// Like or dislike.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(8))")]
#[serde(rename_all = "lowercase")]
pub enum VoteKind {
    #[sea_orm(string_value = "like")]
    Like,
    #[sea_orm(string_value = "dislike")]
    Dislike,
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "vote")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    pub user_id: String,

    pub target_type: VoteTarget,

    /// ID of the topic, post or reply voted on
    pub target_id: String,

    pub kind: VoteKind,

    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id",
        on_delete = "Cascade"
    )]
    User,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
