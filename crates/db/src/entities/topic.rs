//! Trending topic entity.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Lifecycle label of a trending topic, set by its author.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, EnumIter, DeriveActiveEnum, Serialize,
    Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "lowercase")]
pub enum TopicStatus {
    #[default]
    #[sea_orm(string_value = "rising")]
    Rising,
    #[sea_orm(string_value = "trending")]
    Trending,
    #[sea_orm(string_value = "falling")]
    Falling,
    #[sea_orm(string_value = "archived")]
    Archived,
}

impl std::str::FromStr for TopicStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "rising" => Ok(Self::Rising),
            "trending" => Ok(Self::Trending),
            "falling" => Ok(Self::Falling),
            "archived" => Ok(Self::Archived),
            other => Err(format!("Unknown topic status: {other}")),
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "topic")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    pub title: String,

    #[sea_orm(column_type = "Text")]
    pub content: String,

    /// Free-text subject tag used for filtering
    #[sea_orm(indexed)]
    pub topic: String,

    #[sea_orm(indexed)]
    pub author_id: String,

    /// Array of tag strings
    #[sea_orm(column_type = "JsonBinary")]
    pub tags: Json,

    #[sea_orm(default_value = 0)]
    pub views: i64,

    /// Score as of the last ranking pass or view
    pub trending_score: f64,

    /// Position within the page computed by the last ranking pass
    #[sea_orm(nullable)]
    pub trending_rank: Option<i32>,

    pub status: TopicStatus,

    pub created_at: DateTimeWithTimeZone,

    pub updated_at: DateTimeWithTimeZone,

    /// Last time replies or votes changed
    pub last_activity_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::AuthorId",
        to = "super::user::Column::Id",
        on_delete = "Cascade"
    )]
    Author,

    #[sea_orm(has_many = "super::topic_reply::Entity")]
    Replies,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Author.def()
    }
}

impl Related<super::topic_reply::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Replies.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
