//! Category post ("thread") entity.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Fixed set of post categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
#[serde(rename_all = "lowercase")]
pub enum PostCategory {
    #[sea_orm(string_value = "sports")]
    Sports,
    #[sea_orm(string_value = "programming")]
    Programming,
    #[sea_orm(string_value = "iot")]
    Iot,
    #[sea_orm(string_value = "general")]
    General,
    #[sea_orm(string_value = "technology")]
    Technology,
    #[sea_orm(string_value = "science")]
    Science,
    #[sea_orm(string_value = "business")]
    Business,
    #[sea_orm(string_value = "entertainment")]
    Entertainment,
    #[sea_orm(string_value = "gaming")]
    Gaming,
    #[sea_orm(string_value = "health")]
    Health,
    #[sea_orm(string_value = "education")]
    Education,
    #[sea_orm(string_value = "lifestyle")]
    Lifestyle,
    #[sea_orm(string_value = "news")]
    News,
    #[sea_orm(string_value = "politics")]
    Politics,
    #[sea_orm(string_value = "art")]
    Art,
    #[sea_orm(string_value = "music")]
    Music,
    #[sea_orm(string_value = "food")]
    Food,
    #[sea_orm(string_value = "travel")]
    Travel,
}

impl std::str::FromStr for PostCategory {
    type Err = String;

    /// Category names are matched case-insensitively ("IoT", "iot").
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let category = match s.trim().to_lowercase().as_str() {
            "sports" => Self::Sports,
            "programming" => Self::Programming,
            "iot" => Self::Iot,
            "general" => Self::General,
            "technology" => Self::Technology,
            "science" => Self::Science,
            "business" => Self::Business,
            "entertainment" => Self::Entertainment,
            "gaming" => Self::Gaming,
            "health" => Self::Health,
            "education" => Self::Education,
            "lifestyle" => Self::Lifestyle,
            "news" => Self::News,
            "politics" => Self::Politics,
            "art" => Self::Art,
            "music" => Self::Music,
            "food" => Self::Food,
            "travel" => Self::Travel,
            other => return Err(format!("Unknown category: {other}")),
        };
        Ok(category)
    }
}

impl<'de> Deserialize<'de> for PostCategory {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Post moderation status.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, EnumIter, DeriveActiveEnum, Serialize,
    Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "lowercase")]
pub enum PostStatus {
    #[default]
    #[sea_orm(string_value = "active")]
    Active,
    #[sea_orm(string_value = "closed")]
    Closed,
    #[sea_orm(string_value = "archived")]
    Archived,
}

impl std::str::FromStr for PostStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "active" => Ok(Self::Active),
            "closed" => Ok(Self::Closed),
            "archived" => Ok(Self::Archived),
            other => Err(format!("Unknown post status: {other}")),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "post")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    pub title: String,

    #[sea_orm(column_type = "Text")]
    pub content: String,

    #[sea_orm(indexed)]
    pub category: PostCategory,

    #[sea_orm(indexed)]
    pub author_id: String,

    #[sea_orm(default_value = 0)]
    pub views: i64,

    #[sea_orm(default_value = false)]
    pub is_sticky: bool,

    pub status: PostStatus,

    pub created_at: DateTimeWithTimeZone,

    pub updated_at: DateTimeWithTimeZone,
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

    #[sea_orm(has_many = "super::post_reply::Entity")]
    Replies,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Author.def()
    }
}

impl Related<super::post_reply::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Replies.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
