//! User entity.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Avatar assigned to users who have not set one.
pub const DEFAULT_IMAGE: &str = "default-avatar.png";

/// User roles.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    #[default]
    #[sea_orm(string_value = "user")]
    User,
    #[sea_orm(string_value = "moderator")]
    Moderator,
    #[sea_orm(string_value = "admin")]
    Admin,
}

impl UserRole {
    /// Whether the role may moderate content.
    #[must_use]
    pub const fn is_moderator(self) -> bool {
        matches!(self, Self::Moderator | Self::Admin)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "user")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    pub name: String,

    /// Stored trimmed and lowercased
    #[sea_orm(unique)]
    pub email: String,

    /// Argon2 PHC string
    #[serde(skip_serializing)]
    pub password_hash: String,

    #[sea_orm(column_type = "Text", nullable)]
    pub bio: Option<String>,

    /// Avatar image reference
    pub image: String,

    pub role: UserRole,

    pub created_at: DateTimeWithTimeZone,

    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::post::Entity")]
    Posts,

    #[sea_orm(has_many = "super::topic::Entity")]
    Topics,
}

impl Related<super::post::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Posts.def()
    }
}

impl Related<super::topic::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Topics.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
