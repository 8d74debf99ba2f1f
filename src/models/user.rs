use super::{id_column, with_soft_delete, with_timestamps};
use crate::constants::USERS_TABLE;
use crate::schema::{ColumnDef, ColumnType, Model, ModelDescriptor};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

string_enum! {
    UserRole {
        Admin => "admin",
        Editor => "editor",
        Author => "author",
    } default Author
}

string_enum! {
    UserStatus {
        Active => "active",
        Suspended => "suspended",
        Banned => "banned",
    } default Active
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Option<i64>,
    pub name: String,
    pub email: String,
    /// Password hash, never the plain text
    #[serde(skip_serializing)]
    pub password: String,
    pub bio: Option<String>,
    pub avatar: Option<String>,
    #[serde(default)]
    pub role: UserRole,
    #[serde(default)]
    pub status: UserStatus,
    pub last_login_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl User {
    pub fn is_active(&self) -> bool {
        self.status == UserStatus::Active && self.deleted_at.is_none()
    }
}

impl Model for User {
    fn descriptor() -> ModelDescriptor {
        let descriptor = ModelDescriptor::new("User", USERS_TABLE)
            .column(id_column())
            .column(ColumnDef::new("name", ColumnType::Varchar(255)).not_null())
            .column(ColumnDef::new("email", ColumnType::Varchar(255)).not_null())
            .column(ColumnDef::new("password", ColumnType::Varchar(255)).not_null())
            .column(ColumnDef::new("bio", ColumnType::Text))
            .column(ColumnDef::new("avatar", ColumnType::Varchar(512)))
            .column(
                ColumnDef::new("role", ColumnType::Varchar(50))
                    .not_null()
                    .default_text(UserRole::default().as_str()),
            )
            .column(
                ColumnDef::new("status", ColumnType::Varchar(20))
                    .not_null()
                    .default_text(UserStatus::default().as_str()),
            )
            .column(ColumnDef::new("last_login_at", ColumnType::Timestamp))
            .unique_index("email");
        with_soft_delete(with_timestamps(descriptor))
    }
}
