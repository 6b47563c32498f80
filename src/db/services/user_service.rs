use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, Set};

use crate::db::entities::{prelude::*, user};

// --- User Service Functions ---

/// Creates a new, active user.
pub async fn create_user(
    db: &DatabaseConnection,
    email: &str,
    hashed_password: &str,
) -> Result<user::Model, DbErr> {
    let new_user = user::ActiveModel {
        email: Set(email.to_string()),
        hashed_password: Set(hashed_password.to_string()),
        is_active: Set(true),
        created_at: Set(Utc::now()),
        ..Default::default()
    };
    new_user.insert(db).await
}

/// Retrieves a user by their ID.
pub async fn get_user_by_id(db: &DatabaseConnection, user_id: i32) -> Result<Option<user::Model>, DbErr> {
    User::find_by_id(user_id).one(db).await
}

/// Retrieves a user by their email.
pub async fn get_user_by_email(db: &DatabaseConnection, email: &str) -> Result<Option<user::Model>, DbErr> {
    User::find()
        .filter(user::Column::Email.eq(email))
        .one(db)
        .await
}

/// Flips the activation flag, the only mutable attribute of an account.
pub async fn set_user_active(db: &DatabaseConnection, user_id: i32, is_active: bool) -> Result<Option<user::Model>, DbErr> {
    let Some(existing) = get_user_by_id(db, user_id).await? else {
        return Ok(None);
    };
    let mut active_user: user::ActiveModel = existing.into();
    active_user.is_active = Set(is_active);
    active_user.update(db).await.map(Some)
}
