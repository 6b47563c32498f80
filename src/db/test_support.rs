//! Shared fixtures for the database-backed tests: a fresh in-memory SQLite
//! database per test, with the full schema applied.

use chrono::Utc;
use sea_orm::{ActiveModelTrait, ConnectOptions, Database, DatabaseConnection, Set};

use crate::db::entities::{todo, user};
use crate::db::enums::TodoPriority;
use crate::db::services::tag_service;

pub async fn setup_db() -> DatabaseConnection {
    // One connection, since every sqlite::memory: connection is its own database.
    let mut opt = ConnectOptions::new("sqlite::memory:".to_owned());
    opt.max_connections(1).min_connections(1).sqlx_logging(false);

    let db = Database::connect(opt).await.expect("Failed to open in-memory database");
    super::create_schema(&db).await.expect("Failed to create schema");
    db
}

/// Inserts an active user directly, skipping password hashing.
pub async fn create_user(db: &DatabaseConnection, email: &str) -> user::Model {
    user::ActiveModel {
        email: Set(email.to_string()),
        hashed_password: Set("not-a-real-hash".to_string()),
        is_active: Set(true),
        created_at: Set(Utc::now()),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("Failed to insert user")
}

pub async fn create_todo_for(db: &DatabaseConnection, owner_id: i32, title: &str, tag_ids: &[i32]) -> todo::Model {
    let todo = todo::ActiveModel {
        title: Set(title.to_string()),
        description: Set(None),
        completed: Set(false),
        created_at: Set(Utc::now()),
        due_date: Set(None),
        priority: Set(TodoPriority::Low),
        owner_id: Set(owner_id),
        recurring_todo_id: Set(None),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("Failed to insert todo");

    tag_service::replace_todo_tags(db, todo.id, tag_ids)
        .await
        .expect("Failed to attach tags");
    todo
}
