//! Persistence: entities, the domain services built on them, schema setup
//! and demo seeding.

use sea_orm::sea_query::Index;
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, DbErr, Schema};
use tracing::info;

use crate::db::entities::{prelude::*, recurring_todo, todo};
use crate::server::config::ServerConfig;

pub mod entities;
pub mod enums;
pub mod seed;
pub mod services;

#[cfg(test)]
pub(crate) mod test_support;

pub async fn connect(config: &ServerConfig) -> Result<DatabaseConnection, DbErr> {
    let mut opt = ConnectOptions::new(config.database_url.to_owned());
    opt.max_connections(config.max_connections)
        .sqlx_logging(false);

    Database::connect(opt).await
}

/// Creates every table (and the title indexes) that does not exist yet,
/// parents before children so foreign keys resolve.
pub async fn create_schema(db: &DatabaseConnection) -> Result<(), DbErr> {
    let backend = db.get_database_backend();
    let schema = Schema::new(backend);

    let mut tables = vec![
        schema.create_table_from_entity(User),
        schema.create_table_from_entity(Tag),
        schema.create_table_from_entity(RecurringTodo),
        schema.create_table_from_entity(Todo),
        schema.create_table_from_entity(TodoTag),
        schema.create_table_from_entity(RecurringTodoTag),
    ];
    for table in tables.iter_mut() {
        table.if_not_exists();
        db.execute(backend.build(&*table)).await?;
    }

    let indexes = [
        Index::create()
            .name("idx-todos-title")
            .table(Todo)
            .col(todo::Column::Title)
            .if_not_exists()
            .to_owned(),
        Index::create()
            .name("idx-recurring_todos-title")
            .table(RecurringTodo)
            .col(recurring_todo::Column::Title)
            .if_not_exists()
            .to_owned(),
    ];
    for index in &indexes {
        db.execute(backend.build(index)).await?;
    }

    info!(backend = ?backend, "Database schema is up to date.");
    Ok(())
}
