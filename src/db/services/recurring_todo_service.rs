//! Recurring todo templates and the generation of concrete todos from them.

use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    ModelTrait, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use tracing::{debug, info};

use super::tag_service;
use crate::db::entities::{prelude::*, recurring_todo, todo};
use crate::db::enums::TodoPriority;
use crate::error::{ServiceError, ServiceResult};
use crate::web::models::recurring_todo_models::{
    CreateRecurringTodo, RecurringTodoDetails, UpdateRecurringTodo,
};
use crate::web::models::todo_models::TodoDetails;

async fn find_owned_template<C: ConnectionTrait>(
    conn: &C,
    recurring_todo_id: i32,
    owner_id: i32,
) -> Result<Option<recurring_todo::Model>, DbErr> {
    RecurringTodo::find_by_id(recurring_todo_id)
        .filter(recurring_todo::Column::OwnerId.eq(owner_id))
        .one(conn)
        .await
}

pub async fn create_recurring_todo(
    db: &DatabaseConnection,
    owner_id: i32,
    payload: CreateRecurringTodo,
) -> ServiceResult<RecurringTodoDetails> {
    if payload.title.trim().is_empty() {
        return Err(ServiceError::Validation("Title must not be empty.".to_string()));
    }

    let txn = db.begin().await?;

    let template = recurring_todo::ActiveModel {
        title: Set(payload.title),
        description: Set(payload.description),
        frequency: Set(payload.frequency),
        active: Set(payload.active),
        created_at: Set(Utc::now()),
        owner_id: Set(owner_id),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    let tag_ids = payload.tag_ids.unwrap_or_default();
    let tags = tag_service::replace_recurring_todo_tags(&txn, template.id, &tag_ids).await?;

    txn.commit().await?;

    info!(
        recurring_todo_id = template.id,
        owner_id,
        frequency = %template.frequency,
        "Recurring todo created."
    );
    Ok(RecurringTodoDetails::new(template, tags))
}

/// Lists the active templates of a user. Soft-deleted ones are hidden.
pub async fn get_recurring_todos(
    db: &DatabaseConnection,
    owner_id: i32,
    offset: u64,
    limit: u64,
) -> Result<Vec<RecurringTodoDetails>, DbErr> {
    let templates = RecurringTodo::find()
        .filter(recurring_todo::Column::OwnerId.eq(owner_id))
        .filter(recurring_todo::Column::Active.eq(true))
        .order_by_asc(recurring_todo::Column::Id)
        .offset(offset)
        .limit(limit)
        .all(db)
        .await?;

    let ids: Vec<i32> = templates.iter().map(|template| template.id).collect();
    let mut tags_by_template = tag_service::get_tags_for_recurring_todos(db, &ids).await?;

    Ok(templates
        .into_iter()
        .map(|template| {
            let tags = tags_by_template.remove(&template.id).unwrap_or_default();
            RecurringTodoDetails::new(template, tags)
        })
        .collect())
}

/// Fetches one template whether active or not.
pub async fn get_recurring_todo(
    db: &DatabaseConnection,
    recurring_todo_id: i32,
    owner_id: i32,
) -> ServiceResult<RecurringTodoDetails> {
    let template = find_owned_template(db, recurring_todo_id, owner_id)
        .await?
        .ok_or(ServiceError::NotFound("Recurring todo"))?;
    let tags = template.find_related(Tag).all(db).await?;
    Ok(RecurringTodoDetails::new(template, tags))
}

/// Applies a partial update. An absent or empty `tag_ids` keeps the current
/// tags.
pub async fn update_recurring_todo(
    db: &DatabaseConnection,
    recurring_todo_id: i32,
    owner_id: i32,
    changes: UpdateRecurringTodo,
) -> ServiceResult<RecurringTodoDetails> {
    if let Some(title) = &changes.title {
        if title.trim().is_empty() {
            return Err(ServiceError::Validation("Title must not be empty.".to_string()));
        }
    }

    let txn = db.begin().await?;

    let existing = find_owned_template(&txn, recurring_todo_id, owner_id)
        .await?
        .ok_or(ServiceError::NotFound("Recurring todo"))?;

    if let Some(tag_ids) = changes.tag_ids.as_ref().filter(|ids| !ids.is_empty()) {
        tag_service::replace_recurring_todo_tags(&txn, recurring_todo_id, tag_ids).await?;
    }

    let mut active_template: recurring_todo::ActiveModel = existing.clone().into();
    if let Some(title) = changes.title {
        active_template.title = Set(title);
    }
    if let Some(description) = changes.description {
        active_template.description = Set(description);
    }
    if let Some(frequency) = changes.frequency {
        active_template.frequency = Set(frequency);
    }
    if let Some(active) = changes.active {
        active_template.active = Set(active);
    }

    let updated = if active_template.is_changed() {
        active_template.update(&txn).await?
    } else {
        existing
    };
    let tags = updated.find_related(Tag).all(&txn).await?;

    txn.commit().await?;

    debug!(recurring_todo_id, owner_id, "Recurring todo updated.");
    Ok(RecurringTodoDetails::new(updated, tags))
}

/// Soft delete: the template is deactivated, never removed, so the todos
/// generated from it keep their back-reference.
pub async fn delete_recurring_todo(
    db: &DatabaseConnection,
    recurring_todo_id: i32,
    owner_id: i32,
) -> Result<bool, DbErr> {
    let Some(existing) = find_owned_template(db, recurring_todo_id, owner_id).await? else {
        return Ok(false);
    };

    let mut active_template: recurring_todo::ActiveModel = existing.into();
    active_template.active = Set(false);
    active_template.update(db).await?;

    info!(recurring_todo_id, owner_id, "Recurring todo deactivated.");
    Ok(true)
}

/// Materializes a todo from a template, due one interval from now.
pub async fn generate_todo(
    db: &DatabaseConnection,
    recurring_todo_id: i32,
    owner_id: i32,
) -> ServiceResult<TodoDetails> {
    generate_todo_at(db, recurring_todo_id, owner_id, Utc::now()).await
}

/// Same as [`generate_todo`] with an explicit clock. Inactive templates still
/// generate.
pub async fn generate_todo_at(
    db: &DatabaseConnection,
    recurring_todo_id: i32,
    owner_id: i32,
    now: DateTime<Utc>,
) -> ServiceResult<TodoDetails> {
    let txn = db.begin().await?;

    let template = find_owned_template(&txn, recurring_todo_id, owner_id)
        .await?
        .ok_or(ServiceError::NotFound("Recurring todo"))?;
    let template_tags = template.find_related(Tag).all(&txn).await?;

    let generated = todo::ActiveModel {
        title: Set(template.title.clone()),
        description: Set(template.description.clone()),
        completed: Set(false),
        created_at: Set(now),
        due_date: Set(Some(template.frequency.next_due_date(now))),
        priority: Set(TodoPriority::Low),
        owner_id: Set(template.owner_id),
        recurring_todo_id: Set(Some(template.id)),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    let tag_ids: Vec<i32> = template_tags.iter().map(|tag| tag.id).collect();
    let tags = tag_service::replace_todo_tags(&txn, generated.id, &tag_ids).await?;

    txn.commit().await?;

    info!(
        recurring_todo_id,
        todo_id = generated.id,
        due_date = ?generated.due_date,
        "Todo generated from recurring template."
    );
    Ok(TodoDetails::new(generated, tags))
}
