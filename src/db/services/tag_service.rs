//! The global tag catalog and the tag associations of todos and recurring
//! templates.

use std::collections::{BTreeSet, HashMap};

use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    ModelTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};
use tracing::info;

use crate::db::entities::{prelude::*, recurring_todo_tag, tag, todo_tag};
use crate::error::{ServiceError, ServiceResult, is_unique_violation};

// --- Tag Catalog ---

fn validate_tag(name: &str) -> ServiceResult<()> {
    if name.trim().is_empty() {
        return Err(ServiceError::Validation("Tag name must not be empty.".to_string()));
    }
    Ok(())
}

/// Creates a new tag. Names are unique across the whole catalog.
pub async fn create_tag(db: &DatabaseConnection, name: &str, color: &str) -> ServiceResult<tag::Model> {
    validate_tag(name)?;

    let new_tag = tag::ActiveModel {
        name: Set(name.to_string()),
        color: Set(color.to_string()),
        ..Default::default()
    };

    let tag = new_tag.insert(db).await.map_err(|e| {
        if is_unique_violation(&e) {
            ServiceError::DuplicateTag(name.to_string())
        } else {
            ServiceError::Database(e)
        }
    })?;

    info!(tag_id = tag.id, name = %tag.name, "Tag created.");
    Ok(tag)
}

/// Retrieves every tag in the catalog.
pub async fn get_all_tags(db: &DatabaseConnection) -> Result<Vec<tag::Model>, DbErr> {
    Tag::find().order_by_asc(tag::Column::Id).all(db).await
}

pub async fn get_tag_by_id(db: &DatabaseConnection, tag_id: i32) -> ServiceResult<tag::Model> {
    Tag::find_by_id(tag_id)
        .one(db)
        .await?
        .ok_or(ServiceError::NotFound("Tag"))
}

/// Replaces the name and color of an existing tag.
pub async fn update_tag(
    db: &DatabaseConnection,
    tag_id: i32,
    name: &str,
    color: &str,
) -> ServiceResult<tag::Model> {
    validate_tag(name)?;

    let existing = get_tag_by_id(db, tag_id).await?;

    let mut active_tag: tag::ActiveModel = existing.into();
    active_tag.name = Set(name.to_string());
    active_tag.color = Set(color.to_string());

    active_tag.update(db).await.map_err(|e| {
        if is_unique_violation(&e) {
            ServiceError::DuplicateTag(name.to_string())
        } else {
            ServiceError::Database(e)
        }
    })
}

/// Deletes a tag after detaching it from every todo and recurring template,
/// all in one transaction.
pub async fn delete_tag(db: &DatabaseConnection, tag_id: i32) -> ServiceResult<()> {
    let txn = db.begin().await?;

    let tag = Tag::find_by_id(tag_id)
        .one(&txn)
        .await?
        .ok_or(ServiceError::NotFound("Tag"))?;

    let detached_todos = TodoTag::delete_many()
        .filter(todo_tag::Column::TagId.eq(tag_id))
        .exec(&txn)
        .await?
        .rows_affected;
    let detached_templates = RecurringTodoTag::delete_many()
        .filter(recurring_todo_tag::Column::TagId.eq(tag_id))
        .exec(&txn)
        .await?
        .rows_affected;

    tag.delete(&txn).await?;
    txn.commit().await?;

    info!(
        tag_id,
        detached_todos, detached_templates, "Tag deleted and detached from its todos and templates."
    );
    Ok(())
}

// --- Associations ---

/// Fetches the tags among `tag_ids` that exist. Unknown ids are skipped.
pub async fn find_tags_by_ids<C: ConnectionTrait>(conn: &C, tag_ids: &[i32]) -> Result<Vec<tag::Model>, DbErr> {
    if tag_ids.is_empty() {
        return Ok(Vec::new());
    }
    let unique_ids: BTreeSet<i32> = tag_ids.iter().copied().collect();

    Tag::find()
        .filter(tag::Column::Id.is_in(unique_ids))
        .order_by_asc(tag::Column::Id)
        .all(conn)
        .await
}

/// Groups the tags of several todos by todo id, with two queries in total.
pub async fn get_tags_for_todos<C: ConnectionTrait>(
    conn: &C,
    todo_ids: &[i32],
) -> Result<HashMap<i32, Vec<tag::Model>>, DbErr> {
    if todo_ids.is_empty() {
        return Ok(HashMap::new());
    }

    let links = TodoTag::find()
        .filter(todo_tag::Column::TodoId.is_in(todo_ids.to_vec()))
        .all(conn)
        .await?;
    let pairs = links.into_iter().map(|link| (link.todo_id, link.tag_id)).collect::<Vec<_>>();

    group_tags(conn, pairs).await
}

/// Groups the tags of several recurring templates by template id.
pub async fn get_tags_for_recurring_todos<C: ConnectionTrait>(
    conn: &C,
    recurring_todo_ids: &[i32],
) -> Result<HashMap<i32, Vec<tag::Model>>, DbErr> {
    if recurring_todo_ids.is_empty() {
        return Ok(HashMap::new());
    }

    let links = RecurringTodoTag::find()
        .filter(recurring_todo_tag::Column::RecurringTodoId.is_in(recurring_todo_ids.to_vec()))
        .all(conn)
        .await?;
    let pairs = links
        .into_iter()
        .map(|link| (link.recurring_todo_id, link.tag_id))
        .collect::<Vec<_>>();

    group_tags(conn, pairs).await
}

async fn group_tags<C: ConnectionTrait>(
    conn: &C,
    owner_tag_pairs: Vec<(i32, i32)>,
) -> Result<HashMap<i32, Vec<tag::Model>>, DbErr> {
    let tag_ids: Vec<i32> = owner_tag_pairs.iter().map(|(_, tag_id)| *tag_id).collect();
    let tags_by_id: HashMap<i32, tag::Model> = find_tags_by_ids(conn, &tag_ids)
        .await?
        .into_iter()
        .map(|tag| (tag.id, tag))
        .collect();

    let mut grouped: HashMap<i32, Vec<tag::Model>> = HashMap::new();
    for (owner_id, tag_id) in owner_tag_pairs {
        if let Some(tag) = tags_by_id.get(&tag_id) {
            grouped.entry(owner_id).or_default().push(tag.clone());
        }
    }
    for tags in grouped.values_mut() {
        tags.sort_by_key(|tag| tag.id);
    }
    Ok(grouped)
}

/// Replaces the whole tag set of a todo with the existing tags among `tag_ids`.
pub async fn replace_todo_tags<C: ConnectionTrait>(
    conn: &C,
    todo_id: i32,
    tag_ids: &[i32],
) -> Result<Vec<tag::Model>, DbErr> {
    TodoTag::delete_many()
        .filter(todo_tag::Column::TodoId.eq(todo_id))
        .exec(conn)
        .await?;

    let tags = find_tags_by_ids(conn, tag_ids).await?;
    if !tags.is_empty() {
        let links = tags.iter().map(|tag| todo_tag::ActiveModel {
            todo_id: Set(todo_id),
            tag_id: Set(tag.id),
        });
        TodoTag::insert_many(links).exec_without_returning(conn).await?;
    }
    Ok(tags)
}

/// Replaces the whole tag set of a recurring template.
pub async fn replace_recurring_todo_tags<C: ConnectionTrait>(
    conn: &C,
    recurring_todo_id: i32,
    tag_ids: &[i32],
) -> Result<Vec<tag::Model>, DbErr> {
    RecurringTodoTag::delete_many()
        .filter(recurring_todo_tag::Column::RecurringTodoId.eq(recurring_todo_id))
        .exec(conn)
        .await?;

    let tags = find_tags_by_ids(conn, tag_ids).await?;
    if !tags.is_empty() {
        let links = tags.iter().map(|tag| recurring_todo_tag::ActiveModel {
            recurring_todo_id: Set(recurring_todo_id),
            tag_id: Set(tag.id),
        });
        RecurringTodoTag::insert_many(links).exec_without_returning(conn).await?;
    }
    Ok(tags)
}
