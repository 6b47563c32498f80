//! Owner-scoped CRUD, search and filtering over todos.
//!
//! A todo owned by another user is reported exactly like a missing one.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    ModelTrait, QueryFilter, QuerySelect, Set, TransactionTrait,
};
use tracing::{debug, info};

use super::tag_service;
use super::todo_query::TodoCriteria;
use crate::db::entities::{prelude::*, todo, todo_tag};
use crate::error::{ServiceError, ServiceResult};
use crate::web::models::todo_models::{
    CreateTodo, FilterTodosQuery, SearchTodosQuery, TodoDetails, UpdateTodo,
};

fn validate_title(title: &str) -> ServiceResult<()> {
    if title.trim().is_empty() {
        return Err(ServiceError::Validation("Title must not be empty.".to_string()));
    }
    Ok(())
}

pub(crate) async fn find_owned_todo<C: ConnectionTrait>(
    conn: &C,
    todo_id: i32,
    owner_id: i32,
) -> Result<Option<todo::Model>, DbErr> {
    Todo::find_by_id(todo_id)
        .filter(todo::Column::OwnerId.eq(owner_id))
        .one(conn)
        .await
}

/// Pairs every todo with its tags, keeping the order of `todos`.
pub(crate) async fn with_tags<C: ConnectionTrait>(
    conn: &C,
    todos: Vec<todo::Model>,
) -> Result<Vec<TodoDetails>, DbErr> {
    let ids: Vec<i32> = todos.iter().map(|todo| todo.id).collect();
    let mut tags_by_todo = tag_service::get_tags_for_todos(conn, &ids).await?;

    Ok(todos
        .into_iter()
        .map(|todo| {
            let tags = tags_by_todo.remove(&todo.id).unwrap_or_default();
            TodoDetails::new(todo, tags)
        })
        .collect())
}

/// Lists the todos of a user in creation order.
pub async fn get_todos(
    db: &DatabaseConnection,
    owner_id: i32,
    offset: u64,
    limit: u64,
) -> Result<Vec<TodoDetails>, DbErr> {
    let todos = TodoCriteria::for_owner(owner_id)
        .select()
        .offset(offset)
        .limit(limit)
        .all(db)
        .await?;
    with_tags(db, todos).await
}

pub async fn get_todo(db: &DatabaseConnection, todo_id: i32, owner_id: i32) -> ServiceResult<TodoDetails> {
    let todo = find_owned_todo(db, todo_id, owner_id)
        .await?
        .ok_or(ServiceError::NotFound("Todo"))?;
    let tags = todo.find_related(Tag).all(db).await?;
    Ok(TodoDetails::new(todo, tags))
}

/// Creates a todo. Tag ids missing from the catalog are silently dropped.
pub async fn create_todo(db: &DatabaseConnection, owner_id: i32, payload: CreateTodo) -> ServiceResult<TodoDetails> {
    validate_title(&payload.title)?;

    let txn = db.begin().await?;

    let new_todo = todo::ActiveModel {
        title: Set(payload.title),
        description: Set(payload.description),
        completed: Set(payload.completed),
        created_at: Set(Utc::now()),
        due_date: Set(payload.due_date),
        priority: Set(payload.priority),
        owner_id: Set(owner_id),
        recurring_todo_id: Set(None),
        ..Default::default()
    };
    let saved = new_todo.insert(&txn).await?;

    let tag_ids = payload.tag_ids.unwrap_or_default();
    let tags = tag_service::replace_todo_tags(&txn, saved.id, &tag_ids).await?;

    txn.commit().await?;

    info!(todo_id = saved.id, owner_id, tag_count = tags.len(), "Todo created.");
    Ok(TodoDetails::new(saved, tags))
}

/// Applies a partial update. The tag replacement and the field update commit
/// together or not at all.
pub async fn update_todo(
    db: &DatabaseConnection,
    todo_id: i32,
    owner_id: i32,
    changes: UpdateTodo,
) -> ServiceResult<TodoDetails> {
    if let Some(title) = &changes.title {
        validate_title(title)?;
    }

    let txn = db.begin().await?;

    let existing = find_owned_todo(&txn, todo_id, owner_id)
        .await?
        .ok_or(ServiceError::NotFound("Todo"))?;

    if let Some(tag_ids) = &changes.tag_ids {
        tag_service::replace_todo_tags(&txn, todo_id, tag_ids).await?;
    }

    let mut active_todo: todo::ActiveModel = existing.clone().into();
    if let Some(title) = changes.title {
        active_todo.title = Set(title);
    }
    if let Some(description) = changes.description {
        active_todo.description = Set(description);
    }
    if let Some(completed) = changes.completed {
        active_todo.completed = Set(completed);
    }
    if let Some(due_date) = changes.due_date {
        active_todo.due_date = Set(due_date);
    }
    if let Some(priority) = changes.priority {
        active_todo.priority = Set(priority);
    }

    let updated = if active_todo.is_changed() {
        active_todo.update(&txn).await?
    } else {
        existing
    };
    let tags = updated.find_related(Tag).all(&txn).await?;

    txn.commit().await?;

    debug!(todo_id, owner_id, "Todo updated.");
    Ok(TodoDetails::new(updated, tags))
}

/// Hard-deletes a todo. Returns `false` when the todo is missing or owned by
/// someone else.
pub async fn delete_todo(db: &DatabaseConnection, todo_id: i32, owner_id: i32) -> Result<bool, DbErr> {
    let txn = db.begin().await?;

    let Some(existing) = find_owned_todo(&txn, todo_id, owner_id).await? else {
        return Ok(false);
    };

    TodoTag::delete_many()
        .filter(todo_tag::Column::TodoId.eq(existing.id))
        .exec(&txn)
        .await?;
    existing.delete(&txn).await?;

    txn.commit().await?;

    info!(todo_id, owner_id, "Todo deleted.");
    Ok(true)
}

/// Text search with optional equality filters. An empty query matches
/// everything the filters allow.
pub async fn search_todos(
    db: &DatabaseConnection,
    owner_id: i32,
    params: SearchTodosQuery,
) -> Result<Vec<TodoDetails>, DbErr> {
    let criteria = TodoCriteria {
        owner_id,
        text: Some(params.query),
        completed: params.completed,
        tag_id: params.tag_id,
        priority: params.priority,
        ..Default::default()
    };
    let todos = criteria.select().all(db).await?;
    with_tags(db, todos).await
}

/// Search plus inclusive due-date bounds, every criterion optional.
pub async fn filter_todos(
    db: &DatabaseConnection,
    owner_id: i32,
    params: FilterTodosQuery,
) -> Result<Vec<TodoDetails>, DbErr> {
    let criteria = TodoCriteria {
        owner_id,
        text: params.search_term,
        completed: params.completed,
        tag_id: params.tag_id,
        priority: params.priority,
        due_before: params.due_before,
        due_after: params.due_after,
    };
    let todos = criteria.select().all(db).await?;
    with_tags(db, todos).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::enums::TodoPriority;
    use crate::db::test_support::{create_user, setup_db};
    use chrono::{DateTime, TimeZone};

    fn due(day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, day, 12, 0, 0).unwrap()
    }

    fn new_todo(title: &str) -> CreateTodo {
        CreateTodo {
            title: title.to_string(),
            description: None,
            completed: false,
            due_date: None,
            priority: TodoPriority::Low,
            tag_ids: None,
        }
    }

    #[tokio::test]
    async fn test_create_then_get_round_trips() {
        let db = setup_db().await;
        let owner = create_user(&db, "owner@test.fr").await;
        let urgent = tag_service::create_tag(&db, "Urgent", "#FF6B6B").await.unwrap();

        let created = create_todo(
            &db,
            owner.id,
            CreateTodo {
                title: "Préparer la présentation".to_string(),
                description: Some("Slides pour lundi".to_string()),
                completed: false,
                due_date: Some(due(10)),
                priority: TodoPriority::High,
                tag_ids: Some(vec![urgent.id]),
            },
        )
        .await
        .unwrap();

        let fetched = get_todo(&db, created.id, owner.id).await.unwrap();
        assert_eq!(fetched, created);
        assert_eq!(fetched.title, "Préparer la présentation");
        assert_eq!(fetched.description.as_deref(), Some("Slides pour lundi"));
        assert_eq!(fetched.due_date, Some(due(10)));
        assert_eq!(fetched.priority, TodoPriority::High);
        assert_eq!(fetched.owner_id, owner.id);
        assert_eq!(fetched.recurring_todo_id, None);
        assert_eq!(fetched.tags, vec![urgent]);
    }

    #[tokio::test]
    async fn test_unknown_tag_ids_are_dropped_on_create() {
        let db = setup_db().await;
        let owner = create_user(&db, "owner@test.fr").await;
        let tag = tag_service::create_tag(&db, "Travail", "#00FF00").await.unwrap();

        let created = create_todo(
            &db,
            owner.id,
            CreateTodo {
                tag_ids: Some(vec![tag.id, 4242]),
                ..new_todo("Répondre aux emails")
            },
        )
        .await
        .unwrap();

        assert_eq!(created.tag_ids(), vec![tag.id]);
    }

    #[tokio::test]
    async fn test_other_users_cannot_see_or_delete() {
        let db = setup_db().await;
        let alice = create_user(&db, "alice@test.fr").await;
        let bob = create_user(&db, "bob@test.fr").await;

        let todo = create_todo(&db, alice.id, new_todo("Jardiner")).await.unwrap();

        assert!(matches!(get_todo(&db, todo.id, bob.id).await, Err(ServiceError::NotFound("Todo"))));
        assert!(!delete_todo(&db, todo.id, bob.id).await.unwrap());
        let update = update_todo(&db, todo.id, bob.id, UpdateTodo { completed: Some(true), ..Default::default() }).await;
        assert!(matches!(update, Err(ServiceError::NotFound("Todo"))));

        assert!(get_todos(&db, bob.id, 0, 100).await.unwrap().is_empty());
        assert!(!get_todo(&db, todo.id, alice.id).await.unwrap().completed);
    }

    #[tokio::test]
    async fn test_partial_update_only_touches_present_fields() {
        let db = setup_db().await;
        let owner = create_user(&db, "owner@test.fr").await;
        let tag = tag_service::create_tag(&db, "Personnel", "#FF0000").await.unwrap();

        let created = create_todo(
            &db,
            owner.id,
            CreateTodo {
                description: Some("Chez le vélociste".to_string()),
                due_date: Some(due(3)),
                priority: TodoPriority::Medium,
                tag_ids: Some(vec![tag.id]),
                ..new_todo("Réparer le vélo")
            },
        )
        .await
        .unwrap();

        let updated = update_todo(
            &db,
            created.id,
            owner.id,
            UpdateTodo { completed: Some(true), ..Default::default() },
        )
        .await
        .unwrap();

        assert!(updated.completed);
        assert_eq!(updated.title, created.title);
        assert_eq!(updated.description, created.description);
        assert_eq!(updated.due_date, created.due_date);
        assert_eq!(updated.priority, created.priority);
        assert_eq!(updated.tags, created.tags);
    }

    #[tokio::test]
    async fn test_update_with_null_clears_nullable_fields() {
        let db = setup_db().await;
        let owner = create_user(&db, "owner@test.fr").await;
        let created = create_todo(
            &db,
            owner.id,
            CreateTodo {
                description: Some("Avant vendredi".to_string()),
                due_date: Some(due(7)),
                ..new_todo("Faire une sauvegarde")
            },
        )
        .await
        .unwrap();

        let updated = update_todo(
            &db,
            created.id,
            owner.id,
            UpdateTodo {
                description: Some(None),
                due_date: Some(None),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        assert_eq!(updated.description, None);
        assert_eq!(updated.due_date, None);
        assert_eq!(updated.title, "Faire une sauvegarde");
    }

    #[tokio::test]
    async fn test_update_tag_ids_replaces_or_clears() {
        let db = setup_db().await;
        let owner = create_user(&db, "owner@test.fr").await;
        let first = tag_service::create_tag(&db, "Urgent", "#FF6B6B").await.unwrap();
        let second = tag_service::create_tag(&db, "Important", "#4ECDC4").await.unwrap();

        let created = create_todo(
            &db,
            owner.id,
            CreateTodo { tag_ids: Some(vec![first.id]), ..new_todo("Organiser les fichiers") },
        )
        .await
        .unwrap();

        let replaced = update_todo(
            &db,
            created.id,
            owner.id,
            UpdateTodo { tag_ids: Some(vec![second.id]), ..Default::default() },
        )
        .await
        .unwrap();
        assert_eq!(replaced.tag_ids(), vec![second.id]);

        let cleared = update_todo(
            &db,
            created.id,
            owner.id,
            UpdateTodo { tag_ids: Some(vec![]), ..Default::default() },
        )
        .await
        .unwrap();
        assert!(cleared.tags.is_empty());
        assert!(get_todo(&db, created.id, owner.id).await.unwrap().tags.is_empty());
    }

    #[tokio::test]
    async fn test_empty_title_is_rejected() {
        let db = setup_db().await;
        let owner = create_user(&db, "owner@test.fr").await;

        let err = create_todo(&db, owner.id, new_todo("   ")).await.unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));
    }

    #[tokio::test]
    async fn test_delete_is_hard() {
        let db = setup_db().await;
        let owner = create_user(&db, "owner@test.fr").await;
        let todo = create_todo(&db, owner.id, new_todo("Méditer")).await.unwrap();

        assert!(delete_todo(&db, todo.id, owner.id).await.unwrap());
        assert!(matches!(get_todo(&db, todo.id, owner.id).await, Err(ServiceError::NotFound(_))));
        assert!(!delete_todo(&db, todo.id, owner.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_list_paginates_in_creation_order() {
        let db = setup_db().await;
        let owner = create_user(&db, "owner@test.fr").await;
        for title in ["Un", "Deux", "Trois", "Quatre"] {
            create_todo(&db, owner.id, new_todo(title)).await.unwrap();
        }

        let page = get_todos(&db, owner.id, 1, 2).await.unwrap();
        let titles: Vec<&str> = page.iter().map(|todo| todo.title.as_str()).collect();
        assert_eq!(titles, vec!["Deux", "Trois"]);

        assert!(get_todos(&db, owner.id, 0, 0).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_search_matches_title_or_description_ignoring_case() {
        let db = setup_db().await;
        let owner = create_user(&db, "owner@test.fr").await;
        let other = create_user(&db, "other@test.fr").await;

        let by_title = create_todo(&db, owner.id, new_todo("Faire les courses, Shopping")).await.unwrap();
        let by_description = create_todo(
            &db,
            owner.id,
            CreateTodo {
                description: Some("Passer au workshop du quartier".to_string()),
                ..new_todo("Samedi")
            },
        )
        .await
        .unwrap();
        create_todo(&db, owner.id, new_todo("Lire un livre")).await.unwrap();
        create_todo(&db, other.id, new_todo("Shopping aussi")).await.unwrap();

        let found = search_todos(
            &db,
            owner.id,
            SearchTodosQuery { query: "shop".to_string(), ..Default::default() },
        )
        .await
        .unwrap();

        let ids: Vec<i32> = found.iter().map(|todo| todo.id).collect();
        assert_eq!(ids, vec![by_title.id, by_description.id]);
    }

    #[tokio::test]
    async fn test_search_treats_wildcards_literally() {
        let db = setup_db().await;
        let owner = create_user(&db, "owner@test.fr").await;
        let discount = create_todo(&db, owner.id, new_todo("Soldes à 50% demain")).await.unwrap();
        create_todo(&db, owner.id, new_todo("Soldes à 50 euros")).await.unwrap();

        let found = search_todos(
            &db,
            owner.id,
            SearchTodosQuery { query: "50%".to_string(), ..Default::default() },
        )
        .await
        .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, discount.id);
    }

    #[tokio::test]
    async fn test_search_filters_are_anded() {
        let db = setup_db().await;
        let owner = create_user(&db, "owner@test.fr").await;
        let health = tag_service::create_tag(&db, "Santé", "#96CEB4").await.unwrap();

        let wanted = create_todo(
            &db,
            owner.id,
            CreateTodo {
                priority: TodoPriority::High,
                tag_ids: Some(vec![health.id]),
                ..new_todo("Appeler le médecin")
            },
        )
        .await
        .unwrap();
        create_todo(
            &db,
            owner.id,
            CreateTodo { priority: TodoPriority::High, ..new_todo("Appeler le plombier") },
        )
        .await
        .unwrap();
        let done = create_todo(
            &db,
            owner.id,
            CreateTodo { tag_ids: Some(vec![health.id]), ..new_todo("Appeler la pharmacie") },
        )
        .await
        .unwrap();
        update_todo(&db, done.id, owner.id, UpdateTodo { completed: Some(true), ..Default::default() })
            .await
            .unwrap();

        let found = search_todos(
            &db,
            owner.id,
            SearchTodosQuery {
                query: "appeler".to_string(),
                completed: Some(false),
                tag_id: Some(health.id),
                priority: Some(TodoPriority::High),
            },
        )
        .await
        .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, wanted.id);

        let none = search_todos(
            &db,
            owner.id,
            SearchTodosQuery { query: "introuvable".to_string(), ..Default::default() },
        )
        .await
        .unwrap();
        assert!(none.is_empty());
    }

    #[tokio::test]
    async fn test_filter_due_bounds_are_inclusive() {
        let db = setup_db().await;
        let owner = create_user(&db, "owner@test.fr").await;

        let mut ids = Vec::new();
        for day in [1, 10, 20] {
            let todo = create_todo(
                &db,
                owner.id,
                CreateTodo { due_date: Some(due(day)), ..new_todo(&format!("Rendu {day}")) },
            )
            .await
            .unwrap();
            ids.push(todo.id);
        }
        create_todo(&db, owner.id, new_todo("Sans échéance")).await.unwrap();

        let found = filter_todos(
            &db,
            owner.id,
            FilterTodosQuery {
                due_after: Some(due(10)),
                due_before: Some(due(20)),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        let found_ids: Vec<i32> = found.iter().map(|todo| todo.id).collect();
        assert_eq!(found_ids, vec![ids[1], ids[2]]);

        let everything = filter_todos(&db, owner.id, FilterTodosQuery::default()).await.unwrap();
        assert_eq!(everything.len(), 4);

        let by_term = filter_todos(
            &db,
            owner.id,
            FilterTodosQuery {
                search_term: Some("RENDU 1".to_string()),
                due_before: Some(due(5)),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(by_term.len(), 1);
        assert_eq!(by_term[0].id, ids[0]);
    }
}
