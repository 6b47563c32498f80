use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::deserialize_present;
use crate::db::entities::{tag, todo};
use crate::db::enums::TodoPriority;

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct TodoDetails {
    pub id: i32,
    pub title: String,
    pub description: Option<String>,
    pub completed: bool,
    pub created_at: DateTime<Utc>,
    pub due_date: Option<DateTime<Utc>>,
    pub priority: TodoPriority,
    pub owner_id: i32,
    pub recurring_todo_id: Option<i32>,
    pub tags: Vec<tag::Model>,
}

impl TodoDetails {
    pub fn new(todo: todo::Model, tags: Vec<tag::Model>) -> Self {
        TodoDetails {
            id: todo.id,
            title: todo.title,
            description: todo.description,
            completed: todo.completed,
            created_at: todo.created_at,
            due_date: todo.due_date,
            priority: todo.priority,
            owner_id: todo.owner_id,
            recurring_todo_id: todo.recurring_todo_id,
            tags,
        }
    }

    pub fn tag_ids(&self) -> Vec<i32> {
        let mut ids: Vec<i32> = self.tags.iter().map(|tag| tag.id).collect();
        ids.sort_unstable();
        ids
    }
}

#[derive(Deserialize, Debug, Clone)]
pub struct CreateTodo {
    pub title: String,
    pub description: Option<String>,
    #[serde(default)]
    pub completed: bool,
    pub due_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub priority: TodoPriority,
    // Ids that do not exist in the tag catalog are dropped.
    pub tag_ids: Option<Vec<i32>>,
}

/// Partial update of a todo. Only fields present in the request change.
/// A present `tag_ids`, even an empty one, replaces the whole tag set.
#[derive(Deserialize, Debug, Clone, Default)]
pub struct UpdateTodo {
    pub title: Option<String>,
    #[serde(default, deserialize_with = "deserialize_present")]
    pub description: Option<Option<String>>,
    pub completed: Option<bool>,
    #[serde(default, deserialize_with = "deserialize_present")]
    pub due_date: Option<Option<DateTime<Utc>>>,
    pub priority: Option<TodoPriority>,
    pub tag_ids: Option<Vec<i32>>,
}

#[derive(Deserialize, Debug, Clone, Default)]
pub struct SearchTodosQuery {
    pub query: String,
    pub completed: Option<bool>,
    pub tag_id: Option<i32>,
    pub priority: Option<TodoPriority>,
}

#[derive(Deserialize, Debug, Clone, Default)]
pub struct FilterTodosQuery {
    pub search_term: Option<String>,
    pub completed: Option<bool>,
    pub tag_id: Option<i32>,
    pub priority: Option<TodoPriority>,
    pub due_before: Option<DateTime<Utc>>,
    pub due_after: Option<DateTime<Utc>>,
}
