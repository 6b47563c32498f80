use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::deserialize_present;
use crate::db::entities::{recurring_todo, tag};
use crate::db::enums::RecurringFrequency;

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct RecurringTodoDetails {
    pub id: i32,
    pub title: String,
    pub description: Option<String>,
    pub frequency: RecurringFrequency,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub owner_id: i32,
    pub tags: Vec<tag::Model>,
}

impl RecurringTodoDetails {
    pub fn new(template: recurring_todo::Model, tags: Vec<tag::Model>) -> Self {
        RecurringTodoDetails {
            id: template.id,
            title: template.title,
            description: template.description,
            frequency: template.frequency,
            active: template.active,
            created_at: template.created_at,
            owner_id: template.owner_id,
            tags,
        }
    }

    pub fn tag_ids(&self) -> Vec<i32> {
        let mut ids: Vec<i32> = self.tags.iter().map(|tag| tag.id).collect();
        ids.sort_unstable();
        ids
    }
}

fn default_active() -> bool {
    true
}

#[derive(Deserialize, Debug, Clone)]
pub struct CreateRecurringTodo {
    pub title: String,
    pub description: Option<String>,
    pub frequency: RecurringFrequency,
    #[serde(default = "default_active")]
    pub active: bool,
    pub tag_ids: Option<Vec<i32>>,
}

/// Partial update of a recurring template. Unlike todos, an empty
/// `tag_ids` leaves the current tags untouched.
#[derive(Deserialize, Debug, Clone, Default)]
pub struct UpdateRecurringTodo {
    pub title: Option<String>,
    #[serde(default, deserialize_with = "deserialize_present")]
    pub description: Option<Option<String>>,
    pub frequency: Option<RecurringFrequency>,
    pub active: Option<bool>,
    pub tag_ids: Option<Vec<i32>>,
}
