//! Predicate composition shared by todo search and filtering.
//!
//! Every criterion is optional. An absent criterion adds no predicate at all,
//! so an empty [`TodoCriteria`] selects every todo of its owner.

use chrono::{DateTime, Utc};
use sea_orm::sea_query::{Expr, Func, LikeExpr, Query, SimpleExpr};
use sea_orm::{ColumnTrait, Condition, EntityTrait, QueryFilter, QueryOrder, Select};

use crate::db::entities::{todo, todo_tag};
use crate::db::enums::TodoPriority;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TodoCriteria {
    pub owner_id: i32,
    /// Case-insensitive substring matched against the title or the description.
    pub text: Option<String>,
    pub completed: Option<bool>,
    pub tag_id: Option<i32>,
    pub priority: Option<TodoPriority>,
    /// Inclusive upper bound on the due date.
    pub due_before: Option<DateTime<Utc>>,
    /// Inclusive lower bound on the due date.
    pub due_after: Option<DateTime<Utc>>,
}

impl TodoCriteria {
    pub fn for_owner(owner_id: i32) -> Self {
        TodoCriteria {
            owner_id,
            ..Default::default()
        }
    }

    pub fn condition(&self) -> Condition {
        Condition::all()
            .add(todo::Column::OwnerId.eq(self.owner_id))
            .add_option(self.text_condition())
            .add_option(self.completed.map(|completed| todo::Column::Completed.eq(completed)))
            .add_option(self.tag_id.map(tagged_with))
            .add_option(self.priority.map(|priority| todo::Column::Priority.eq(priority)))
            .add_option(self.due_before.map(|before| todo::Column::DueDate.lte(before)))
            .add_option(self.due_after.map(|after| todo::Column::DueDate.gte(after)))
    }

    /// Owner-scoped select in creation order.
    pub fn select(&self) -> Select<todo::Entity> {
        todo::Entity::find()
            .filter(self.condition())
            .order_by_asc(todo::Column::Id)
    }

    fn text_condition(&self) -> Option<Condition> {
        let text = self.text.as_deref().filter(|text| !text.is_empty())?;
        let pattern = format!("%{}%", escape_like(&text.to_lowercase()));

        Some(
            Condition::any()
                .add(contains_ignore_case(todo::Column::Title, &pattern))
                .add(contains_ignore_case(todo::Column::Description, &pattern)),
        )
    }
}

fn contains_ignore_case(column: todo::Column, pattern: &str) -> SimpleExpr {
    Expr::expr(Func::lower(Expr::col((todo::Entity, column))))
        .like(LikeExpr::new(pattern).escape('\\'))
}

fn tagged_with(tag_id: i32) -> SimpleExpr {
    todo::Column::Id.in_subquery(
        Query::select()
            .column(todo_tag::Column::TodoId)
            .from(todo_tag::Entity)
            .and_where(todo_tag::Column::TagId.eq(tag_id))
            .to_owned(),
    )
}

/// Escapes LIKE wildcards so user text only matches literally.
pub(crate) fn escape_like(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
