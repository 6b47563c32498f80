use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::db::enums::TodoPriority;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "todos")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub title: String,
    pub description: Option<String>,
    pub completed: bool,
    pub created_at: ChronoDateTimeUtc,
    pub due_date: Option<ChronoDateTimeUtc>,
    pub priority: TodoPriority,
    pub owner_id: i32,
    // Set when the todo was generated from a recurring template.
    pub recurring_todo_id: Option<i32>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::OwnerId",
        to = "super::user::Column::Id",
        on_delete = "Cascade",
        on_update = "Cascade"
    )]
    Owner,
    #[sea_orm(
        belongs_to = "super::recurring_todo::Entity",
        from = "Column::RecurringTodoId",
        to = "super::recurring_todo::Column::Id",
        on_delete = "SetNull",
        on_update = "Cascade"
    )]
    RecurringParent,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Owner.def()
    }
}

impl Related<super::recurring_todo::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::RecurringParent.def()
    }
}

impl Related<super::tag::Entity> for Entity {
    fn to() -> RelationDef {
        super::todo_tag::Relation::Tag.def()
    }
    fn via() -> Option<RelationDef> {
        Some(super::todo_tag::Relation::Todo.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}
