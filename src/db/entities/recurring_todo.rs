use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::db::enums::RecurringFrequency;

/// A template that todos are generated from. Deleting a template only clears
/// `active`; the row and its generated todos stay in place.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "recurring_todos")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub title: String,
    pub description: Option<String>,
    pub frequency: RecurringFrequency,
    pub active: bool,
    pub created_at: ChronoDateTimeUtc,
    pub owner_id: i32,
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
    #[sea_orm(has_many = "super::todo::Entity")]
    TodoInstances,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Owner.def()
    }
}

impl Related<super::todo::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::TodoInstances.def()
    }
}

impl Related<super::tag::Entity> for Entity {
    fn to() -> RelationDef {
        super::recurring_todo_tag::Relation::Tag.def()
    }
    fn via() -> Option<RelationDef> {
        Some(super::recurring_todo_tag::Relation::RecurringTodo.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}
