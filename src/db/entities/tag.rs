use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// A label from the global catalog. Tags are shared by every user.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "tags")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub name: String,
    pub color: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl Related<super::todo::Entity> for Entity {
    fn to() -> RelationDef {
        super::todo_tag::Relation::Todo.def()
    }
    fn via() -> Option<RelationDef> {
        Some(super::todo_tag::Relation::Tag.def().rev())
    }
}

impl Related<super::recurring_todo::Entity> for Entity {
    fn to() -> RelationDef {
        super::recurring_todo_tag::Relation::RecurringTodo.def()
    }
    fn via() -> Option<RelationDef> {
        Some(super::recurring_todo_tag::Relation::Tag.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}
