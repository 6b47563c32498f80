use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "recurring_todo_tags")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub recurring_todo_id: i32,
    #[sea_orm(primary_key, auto_increment = false)]
    pub tag_id: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::recurring_todo::Entity",
        from = "Column::RecurringTodoId",
        to = "super::recurring_todo::Column::Id",
        on_delete = "Cascade",
        on_update = "Cascade"
    )]
    RecurringTodo,
    #[sea_orm(
        belongs_to = "super::tag::Entity",
        from = "Column::TagId",
        to = "super::tag::Column::Id",
        on_delete = "Cascade",
        on_update = "Cascade"
    )]
    Tag,
}

impl Related<super::recurring_todo::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::RecurringTodo.def()
    }
}

impl Related<super::tag::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Tag.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
