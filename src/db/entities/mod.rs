//! SeaORM entities mapping the task-management tables.
//!
//! `users`, `tags`, `todos` and `recurring_todos` carry data; `todo_tags` and
//! `recurring_todo_tags` are the junction tables for the two tag associations.

pub mod recurring_todo;
pub mod recurring_todo_tag;
pub mod tag;
pub mod todo;
pub mod todo_tag;
pub mod user;

// Prelude module for easy importing of all entities and their related types
pub mod prelude {
    pub use super::user::Entity as User;
    pub use super::user::Model as UserModel;
    pub use super::user::ActiveModel as UserActiveModel;
    pub use super::user::Column as UserColumn;

    pub use super::tag::Entity as Tag;
    pub use super::tag::Model as TagModel;
    pub use super::tag::ActiveModel as TagActiveModel;
    pub use super::tag::Column as TagColumn;

    pub use super::todo::Entity as Todo;
    pub use super::todo::Model as TodoModel;
    pub use super::todo::ActiveModel as TodoActiveModel;
    pub use super::todo::Column as TodoColumn;

    pub use super::todo_tag::Entity as TodoTag;
    pub use super::todo_tag::Model as TodoTagModel;
    pub use super::todo_tag::ActiveModel as TodoTagActiveModel;
    pub use super::todo_tag::Column as TodoTagColumn;

    pub use super::recurring_todo::Entity as RecurringTodo;
    pub use super::recurring_todo::Model as RecurringTodoModel;
    pub use super::recurring_todo::ActiveModel as RecurringTodoActiveModel;
    pub use super::recurring_todo::Column as RecurringTodoColumn;

    pub use super::recurring_todo_tag::Entity as RecurringTodoTag;
    pub use super::recurring_todo_tag::Model as RecurringTodoTagModel;
    pub use super::recurring_todo_tag::ActiveModel as RecurringTodoTagActiveModel;
    pub use super::recurring_todo_tag::Column as RecurringTodoTagColumn;
}
