//! The `services` module holds the data access and domain logic for each
//! entity. HTTP handlers call into these functions and never build queries
//! themselves.

pub mod recurring_todo_service;
pub mod tag_service;
pub mod todo_query;
pub mod todo_service;
pub mod user_service;
