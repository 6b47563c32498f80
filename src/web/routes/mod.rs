pub mod recurring_routes;
pub mod tag_routes;
pub mod todo_routes;
