use axum::{
    Json, Router,
    extract::{Extension, Path, Query, State},
    http::StatusCode,
    routing::get,
};
use axum_extra::extract::WithRejection;
use std::sync::Arc;

use crate::db::services::todo_service;
use crate::web::models::todo_models::{CreateTodo, FilterTodosQuery, SearchTodosQuery, TodoDetails, UpdateTodo};
use crate::web::models::{AuthenticatedUser, Pagination};
use crate::web::{AppError, AppState};

pub fn create_todos_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(list_todos_handler).post(create_todo_handler))
        // Literal segments take precedence over the `{id}` capture.
        .route("/search", get(search_todos_handler))
        .route("/filter", get(filter_todos_handler))
        .route(
            "/{id}",
            get(get_todo_handler).put(update_todo_handler).delete(delete_todo_handler),
        )
}

async fn list_todos_handler(
    Extension(authenticated_user): Extension<AuthenticatedUser>,
    State(app_state): State<Arc<AppState>>,
    WithRejection(Query(page), _): WithRejection<Query<Pagination>, AppError>,
) -> Result<Json<Vec<TodoDetails>>, AppError> {
    let todos = todo_service::get_todos(&app_state.db_pool, authenticated_user.id, page.offset(), page.limit()).await?;
    Ok(Json(todos))
}

async fn create_todo_handler(
    Extension(authenticated_user): Extension<AuthenticatedUser>,
    State(app_state): State<Arc<AppState>>,
    WithRejection(Json(payload), _): WithRejection<Json<CreateTodo>, AppError>,
) -> Result<(StatusCode, Json<TodoDetails>), AppError> {
    let todo = todo_service::create_todo(&app_state.db_pool, authenticated_user.id, payload).await?;
    Ok((StatusCode::CREATED, Json(todo)))
}

async fn get_todo_handler(
    Extension(authenticated_user): Extension<AuthenticatedUser>,
    State(app_state): State<Arc<AppState>>,
    WithRejection(Path(todo_id), _): WithRejection<Path<i32>, AppError>,
) -> Result<Json<TodoDetails>, AppError> {
    let todo = todo_service::get_todo(&app_state.db_pool, todo_id, authenticated_user.id).await?;
    Ok(Json(todo))
}

async fn update_todo_handler(
    Extension(authenticated_user): Extension<AuthenticatedUser>,
    State(app_state): State<Arc<AppState>>,
    WithRejection(Path(todo_id), _): WithRejection<Path<i32>, AppError>,
    WithRejection(Json(payload), _): WithRejection<Json<UpdateTodo>, AppError>,
) -> Result<Json<TodoDetails>, AppError> {
    let todo = todo_service::update_todo(&app_state.db_pool, todo_id, authenticated_user.id, payload).await?;
    Ok(Json(todo))
}

async fn delete_todo_handler(
    Extension(authenticated_user): Extension<AuthenticatedUser>,
    State(app_state): State<Arc<AppState>>,
    WithRejection(Path(todo_id), _): WithRejection<Path<i32>, AppError>,
) -> Result<StatusCode, AppError> {
    if todo_service::delete_todo(&app_state.db_pool, todo_id, authenticated_user.id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound("Todo not found".to_string()))
    }
}

async fn search_todos_handler(
    Extension(authenticated_user): Extension<AuthenticatedUser>,
    State(app_state): State<Arc<AppState>>,
    WithRejection(Query(params), _): WithRejection<Query<SearchTodosQuery>, AppError>,
) -> Result<Json<Vec<TodoDetails>>, AppError> {
    let todos = todo_service::search_todos(&app_state.db_pool, authenticated_user.id, params).await?;
    Ok(Json(todos))
}

async fn filter_todos_handler(
    Extension(authenticated_user): Extension<AuthenticatedUser>,
    State(app_state): State<Arc<AppState>>,
    WithRejection(Query(params), _): WithRejection<Query<FilterTodosQuery>, AppError>,
) -> Result<Json<Vec<TodoDetails>>, AppError> {
    let todos = todo_service::filter_todos(&app_state.db_pool, authenticated_user.id, params).await?;
    Ok(Json(todos))
}
