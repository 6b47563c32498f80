use axum::{
    Json, Router,
    extract::{Extension, Path, Query, State},
    http::StatusCode,
    routing::{get, post},
};
use axum_extra::extract::WithRejection;
use std::sync::Arc;

use crate::db::services::recurring_todo_service;
use crate::web::models::recurring_todo_models::{CreateRecurringTodo, RecurringTodoDetails, UpdateRecurringTodo};
use crate::web::models::todo_models::TodoDetails;
use crate::web::models::{AuthenticatedUser, Pagination};
use crate::web::{AppError, AppState};

pub fn create_recurring_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(list_recurring_handler).post(create_recurring_handler))
        .route(
            "/{id}",
            get(get_recurring_handler)
                .put(update_recurring_handler)
                .delete(delete_recurring_handler),
        )
        .route("/{id}/generate", post(generate_todo_handler))
}

async fn list_recurring_handler(
    Extension(authenticated_user): Extension<AuthenticatedUser>,
    State(app_state): State<Arc<AppState>>,
    WithRejection(Query(page), _): WithRejection<Query<Pagination>, AppError>,
) -> Result<Json<Vec<RecurringTodoDetails>>, AppError> {
    let templates = recurring_todo_service::get_recurring_todos(
        &app_state.db_pool,
        authenticated_user.id,
        page.offset(),
        page.limit(),
    )
    .await?;
    Ok(Json(templates))
}

async fn create_recurring_handler(
    Extension(authenticated_user): Extension<AuthenticatedUser>,
    State(app_state): State<Arc<AppState>>,
    WithRejection(Json(payload), _): WithRejection<Json<CreateRecurringTodo>, AppError>,
) -> Result<(StatusCode, Json<RecurringTodoDetails>), AppError> {
    let template =
        recurring_todo_service::create_recurring_todo(&app_state.db_pool, authenticated_user.id, payload).await?;
    Ok((StatusCode::CREATED, Json(template)))
}

async fn get_recurring_handler(
    Extension(authenticated_user): Extension<AuthenticatedUser>,
    State(app_state): State<Arc<AppState>>,
    WithRejection(Path(recurring_id), _): WithRejection<Path<i32>, AppError>,
) -> Result<Json<RecurringTodoDetails>, AppError> {
    let template =
        recurring_todo_service::get_recurring_todo(&app_state.db_pool, recurring_id, authenticated_user.id).await?;
    Ok(Json(template))
}

async fn update_recurring_handler(
    Extension(authenticated_user): Extension<AuthenticatedUser>,
    State(app_state): State<Arc<AppState>>,
    WithRejection(Path(recurring_id), _): WithRejection<Path<i32>, AppError>,
    WithRejection(Json(payload), _): WithRejection<Json<UpdateRecurringTodo>, AppError>,
) -> Result<Json<RecurringTodoDetails>, AppError> {
    let template = recurring_todo_service::update_recurring_todo(
        &app_state.db_pool,
        recurring_id,
        authenticated_user.id,
        payload,
    )
    .await?;
    Ok(Json(template))
}

async fn delete_recurring_handler(
    Extension(authenticated_user): Extension<AuthenticatedUser>,
    State(app_state): State<Arc<AppState>>,
    WithRejection(Path(recurring_id), _): WithRejection<Path<i32>, AppError>,
) -> Result<StatusCode, AppError> {
    if recurring_todo_service::delete_recurring_todo(&app_state.db_pool, recurring_id, authenticated_user.id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound("Recurring todo not found".to_string()))
    }
}

async fn generate_todo_handler(
    Extension(authenticated_user): Extension<AuthenticatedUser>,
    State(app_state): State<Arc<AppState>>,
    WithRejection(Path(recurring_id), _): WithRejection<Path<i32>, AppError>,
) -> Result<(StatusCode, Json<TodoDetails>), AppError> {
    let todo = recurring_todo_service::generate_todo(&app_state.db_pool, recurring_id, authenticated_user.id).await?;
    Ok((StatusCode::CREATED, Json(todo)))
}
