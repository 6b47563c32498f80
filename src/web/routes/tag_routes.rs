use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, put},
};
use axum_extra::extract::WithRejection;
use serde::Deserialize;
use std::sync::Arc;

use crate::db::entities::tag;
use crate::db::services::tag_service;
use crate::web::{AppError, AppState};

pub fn create_tags_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(get_tags_handler).post(create_tag_handler))
        .route("/{id}", put(update_tag_handler).delete(delete_tag_handler))
}

#[derive(Deserialize)]
pub struct TagRequest {
    name: String,
    color: String,
}

async fn create_tag_handler(
    State(app_state): State<Arc<AppState>>,
    WithRejection(Json(payload), _): WithRejection<Json<TagRequest>, AppError>,
) -> Result<(StatusCode, Json<tag::Model>), AppError> {
    let tag = tag_service::create_tag(&app_state.db_pool, &payload.name, &payload.color).await?;
    Ok((StatusCode::CREATED, Json(tag)))
}

async fn get_tags_handler(State(app_state): State<Arc<AppState>>) -> Result<Json<Vec<tag::Model>>, AppError> {
    let tags = tag_service::get_all_tags(&app_state.db_pool).await?;
    Ok(Json(tags))
}

async fn update_tag_handler(
    State(app_state): State<Arc<AppState>>,
    WithRejection(Path(tag_id), _): WithRejection<Path<i32>, AppError>,
    WithRejection(Json(payload), _): WithRejection<Json<TagRequest>, AppError>,
) -> Result<Json<tag::Model>, AppError> {
    let tag = tag_service::update_tag(&app_state.db_pool, tag_id, &payload.name, &payload.color).await?;
    Ok(Json(tag))
}

async fn delete_tag_handler(
    State(app_state): State<Arc<AppState>>,
    WithRejection(Path(tag_id), _): WithRejection<Path<i32>, AppError>,
) -> Result<StatusCode, AppError> {
    tag_service::delete_tag(&app_state.db_pool, tag_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
