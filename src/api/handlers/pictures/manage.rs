use axum::{
    Json,
    extract::{Path, State},
};

use crate::AppState;
use crate::api::error::AppError;

use super::types::*;

async fn remove(state: &AppState, id: i32) -> Result<Json<DeletePictureResponse>, AppError> {
    let outcome = state.gallery.delete_picture(id).await?;

    Ok(Json(DeletePictureResponse {
        success: true,
        deleted_files: outcome.deleted_files,
        expected_files: outcome.expected_files,
    }))
}

#[utoipa::path(
    delete,
    path = "/pictures/{id}",
    params(("id" = i32, Path, description = "Picture id")),
    responses(
        (status = 200, description = "Picture and its files removed", body = DeletePictureResponse),
        (status = 404, description = "Picture not found")
    ),
    tag = "pictures"
)]
pub async fn delete_picture(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<DeletePictureResponse>, AppError> {
    remove(&state, id).await
}

#[utoipa::path(
    post,
    path = "/pictures/delete",
    request_body = DeletePictureRequest,
    responses(
        (status = 200, description = "Picture and its files removed", body = DeletePictureResponse),
        (status = 404, description = "Picture not found")
    ),
    tag = "pictures"
)]
pub async fn delete_picture_json(
    State(state): State<AppState>,
    Json(req): Json<DeletePictureRequest>,
) -> Result<Json<DeletePictureResponse>, AppError> {
    if req.id <= 0 {
        return Err(AppError::Validation("Invalid picture id".to_string()));
    }
    remove(&state, req.id).await
}
