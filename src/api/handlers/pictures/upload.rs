use axum::{
    Json,
    extract::{Multipart, Path, State},
};

use crate::AppState;
use crate::api::error::AppError;

use super::form::{PictureForm, read_picture_form};
use super::types::*;

#[utoipa::path(
    post,
    path = "/pictures",
    request_body(content = PictureUploadForm, content_type = "multipart/form-data"),
    responses(
        (
            status = 200,
            description = "Picture stored with all variants",
            body = CreatePictureResponse
        ),
        (status = 400, description = "Missing or invalid field"),
        (status = 413, description = "Image too large"),
        (status = 415, description = "Unsupported image format"),
        (status = 500, description = "Derivation, storage or database failure")
    ),
    tag = "pictures"
)]
pub async fn create_picture(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<CreatePictureResponse>, AppError> {
    let form = read_picture_form(multipart).await?;
    let image = form
        .image
        .ok_or_else(|| AppError::Validation("No image uploaded".to_string()))?;

    let created = state.gallery.create_picture(form.fields, image).await?;

    Ok(Json(CreatePictureResponse {
        success: true,
        id: created.picture.id,
        filenames: created.variants,
    }))
}

async fn apply_update(
    state: &AppState,
    id: i32,
    form: PictureForm,
) -> Result<Json<UpdatePictureResponse>, AppError> {
    let outcome = state
        .gallery
        .update_picture(id, form.fields, form.image)
        .await?;

    Ok(Json(UpdatePictureResponse {
        success: true,
        id: outcome.picture.id,
        updated: UpdatedParts {
            metadata: true,
            image: outcome.image_replaced,
        },
    }))
}

#[utoipa::path(
    put,
    path = "/pictures/{id}",
    params(("id" = i32, Path, description = "Picture id")),
    request_body(content = PictureUploadForm, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Picture updated", body = UpdatePictureResponse),
        (status = 400, description = "Missing or invalid field"),
        (status = 404, description = "Picture not found"),
        (status = 415, description = "Unsupported image format")
    ),
    tag = "pictures"
)]
pub async fn update_picture(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    multipart: Multipart,
) -> Result<Json<UpdatePictureResponse>, AppError> {
    let form = read_picture_form(multipart).await?;
    apply_update(&state, id, form).await
}

#[utoipa::path(
    post,
    path = "/pictures/update",
    request_body(content = PictureUploadForm, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Picture updated", body = UpdatePictureResponse),
        (status = 400, description = "Missing or invalid field"),
        (status = 404, description = "Picture not found")
    ),
    tag = "pictures"
)]
pub async fn update_picture_form(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<UpdatePictureResponse>, AppError> {
    let form = read_picture_form(multipart).await?;
    let id = form.picture_id()?;
    apply_update(&state, id, form).await
}
