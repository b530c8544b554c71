use axum::{
    Json,
    extract::{Query, State},
};

use crate::AppState;
use crate::api::error::AppError;
use crate::services::catalog::{Facets, GalleryFilter};
use crate::services::gallery::PictureRecord;

#[utoipa::path(
    get,
    path = "/pictures",
    params(GalleryFilter),
    responses(
        (status = 200, description = "Gallery, newest first", body = Vec<PictureRecord>)
    ),
    tag = "pictures"
)]
pub async fn list_pictures(
    State(state): State<AppState>,
    Query(filter): Query<GalleryFilter>,
) -> Result<Json<Vec<PictureRecord>>, AppError> {
    Ok(Json(state.gallery.list_pictures(&filter).await?))
}

#[utoipa::path(
    get,
    path = "/pictures/facets",
    responses(
        (status = 200, description = "Distinct filter values", body = Facets)
    ),
    tag = "pictures"
)]
pub async fn picture_facets(State(state): State<AppState>) -> Result<Json<Facets>, AppError> {
    Ok(Json(state.gallery.facets().await?))
}
