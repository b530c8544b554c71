use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::services::variant_set::VariantSet;

/// Multipart body accepted by the create and update endpoints.
#[allow(dead_code)]
#[derive(ToSchema)]
pub struct PictureUploadForm {
    /// Picture id, only read by `POST /pictures/update`
    pub id: Option<i32>,
    pub creator: String,
    /// Calendar date, `YYYY-MM-DD`
    pub date: String,
    pub project: String,
    pub color: Option<String>,
    pub description: Option<String>,
    /// JPEG, PNG, GIF or WebP. Optional on update.
    #[schema(value_type = String, format = Binary)]
    pub image: Option<Vec<u8>>,
}

#[derive(Serialize, ToSchema)]
pub struct CreatePictureResponse {
    pub success: bool,
    pub id: i32,
    pub filenames: VariantSet,
}

#[derive(Serialize, ToSchema)]
pub struct UpdatedParts {
    pub metadata: bool,
    pub image: bool,
}

#[derive(Serialize, ToSchema)]
pub struct UpdatePictureResponse {
    pub success: bool,
    pub id: i32,
    pub updated: UpdatedParts,
}

#[derive(Deserialize, ToSchema)]
pub struct DeletePictureRequest {
    pub id: i32,
}

#[derive(Serialize, ToSchema)]
pub struct DeletePictureResponse {
    pub success: bool,
    pub deleted_files: usize,
    pub expected_files: usize,
}
