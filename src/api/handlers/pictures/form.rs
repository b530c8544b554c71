use axum::extract::Multipart;

use crate::api::error::AppError;
use crate::services::gallery::{ImageUpload, PictureFields};

#[derive(Debug, Default)]
pub struct PictureForm {
    pub id: Option<String>,
    pub fields: PictureFields,
    pub image: Option<ImageUpload>,
}

impl PictureForm {
    /// The `id` field of a form-posted update.
    pub fn picture_id(&self) -> Result<i32, AppError> {
        self.id
            .as_deref()
            .map(str::trim)
            .and_then(|v| v.parse::<i32>().ok())
            .filter(|id| *id > 0)
            .ok_or_else(|| AppError::Validation("Invalid or missing picture id".to_string()))
    }
}

async fn collect_fields(multipart: &mut Multipart) -> Result<PictureForm, AppError> {
    let mut form = PictureForm::default();

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();

        match name.as_str() {
            "image" => {
                let declared_mime = field.content_type().map(|s| s.to_string());
                let bytes = field.bytes().await?;
                // Browsers send an empty part for an untouched file input
                if !bytes.is_empty() {
                    form.image = Some(ImageUpload {
                        bytes,
                        declared_mime,
                    });
                }
            }
            "id" => form.id = Some(field.text().await?),
            "creator" => form.fields.creator = field.text().await?,
            "date" => form.fields.date = field.text().await?,
            "project" => form.fields.project = field.text().await?,
            "color" => form.fields.color = Some(field.text().await?),
            "description" => form.fields.description = Some(field.text().await?),
            other => tracing::debug!("Ignoring unknown form field '{}'", other),
        }
    }

    Ok(form)
}

/// Reads the whole picture form. On error the rest of the body is still
/// consumed so the client sees the JSON error instead of a reset connection.
pub async fn read_picture_form(mut multipart: Multipart) -> Result<PictureForm, AppError> {
    let result = collect_fields(&mut multipart).await;

    if let Err(e) = &result {
        tracing::warn!("Picture form rejected early: {}. Consuming remaining stream...", e);
        while let Ok(Some(mut field)) = multipart.next_field().await {
            while let Ok(Some(_)) = field.chunk().await {}
        }
    }

    result
}
