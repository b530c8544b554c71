use crate::api::error::AppError;
use crate::services::catalog::CatalogError;
use tracing::{info, warn};

use super::{EXPECTED_FILES, GalleryService, ImageUpload, PictureFields, UpdateOutcome};

impl GalleryService {
    /// Updates metadata and, when an image is supplied, replaces the variant
    /// set. New files are written and committed before the old ones go away.
    pub async fn update_picture(
        &self,
        id: i32,
        fields: PictureFields,
        upload: Option<ImageUpload>,
    ) -> Result<UpdateOutcome, AppError> {
        let metadata = fields.into_metadata()?;

        let Some(upload) = upload else {
            let updated = self.catalog.update(id, None, &metadata).await?;
            info!("✏️  Picture {} metadata updated", id);
            return Ok(UpdateOutcome {
                picture: updated.picture,
                image_replaced: false,
            });
        };

        self.check_upload(&upload)?;

        // Fail fast before any codec work
        if self.catalog.find(id).await?.is_none() {
            return Err(CatalogError::NotFound(id).into());
        }

        let variants = self.derive_and_store(upload).await?;

        let updated = match self.catalog.update(id, Some(&variants), &metadata).await {
            Ok(updated) => updated,
            Err(e) => {
                self.discard(&variants, "catalog update failed").await;
                return Err(e.into());
            }
        };

        if let Some(superseded) = &updated.superseded {
            let removed = self.assets.delete(superseded).await;
            if removed < EXPECTED_FILES {
                warn!(
                    "Picture {}: only {}/{} superseded files removed",
                    id, removed, EXPECTED_FILES
                );
            }
        }

        info!("🖼️  Picture {} image replaced ({})", id, variants.original);

        Ok(UpdateOutcome {
            picture: updated.picture,
            image_replaced: true,
        })
    }
}
