use crate::api::error::AppError;
use tracing::info;

use super::{CreatedPicture, GalleryService, ImageUpload, PictureFields};

impl GalleryService {
    pub async fn create_picture(
        &self,
        fields: PictureFields,
        upload: ImageUpload,
    ) -> Result<CreatedPicture, AppError> {
        let metadata = fields.into_metadata()?;
        self.check_upload(&upload)?;

        let variants = self.derive_and_store(upload).await?;

        let picture = match self.catalog.create(&variants, &metadata).await {
            Ok(picture) => picture,
            Err(e) => {
                self.discard(&variants, "catalog insert failed").await;
                return Err(e.into());
            }
        };

        info!(
            "📸 Picture {} created by '{}' ({})",
            picture.id, picture.creator, variants.original
        );

        Ok(CreatedPicture { picture, variants })
    }
}
