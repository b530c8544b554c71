use crate::api::error::AppError;
use crate::entities::pictures;
use crate::services::catalog::{Facets, GalleryFilter};
use crate::services::variant_set::VariantClass;

use super::{GalleryService, PictureRecord};

/// Public URL of one variant file: `<prefix>/<class>/<filename>`.
pub fn variant_url(prefix: &str, class: VariantClass, filename: &str) -> String {
    let prefix = prefix.trim_end_matches('/');
    if prefix.is_empty() {
        format!("{}/{}", class.name(), filename)
    } else {
        format!("{}/{}/{}", prefix, class.name(), filename)
    }
}

impl GalleryService {
    pub fn to_record(&self, row: pictures::Model) -> PictureRecord {
        let prefix = &self.config.public_url_prefix;
        PictureRecord {
            id: row.id,
            url_thumb: variant_url(prefix, VariantClass::Thumb, &row.filename_thumb),
            url_medium: variant_url(prefix, VariantClass::Medium, &row.filename_medium),
            url_original: variant_url(prefix, VariantClass::Original, &row.filename_original),
            creator: row.creator,
            date: row.date,
            project: row.project,
            color: row.color,
            description: row.description,
        }
    }

    pub async fn list_pictures(
        &self,
        filter: &GalleryFilter,
    ) -> Result<Vec<PictureRecord>, AppError> {
        let rows = self.catalog.list(filter).await?;
        Ok(rows.into_iter().map(|row| self.to_record(row)).collect())
    }

    pub async fn facets(&self) -> Result<Facets, AppError> {
        Ok(self.catalog.facets().await?)
    }
}
