use crate::api::error::AppError;
use crate::config::GalleryConfig;
use crate::services::asset_store::AssetStore;
use crate::services::catalog::Catalog;
use crate::services::codec::VariantCodec;
use crate::services::pipeline::DerivationPipeline;
use crate::services::variant_set::{VariantClass, VariantSet};
use crate::utils::validation::{validate_file_size, validate_mime_type};
use std::sync::Arc;

pub mod create;
pub mod delete;
pub mod query;
pub mod types;
pub mod update;

pub use types::{
    CreatedPicture, DeleteOutcome, ImageUpload, PictureFields, PictureRecord, UpdateOutcome,
};

/// Number of files every picture owns on disk.
pub const EXPECTED_FILES: usize = VariantClass::ALL.len();

/// Coordinates the codec pipeline, the asset store and the catalog so that
/// rows and variant files never drift apart.
pub struct GalleryService {
    catalog: Arc<dyn Catalog>,
    assets: Arc<dyn AssetStore>,
    pipeline: DerivationPipeline,
    config: GalleryConfig,
}

impl GalleryService {
    pub fn new(
        catalog: Arc<dyn Catalog>,
        assets: Arc<dyn AssetStore>,
        codec: Arc<dyn VariantCodec>,
        config: GalleryConfig,
    ) -> Self {
        Self {
            catalog,
            assets,
            pipeline: DerivationPipeline::new(codec, config.derivation_mode),
            config,
        }
    }

    fn check_upload(&self, upload: &ImageUpload) -> Result<(), AppError> {
        validate_file_size(upload.bytes.len(), self.config.max_file_size)?;
        validate_mime_type(upload.declared_mime.as_deref().unwrap_or_default())?;
        Ok(())
    }

    /// Derives all variants and writes them under a fresh base identifier.
    /// If any write fails the files already written are removed.
    async fn derive_and_store(&self, upload: ImageUpload) -> Result<VariantSet, AppError> {
        let derived = self.pipeline.derive_all(upload.bytes).await?;

        let base = self.assets.allocate();
        let extension = derived.extension();
        let variants = VariantSet::new(&base, extension);

        for variant in &derived.variants {
            if let Err(e) = self
                .assets
                .write(&base, variant.profile.class, &variant.encoded.bytes, extension)
                .await
            {
                self.discard(&variants, "variant write failed").await;
                return Err(e.into());
            }
        }

        Ok(variants)
    }

    /// Compensation: removes files no row will ever reference.
    async fn discard(&self, variants: &VariantSet, reason: &str) {
        let removed = self.assets.delete(variants).await;
        tracing::warn!(
            "🧹 Discarded variant set {} after {}: {} file(s) removed",
            variants.original,
            reason,
            removed
        );
    }
}
