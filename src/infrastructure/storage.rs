use crate::config::GalleryConfig;
use crate::services::asset_store::LocalAssetStore;
use std::sync::Arc;
use tracing::info;

pub async fn setup_storage(config: &GalleryConfig) -> anyhow::Result<Arc<LocalAssetStore>> {
    let store = LocalAssetStore::new(&config.upload_dir);
    store.ensure_layout().await?;

    info!("🗂️  Asset Storage: {}", store.root().display());

    Ok(Arc::new(store))
}
