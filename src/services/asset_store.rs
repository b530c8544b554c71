use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use thiserror::Error;
use uuid::Uuid;

use crate::services::variant_set::{BaseIdentifier, VariantClass, VariantSet};

#[derive(Debug, Error)]
pub enum AssetStoreError {
    #[error("refusing unsafe asset filename '{0}'")]
    UnsafeFilename(String),

    #[error("failed to write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Physical storage for derived variant files.
#[async_trait]
pub trait AssetStore: Send + Sync {
    /// Generates a fresh identifier for a new variant set.
    fn allocate(&self) -> BaseIdentifier;

    /// Writes one variant, creating the class directory if needed.
    async fn write(
        &self,
        base: &BaseIdentifier,
        class: VariantClass,
        bytes: &[u8],
        extension: &str,
    ) -> Result<PathBuf, AssetStoreError>;

    /// Best-effort removal of a whole set. Missing files are not an error.
    /// Returns how many files were actually removed.
    async fn delete(&self, set: &VariantSet) -> usize;

    async fn exists(&self, class: VariantClass, filename: &str) -> bool;

    async fn health_check(&self) -> bool;
}

/// Only store-generated names are ever joined onto the root.
fn is_safe_filename(name: &str) -> bool {
    !name.is_empty()
        && !name.starts_with('.')
        && !name.contains("..")
        && !name.contains(['/', '\\', '\0'])
        && Path::new(name).file_name().and_then(|n| n.to_str()) == Some(name)
}

/// Directory-per-class layout on the local filesystem:
/// `<root>/thumb`, `<root>/medium`, `<root>/original`.
#[derive(Debug, Clone)]
pub struct LocalAssetStore {
    root: PathBuf,
}

impl LocalAssetStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn class_dir(&self, class: VariantClass) -> PathBuf {
        self.root.join(class.name())
    }

    pub fn resolve(&self, class: VariantClass, filename: &str) -> Result<PathBuf, AssetStoreError> {
        if !is_safe_filename(filename) {
            tracing::warn!("Rejected unsafe asset filename: {:?}", filename);
            return Err(AssetStoreError::UnsafeFilename(filename.to_string()));
        }
        Ok(self.class_dir(class).join(filename))
    }

    pub async fn ensure_layout(&self) -> std::io::Result<()> {
        for class in VariantClass::ALL {
            tokio::fs::create_dir_all(self.class_dir(class)).await?;
        }
        Ok(())
    }
}

#[async_trait]
impl AssetStore for LocalAssetStore {
    fn allocate(&self) -> BaseIdentifier {
        BaseIdentifier::generate()
    }

    async fn write(
        &self,
        base: &BaseIdentifier,
        class: VariantClass,
        bytes: &[u8],
        extension: &str,
    ) -> Result<PathBuf, AssetStoreError> {
        let dir = self.class_dir(class);
        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|source| AssetStoreError::Write {
                path: dir.clone(),
                source,
            })?;

        let filename = base.filename(class, extension);
        let path = self.resolve(class, &filename)?;

        // Write beside the target and rename so readers never see a partial file
        let tmp_path = dir.join(format!(".{}.{}.tmp", filename, Uuid::new_v4().simple()));
        if let Err(source) = tokio::fs::write(&tmp_path, bytes).await {
            let _ = tokio::fs::remove_file(&tmp_path).await;
            return Err(AssetStoreError::Write { path, source });
        }
        if let Err(source) = tokio::fs::rename(&tmp_path, &path).await {
            let _ = tokio::fs::remove_file(&tmp_path).await;
            return Err(AssetStoreError::Write { path, source });
        }

        tracing::debug!("Stored {} variant at {}", class, path.display());
        Ok(path)
    }

    async fn delete(&self, set: &VariantSet) -> usize {
        let mut removed = 0;

        for (class, filename) in set.iter() {
            let Ok(path) = self.resolve(class, filename) else {
                continue;
            };
            match tokio::fs::remove_file(&path).await {
                Ok(()) => removed += 1,
                Err(e) if e.kind() == ErrorKind::NotFound => {
                    tracing::debug!("Variant already absent: {}", path.display());
                }
                Err(e) => {
                    tracing::warn!("Failed to delete variant {}: {}", path.display(), e);
                }
            }
        }

        removed
    }

    async fn exists(&self, class: VariantClass, filename: &str) -> bool {
        match self.resolve(class, filename) {
            Ok(path) => tokio::fs::try_exists(path).await.unwrap_or(false),
            Err(_) => false,
        }
    }

    async fn health_check(&self) -> bool {
        tokio::fs::metadata(&self.root)
            .await
            .map(|m| m.is_dir())
            .unwrap_or(false)
    }
}
