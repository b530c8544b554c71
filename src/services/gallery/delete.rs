use crate::api::error::AppError;
use tracing::{info, warn};

use super::{DeleteOutcome, EXPECTED_FILES, GalleryService};

impl GalleryService {
    /// Removes the row, then its files. Missing files do not fail the delete.
    pub async fn delete_picture(&self, id: i32) -> Result<DeleteOutcome, AppError> {
        let variants = self.catalog.delete(id).await?;
        let deleted_files = self.assets.delete(&variants).await;

        if deleted_files < EXPECTED_FILES {
            warn!(
                "Picture {} deleted but only {}/{} files were present",
                id, deleted_files, EXPECTED_FILES
            );
        } else {
            info!("🗑️  Picture {} deleted", id);
        }

        Ok(DeleteOutcome {
            id,
            deleted_files,
            expected_files: EXPECTED_FILES,
        })
    }
}
