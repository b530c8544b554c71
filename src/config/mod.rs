use std::env;
use std::path::PathBuf;

use crate::services::pipeline::DerivationMode;

/// Runtime configuration for the gallery service
#[derive(Debug, Clone)]
pub struct GalleryConfig {
    /// Database connection string (default: local SQLite file)
    pub database_url: String,

    /// Root directory holding the thumb/medium/original variant folders (default: "uploads")
    pub upload_dir: PathBuf,

    /// URL prefix the variant folders are served under (default: "uploads")
    pub public_url_prefix: String,

    /// Maximum accepted image size in bytes (default: 32 MB)
    pub max_file_size: usize,

    /// How the derivation profiles are scheduled (default: parallel)
    pub derivation_mode: DerivationMode,
}

impl Default for GalleryConfig {
    fn default() -> Self {
        Self {
            database_url: "sqlite://gallery.db?mode=rwc".to_string(),
            upload_dir: PathBuf::from("uploads"),
            public_url_prefix: "uploads".to_string(),
            max_file_size: 32 * 1024 * 1024, // 32 MB
            derivation_mode: DerivationMode::Parallel,
        }
    }
}

impl GalleryConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let default = Self::default();

        Self {
            database_url: env::var("DATABASE_URL").unwrap_or(default.database_url),

            upload_dir: env::var("UPLOAD_DIR")
                .map(PathBuf::from)
                .unwrap_or(default.upload_dir),

            public_url_prefix: env::var("PUBLIC_URL_PREFIX")
                .map(|v| v.trim_end_matches('/').to_string())
                .unwrap_or(default.public_url_prefix),

            max_file_size: env::var("MAX_FILE_SIZE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(default.max_file_size),

            derivation_mode: env::var("DERIVATION_MODE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(default.derivation_mode),
        }
    }

    /// Config for local development and tests: in-memory database, sequential derivation
    pub fn development(upload_dir: impl Into<PathBuf>) -> Self {
        Self {
            database_url: "sqlite::memory:".to_string(),
            upload_dir: upload_dir.into(),
            public_url_prefix: "uploads".to_string(),
            max_file_size: 64 * 1024 * 1024,
            derivation_mode: DerivationMode::Sequential,
        }
    }
}
