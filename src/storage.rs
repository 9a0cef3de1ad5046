//! Output-path and gallery collaborators.

use crate::config::StorageConfig;
use crate::errors::CameraError;
use chrono::Local;
use std::fs;
use std::path::{Path, PathBuf};

/// Supplies unique output file paths.
pub trait PathProvider: Send + Sync {
    fn next_image_path(&self) -> Result<PathBuf, CameraError>;
    fn next_video_path(&self) -> Result<PathBuf, CameraError>;
}

/// Told about each finished media file; best effort.
pub trait GalleryNotifier: Send + Sync {
    fn notify(&self, path: &Path);
}

/// Names files `<prefix>_<YYYYMMDD_HHMMSS_mmm>_<8 hex>.<ext>` under a base
/// directory, creating the directory on demand.
#[derive(Debug, Clone)]
pub struct DirectoryPathProvider {
    base: PathBuf,
    prefix: String,
    image_extension: String,
    video_extension: String,
}

impl DirectoryPathProvider {
    pub fn new(base: impl Into<PathBuf>) -> Self {
        Self {
            base: base.into(),
            prefix: "CRAB".to_string(),
            image_extension: "jpg".to_string(),
            video_extension: "mp4".to_string(),
        }
    }

    pub fn from_config(config: &StorageConfig) -> Self {
        Self {
            base: config.output_directory.clone(),
            prefix: config.file_prefix.clone(),
            image_extension: config.image_extension.clone(),
            video_extension: config.video_extension.clone(),
        }
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    pub fn base(&self) -> &Path {
        &self.base
    }

    fn next_path(&self, extension: &str) -> Result<PathBuf, CameraError> {
        fs::create_dir_all(&self.base).map_err(|e| {
            CameraError::storage(format!(
                "Cannot create output directory {}: {}",
                self.base.display(),
                e
            ))
        })?;
        if !self.base.is_dir() {
            return Err(CameraError::storage(format!(
                "Output path {} is not a directory",
                self.base.display()
            )));
        }

        let stamp = Local::now().format("%Y%m%d_%H%M%S_%3f");
        let unique = uuid::Uuid::new_v4().simple().to_string();
        let name = format!("{}_{}_{}.{}", self.prefix, stamp, &unique[..8], extension);
        Ok(self.base.join(name))
    }
}

impl PathProvider for DirectoryPathProvider {
    fn next_image_path(&self) -> Result<PathBuf, CameraError> {
        self.next_path(&self.image_extension)
    }

    fn next_video_path(&self) -> Result<PathBuf, CameraError> {
        self.next_path(&self.video_extension)
    }
}

/// Gallery notifier that only records the event in the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingGalleryNotifier;

impl GalleryNotifier for LoggingGalleryNotifier {
    fn notify(&self, path: &Path) {
        log::info!("New media available: {}", path.display());
    }
}

/// Writes a still frame to `path`.
pub(crate) fn write_frame(path: &Path, data: &[u8]) -> Result<(), CameraError> {
    fs::write(path, data).map_err(|e| {
        CameraError::storage(format!("Failed to write {}: {}", path.display(), e))
    })
}
