use std::path::{Path, PathBuf};
use std::sync::Arc;

use thiserror::Error;
use tokio::io::AsyncRead;

use crate::domain::image::config_file::ConfigFile;

pub type LayerReader = Box<dyn AsyncRead + Send + Unpin>;

/// Access to the configuration and layers of an already resolved image.
#[async_trait::async_trait]
pub trait ImageInfo: Send + Sync {
    async fn config_file(&self) -> Result<ConfigFile, ImageInfoError>;

    /// Layers from the base of the image upwards.
    async fn layers(&self) -> Result<Vec<Arc<dyn ImageLayer>>, ImageInfoError>;
}

#[async_trait::async_trait]
pub trait ImageLayer: Send + Sync {
    async fn media_type(&self) -> Result<String, ImageInfoError>;

    async fn uncompressed(&self) -> Result<LayerReader, ImageInfoError>;
}

#[derive(Error, Debug)]
pub enum ImageInfoError {
    #[error("image source error: {0}")]
    ImageSourceError(Box<dyn std::error::Error + Send + Sync>),

    #[error("image i/o error: {0}")]
    IO(#[from] std::io::Error),
}

/// An image handed to the checks: metadata plus the path where its root
/// filesystem has been extracted. Never mutated once built.
#[derive(Clone)]
pub struct ImageReference {
    image_info: Arc<dyn ImageInfo>,
    image_fs_path: PathBuf,
}

impl ImageReference {
    pub fn new(image_info: Arc<dyn ImageInfo>, image_fs_path: impl Into<PathBuf>) -> Self {
        Self {
            image_info,
            image_fs_path: image_fs_path.into(),
        }
    }

    pub fn image_info(&self) -> &dyn ImageInfo {
        self.image_info.as_ref()
    }

    pub fn image_fs_path(&self) -> &Path {
        &self.image_fs_path
    }
}

impl std::fmt::Debug for ImageReference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageReference")
            .field("image_fs_path", &self.image_fs_path)
            .finish_non_exhaustive()
    }
}
