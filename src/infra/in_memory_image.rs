use std::collections::HashMap;
use std::io::Cursor;
use std::sync::Arc;

use bytes::Bytes;

use crate::app::{ImageInfo, ImageInfoError, ImageLayer, LayerReader};
use crate::domain::image::config_file::ConfigFile;

/// An image whose configuration and layer blobs are already held in memory.
#[derive(Clone, Debug, Default)]
pub struct InMemoryImage {
    config_file: ConfigFile,
    layers: Vec<Arc<InMemoryLayer>>,
}

#[derive(Clone, Debug)]
pub struct InMemoryLayer {
    media_type: String,
    contents: Bytes,
}

#[derive(Default)]
pub struct InMemoryImageBuilder {
    labels: HashMap<String, String>,
    layers: Vec<Arc<InMemoryLayer>>,
}

impl InMemoryImage {
    pub fn builder() -> InMemoryImageBuilder {
        InMemoryImageBuilder::default()
    }
}

impl InMemoryImageBuilder {
    pub fn label(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.labels.insert(key.into(), value.into());
        self
    }

    /// Appends a layer on top of the ones added so far.
    pub fn layer(mut self, media_type: impl Into<String>, contents: impl Into<Bytes>) -> Self {
        self.layers.push(Arc::new(InMemoryLayer {
            media_type: media_type.into(),
            contents: contents.into(),
        }));
        self
    }

    pub fn build(self) -> InMemoryImage {
        InMemoryImage {
            config_file: ConfigFile::with_labels(self.labels),
            layers: self.layers,
        }
    }
}

#[async_trait::async_trait]
impl ImageInfo for InMemoryImage {
    async fn config_file(&self) -> Result<ConfigFile, ImageInfoError> {
        Ok(self.config_file.clone())
    }

    async fn layers(&self) -> Result<Vec<Arc<dyn ImageLayer>>, ImageInfoError> {
        Ok(self
            .layers
            .iter()
            .map(|layer| layer.clone() as Arc<dyn ImageLayer>)
            .collect())
    }
}

#[async_trait::async_trait]
impl ImageLayer for InMemoryLayer {
    async fn media_type(&self) -> Result<String, ImageInfoError> {
        Ok(self.media_type.clone())
    }

    async fn uncompressed(&self) -> Result<LayerReader, ImageInfoError> {
        Ok(Box::new(Cursor::new(self.contents.clone())))
    }
}
