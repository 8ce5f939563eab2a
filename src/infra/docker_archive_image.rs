use std::io::Read;
use std::path::{Component, Path, PathBuf};
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll, ready};

use bytes::{Bytes, BytesMut};
use serde::Deserialize;
use thiserror::Error;
use tokio::io::{AsyncRead, ReadBuf};
use tokio::sync::mpsc;
use tracing::debug;

use crate::app::{ImageInfo, ImageInfoError, ImageLayer, LayerReader};
use crate::domain::image::config_file::ConfigFile;

const MANIFEST: &str = "manifest.json";
const DOCKER_LAYER_MEDIA_TYPE: &str = "application/vnd.docker.image.rootfs.diff.tar";
const ENTRY_CHUNK_SIZE: usize = 64 * 1024;
// At most this many chunks of an entry are buffered ahead of the reader.
const ENTRY_CHUNKS_IN_FLIGHT: usize = 4;

#[derive(Error, Debug)]
pub(in crate::infra) enum DockerArchiveError {
    #[error("internal io error: {0}")]
    IO(#[from] std::io::Error),

    #[error("unable to parse archive json: {0}")]
    Json(#[from] serde_json::Error),

    #[error("entry {0:?} not found in the archive")]
    MissingEntry(String),

    #[error("the archive manifest does not describe any image")]
    EmptyManifest,
}

impl From<DockerArchiveError> for ImageInfoError {
    fn from(value: DockerArchiveError) -> Self {
        ImageInfoError::ImageSourceError(Box::new(value))
    }
}

#[derive(Clone, Debug, Deserialize)]
struct ManifestEntry {
    #[serde(rename = "Config")]
    config: String,
    #[serde(rename = "RepoTags", default)]
    repo_tags: Option<Vec<String>>,
    #[serde(rename = "Layers")]
    layers: Vec<String>,
}

/// An image exported with `docker save`, read straight from the tarball.
///
/// Only the first image of the manifest is exposed. Layers in these archives
/// are stored uncompressed.
#[derive(Clone, Debug)]
pub struct DockerArchiveImage {
    archive: PathBuf,
    manifest: ManifestEntry,
}

#[derive(Clone, Debug)]
pub struct DockerArchiveLayer {
    archive: PathBuf,
    entry: String,
}

impl DockerArchiveImage {
    pub async fn open(archive: impl Into<PathBuf>) -> Result<Self, ImageInfoError> {
        Ok(Self::open_archive(archive.into()).await?)
    }

    async fn open_archive(archive: PathBuf) -> Result<Self, DockerArchiveError> {
        let manifest = read_entry(&archive, MANIFEST).await?;
        let manifest = serde_json::from_slice::<Vec<ManifestEntry>>(&manifest)?
            .into_iter()
            .next()
            .ok_or(DockerArchiveError::EmptyManifest)?;

        debug!(
            "opened {} with {} layers",
            archive.display(),
            manifest.layers.len()
        );

        Ok(Self { archive, manifest })
    }

    pub fn repo_tags(&self) -> &[String] {
        self.manifest.repo_tags.as_deref().unwrap_or_default()
    }

    async fn read_config_file(&self) -> Result<ConfigFile, DockerArchiveError> {
        let config = read_entry(&self.archive, &self.manifest.config).await?;
        Ok(serde_json::from_slice(&config)?)
    }
}

#[async_trait::async_trait]
impl ImageInfo for DockerArchiveImage {
    async fn config_file(&self) -> Result<ConfigFile, ImageInfoError> {
        Ok(self.read_config_file().await?)
    }

    async fn layers(&self) -> Result<Vec<Arc<dyn ImageLayer>>, ImageInfoError> {
        Ok(self
            .manifest
            .layers
            .iter()
            .map(|entry| {
                Arc::new(DockerArchiveLayer {
                    archive: self.archive.clone(),
                    entry: entry.clone(),
                }) as Arc<dyn ImageLayer>
            })
            .collect())
    }
}

#[async_trait::async_trait]
impl ImageLayer for DockerArchiveLayer {
    async fn media_type(&self) -> Result<String, ImageInfoError> {
        Ok(DOCKER_LAYER_MEDIA_TYPE.to_owned())
    }

    /// Streams the layer out of the archive. Failures locating the entry are
    /// returned here; failures further into the entry surface from the reader.
    async fn uncompressed(&self) -> Result<LayerReader, ImageInfoError> {
        let mut chunks = stream_entry(&self.archive, &self.entry);
        let current = match chunks.recv().await {
            Some(Ok(chunk)) => chunk,
            Some(Err(e)) => return Err(e.into()),
            None => Bytes::new(),
        };

        Ok(Box::new(EntryReader { chunks, current }))
    }
}

type Chunk = Result<Bytes, DockerArchiveError>;

struct EntryReader {
    chunks: mpsc::Receiver<Chunk>,
    current: Bytes,
}

impl AsyncRead for EntryReader {
    fn poll_read(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<std::io::Result<()>> {
        while self.current.is_empty() {
            match ready!(self.chunks.poll_recv(cx)) {
                Some(Ok(chunk)) => self.current = chunk,
                Some(Err(e)) => return Poll::Ready(Err(std::io::Error::other(e))),
                None => return Poll::Ready(Ok(())),
            }
        }

        let len = self.current.len().min(buf.remaining());
        buf.put_slice(&self.current.split_to(len));
        Poll::Ready(Ok(()))
    }
}

/// Reads a whole entry into memory. Only meant for the small json entries.
async fn read_entry(archive: &Path, name: &str) -> Result<Bytes, DockerArchiveError> {
    let mut chunks = stream_entry(archive, name);
    let mut contents = BytesMut::new();
    while let Some(chunk) = chunks.recv().await {
        contents.extend_from_slice(&chunk?);
    }
    Ok(contents.freeze())
}

fn stream_entry(archive: &Path, name: &str) -> mpsc::Receiver<Chunk> {
    let (tx, rx) = mpsc::channel(ENTRY_CHUNKS_IN_FLIGHT);
    let archive = archive.to_owned();
    let wanted = normalize(Path::new(name));

    tokio::task::spawn_blocking(move || {
        if let Err(e) = send_entry(&archive, &wanted, &tx) {
            let _ = tx.blocking_send(Err(e));
        }
    });

    rx
}

fn send_entry(
    archive: &Path,
    wanted: &Path,
    tx: &mpsc::Sender<Chunk>,
) -> Result<(), DockerArchiveError> {
    let mut tar = tar::Archive::new(std::fs::File::open(archive)?);

    for entry in tar.entries()? {
        let mut entry = entry?;
        if normalize(&entry.path()?).as_path() != wanted {
            continue;
        }

        let mut buf = vec![0; ENTRY_CHUNK_SIZE];
        loop {
            let read = entry.read(&mut buf)?;
            if read == 0 {
                return Ok(());
            }
            if tx.blocking_send(Ok(Bytes::copy_from_slice(&buf[..read]))).is_err() {
                debug!("reader of {} went away", wanted.display());
                return Ok(());
            }
        }
    }

    Err(DockerArchiveError::MissingEntry(
        wanted.to_string_lossy().into_owned(),
    ))
}

fn normalize(path: &Path) -> PathBuf {
    path.components()
        .filter(|c| !matches!(c, Component::CurDir))
        .collect()
}
