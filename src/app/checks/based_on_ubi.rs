use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;

use crate::app::{CheckError, ImageInfo, ImageInfoError, ImageReference};
use crate::domain::certification::{help_text::HelpText, level::Level, metadata::Metadata};
use crate::domain::image::config_file::ConfigFile;

use super::Check;

const COMPONENT_LABEL: &str = "com.redhat.component";
const UBI_COMPONENT_MARKER: &str = "ubi";
const RHEL_ID: &str = r#"ID="rhel""#;
const RHEL_NAME: &str = r#"NAME="Red Hat Enterprise Linux""#;

#[derive(Error, Debug)]
pub(in crate::app::checks) enum BasedOnUbiError {
    #[error("unable to read image labels: {0}")]
    Labels(#[source] ImageInfoError),

    #[error("unable to list image layers: {0}")]
    Layers(#[source] ImageInfoError),

    #[error("unable to read image layer {index}: {source}")]
    Layer {
        index: usize,
        #[source]
        source: ImageInfoError,
    },

    #[error("unable to read the contents of {}: {source}", path.display())]
    OsRelease {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl From<BasedOnUbiError> for CheckError {
    fn from(value: BasedOnUbiError) -> Self {
        CheckError::Evaluation(Box::new(value))
    }
}

/// Evaluates whether the image is built on the Red Hat Universal Base Image.
///
/// Three signals have to hold at once: `/etc/os-release` carries the RHEL
/// `ID` and the RHEL `NAME`, and the `com.redhat.component` label names a
/// UBI component.
#[derive(Clone, Copy, Debug, Default)]
pub struct BasedOnUbiCheck;

impl BasedOnUbiCheck {
    async fn config_file(
        &self,
        image_info: &dyn ImageInfo,
    ) -> Result<ConfigFile, BasedOnUbiError> {
        image_info
            .config_file()
            .await
            .map_err(BasedOnUbiError::Labels)
    }

    /// Drains every layer stream. Only the log output depends on it.
    async fn audit_layers(&self, image_info: &dyn ImageInfo) -> Result<(), BasedOnUbiError> {
        let layers = image_info
            .layers()
            .await
            .map_err(BasedOnUbiError::Layers)?;

        for (index, layer) in layers.iter().enumerate() {
            let layer_error = |source| BasedOnUbiError::Layer { index, source };

            let mut reader = layer.uncompressed().await.map_err(layer_error)?;
            let size = tokio::io::copy(&mut reader, &mut tokio::io::sink())
                .await
                .map_err(|e| layer_error(e.into()))?;
            let media_type = layer.media_type().await.map_err(layer_error)?;

            debug!("layer {index}: {media_type} ({size} bytes uncompressed)");
        }

        Ok(())
    }

    async fn os_release_contents(
        &self,
        image_fs_path: &Path,
    ) -> Result<Vec<String>, BasedOnUbiError> {
        let path = image_fs_path.join("etc").join("os-release");

        let contents = tokio::fs::read(&path).await.map_err(|source| {
            debug!("could not open os-release file for reading");
            BasedOnUbiError::OsRelease { path, source }
        })?;

        // os-release is not guaranteed to be UTF-8; only ASCII keys matter here.
        Ok(String::from_utf8_lossy(&contents)
            .split('\n')
            .map(str::to_owned)
            .collect())
    }

    fn is_based_on_ubi(&self, component: Option<&str>, os_release: &[String]) -> bool {
        let mut has_rhel_id = false;
        let mut has_rhel_name = false;
        for line in os_release {
            if line.starts_with(RHEL_ID) {
                has_rhel_id = true;
            } else if line.starts_with(RHEL_NAME) {
                has_rhel_name = true;
            }
        }

        let has_ubi_component_label =
            component.is_some_and(|component| component.contains(UBI_COMPONENT_MARKER));

        has_rhel_id && has_rhel_name && has_ubi_component_label
    }
}

#[async_trait::async_trait]
impl Check for BasedOnUbiCheck {
    async fn validate(&self, image: &ImageReference) -> Result<bool, CheckError> {
        let config_file = self.config_file(image.image_info()).await?;
        self.audit_layers(image.image_info()).await?;

        let component = config_file.label(COMPONENT_LABEL);
        debug!("component label: {}", component.unwrap_or("<none>"));

        let os_release = self.os_release_contents(image.image_fs_path()).await?;

        Ok(self.is_based_on_ubi(component, &os_release))
    }

    fn name(&self) -> &str {
        "BasedOnUbi"
    }

    fn metadata(&self) -> Metadata {
        Metadata {
            description: "Checking if the container's base image is based upon the Red Hat Universal Base Image (UBI)".to_owned(),
            level: Level::Best,
            knowledge_base_url: "https://connect.redhat.com/zones/containers/container-certification-policy-guide".to_owned(),
            check_url: "https://connect.redhat.com/zones/containers/container-certification-policy-guide".to_owned(),
        }
    }

    fn help(&self) -> HelpText {
        HelpText {
            message: "Check BasedOnUbi encountered an error. Please review the preflight.log file for more information.".to_owned(),
            suggestion: "Change the FROM directive in your Dockerfile or Containerfile to FROM registry.access.redhat.com/ubi8/ubi".to_owned(),
        }
    }
}
