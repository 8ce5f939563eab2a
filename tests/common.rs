#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Arc;

use preflight::app::{Check, CheckError, ImageReference};
use preflight::domain::certification::{help_text::HelpText, level::Level, metadata::Metadata};
use preflight::infra::DockerArchiveImage;
use tempfile::TempDir;

pub const UBI_OS_RELEASE: &str = concat!(
    "NAME=\"Red Hat Enterprise Linux\"\n",
    "VERSION=\"8.5 (Ootpa)\"\n",
    "ID=\"rhel\"\n",
    "ID_LIKE=\"fedora\"\n",
    "VERSION_ID=\"8.5\"\n",
);

pub const CENTOS_OS_RELEASE: &str = "NAME=\"CentOS Linux\"\nVERSION=\"8\"\nID=\"centos\"\n";

/// A `docker save` archive plus the extracted root filesystem of the same image.
pub struct SavedImage {
    pub dir: TempDir,
    pub archive: PathBuf,
    pub rootfs: PathBuf,
}

impl SavedImage {
    pub async fn reference(&self) -> ImageReference {
        let image = DockerArchiveImage::open(&self.archive).await.unwrap();
        ImageReference::new(Arc::new(image), &self.rootfs)
    }
}

fn append(builder: &mut tar::Builder<Vec<u8>>, path: &str, contents: &[u8]) {
    let mut header = tar::Header::new_gnu();
    header.set_size(contents.len() as u64);
    header.set_mode(0o644);
    header.set_cksum();
    builder.append_data(&mut header, path, contents).unwrap();
}

fn tarball(entries: &[(&str, Vec<u8>)]) -> Vec<u8> {
    let mut builder = tar::Builder::new(Vec::new());
    for (path, contents) in entries {
        append(&mut builder, path, contents);
    }
    builder.into_inner().unwrap()
}

pub fn saved_image(component_label: Option<&str>, os_release: Option<&str>) -> SavedImage {
    let dir = tempfile::tempdir().unwrap();

    let rootfs = dir.path().join("rootfs");
    std::fs::create_dir_all(rootfs.join("etc")).unwrap();
    if let Some(os_release) = os_release {
        std::fs::write(rootfs.join("etc/os-release"), os_release).unwrap();
    }

    let labels = match component_label {
        Some(component) => serde_json::json!({ "com.redhat.component": component }),
        None => serde_json::Value::Null,
    };
    let config = serde_json::json!({
        "architecture": "amd64",
        "os": "linux",
        "config": { "Labels": labels },
    });
    let manifest = serde_json::json!([{
        "Config": "config.json",
        "RepoTags": ["example.com/app:latest"],
        "Layers": ["base/layer.tar", "app/layer.tar"],
    }]);

    let base_layer = tarball(&[(
        "etc/os-release",
        os_release.unwrap_or_default().as_bytes().to_vec(),
    )]);
    let app_layer = tarball(&[("opt/app/run.sh", b"#!/bin/sh\nexec app\n".to_vec())]);

    let archive = dir.path().join("image.tar");
    std::fs::write(
        &archive,
        tarball(&[
            ("manifest.json", manifest.to_string().into_bytes()),
            ("config.json", config.to_string().into_bytes()),
            ("base/layer.tar", base_layer),
            ("app/layer.tar", app_layer),
        ]),
    )
    .unwrap();

    SavedImage {
        dir,
        archive,
        rootfs,
    }
}

pub struct PanickingCheck;

#[async_trait::async_trait]
impl Check for PanickingCheck {
    async fn validate(&self, _image: &ImageReference) -> Result<bool, CheckError> {
        panic!("unexpected image layout")
    }

    fn name(&self) -> &str {
        "Panicking"
    }

    fn metadata(&self) -> Metadata {
        Metadata {
            description: "Always panics".to_owned(),
            level: Level::Optional,
            knowledge_base_url: "https://example.com/kb".to_owned(),
            check_url: "https://example.com/check".to_owned(),
        }
    }

    fn help(&self) -> HelpText {
        HelpText {
            message: "Check Panicking encountered an error.".to_owned(),
            suggestion: "None".to_owned(),
        }
    }
}
