use std::collections::HashMap;
use std::sync::LazyLock;

use itertools::Itertools;
use regex::Regex;
use thiserror::Error;

use crate::domain::assets::AssetData;

pub const SCORECARD: &str = "scorecard";

// operator policy, operator-sdk scorecard
// quay.io/operator-framework/scorecard-test:v1.12.0
const BUILTIN_IMAGES: &[(&str, &str)] = &[(
    SCORECARD,
    "quay.io/operator-framework/scorecard-test@sha256:d655333b0246f75ac9e5f6e67a2c04c506ae77b0c8b0c5eb70e6ddc8c2123e55",
)];

static DIGEST_PINNED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^@\s]+@sha256:[0-9a-f]{64}$").unwrap());

#[derive(Error, Debug, PartialEq, Eq)]
pub enum AssetRegistryError {
    #[error("image {reference:?} for {purpose:?} is not pinned by a sha256 digest")]
    NotDigestPinned { purpose: String, reference: String },

    #[error("purpose {0:?} is registered more than once")]
    DuplicatePurpose(String),
}

/// Auxiliary images the checks may delegate work to, keyed by purpose.
///
/// Every entry is pinned by digest so results do not depend on upstream tag
/// changes, and so the whole set can be pre-pulled for disconnected
/// environments.
#[derive(Clone, Debug)]
pub struct AssetRegistry {
    images: HashMap<String, String>,
}

impl AssetRegistry {
    pub fn new<I, P, R>(entries: I) -> Result<Self, AssetRegistryError>
    where
        I: IntoIterator<Item = (P, R)>,
        P: Into<String>,
        R: Into<String>,
    {
        let mut images = HashMap::new();
        for (purpose, reference) in entries {
            let (purpose, reference) = (purpose.into(), reference.into());

            if !DIGEST_PINNED.is_match(&reference) {
                return Err(AssetRegistryError::NotDigestPinned { purpose, reference });
            }
            if images.contains_key(&purpose) {
                return Err(AssetRegistryError::DuplicatePurpose(purpose));
            }

            images.insert(purpose, reference);
        }

        Ok(Self { images })
    }

    pub fn builtin() -> Result<Self, AssetRegistryError> {
        Self::new(BUILTIN_IMAGES.iter().copied())
    }

    pub fn lookup(&self, purpose: &str) -> Option<&str> {
        self.images.get(purpose).map(String::as_str)
    }

    pub fn all(&self) -> Vec<String> {
        self.images.values().unique().sorted().cloned().collect()
    }

    pub fn assets(&self) -> AssetData {
        AssetData { images: self.all() }
    }

    /// Image used for operator-sdk scorecard based checks.
    pub fn scorecard_image(&self) -> Option<&str> {
        self.lookup(SCORECARD)
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::{AssetRegistry, AssetRegistryError, DIGEST_PINNED};

    const DIGEST: &str = "0123456789abcdef0123456789abcdef0123456789abcdef0123456789abcdef";

    #[test]
    fn it_exposes_the_builtin_scorecard_image() {
        let registry = AssetRegistry::builtin().unwrap();

        assert_eq!(
            registry.scorecard_image(),
            Some(
                "quay.io/operator-framework/scorecard-test@sha256:d655333b0246f75ac9e5f6e67a2c04c506ae77b0c8b0c5eb70e6ddc8c2123e55"
            )
        );
    }

    #[test]
    fn it_returns_none_for_unknown_purposes() {
        let registry = AssetRegistry::builtin().unwrap();

        assert_eq!(registry.lookup("not-a-purpose"), None);
    }

    #[test]
    fn it_lists_every_image_once_and_pinned() {
        let registry = AssetRegistry::new([
            ("scorecard", format!("quay.io/a/scorecard@sha256:{DIGEST}")),
            ("scorecard-alias", format!("quay.io/a/scorecard@sha256:{DIGEST}")),
            ("other", format!("registry.example.com/b@sha256:{DIGEST}")),
        ])
        .unwrap();

        let all = registry.all();

        assert_eq!(all.len(), 2);
        assert!(all.iter().all(|image| DIGEST_PINNED.is_match(image)));
        assert_eq!(registry.assets().images, all);
    }

    #[rstest]
    #[case::tag_only("quay.io/operator-framework/scorecard-test:v1.12.0")]
    #[case::no_reference("quay.io/operator-framework/scorecard-test")]
    #[case::short_digest("quay.io/operator-framework/scorecard-test@sha256:d655333b")]
    #[case::uppercase_digest("quay.io/a@sha256:0123456789ABCDEF0123456789abcdef0123456789abcdef0123456789abcdef")]
    fn it_rejects_references_not_pinned_by_digest(#[case] reference: &str) {
        let result = AssetRegistry::new([("scorecard", reference)]);

        assert_eq!(
            result.unwrap_err(),
            AssetRegistryError::NotDigestPinned {
                purpose: "scorecard".to_owned(),
                reference: reference.to_owned(),
            }
        );
    }

    #[test]
    fn it_rejects_duplicate_purposes() {
        let reference = format!("quay.io/a@sha256:{DIGEST}");
        let result = AssetRegistry::new([("scorecard", &reference), ("scorecard", &reference)]);

        assert_eq!(
            result.unwrap_err(),
            AssetRegistryError::DuplicatePurpose("scorecard".to_owned())
        );
    }

    #[test]
    fn it_serializes_assets_as_an_images_list() {
        let registry = AssetRegistry::builtin().unwrap();

        let json = serde_json::to_value(registry.assets()).unwrap();

        assert_eq!(json["images"].as_array().unwrap().len(), 1);
    }
}
