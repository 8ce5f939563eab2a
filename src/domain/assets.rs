use serde::Serialize;

/// Publicly presented list of the auxiliary images the check suite depends on.
#[derive(PartialEq, Eq, Clone, Debug, Default, Serialize)]
pub struct AssetData {
    pub images: Vec<String>,
}
