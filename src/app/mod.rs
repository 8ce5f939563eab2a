mod asset_registry;
mod check_engine;
mod checks;
pub mod component_factory;
mod image_reference;

pub use asset_registry::{AssetRegistry, AssetRegistryError, SCORECARD};
pub use check_engine::{CheckEngine, ConfigurationError};
pub use checks::{BasedOnUbiCheck, Check, container_policy};
pub use crate::domain::certification::check_error::CheckError;
pub use image_reference::{ImageInfo, ImageInfoError, ImageLayer, ImageReference, LayerReader};
