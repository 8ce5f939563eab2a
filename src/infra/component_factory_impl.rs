use std::sync::Arc;

use crate::app::{
    AssetRegistry, CheckEngine, ConfigurationError,
    component_factory::{ComponentFactory, ComponentFactoryError, Components, Config},
    container_policy,
};

pub struct ConcreteComponentFactory;

impl ComponentFactory for ConcreteComponentFactory {
    fn create_components(&self, config: Config) -> Result<Components, ComponentFactoryError> {
        let assets = AssetRegistry::builtin().map_err(ConfigurationError::from)?;
        let engine = CheckEngine::new(container_policy(), &config.engine)?;

        Ok(Components {
            engine,
            assets: Arc::new(assets),
        })
    }
}
