use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use super::{AssetRegistry, CheckEngine, ConfigurationError};

const DEFAULT_CHECK_TIMEOUT_SECS: u64 = 60;
const DEFAULT_LOG_FILE: &str = "preflight.log";
pub const LOG_FILE_ENV_VAR: &str = "PREFLIGHT_LOGFILE";

#[derive(Clone, Debug, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub engine: EngineConfig,
    #[serde(default)]
    pub log: LogConfig,
}

#[derive(Clone, Debug, Deserialize)]
pub struct EngineConfig {
    #[serde(default = "default_check_timeout_secs")]
    pub check_timeout_secs: u64,
    #[serde(default)]
    pub parallel: bool,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct LogConfig {
    pub file: Option<PathBuf>,
}

fn default_check_timeout_secs() -> u64 {
    DEFAULT_CHECK_TIMEOUT_SECS
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            check_timeout_secs: DEFAULT_CHECK_TIMEOUT_SECS,
            parallel: false,
        }
    }
}

impl EngineConfig {
    pub fn check_timeout(&self) -> Duration {
        Duration::from_secs(self.check_timeout_secs)
    }
}

impl LogConfig {
    pub fn log_file(&self) -> PathBuf {
        self.file
            .clone()
            .or_else(|| std::env::var_os(LOG_FILE_ENV_VAR).map(PathBuf::from))
            .unwrap_or_else(|| PathBuf::from(DEFAULT_LOG_FILE))
    }
}

impl Config {
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("preflight").join("config.json"))
    }

    /// Loads the configuration the user asked for. A file given explicitly must
    /// exist; the one under the default path is optional.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ComponentFactoryError> {
        match (explicit, Self::default_path()) {
            (Some(path), _) => Self::load_from(path),
            (None, Some(path)) => Self::load_if_present(&path),
            (None, None) => Ok(Self::default()),
        }
    }

    pub fn load_from(path: &Path) -> Result<Self, ComponentFactoryError> {
        let contents = std::fs::read_to_string(path).map_err(|source| {
            ComponentFactoryError::UnreadableConfig {
                path: path.to_owned(),
                source,
            }
        })?;

        serde_json::from_str(&contents).map_err(|source| ComponentFactoryError::MalformedConfig {
            path: path.to_owned(),
            source,
        })
    }

    fn load_if_present(path: &Path) -> Result<Self, ComponentFactoryError> {
        match Self::load_from(path) {
            Err(ComponentFactoryError::UnreadableConfig { source, .. })
                if source.kind() == std::io::ErrorKind::NotFound =>
            {
                debug!("no configuration found at {}, using defaults", path.display());
                Ok(Self::default())
            }
            result => result,
        }
    }
}

pub struct Components {
    pub engine: CheckEngine,
    pub assets: Arc<AssetRegistry>,
}

#[derive(Error, Debug)]
pub enum ComponentFactoryError {
    #[error("unable to read configuration file {}: {source}", path.display())]
    UnreadableConfig {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("malformed configuration file {}: {source}", path.display())]
    MalformedConfig {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("invalid check configuration: {0}")]
    Configuration(#[from] ConfigurationError),
}

pub trait ComponentFactory {
    fn create_components(&self, config: Config) -> Result<Components, ComponentFactoryError>;
}

#[cfg(test)]
mod test {
    use std::path::PathBuf;
    use std::time::Duration;

    use serial_test::serial;

    use super::{ComponentFactoryError, Config, LOG_FILE_ENV_VAR, LogConfig};

    #[test]
    fn it_defaults_every_field() {
        let config: Config = serde_json::from_str("{}").unwrap();

        assert_eq!(config.engine.check_timeout(), Duration::from_secs(60));
        assert!(!config.engine.parallel);
        assert!(config.log.file.is_none());
    }

    #[test]
    fn it_reads_partial_engine_configuration() {
        let config: Config =
            serde_json::from_str(r#"{"engine": {"parallel": true}}"#).unwrap();

        assert!(config.engine.parallel);
        assert_eq!(config.engine.check_timeout_secs, 60);
    }

    #[test]
    fn it_uses_defaults_when_the_default_file_does_not_exist() {
        let dir = tempfile::tempdir().unwrap();

        let config = Config::load_if_present(&dir.path().join("config.json")).unwrap();

        assert_eq!(config.engine.check_timeout_secs, 60);
    }

    #[test]
    fn it_fails_when_an_explicit_file_does_not_exist() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");

        let result = Config::load(Some(&path));

        match result {
            Err(ComponentFactoryError::UnreadableConfig { path: reported, source }) => {
                assert_eq!(reported, path);
                assert_eq!(source.kind(), std::io::ErrorKind::NotFound);
            }
            other => panic!("expected an unreadable config error, got {other:?}"),
        }
    }

    #[test]
    fn it_reads_an_explicit_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"engine": {"check_timeout_secs": 5}}"#).unwrap();

        let config = Config::load(Some(&path)).unwrap();

        assert_eq!(config.engine.check_timeout(), Duration::from_secs(5));
    }

    #[test]
    fn it_fails_on_a_malformed_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{ not json").unwrap();

        let result = Config::load_from(&path);

        assert!(matches!(
            result,
            Err(ComponentFactoryError::MalformedConfig { .. })
        ));
    }

    #[test]
    #[serial]
    fn it_prefers_the_configured_log_file_over_the_env_var() {
        unsafe { std::env::set_var(LOG_FILE_ENV_VAR, "/tmp/from-env.log") };

        let configured = LogConfig {
            file: Some(PathBuf::from("/tmp/configured.log")),
        };
        assert_eq!(configured.log_file(), PathBuf::from("/tmp/configured.log"));
        assert_eq!(
            LogConfig::default().log_file(),
            PathBuf::from("/tmp/from-env.log")
        );

        unsafe { std::env::remove_var(LOG_FILE_ENV_VAR) };
        assert_eq!(
            LogConfig::default().log_file(),
            PathBuf::from("preflight.log")
        );
    }
}
