//! Configuration for a TipJar deployment.
//!
//! Block and cooldown periods are compile-time constants and deliberately
//! absent here.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tipjar_registry::{RegistryRouter, StaticResourceRegistry};
use tipjar_types::{AccountId, ResourceId};

use crate::error::ConfigError;

/// Main configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TipJarConfig {
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Resources with a fixed keeper and length limit
    #[serde(default)]
    pub resources: Vec<StaticResourceConfig>,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default filter when `RUST_LOG` is unset
    #[serde(default = "default_log_level")]
    pub level: String,

    /// JSON format
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

/// A legacy resource served by [`StaticResourceRegistry`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaticResourceConfig {
    pub family: String,
    pub key: String,
    pub keeper: String,
    pub max_content_length: usize,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl TipJarConfig {
    /// Load configuration: defaults, then an optional file, then `TIPJAR_`
    /// environment variables (`TIPJAR_LOGGING__LEVEL=debug`).
    pub fn load(path: Option<&str>) -> Result<Self, ConfigError> {
        let mut builder = config::Config::builder();

        builder = builder.add_source(config::Config::try_from(&TipJarConfig::default())?);

        if let Some(path) = path {
            builder = builder.add_source(config::File::with_name(path).required(false));
        }

        builder = builder.add_source(
            config::Environment::with_prefix("TIPJAR")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        Ok(builder.build()?.try_deserialize()?)
    }

    /// Parse a TOML document on top of the defaults.
    pub fn from_toml_str(toml: &str) -> Result<Self, ConfigError> {
        let config = config::Config::builder()
            .add_source(config::Config::try_from(&TipJarConfig::default())?)
            .add_source(config::File::from_str(toml, config::FileFormat::Toml))
            .build()?;
        Ok(config.try_deserialize()?)
    }

    /// Registry holding every configured static resource.
    pub fn static_registry(&self) -> StaticResourceRegistry {
        self.resources
            .iter()
            .fold(StaticResourceRegistry::new(), |registry, resource| {
                registry.with_resource(
                    ResourceId::new(resource.family.clone(), resource.key.clone()),
                    AccountId::new(resource.keeper.clone()),
                    resource.max_content_length,
                )
            })
    }

    /// Router with the static registry mounted for each family it declares.
    /// Further families can be mounted on the returned router.
    pub fn registry_router(&self) -> RegistryRouter {
        let registry = Arc::new(self.static_registry());
        let mut router = RegistryRouter::new();
        for family in registry.families() {
            router.mount(family, registry.clone());
        }
        router
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tipjar_registry::ResourceRegistry;

    const SAMPLE: &str = r#"
[logging]
level = "debug"
json = true

[[resources]]
family = "legacy"
key = "0"
keeper = "dao"
max_content_length = 32
"#;

    #[test]
    fn test_default_config() {
        let config = TipJarConfig::default();
        assert_eq!(config.logging.level, "info");
        assert!(!config.logging.json);
        assert!(config.resources.is_empty());
    }

    #[test]
    fn test_toml_config() {
        let config = TipJarConfig::from_toml_str(SAMPLE).unwrap();
        assert_eq!(config.logging.level, "debug");
        assert!(config.logging.json);
        assert_eq!(
            config.resources,
            vec![StaticResourceConfig {
                family: "legacy".into(),
                key: "0".into(),
                keeper: "dao".into(),
                max_content_length: 32,
            }]
        );
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();

        let path = file.path().to_str().unwrap().to_string();
        let config = TipJarConfig::load(Some(&path)).unwrap();
        assert_eq!(config.resources.len(), 1);
    }

    #[test]
    fn test_registry_router_serves_static_resources() {
        let config = TipJarConfig::from_toml_str(SAMPLE).unwrap();
        let router = config.registry_router();
        let legacy = ResourceId::new("legacy", "0");

        assert_eq!(router.families(), vec!["legacy"]);
        assert_eq!(router.current_keeper(&legacy).unwrap(), AccountId::new("dao"));
        assert_eq!(router.max_content_length(&legacy).unwrap(), 32);
    }
}
