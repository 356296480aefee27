use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Points at a TOML file that replaces the built-in configuration.
pub const CONFIG_ENV: &str = "POKEDEX_CONFIG";

const DEFAULT_CONFIG: &str = include_str!("../config/config.toml");

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Deserialize, Debug, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub pokemon: PokemonConfig,
    pub cache: CacheConfig,
    #[serde(default)]
    pub ui: UiConfig,
}

#[derive(Deserialize, Debug, Clone)]
pub struct ServerConfig {
    pub bind_addr: String,
}

#[derive(Deserialize, Debug, Clone)]
pub struct PokemonConfig {
    pub api_url: String,
    /// Request timeout in seconds.
    pub timeout: u32,
    pub cache_enabled: bool,
    pub page_size: u32,
}

#[derive(Deserialize, Debug, Clone)]
pub struct CacheConfig {
    pub r#type: String,
    pub max_size: u32,
    /// Entry lifetime in seconds.
    pub expiration: u32,
}

#[derive(Deserialize, Debug, Clone)]
pub struct UiConfig {
    pub debounce_ms: u64,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self { debounce_ms: 400 }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                bind_addr: "0.0.0.0:3000".to_string(),
            },
            pokemon: PokemonConfig {
                api_url: "https://beta.pokeapi.co/graphql/v1beta".to_string(),
                timeout: 10,
                cache_enabled: true,
                page_size: 10,
            },
            cache: CacheConfig {
                r#type: "memory".to_string(),
                max_size: 1000,
                expiration: 3600,
            },
            ui: UiConfig::default(),
        }
    }
}

impl Config {
    /// The file named by `POKEDEX_CONFIG`, or the bundled `config/config.toml`.
    pub fn load() -> Result<Self, ConfigError> {
        match std::env::var_os(CONFIG_ENV) {
            Some(path) => Self::from_file(Path::new(&path)),
            None => Self::from_toml(DEFAULT_CONFIG),
        }
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        tracing::debug!("Loading configuration from {}", path.display());
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&raw)
    }

    pub fn from_toml(raw: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.pokemon.api_url.trim().is_empty() {
            return Err(ConfigError::Invalid("pokemon.api_url is empty".to_string()));
        }
        if self.pokemon.page_size == 0 {
            return Err(ConfigError::Invalid(
                "pokemon.page_size must be at least 1".to_string(),
            ));
        }
        if self.cache.r#type != "memory" {
            return Err(ConfigError::Invalid(format!(
                "unsupported cache.type {:?}, only \"memory\" is available",
                self.cache.r#type
            )));
        }
        if self.cache.max_size == 0 {
            return Err(ConfigError::Invalid(
                "cache.max_size must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.ui.debounce_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(u64::from(self.pokemon.timeout))
    }
}
