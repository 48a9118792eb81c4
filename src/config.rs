use std::{collections::HashMap, path::PathBuf};

use config::{Config, ConfigError, Environment};
use home::home_dir;
use serde::Deserialize;

/// Environment variables consulted when locating the module cache.
const ENV_KEYS: [&str; 2] = ["GOMODCACHE", "GOPATH"];

pub struct VersionsConfig {
    pub mod_cache: Option<PathBuf>,
    pub go_path: Option<PathBuf>,
}

impl VersionsConfig {
    pub fn load() -> anyhow::Result<Self> {
        Ok(Self::from_raw(RawConfig::load(None)?))
    }

    fn from_raw(raw_config: RawConfig) -> Self {
        Self {
            mod_cache: raw_config.gomodcache.filter(|p| !p.as_os_str().is_empty()),
            go_path: raw_config
                .gopath
                .and_then(|p| std::env::split_paths(&p).next())
                .filter(|p| !p.as_os_str().is_empty()),
        }
    }

    /// Root of the Go module cache: `$GOMODCACHE`, else `$GOPATH/pkg/mod`,
    /// else `$HOME/go/pkg/mod`.
    pub fn mod_cache_directory(&self) -> PathBuf {
        match &self.mod_cache {
            Some(mod_cache) => mod_cache.clone(),
            None => self
                .go_path
                .clone()
                .unwrap_or_else(default_go_path)
                .join("pkg")
                .join("mod"),
        }
    }
}

fn default_go_path() -> PathBuf {
    home_dir().unwrap_or_default().join("go")
}

#[derive(Default, Debug, Deserialize, PartialEq, Eq)]
struct RawConfig {
    gomodcache: Option<PathBuf>,
    gopath: Option<PathBuf>,
}

impl RawConfig {
    fn load(env: Option<HashMap<String, String>>) -> Result<Self, ConfigError> {
        let env = env.unwrap_or_else(|| {
            std::env::vars()
                .filter(|(key, _)| ENV_KEYS.contains(&key.as_str()))
                .collect()
        });

        Config::builder()
            .add_source(Environment::default().source(Some(env)))
            .build()?
            .try_deserialize()
    }
}
