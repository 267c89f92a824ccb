//! Layered configuration. Precedence: CLI > env > config files > defaults.
//!
//! Each layer only fills fields the layers above it left unset.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::errors::RunnerError;
use crate::types::{
    ConnectionTarget, DEFAULT_COLLECTION, DEFAULT_DATABASE, DEFAULT_HOST, DEFAULT_PORT,
};

pub const CONFIG_FILE_NAME: &str = "queryrunner.toml";
pub const ENV_PREFIX: &str = "QUERYRUNNER_";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub database: Option<String>,
    pub collection: Option<String>,
    pub uri: Option<String>,
    /// log4rs YAML file; wins over `log_level` / `log_dir`.
    pub log_config: Option<PathBuf>,
    pub log_level: Option<String>,
    pub log_dir: Option<PathBuf>,
    /// Output mode: human, plain or json.
    pub format: Option<String>,
}

impl AppConfig {
    /// # Errors
    /// Returns `RunnerError::Config` if the text is not valid TOML for this shape.
    pub fn from_toml_str(s: &str) -> Result<Self, RunnerError> {
        toml::from_str(s).map_err(|e| RunnerError::Config(e.to_string()))
    }

    /// # Errors
    /// Returns `RunnerError::Config` if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self, RunnerError> {
        let s = std::fs::read_to_string(path)
            .map_err(|e| RunnerError::Config(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&s).map_err(|e| RunnerError::Config(format!("{}: {e}", path.display())))
    }

    /// Fills unset fields from `lower`.
    pub fn fill_from(&mut self, lower: Self) {
        fn fill<T>(slot: &mut Option<T>, v: Option<T>) {
            if slot.is_none() {
                *slot = v;
            }
        }
        fill(&mut self.host, lower.host);
        fill(&mut self.port, lower.port);
        fill(&mut self.database, lower.database);
        fill(&mut self.collection, lower.collection);
        fill(&mut self.uri, lower.uri);
        fill(&mut self.log_config, lower.log_config);
        fill(&mut self.log_level, lower.log_level);
        fill(&mut self.log_dir, lower.log_dir);
        fill(&mut self.format, lower.format);
    }

    /// Reads `QUERYRUNNER_*` variables through `lookup`.
    ///
    /// # Errors
    /// Returns `RunnerError::Config` if `QUERYRUNNER_PORT` is not a port number.
    pub fn from_env_with<F>(lookup: F) -> Result<Self, RunnerError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(&format!("{ENV_PREFIX}{name}")).filter(|v| !v.is_empty());
        let port = match var("PORT") {
            Some(p) => Some(
                p.parse::<u16>()
                    .map_err(|_| RunnerError::Config(format!("{ENV_PREFIX}PORT: invalid port {p}")))?,
            ),
            None => None,
        };
        Ok(Self {
            host: var("HOST"),
            port,
            database: var("DB"),
            collection: var("COLLECTION"),
            uri: var("URI"),
            log_config: var("LOG_CONFIG").map(PathBuf::from),
            log_level: var("LOG_LEVEL"),
            log_dir: var("LOG_DIR").map(PathBuf::from),
            format: var("FORMAT"),
        })
    }

    /// # Errors
    /// Returns `RunnerError::Config` if an environment value is malformed.
    pub fn from_env() -> Result<Self, RunnerError> {
        Self::from_env_with(|k| std::env::var(k).ok())
    }

    /// Resolves the full stack on top of `cli`.
    ///
    /// An explicit `config_path` must exist; the implicit locations are optional.
    ///
    /// # Errors
    /// Returns `RunnerError::Config` if a config file or environment value is malformed.
    pub fn load(cli: Self, config_path: Option<&Path>) -> Result<Self, RunnerError> {
        Self::load_with(cli, config_path, |k| std::env::var(k).ok())
    }

    /// `load` with environment variables read through `lookup`.
    ///
    /// A file named by `QUERYRUNNER_CONFIG` is explicit too and must exist.
    ///
    /// # Errors
    /// Returns `RunnerError::Config` if a config file or environment value is malformed.
    pub fn load_with<F>(mut cli: Self, config_path: Option<&Path>, lookup: F) -> Result<Self, RunnerError>
    where
        F: Fn(&str) -> Option<String>,
    {
        cli.fill_from(Self::from_env_with(&lookup)?);
        if let Some(p) = config_path {
            cli.fill_from(Self::from_file(p)?);
        }
        if let Some(p) = lookup(&format!("{ENV_PREFIX}CONFIG")).filter(|v| !v.is_empty()) {
            cli.fill_from(Self::from_file(Path::new(&p))?);
        }
        for p in implicit_config_paths() {
            if p.exists() {
                log::debug!("reading config {}", p.display());
                cli.fill_from(Self::from_file(&p)?);
            }
        }
        Ok(cli)
    }

    #[must_use]
    pub fn target(&self) -> ConnectionTarget {
        let mut t = ConnectionTarget::new(
            self.host.clone().unwrap_or_else(|| DEFAULT_HOST.to_string()),
            self.port.unwrap_or(DEFAULT_PORT),
            self.database.clone().unwrap_or_else(|| DEFAULT_DATABASE.to_string()),
            self.collection.clone().unwrap_or_else(|| DEFAULT_COLLECTION.to_string()),
        );
        if let Some(uri) = &self.uri {
            t = t.with_uri(uri.clone());
        }
        t
    }
}

/// `./queryrunner.toml`, then the user config dir.
#[must_use]
pub fn implicit_config_paths() -> Vec<PathBuf> {
    let mut paths: Vec<PathBuf> = vec![];
    if let Ok(cur) = std::env::current_dir() {
        paths.push(cur.join(CONFIG_FILE_NAME));
    }
    if let Some(dir) = dirs_next::config_dir() {
        paths.push(dir.join(CONFIG_FILE_NAME));
    }
    paths
}
