use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::constants;
use crate::error::{EstError, Result};

/// Optional settings from `est.toml`
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub environment: Option<String>,
    pub settings_file: Option<PathBuf>,
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Directory for the JSON log file
    pub directory: PathBuf,
    /// Also write JSON logs to a daily rotated file
    pub file_output: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from(constants::DEFAULT_LOG_DIR),
            file_output: false,
        }
    }
}

/// Environment and settings file after merging all configuration sources
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSettings {
    pub environment: String,
    pub settings_file: PathBuf,
}

impl Config {
    /// Load an explicit config file; it must exist
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            EstError::Config(format!(
                "Failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;

        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Load `path` if given, else `est.toml` in the working directory if present,
    /// else defaults
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => {
                let default_path = Path::new(constants::DEFAULT_CONFIG_FILE);
                if default_path.is_file() {
                    Self::from_file(default_path)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    /// Merge CLI flags, environment variables and this config, in that priority.
    ///
    /// Values that are still missing come back empty; `Processor` rejects them.
    pub fn resolve(
        &self,
        environment: Option<String>,
        settings_file: Option<PathBuf>,
    ) -> RunSettings {
        self.resolve_with(environment, settings_file, |name| std::env::var(name).ok())
    }

    fn resolve_with<F>(
        &self,
        environment: Option<String>,
        settings_file: Option<PathBuf>,
        lookup_var: F,
    ) -> RunSettings
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup_var(name).filter(|v| !v.trim().is_empty());

        let environment = environment
            .or_else(|| var(constants::ENVIRONMENT_VAR))
            .or_else(|| self.environment.clone())
            .unwrap_or_default();
        let settings_file = settings_file
            .or_else(|| var(constants::SETTINGS_FILE_VAR).map(PathBuf::from))
            .or_else(|| self.settings_file.clone())
            .unwrap_or_default();

        RunSettings {
            environment,
            settings_file,
        }
    }
}
