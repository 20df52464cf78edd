use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result, bail};
use serde::Deserialize;

use crate::latency::Latency;

/// File name looked up inside the data directory.
pub const CONFIG_FILE: &str = "config.toml";

/// Application configuration loaded from `config.toml`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    /// Storage backend selection.
    #[serde(default)]
    pub storage: StorageConfig,
    /// Service behavior.
    #[serde(default)]
    pub service: ServiceConfig,
    /// View defaults.
    #[serde(default)]
    pub view: ViewConfig,
}

impl AppConfig {
    /// Load `config.toml` from `data_dir`, or defaults when it does not exist.
    ///
    /// # Errors
    /// Returns an error when the file exists but cannot be read, parsed or validated.
    pub fn from_data_dir(data_dir: impl AsRef<Path>) -> Result<Self> {
        Self::from_path(data_dir.as_ref().join(CONFIG_FILE))
    }

    /// Load an explicit config file, or defaults when it does not exist.
    ///
    /// # Errors
    /// Returns an error when the file exists but cannot be read, parsed or validated.
    pub fn from_path(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents =
            fs::read_to_string(&path).with_context(|| format!("failed to read {}", path.display()))?;
        let config: Self =
            toml::from_str(&contents).with_context(|| format!("failed to parse {}", path.display()))?;
        config
            .validate()
            .with_context(|| format!("invalid configuration in {}", path.display()))?;
        Ok(config)
    }

    /// Suspension mode for the services.
    #[must_use]
    pub const fn latency(&self) -> Latency {
        Latency::from_flag(self.service.simulate_latency)
    }

    fn validate(&self) -> Result<()> {
        if self.storage.quota_bytes == Some(0) {
            bail!("storage.quota_bytes must be greater than zero");
        }
        if self.storage.quota_bytes.is_some() && self.storage.backend != BackendKind::Memory {
            bail!("storage.quota_bytes only applies to the memory backend");
        }
        Ok(())
    }
}

/// `[storage]` block.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Which backend holds the records.
    #[serde(default)]
    pub backend: BackendKind,
    /// Capacity of the memory backend in bytes.
    #[serde(default)]
    pub quota_bytes: Option<usize>,
}

/// Storage backend kinds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// One JSON file per record in the data directory.
    #[default]
    File,
    /// Process-local map, discarded on exit.
    Memory,
}

/// `[service]` block.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServiceConfig {
    /// Sleep for the per-operation delays instead of yielding.
    #[serde(default)]
    pub simulate_latency: bool,
}

/// `[view]` block.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ViewConfig {
    /// Include completed tasks in views; falls back to the stored setting when unset.
    #[serde(default)]
    pub show_completed: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::tempdir;

    #[test]
    fn missing_config_returns_defaults() -> Result<()> {
        let dir = tempdir()?;
        let cfg = AppConfig::from_data_dir(dir.path())?;
        assert_eq!(cfg.storage.backend, BackendKind::File);
        assert!(!cfg.service.simulate_latency);
        assert_eq!(cfg.view.show_completed, None);
        assert_eq!(cfg.latency(), Latency::Immediate);
        Ok(())
    }

    #[test]
    fn load_config_with_all_sections() -> Result<()> {
        let dir = tempdir()?;
        let mut file = fs::File::create(dir.path().join(CONFIG_FILE))?;
        writeln!(
            file,
            "[storage]\nbackend = \"memory\"\nquota_bytes = 4096\n\n[service]\nsimulate_latency = true\n\n[view]\nshow_completed = true"
        )?;

        let cfg = AppConfig::from_data_dir(dir.path())?;
        assert_eq!(cfg.storage.backend, BackendKind::Memory);
        assert_eq!(cfg.storage.quota_bytes, Some(4096));
        assert_eq!(cfg.latency(), Latency::Simulated);
        assert_eq!(cfg.view.show_completed, Some(true));
        Ok(())
    }

    #[test]
    fn quota_requires_memory_backend() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("custom.toml");
        fs::write(&path, "[storage]\nquota_bytes = 10\n")?;

        let Err(err) = AppConfig::from_path(&path) else {
            panic!("quota on the file backend should error");
        };
        assert!(format!("{err:#}").contains("only applies to the memory backend"));
        Ok(())
    }

    #[test]
    fn unknown_backend_is_rejected() -> Result<()> {
        let dir = tempdir()?;
        fs::write(dir.path().join(CONFIG_FILE), "[storage]\nbackend = \"sqlite\"\n")?;
        assert!(AppConfig::from_data_dir(dir.path()).is_err());
        Ok(())
    }
}
