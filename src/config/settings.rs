//! Application settings and paths.
//!
//! Settings live in an XDG-compliant config directory and every field has a
//! default, so a missing or partial file is fine.

use crate::error::{ConfigError, ConfigResult};
use crate::scanner::ScanConfig;
use crate::types::PortRange;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

/// Application directory paths following the XDG Base Directory Specification.
#[derive(Debug, Clone)]
pub struct Paths {
    /// Configuration directory (~/.config/portxcan)
    pub config_dir: PathBuf,
    /// Data directory (~/.local/share/portxcan)
    pub data_dir: PathBuf,
}

impl Paths {
    /// Locate the platform directories. Nothing is created on disk.
    pub fn discover() -> ConfigResult<Self> {
        let project = ProjectDirs::from("com", "portxcan", "portxcan")
            .ok_or(ConfigError::DirectoryNotFound)?;

        Ok(Self {
            config_dir: project.config_dir().to_path_buf(),
            data_dir: project.data_dir().to_path_buf(),
        })
    }

    /// Get the path to the settings file.
    pub fn settings_file(&self) -> PathBuf {
        self.config_dir.join("settings.json")
    }
}

/// Application-wide settings as stored on disk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    /// Connection attempts in flight per host.
    pub concurrency: usize,
    pub connect_timeout_ms: u64,
    pub banner_timeout_ms: u64,
    /// Default port range, `"start-end"` or a single port.
    pub ports: String,
    /// How long finished scans stay in the registry.
    pub registry_ttl_secs: u64,
    /// Where export files go; the working directory when unset.
    pub export_dir: Option<PathBuf>,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            concurrency: 200,
            connect_timeout_ms: 1000,
            banner_timeout_ms: 1000,
            ports: "1-1024".to_string(),
            registry_ttl_secs: 3600,
            export_dir: None,
        }
    }
}

impl AppSettings {
    /// Load from `path` if given, otherwise from the default location.
    ///
    /// An explicit file must exist. A missing default file yields defaults.
    pub fn load(path: Option<&Path>) -> ConfigResult<Self> {
        if let Some(path) = path {
            return Self::load_from(path);
        }

        let file = match Paths::discover() {
            Ok(paths) => paths.settings_file(),
            Err(e) => {
                debug!(error = %e, "no config directory, using default settings");
                return Ok(Self::default());
            }
        };

        if !file.exists() {
            debug!(path = %file.display(), "settings file not found, using defaults");
            return Ok(Self::default());
        }

        Self::load_from(&file)
    }

    /// Load settings from a specific file.
    pub fn load_from(path: &Path) -> ConfigResult<Self> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError::ReadFailed {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let settings: Self =
            serde_json::from_str(&content).map_err(|e| ConfigError::InvalidFormat(e.to_string()))?;
        debug!(path = %path.display(), "loaded settings");
        Ok(settings)
    }

    /// Save settings to `path`, creating parent directories.
    pub fn save_to(&self, path: &Path) -> ConfigResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content).map_err(|e| ConfigError::WriteFailed {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    /// Save settings to the default location.
    pub fn save(&self) -> ConfigResult<()> {
        self.save_to(&Paths::discover()?.settings_file())
    }

    /// Validate and convert into runtime settings.
    pub fn to_scan_settings(&self) -> ConfigResult<ScanSettings> {
        let ports: PortRange = self
            .ports
            .parse()
            .map_err(|e| ConfigError::InvalidFormat(format!("ports: {}", e)))?;

        let scan = ScanConfig::default()
            .with_concurrency(self.concurrency)
            .with_connect_timeout(Duration::from_millis(self.connect_timeout_ms))
            .with_banner_timeout(Duration::from_millis(self.banner_timeout_ms));
        scan.validate()
            .map_err(|e| ConfigError::InvalidFormat(e.to_string()))?;

        let ttl_secs = i64::try_from(self.registry_ttl_secs)
            .map_err(|_| ConfigError::InvalidFormat("registry_ttl_secs is too large".into()))?;
        let registry_ttl = chrono::Duration::try_seconds(ttl_secs)
            .ok_or_else(|| ConfigError::InvalidFormat("registry_ttl_secs is too large".into()))?;

        Ok(ScanSettings {
            scan,
            ports,
            registry_ttl,
            export_dir: self.export_dir.clone().unwrap_or_else(|| PathBuf::from(".")),
        })
    }
}

/// Validated runtime form of [`AppSettings`].
#[derive(Debug, Clone)]
pub struct ScanSettings {
    pub scan: ScanConfig,
    pub ports: PortRange,
    pub registry_ttl: chrono::Duration,
    pub export_dir: PathBuf,
}
