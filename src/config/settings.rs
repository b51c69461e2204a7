//! Application settings and paths.
//!
//! Settings live in an XDG-compliant config directory and are read once per
//! invocation. A missing settings file means defaults.

use crate::error::{ConfigError, ConfigResult};
use crate::scanner::{ProbeTimeouts, ScanMode, DEFAULT_CONCURRENCY, DEFAULT_MAX_SWEEP_HOSTS};
use crate::types::PortSpec;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Application directory paths following XDG Base Directory Specification.
#[derive(Debug, Clone)]
pub struct Paths {
    /// Configuration directory (~/.config/netsweep)
    pub config_dir: PathBuf,
}

impl Paths {
    /// Resolve paths using XDG directories. Nothing is created on disk.
    pub fn new() -> ConfigResult<Self> {
        let project = ProjectDirs::from("com", "netsweep", "netsweep")
            .ok_or(ConfigError::DirectoryNotFound)?;

        Ok(Self {
            config_dir: project.config_dir().to_path_buf(),
        })
    }

    /// Get the path to the settings file.
    pub fn settings_file(&self) -> PathBuf {
        self.config_dir.join("settings.json")
    }
}

/// Application-wide settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    /// Number of concurrent probe workers.
    pub concurrency: usize,
    /// TCP connect timeout in milliseconds.
    pub connect_timeout_ms: u64,
    /// Banner connect/read timeout in milliseconds.
    pub banner_timeout_ms: u64,
    /// Echo reply wait in seconds.
    pub ping_timeout_secs: u64,
    /// Scan applied to each live host of a sweep.
    pub sweep_depth: ScanMode,
    /// Largest network a sweep may enumerate.
    pub max_sweep_hosts: u64,
    /// Port range for full scans when none is given.
    pub default_ports: String,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            concurrency: DEFAULT_CONCURRENCY,
            connect_timeout_ms: 1000,
            banner_timeout_ms: 3000,
            ping_timeout_secs: 1,
            sweep_depth: ScanMode::Quick,
            max_sweep_hosts: DEFAULT_MAX_SWEEP_HOSTS as u64,
            default_ports: PortSpec::DEFAULT.to_string(),
        }
    }
}

impl AppSettings {
    /// Load settings from `path`, or from the default location.
    ///
    /// A missing file or config directory at the default location yields
    /// defaults; an explicit path must exist.
    pub fn load(path: Option<&Path>) -> ConfigResult<Self> {
        if let Some(path) = path {
            return Self::load_from(path);
        }

        match Paths::new() {
            Ok(paths) => Self::load_default(Some(paths.settings_file())),
            Err(e) => {
                tracing::debug!(error = %e, "no configuration directory, using defaults");
                Self::load_default(None)
            }
        }
    }

    fn load_default(file: Option<PathBuf>) -> ConfigResult<Self> {
        match file {
            Some(file) if file.exists() => Self::load_from(&file),
            Some(file) => {
                tracing::debug!(path = %file.display(), "no settings file, using defaults");
                Ok(Self::default())
            }
            None => Ok(Self::default()),
        }
    }

    /// Load settings from a specific file.
    pub fn load_from(path: &Path) -> ConfigResult<Self> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError::ReadFailed {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let settings: Self = serde_json::from_str(&content)
            .map_err(|e| ConfigError::InvalidFormat(e.to_string()))?;
        settings.validate()?;

        tracing::debug!(path = %path.display(), "settings loaded");
        Ok(settings)
    }

    /// Reject values no scan can run with.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.concurrency == 0 {
            return Err(ConfigError::InvalidValue(
                "concurrency must be at least 1".to_string(),
            ));
        }
        if self.connect_timeout_ms == 0 || self.banner_timeout_ms == 0 {
            return Err(ConfigError::InvalidValue(
                "timeouts must be greater than zero".to_string(),
            ));
        }
        if self.ping_timeout_secs == 0 {
            return Err(ConfigError::InvalidValue(
                "ping_timeout_secs must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Probe time limits derived from these settings.
    pub fn timeouts(&self) -> ProbeTimeouts {
        ProbeTimeouts {
            connect: Duration::from_millis(self.connect_timeout_ms),
            banner: Duration::from_millis(self.banner_timeout_ms),
            ping: Duration::from_secs(self.ping_timeout_secs),
        }
    }

    /// Default port range, with the usual fallback on a malformed value.
    pub fn default_port_spec(&self) -> PortSpec {
        PortSpec::parse_or_default(&self.default_ports)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_settings() {
        let settings = AppSettings::default();
        assert_eq!(settings.concurrency, 50);
        assert_eq!(settings.connect_timeout_ms, 1000);
        assert_eq!(settings.sweep_depth, ScanMode::Quick);
        assert_eq!(settings.default_port_spec(), PortSpec::DEFAULT);
        assert_eq!(settings.timeouts(), ProbeTimeouts::default());
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, r#"{ "concurrency": 200, "sweep_depth": "full" }"#).unwrap();

        let settings = AppSettings::load(Some(path.as_path())).unwrap();
        assert_eq!(settings.concurrency, 200);
        assert_eq!(settings.sweep_depth, ScanMode::Full);
        assert_eq!(settings.banner_timeout_ms, 3000);
    }

    #[test]
    fn test_default_location_fallbacks() {
        assert_eq!(AppSettings::load_default(None).unwrap(), AppSettings::default());

        let dir = TempDir::new().unwrap();
        let absent = dir.path().join("settings.json");
        assert_eq!(
            AppSettings::load_default(Some(absent.clone())).unwrap(),
            AppSettings::default()
        );

        fs::write(&absent, r#"{ "concurrency": 7 }"#).unwrap();
        assert_eq!(AppSettings::load_default(Some(absent)).unwrap().concurrency, 7);
    }

    #[test]
    fn test_invalid_files() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("settings.json");

        fs::write(&path, "{ nope").unwrap();
        assert!(matches!(
            AppSettings::load_from(&path),
            Err(ConfigError::InvalidFormat(_))
        ));

        fs::write(&path, r#"{ "concurrency": 0 }"#).unwrap();
        assert!(matches!(
            AppSettings::load_from(&path),
            Err(ConfigError::InvalidValue(_))
        ));

        let missing = dir.path().join("absent.json");
        assert!(matches!(
            AppSettings::load(Some(missing.as_path())),
            Err(ConfigError::ReadFailed { .. })
        ));
    }

    #[test]
    fn test_malformed_default_ports_fall_back() {
        let settings = AppSettings {
            default_ports: "80-".to_string(),
            ..AppSettings::default()
        };
        assert_eq!(settings.default_port_spec(), PortSpec::DEFAULT);
    }

    #[test]
    fn test_settings_serialization() {
        let settings = AppSettings::default();
        let json = serde_json::to_string(&settings).unwrap();
        let parsed: AppSettings = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, settings);
    }
}
