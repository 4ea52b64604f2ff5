//! Loader configuration.
//!
//! Settings come from [`DemonlistConfig::default`] and can be overridden by an
//! INI file:
//!
//! ```ini
//! [sources]
//! tsl = https://tsl.pages.dev/data
//! tsl_plus = https://tslplus.pages.dev/data
//!
//! [network]
//! probe = head
//! timeout = 30
//! user_agent = IntegratedDemonlist/0.1.0
//! ```
//!
//! Every key is optional. Unknown keys are ignored.

use std::path::{Path, PathBuf};
use std::time::Duration;

use ini::Ini;

use crate::error::{ConfigError, ConfigResult};
use crate::http::{DEFAULT_TIMEOUT_SECS, DEFAULT_USER_AGENT};
use crate::probe::ProbeMode;
use crate::types::ListSource;

/// Name of the per-user configuration directory.
const CONFIG_DIR_NAME: &str = "demonlist";

/// Name of the configuration file inside [`CONFIG_DIR_NAME`].
const CONFIG_FILE_NAME: &str = "config.ini";

/// Settings for [`DemonlistLoader`](crate::DemonlistLoader) and its HTTP client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DemonlistConfig {
    /// Data host for the TSL list, without trailing slash.
    pub tsl_base_url: String,
    /// Data host for the TSL+ list, without trailing slash.
    pub tsl_plus_base_url: String,
    /// Request used for the availability probe.
    pub probe_mode: ProbeMode,
    /// Per-request timeout.
    pub timeout: Duration,
    /// User agent sent with every request.
    pub user_agent: String,
}

impl Default for DemonlistConfig {
    fn default() -> Self {
        Self {
            tsl_base_url: ListSource::Tsl.default_base_url().to_string(),
            tsl_plus_base_url: ListSource::TslPlus.default_base_url().to_string(),
            probe_mode: ProbeMode::default(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl DemonlistConfig {
    /// Base URL configured for `source`.
    pub fn base_url(&self, source: ListSource) -> &str {
        match source {
            ListSource::Tsl => &self.tsl_base_url,
            ListSource::TslPlus => &self.tsl_plus_base_url,
        }
    }

    /// Override the base URL for one source.
    pub fn with_base_url(mut self, source: ListSource, url: impl AsRef<str>) -> Self {
        let url = normalize_base_url(url.as_ref());
        match source {
            ListSource::Tsl => self.tsl_base_url = url,
            ListSource::TslPlus => self.tsl_plus_base_url = url,
        }
        self
    }

    /// Set the probe mode.
    pub fn with_probe_mode(mut self, mode: ProbeMode) -> Self {
        self.probe_mode = mode;
        self
    }

    /// Set the per-request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Path of the per-user configuration file, if a config directory exists.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
    }

    /// Load the per-user configuration file, falling back to defaults when
    /// it does not exist.
    pub fn load() -> ConfigResult<Self> {
        match Self::default_path() {
            Some(path) if path.exists() => Self::from_file(&path),
            _ => Ok(Self::default()),
        }
    }

    /// Load configuration from an INI file.
    pub fn from_file(path: &Path) -> ConfigResult<Self> {
        let ini = Ini::load_from_file(path).map_err(|e| ConfigError::ReadFailed {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        Self::from_ini(&ini)
    }

    /// Parse configuration from INI text.
    pub fn from_ini_str(text: &str) -> ConfigResult<Self> {
        let ini = Ini::load_from_str(text).map_err(|e| ConfigError::Parse(e.to_string()))?;
        Self::from_ini(&ini)
    }

    fn from_ini(ini: &Ini) -> ConfigResult<Self> {
        let mut config = Self::default();

        if let Some(section) = ini.section(Some("sources")) {
            for source in ListSource::ALL {
                if let Some(url) = section.get(source.key()) {
                    if normalize_base_url(url).is_empty() {
                        return Err(ConfigError::InvalidValue {
                            key: format!("sources.{}", source.key()),
                            value: url.to_string(),
                        });
                    }
                    config = config.with_base_url(source, url);
                }
            }
        }

        if let Some(section) = ini.section(Some("network")) {
            if let Some(probe) = section.get("probe") {
                config.probe_mode = probe.parse()?;
            }
            if let Some(timeout) = section.get("timeout") {
                let secs = timeout
                    .trim()
                    .parse::<u64>()
                    .ok()
                    .filter(|secs| *secs > 0)
                    .ok_or_else(|| ConfigError::InvalidValue {
                        key: "network.timeout".to_string(),
                        value: timeout.to_string(),
                    })?;
                config.timeout = Duration::from_secs(secs);
            }
            if let Some(user_agent) = section.get("user_agent") {
                let user_agent = user_agent.trim();
                if !user_agent.is_empty() {
                    config.user_agent = user_agent.to_string();
                }
            }
        }

        Ok(config)
    }
}

fn normalize_base_url(url: &str) -> String {
    url.trim().trim_end_matches('/').to_string()
}
