//! Common types and utilities shared across CLI commands.

use std::path::Path;
use std::sync::Arc;

use clap::ValueEnum;
use demonlist::{
    DemonlistConfig, DemonlistLoader, HttpClient, ListCache, ListSource, ProbeMode, ReqwestClient,
};

use crate::error::CliError;

/// List selection for CLI arguments.
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum SourceArg {
    /// The Shitty List
    Tsl,
    /// The Shitty List+
    TslPlus,
}

impl From<SourceArg> for ListSource {
    fn from(arg: SourceArg) -> Self {
        match arg {
            SourceArg::Tsl => ListSource::Tsl,
            SourceArg::TslPlus => ListSource::TslPlus,
        }
    }
}

/// Probe selection for CLI arguments.
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum ProbeArg {
    /// HEAD request against the manifest
    Head,
    /// GET of the first byte of the manifest
    Range,
}

impl From<ProbeArg> for ProbeMode {
    fn from(arg: ProbeArg) -> Self {
        match arg {
            ProbeArg::Head => ProbeMode::Head,
            ProbeArg::Range => ProbeMode::Range,
        }
    }
}

/// Load configuration from `path`, or from the per-user file when no path
/// is given.
pub fn load_config(path: Option<&Path>) -> Result<DemonlistConfig, CliError> {
    let config = match path {
        Some(path) => DemonlistConfig::from_file(path)?,
        None => DemonlistConfig::load()?,
    };
    Ok(config)
}

/// Apply command-line overrides on top of the loaded configuration.
pub fn apply_overrides(
    config: DemonlistConfig,
    source: ListSource,
    base_url: Option<String>,
    probe: Option<ProbeArg>,
) -> DemonlistConfig {
    // CLI takes precedence, then config
    let config = match base_url {
        Some(url) => config.with_base_url(source, url),
        None => config,
    };
    match probe {
        Some(probe) => config.with_probe_mode(probe.into()),
        None => config,
    }
}

/// Build an HTTP client from the configuration.
pub fn build_client(config: &DemonlistConfig) -> Result<Arc<dyn HttpClient>, CliError> {
    Ok(Arc::new(ReqwestClient::from_config(config)?))
}

/// Build a loader with a fresh cache. Must be called inside the runtime.
pub fn build_loader(config: DemonlistConfig) -> Result<DemonlistLoader, CliError> {
    let client = build_client(&config)?;
    Ok(DemonlistLoader::new(client, Arc::new(ListCache::new()), config)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overrides_take_precedence() {
        let config = apply_overrides(
            DemonlistConfig::default(),
            ListSource::TslPlus,
            Some("http://localhost:3000/data/".to_string()),
            Some(ProbeArg::Range),
        );

        assert_eq!(
            config.base_url(ListSource::TslPlus),
            "http://localhost:3000/data"
        );
        assert_eq!(
            config.base_url(ListSource::Tsl),
            ListSource::Tsl.default_base_url()
        );
        assert_eq!(config.probe_mode, ProbeMode::Range);
    }

    #[test]
    fn test_no_overrides_keeps_config() {
        let config = apply_overrides(DemonlistConfig::default(), ListSource::Tsl, None, None);
        assert_eq!(config, DemonlistConfig::default());
    }
}
