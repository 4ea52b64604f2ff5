//! `demonlist probe` - check that a list host answers.

use clap::Args;
use demonlist::loader::manifest_url;
use demonlist::{probe, DemonlistConfig, ListSource};

use super::common::{apply_overrides, build_client, ProbeArg, SourceArg};
use crate::error::CliError;

/// Arguments for `demonlist probe`.
#[derive(Debug, Args)]
pub struct ProbeArgs {
    /// Which list host to probe
    #[arg(value_enum)]
    pub source: SourceArg,

    /// Override the list's data URL
    #[arg(long)]
    pub base_url: Option<String>,

    /// Probe request to send
    #[arg(long, value_enum)]
    pub probe: Option<ProbeArg>,
}

/// Run the probe command.
pub async fn run(args: ProbeArgs, config: DemonlistConfig) -> Result<(), CliError> {
    let source = ListSource::from(args.source);
    let config = apply_overrides(config, source, args.base_url, args.probe);
    let client = build_client(&config)?;
    let url = manifest_url(config.base_url(source));

    let outcome = probe(client.as_ref(), &url, config.probe_mode).await;
    if !outcome.ok {
        return Err(CliError::Unreachable {
            url,
            code: outcome.code,
        });
    }

    println!("{} is reachable ({} probe, status {})", url, config.probe_mode, outcome.code);
    Ok(())
}
