//! `demonlist load` - load a list and print it.

use std::time::Instant;

use clap::Args;
use demonlist::{DemonlistConfig, ListItem, ListSource};
use tracing::info;

use super::common::{apply_overrides, build_loader, ProbeArg, SourceArg};
use crate::error::CliError;

/// Arguments for `demonlist load`.
#[derive(Debug, Args)]
pub struct LoadArgs {
    /// Which list to load
    #[arg(value_enum)]
    pub source: SourceArg,

    /// Override the list's data URL
    #[arg(long)]
    pub base_url: Option<String>,

    /// Availability probe to run before loading
    #[arg(long, value_enum)]
    pub probe: Option<ProbeArg>,

    /// Print at most this many entries
    #[arg(long)]
    pub limit: Option<usize>,
}

/// Run the load command.
pub async fn run(args: LoadArgs, config: DemonlistConfig) -> Result<(), CliError> {
    let source = ListSource::from(args.source);
    let config = apply_overrides(config, source, args.base_url, args.probe);
    let loader = build_loader(config)?;

    let started = Instant::now();
    loader.load_async(source).await?;
    let items = loader.cache().collection(source);
    info!(
        source = %source,
        items = items.len(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "load finished"
    );

    println!("{} - {} levels", source, items.len());
    for item in items.iter().take(args.limit.unwrap_or(usize::MAX)) {
        println!("{}", format_item(item));
    }

    Ok(())
}

/// One output line per list entry.
fn format_item(item: &ListItem) -> String {
    format!("#{:<4} {} ({})", item.position, item.name, item.id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_item() {
        let item = ListItem {
            id: 44062068,
            name: "Acheron".to_string(),
            position: 7,
        };
        assert_eq!(format_item(&item), "#7    Acheron (44062068)");
    }
}
