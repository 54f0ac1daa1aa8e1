//! `publish` and `clean` commands.

use anyhow::{Context, Result, bail};
use indexmap::IndexSet;
use owo_colors::OwoColorize;
use rayon::prelude::*;
use std::sync::Arc;

use assetry::bundle::BundleId;
use assetry::config::AssetConfig;
use assetry::logger::StepCounter;
use assetry::publish::{PublishOutcome, Publisher};
use assetry::resolve::{SpecLookup, resolve};
use assetry::{AssetError, AssetManager, debug, log};

use super::{PublishArgs, plural};

const OUTCOMES: [PublishOutcome; 5] = [
    PublishOutcome::Published,
    PublishOutcome::Linked,
    PublishOutcome::Existing,
    PublishOutcome::Vetoed,
    PublishOutcome::Unpublished,
];

/// Publish the requested bundles and their dependencies in parallel.
pub fn publish_bundles(config: &AssetConfig, args: &PublishArgs) -> Result<()> {
    let mut options = config.publisher_options();
    options.force_copy |= args.force;
    let manager = AssetManager::from_config(config).with_publisher(Arc::new(Publisher::new(options)));

    let ids: Vec<BundleId> = if args.all {
        config.bundles.keys().cloned().collect()
    } else {
        requested(&manager, &args.bundles)?
    };
    if ids.is_empty() {
        log!("publish"; "no bundles");
        return Ok(());
    }

    let counter = StepCounter::new("publish", &OUTCOMES.map(PublishOutcome::as_str));
    let failures: Vec<(&BundleId, AssetError)> = ids
        .par_iter()
        .filter_map(|id| {
            let spec = manager.lookup(id.as_str())?;
            match manager.publisher().publish(&spec) {
                Ok(asset) => {
                    counter.inc(asset.outcome.as_str());
                    if asset.wrote()
                        && let Some(url) = &asset.base_url
                    {
                        debug!("publish"; "{} -> {}", id, url);
                    }
                    None
                }
                Err(e) => Some((id, e)),
            }
        })
        .collect();
    counter.finish();

    if failures.is_empty() {
        return Ok(());
    }
    let failed = failures.len();
    for (id, err) in failures {
        eprintln!("{} `{}`: {:#}", "error:".red().bold(), id, anyhow::Error::new(err));
    }
    bail!("{} failed", plural(failed, "bundle"))
}

/// Named bundles plus their dependencies, dependencies first.
fn requested(manager: &AssetManager, names: &[String]) -> Result<Vec<BundleId>> {
    let mut ids = IndexSet::<BundleId>::new();
    for name in names {
        let root = BundleId::from(name.as_str());
        let resolution = resolve(&root, manager, &ids).with_context(|| format!("cannot resolve `{name}`"))?;
        ids.extend(resolution.order);
    }
    Ok(ids.into_iter().collect())
}

/// Remove the publish directory and everything in it.
pub fn clean(config: &AssetConfig) -> Result<()> {
    let publisher = Publisher::new(config.publisher_options());
    let root = &publisher.options().base_path;
    if publisher.clean()? {
        log!("clean"; "removed {}", root.display());
    } else {
        log!("clean"; "nothing to remove at {}", root.display());
    }
    Ok(())
}
