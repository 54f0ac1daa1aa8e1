//! `check` and `resolve` commands.

use anyhow::{Context, Result, bail};
use indexmap::IndexSet;
use owo_colors::OwoColorize;

use assetry::bundle::BundleId;
use assetry::config::AssetConfig;
use assetry::resolve::{registry_graph, resolve};
use assetry::{AssetManager, ConfigurationError, log};

use super::plural;

/// Validate every bundle as if it were registered alone.
pub fn check_bundles(config: &AssetConfig) -> Result<()> {
    let manager = AssetManager::from_config(config);
    let registry = manager.registry();

    let mut problems: Vec<ConfigurationError> = registry.unknown_dependencies();
    if let Some(cycle) = registry_graph(registry).find_cycle() {
        problems.push(cycle);
    }
    // Position checks need a sound graph
    if problems.is_empty() {
        let none = IndexSet::<BundleId>::new();
        for id in config.bundles.keys() {
            if let Err(e) = resolve(id, &manager, &none)
                && !problems.contains(&e)
            {
                problems.push(e);
            }
        }
    }

    if problems.is_empty() {
        log!("check"; "{} ok", plural(registry.len(), "bundle"));
        return Ok(());
    }
    for problem in &problems {
        eprintln!("{} {}", "error:".red().bold(), problem);
    }
    bail!("found {}", plural(problems.len(), "problem"))
}

/// Print the order `bundle` would be registered in, and inherited positions.
pub fn resolve_bundle(config: &AssetConfig, bundle: &str) -> Result<()> {
    let manager = AssetManager::from_config(config);
    let root = BundleId::from(bundle);
    let resolution = resolve(&root, &manager, &IndexSet::<BundleId>::new())
        .with_context(|| format!("cannot resolve `{bundle}`"))?;

    for (i, id) in resolution.order.iter().enumerate() {
        println!("{:>3}. {}", i + 1, id);
    }
    for (id, kind, position) in resolution.positions.assigned() {
        println!(
            "     {} {} {}",
            format!("{id}.{kind}").dimmed(),
            "→".dimmed(),
            position
        );
    }
    Ok(())
}
