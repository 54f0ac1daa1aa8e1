//! `register` command: one session, printed the way a renderer would see it.

use anyhow::{Context, Result};
use owo_colors::OwoColorize;
use std::sync::Arc;

use assetry::bundle::BundleId;
use assetry::config::AssetConfig;
use assetry::{AssetManager, log};

use super::{RegisterArgs, plural};

pub fn register_bundles(config: &AssetConfig, args: &RegisterArgs) -> Result<()> {
    let manager = Arc::new(AssetManager::from_config(config));
    let mut session = manager.session();
    for name in &args.bundles {
        session
            .register(name.as_str())
            .with_context(|| format!("failed to register `{name}`"))?;
    }
    let page = session.page_assets()?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&page)?);
        return Ok(());
    }

    for (position, group) in page.groups() {
        println!("{}", position.to_string().bold());
        for file in group.css.iter().chain(&group.js) {
            let owner = file.bundle.as_ref().map_or("-", BundleId::as_str);
            println!("  {:<4}{} {}", file.kind.as_str(), file.url, format!("({owner})").dimmed());
        }
    }
    log!(
        "register";
        "{} from {}",
        plural(page.len(), "file"),
        plural(session.order().len(), "bundle")
    );
    Ok(())
}
