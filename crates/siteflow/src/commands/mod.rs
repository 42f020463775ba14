pub mod down;
pub mod plan;
pub mod status;
pub mod synth;
pub mod up;
pub mod validate;

use anyhow::Context;
use colored::Colorize;
use siteflow_cloud::{ContextStore, Engine};
use siteflow_cloud_aws::CloudFormationEngine;
use siteflow_config::StackConfig;
use siteflow_core::HostedZoneRef;

/// Build the engine for the configured account and region
pub async fn engine(config: &StackConfig) -> CloudFormationEngine {
    CloudFormationEngine::new(Some(config.region.clone()), Some(config.account.clone())).await
}

/// Resolve the hosted zone: explicit id first, then the lookup cache,
/// then Route 53 (caching the result).
pub async fn resolve_zone(
    config: &StackConfig,
    zone_id: Option<String>,
) -> anyhow::Result<HostedZoneRef> {
    if let Some(id) = zone_id.or_else(|| config.zone_id.clone()) {
        return Ok(HostedZoneRef::new(id, &config.base_domain));
    }

    let store = ContextStore::new(std::env::current_dir()?);
    let mut context = store.load().await?;
    if let Some(zone) = context.zone(&config.base_domain) {
        tracing::debug!("Using cached hosted zone {}", zone.id);
        return Ok(zone.clone());
    }

    let engine = engine(config).await;
    let zone = engine
        .lookup_zone(&config.base_domain)
        .await
        .with_context(|| format!("looking up hosted zone for {}", config.base_domain))?;
    context.set_zone(zone.clone());
    store.save(&context).await?;
    Ok(zone)
}

/// Fail fast when credentials are unusable or for the wrong account
pub async fn ensure_auth(engine: &CloudFormationEngine) -> anyhow::Result<()> {
    let auth = engine.check_auth().await?;
    if !auth.authenticated {
        anyhow::bail!(
            "not authenticated: {}",
            auth.error.unwrap_or_else(|| "unknown error".to_string())
        );
    }
    if let Some(account) = auth.account_info {
        println!("{} authenticated as account {}", "✓".green(), account.cyan());
    }
    Ok(())
}

/// y/N confirmation prompt
pub fn confirm(prompt: &str) -> anyhow::Result<bool> {
    use std::io::Write;

    print!("{prompt} [y/N]: ");
    std::io::stdout().flush()?;
    let mut line = String::new();
    std::io::stdin().read_line(&mut line)?;
    Ok(matches!(line.trim(), "y" | "Y" | "yes"))
}
