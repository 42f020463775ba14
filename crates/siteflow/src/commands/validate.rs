use colored::Colorize;
use siteflow_config::StackConfig;
use siteflow_stack::blog_stack;
use std::collections::BTreeMap;

pub async fn handle(config: &StackConfig, zone_id: Option<String>) -> anyhow::Result<()> {
    let zone = super::resolve_zone(config, zone_id).await?;
    // blog_stack runs graph validation before returning
    let template = blog_stack(config, &zone)?;

    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for (_, resource) in template.resources() {
        *counts.entry(resource.resource_type.as_str()).or_default() += 1;
    }

    println!(
        "{} {} resources in stack {}",
        "✓".green(),
        template.len(),
        config.stack_name.cyan()
    );
    for (resource_type, count) in counts {
        println!("  {count:>2}  {resource_type}");
    }
    Ok(())
}
