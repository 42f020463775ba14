use anyhow::Context;
use colored::Colorize;
use siteflow_config::StackConfig;
use siteflow_stack::blog_stack;
use std::path::PathBuf;

pub async fn handle(
    config: &StackConfig,
    output: Option<PathBuf>,
    zone_id: Option<String>,
) -> anyhow::Result<()> {
    let zone = super::resolve_zone(config, zone_id).await?;
    let template = blog_stack(config, &zone)?;
    let rendered = template.to_json()?;

    match output {
        Some(path) => {
            std::fs::write(&path, rendered).with_context(|| format!("writing {}", path.display()))?;
            println!(
                "{} wrote template to {}",
                "✓".green(),
                path.display().to_string().cyan()
            );
        }
        None => println!("{rendered}"),
    }
    Ok(())
}
