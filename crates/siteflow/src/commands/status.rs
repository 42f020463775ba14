use colored::Colorize;
use siteflow_cloud::Engine;
use siteflow_config::StackConfig;

pub async fn handle(config: &StackConfig) -> anyhow::Result<()> {
    let engine = super::engine(config).await;

    match engine.status(&config.stack_name).await? {
        Some(status) => println!("{}: {}", config.stack_name.cyan(), status),
        None => println!("{}: not deployed", config.stack_name.cyan()),
    }
    Ok(())
}
