use colored::Colorize;
use siteflow_cloud::Engine;
use siteflow_config::StackConfig;

pub async fn handle(config: &StackConfig, yes: bool) -> anyhow::Result<()> {
    let engine = super::engine(config).await;
    super::ensure_auth(&engine).await?;

    match engine.status(&config.stack_name).await? {
        None => {
            println!("{} is not deployed", config.stack_name.cyan());
            return Ok(());
        }
        Some(status) => println!("{} is {}", config.stack_name.cyan(), status),
    }

    if !yes
        && !super::confirm(&format!(
            "Destroy stack {}? This deletes the buckets and the pipeline",
            config.stack_name
        ))?
    {
        println!("{}", "Aborted.".yellow());
        return Ok(());
    }

    engine.destroy(&config.stack_name).await?;
    println!("{} {} deleted", "✓".green(), config.stack_name.cyan());
    Ok(())
}
