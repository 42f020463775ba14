use colored::Colorize;
use siteflow_cloud::Engine;
use siteflow_config::StackConfig;
use siteflow_stack::blog_stack;

pub async fn handle(config: &StackConfig, zone_id: Option<String>, yes: bool) -> anyhow::Result<()> {
    let engine = super::engine(config).await;
    super::ensure_auth(&engine).await?;

    let zone = super::resolve_zone(config, zone_id).await?;
    let template = blog_stack(config, &zone)?;

    let plan = engine.plan(&config.stack_name, &template).await?;
    if !plan.has_changes() {
        println!("{}", "No changes. Stack is up to date.".green());
        return Ok(());
    }
    super::plan::print_plan(&plan);

    if !yes && !super::confirm(&format!("Apply these changes to {}?", config.stack_name))? {
        println!("{}", "Aborted.".yellow());
        return Ok(());
    }

    let outcome = engine.apply(&config.stack_name, &plan).await?;
    println!(
        "{} {} reached {} in {}s",
        "✓".green(),
        config.stack_name.cyan(),
        outcome.status,
        outcome.duration_ms / 1000
    );
    if !outcome.outputs.is_empty() {
        println!();
        for (name, value) in &outcome.outputs {
            println!("  {name} = {value}");
        }
    }

    println!();
    println!(
        "{}",
        "Note: the GitHub connection starts out pending. Complete the authorization".yellow()
    );
    println!(
        "{}",
        "in the console before the first pipeline run.".yellow()
    );
    Ok(())
}
