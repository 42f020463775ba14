use colored::Colorize;
use siteflow_cloud::{ActionKind, Engine, Plan};
use siteflow_config::StackConfig;
use siteflow_stack::blog_stack;

pub async fn handle(config: &StackConfig, zone_id: Option<String>) -> anyhow::Result<()> {
    let engine = super::engine(config).await;
    super::ensure_auth(&engine).await?;

    let zone = super::resolve_zone(config, zone_id).await?;
    let template = blog_stack(config, &zone)?;
    let plan = engine.plan(&config.stack_name, &template).await?;
    print_plan(&plan);
    Ok(())
}

pub fn print_plan(plan: &Plan) {
    if !plan.has_changes() {
        println!("{}", "No changes. Stack matches the template.".green());
        return;
    }

    for action in &plan.actions {
        let line = format!("{:<7} {} ({})", action.kind, action.logical_id, action.resource_type);
        let line = match action.kind {
            ActionKind::Create => line.green(),
            ActionKind::Update if action.replacement => format!("{line} [replacement]").yellow(),
            ActionKind::Update => line.yellow(),
            ActionKind::Delete => line.red(),
        };
        println!("  {line}");
    }
    println!();
    println!("{}", plan.summary());
}
