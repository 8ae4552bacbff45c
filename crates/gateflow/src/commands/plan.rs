use crate::context::DeploymentContext;
use colored::Colorize;
use gateflow_provision::StateManager;
use gateflow_stack::GatewayStack;
use std::path::PathBuf;

pub async fn handle(config: Option<PathBuf>) -> anyhow::Result<()> {
    let ctx = DeploymentContext::load(config)?;

    // Planning is read-only; no credentials and no lock needed
    let cp = ctx.control_plane(None);
    let stack = GatewayStack::new(ctx.config.clone(), cp, ctx.schema_dir())?;

    let state = StateManager::new(&ctx.project_root).load().await?;
    let plan = stack.plan(&state)?;

    println!("Stack: {}", ctx.config.stack_name.cyan());
    super::deploy::print_plan(&plan);

    if !plan.has_changes {
        println!("{}", "No changes. Stack is up to date.".green());
    }
    Ok(())
}
