use crate::context::DeploymentContext;
use colored::Colorize;
use gateflow_controlplane::ControlPlane;
use gateflow_provision::StateManager;
use gateflow_stack::GatewayStack;
use std::path::PathBuf;

pub async fn handle(
    config: Option<PathBuf>,
    profile: Option<String>,
    yes: bool,
) -> anyhow::Result<()> {
    let ctx = DeploymentContext::load(config)?;

    println!("{}", "Destroying stack...".red().bold());
    println!("Stack: {}", ctx.config.stack_name.cyan());

    let state_manager = StateManager::new(&ctx.project_root);
    let lock = state_manager.acquire_lock().await?;
    let mut state = state_manager.load().await?;

    if state.resources.is_empty() {
        println!("{}", "Nothing to destroy.".yellow());
        lock.release().await?;
        return Ok(());
    }

    println!("{} resources will be deleted:", state.resources.len());
    let mut keys: Vec<&String> = state.resources.keys().collect();
    keys.sort();
    for key in keys {
        println!("  - {}", key.red());
    }

    if !yes {
        println!();
        println!(
            "{}",
            "Warning: this deletes every resource of the stack.".yellow()
        );
        println!("Run with {} to proceed", "--yes".cyan());
        lock.release().await?;
        return Ok(());
    }

    let cp = ctx.control_plane(profile);
    let auth = cp.check_auth().await?;
    if !auth.authenticated {
        lock.release().await?;
        anyhow::bail!(
            "not authenticated: {}",
            auth.error.unwrap_or_else(|| "unknown".to_string())
        );
    }

    let stack = GatewayStack::new(ctx.config.clone(), cp, ctx.schema_dir())?;

    println!();
    let result = stack.destroy(&mut state).await;
    state_manager.save(&state).await?;
    lock.release().await?;
    let result = result?;

    for outcome in &result.succeeded {
        println!("  ✓ {}", outcome.message);
    }

    if let Some(failure) = result.failed {
        eprintln!(
            "  ✗ {}: {}",
            failure.key.red(),
            failure.error.as_deref().unwrap_or("unknown error")
        );
        anyhow::bail!(
            "teardown aborted at '{}'; remaining resources are still recorded",
            failure.key
        );
    }

    println!();
    println!("{}", "✓ Stack destroyed".green().bold());
    Ok(())
}
