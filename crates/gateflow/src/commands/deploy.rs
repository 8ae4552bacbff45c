use crate::context::DeploymentContext;
use colored::Colorize;
use gateflow_controlplane::ControlPlane;
use gateflow_provision::{ActionType, Plan, StateManager};
use gateflow_stack::{GatewayStack, StackOutputs};
use std::path::PathBuf;

pub async fn handle(
    config: Option<PathBuf>,
    profile: Option<String>,
    yes: bool,
) -> anyhow::Result<()> {
    let ctx = DeploymentContext::load(config)?;

    println!("{}", "Starting deployment...".blue().bold());
    println!("Config: {}", ctx.config_path.display().to_string().cyan());
    println!("Stack:  {}", ctx.config.stack_name.cyan());
    println!(
        "Region: {} (account {})",
        ctx.config.aws.region.cyan(),
        ctx.config.aws.account
    );

    let cp = ctx.control_plane(profile);

    println!();
    println!("{}", "Checking credentials...".blue());
    let auth = cp.check_auth().await?;
    if !auth.authenticated {
        anyhow::bail!(
            "not authenticated: {}",
            auth.error.unwrap_or_else(|| "unknown".to_string())
        );
    }
    println!(
        "  ✓ Authenticated as {}",
        auth.account_info.as_deref().unwrap_or("(unknown)")
    );

    // Building the stack renders every schema template; a broken template
    // stops the run here, before anything is provisioned
    let stack = GatewayStack::new(ctx.config.clone(), cp, ctx.schema_dir())?;

    let state_manager = StateManager::new(&ctx.project_root);
    let lock = state_manager.acquire_lock().await?;
    let mut state = state_manager.load().await?;

    let plan = stack.plan(&state)?;
    println!();
    print_plan(&plan);

    if !plan.has_changes {
        println!("{}", "No changes. Stack is up to date.".green());
        lock.release().await?;
        return Ok(());
    }

    if !yes {
        println!();
        println!("Run with {} to apply these changes", "--yes".cyan());
        lock.release().await?;
        return Ok(());
    }

    println!();
    println!("{}", "Applying...".blue().bold());
    let result = stack.deploy(&mut state).await;

    // Whatever happened, the applied resources are already recorded
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
            "deployment aborted at '{}'; applied resources were kept and recorded",
            failure.key
        );
    }

    println!();
    println!(
        "{}",
        format!("✓ Deployment complete ({} ms)", result.duration_ms)
            .green()
            .bold()
    );

    if let Some(outputs) = StackOutputs::from_state(
        &state,
        &ctx.config.gateway.authentication_type.to_string(),
    ) {
        println!();
        println!("{}", "Outputs:".bold());
        println!("  Gateway URL: {}", outputs.gateway_url.cyan());
        if let Some(discovery) = &outputs.discovery_url {
            println!("  Token issuer: {}", discovery);
        }
        for target in &outputs.targets {
            println!("  Target {}: {}", target.name, target.target_id);
        }
    }

    Ok(())
}

pub fn print_plan(plan: &Plan) {
    println!("{}", format!("Plan: {}", plan.summary()).bold());
    for action in &plan.actions {
        let marker = match action.action_type {
            ActionType::Create => "+".green(),
            ActionType::Update => "~".yellow(),
            ActionType::Delete => "-".red(),
            ActionType::NoOp => "=".normal(),
        };
        println!("  {} {} ({})", marker, action.key, action.resource_type);
    }
}
