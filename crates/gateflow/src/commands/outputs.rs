use crate::context::DeploymentContext;
use gateflow_provision::StateManager;
use gateflow_stack::StackOutputs;
use std::path::PathBuf;

pub async fn handle(config: Option<PathBuf>) -> anyhow::Result<()> {
    let ctx = DeploymentContext::load(config)?;

    let state = StateManager::new(&ctx.project_root).load().await?;
    let outputs = StackOutputs::from_state(
        &state,
        &ctx.config.gateway.authentication_type.to_string(),
    )
    .ok_or_else(|| anyhow::anyhow!("no deployed gateway found; run `gateflow deploy` first"))?;

    println!("{}", serde_json::to_string_pretty(&outputs)?);
    Ok(())
}
