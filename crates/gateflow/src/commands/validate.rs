use crate::context::DeploymentContext;
use colored::Colorize;
use gateflow_core::SchemaTemplates;
use std::path::PathBuf;

pub fn handle(config: Option<PathBuf>) -> anyhow::Result<()> {
    let ctx = DeploymentContext::load(config)?;
    println!(
        "  ✓ Config is valid: {}",
        ctx.config_path.display().to_string().cyan()
    );

    // Render every custom schema the way a deploy would
    let templates = SchemaTemplates::new(ctx.schema_dir());
    let mut rendered = 0;
    for target in ctx.config.enabled_targets() {
        if target.is_prebuilt() {
            continue;
        }
        let base_url = target
            .config
            .base_url
            .as_deref()
            .ok_or_else(|| anyhow::anyhow!("target '{}': no baseUrl configured", target.target_type))?;
        templates
            .materialize(target.short_type(), base_url)
            .map_err(|e| anyhow::anyhow!("target '{}': {}", target.target_type, e))?;
        println!("  ✓ Schema template renders: {}", target.schema_file_name());
        rendered += 1;
    }

    println!();
    println!(
        "{}",
        format!(
            "✓ Validation passed ({} targets, {} schema templates)",
            ctx.config.enabled_targets().count(),
            rendered
        )
        .green()
        .bold()
    );
    Ok(())
}
