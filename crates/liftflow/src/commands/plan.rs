use crate::utils::{self, Workspace};
use colored::Colorize;
use liftflow_cloud::CloudProvider;
use liftflow_core::AWS_PROVIDER;
use std::path::Path;

/// Refresh state and print the plan; nothing is written
pub async fn handle(config: Option<&Path>) -> anyhow::Result<()> {
    let workspace = Workspace::load(config)?;
    workspace.print_header();

    let provider = workspace.provider().await;
    let global = workspace.state.load().await?;
    let known = global.provider_state(AWS_PROVIDER);

    println!("{}", "Refreshing state...".blue());
    let current = provider.refresh(&known).await?;

    let desired = workspace.project.resource_set()?;
    let plan = provider.plan(&desired, &current).await?;
    utils::print_plan(&plan);

    Ok(())
}
