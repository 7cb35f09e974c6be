use crate::utils::{self, Workspace};
use colored::Colorize;
use liftflow_cloud::{ApplyResult, CloudProvider};
use liftflow_core::AWS_PROVIDER;
use std::path::Path;

pub async fn handle(config: Option<&Path>, yes: bool) -> anyhow::Result<()> {
    let workspace = Workspace::load(config)?;
    workspace.print_header();

    let lock = workspace.state.acquire_lock().await?;
    let outcome = run(&workspace, yes).await;
    lock.release().await?;

    match outcome? {
        Some(result) => utils::report(&result),
        None => Ok(()),
    }
}

async fn run(workspace: &Workspace, yes: bool) -> anyhow::Result<Option<ApplyResult>> {
    let provider = workspace.provider().await;
    let mut global = workspace.state.load().await?;

    println!("{}", "Refreshing state...".blue());
    let mut state = provider
        .refresh(&global.provider_state(AWS_PROVIDER))
        .await?;
    global.set_provider_state(AWS_PROVIDER, &state);
    workspace.state.save(&global).await?;

    let desired = workspace.project.resource_set()?;
    let plan = provider.plan(&desired, &state).await?;
    utils::print_plan(&plan);

    if !plan.has_changes {
        return Ok(None);
    }
    if !yes {
        println!();
        println!("Run {} to apply these changes.", "liftflow apply -y".bold());
        return Ok(None);
    }

    println!();
    println!("{}", "Applying...".blue());
    let result = provider.apply(&plan, &desired, &mut state).await;

    // Persist whatever was recorded, including tainted resources
    global.set_provider_state(AWS_PROVIDER, &state);
    workspace.state.save(&global).await?;

    Ok(Some(result?))
}
