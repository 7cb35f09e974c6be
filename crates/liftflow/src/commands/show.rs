use crate::utils::Workspace;
use colored::Colorize;
use liftflow_cloud::{CloudProvider, ResourceStatus};
use liftflow_core::AWS_PROVIDER;
use std::path::Path;

pub async fn handle(config: Option<&Path>, refresh: bool, json: bool) -> anyhow::Result<()> {
    let workspace = Workspace::load(config)?;
    let mut global = workspace.state.load().await?;

    if refresh {
        let lock = workspace.state.acquire_lock().await?;
        let provider = workspace.provider().await;
        let refreshed = provider
            .refresh(&global.provider_state(AWS_PROVIDER))
            .await;
        if let Ok(state) = &refreshed {
            global.set_provider_state(AWS_PROVIDER, state);
            workspace.state.save(&global).await?;
        }
        lock.release().await?;
        refreshed?;
    }

    let state = global.provider_state(AWS_PROVIDER);
    if json {
        println!("{}", serde_json::to_string_pretty(&state.resources)?);
        return Ok(());
    }

    workspace.print_header();
    if state.is_empty() {
        println!("{}", "No resources in state.".dimmed());
        return Ok(());
    }

    println!();
    for (key, resource) in state.iter() {
        let status = match resource.status {
            ResourceStatus::Running => resource.status.to_string().green(),
            ResourceStatus::Error => "tainted".red().bold(),
            ResourceStatus::Creating | ResourceStatus::Deleting => {
                resource.status.to_string().yellow()
            }
            _ => resource.status.to_string().dimmed(),
        };
        println!("  {}  {}  {}", key.cyan(), resource.id, status);
        if let Some(arn) = resource.get_attribute::<String>("arn") {
            println!("      {}", arn.dimmed());
        }
    }

    Ok(())
}
