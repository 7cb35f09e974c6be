use crate::utils::Workspace;
use colored::Colorize;
use liftflow_core::{AWS_PROVIDER, FLEET};
use std::path::Path;

/// Print the failure events GameLift recorded for a fleet
pub async fn handle(config: Option<&Path>, fleet: &str) -> anyhow::Result<()> {
    let workspace = Workspace::load(config)?;
    let global = workspace.state.load().await?;
    let state = global.provider_state(AWS_PROVIDER);

    let fleet_id = match state.get(&format!("{}:{}", FLEET, fleet)) {
        Some(resource) => resource.id.clone(),
        None => fleet.to_string(),
    };

    let provider = workspace.provider().await;
    let events = liftflow_cloud_aws::fleet_failures(provider.api(), &fleet_id).await?;

    if events.is_empty() {
        println!(
            "{} No failure events for {}",
            "✓".green().bold(),
            fleet_id.cyan()
        );
        return Ok(());
    }

    println!(
        "{} {} failure event(s) for {}",
        "✗".red().bold(),
        events.len(),
        fleet_id.cyan()
    );
    for event in &events {
        println!(
            "  {} {} {}",
            event.event_time.to_rfc3339().dimmed(),
            event.event_code.to_string().red(),
            event.message
        );
    }

    Ok(())
}
