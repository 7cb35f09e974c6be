use crate::utils::Workspace;
use colored::Colorize;
use liftflow_core::{FleetRef, RoutingStrategyType};
use std::path::Path;

pub async fn handle(config: Option<&Path>) -> anyhow::Result<()> {
    println!("{}", "Validating project...".blue());

    let workspace = match Workspace::load(config) {
        Ok(workspace) => workspace,
        Err(e) => {
            eprintln!();
            eprintln!("{}", "✗ Invalid project".red().bold());
            eprintln!("  {:#}", e);
            std::process::exit(1);
        }
    };
    let project = &workspace.project;

    println!(
        "Project file: {}",
        workspace.project_file.display().to_string().cyan()
    );
    println!("{}", "✓ Project is valid".green().bold());
    println!();
    println!("Summary:");
    println!("  Project: {}", project.name.cyan());

    let provider = project.provider(liftflow_core::AWS_PROVIDER);
    println!(
        "  Region: {}",
        provider.region.as_deref().unwrap_or("(from AWS configuration)")
    );

    println!("  Fleets: {}", project.fleets.len());
    for (name, fleet) in &project.fleets {
        println!(
            "    - {} ({}, {})",
            name.cyan(),
            fleet.build_id,
            fleet.ec2_instance_type
        );
    }

    println!("  Aliases: {}", project.aliases.len());
    for (name, alias) in &project.aliases {
        let routing = &alias.routing_strategy;
        let target = match (routing.kind, &routing.fleet) {
            (RoutingStrategyType::Simple, Some(FleetRef::Name(fleet))) => {
                format!("-> fleet {}", fleet)
            }
            (RoutingStrategyType::Simple, Some(FleetRef::Id(id))) => format!("-> {}", id),
            _ => format!(
                "\"{}\"",
                routing.message.as_deref().unwrap_or_default()
            ),
        };
        println!(
            "    - {} ({} {})",
            name.cyan(),
            routing.kind.as_str(),
            target
        );
    }

    Ok(())
}
