//! Project validation
//!
//! Parsing only checks shape. Everything that needs the whole project, or
//! a value range, is checked here and reported in one error.

use crate::error::{ProjectError, Result};
use crate::model::{
    AWS_PROVIDER, AliasResource, FleetRef, FleetResource, Project, RoutingStrategyType,
};

const MIN_PORT: i32 = 1;
const MAX_PORT: i32 = 60000;

/// Check a parsed project, collecting every problem found
pub fn validate_project(project: &Project) -> Result<()> {
    let mut problems = Vec::new();

    for name in project.providers.keys() {
        if name != AWS_PROVIDER {
            problems.push(format!(
                "provider '{}' is not supported (only \"{}\")",
                name, AWS_PROVIDER
            ));
        }
    }

    for (name, fleet) in &project.fleets {
        validate_fleet(name, fleet, &mut problems);
    }

    for (name, alias) in &project.aliases {
        validate_alias(name, alias, project, &mut problems);
    }

    if problems.is_empty() {
        Ok(())
    } else {
        Err(ProjectError::Validation(problems))
    }
}

fn validate_fleet(name: &str, fleet: &FleetResource, problems: &mut Vec<String>) {
    if fleet.name.trim().is_empty() {
        problems.push(format!("fleet '{}': name must not be empty", name));
    }
    if fleet.build_id.is_empty() {
        problems.push(format!("fleet '{}': build-id is required", name));
    }
    if fleet.ec2_instance_type.is_empty() {
        problems.push(format!("fleet '{}': ec2-instance-type is required", name));
    }

    for permission in &fleet.ec2_inbound_permissions {
        let in_range = |port: i32| (MIN_PORT..=MAX_PORT).contains(&port);
        if !in_range(permission.from_port) || !in_range(permission.to_port) {
            problems.push(format!(
                "fleet '{}': port range {}-{} must be within {}-{}",
                name, permission.from_port, permission.to_port, MIN_PORT, MAX_PORT
            ));
        } else if permission.from_port > permission.to_port {
            problems.push(format!(
                "fleet '{}': from-port {} is greater than to-port {}",
                name, permission.from_port, permission.to_port
            ));
        }
        if permission.ip_range.is_empty() {
            problems.push(format!("fleet '{}': ip-range must not be empty", name));
        }
    }

    let processes = fleet
        .runtime_configuration
        .as_ref()
        .map(|r| r.server_processes.as_slice())
        .unwrap_or_default();
    if fleet.server_launch_path.is_none() && processes.is_empty() {
        problems.push(format!(
            "fleet '{}': either server-launch-path or a runtime-configuration server-process is required",
            name
        ));
    }
    for process in processes {
        if process.launch_path.is_empty() {
            problems.push(format!("fleet '{}': server-process launch path is empty", name));
        }
        if process.concurrent_executions < 1 {
            problems.push(format!(
                "fleet '{}': concurrent-executions must be at least 1 (got {})",
                name, process.concurrent_executions
            ));
        }
    }

    if let Some(policy) = &fleet.resource_creation_limit_policy {
        for (field, value) in [
            (
                "new-game-sessions-per-creator",
                policy.new_game_sessions_per_creator,
            ),
            ("policy-period-in-minutes", policy.policy_period_in_minutes),
        ] {
            if let Some(v) = value
                && v < 0
            {
                problems.push(format!("fleet '{}': {} must not be negative", name, field));
            }
        }
    }

    if fleet.peer_vpc_id.is_some() != fleet.peer_vpc_aws_account_id.is_some() {
        problems.push(format!(
            "fleet '{}': peer-vpc-id and peer-vpc-aws-account-id must be set together",
            name
        ));
    }

    for (kind, value) in [
        ("create", fleet.timeouts.create),
        ("delete", fleet.timeouts.delete),
    ] {
        if value == Some(0) {
            problems.push(format!("fleet '{}': {} timeout must be positive", name, kind));
        }
    }
}

fn validate_alias(name: &str, alias: &AliasResource, project: &Project, problems: &mut Vec<String>) {
    if alias.name.trim().is_empty() {
        problems.push(format!("alias '{}': name must not be empty", name));
    }

    let strategy = &alias.routing_strategy;
    match strategy.kind {
        RoutingStrategyType::Simple => match &strategy.fleet {
            None => problems.push(format!(
                "alias '{}': SIMPLE routing requires fleet or fleet-id",
                name
            )),
            Some(FleetRef::Name(fleet)) if !project.fleets.contains_key(fleet) => {
                problems.push(format!(
                    "alias '{}': fleet '{}' is not declared in this project",
                    name, fleet
                ));
            }
            Some(_) => {}
        },
        RoutingStrategyType::Terminal => {
            if strategy.message.as_deref().is_none_or(str::is_empty) {
                problems.push(format!(
                    "alias '{}': TERMINAL routing requires a message",
                    name
                ));
            }
            if strategy.fleet.is_some() {
                problems.push(format!(
                    "alias '{}': TERMINAL routing must not name a fleet",
                    name
                ));
            }
        }
    }
}
