//! Fleet node parsing

use super::{
    first_string, node_name, property_i32, property_string, required_i32, required_string,
    strings,
};
use crate::error::{ProjectError, Result};
use crate::model::{
    FleetResource, IpPermission, ResourceCreationLimitPolicy, RuntimeConfiguration,
    ServerProcess, Timeouts,
};
use kdl::KdlNode;

/// Parse a `fleet` node
///
/// ```kdl
/// fleet "game" {
///     build-id "build-1111"
///     ec2-instance-type "c5.large"
///     inbound-permission from-port=7777 to-port=7780 ip-range="0.0.0.0/0" protocol="UDP"
///     runtime-configuration {
///         server-process "/local/game/server" parameters="-port 7777" concurrent-executions=2
///     }
/// }
/// ```
pub fn parse_fleet(node: &KdlNode) -> Result<(String, FleetResource)> {
    let name = node_name(node, "fleet")?;

    let mut fleet = FleetResource {
        name: name.clone(),
        ..Default::default()
    };

    if let Some(children) = node.children() {
        for child in children.nodes() {
            match child.name().value() {
                "name" => fleet.name = required_string(child)?,
                "build_id" | "build-id" => fleet.build_id = required_string(child)?,
                "ec2_instance_type" | "ec2-instance-type" | "instance_type" | "instance-type" => {
                    fleet.ec2_instance_type = required_string(child)?
                }
                "description" => fleet.description = first_string(child),
                "inbound_permission"
                | "inbound-permission"
                | "ec2_inbound_permission"
                | "ec2-inbound-permission" => {
                    fleet.ec2_inbound_permissions.push(parse_permission(child)?);
                }
                "log_paths" | "log-paths" => fleet.log_paths = strings(child),
                "metric_groups" | "metric-groups" => fleet.metric_groups = strings(child),
                "new_game_session_protection_policy"
                | "new-game-session-protection-policy"
                | "protection_policy"
                | "protection-policy" => {
                    fleet.new_game_session_protection_policy = required_string(child)?
                        .parse()
                        .map_err(ProjectError::InvalidConfig)?;
                }
                "peer_vpc_aws_account_id" | "peer-vpc-aws-account-id" => {
                    fleet.peer_vpc_aws_account_id = first_string(child)
                }
                "peer_vpc_id" | "peer-vpc-id" => fleet.peer_vpc_id = first_string(child),
                "resource_creation_limit_policy" | "resource-creation-limit-policy" => {
                    fleet.resource_creation_limit_policy = Some(parse_limit_policy(child)?);
                }
                "runtime_configuration" | "runtime-configuration" => {
                    fleet.runtime_configuration = Some(parse_runtime_configuration(child)?);
                }
                "server_launch_path" | "server-launch-path" => {
                    fleet.server_launch_path = first_string(child)
                }
                "server_launch_parameters" | "server-launch-parameters" => {
                    fleet.server_launch_parameters = first_string(child)
                }
                "timeouts" => fleet.timeouts = parse_timeouts(child)?,
                other => {
                    tracing::warn!("Ignoring unknown fleet setting '{}' in {}", other, name);
                }
            }
        }
    }

    Ok((name, fleet))
}

fn parse_permission(node: &KdlNode) -> Result<IpPermission> {
    let missing = |field: &str| {
        ProjectError::InvalidConfig(format!("inbound-permission requires {}", field))
    };

    let from_port = property_i32(node, &["from-port", "from_port"])?
        .ok_or_else(|| missing("from-port"))?;
    let to_port =
        property_i32(node, &["to-port", "to_port"])?.ok_or_else(|| missing("to-port"))?;
    let ip_range =
        property_string(node, &["ip-range", "ip_range"]).ok_or_else(|| missing("ip-range"))?;
    let protocol = property_string(node, &["protocol"])
        .ok_or_else(|| missing("protocol"))?
        .parse()
        .map_err(ProjectError::InvalidConfig)?;

    Ok(IpPermission {
        from_port,
        to_port,
        ip_range,
        protocol,
    })
}

fn parse_limit_policy(node: &KdlNode) -> Result<ResourceCreationLimitPolicy> {
    let mut policy = ResourceCreationLimitPolicy::default();

    if let Some(children) = node.children() {
        for child in children.nodes() {
            match child.name().value() {
                "new_game_sessions_per_creator" | "new-game-sessions-per-creator" => {
                    policy.new_game_sessions_per_creator = Some(required_i32(child)?);
                }
                "policy_period_in_minutes" | "policy-period-in-minutes" => {
                    policy.policy_period_in_minutes = Some(required_i32(child)?);
                }
                other => {
                    tracing::warn!("Ignoring unknown resource-creation-limit-policy setting '{}'", other);
                }
            }
        }
    }

    Ok(policy)
}

fn parse_runtime_configuration(node: &KdlNode) -> Result<RuntimeConfiguration> {
    let mut runtime = RuntimeConfiguration::default();

    if let Some(children) = node.children() {
        for child in children.nodes() {
            match child.name().value() {
                "game_session_activation_timeout_seconds"
                | "game-session-activation-timeout-seconds" => {
                    runtime.game_session_activation_timeout_seconds = Some(required_i32(child)?);
                }
                "max_concurrent_game_session_activations"
                | "max-concurrent-game-session-activations" => {
                    runtime.max_concurrent_game_session_activations = Some(required_i32(child)?);
                }
                "server_process" | "server-process" => {
                    let mut process = ServerProcess::new(required_string(child)?);
                    process.parameters = property_string(child, &["parameters"]);
                    if let Some(count) =
                        property_i32(child, &["concurrent-executions", "concurrent_executions"])?
                    {
                        process.concurrent_executions = count;
                    }
                    runtime.server_processes.push(process);
                }
                other => {
                    tracing::warn!("Ignoring unknown runtime-configuration setting '{}'", other);
                }
            }
        }
    }

    Ok(runtime)
}

fn parse_timeouts(node: &KdlNode) -> Result<Timeouts> {
    let mut timeouts = Timeouts::default();

    if let Some(children) = node.children() {
        for child in children.nodes() {
            let seconds = || -> Result<u64> {
                let value = required_i32(child)?;
                u64::try_from(value).map_err(|_| {
                    ProjectError::InvalidConfig(format!(
                        "timeouts.{} must not be negative",
                        child.name().value()
                    ))
                })
            };
            match child.name().value() {
                "create" => timeouts.create = Some(seconds()?),
                "delete" => timeouts.delete = Some(seconds()?),
                other => {
                    tracing::warn!("Ignoring unknown timeout '{}'", other);
                }
            }
        }
    }

    Ok(timeouts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{IpProtocol, ProtectionPolicy};

    fn parse(kdl: &str) -> Result<(String, FleetResource)> {
        let doc: kdl::KdlDocument = kdl.parse().unwrap();
        parse_fleet(doc.nodes().first().unwrap())
    }

    #[test]
    fn test_parse_minimal_fleet() {
        let (name, fleet) = parse(
            r#"
            fleet "game" {
                build-id "build-1"
                ec2-instance-type "c5.large"
                server-launch-path "C:\\game\\GameLiftExampleServer.exe"
            }
        "#,
        )
        .unwrap();

        assert_eq!(name, "game");
        assert_eq!(fleet.name, "game");
        assert_eq!(fleet.build_id, "build-1");
        assert_eq!(fleet.ec2_instance_type, "c5.large");
        assert_eq!(
            fleet.server_launch_path.as_deref(),
            Some("C:\\game\\GameLiftExampleServer.exe")
        );
        assert_eq!(
            fleet.new_game_session_protection_policy,
            ProtectionPolicy::NoProtection
        );
        assert!(fleet.runtime_configuration.is_none());
    }

    #[test]
    fn test_parse_full_fleet() {
        let (_, fleet) = parse(
            r#"
            fleet "game" {
                name "space-game-prod"
                build-id "build-2"
                ec2-instance-type "c5.xlarge"
                description "production fleet"
                inbound-permission from-port=7777 to-port=7780 ip-range="0.0.0.0/0" protocol="UDP"
                inbound-permission from-port=8080 to-port=8080 ip-range="10.0.0.0/8" protocol="TCP"
                log-paths "/local/game/logs" "/local/game/crash"
                metric-groups "prod"
                new-game-session-protection-policy "FullProtection"
                resource-creation-limit-policy {
                    new-game-sessions-per-creator 3
                    policy-period-in-minutes 15
                }
                runtime-configuration {
                    game-session-activation-timeout-seconds 300
                    max-concurrent-game-session-activations 2
                    server-process "/local/game/server" parameters="-port 7777" concurrent-executions=2
                    server-process "/local/game/server"
                }
                timeouts {
                    create 1800
                    delete 600
                }
            }
        "#,
        )
        .unwrap();

        assert_eq!(fleet.name, "space-game-prod");
        assert_eq!(fleet.description.as_deref(), Some("production fleet"));
        assert_eq!(fleet.ec2_inbound_permissions.len(), 2);
        assert_eq!(fleet.ec2_inbound_permissions[0].from_port, 7777);
        assert_eq!(fleet.ec2_inbound_permissions[0].to_port, 7780);
        assert_eq!(fleet.ec2_inbound_permissions[0].protocol, IpProtocol::Udp);
        assert_eq!(fleet.ec2_inbound_permissions[1].ip_range, "10.0.0.0/8");
        assert_eq!(fleet.log_paths, vec!["/local/game/logs", "/local/game/crash"]);
        assert_eq!(fleet.metric_groups, vec!["prod"]);
        assert_eq!(
            fleet.new_game_session_protection_policy,
            ProtectionPolicy::FullProtection
        );

        let limits = fleet.resource_creation_limit_policy.unwrap();
        assert_eq!(limits.new_game_sessions_per_creator, Some(3));
        assert_eq!(limits.policy_period_in_minutes, Some(15));

        let runtime = fleet.runtime_configuration.unwrap();
        assert_eq!(runtime.game_session_activation_timeout_seconds, Some(300));
        assert_eq!(runtime.max_concurrent_game_session_activations, Some(2));
        assert_eq!(runtime.server_processes.len(), 2);
        assert_eq!(
            runtime.server_processes[0].parameters.as_deref(),
            Some("-port 7777")
        );
        assert_eq!(runtime.server_processes[0].concurrent_executions, 2);
        assert_eq!(runtime.server_processes[1].concurrent_executions, 1);

        assert_eq!(fleet.timeouts.create, Some(1800));
        assert_eq!(fleet.timeouts.delete, Some(600));
    }

    #[test]
    fn test_parse_fleet_snake_case() {
        let (_, fleet) = parse(
            r#"
            fleet "game" {
                build_id "build-1"
                ec2_instance_type "c5.large"
                server_launch_path "/local/game/server"
                server_launch_parameters "+sv_port 33435"
                peer_vpc_aws_account_id "123456789012"
                peer_vpc_id "vpc-0abc"
            }
        "#,
        )
        .unwrap();

        assert_eq!(fleet.build_id, "build-1");
        assert_eq!(
            fleet.server_launch_parameters.as_deref(),
            Some("+sv_port 33435")
        );
        assert_eq!(fleet.peer_vpc_aws_account_id.as_deref(), Some("123456789012"));
        assert_eq!(fleet.peer_vpc_id.as_deref(), Some("vpc-0abc"));
    }

    #[test]
    fn test_parse_permission_requires_protocol() {
        let err = parse(
            r#"
            fleet "game" {
                inbound-permission from-port=7777 to-port=7777 ip-range="0.0.0.0/0"
            }
        "#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("protocol"));
    }

    #[test]
    fn test_parse_rejects_unknown_protection_policy() {
        let err = parse(
            r#"
            fleet "game" {
                new-game-session-protection-policy "Sometimes"
            }
        "#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("Sometimes"));
    }

    #[test]
    fn test_parse_rejects_out_of_range_integer() {
        let err = parse(
            r#"
            fleet "game" {
                runtime-configuration {
                    max-concurrent-game-session-activations 99999999999
                }
            }
        "#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("out of range"));
    }

    #[test]
    fn test_parse_rejects_negative_timeout() {
        let err = parse(
            r#"
            fleet "game" {
                timeouts {
                    create -5
                }
            }
        "#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("negative"));
    }
}
