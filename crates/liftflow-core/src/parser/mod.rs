//! KDL parser
//!
//! Turns a `liftflow.kdl` file into a [`Project`]. Each top-level node type
//! has its own module.

mod alias;
mod cloud;
mod fleet;

use alias::parse_alias;
use cloud::parse_provider;
use fleet::parse_fleet;

use crate::error::{ProjectError, Result};
use crate::model::Project;
use kdl::{KdlDocument, KdlNode};
use std::fs;
use std::path::Path;

/// Parse a project file
pub fn parse_kdl_file<P: AsRef<Path>>(path: P) -> Result<Project> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|e| ProjectError::IoError {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    let name = path
        .parent()
        .and_then(|p| p.file_name())
        .and_then(|n| n.to_str())
        .unwrap_or("unnamed")
        .to_string();
    parse_kdl_string(&content, name)
}

/// Parse project KDL from a string
///
/// `default_name` is used when the document has no `project` node.
pub fn parse_kdl_string(content: &str, default_name: String) -> Result<Project> {
    let doc: KdlDocument = content.parse()?;

    let mut project = Project {
        name: default_name,
        ..Default::default()
    };

    for node in doc.nodes() {
        match node.name().value() {
            "project" => {
                if let Some(name) = first_string(node) {
                    project.name = name;
                }
            }
            "provider" => {
                let (name, provider) = parse_provider(node)?;
                project.providers.insert(name, provider);
            }
            "fleet" => {
                let (name, fleet) = parse_fleet(node)?;
                if project.fleets.insert(name.clone(), fleet).is_some() {
                    return Err(ProjectError::InvalidConfig(format!(
                        "fleet '{}' is declared more than once",
                        name
                    )));
                }
            }
            "alias" => {
                let (name, alias) = parse_alias(node)?;
                if project.aliases.insert(name.clone(), alias).is_some() {
                    return Err(ProjectError::InvalidConfig(format!(
                        "alias '{}' is declared more than once",
                        name
                    )));
                }
            }
            other => {
                tracing::warn!("Ignoring unknown node: {}", other);
            }
        }
    }

    Ok(project)
}

/// Name argument of a resource node (`fleet "game" { ... }`)
fn node_name(node: &KdlNode, kind: &str) -> Result<String> {
    first_string(node)
        .ok_or_else(|| ProjectError::InvalidConfig(format!("{} requires a name", kind)))
}

fn first_string(node: &KdlNode) -> Option<String> {
    node.entries()
        .iter()
        .find(|e| e.name().is_none())
        .and_then(|e| e.value().as_string())
        .map(|s| s.to_string())
}

fn strings(node: &KdlNode) -> Vec<String> {
    node.entries()
        .iter()
        .filter(|e| e.name().is_none())
        .filter_map(|e| e.value().as_string().map(|s| s.to_string()))
        .collect()
}

/// First argument as a string, or an error naming the field
fn required_string(node: &KdlNode) -> Result<String> {
    first_string(node).ok_or_else(|| {
        ProjectError::InvalidConfig(format!("{} requires a string value", node.name().value()))
    })
}

fn to_i32(field: &str, value: i128) -> Result<i32> {
    i32::try_from(value).map_err(|_| {
        ProjectError::InvalidConfig(format!("{} is out of range: {}", field, value))
    })
}

/// First argument as an i32
fn required_i32(node: &KdlNode) -> Result<i32> {
    let field = node.name().value();
    let value = node
        .entries()
        .iter()
        .find(|e| e.name().is_none())
        .and_then(|e| e.value().as_integer())
        .ok_or_else(|| {
            ProjectError::InvalidConfig(format!("{} requires an integer value", field))
        })?;
    to_i32(field, value)
}

/// Named property as an i32 (`from-port=7777`)
fn property_i32(node: &KdlNode, keys: &[&str]) -> Result<Option<i32>> {
    for key in keys {
        if let Some(value) = node.get(*key).and_then(|v| v.as_integer()) {
            return to_i32(key, value).map(Some);
        }
    }
    Ok(None)
}

fn property_string(node: &KdlNode, keys: &[&str]) -> Option<String> {
    keys.iter()
        .find_map(|key| node.get(*key).and_then(|v| v.as_string()))
        .map(|s| s.to_string())
}
