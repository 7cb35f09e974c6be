use anyhow::Context;
use colored::Colorize;
use liftflow_cloud::{ActionType, ApplyResult, Plan, StateManager};
use liftflow_cloud_aws::GameLiftProvider;
use liftflow_core::{AWS_PROVIDER, Project};
use std::path::{Path, PathBuf};

/// A loaded project together with the state that belongs to it
pub struct Workspace {
    pub project_file: PathBuf,
    pub project: Project,
    pub state: StateManager,
}

impl Workspace {
    pub fn load(config: Option<&Path>) -> anyhow::Result<Self> {
        let project_file = liftflow_config::find_project_file(config)?;
        let project = liftflow_core::load_project(&project_file)
            .with_context(|| format!("Failed to load {}", project_file.display()))?;

        Ok(Self {
            state: StateManager::new(project_root(&project_file)),
            project_file,
            project,
        })
    }

    pub async fn provider(&self) -> GameLiftProvider {
        GameLiftProvider::from_config(&self.project.provider(AWS_PROVIDER)).await
    }

    pub fn print_header(&self) {
        println!(
            "Project: {} ({})",
            self.project.name.cyan(),
            self.project_file.display()
        );
    }
}

/// Directory the state lives under; a project file inside `.liftflow/`
/// shares the state with the directory above it
fn project_root(project_file: &Path) -> PathBuf {
    let parent = project_file.parent().unwrap_or(Path::new(""));
    match parent.file_name() {
        Some(name) if name == liftflow_config::PROJECT_DIR => {
            parent.parent().unwrap_or(Path::new("")).to_path_buf()
        }
        _ => parent.to_path_buf(),
    }
}

pub fn print_plan(plan: &Plan) {
    if !plan.has_changes {
        println!(
            "{}",
            "No changes. Infrastructure matches the project file.".green()
        );
        return;
    }

    println!();
    for action in &plan.actions {
        let symbol = match action.action_type {
            ActionType::Create => "+".green().bold(),
            ActionType::Update => "~".yellow().bold(),
            ActionType::Replace => "-/+".magenta().bold(),
            ActionType::Delete => "-".red().bold(),
            ActionType::NoOp => continue,
        };
        println!("  {} {}  {}", symbol, action.key().cyan(), action.description);
        if !action.changes.is_empty() {
            println!("      changes: {}", action.changes.join(", ").dimmed());
        }
    }

    let summary = plan.summary();
    println!();
    println!(
        "Plan: {} to create, {} to update, {} to replace, {} to delete.",
        summary.create.to_string().green(),
        summary.update.to_string().yellow(),
        summary.replace.to_string().magenta(),
        summary.delete.to_string().red()
    );
}

/// Print an apply result; fails when any action failed
pub fn report(result: &ApplyResult) -> anyhow::Result<()> {
    println!();
    for success in &result.succeeded {
        println!("  {} {}", "✓".green().bold(), success.message);
    }
    for failure in &result.failed {
        println!(
            "  {} {}: {}",
            "✗".red().bold(),
            failure.action_id,
            failure.error.as_deref().unwrap_or("unknown error")
        );
    }
    println!();
    println!(
        "{} succeeded, {} failed in {:.1}s",
        result.succeeded.len(),
        result.failed.len(),
        result.duration_ms as f64 / 1000.0
    );

    if result.is_success() {
        Ok(())
    } else {
        anyhow::bail!("{} action(s) failed", result.failed.len())
    }
}
