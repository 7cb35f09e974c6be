use crate::utils::{self, Workspace};
use colored::Colorize;
use liftflow_cloud::{ApplyResult, CloudProvider, ResourceSet};
use liftflow_core::AWS_PROVIDER;
use std::path::Path;

pub async fn handle(
    config: Option<&Path>,
    target: Option<&str>,
    yes: bool,
) -> anyhow::Result<()> {
    let workspace = Workspace::load(config)?;
    workspace.print_header();

    let lock = workspace.state.acquire_lock().await?;
    let outcome = run(&workspace, target, yes).await;
    lock.release().await?;

    match outcome? {
        Some(result) => utils::report(&result),
        None => Ok(()),
    }
}

async fn run(
    workspace: &Workspace,
    target: Option<&str>,
    yes: bool,
) -> anyhow::Result<Option<ApplyResult>> {
    let provider = workspace.provider().await;
    let mut global = workspace.state.load().await?;

    println!("{}", "Refreshing state...".blue());
    let mut state = provider
        .refresh(&global.provider_state(AWS_PROVIDER))
        .await?;
    global.set_provider_state(AWS_PROVIDER, &state);
    workspace.state.save(&global).await?;

    if let Some(key) = target {
        let Some(resource) = state.get(key) else {
            anyhow::bail!("{} is not in state", key);
        };
        println!();
        println!("  {} {} ({})", "-".red().bold(), key.cyan(), resource.id);
        if !yes {
            println!();
            println!(
                "Run {} to destroy it.",
                format!("liftflow destroy {} -y", key).bold()
            );
            return Ok(None);
        }

        let mut result = ApplyResult::new();
        let started = std::time::Instant::now();
        match provider.destroy(key, &mut state).await {
            Ok(()) => result.add_success(key.to_string(), format!("Destroyed {}", key)),
            Err(e) => result.add_failure(key.to_string(), e.to_string()),
        }
        result.duration_ms = started.elapsed().as_millis() as u64;

        global.set_provider_state(AWS_PROVIDER, &state);
        workspace.state.save(&global).await?;
        return Ok(Some(result));
    }

    // Planning against an empty project lists every deletion in order
    let plan = provider.plan(&ResourceSet::new(), &state).await?;
    utils::print_plan(&plan);
    if !plan.has_changes {
        return Ok(None);
    }
    if !yes {
        println!();
        println!("Run {} to destroy everything.", "liftflow destroy -y".bold());
        return Ok(None);
    }

    println!();
    println!("{}", "Destroying...".blue());
    let result = provider.destroy_all(&mut state).await;

    global.set_provider_state(AWS_PROVIDER, &state);
    workspace.state.save(&global).await?;

    Ok(Some(result?))
}
