//! `keel networks`: prune and list per-network deployment history.

use keel_cache::CacheError;

use crate::pipeline::{load_project, Project};
use crate::GlobalArgs;

/// Runs `keel networks prune`.
pub fn prune(active: Option<&str>, global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let project = load_project(global)?;
    let rewritten = prune_project(&project, active)?;
    if !global.quiet {
        eprintln!("   Pruned {rewritten} artifact(s)");
    }
    Ok(0)
}

/// Runs `keel networks list`.
pub fn list(name: &str, json: bool, global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let project = load_project(global)?;
    println!("{}", render_history(&project, name, json)?);
    Ok(0)
}

/// Keeps records of `active` (default: the configured active network) and of
/// persistent networks.
fn prune_project(project: &Project, active: Option<&str>) -> Result<usize, CacheError> {
    let config = &project.config;
    let active = active.unwrap_or(&config.active_network);
    project
        .store()
        .prune_networks(Some(active), |network| config.is_persistent(network))
}

fn render_history(
    project: &Project,
    name: &str,
    json: bool,
) -> Result<String, Box<dyn std::error::Error>> {
    let artifact = project
        .store()
        .load(name)
        .ok_or_else(|| CacheError::MissingArtifact {
            name: name.to_string(),
        })?;

    if json {
        return Ok(serde_json::to_string_pretty(&artifact.networks)?);
    }
    if artifact.networks.is_empty() {
        return Ok(format!("{name} has no recorded deployments"));
    }
    let lines: Vec<String> = artifact
        .networks
        .iter()
        .map(|(id, record)| {
            format!(
                "{id}  {:<12} {}  tx {}  owner {}",
                record.network, record.address, record.transaction_hash, record.owner
            )
        })
        .collect();
    Ok(lines.join("\n"))
}
