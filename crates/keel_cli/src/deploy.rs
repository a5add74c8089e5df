//! `keel deploy record`: append a deployment to a contract's history.

use keel_cache::NetworkRecord;
use keel_config::resolve_network;

use crate::pipeline::{load_project, Project};
use crate::{GlobalArgs, RecordArgs};

/// Runs the `keel deploy record` command.
pub fn run(args: &RecordArgs, global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let project = load_project(global)?;
    let id = record(&project, args)?;
    if !global.quiet {
        eprintln!("   Recorded {} deployment {id} at {}", args.name, args.address);
    }
    Ok(0)
}

/// Records the deployment described by `args`, returning its id.
///
/// The network must be configured; it defaults to the active network.
fn record(
    project: &Project,
    args: &RecordArgs,
) -> Result<keel_common::DeploymentId, Box<dyn std::error::Error>> {
    let network = resolve_network(&project.config, args.network.as_deref())?;
    let id = project.store().record_deployment(
        &args.name,
        NetworkRecord {
            address: args.address.clone(),
            network: network.name,
            owner: args.owner.clone(),
            transaction_hash: args.txid.clone(),
        },
    )?;
    Ok(id)
}
