//! Network resolution: looking up a named deployment network.

use crate::error::ConfigError;
use crate::types::ProjectConfig;

/// A named network with its configuration flattened for deployment tooling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedNetwork {
    /// The network name.
    pub name: String,
    /// RPC endpoint, if configured.
    pub host: Option<String>,
    /// Whether deployment history on this network survives pruning.
    pub persist: bool,
}

/// Resolves a network by name, or the active network when `name` is `None`.
pub fn resolve_network(
    config: &ProjectConfig,
    name: Option<&str>,
) -> Result<ResolvedNetwork, ConfigError> {
    let name = name.unwrap_or(&config.active_network);
    let network = config
        .networks
        .get(name)
        .ok_or_else(|| ConfigError::UnknownNetwork(name.to_string()))?;

    Ok(ResolvedNetwork {
        name: name.to_string(),
        host: network.host.clone(),
        persist: network.persist,
    })
}
