//! Configuration types deserialized from `keel.toml`.

use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::PathBuf;

/// The top-level project configuration parsed from `keel.toml`.
#[derive(Debug, Clone, Deserialize)]
pub struct ProjectConfig {
    /// Name of the network deployments are currently recorded against.
    pub active_network: String,
    /// Core project metadata.
    pub project: ProjectMeta,
    /// Source and build-output directories.
    #[serde(default)]
    pub paths: PathsConfig,
    /// Compiler backend selection and optimizer settings.
    #[serde(default)]
    pub compiler: CompilerConfig,
    /// Named deployment networks (e.g., "development", "mainnet").
    #[serde(default)]
    pub networks: BTreeMap<String, NetworkConfig>,
}

impl ProjectConfig {
    /// Returns `true` if deployment history on `network` must survive pruning.
    ///
    /// Networks missing from the configuration are never persistent.
    pub fn is_persistent(&self, network: &str) -> bool {
        self.networks.get(network).is_some_and(|n| n.persist)
    }
}

/// Core project metadata.
#[derive(Debug, Clone, Deserialize)]
pub struct ProjectMeta {
    /// The project name.
    pub name: String,
    /// The project version string.
    #[serde(default)]
    pub version: String,
}

/// Project-relative directories for sources and artifacts.
#[derive(Debug, Clone, Deserialize)]
pub struct PathsConfig {
    /// Directory scanned recursively for contract sources.
    #[serde(default = "PathsConfig::default_contracts")]
    pub contracts: PathBuf,
    /// Directory holding one JSON artifact per declaration.
    #[serde(default = "PathsConfig::default_build")]
    pub build: PathBuf,
}

impl PathsConfig {
    fn default_contracts() -> PathBuf {
        PathBuf::from("contracts")
    }

    fn default_build() -> PathBuf {
        PathBuf::from("build/contracts")
    }
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            contracts: Self::default_contracts(),
            build: Self::default_build(),
        }
    }
}

/// Compiler backend and optimizer configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct CompilerConfig {
    /// Expected backend version. When absent, the version reported by the
    /// backend is used as-is.
    #[serde(default)]
    pub version: Option<String>,
    /// Whether the optimizer is enabled.
    #[serde(default = "CompilerConfig::default_optimize")]
    pub optimize: bool,
    /// Optimizer run count.
    #[serde(default = "CompilerConfig::default_runs")]
    pub runs: u32,
    /// Backend executable invoked with `--standard-json`.
    #[serde(default = "CompilerConfig::default_program")]
    pub program: String,
}

impl CompilerConfig {
    fn default_optimize() -> bool {
        true
    }

    fn default_runs() -> u32 {
        200
    }

    fn default_program() -> String {
        "solc".to_string()
    }
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            version: None,
            optimize: Self::default_optimize(),
            runs: Self::default_runs(),
            program: Self::default_program(),
        }
    }
}

/// Configuration for one deployment network.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NetworkConfig {
    /// RPC endpoint of the network, informational for deployment tooling.
    #[serde(default)]
    pub host: Option<String>,
    /// Whether deployment history on this network survives pruning.
    #[serde(default)]
    pub persist: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::load_config_from_str;

    const BASE: &str = r#"
active_network = "development"

[project]
name = "token"

[networks.development]

[networks.mainnet]
persist = true
"#;

    #[test]
    fn persistence_flags() {
        let config = load_config_from_str(BASE).unwrap();
        assert!(config.is_persistent("mainnet"));
        assert!(!config.is_persistent("development"));
        assert!(!config.is_persistent("unconfigured"));
    }

    #[test]
    fn default_paths() {
        let config = load_config_from_str(BASE).unwrap();
        assert_eq!(config.paths.contracts, PathBuf::from("contracts"));
        assert_eq!(config.paths.build, PathBuf::from("build/contracts"));
    }

    #[test]
    fn compiler_overrides() {
        let toml = format!(
            "{BASE}\n[compiler]\nversion = \"0.4.24\"\noptimize = false\nruns = 1\nprogram = \"/opt/solc\"\n"
        );
        let config = load_config_from_str(&toml).unwrap();
        assert_eq!(config.compiler.version.as_deref(), Some("0.4.24"));
        assert!(!config.compiler.optimize);
        assert_eq!(config.compiler.runs, 1);
        assert_eq!(config.compiler.program, "/opt/solc");
    }

    #[test]
    fn network_host() {
        let toml = r#"
active_network = "local"

[project]
name = "token"

[networks.local]
host = "http://127.0.0.1:8545"
"#;
        let config = load_config_from_str(toml).unwrap();
        assert_eq!(
            config.networks["local"].host.as_deref(),
            Some("http://127.0.0.1:8545")
        );
    }
}
