//! Parsing and validation of `keel.toml` project configuration files.
//!
//! This crate reads the project configuration file and produces a strongly-typed
//! [`ProjectConfig`] with compiler settings, project paths, and the set of
//! deployment networks (including which of them keep their history across
//! network switches).

#![warn(missing_docs)]

pub mod error;
pub mod loader;
pub mod resolve;
pub mod types;

pub use error::ConfigError;
pub use loader::{load_config, load_config_file, load_config_from_str, CONFIG_FILE};
pub use resolve::{resolve_network, ResolvedNetwork};
pub use types::*;
