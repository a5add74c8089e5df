//! Keel CLI: incremental builds and deployment history for contract projects.
//!
//! Provides `keel build` for compiling only what changed, `keel deploy record`
//! for appending a deployment to an artifact, and `keel networks` for pruning
//! and listing per-network deployment history.

#![warn(missing_docs)]

mod build;
mod deploy;
mod networks;
mod pipeline;

use std::process;

use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

/// Keel: incremental contract builds.
#[derive(Parser, Debug)]
#[command(name = "keel", version, about = "Incremental contract build cache")]
pub struct Cli {
    /// Suppress all output except errors.
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Enable verbose (debug-level) output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Control colored output.
    #[arg(long, global = true, value_enum, default_value_t = ColorChoice::Auto)]
    pub color: ColorChoice,

    /// Path to a custom `keel.toml` configuration file.
    #[arg(long, global = true)]
    pub config: Option<String>,

    /// The subcommand to run.
    #[command(subcommand)]
    pub command: Command,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Compile every contract whose source or dependencies changed.
    Build,
    /// Record deployments of built contracts.
    #[command(subcommand)]
    Deploy(DeployCommand),
    /// Inspect and prune per-network deployment history.
    #[command(subcommand)]
    Networks(NetworksCommand),
}

/// `keel deploy` subcommands.
#[derive(Subcommand, Debug)]
pub enum DeployCommand {
    /// Append a deployment record to a contract's artifact.
    Record(RecordArgs),
}

/// Arguments for `keel deploy record`.
#[derive(Parser, Debug)]
pub struct RecordArgs {
    /// Contract name.
    pub name: String,
    /// Address the contract was deployed at.
    pub address: String,
    /// Hash of the deployment transaction.
    pub txid: String,
    /// Address of the deploying account.
    pub owner: String,
    /// Network the deployment was made on (default: the active network).
    #[arg(short, long)]
    pub network: Option<String>,
}

/// `keel networks` subcommands.
#[derive(Subcommand, Debug)]
pub enum NetworksCommand {
    /// Drop deployment records of non-persistent networks.
    Prune {
        /// Network whose records are kept (default: the active network).
        #[arg(long)]
        active: Option<String>,
    },
    /// Print the deployment history of one contract.
    List {
        /// Contract name.
        name: String,
        /// Print the history as JSON.
        #[arg(long)]
        json: bool,
    },
}

/// Controls whether colored output is produced.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ColorChoice {
    /// Detect from terminal capabilities.
    Auto,
    /// Always produce colored output.
    Always,
    /// Never produce colored output.
    Never,
}

/// Global settings derived from CLI flags.
pub struct GlobalArgs {
    /// Whether to suppress non-error output.
    pub quiet: bool,
    /// Whether to print verbose/debug information.
    pub verbose: bool,
    /// Whether to use colored output.
    pub color: bool,
    /// Optional path to a custom config file.
    pub config: Option<String>,
}

fn main() {
    let cli = Cli::parse();

    let color = match cli.color {
        ColorChoice::Auto => {
            std::env::var_os("NO_COLOR").is_none() && std::env::var_os("TERM").is_some()
        }
        ColorChoice::Always => true,
        ColorChoice::Never => false,
    };

    let global = GlobalArgs {
        quiet: cli.quiet,
        verbose: cli.verbose,
        color,
        config: cli.config,
    };
    init_logging(&global);

    let result = match cli.command {
        Command::Build => build::run(&global),
        Command::Deploy(DeployCommand::Record(ref args)) => deploy::run(args, &global),
        Command::Networks(NetworksCommand::Prune { ref active }) => {
            networks::prune(active.as_deref(), &global)
        }
        Command::Networks(NetworksCommand::List { ref name, json }) => {
            networks::list(name, json, &global)
        }
    };

    match result {
        Ok(code) => process::exit(code),
        Err(e) => {
            eprintln!("error: {e}");
            process::exit(1);
        }
    }
}

/// Installs the stderr log subscriber.
///
/// `RUST_LOG` wins when set; otherwise `--quiet` logs errors only, `--verbose`
/// logs keel's debug events, and the default is warnings.
fn init_logging(global: &GlobalArgs) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives(global)));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(global.color)
        .without_time()
        .try_init();
}

fn default_directives(global: &GlobalArgs) -> &'static str {
    if global.quiet {
        "error"
    } else if global.verbose {
        "warn,keel=debug"
    } else {
        "warn"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    fn global(quiet: bool, verbose: bool) -> GlobalArgs {
        GlobalArgs {
            quiet,
            verbose,
            color: false,
            config: None,
        }
    }

    #[test]
    fn parse_build() {
        let cli = Cli::parse_from(["keel", "build"]);
        assert!(matches!(cli.command, Command::Build));
        assert!(!cli.quiet);
        assert_eq!(cli.color, ColorChoice::Auto);
    }

    #[test]
    fn parse_deploy_record() {
        let cli = Cli::parse_from([
            "keel", "deploy", "record", "Token", "0xabc", "0xtx", "0xowner",
        ]);
        match cli.command {
            Command::Deploy(DeployCommand::Record(ref args)) => {
                assert_eq!(args.name, "Token");
                assert_eq!(args.address, "0xabc");
                assert_eq!(args.txid, "0xtx");
                assert_eq!(args.owner, "0xowner");
                assert!(args.network.is_none());
            }
            _ => panic!("expected deploy record"),
        }
    }

    #[test]
    fn parse_deploy_record_with_network() {
        let cli = Cli::parse_from([
            "keel", "deploy", "record", "Token", "0xabc", "0xtx", "0xowner", "--network", "mainnet",
        ]);
        match cli.command {
            Command::Deploy(DeployCommand::Record(ref args)) => {
                assert_eq!(args.network.as_deref(), Some("mainnet"));
            }
            _ => panic!("expected deploy record"),
        }
    }

    #[test]
    fn deploy_record_requires_all_positionals() {
        assert!(Cli::try_parse_from(["keel", "deploy", "record", "Token", "0xabc"]).is_err());
    }

    #[test]
    fn parse_networks_prune() {
        let cli = Cli::parse_from(["keel", "networks", "prune"]);
        assert!(matches!(
            cli.command,
            Command::Networks(NetworksCommand::Prune { active: None })
        ));

        let cli = Cli::parse_from(["keel", "networks", "prune", "--active", "testnet"]);
        match cli.command {
            Command::Networks(NetworksCommand::Prune { active }) => {
                assert_eq!(active.as_deref(), Some("testnet"));
            }
            _ => panic!("expected networks prune"),
        }
    }

    #[test]
    fn parse_networks_list() {
        let cli = Cli::parse_from(["keel", "networks", "list", "Token", "--json"]);
        match cli.command {
            Command::Networks(NetworksCommand::List { name, json }) => {
                assert_eq!(name, "Token");
                assert!(json);
            }
            _ => panic!("expected networks list"),
        }
    }

    #[test]
    fn parse_global_flags() {
        let cli = Cli::parse_from(["keel", "--quiet", "--color", "never", "build"]);
        assert!(cli.quiet);
        assert!(!cli.verbose);
        assert_eq!(cli.color, ColorChoice::Never);
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = Cli::parse_from(["keel", "build", "--verbose", "--config", "/p/keel.toml"]);
        assert!(cli.verbose);
        assert_eq!(cli.config.as_deref(), Some("/p/keel.toml"));
    }

    #[test]
    fn log_directives_follow_flags() {
        assert_eq!(default_directives(&global(false, false)), "warn");
        assert_eq!(default_directives(&global(true, false)), "error");
        assert_eq!(default_directives(&global(false, true)), "warn,keel=debug");
        // Quiet wins over verbose.
        assert_eq!(default_directives(&global(true, true)), "error");
    }
}
