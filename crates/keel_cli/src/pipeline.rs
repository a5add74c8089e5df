//! Shared helpers for CLI commands.
//!
//! Contains project root resolution, configuration loading, artifact store
//! construction, and diagnostic rendering.

use std::path::{Path, PathBuf};

use keel_cache::ArtifactStore;
use keel_config::{ProjectConfig, CONFIG_FILE};
use keel_diagnostics::{DiagnosticRenderer, DiagnosticSink, TerminalRenderer};

use crate::GlobalArgs;

/// A loaded project: its root directory and validated configuration.
pub struct Project {
    /// Directory the project's relative paths are resolved against.
    pub root: PathBuf,
    /// The validated `keel.toml`.
    pub config: ProjectConfig,
}

impl Project {
    /// Opens the artifact store under the configured build directory.
    pub fn store(&self) -> ArtifactStore {
        ArtifactStore::new(&self.root.join(&self.config.paths.build))
    }
}

/// Walks up from `start` looking for the nearest directory containing `keel.toml`.
pub fn find_project_root(start: &Path) -> Result<PathBuf, Box<dyn std::error::Error>> {
    let mut current = start.to_path_buf();
    loop {
        if current.join(CONFIG_FILE).exists() {
            return Ok(current);
        }
        if !current.pop() {
            return Err(format!(
                "could not find {CONFIG_FILE} in {} or any parent directory",
                start.display()
            )
            .into());
        }
    }
}

/// Loads the project selected by the global CLI args.
///
/// With `--config`, a file path is loaded directly and its parent becomes the
/// project root; a directory path must contain `keel.toml`. Otherwise the
/// nearest `keel.toml` above the current directory is used.
pub fn load_project(global: &GlobalArgs) -> Result<Project, Box<dyn std::error::Error>> {
    let (root, config) = match global.config {
        Some(ref config_path) => {
            let p = PathBuf::from(config_path);
            if p.is_file() {
                let root = p
                    .parent()
                    .map(|p| p.to_path_buf())
                    .unwrap_or_else(|| PathBuf::from("."));
                (root, keel_config::load_config_file(&p)?)
            } else {
                let config = keel_config::load_config(&p)?;
                (p, config)
            }
        }
        None => {
            let root = find_project_root(&std::env::current_dir()?)?;
            let config = keel_config::load_config(&root)?;
            (root, config)
        }
    };
    Ok(Project { root, config })
}

/// Renders all diagnostics from a sink to stderr using the terminal renderer.
///
/// Returns the number of diagnostics rendered.
pub fn render_diagnostics(sink: &DiagnosticSink, color: bool) -> usize {
    let diagnostics = sink.take_all();
    let renderer = TerminalRenderer::new(color);
    for diag in &diagnostics {
        eprintln!("{}", renderer.render(diag));
    }
    diagnostics.len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    const CONFIG: &str = "active_network = \"development\"\n\n[project]\nname = \"token\"\n\n[paths]\nbuild = \"out\"\n\n[networks.development]\n";

    fn global(config: Option<String>) -> GlobalArgs {
        GlobalArgs {
            quiet: true,
            verbose: false,
            color: false,
            config,
        }
    }

    #[test]
    fn find_project_root_in_current_dir() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(CONFIG_FILE), CONFIG).unwrap();
        assert_eq!(find_project_root(tmp.path()).unwrap(), tmp.path());
    }

    #[test]
    fn find_project_root_in_parent() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(CONFIG_FILE), CONFIG).unwrap();
        let sub = tmp.path().join("contracts/lib");
        fs::create_dir_all(&sub).unwrap();
        assert_eq!(find_project_root(&sub).unwrap(), tmp.path());
    }

    #[test]
    fn find_project_root_not_found() {
        let tmp = TempDir::new().unwrap();
        let err = find_project_root(tmp.path()).unwrap_err();
        assert!(err.to_string().contains("could not find keel.toml"));
    }

    #[test]
    fn load_project_from_config_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("other.toml");
        fs::write(&path, CONFIG).unwrap();

        let project = load_project(&global(Some(path.to_string_lossy().into_owned()))).unwrap();
        assert_eq!(project.root, tmp.path());
        assert_eq!(project.config.project.name, "token");
        assert_eq!(project.store().dir(), tmp.path().join("out"));
    }

    #[test]
    fn load_project_from_config_dir() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(CONFIG_FILE), CONFIG).unwrap();
        let project =
            load_project(&global(Some(tmp.path().to_string_lossy().into_owned()))).unwrap();
        assert_eq!(project.root, tmp.path());
    }

    #[test]
    fn render_drains_the_sink() {
        use keel_diagnostics::{Category, Diagnostic, DiagnosticCode};
        let sink = DiagnosticSink::new();
        sink.emit(Diagnostic::warning(DiagnosticCode::new(Category::Warning, 1), "pin mismatch"));
        assert_eq!(render_diagnostics(&sink, false), 1);
        assert_eq!(render_diagnostics(&sink, false), 0);
    }
}
