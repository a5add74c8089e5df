//! `keel build`: incremental compilation.
//!
//! 1. Find project root (walk up looking for `keel.toml`)
//! 2. Load config via `keel_config`
//! 3. Prune deployment history of non-persistent networks
//! 4. Compile dirty files through the configured compiler
//! 5. Render diagnostics and a summary

use std::path::Path;

use keel_build::{
    compile_project, BuildProgress, CompilerBackend, CompilerSettings, ProcessBackend,
    ProjectLayout,
};
use keel_cache::CompilerFingerprint;
use keel_diagnostics::DiagnosticSink;

use crate::pipeline::{load_project, render_diagnostics, Project};
use crate::GlobalArgs;

/// Runs the `keel build` command.
pub fn run(global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let project = load_project(global)?;
    let backend = ProcessBackend::new(project.config.compiler.program.clone());
    build_project(&project, &backend, global)
}

/// Builds `project` with `backend`. Returns exit code 0 on success.
pub fn build_project(
    project: &Project,
    backend: &dyn CompilerBackend,
    global: &GlobalArgs,
) -> Result<i32, Box<dyn std::error::Error>> {
    let config = &project.config;
    if !global.quiet {
        eprintln!(
            "   Building {} v{}",
            config.project.name, config.project.version
        );
    }

    let store = project.store();
    let pruned = store.prune_networks(None, |network| config.is_persistent(network))?;
    if pruned > 0 {
        tracing::info!(target: "keel.cli", artifacts = pruned, "pruned non-persistent deployment history");
    }

    let layout = ProjectLayout::new(&project.root, &config.paths.contracts);
    let settings = CompilerSettings {
        version: config.compiler.version.clone(),
        optimize: config.compiler.optimize,
        runs: config.compiler.runs,
    };
    let sink = DiagnosticSink::new();
    let progress = ConsoleProgress {
        quiet: global.quiet,
    };

    let result = compile_project(&layout, &settings, backend, &store, &sink, &progress);
    render_diagnostics(&sink, global.color);
    let output = result?;

    if !global.quiet {
        if output.compiled_files.is_empty() {
            eprintln!("   Up to date: {} artifact(s)", output.artifacts.len());
        } else {
            eprintln!(
                "   Finished: {} file(s) compiled, {} artifact(s) in {}",
                output.compiled_files.len(),
                output.artifacts.len(),
                store.dir().display()
            );
        }
    }
    Ok(0)
}

/// Prints compile progress to stderr.
struct ConsoleProgress {
    quiet: bool,
}

impl BuildProgress for ConsoleProgress {
    fn compiling(&self, fingerprint: &CompilerFingerprint) {
        if !self.quiet {
            eprintln!("   Compiling with {fingerprint}");
        }
    }

    fn compiling_file(&self, path: &Path) {
        if !self.quiet {
            eprintln!("    - {}", path.display());
        }
    }
}
