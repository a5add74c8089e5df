//! The build pass: discovery, dirty tracking, dispatch and persistence.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use keel_cache::{Artifact, ArtifactStore, CompilerFingerprint};
use keel_diagnostics::{Category, Diagnostic, DiagnosticCode, DiagnosticSink, Severity};
use keel_source::{discover_sources, SourceDb, SourceFile};

use crate::backend::{CompilerBackend, CompilerInput};
use crate::builder::build_artifacts;
use crate::error::BuildError;
use crate::index::ProjectIndex;
use crate::session::BuildSession;

/// A backend error message.
pub const BACKEND_ERROR: DiagnosticCode = DiagnosticCode::new(Category::Backend, 1);
/// A backend warning.
pub const BACKEND_WARNING: DiagnosticCode = DiagnosticCode::new(Category::Backend, 2);
/// A backend informational message.
pub const BACKEND_INFO: DiagnosticCode = DiagnosticCode::new(Category::Backend, 3);
/// The backend version differs from the project's pinned version.
pub const VERSION_MISMATCH: DiagnosticCode = DiagnosticCode::new(Category::Warning, 1);

/// Where a project's sources live.
#[derive(Debug, Clone)]
pub struct ProjectLayout {
    /// Project root. Source paths in artifacts are relative to it.
    pub root: PathBuf,
    /// Contracts directory, relative to `root` unless absolute.
    pub contracts: PathBuf,
}

impl ProjectLayout {
    /// Creates a layout.
    pub fn new(root: impl Into<PathBuf>, contracts: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            contracts: contracts.into(),
        }
    }

    /// Absolute location of the contracts directory.
    pub fn contracts_dir(&self) -> PathBuf {
        self.root.join(&self.contracts)
    }
}

/// Compiler options of a build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompilerSettings {
    /// Expected backend version, if pinned.
    pub version: Option<String>,
    /// Whether the optimizer runs.
    pub optimize: bool,
    /// Optimizer run count.
    pub runs: u32,
}

/// Observer of build progress, for console output.
pub trait BuildProgress {
    /// Called once, before the first file is compiled.
    fn compiling(&self, _fingerprint: &CompilerFingerprint) {}
    /// Called before each file is submitted to the backend.
    fn compiling_file(&self, _path: &Path) {}
}

/// A [`BuildProgress`] that reports nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl BuildProgress for NoProgress {}

/// Result of a successful build pass.
#[derive(Debug)]
pub struct BuildOutput {
    /// Every artifact of the project, keyed by declaration name.
    pub artifacts: BTreeMap<String, Artifact>,
    /// Project-relative paths of the files that were compiled.
    pub compiled_files: Vec<PathBuf>,
    /// Number of compile requests sent to the backend.
    pub backend_invocations: usize,
    /// Fingerprint the artifacts were checked and built against.
    pub fingerprint: CompilerFingerprint,
}

/// Runs one build pass.
///
/// Only files holding a dirty declaration are compiled; the cached artifacts
/// of all other files are loaded unchanged. Discovery problems abort before
/// the backend is invoked. Artifacts are saved only once every dirty file
/// has compiled, so a failing file leaves the store untouched and every
/// dirty declaration is still dirty on the next build.
pub fn compile_project(
    layout: &ProjectLayout,
    settings: &CompilerSettings,
    backend: &dyn CompilerBackend,
    store: &ArtifactStore,
    sink: &DiagnosticSink,
    progress: &dyn BuildProgress,
) -> Result<BuildOutput, BuildError> {
    let db = load_sources(layout)?;
    let index = ProjectIndex::build(&db)?;
    tracing::debug!(
        target: "keel.build",
        files = db.len(),
        declarations = index.len(),
        "indexed project"
    );

    let fingerprint = current_fingerprint(settings, backend, sink)?;
    let mut session = BuildSession::new(store, &index, &db, fingerprint.clone());

    // All flags are settled before anything is written, so a fresh artifact
    // never masks a dirty dependency.
    let mut dirty_files = Vec::new();
    for file in db.files() {
        if session.file_is_dirty(file.id) {
            dirty_files.push(file);
        } else if !session.adopt_cached(file.id) {
            // Compile rather than return an incomplete artifact set.
            dirty_files.push(file);
        }
    }

    let mut compiled_files = Vec::new();
    let mut backend_invocations = 0;
    if !dirty_files.is_empty() {
        progress.compiling(&fingerprint);
    }
    let mut fresh = Vec::new();
    for file in dirty_files {
        progress.compiling_file(&file.path);
        tracing::info!(target: "keel.build", file = %file.path.display(), "compiling");

        fresh.extend(compile_file(file, &index, settings, backend, sink, &fingerprint)?);
        backend_invocations += 1;
        compiled_files.push(file.path.clone());
    }

    for mut artifact in fresh {
        store.save(&mut artifact)?;
        session.insert(artifact);
    }

    Ok(BuildOutput {
        artifacts: session.into_artifacts(),
        compiled_files,
        backend_invocations,
        fingerprint,
    })
}

fn load_sources(layout: &ProjectLayout) -> Result<SourceDb, BuildError> {
    let dir = layout.contracts_dir();
    let paths = discover_sources(&dir).map_err(|source| BuildError::Source {
        path: dir.clone(),
        source,
    })?;
    if paths.is_empty() {
        return Err(BuildError::NoSources { dir });
    }

    let mut db = SourceDb::new();
    for path in paths {
        let name = path.strip_prefix(&layout.root).unwrap_or(&path).to_path_buf();
        db.load_file(&path, name)
            .map_err(|source| BuildError::Source { path, source })?;
    }
    Ok(db)
}

fn current_fingerprint(
    settings: &CompilerSettings,
    backend: &dyn CompilerBackend,
    sink: &DiagnosticSink,
) -> Result<CompilerFingerprint, BuildError> {
    let version = backend.version()?;
    if let Some(pinned) = &settings.version {
        if !pin_matches(&version, pinned) {
            tracing::warn!(target: "keel.build", pinned = %pinned, actual = %version, "compiler version mismatch");
            sink.emit(
                Diagnostic::warning(
                    VERSION_MISMATCH,
                    format!("compiler reports version {version}, but the project pins {pinned}"),
                )
                .with_note("artifacts are fingerprinted with the reported version"),
            );
        }
    }
    Ok(CompilerFingerprint::new(version, settings.optimize, settings.runs))
}

/// A pin matches a version it equals, or a version extending it with a
/// `+build` or `-prerelease` suffix.
fn pin_matches(version: &str, pin: &str) -> bool {
    match version.strip_prefix(pin) {
        Some(rest) => rest.is_empty() || rest.starts_with('+') || rest.starts_with('-'),
        None => false,
    }
}

/// Sends one file to the backend and builds its artifacts without saving them.
fn compile_file(
    file: &SourceFile,
    index: &ProjectIndex,
    settings: &CompilerSettings,
    backend: &dyn CompilerBackend,
    sink: &DiagnosticSink,
    fingerprint: &CompilerFingerprint,
) -> Result<Vec<Artifact>, BuildError> {
    let input = CompilerInput::for_file(
        &file.unit_name(),
        &file.content,
        settings.optimize,
        settings.runs,
    );
    let output = backend.compile(&input)?;

    for message in &output.errors {
        let severity = message.severity();
        let code = match severity {
            Severity::Error => BACKEND_ERROR,
            Severity::Warning => BACKEND_WARNING,
            Severity::Info => BACKEND_INFO,
        };
        if severity == Severity::Warning {
            tracing::warn!(target: "keel.build", file = %file.path.display(), message = %message.message, "compiler warning");
        }
        sink.emit(
            Diagnostic::new(severity, code, message.message.clone())
                .at(file.path.clone(), None)
                .with_rendered(message.text()),
        );
    }
    if output.has_errors() {
        return Err(BuildError::Compilation {
            file: file.path.clone(),
            messages: output
                .errors
                .iter()
                .filter(|m| m.is_error())
                .map(|m| m.text().to_string())
                .collect(),
        });
    }

    build_artifacts(file, index.in_file(file.id), &output, fingerprint)
}
