//! Per-build state: memoized dirty flags and the in-memory artifact set.

use std::collections::{BTreeMap, HashMap};

use keel_cache::{Artifact, ArtifactStore, CompilerFingerprint};
use keel_source::{FileId, SourceDb};

use crate::index::ProjectIndex;

/// State of one build invocation.
///
/// A session is created after the project index is complete and lives until
/// the build ends. It reads cached artifacts from the store but never writes
/// to it.
pub struct BuildSession<'a> {
    store: &'a ArtifactStore,
    index: &'a ProjectIndex,
    db: &'a SourceDb,
    fingerprint: CompilerFingerprint,
    /// Memoized dirty flags, computed at most once per name.
    dirty: HashMap<String, bool>,
    /// Cached artifacts that were valid when their flag was computed.
    candidates: HashMap<String, Artifact>,
    /// Artifacts of this build, from cache or fresh compilation.
    artifacts: BTreeMap<String, Artifact>,
}

impl<'a> BuildSession<'a> {
    /// Starts a session for `index` against the current `fingerprint`.
    pub fn new(
        store: &'a ArtifactStore,
        index: &'a ProjectIndex,
        db: &'a SourceDb,
        fingerprint: CompilerFingerprint,
    ) -> Self {
        Self {
            store,
            index,
            db,
            fingerprint,
            dirty: HashMap::new(),
            candidates: HashMap::new(),
            artifacts: BTreeMap::new(),
        }
    }

    /// Whether `name` has to be rebuilt.
    ///
    /// A declaration is dirty when it has no readable cached artifact, when
    /// the artifact was built with a different fingerprint or from different
    /// source text, or when any declaration it inherits from is dirty. Names
    /// that are not in the index are always dirty.
    pub fn is_dirty(&mut self, name: &str) -> bool {
        if let Some(&dirty) = self.dirty.get(name) {
            return dirty;
        }
        let (index, db) = (self.index, self.db);
        let Some(decl) = index.get(name) else {
            return true;
        };

        let file = db.get_file(decl.file);
        let stale = match self.store.load(name) {
            None => Some("no cached artifact"),
            Some(cached) if cached.compiler != self.fingerprint => Some("compiler settings changed"),
            Some(cached) if cached.source_hash != file.content_hash => Some("source changed"),
            Some(cached) => {
                self.candidates.insert(name.to_string(), cached);
                None
            }
        };

        // Every dependency is evaluated so that its flag is final before ours.
        let mut dependency_dirty = None;
        for dep in &decl.dependencies {
            if self.is_dirty(dep) && dependency_dirty.is_none() {
                dependency_dirty = Some(dep.as_str());
            }
        }

        let dirty = stale.is_some() || dependency_dirty.is_some();
        if let Some(reason) = stale {
            tracing::debug!(target: "keel.build", declaration = name, reason, "declaration is dirty");
        } else if let Some(dep) = dependency_dirty {
            tracing::debug!(
                target: "keel.build",
                declaration = name,
                dependency = dep,
                "declaration is dirty through a dependency"
            );
        }
        self.dirty.insert(name.to_string(), dirty);
        dirty
    }

    /// Whether any declaration of `file` is dirty.
    ///
    /// Every declaration of the file is evaluated, not just up to the first
    /// dirty one.
    pub fn file_is_dirty(&mut self, file: FileId) -> bool {
        let names: Vec<String> = self.index.in_file(file).map(|d| d.name.clone()).collect();
        let mut dirty = false;
        for name in &names {
            dirty |= self.is_dirty(name);
        }
        dirty
    }

    /// Moves the cached artifacts of a clean file into the session.
    ///
    /// Returns `false` if some declaration of the file has no valid cached
    /// artifact, which means the file should have been compiled instead.
    pub fn adopt_cached(&mut self, file: FileId) -> bool {
        let mut complete = true;
        let names: Vec<String> = self.index.in_file(file).map(|d| d.name.clone()).collect();
        for name in names {
            match self.candidates.remove(&name) {
                Some(artifact) => {
                    self.artifacts.insert(name, artifact);
                }
                None => complete = false,
            }
        }
        complete
    }

    /// Records a freshly built artifact.
    pub fn insert(&mut self, artifact: Artifact) {
        self.candidates.remove(&artifact.contract_name);
        self.artifacts
            .insert(artifact.contract_name.clone(), artifact);
    }

    /// Looks up an artifact of this build.
    pub fn artifact(&self, name: &str) -> Option<&Artifact> {
        self.artifacts.get(name)
    }

    /// Ends the session, returning every artifact keyed by name.
    pub fn into_artifacts(self) -> BTreeMap<String, Artifact> {
        self.artifacts
    }
}
