//! On-disk store of per-declaration artifacts.
//!
//! Artifacts live at `<build_dir>/<Name>.json`. All read-modify-write
//! operations (saving with history merge, recording a deployment, pruning)
//! hold the store's write lock, so a store shared between threads never loses
//! a deployment record to a concurrent rewrite.

use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use keel_common::DeploymentId;

use crate::artifact::{Artifact, NetworkRecord};
use crate::error::CacheError;

/// File extension of artifact records.
const ARTIFACT_EXT: &str = "json";

/// Directory-backed store of [`Artifact`] records, one file per declaration.
pub struct ArtifactStore {
    /// Build-output directory holding the artifact files.
    dir: PathBuf,
    /// Serializes read-modify-write cycles on artifact files.
    write_lock: Mutex<()>,
}

impl ArtifactStore {
    /// Creates a store rooted at the given build directory.
    ///
    /// The directory is created lazily on first write.
    pub fn new(dir: &Path) -> Self {
        Self {
            dir: dir.to_path_buf(),
            write_lock: Mutex::new(()),
        }
    }

    /// Returns the build directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Returns the file path of the artifact for the given declaration.
    pub fn artifact_path(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{name}.{ARTIFACT_EXT}"))
    }

    /// Loads the artifact for a declaration.
    ///
    /// Returns `None` if the file doesn't exist, can't be read, or doesn't
    /// parse as an artifact. This is fail-safe: an unreadable record is a
    /// cache miss, never an error.
    pub fn load(&self, name: &str) -> Option<Artifact> {
        let path = self.artifact_path(name);
        let bytes = match std::fs::read(&path) {
            Ok(bytes) => bytes,
            Err(err) => {
                if err.kind() != std::io::ErrorKind::NotFound {
                    tracing::debug!(
                        target: "keel.cache",
                        path = %path.display(),
                        error = %err,
                        "failed to read artifact"
                    );
                }
                return None;
            }
        };
        match Artifact::from_json(&bytes) {
            Ok(artifact) => Some(artifact),
            Err(err) => {
                tracing::debug!(
                    target: "keel.cache",
                    path = %path.display(),
                    error = %err,
                    "ignoring unparsable artifact"
                );
                None
            }
        }
    }

    /// Persists a freshly built artifact, overwriting any previous record.
    ///
    /// Deployment history from the previous record is merged into `artifact`
    /// first, so recompilation never discards recorded deployments.
    pub fn save(&self, artifact: &mut Artifact) -> Result<(), CacheError> {
        let _guard = self.lock();
        if let Some(previous) = self.load(&artifact.contract_name) {
            artifact.merge_networks(&previous.networks);
        }
        self.write(artifact)
            .map_err(|e| e.persisting(&artifact.contract_name))
    }

    /// Appends a deployment record to a declaration's artifact and persists it.
    ///
    /// The new record gets an id strictly greater than every id already in
    /// the artifact. Fails with [`CacheError::MissingArtifact`] if the
    /// declaration has not been built.
    pub fn record_deployment(
        &self,
        name: &str,
        record: NetworkRecord,
    ) -> Result<DeploymentId, CacheError> {
        let _guard = self.lock();
        let mut artifact = self.load(name).ok_or_else(|| CacheError::MissingArtifact {
            name: name.to_string(),
        })?;
        let id = DeploymentId::next_after(artifact.last_deployment());
        artifact.networks.insert(id, record);
        self.write(&artifact).map_err(|e| e.persisting(name))?;
        Ok(id)
    }

    /// Removes every deployment record whose network is neither `active` nor persistent.
    ///
    /// Only artifacts whose network map actually changed are rewritten.
    /// Unreadable artifacts are skipped. Returns the number of rewritten artifacts.
    pub fn prune_networks(
        &self,
        active: Option<&str>,
        is_persistent: impl Fn(&str) -> bool,
    ) -> Result<usize, CacheError> {
        let _guard = self.lock();
        let mut rewritten = 0;
        for name in self.names()? {
            let Some(mut artifact) = self.load(&name) else {
                continue;
            };
            let before = artifact.networks.len();
            artifact
                .networks
                .retain(|_, record| Some(record.network.as_str()) == active || is_persistent(&record.network));
            if artifact.networks.len() != before {
                tracing::debug!(
                    target: "keel.cache",
                    artifact = %name,
                    removed = before - artifact.networks.len(),
                    "pruned deployment records"
                );
                self.write(&artifact).map_err(|e| e.persisting(&name))?;
                rewritten += 1;
            }
        }
        Ok(rewritten)
    }

    /// Lists the names of all persisted artifacts, sorted.
    ///
    /// A missing build directory yields an empty list.
    pub fn names(&self) -> Result<Vec<String>, CacheError> {
        if !self.dir.exists() {
            return Ok(Vec::new());
        }
        let io_err = |e| CacheError::Io {
            path: self.dir.clone(),
            source: e,
        };
        let mut names = Vec::new();
        for entry in std::fs::read_dir(&self.dir).map_err(io_err)? {
            let path = entry.map_err(io_err)?.path();
            if path.extension().and_then(|e| e.to_str()) == Some(ARTIFACT_EXT) {
                if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                    names.push(stem.to_string());
                }
            }
        }
        names.sort();
        Ok(names)
    }

    /// Writes the canonical form of `artifact` via a temporary file and rename.
    fn write(&self, artifact: &Artifact) -> Result<(), CacheError> {
        std::fs::create_dir_all(&self.dir).map_err(|e| CacheError::Io {
            path: self.dir.clone(),
            source: e,
        })?;
        let bytes = artifact.to_canonical_json()?;
        let path = self.artifact_path(&artifact.contract_name);
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, &bytes).map_err(|e| CacheError::Io {
            path: tmp.clone(),
            source: e,
        })?;
        std::fs::rename(&tmp, &path).map_err(|e| CacheError::Io { path, source: e })
    }

    fn lock(&self) -> MutexGuard<'_, ()> {
        self.write_lock
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifact::tests::sample_artifact;

    fn make_store() -> (tempfile::TempDir, ArtifactStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = ArtifactStore::new(&dir.path().join("build/contracts"));
        (dir, store)
    }

    fn record(network: &str) -> NetworkRecord {
        NetworkRecord {
            address: format!("0x{network}"),
            network: network.to_string(),
            owner: "0xowner".to_string(),
            transaction_hash: "0xtx".to_string(),
        }
    }

    #[test]
    fn save_and_load() {
        let (_dir, store) = make_store();
        let mut artifact = sample_artifact("Token");
        store.save(&mut artifact).unwrap();
        assert!(store.artifact_path("Token").exists());
        assert_eq!(store.load("Token").unwrap(), artifact);
    }

    #[test]
    fn concurrent_deployments_are_all_kept() {
        let (_dir, store) = make_store();
        store.save(&mut sample_artifact("Token")).unwrap();

        let ids: Vec<DeploymentId> = std::thread::scope(|scope| {
            let workers: Vec<_> = ["testnet", "mainnet"]
                .into_iter()
                .map(|network| {
                    let store = &store;
                    scope.spawn(move || {
                        (0..25)
                            .map(|_| store.record_deployment("Token", record(network)).unwrap())
                            .collect::<Vec<_>>()
                    })
                })
                .collect();
            workers
                .into_iter()
                .flat_map(|w| w.join().unwrap())
                .collect()
        });

        let loaded = store.load("Token").unwrap();
        assert_eq!(loaded.networks.len(), 50);
        for id in &ids {
            assert!(loaded.networks.contains_key(id));
        }
    }

    #[test]
    fn load_missing_returns_none() {
        let (_dir, store) = make_store();
        assert!(store.load("Nope").is_none());
    }

    #[test]
    fn load_corrupt_returns_none() {
        let (_dir, store) = make_store();
        std::fs::create_dir_all(store.dir()).unwrap();
        std::fs::write(store.artifact_path("Bad"), "{not json").unwrap();
        assert!(store.load("Bad").is_none());
    }

    #[test]
    fn save_preserves_deployment_history() {
        let (_dir, store) = make_store();
        let mut first = sample_artifact("Token");
        store.save(&mut first).unwrap();
        let id = store.record_deployment("Token", record("mainnet")).unwrap();

        let mut rebuilt = sample_artifact("Token");
        rebuilt.bytecode = "60ff".to_string();
        store.save(&mut rebuilt).unwrap();

        assert_eq!(rebuilt.networks.len(), 1);
        let loaded = store.load("Token").unwrap();
        assert_eq!(loaded.bytecode, "60ff");
        assert_eq!(loaded.networks[&id].network, "mainnet");
    }

    #[test]
    fn record_deployment_ids_increase() {
        let (_dir, store) = make_store();
        store.save(&mut sample_artifact("Token")).unwrap();

        let first = store.record_deployment("Token", record("testnet")).unwrap();
        let second = store.record_deployment("Token", record("testnet")).unwrap();
        assert!(second > first);

        let loaded = store.load("Token").unwrap();
        assert_eq!(loaded.networks.len(), 2);
        assert!(loaded.networks.contains_key(&first));
        assert!(loaded.networks.contains_key(&second));
    }

    #[test]
    fn record_deployment_without_artifact_errors() {
        let (_dir, store) = make_store();
        let err = store.record_deployment("Ghost", record("testnet")).unwrap_err();
        assert!(matches!(err, CacheError::MissingArtifact { ref name } if name == "Ghost"));
    }

    #[test]
    fn prune_removes_only_non_persistent_inactive() {
        let (_dir, store) = make_store();
        store.save(&mut sample_artifact("Token")).unwrap();
        store.record_deployment("Token", record("testnet")).unwrap();
        store.record_deployment("Token", record("mainnet")).unwrap();
        let persistent = |n: &str| n == "mainnet";

        assert_eq!(store.prune_networks(Some("testnet"), persistent).unwrap(), 0);
        assert_eq!(store.load("Token").unwrap().networks.len(), 2);

        assert_eq!(store.prune_networks(Some("other"), persistent).unwrap(), 1);
        let networks: Vec<_> = store
            .load("Token")
            .unwrap()
            .networks
            .values()
            .map(|r| r.network.clone())
            .collect();
        assert_eq!(networks, vec!["mainnet"]);
    }

    #[test]
    fn prune_without_changes_does_not_rewrite() {
        let (_dir, store) = make_store();
        store.save(&mut sample_artifact("Token")).unwrap();
        store.record_deployment("Token", record("mainnet")).unwrap();
        let path = store.artifact_path("Token");
        let before = std::fs::read(&path).unwrap();

        // Replace the file content with an equivalent but differently formatted record;
        // an unchanged network map must leave it untouched.
        let compact = serde_json::to_vec(&store.load("Token").unwrap()).unwrap();
        std::fs::write(&path, &compact).unwrap();
        assert_eq!(store.prune_networks(None, |n| n == "mainnet").unwrap(), 0);
        assert_eq!(std::fs::read(&path).unwrap(), compact);
        assert_ne!(before, compact);
    }

    #[test]
    fn prune_skips_unreadable_artifacts() {
        let (_dir, store) = make_store();
        store.save(&mut sample_artifact("Token")).unwrap();
        std::fs::write(store.artifact_path("Broken"), "garbage").unwrap();
        assert_eq!(store.prune_networks(None, |_| false).unwrap(), 0);
    }

    #[test]
    fn names_lists_json_files_sorted() {
        let (_dir, store) = make_store();
        assert!(store.names().unwrap().is_empty());
        store.save(&mut sample_artifact("Zeta")).unwrap();
        store.save(&mut sample_artifact("Alpha")).unwrap();
        std::fs::write(store.dir().join("README.md"), "").unwrap();
        assert_eq!(store.names().unwrap(), vec!["Alpha", "Zeta"]);
    }

    #[test]
    fn overwrite_is_byte_identical_for_same_artifact() {
        let (_dir, store) = make_store();
        store.save(&mut sample_artifact("Token")).unwrap();
        let first = std::fs::read(store.artifact_path("Token")).unwrap();
        store.save(&mut sample_artifact("Token")).unwrap();
        let second = std::fs::read(store.artifact_path("Token")).unwrap();
        assert_eq!(first, second);
    }
}
