//! The persisted record for one compiled declaration.
//!
//! Artifacts are written as JSON with every object's keys in sorted order and
//! four-space indentation, so that unchanged output is byte-identical across
//! builds and diffs of the build directory stay readable.

use std::collections::BTreeMap;

use keel_common::{ContentHash, DeclarationKind, DeploymentId};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::CacheError;
use crate::fingerprint::CompilerFingerprint;

/// Compiled output and metadata for one declaration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Artifact {
    /// Interface description of the declaration.
    pub abi: Value,
    /// Syntax tree of the owning source file.
    pub ast: Value,
    /// Creation bytecode, with library placeholders rewritten to named markers.
    pub bytecode: String,
    /// Compiler identity and settings used to produce this artifact.
    pub compiler: CompilerFingerprint,
    /// The declaration name (also the artifact file stem).
    pub contract_name: String,
    /// Runtime bytecode, with library placeholders rewritten to named markers.
    pub deployed_bytecode: String,
    /// Source map of the runtime bytecode.
    pub deployed_source_map: String,
    /// Deployment history keyed by deployment id.
    #[serde(default)]
    pub networks: BTreeMap<DeploymentId, NetworkRecord>,
    /// Content hash of the owning source file at build time.
    pub source_hash: ContentHash,
    /// Raw text of the owning source file.
    pub source: String,
    /// Source map of the creation bytecode.
    pub source_map: String,
    /// Project-relative path of the owning source file.
    pub source_path: String,
    /// Declaration kind.
    #[serde(rename = "type")]
    pub kind: DeclarationKind,
}

/// One recorded deployment of a declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkRecord {
    /// Address the declaration was deployed at.
    pub address: String,
    /// Name of the network the deployment was made on.
    pub network: String,
    /// Address of the deploying account.
    pub owner: String,
    /// Hash of the deployment transaction.
    pub transaction_hash: String,
}

impl Artifact {
    /// Serializes the artifact to its canonical on-disk form.
    ///
    /// Object keys are sorted at every nesting level (including inside the
    /// backend-provided `abi` and `ast`), indentation is four spaces, and the
    /// output ends with a newline.
    pub fn to_canonical_json(&self) -> Result<Vec<u8>, CacheError> {
        let value = serde_json::to_value(self).map_err(|e| CacheError::Serialization {
            reason: e.to_string(),
        })?;
        let value = canonicalize(value);

        let mut out = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut ser = serde_json::Serializer::with_formatter(&mut out, formatter);
        value
            .serialize(&mut ser)
            .map_err(|e| CacheError::Serialization {
                reason: e.to_string(),
            })?;
        out.push(b'\n');
        Ok(out)
    }

    /// Parses an artifact from its on-disk form.
    pub fn from_json(bytes: &[u8]) -> Result<Self, CacheError> {
        serde_json::from_slice(bytes).map_err(|e| CacheError::Serialization {
            reason: e.to_string(),
        })
    }

    /// Returns the most recent deployment id, if any deployment was recorded.
    pub fn last_deployment(&self) -> Option<DeploymentId> {
        self.networks.keys().next_back().copied()
    }

    /// Adds every deployment from `previous` that this artifact does not already hold.
    ///
    /// Returns `true` if any record was added.
    pub fn merge_networks(&mut self, previous: &BTreeMap<DeploymentId, NetworkRecord>) -> bool {
        let mut changed = false;
        for (id, record) in previous {
            if !self.networks.contains_key(id) {
                self.networks.insert(*id, record.clone());
                changed = true;
            }
        }
        changed
    }
}

/// Rebuilds every object in `value` with its keys inserted in sorted order.
fn canonicalize(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let sorted: BTreeMap<String, Value> = map
                .into_iter()
                .map(|(k, v)| (k, canonicalize(v)))
                .collect();
            Value::Object(sorted.into_iter().collect())
        }
        Value::Array(items) => Value::Array(items.into_iter().map(canonicalize).collect()),
        other => other,
    }
}
