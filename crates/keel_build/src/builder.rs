//! Turns backend output for one file into persisted artifact records.

use keel_cache::{Artifact, CompilerFingerprint};
use keel_source::SourceFile;
use serde_json::Value;

use crate::backend::CompilerOutput;
use crate::error::BuildError;
use crate::index::Declaration;
use crate::link::rewrite_link_placeholders;

/// Builds one artifact per declaration of `file` from its compiler output.
///
/// Every artifact is built before any is returned, so a missing declaration
/// or bad link reference leaves nothing half-written. Network maps start
/// empty; history is merged by the store on save.
pub fn build_artifacts<'d>(
    file: &SourceFile,
    declarations: impl IntoIterator<Item = &'d Declaration>,
    output: &CompilerOutput,
    fingerprint: &CompilerFingerprint,
) -> Result<Vec<Artifact>, BuildError> {
    let unit = file.unit_name();
    let ast = output
        .sources
        .get(&unit)
        .map(|s| s.ast.clone())
        .unwrap_or(Value::Null);

    declarations
        .into_iter()
        .map(|decl| {
            let contract = output
                .contract(&unit, &decl.name)
                .ok_or_else(|| BuildError::MissingOutput {
                    file: file.path.clone(),
                    name: decl.name.clone(),
                })?;
            let creation = &contract.evm.bytecode;
            let deployed = &contract.evm.deployed_bytecode;

            Ok(Artifact {
                abi: contract.abi.clone(),
                ast: ast.clone(),
                bytecode: rewrite_link_placeholders(
                    &decl.name,
                    &creation.object,
                    &creation.link_references,
                )?,
                compiler: fingerprint.clone(),
                contract_name: decl.name.clone(),
                deployed_bytecode: rewrite_link_placeholders(
                    &decl.name,
                    &deployed.object,
                    &deployed.link_references,
                )?,
                deployed_source_map: deployed.source_map.clone(),
                networks: Default::default(),
                source_hash: file.content_hash,
                source: file.content.clone(),
                source_map: creation.source_map.clone(),
                source_path: unit.clone(),
                kind: decl.kind,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::ProjectIndex;
    use crate::link::placeholder_library;
    use keel_common::DeclarationKind;
    use keel_source::{FileId, SourceDb};
    use serde_json::json;

    const SOURCE: &str = "library Math {\n}\n\ncontract Token {\n}\n";

    fn setup() -> (SourceDb, ProjectIndex) {
        let mut db = SourceDb::new();
        db.add_source("contracts/Token.sol", SOURCE.to_string());
        let index = ProjectIndex::build(&db).unwrap();
        (db, index)
    }

    fn output(token_object: &str) -> CompilerOutput {
        serde_json::from_value(json!({
            "contracts": {
                "contracts/Token.sol": {
                    "Math": {
                        "abi": [],
                        "evm": {
                            "bytecode": {"object": "73", "sourceMap": "0:1:0"},
                            "deployedBytecode": {"object": "7300", "sourceMap": "0:2:0"}
                        }
                    },
                    "Token": {
                        "abi": [{"type": "constructor", "inputs": []}],
                        "evm": {
                            "bytecode": {
                                "object": token_object,
                                "sourceMap": "5:6:0",
                                "linkReferences": {
                                    "contracts/Token.sol": {"Math": [{"start": 1, "length": 20}]}
                                }
                            },
                            "deployedBytecode": {"object": "6060", "sourceMap": "7:8:0"}
                        }
                    }
                }
            },
            "sources": {"contracts/Token.sol": {"ast": {"nodeType": "SourceUnit"}}}
        }))
        .unwrap()
    }

    #[test]
    fn builds_every_declaration_of_the_file() {
        let (db, index) = setup();
        let file = db.get_file(FileId::from_raw(0));
        let object = format!("60{}00", "_".repeat(40));
        let fingerprint = CompilerFingerprint::new("0.4.24", true, 200);

        let artifacts =
            build_artifacts(file, index.in_file(file.id), &output(&object), &fingerprint).unwrap();
        assert_eq!(artifacts.len(), 2);

        let math = &artifacts[0];
        assert_eq!(math.contract_name, "Math");
        assert_eq!(math.kind, DeclarationKind::Library);

        let token = &artifacts[1];
        assert_eq!(token.contract_name, "Token");
        assert_eq!(token.kind, DeclarationKind::Contract);
        assert_eq!(token.bytecode.len(), object.len());
        assert_eq!(placeholder_library(&token.bytecode[2..42]), Some("Math"));
        assert_eq!(token.deployed_bytecode, "6060");
        assert_eq!(token.source_map, "5:6:0");
        assert_eq!(token.deployed_source_map, "7:8:0");
        assert_eq!(token.ast["nodeType"], "SourceUnit");
        assert_eq!(token.source, SOURCE);
        assert_eq!(token.source_hash, file.content_hash);
        assert_eq!(token.source_path, "contracts/Token.sol");
        assert_eq!(token.compiler, fingerprint);
        assert!(token.networks.is_empty());
    }

    #[test]
    fn missing_declaration_output_is_an_error() {
        let (db, index) = setup();
        let file = db.get_file(FileId::from_raw(0));
        let mut out = output(&"0".repeat(44));
        out.contracts
            .get_mut("contracts/Token.sol")
            .unwrap()
            .remove("Token");

        let err = build_artifacts(
            file,
            index.in_file(file.id),
            &out,
            &CompilerFingerprint::new("0.4.24", true, 200),
        )
        .unwrap_err();
        assert!(matches!(err, BuildError::MissingOutput { ref name, .. } if name == "Token"));
    }

    #[test]
    fn short_bytecode_rejects_link_reference() {
        let (db, index) = setup();
        let file = db.get_file(FileId::from_raw(0));
        let err = build_artifacts(
            file,
            index.in_file(file.id),
            &output("6080"),
            &CompilerFingerprint::new("0.4.24", true, 200),
        )
        .unwrap_err();
        assert!(matches!(err, BuildError::InvalidLinkReference { .. }));
    }
}
