//! The compiler backend contract.
//!
//! Requests and responses follow the standard-JSON compiler interface: one
//! request holds a set of named source units plus output selection and
//! optimizer settings, and the response carries per-unit, per-declaration
//! output together with a flat list of messages.

use std::collections::BTreeMap;

use keel_diagnostics::Severity;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Source language identifier sent with every request.
pub const LANGUAGE: &str = "Solidity";

/// An external compiler that turns source units into bytecode.
pub trait CompilerBackend {
    /// Reports the compiler version, e.g. `0.4.24+commit.e67f0147`.
    fn version(&self) -> Result<String, BackendError>;

    /// Compiles one request.
    ///
    /// Compilation errors in the sources are not an `Err`; they are reported
    /// through [`CompilerOutput::errors`]. `Err` means the backend itself
    /// could not be used.
    fn compile(&self, input: &CompilerInput) -> Result<CompilerOutput, BackendError>;
}

/// Failure to invoke the backend or to understand its answer.
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    /// The compiler program could not be started.
    #[error("failed to run '{program}': {source}")]
    Spawn {
        /// The program that was invoked.
        program: String,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// Writing the request or reading the response failed.
    #[error("i/o error while talking to '{program}': {source}")]
    Io {
        /// The program that was invoked.
        program: String,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// The compiler exited unsuccessfully without a usable response.
    #[error("'{program}' exited with {status}: {stderr}")]
    Exited {
        /// The program that was invoked.
        program: String,
        /// Exit status description.
        status: String,
        /// Captured standard error, trimmed.
        stderr: String,
    },

    /// The response could not be parsed.
    #[error("unexpected output from '{program}': {reason}")]
    Protocol {
        /// The program that was invoked.
        program: String,
        /// What was wrong with the output.
        reason: String,
    },
}

/// A standard-JSON compilation request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompilerInput {
    /// Always [`LANGUAGE`].
    pub language: String,
    /// Source units keyed by unit name.
    pub sources: BTreeMap<String, SourceInput>,
    /// Output selection and optimizer settings.
    pub settings: InputSettings,
}

/// The text of one source unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceInput {
    /// Full source text.
    pub content: String,
}

/// Settings of a compilation request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InputSettings {
    /// Requested outputs: unit name, then declaration name, then output names.
    pub output_selection: BTreeMap<String, BTreeMap<String, Vec<String>>>,
    /// Optimizer configuration.
    pub optimizer: OptimizerSettings,
}

/// Optimizer configuration of a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptimizerSettings {
    /// Whether the optimizer runs.
    pub enabled: bool,
    /// Expected number of contract runs the optimizer tunes for.
    pub runs: u32,
}

impl CompilerInput {
    /// Builds the request for a single source unit, selecting every output
    /// the artifact builder needs.
    pub fn for_file(unit_name: &str, content: &str, optimize: bool, runs: u32) -> Self {
        let mut sources = BTreeMap::new();
        sources.insert(
            unit_name.to_string(),
            SourceInput {
                content: content.to_string(),
            },
        );

        let per_file: BTreeMap<String, Vec<String>> = [
            (
                "*".to_string(),
                vec![
                    "abi".to_string(),
                    "evm.bytecode".to_string(),
                    "evm.deployedBytecode".to_string(),
                ],
            ),
            (String::new(), vec!["ast".to_string()]),
        ]
        .into_iter()
        .collect();
        let mut output_selection = BTreeMap::new();
        output_selection.insert("*".to_string(), per_file);

        Self {
            language: LANGUAGE.to_string(),
            sources,
            settings: InputSettings {
                output_selection,
                optimizer: OptimizerSettings {
                    enabled: optimize,
                    runs,
                },
            },
        }
    }
}

/// A standard-JSON compilation response. Missing sections default to empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompilerOutput {
    /// Declaration output keyed by unit name, then declaration name.
    #[serde(default)]
    pub contracts: BTreeMap<String, BTreeMap<String, ContractOutput>>,
    /// Per-unit output keyed by unit name.
    #[serde(default)]
    pub sources: BTreeMap<String, SourceOutput>,
    /// Errors, warnings and informational messages.
    #[serde(default)]
    pub errors: Vec<BackendMessage>,
}

impl CompilerOutput {
    /// Whether any message has error severity.
    pub fn has_errors(&self) -> bool {
        self.errors.iter().any(BackendMessage::is_error)
    }

    /// Looks up the output of one declaration.
    pub fn contract(&self, unit_name: &str, name: &str) -> Option<&ContractOutput> {
        self.contracts.get(unit_name)?.get(name)
    }
}

/// Per-unit output.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SourceOutput {
    /// Syntax tree of the unit.
    #[serde(default)]
    pub ast: Value,
}

/// Output for one declaration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContractOutput {
    /// Interface description.
    #[serde(default)]
    pub abi: Value,
    /// Execution-unit output.
    #[serde(default)]
    pub evm: EvmOutput,
}

/// Bytecode output for one declaration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvmOutput {
    /// Creation bytecode.
    #[serde(default)]
    pub bytecode: BytecodeOutput,
    /// Runtime bytecode.
    #[serde(default)]
    pub deployed_bytecode: BytecodeOutput,
}

/// A bytecode object with its source map and unresolved library references.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BytecodeOutput {
    /// Hex-encoded bytecode, possibly holding link placeholders.
    #[serde(default)]
    pub object: String,
    /// Source map.
    #[serde(default)]
    pub source_map: String,
    /// Link references keyed by library unit name, then library name.
    #[serde(default)]
    pub link_references: BTreeMap<String, BTreeMap<String, Vec<LinkReference>>>,
}

/// Location of an unresolved library address inside a bytecode object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkReference {
    /// Byte offset of the address.
    pub start: usize,
    /// Byte length of the address.
    pub length: usize,
}

/// One message reported by the backend.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackendMessage {
    /// Backend severity string (`error`, `warning` or `info`).
    #[serde(default)]
    pub severity: String,
    /// Short message.
    #[serde(default)]
    pub message: String,
    /// Fully formatted message including source excerpt.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub formatted_message: Option<String>,
}

impl BackendMessage {
    /// Maps the backend severity string.
    pub fn severity(&self) -> Severity {
        Severity::from_backend(&self.severity)
    }

    /// Whether this message reports an error.
    pub fn is_error(&self) -> bool {
        self.severity().is_error()
    }

    /// The formatted message when present, else the short message.
    pub fn text(&self) -> &str {
        self.formatted_message.as_deref().unwrap_or(&self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn input_has_standard_json_shape() {
        let input = CompilerInput::for_file("contracts/Token.sol", "contract Token {}", true, 200);
        let value = serde_json::to_value(&input).unwrap();
        assert_eq!(
            value,
            json!({
                "language": "Solidity",
                "sources": {"contracts/Token.sol": {"content": "contract Token {}"}},
                "settings": {
                    "outputSelection": {
                        "*": {
                            "": ["ast"],
                            "*": ["abi", "evm.bytecode", "evm.deployedBytecode"]
                        }
                    },
                    "optimizer": {"enabled": true, "runs": 200}
                }
            })
        );
    }

    #[test]
    fn output_sections_default_to_empty() {
        let output: CompilerOutput = serde_json::from_str("{}").unwrap();
        assert!(output.contracts.is_empty());
        assert!(output.sources.is_empty());
        assert!(!output.has_errors());
    }

    #[test]
    fn output_parses_nested_bytecode() {
        let output: CompilerOutput = serde_json::from_value(json!({
            "contracts": {
                "contracts/Token.sol": {
                    "Token": {
                        "abi": [],
                        "evm": {
                            "bytecode": {
                                "object": "6080",
                                "sourceMap": "1:2:0",
                                "linkReferences": {
                                    "contracts/Math.sol": {"Math": [{"start": 1, "length": 20}]}
                                }
                            },
                            "deployedBytecode": {"object": "6060", "sourceMap": "3:4:0"}
                        }
                    }
                }
            },
            "sources": {"contracts/Token.sol": {"id": 0, "ast": {"nodeType": "SourceUnit"}}}
        }))
        .unwrap();

        let token = output.contract("contracts/Token.sol", "Token").unwrap();
        assert_eq!(token.evm.bytecode.object, "6080");
        assert_eq!(token.evm.deployed_bytecode.source_map, "3:4:0");
        assert_eq!(
            token.evm.bytecode.link_references["contracts/Math.sol"]["Math"],
            vec![LinkReference { start: 1, length: 20 }]
        );
        assert!(token.evm.deployed_bytecode.link_references.is_empty());
        assert_eq!(output.sources["contracts/Token.sol"].ast["nodeType"], "SourceUnit");
        assert!(output.contract("contracts/Token.sol", "Other").is_none());
    }

    #[test]
    fn warnings_are_not_errors() {
        let output: CompilerOutput = serde_json::from_value(json!({
            "errors": [
                {"severity": "warning", "message": "unused", "formattedMessage": "A.sol:1:1: Warning: unused"}
            ]
        }))
        .unwrap();
        assert!(!output.has_errors());
        assert_eq!(output.errors[0].text(), "A.sol:1:1: Warning: unused");
    }

    #[test]
    fn error_message_falls_back_to_short_text() {
        let message = BackendMessage {
            severity: "error".to_string(),
            message: "ParserError".to_string(),
            formatted_message: None,
        };
        assert!(message.is_error());
        assert_eq!(message.text(), "ParserError");
    }
}
