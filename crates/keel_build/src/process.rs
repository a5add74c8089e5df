//! A [`CompilerBackend`] that drives a compiler executable over standard JSON.

use std::io::Write;
use std::process::{Command, Output, Stdio};

use crate::backend::{BackendError, CompilerBackend, CompilerInput, CompilerOutput};

/// Runs `<program> --standard-json` once per compilation request.
#[derive(Debug, Clone)]
pub struct ProcessBackend {
    program: String,
}

impl ProcessBackend {
    /// Creates a backend invoking `program`, looked up on `PATH` if not a path.
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// The invoked program.
    pub fn program(&self) -> &str {
        &self.program
    }

    fn protocol(&self, reason: impl Into<String>) -> BackendError {
        BackendError::Protocol {
            program: self.program.clone(),
            reason: reason.into(),
        }
    }

    fn check_status(&self, output: &Output) -> Result<(), BackendError> {
        if output.status.success() {
            return Ok(());
        }
        Err(BackendError::Exited {
            program: self.program.clone(),
            status: output.status.to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        })
    }
}

impl CompilerBackend for ProcessBackend {
    fn version(&self) -> Result<String, BackendError> {
        let output = Command::new(&self.program)
            .arg("--version")
            .stdin(Stdio::null())
            .output()
            .map_err(|source| BackendError::Spawn {
                program: self.program.clone(),
                source,
            })?;
        self.check_status(&output)?;
        let stdout = String::from_utf8_lossy(&output.stdout);
        parse_version(&stdout).ok_or_else(|| self.protocol("no version line in --version output"))
    }

    fn compile(&self, input: &CompilerInput) -> Result<CompilerOutput, BackendError> {
        let request = serde_json::to_vec(input).map_err(|e| self.protocol(e.to_string()))?;

        let mut child = Command::new(&self.program)
            .arg("--standard-json")
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| BackendError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        let io_err = |source| BackendError::Io {
            program: self.program.clone(),
            source,
        };
        {
            let mut stdin = child
                .stdin
                .take()
                .ok_or_else(|| self.protocol("stdin was not captured"))?;
            stdin.write_all(&request).map_err(io_err)?;
        }
        let output = child.wait_with_output().map_err(io_err)?;

        if output.stdout.iter().all(u8::is_ascii_whitespace) {
            self.check_status(&output)?;
            return Err(self.protocol("empty response"));
        }
        serde_json::from_slice(&output.stdout)
            .map_err(|e| self.protocol(format!("invalid standard-json response: {e}")))
    }
}

/// Extracts the version from `--version` output such as
/// `solc, the solidity compiler commandline interface\nVersion: 0.4.24+commit.e67f0147.Linux.g++`.
fn parse_version(stdout: &str) -> Option<String> {
    stdout
        .lines()
        .find_map(|line| line.trim().strip_prefix("Version:"))
        .map(|rest| rest.trim().to_string())
        .filter(|v| !v.is_empty())
}
