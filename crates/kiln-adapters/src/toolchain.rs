//! Host toolchain probe: asks the installed `go` binary for its version.

use std::ffi::OsString;
use std::process::Command;

use tracing::debug;

use kiln_core::application::{ToolchainError, ports::ToolchainProbe};

/// Runs `<program> version` and extracts the release, e.g. `1.22.4` from
/// `go version go1.22.4 linux/amd64`.
#[derive(Debug, Clone)]
pub struct GoToolchainProbe {
    program: OsString,
}

impl GoToolchainProbe {
    pub fn new() -> Self {
        Self::with_program("go")
    }

    pub fn with_program(program: impl Into<OsString>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl Default for GoToolchainProbe {
    fn default() -> Self {
        Self::new()
    }
}

impl ToolchainProbe for GoToolchainProbe {
    fn detect(&self) -> Result<String, ToolchainError> {
        let program = self.program.to_string_lossy();
        let output = Command::new(&self.program)
            .arg("version")
            .output()
            .map_err(|e| ToolchainError::new(format!("cannot run '{program} version': {e}")))?;

        if !output.status.success() {
            return Err(ToolchainError::new(format!(
                "'{program} version' exited with {}",
                output.status
            )));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        debug!(output = %stdout.trim(), "toolchain probe output");
        parse_version_output(&stdout).ok_or_else(|| {
            ToolchainError::new(format!("unrecognised output from '{program} version': {}", stdout.trim()))
        })
    }
}

/// Pull the `goX.Y[.Z]` token out of `go version` output.
pub fn parse_version_output(output: &str) -> Option<String> {
    output
        .split_whitespace()
        .filter_map(|token| token.strip_prefix("go"))
        .find(|rest| rest.starts_with(|c: char| c.is_ascii_digit()))
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_release_output() {
        assert_eq!(
            parse_version_output("go version go1.22.4 linux/amd64\n").as_deref(),
            Some("1.22.4")
        );
        assert_eq!(
            parse_version_output("go version go1.23 darwin/arm64").as_deref(),
            Some("1.23")
        );
    }

    #[test]
    fn devel_builds_are_unrecognised() {
        assert_eq!(parse_version_output("go version devel +abc123 linux/amd64"), None);
        assert_eq!(parse_version_output(""), None);
    }

    #[test]
    fn missing_binary_is_an_error() {
        let probe = GoToolchainProbe::with_program("kiln-test-no-such-go-binary");
        let err = probe.detect().unwrap_err();
        assert!(err.message.contains("kiln-test-no-such-go-binary"));
    }
}
