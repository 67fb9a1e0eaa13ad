//! Field-level validation rules shared by the resolver and the loaders.

use std::fmt;

use crate::domain::error::ValidationError;

/// Sentinel asking the resolver to use the host toolchain's version.
pub const AUTO_TOOLCHAIN: &str = "auto";

/// Oldest toolchain release generated projects may target.
pub const MIN_TOOLCHAIN: ToolchainVersion = ToolchainVersion::new(1, 20);

/// Newest toolchain release generated projects may target.
pub const MAX_TOOLCHAIN: ToolchainVersion = ToolchainVersion::new(1, 25);

/// The trimmed value if it counts as explicitly supplied.
///
/// Empty and whitespace-only strings are never explicit.
pub fn explicit(value: &str) -> Option<&str> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then_some(trimmed)
}

/// A `major.minor[.patch]` toolchain release.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ToolchainVersion {
    pub major: u32,
    pub minor: u32,
    pub patch: Option<u32>,
}

impl ToolchainVersion {
    pub const fn new(major: u32, minor: u32) -> Self {
        Self {
            major,
            minor,
            patch: None,
        }
    }

    /// Parse `1.22`, `1.22.3` or `go1.22.3`.
    pub fn parse(raw: &str) -> Result<Self, ValidationError> {
        let invalid = |reason: &str| ValidationError::InvalidToolchainVersion {
            value: raw.trim().to_string(),
            reason: reason.to_string(),
        };

        let trimmed = raw.trim();
        let digits = trimmed.strip_prefix("go").unwrap_or(trimmed);
        let parts: Vec<&str> = digits.split('.').collect();
        if !(2..=3).contains(&parts.len()) {
            return Err(invalid("expected major.minor or major.minor.patch"));
        }

        let number = |s: &str| -> Result<u32, ValidationError> {
            if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
                return Err(invalid("components must be numeric"));
            }
            s.parse::<u32>().map_err(|_| invalid("component out of range"))
        };

        Ok(Self {
            major: number(parts[0])?,
            minor: number(parts[1])?,
            patch: parts.get(2).map(|p| number(*p)).transpose()?,
        })
    }

    /// Parse and check against the supported window.
    pub fn parse_supported(raw: &str) -> Result<Self, ValidationError> {
        let version = Self::parse(raw)?;
        version.ensure_supported()?;
        Ok(version)
    }

    pub fn ensure_supported(&self) -> Result<(), ValidationError> {
        let release = (self.major, self.minor);
        if release < (MIN_TOOLCHAIN.major, MIN_TOOLCHAIN.minor) {
            return Err(ValidationError::InvalidToolchainVersion {
                value: self.to_string(),
                reason: format!("below the supported floor {MIN_TOOLCHAIN}"),
            });
        }
        if release > (MAX_TOOLCHAIN.major, MAX_TOOLCHAIN.minor) {
            return Err(ValidationError::InvalidToolchainVersion {
                value: self.to_string(),
                reason: format!("newer than the latest supported release {MAX_TOOLCHAIN}"),
            });
        }
        Ok(())
    }

    /// The `major.minor` form used in generated manifests.
    pub fn release(&self) -> String {
        format!("{}.{}", self.major, self.minor)
    }
}

impl fmt::Display for ToolchainVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.patch {
            Some(patch) => write!(f, "{}.{}.{}", self.major, self.minor, patch),
            None => write!(f, "{}.{}", self.major, self.minor),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_ignores_whitespace() {
        assert_eq!(explicit("  gin "), Some("gin"));
        assert_eq!(explicit("   "), None);
        assert_eq!(explicit(""), None);
    }

    #[test]
    fn parses_release_and_patch_forms() {
        assert_eq!(ToolchainVersion::parse("1.22").unwrap(), ToolchainVersion::new(1, 22));
        let v = ToolchainVersion::parse("go1.23.4").unwrap();
        assert_eq!((v.major, v.minor, v.patch), (1, 23, Some(4)));
        assert_eq!(v.to_string(), "1.23.4");
        assert_eq!(v.release(), "1.23");
    }

    #[test]
    fn rejects_malformed_versions() {
        for raw in ["1", "1.x", "1.22.3.4", "v1.22", "1..2", "latest"] {
            assert!(
                matches!(
                    ToolchainVersion::parse(raw),
                    Err(ValidationError::InvalidToolchainVersion { .. })
                ),
                "{raw} should be rejected"
            );
        }
    }

    #[test]
    fn enforces_supported_window() {
        assert!(ToolchainVersion::parse_supported("1.20").is_ok());
        assert!(ToolchainVersion::parse_supported("1.25.1").is_ok());

        let err = ToolchainVersion::parse_supported("1.10").unwrap_err();
        assert!(err.to_string().contains("invalid toolchain version"));
        assert!(err.to_string().contains("floor 1.20"));

        assert!(ToolchainVersion::parse_supported("2.0").is_err());
    }
}
