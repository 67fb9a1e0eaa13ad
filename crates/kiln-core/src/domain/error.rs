// ============================================================================
// domain/error.rs - request and blueprint errors
// ============================================================================

use std::fmt;
use thiserror::Error;

/// A request that cannot be generated as written.
///
/// All variants mean "change the request"; none of them are retryable.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    // ========================================================================
    // Required fields, reported in this order
    // ========================================================================
    #[error("project name is required")]
    MissingName,

    #[error("module path is required")]
    MissingModulePath,

    #[error("project kind is required")]
    MissingKind,

    // ========================================================================
    // Toolchain
    // ========================================================================
    #[error("invalid toolchain version '{value}': {reason}")]
    InvalidToolchainVersion { value: String, reason: String },

    #[error("could not detect the host toolchain version: {reason}")]
    ToolchainDetection { reason: String },

    // ========================================================================
    // Closed value sets
    // ========================================================================
    #[error("unsupported {field} '{value}' (expected one of: {})", .allowed.join(", "))]
    UnsupportedValue {
        field: &'static str,
        value: String,
        allowed: Vec<&'static str>,
    },

    // ========================================================================
    // Blueprint-declared variables
    // ========================================================================
    #[error("blueprint variable '{name}' is required but has no value")]
    MissingVariable { name: String },

    #[error("value '{value}' is not allowed for variable '{name}' (expected one of: {})", .allowed.join(", "))]
    DisallowedVariableValue {
        name: String,
        value: String,
        allowed: Vec<String>,
    },

    #[error("invalid variable assignment '{input}': expected KEY=VALUE")]
    MalformedVariable { input: String },
}

impl ValidationError {
    /// Get user-actionable suggestions for fixing this error.
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::MissingName => vec![
                "Pass a project name: kiln new <NAME>".into(),
            ],
            Self::MissingModulePath => vec![
                "Pass a module path with --module, e.g. --module github.com/acme/orders".into(),
            ],
            Self::MissingKind => vec![
                "Pass a project kind with --kind (web-api, cli, library, worker)".into(),
                "Try: kiln list to see which kinds have blueprints".into(),
            ],
            Self::InvalidToolchainVersion { .. } => vec![
                "Use a version between 1.20 and 1.25, e.g. --go-version 1.22".into(),
                "Or pass --go-version auto to use the installed toolchain".into(),
            ],
            Self::ToolchainDetection { .. } => vec![
                "Ensure `go` is installed and on your PATH".into(),
                "Or pass an explicit version, e.g. --go-version 1.22".into(),
            ],
            Self::UnsupportedValue { field, allowed, .. } => vec![
                format!("Supported {field} values: {}", allowed.join(", ")),
            ],
            Self::MissingVariable { name } => vec![
                format!("Provide a value with --var {name}=<value>"),
            ],
            Self::DisallowedVariableValue { name, allowed, .. } => vec![
                format!("Allowed values for {name}: {}", allowed.join(", ")),
            ],
            Self::MalformedVariable { .. } => vec![
                "Variables are passed as --var KEY=VALUE".into(),
            ],
        }
    }
}

/// The blueprint axis a failed lookup stopped on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LookupAxis {
    Kind,
    Architecture,
    Framework,
}

impl LookupAxis {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Kind => "kind",
            Self::Architecture => "architecture",
            Self::Framework => "framework",
        }
    }
}

impl fmt::Display for LookupAxis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// No registered blueprint serves the requested axis combination.
///
/// `axis` is the first axis (in kind → architecture → framework order) at
/// which the search came up empty; `available` lists the values of that
/// axis which would have matched given the axes before it.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("no blueprint matches {axis} '{value}'{}", available_hint(.available))]
pub struct BlueprintNotFound {
    pub axis: LookupAxis,
    pub value: String,
    pub available: Vec<String>,
}

fn available_hint(available: &[String]) -> String {
    if available.is_empty() {
        String::new()
    } else {
        format!(" (available: {})", available.join(", "))
    }
}

impl BlueprintNotFound {
    pub fn suggestions(&self) -> Vec<String> {
        let mut out = vec![format!(
            "No blueprint is registered for {} '{}'",
            self.axis, self.value
        )];
        if !self.available.is_empty() {
            out.push(format!(
                "Choose a {} from: {}",
                self.axis,
                self.available.join(", ")
            ));
        }
        out.push("Try: kiln list".into());
        out
    }
}

/// A blueprint definition that cannot be loaded into the registry.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BlueprintError {
    #[error("invalid blueprint '{blueprint}': {reason}")]
    Invalid { blueprint: String, reason: String },

    #[error("blueprints '{first}' and '{second}' both claim {key}")]
    DuplicateKey {
        key: String,
        first: String,
        second: String,
    },

    #[error("blueprint source unavailable at {path}: {reason}")]
    Source { path: String, reason: String },
}

impl BlueprintError {
    pub fn invalid(blueprint: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Invalid {
            blueprint: blueprint.into(),
            reason: reason.into(),
        }
    }

    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::Invalid { blueprint, .. } => vec![
                format!("Fix the manifest of blueprint '{blueprint}'"),
            ],
            Self::DuplicateKey { first, second, .. } => vec![
                format!("Remove one of '{first}' or '{second}', or narrow its frameworks"),
            ],
            Self::Source { .. } => vec![
                "Point --blueprints or KILN_BLUEPRINTS_DIR at a blueprint directory".into(),
            ],
        }
    }
}
