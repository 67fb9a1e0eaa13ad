//! Blueprint entity: a parameterized file tree plus the axis tuple(s) it
//! serves.
//!
//! Blueprints are built once at load time, validated by
//! [`BlueprintBuilder::build`], and shared read-only afterwards.

use std::collections::{BTreeMap, HashSet};
use std::fmt;

use serde::Serialize;

use crate::domain::{
    error::{BlueprintError, ValidationError},
    value_objects::{Architecture, Axis, Framework, ProjectKind},
};

// ── Key ──────────────────────────────────────────────────────────────────────

/// Exact-match registry key. `framework: None` means "no framework".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BlueprintKey {
    pub kind: ProjectKind,
    pub architecture: Architecture,
    pub framework: Option<Framework>,
}

impl fmt::Display for BlueprintKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{}/{}",
            self.kind,
            self.architecture,
            self.framework.map_or("none", |fw| fw.as_str())
        )
    }
}

// ── Parts ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BlueprintMetadata {
    pub name: String,
    pub description: String,
    pub tags: Vec<String>,
}

/// A variable the blueprint's templates expect.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct VariableSpec {
    pub name: String,
    pub description: String,
    pub required: bool,
    pub default: Option<String>,
    /// Empty means any value is accepted.
    pub allowed: Vec<String>,
}

/// How a file's bytes are produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileContent {
    /// Copied byte-for-byte.
    Literal(Vec<u8>),
    /// Rendered through the template engine.
    Template(String),
}

/// One entry of the blueprint's file tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileSpec {
    /// Relative output path; may itself contain template expressions.
    pub path: String,
    pub content: FileContent,
    /// Inclusion predicate. `None` means always included.
    pub when: Option<String>,
    pub executable: bool,
}

impl FileSpec {
    pub fn template(path: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            content: FileContent::Template(source.into()),
            when: None,
            executable: false,
        }
    }

    pub fn literal(path: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            path: path.into(),
            content: FileContent::Literal(bytes.into()),
            when: None,
            executable: false,
        }
    }

    pub fn when(mut self, predicate: impl Into<String>) -> Self {
        self.when = Some(predicate.into());
        self
    }

    pub fn executable(mut self, executable: bool) -> Self {
        self.executable = executable;
        self
    }
}

// ── Blueprint ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Blueprint {
    pub id: String,
    pub version: String,
    pub kind: ProjectKind,
    pub architecture: Architecture,
    /// Frameworks served; `None` entries serve framework-less requests.
    pub frameworks: Vec<Option<Framework>>,
    pub metadata: BlueprintMetadata,
    pub variables: Vec<VariableSpec>,
    pub files: Vec<FileSpec>,
}

impl Blueprint {
    pub fn builder(id: impl Into<String>, version: impl Into<String>) -> BlueprintBuilder {
        BlueprintBuilder::new(id, version)
    }

    /// `id@version`, used in logs and results.
    pub fn label(&self) -> String {
        format!("{}@{}", self.id, self.version)
    }

    /// Every registry key this blueprint is indexed under.
    pub fn keys(&self) -> impl Iterator<Item = BlueprintKey> + '_ {
        self.frameworks.iter().map(|framework| BlueprintKey {
            kind: self.kind,
            architecture: self.architecture,
            framework: *framework,
        })
    }

    pub fn variable(&self, name: &str) -> Option<&VariableSpec> {
        self.variables.iter().find(|v| v.name == name)
    }

    /// Check caller-supplied values against the declared variables.
    ///
    /// A required variable must end up with a non-empty value (caller value
    /// or default); a variable with an `allowed` list must take one of them.
    pub fn validate_variables(
        &self,
        values: &BTreeMap<String, String>,
    ) -> Result<(), ValidationError> {
        for spec in &self.variables {
            let value = values
                .get(&spec.name)
                .filter(|v| !v.trim().is_empty())
                .or(spec.default.as_ref());

            match value {
                None if spec.required => {
                    return Err(ValidationError::MissingVariable {
                        name: spec.name.clone(),
                    });
                }
                Some(v) if !spec.allowed.is_empty() && !spec.allowed.contains(v) => {
                    return Err(ValidationError::DisallowedVariableValue {
                        name: spec.name.clone(),
                        value: v.clone(),
                        allowed: spec.allowed.clone(),
                    });
                }
                _ => {}
            }
        }
        Ok(())
    }
}

// ── Builder ──────────────────────────────────────────────────────────────────

#[derive(Debug)]
pub struct BlueprintBuilder {
    id: String,
    version: String,
    kind: Option<ProjectKind>,
    architecture: Option<Architecture>,
    frameworks: Vec<Option<Framework>>,
    metadata: BlueprintMetadata,
    variables: Vec<VariableSpec>,
    files: Vec<FileSpec>,
}

impl BlueprintBuilder {
    fn new(id: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            version: version.into(),
            kind: None,
            architecture: None,
            frameworks: Vec::new(),
            metadata: BlueprintMetadata::default(),
            variables: Vec::new(),
            files: Vec::new(),
        }
    }

    pub fn kind(mut self, kind: ProjectKind) -> Self {
        self.kind = Some(kind);
        self
    }

    pub fn architecture(mut self, architecture: Architecture) -> Self {
        self.architecture = Some(architecture);
        self
    }

    /// Add a served framework; `None` serves framework-less requests.
    pub fn framework(mut self, framework: Option<Framework>) -> Self {
        if !self.frameworks.contains(&framework) {
            self.frameworks.push(framework);
        }
        self
    }

    pub fn metadata(mut self, metadata: BlueprintMetadata) -> Self {
        self.metadata = metadata;
        self
    }

    pub fn variable(mut self, variable: VariableSpec) -> Self {
        self.variables.push(variable);
        self
    }

    pub fn file(mut self, file: FileSpec) -> Self {
        self.files.push(file);
        self
    }

    pub fn build(self) -> Result<Blueprint, BlueprintError> {
        let label = if self.id.is_empty() {
            "<unnamed>".to_string()
        } else {
            self.id.clone()
        };
        let invalid = |reason: &str| BlueprintError::invalid(label.clone(), reason);

        if self.id.trim().is_empty() {
            return Err(invalid("id is empty"));
        }
        let kind = self.kind.ok_or_else(|| invalid("kind is not set"))?;
        let architecture = self
            .architecture
            .ok_or_else(|| invalid("architecture is not set"))?;
        if self.files.is_empty() {
            return Err(invalid("blueprint has no files"));
        }

        let mut seen = HashSet::new();
        for file in &self.files {
            if !seen.insert(file.path.as_str()) {
                return Err(invalid(&format!("file '{}' is declared twice", file.path)));
            }
        }

        let mut names = HashSet::new();
        for var in &self.variables {
            if var.name.trim().is_empty() {
                return Err(invalid("variable with an empty name"));
            }
            if !names.insert(var.name.as_str()) {
                return Err(invalid(&format!("variable '{}' is declared twice", var.name)));
            }
            if let Some(default) = &var.default {
                if !var.allowed.is_empty() && !var.allowed.contains(default) {
                    return Err(invalid(&format!(
                        "default '{default}' of variable '{}' is not in its allowed values",
                        var.name
                    )));
                }
            }
        }

        let mut frameworks = self.frameworks;
        if frameworks.is_empty() {
            frameworks.push(None);
        }

        Ok(Blueprint {
            id: self.id,
            version: self.version,
            kind,
            architecture,
            frameworks,
            metadata: self.metadata,
            variables: self.variables,
            files: self.files,
        })
    }
}
