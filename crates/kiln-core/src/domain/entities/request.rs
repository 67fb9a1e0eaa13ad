//! What the caller asks for, and the saved defaults it is merged with.
//!
//! Every scalar on [`ProjectRequest`] is a plain string where an empty (or
//! whitespace-only) value means "not supplied". Nothing here is validated;
//! that happens once, in the configuration resolver.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::domain::value_objects::{
    AuthType, DatabaseDriver, DeploymentTarget, Logger, Orm,
};

// ── Request ──────────────────────────────────────────────────────────────────

/// A declarative description of the project to generate.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectRequest {
    pub name: String,
    pub module_path: String,
    pub kind: String,
    pub architecture: String,
    pub framework: String,
    pub runtime_version: String,
    pub logger: String,
    pub author: String,
    pub email: String,
    pub license: String,
    /// Values for blueprint-declared variables. Keys the blueprint does not
    /// declare are still passed through to templates.
    pub custom_variables: BTreeMap<String, String>,
    pub features: Features,
}

impl ProjectRequest {
    pub fn builder() -> ProjectRequestBuilder {
        ProjectRequestBuilder::default()
    }
}

/// Fluent construction for callers and tests.
#[derive(Debug, Default)]
pub struct ProjectRequestBuilder {
    inner: ProjectRequest,
}

impl ProjectRequestBuilder {
    pub fn name(mut self, v: impl Into<String>) -> Self {
        self.inner.name = v.into();
        self
    }

    pub fn module_path(mut self, v: impl Into<String>) -> Self {
        self.inner.module_path = v.into();
        self
    }

    pub fn kind(mut self, v: impl Into<String>) -> Self {
        self.inner.kind = v.into();
        self
    }

    pub fn architecture(mut self, v: impl Into<String>) -> Self {
        self.inner.architecture = v.into();
        self
    }

    pub fn framework(mut self, v: impl Into<String>) -> Self {
        self.inner.framework = v.into();
        self
    }

    pub fn runtime_version(mut self, v: impl Into<String>) -> Self {
        self.inner.runtime_version = v.into();
        self
    }

    pub fn logger(mut self, v: impl Into<String>) -> Self {
        self.inner.logger = v.into();
        self
    }

    pub fn author(mut self, v: impl Into<String>) -> Self {
        self.inner.author = v.into();
        self
    }

    pub fn email(mut self, v: impl Into<String>) -> Self {
        self.inner.email = v.into();
        self
    }

    pub fn license(mut self, v: impl Into<String>) -> Self {
        self.inner.license = v.into();
        self
    }

    pub fn variable(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.inner.custom_variables.insert(key.into(), value.into());
        self
    }

    pub fn features(mut self, features: Features) -> Self {
        self.inner.features = features;
        self
    }

    pub fn build(self) -> ProjectRequest {
        self.inner
    }
}

// ── Features ─────────────────────────────────────────────────────────────────

/// Optional feature families. Each schema is closed; there is no free-form
/// feature map.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Features {
    pub database: Option<DatabaseFeature>,
    pub authentication: Option<AuthFeature>,
    pub logging: Option<LoggingFeature>,
    pub testing: Option<TestingFeature>,
    pub deployment: Option<DeploymentFeature>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseFeature {
    /// Primary driver. Falls back to the first of `drivers` when unset.
    pub driver: Option<DatabaseDriver>,
    pub drivers: Vec<DatabaseDriver>,
    pub orm: Option<Orm>,
}

impl DatabaseFeature {
    pub fn primary(&self) -> Option<DatabaseDriver> {
        self.driver.or_else(|| self.drivers.first().copied())
    }

    /// All distinct drivers, primary first.
    pub fn all_drivers(&self) -> Vec<DatabaseDriver> {
        let mut out: Vec<DatabaseDriver> = self.driver.into_iter().collect();
        for d in &self.drivers {
            if !out.contains(d) {
                out.push(*d);
            }
        }
        out
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthFeature {
    #[serde(rename = "type")]
    pub kind: AuthType,
    #[serde(default)]
    pub providers: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingFeature {
    /// Library choice; the request's `logger` field wins when both are set.
    #[serde(rename = "type")]
    pub kind: Option<Logger>,
    pub level: String,
    pub format: String,
    pub structured: bool,
}

impl Default for LoggingFeature {
    fn default() -> Self {
        Self {
            kind: None,
            level: "info".into(),
            format: "text".into(),
            structured: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TestingFeature {
    pub framework: String,
    pub coverage: bool,
}

impl Default for TestingFeature {
    fn default() -> Self {
        Self {
            framework: "testing".into(),
            coverage: false,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeploymentFeature {
    pub targets: Vec<DeploymentTarget>,
}

// ── Profile ──────────────────────────────────────────────────────────────────

/// Saved identity and defaults, merged underneath every request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Profile {
    pub name: String,
    pub identity: Identity,
    pub defaults: ProfileDefaults,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Identity {
    pub author: String,
    pub email: String,
    pub license: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfileDefaults {
    pub runtime_version: String,
    pub framework: String,
    pub architecture: String,
    pub logger: String,
}

impl Profile {
    /// The profile used when none is configured.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}
