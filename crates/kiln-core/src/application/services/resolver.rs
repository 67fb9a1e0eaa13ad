//! Configuration resolver: merges a request with the current profile and the
//! built-in defaults, then validates the result.
//!
//! Tiers, lowest to highest:
//!
//! 1. built-in defaults ([`BuiltinDefaults`])
//! 2. profile defaults
//! 3. profile identity (author, email, license)
//! 4. explicit request fields
//!
//! A value is explicit only when it is non-empty after trimming, so an empty
//! request field never clears a lower tier.

use std::sync::Arc;

use tracing::{debug, instrument};

use crate::application::ports::ToolchainProbe;
use crate::domain::{
    NO_FRAMEWORK, Profile, ProjectRequest, ResolvedConfig,
    error::ValidationError,
    validation::{AUTO_TOOLCHAIN, ToolchainVersion, explicit},
    value_objects::{Axis, Logger},
};

/// Lowest-precedence values, used when neither the request nor the profile
/// supplies one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuiltinDefaults {
    pub architecture: &'static str,
    pub runtime_version: &'static str,
    pub logger: &'static str,
    pub license: &'static str,
}

impl Default for BuiltinDefaults {
    fn default() -> Self {
        Self {
            architecture: "clean",
            runtime_version: "1.22",
            logger: "slog",
            license: "MIT",
        }
    }
}

/// First explicit value across tiers, highest precedence first.
fn pick<'a>(tiers: impl IntoIterator<Item = &'a str>) -> Option<&'a str> {
    tiers.into_iter().find_map(explicit)
}

fn normalize(value: &str) -> String {
    value.trim().to_ascii_lowercase()
}

pub struct ConfigResolver {
    toolchain: Arc<dyn ToolchainProbe>,
    defaults: BuiltinDefaults,
}

impl ConfigResolver {
    pub fn new(toolchain: Arc<dyn ToolchainProbe>) -> Self {
        Self {
            toolchain,
            defaults: BuiltinDefaults::default(),
        }
    }

    pub fn with_defaults(mut self, defaults: BuiltinDefaults) -> Self {
        self.defaults = defaults;
        self
    }

    pub fn defaults(&self) -> &BuiltinDefaults {
        &self.defaults
    }

    /// Merge and validate.
    ///
    /// Validation runs in a fixed order and stops at the first failure:
    /// name, module path, kind, toolchain version, logger. The toolchain
    /// probe is only consulted when the merged version is `auto`.
    #[instrument(skip_all, fields(name = %request.name.trim(), profile = %profile.name))]
    pub fn resolve(
        &self,
        request: &ProjectRequest,
        profile: &Profile,
    ) -> Result<ResolvedConfig, ValidationError> {
        let d = &self.defaults;
        let p = &profile.defaults;
        let id = &profile.identity;

        let name = explicit(&request.name).ok_or(ValidationError::MissingName)?;
        let module_path =
            explicit(&request.module_path).ok_or(ValidationError::MissingModulePath)?;
        let kind = explicit(&request.kind).ok_or(ValidationError::MissingKind)?;

        let raw_version = pick([
            request.runtime_version.as_str(),
            p.runtime_version.as_str(),
            d.runtime_version,
        ])
        .unwrap_or(d.runtime_version);
        let toolchain = self.toolchain_version(raw_version)?;

        let logging_kind = request
            .features
            .logging
            .as_ref()
            .and_then(|l| l.kind)
            .map(|l| l.as_str())
            .unwrap_or_default();
        let logger: Logger = pick([
            request.logger.as_str(),
            logging_kind,
            p.logger.as_str(),
            d.logger,
        ])
        .unwrap_or(d.logger)
        .parse()?;

        let architecture = pick([
            request.architecture.as_str(),
            p.architecture.as_str(),
            d.architecture,
        ])
        .map(normalize)
        .unwrap_or_default();

        let framework = pick([request.framework.as_str(), p.framework.as_str()])
            .map(normalize)
            .filter(|f| f != NO_FRAMEWORK);

        let resolved = ResolvedConfig {
            name: name.to_string(),
            module_path: module_path.to_string(),
            kind: normalize(kind),
            architecture,
            framework,
            toolchain,
            logger,
            author: pick([request.author.as_str(), id.author.as_str()])
                .unwrap_or_default()
                .to_string(),
            email: pick([request.email.as_str(), id.email.as_str()])
                .unwrap_or_default()
                .to_string(),
            license: pick([request.license.as_str(), id.license.as_str(), d.license])
                .unwrap_or(d.license)
                .to_string(),
            custom_variables: request.custom_variables.clone(),
            features: request.features.clone(),
        };

        debug!(
            kind = %resolved.kind,
            architecture = %resolved.architecture,
            framework = resolved.framework.as_deref().unwrap_or(NO_FRAMEWORK),
            toolchain = %resolved.toolchain,
            logger = %resolved.logger,
            "Request resolved"
        );
        Ok(resolved)
    }

    fn toolchain_version(&self, raw: &str) -> Result<ToolchainVersion, ValidationError> {
        if !raw.eq_ignore_ascii_case(AUTO_TOOLCHAIN) {
            return ToolchainVersion::parse_supported(raw);
        }

        let detected = self
            .toolchain
            .detect()
            .map_err(|e| ValidationError::ToolchainDetection { reason: e.message })?;
        debug!(detected = %detected, "Detected host toolchain");

        let version =
            ToolchainVersion::parse(&detected).map_err(|_| ValidationError::ToolchainDetection {
                reason: format!("unrecognised version '{}'", detected.trim()),
            })?;
        version.ensure_supported()?;
        Ok(version)
    }
}
