//! Application configuration.
//!
//! [`AppConfig`] is loaded once at startup and passed down by value. The
//! CLI layer owns config; the core crate only ever sees the [`Profile`]
//! selected from it.
//!
//! # Resolution order (highest priority first)
//!
//! 1. CLI flags (handled at the call-site, not here)
//! 2. Environment variables `KILN__<SECTION>__<KEY>`
//! 3. Config file (`--config`, `$KILN_CONFIG`, or the platform config dir)
//! 4. Built-in defaults

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::Context;
use config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use tracing::debug;

use kiln_core::domain::{Identity, Profile, ProfileDefaults};

const ENV_PREFIX: &str = "KILN";
const ENV_SEPARATOR: &str = "__";

/// Application configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Profile applied when `--profile` is not given.
    pub current_profile: Option<String>,
    /// Saved identities and defaults, by name.
    pub profiles: BTreeMap<String, ProfileConfig>,
    pub blueprints: BlueprintsConfig,
    pub output: OutputConfig,
    pub generation: GenerationConfig,
}

/// One `[profiles.<name>]` table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfileConfig {
    pub identity: Identity,
    pub defaults: ProfileDefaults,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BlueprintsConfig {
    pub dir: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub no_color: bool,
    /// `auto`, `human`, `plain` or `json`. Used when `--output-format` is
    /// left at `auto`.
    pub format: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            no_color: false,
            format: "auto".into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    /// Initialise a git repository in every new project.
    pub init_git: bool,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self { init_git: true }
    }
}

impl ProfileConfig {
    pub fn to_profile(&self, name: &str) -> Profile {
        Profile {
            name: name.to_string(),
            identity: self.identity.clone(),
            defaults: self.defaults.clone(),
        }
    }
}

impl AppConfig {
    /// Load configuration.
    ///
    /// An explicit `config_file` must exist; the default location is
    /// optional.
    pub fn load(config_file: Option<&Path>) -> anyhow::Result<Self> {
        let (path, required) = match config_file {
            Some(path) => (path.to_path_buf(), true),
            None => (Self::config_path(), false),
        };
        debug!(path = %path.display(), required, "loading configuration");

        let defaults = toml::to_string(&Self::default())
            .context("failed to serialise default configuration")?;

        let settings = Config::builder()
            .add_source(File::from_str(&defaults, FileFormat::Toml))
            .add_source(File::from(path.as_path()).format(FileFormat::Toml).required(required))
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator(ENV_SEPARATOR)
                    .separator(ENV_SEPARATOR)
                    .try_parsing(true),
            )
            .build()
            .with_context(|| format!("failed to read configuration from {}", path.display()))?;

        settings
            .try_deserialize()
            .with_context(|| format!("invalid configuration in {}", path.display()))
    }

    /// Path to the default configuration file.
    ///
    /// Uses `directories::ProjectDirs` for cross-platform correctness,
    /// falling back to `.kiln.toml` in the current directory.
    pub fn config_path() -> PathBuf {
        directories::ProjectDirs::from("dev", "kiln", "kiln")
            .map(|d| d.config_dir().join("config.toml"))
            .unwrap_or_else(|| PathBuf::from(".kiln.toml"))
    }

    /// The profile a generation should use: `requested` if given, else
    /// `current_profile`, else the empty profile.
    ///
    /// Returns the missing name when a requested or configured profile does
    /// not exist.
    pub fn active_profile(&self, requested: Option<&str>) -> Result<Profile, String> {
        let Some(name) = requested.or(self.current_profile.as_deref()) else {
            return Ok(Profile::empty());
        };
        self.profiles
            .get(name)
            .map(|p| p.to_profile(name))
            .ok_or_else(|| name.to_string())
    }

    pub fn profile_names(&self) -> Vec<String> {
        self.profiles.keys().cloned().collect()
    }

    /// Render as TOML, the format `kiln init` writes.
    pub fn to_toml(&self) -> anyhow::Result<String> {
        toml::to_string_pretty(self).context("failed to serialise configuration")
    }
}
