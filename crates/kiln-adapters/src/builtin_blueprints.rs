//! Built-in blueprint discovery.
//!
//! [`discover`] is the single entry point for finding the blueprint
//! directory Kiln should use, and [`load_registry`] turns it into a ready
//! [`BlueprintRegistry`].
//!
//! # Resolution order
//!
//! 1. **`explicit`**: the `--blueprints` flag.
//! 2. **`$KILN_BLUEPRINTS_DIR`**: environment override.
//! 3. **`configured`**: `blueprints.dir` from the config file.
//! 4. **`./blueprints`**: relative to the current directory.
//! 5. **`<executable-dir>/blueprints`**: installed next to the binary.
//! 6. **`../blueprints`**: development fallback.
//!
//! The first three are requests: if one is set and cannot be loaded, that
//! is an error. The last three are guesses and are skipped when missing or
//! empty.

use std::path::PathBuf;

use tracing::{debug, info, instrument, warn};

use kiln_core::domain::{Blueprint, BlueprintError, BlueprintRegistry};

use crate::blueprint_loader::BlueprintLoader;

pub const BLUEPRINTS_ENV: &str = "KILN_BLUEPRINTS_DIR";

/// Where a candidate directory came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    Flag,
    Environment,
    Config,
    Fallback,
}

impl Origin {
    fn is_requested(self) -> bool {
        !matches!(self, Self::Fallback)
    }
}

/// Blueprints found by [`discover`] and the directory they came from.
#[derive(Debug)]
pub struct Discovered {
    pub dir: PathBuf,
    pub origin: Origin,
    pub blueprints: Vec<Blueprint>,
}

/// Find and load the blueprint directory.
///
/// # Errors
///
/// - [`BlueprintError::Source`] when a requested directory is missing or
///   holds no valid blueprint, or when no fallback directory yields any.
#[instrument]
pub fn discover(
    explicit: Option<PathBuf>,
    configured: Option<PathBuf>,
) -> Result<Discovered, BlueprintError> {
    let candidates = candidate_paths(explicit, configured);
    let checked: Vec<String> = candidates.iter().map(|(p, _)| p.display().to_string()).collect();

    for (dir, origin) in candidates {
        debug!(path = %dir.display(), ?origin, "checking candidate blueprints path");

        if !dir.is_dir() {
            if origin.is_requested() {
                return Err(BlueprintError::Source {
                    path: dir.display().to_string(),
                    reason: "directory not found".into(),
                });
            }
            continue;
        }

        let blueprints = BlueprintLoader::new(&dir).load_all()?;
        if blueprints.is_empty() {
            if origin.is_requested() {
                return Err(BlueprintError::Source {
                    path: dir.display().to_string(),
                    reason: "no valid blueprints in directory".into(),
                });
            }
            debug!(path = %dir.display(), "directory holds no blueprints, trying next");
            continue;
        }

        info!(path = %dir.display(), count = blueprints.len(), "blueprints loaded");
        return Ok(Discovered {
            dir,
            origin,
            blueprints,
        });
    }

    warn!(checked = ?checked, "no blueprint directory found");
    Err(BlueprintError::Source {
        path: checked.join(", "),
        reason: "no blueprint directory found".into(),
    })
}

/// [`discover`], then index the result.
///
/// # Errors
///
/// Everything [`discover`] returns, plus [`BlueprintError::DuplicateKey`].
pub fn load_registry(
    explicit: Option<PathBuf>,
    configured: Option<PathBuf>,
) -> Result<(PathBuf, BlueprintRegistry), BlueprintError> {
    let found = discover(explicit, configured)?;
    let registry = BlueprintRegistry::new(found.blueprints)?;
    Ok((found.dir, registry))
}

fn candidate_paths(
    explicit: Option<PathBuf>,
    configured: Option<PathBuf>,
) -> Vec<(PathBuf, Origin)> {
    let mut paths = Vec::with_capacity(6);

    if let Some(dir) = explicit {
        paths.push((dir, Origin::Flag));
    }
    if let Some(dir) = std::env::var_os(BLUEPRINTS_ENV).filter(|v| !v.is_empty()) {
        paths.push((PathBuf::from(dir), Origin::Environment));
    }
    if let Some(dir) = configured {
        paths.push((dir, Origin::Config));
    }

    paths.push((PathBuf::from("blueprints"), Origin::Fallback));
    if let Some(sibling) = exe_sibling_blueprints() {
        paths.push((sibling, Origin::Fallback));
    }
    paths.push((PathBuf::from("../blueprints"), Origin::Fallback));

    paths
}

/// `<directory of current executable>/blueprints`, when the executable path
/// is known.
fn exe_sibling_blueprints() -> Option<PathBuf> {
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(|p| p.join("blueprints")))
}
