//! Blueprint registry: immutable exact-match index from axis tuple to
//! blueprint.
//!
//! Built once from the loaded blueprints and shared by reference (usually
//! behind an `Arc`). There is no mutation after construction, so lookups
//! need no locking and the registry is `Send + Sync` for free.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use serde::Serialize;

use crate::domain::{
    entities::{Blueprint, BlueprintKey},
    error::{BlueprintError, BlueprintNotFound, LookupAxis},
    value_objects::{Architecture, Axis, Framework, ProjectKind},
};

/// Value that stands for "no framework" in lookups and listings.
pub const NO_FRAMEWORK: &str = "none";

/// Display-oriented view of one blueprint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BlueprintSummary {
    pub id: String,
    pub version: String,
    pub name: String,
    pub description: String,
    pub kind: String,
    pub architecture: String,
    pub frameworks: Vec<String>,
    pub tags: Vec<String>,
}

impl From<&Blueprint> for BlueprintSummary {
    fn from(bp: &Blueprint) -> Self {
        Self {
            id: bp.id.clone(),
            version: bp.version.clone(),
            name: bp.metadata.name.clone(),
            description: bp.metadata.description.clone(),
            kind: bp.kind.to_string(),
            architecture: bp.architecture.to_string(),
            frameworks: bp
                .frameworks
                .iter()
                .map(|f| f.map_or(NO_FRAMEWORK, |fw| fw.as_str()).to_string())
                .collect(),
            tags: bp.metadata.tags.clone(),
        }
    }
}

#[derive(Debug, Default)]
pub struct BlueprintRegistry {
    blueprints: Vec<Arc<Blueprint>>,
    index: HashMap<BlueprintKey, Arc<Blueprint>>,
}

impl BlueprintRegistry {
    /// Index every blueprint under each key it serves.
    ///
    /// # Errors
    ///
    /// [`BlueprintError::DuplicateKey`] when two blueprints claim the same
    /// axis tuple; resolution must never be ambiguous.
    pub fn new(blueprints: impl IntoIterator<Item = Blueprint>) -> Result<Self, BlueprintError> {
        let mut registry = Self::default();
        for bp in blueprints {
            let bp = Arc::new(bp);
            for key in bp.keys() {
                if let Some(existing) = registry.index.get(&key) {
                    return Err(BlueprintError::DuplicateKey {
                        key: key.to_string(),
                        first: existing.label(),
                        second: bp.label(),
                    });
                }
                registry.index.insert(key, Arc::clone(&bp));
            }
            registry.blueprints.push(bp);
        }
        registry.blueprints.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(registry)
    }

    pub fn len(&self) -> usize {
        self.blueprints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blueprints.is_empty()
    }

    /// All blueprints, ordered by id.
    pub fn list(&self) -> &[Arc<Blueprint>] {
        &self.blueprints
    }

    pub fn summaries(&self) -> Vec<BlueprintSummary> {
        self.blueprints.iter().map(|bp| bp.as_ref().into()).collect()
    }

    pub fn get(&self, id: &str) -> Option<Arc<Blueprint>> {
        self.blueprints.iter().find(|bp| bp.id == id).cloned()
    }

    pub fn get_by_key(&self, key: &BlueprintKey) -> Option<Arc<Blueprint>> {
        self.index.get(key).cloned()
    }

    /// Find the blueprint for an axis tuple.
    ///
    /// Axes are narrowed kind → architecture → framework; the error names the
    /// first axis whose value is unknown or has no blueprint given the axes
    /// before it. `framework` of `None`, empty or `"none"` means no
    /// framework.
    pub fn lookup(
        &self,
        kind: &str,
        architecture: &str,
        framework: Option<&str>,
    ) -> Result<Arc<Blueprint>, BlueprintNotFound> {
        let kinds: BTreeSet<ProjectKind> = self.index.keys().map(|k| k.kind).collect();
        let kind = parse_axis::<ProjectKind>(kind)
            .filter(|k| kinds.contains(k))
            .ok_or_else(|| not_found(LookupAxis::Kind, kind, kinds.iter().map(|k| k.to_string())))?;

        let architectures: BTreeSet<Architecture> = self
            .index
            .keys()
            .filter(|k| k.kind == kind)
            .map(|k| k.architecture)
            .collect();
        let architecture = parse_axis::<Architecture>(architecture)
            .filter(|a| architectures.contains(a))
            .ok_or_else(|| {
                not_found(
                    LookupAxis::Architecture,
                    architecture,
                    architectures.iter().map(|a| a.to_string()),
                )
            })?;

        let raw_framework = framework
            .map(str::trim)
            .filter(|f| !f.is_empty() && !f.eq_ignore_ascii_case(NO_FRAMEWORK));
        let frameworks: BTreeSet<Option<Framework>> = self
            .index
            .keys()
            .filter(|k| k.kind == kind && k.architecture == architecture)
            .map(|k| k.framework)
            .collect();
        let available = || {
            frameworks
                .iter()
                .map(|f| f.map_or(NO_FRAMEWORK, |fw| fw.as_str()).to_string())
        };

        let framework = match raw_framework {
            None => None,
            Some(raw) => Some(
                parse_axis::<Framework>(raw)
                    .ok_or_else(|| not_found(LookupAxis::Framework, raw, available()))?,
            ),
        };

        let key = BlueprintKey {
            kind,
            architecture,
            framework,
        };
        self.index.get(&key).cloned().ok_or_else(|| {
            not_found(
                LookupAxis::Framework,
                raw_framework.unwrap_or(NO_FRAMEWORK),
                available(),
            )
        })
    }
}

fn parse_axis<A: Axis + std::str::FromStr>(raw: &str) -> Option<A> {
    raw.parse::<A>().ok()
}

fn not_found(
    axis: LookupAxis,
    value: &str,
    available: impl Iterator<Item = String>,
) -> BlueprintNotFound {
    BlueprintNotFound {
        axis,
        value: value.trim().to_string(),
        available: available.collect(),
    }
}
