//! Render context construction.
//!
//! [`RenderContext::build`] is the only place axis membership is decided.
//! For every closed axis it emits one boolean per possible value
//! (`framework_gin`, `database_postgres`, …) with at most one of them true,
//! so templates branch on flags and never compare strings.
//!
//! Key layout:
//!
//! | Key(s)                              | Source                               |
//! |-------------------------------------|--------------------------------------|
//! | `name`, `module_path`, `kind`, …    | resolved scalars                     |
//! | `name_snake`, `name_pascal`, …      | casing variants of `name`            |
//! | `<axis>_<value>`                    | discriminators                       |
//! | `has_*`, `has_multiple_*`           | derived from feature lists           |
//! | `database`, `auth`, `logging`, …    | feature objects (null when disabled) |
//! | `vars`                              | custom values over declared defaults |

use std::str::FromStr;

use chrono::{Datelike, NaiveDate};
use heck::{ToKebabCase, ToLowerCamelCase, ToShoutySnakeCase, ToSnakeCase, ToUpperCamelCase};
use serde::Serialize;
use serde_json::{Map, Value, json};

use crate::domain::{
    entities::{Blueprint, ResolvedConfig},
    value_objects::{
        Architecture, AuthType, Axis, DatabaseDriver, DeploymentTarget, Framework, Orm,
        ProjectKind,
    },
};

/// Variables and flags visible to every template of one generation.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct RenderContext {
    values: Map<String, Value>,
}

impl RenderContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the context for one resolved request against one blueprint.
    pub fn build(resolved: &ResolvedConfig, blueprint: &Blueprint, today: NaiveDate) -> Self {
        let mut ctx = Self::new();
        ctx.insert_scalars(resolved, today);
        ctx.insert_discriminators(resolved);
        ctx.insert_features(resolved);
        ctx.insert_variables(resolved, blueprint);
        ctx
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    /// `true` only for a boolean `true` value.
    pub fn flag(&self, key: &str) -> bool {
        matches!(self.values.get(key), Some(Value::Bool(true)))
    }

    pub fn str(&self, key: &str) -> Option<&str> {
        self.values.get(key).and_then(Value::as_str)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.values.insert(key.into(), value.into());
    }

    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.values
    }

    // ── Sections ─────────────────────────────────────────────────────────

    fn insert_scalars(&mut self, r: &ResolvedConfig, today: NaiveDate) {
        self.insert("name", r.name.as_str());
        self.insert("name_snake", r.name.to_snake_case());
        self.insert("name_kebab", r.name.to_kebab_case());
        self.insert("name_pascal", r.name.to_upper_camel_case());
        self.insert("name_camel", r.name.to_lower_camel_case());
        self.insert("name_screaming", r.name.to_shouty_snake_case());
        self.insert("package_name", r.name.to_snake_case().replace('_', ""));
        self.insert("module_path", r.module_path.as_str());
        self.insert("kind", canonical::<ProjectKind>(&r.kind));
        self.insert("architecture", canonical::<Architecture>(&r.architecture));
        self.insert(
            "framework",
            r.framework.as_deref().map(canonical::<Framework>).unwrap_or_default(),
        );
        self.insert("has_framework", r.framework.is_some());
        self.insert("runtime_version", r.toolchain.to_string());
        self.insert("go_version", r.toolchain.release());
        self.insert("logger", r.logger.as_str());
        self.insert("author", r.author.as_str());
        self.insert("email", r.email.as_str());
        self.insert("license", r.license.as_str());
        self.insert("year", today.year());
        self.insert("today", today.format("%Y-%m-%d").to_string());
    }

    fn insert_discriminators(&mut self, r: &ResolvedConfig) {
        let features = &r.features;
        self.discriminate(r.kind.parse::<ProjectKind>().ok());
        self.discriminate(r.architecture.parse::<Architecture>().ok());
        self.discriminate(r.framework.as_deref().and_then(|f| f.parse::<Framework>().ok()));
        self.discriminate(Some(r.logger));
        self.discriminate(features.database.as_ref().and_then(|db| db.primary()));
        self.discriminate::<Orm>(features.database.as_ref().and_then(|db| db.orm));
        self.discriminate::<AuthType>(features.authentication.as_ref().map(|a| a.kind));
        self.discriminate::<DeploymentTarget>(
            features
                .deployment
                .as_ref()
                .and_then(|d| d.targets.first().copied()),
        );
    }

    /// One flag per member of `A`; only `selected` (if any) is true.
    fn discriminate<A: Axis>(&mut self, selected: Option<A>) {
        for member in A::all() {
            self.insert(member.discriminator(), Some(*member) == selected);
        }
    }

    fn insert_features(&mut self, r: &ResolvedConfig) {
        let f = &r.features;

        let drivers: Vec<DatabaseDriver> =
            f.database.as_ref().map(|db| db.all_drivers()).unwrap_or_default();
        self.insert("has_database", !drivers.is_empty());
        self.insert("has_multiple_databases", drivers.len() > 1);
        self.insert(
            "has_orm",
            f.database.as_ref().and_then(|db| db.orm).is_some(),
        );
        self.insert(
            "database",
            match &f.database {
                Some(db) if !drivers.is_empty() => json!({
                    "driver": db.primary().map(|d| d.as_str()),
                    "drivers": drivers.iter().map(|d| d.as_str()).collect::<Vec<_>>(),
                    "orm": db.orm.map(|o| o.as_str()),
                }),
                _ => Value::Null,
            },
        );

        let providers = f
            .authentication
            .as_ref()
            .map(|a| a.providers.len())
            .unwrap_or_default();
        self.insert("has_auth", f.authentication.is_some());
        self.insert("has_multiple_auth_providers", providers > 1);
        self.insert(
            "auth",
            f.authentication.as_ref().map_or(Value::Null, |a| {
                json!({ "type": a.kind.as_str(), "providers": a.providers })
            }),
        );

        self.insert("has_logging", f.logging.is_some());
        self.insert(
            "logging",
            f.logging.as_ref().map_or(Value::Null, |l| {
                json!({
                    "type": l.kind.unwrap_or(r.logger).as_str(),
                    "level": l.level,
                    "format": l.format,
                    "structured": l.structured,
                })
            }),
        );

        self.insert("has_testing", f.testing.is_some());
        self.insert(
            "has_coverage",
            f.testing.as_ref().is_some_and(|t| t.coverage),
        );
        self.insert(
            "testing",
            f.testing.as_ref().map_or(Value::Null, |t| {
                json!({ "framework": t.framework, "coverage": t.coverage })
            }),
        );

        let targets: Vec<&'static str> = f
            .deployment
            .as_ref()
            .map(|d| d.targets.iter().map(|t| t.as_str()).collect())
            .unwrap_or_default();
        self.insert("has_deployment", !targets.is_empty());
        self.insert("has_multiple_deployment_targets", targets.len() > 1);
        for target in DeploymentTarget::all() {
            self.insert(
                format!("deploys_{}", target.as_str()),
                targets.contains(&target.as_str()),
            );
        }
        self.insert(
            "deployment",
            if targets.is_empty() {
                Value::Null
            } else {
                json!({ "targets": targets })
            },
        );
    }

    /// Custom values win; declared variables fall back to their default;
    /// a variable with neither stays absent. Each entry is also exposed at
    /// the top level unless it would shadow a built-in key.
    fn insert_variables(&mut self, r: &ResolvedConfig, blueprint: &Blueprint) {
        let mut vars = Map::new();
        for spec in &blueprint.variables {
            if let Some(default) = &spec.default {
                vars.insert(spec.name.clone(), Value::String(default.clone()));
            }
        }
        for (key, value) in &r.custom_variables {
            // Blank never overrides a default.
            if !value.trim().is_empty() {
                vars.insert(key.clone(), Value::String(value.clone()));
            }
        }

        for (key, value) in &vars {
            if !self.values.contains_key(key) {
                self.values.insert(key.clone(), value.clone());
            }
        }
        self.insert("vars", Value::Object(vars));
    }
}

/// The canonical spelling of `raw` on axis `A`, or `raw` unchanged when it
/// names no member.
fn canonical<A: Axis + FromStr>(raw: &str) -> String {
    raw.parse::<A>()
        .map_or_else(|_| raw.to_string(), |member| member.as_str().to_string())
}

impl From<Map<String, Value>> for RenderContext {
    fn from(values: Map<String, Value>) -> Self {
        Self { values }
    }
}
