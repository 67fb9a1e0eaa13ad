//! Domain value objects: the closed sets every request axis draws from.
//!
//! # Design
//!
//! These are pure value types: `Copy`, equality-by-value, no identity. Each
//! one knows its canonical string form, its accepted aliases and the full
//! list of its members. The member list is what the context builder walks to
//! emit one discriminator per possible value.
//!
//! # Adding New Variants
//!
//! 1. Add the variant (and its spellings) to the `closed_set!` invocation
//! 2. Done. Parsing, display, serde and discriminators pick it up

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::error::ValidationError;

/// A closed set of values a blueprint axis or feature family can take.
pub trait Axis: Copy + Eq + fmt::Display + 'static {
    /// Field name used in errors and as the discriminator prefix.
    const NAME: &'static str;

    /// Every member, in declaration order.
    fn all() -> &'static [Self];

    fn as_str(&self) -> &'static str;

    /// Discriminator key for this member, e.g. `framework_gin`.
    fn discriminator(&self) -> String {
        format!("{}_{}", Self::NAME, self.as_str().replace('-', "_"))
    }

    /// Canonical spellings of all members.
    fn names() -> Vec<&'static str> {
        Self::all().iter().map(|v| v.as_str()).collect()
    }
}

macro_rules! closed_set {
    (
        $(#[$meta:meta])*
        $name:ident, $field:literal {
            $( $(#[$vmeta:meta])* $variant:ident => $canonical:literal $(| $alias:literal)* ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub enum $name {
            $( $(#[$vmeta])* $variant ),+
        }

        impl Axis for $name {
            const NAME: &'static str = $field;

            fn all() -> &'static [Self] {
                &[$( Self::$variant ),+]
            }

            fn as_str(&self) -> &'static str {
                match self {
                    $( Self::$variant => $canonical ),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = ValidationError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim().to_ascii_lowercase().as_str() {
                    $( $canonical $(| $alias)* => Ok(Self::$variant), )+
                    other => Err(ValidationError::UnsupportedValue {
                        field: $field,
                        value: other.to_string(),
                        allowed: Self::names(),
                    }),
                }
            }
        }

        impl TryFrom<String> for $name {
            type Error = ValidationError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                value.parse()
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> Self {
                value.as_str().to_string()
            }
        }
    };
}

// ── Blueprint axes ───────────────────────────────────────────────────────────

closed_set! {
    /// The type of application to scaffold.
    ProjectKind, "kind" {
        WebApi => "web-api" | "webapi" | "api" | "web",
        Cli => "cli",
        Library => "library" | "lib",
        Worker => "worker",
    }
}

closed_set! {
    /// Architectural pattern the generated tree is organised around.
    Architecture, "architecture" {
        /// Entities / use cases / adapters.
        Clean => "clean",
        /// Ports and adapters.
        Hexagonal => "hexagonal" | "ports-and-adapters",
        /// Handler → service → repository layering.
        Layered => "layered",
        /// The community `cmd/ internal/ pkg/` layout.
        Standard => "standard" | "std-layout",
    }
}

closed_set! {
    /// HTTP framework for web-facing kinds.
    Framework, "framework" {
        Gin => "gin",
        Echo => "echo",
        Fiber => "fiber",
        Chi => "chi",
        Stdlib => "stdlib" | "net-http" | "nethttp",
    }
}

// ── Feature families ─────────────────────────────────────────────────────────

closed_set! {
    /// Logging library wired into the generated project.
    Logger, "logger" {
        Slog => "slog",
        Zap => "zap",
        Zerolog => "zerolog",
        Logrus => "logrus",
    }
}

closed_set! {
    DatabaseDriver, "database" {
        Postgres => "postgres" | "postgresql" | "pg",
        Mysql => "mysql",
        Sqlite => "sqlite" | "sqlite3",
        Mongodb => "mongodb" | "mongo",
    }
}

closed_set! {
    Orm, "orm" {
        Gorm => "gorm",
        Sqlx => "sqlx",
        Ent => "ent",
    }
}

closed_set! {
    /// Authentication strategy.
    AuthType, "auth" {
        Jwt => "jwt",
        OAuth2 => "oauth2" | "oauth",
        Session => "session",
        ApiKey => "api-key" | "apikey" | "api_key",
    }
}

closed_set! {
    DeploymentTarget, "deploy" {
        Docker => "docker",
        Kubernetes => "kubernetes" | "k8s",
        Compose => "compose" | "docker-compose",
        Serverless => "serverless" | "lambda",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_display_is_kebab() {
        assert_eq!(ProjectKind::WebApi.to_string(), "web-api");
        assert_eq!(ProjectKind::Cli.to_string(), "cli");
    }

    #[test]
    fn from_str_accepts_aliases_case_insensitively() {
        assert_eq!("API".parse::<ProjectKind>().unwrap(), ProjectKind::WebApi);
        assert_eq!("k8s".parse::<DeploymentTarget>().unwrap(), DeploymentTarget::Kubernetes);
        assert_eq!(" pg ".parse::<DatabaseDriver>().unwrap(), DatabaseDriver::Postgres);
        assert_eq!("net-http".parse::<Framework>().unwrap(), Framework::Stdlib);
    }

    #[test]
    fn unknown_value_names_field_and_allowed_values() {
        let err = "java".parse::<Logger>().unwrap_err();
        match err {
            ValidationError::UnsupportedValue { field, value, allowed } => {
                assert_eq!(field, "logger");
                assert_eq!(value, "java");
                assert!(allowed.contains(&"zap"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn discriminator_replaces_dashes() {
        assert_eq!(AuthType::ApiKey.discriminator(), "auth_api_key");
        assert_eq!(ProjectKind::WebApi.discriminator(), "kind_web_api");
        assert_eq!(Framework::Gin.discriminator(), "framework_gin");
    }

    #[test]
    fn serde_uses_canonical_strings() {
        let json = serde_json::to_string(&AuthType::OAuth2).unwrap();
        assert_eq!(json, "\"oauth2\"");
        let parsed: DatabaseDriver = serde_json::from_str("\"mongo\"").unwrap();
        assert_eq!(parsed, DatabaseDriver::Mongodb);
        assert!(serde_json::from_str::<Orm>("\"hibernate\"").is_err());
    }

    #[test]
    fn all_lists_every_member_once() {
        assert_eq!(Architecture::all().len(), 4);
        assert_eq!(Framework::names(), vec!["gin", "echo", "fiber", "chi", "stdlib"]);
    }
}
