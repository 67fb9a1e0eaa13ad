//! CLI argument definitions using the clap derive API.
//!
//! This module is the *only* place that knows about argument names, aliases,
//! help text, and value enums. No business logic lives here.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

pub mod global;
pub use global::{GlobalArgs, LogFormat};

// ── Top-level CLI ─────────────────────────────────────────────────────────────

/// Main CLI entry-point.
#[derive(Debug, Parser)]
#[command(
    name     = "kiln",
    bin_name = "kiln",
    version  = env!("CARGO_PKG_VERSION"),
    author   = env!("CARGO_PKG_AUTHORS"),
    about    = "Scaffold Go projects from blueprints",
    long_about = "Kiln selects a blueprint matching the requested project kind, \
                  architecture and framework, renders it, and writes the result \
                  to disk as a single all-or-nothing operation.",
    after_help = "EXAMPLES:\n\
        \x20 kiln new orders --module github.com/acme/orders --kind web-api --framework gin\n\
        \x20 kiln new tool   --module github.com/acme/tool   --kind cli --dry-run\n\
        \x20 kiln list --kind web-api\n\
        \x20 kiln completions bash > /usr/share/bash-completion/completions/kiln",
    arg_required_else_help = true,
    subcommand_required    = true,
)]
pub struct Cli {
    /// Flags available on every subcommand.
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

// ── Subcommands ───────────────────────────────────────────────────────────────

/// All available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Create a new project from a blueprint.
    #[command(
        visible_alias = "n",
        about = "Create a new project",
        after_help = "EXAMPLES:\n\
            \x20 kiln new orders --module github.com/acme/orders --kind web-api --framework chi --db postgres --orm sqlx\n\
            \x20 kiln new tool   --module github.com/acme/tool   --kind cli --var command_name=tool\n\
            \x20 kiln new sdk    --module github.com/acme/sdk    --kind library --arch standard --dry-run"
    )]
    New(NewArgs),

    /// List available blueprints.
    #[command(
        visible_alias = "ls",
        about = "List available blueprints",
        after_help = "EXAMPLES:\n\
            \x20 kiln list\n\
            \x20 kiln list --kind web-api\n\
            \x20 kiln list --framework gin --format json"
    )]
    List(ListArgs),

    /// Write a default configuration file.
    #[command(
        about = "Initialise configuration",
        after_help = "EXAMPLES:\n\
            \x20 kiln init                       # platform config directory\n\
            \x20 kiln --config ./kiln.toml init  # explicit location\n\
            \x20 kiln init --force               # overwrite an existing file"
    )]
    Init(InitArgs),

    /// Generate shell completion scripts.
    #[command(
        about = "Generate shell completions",
        after_help = "EXAMPLES:\n\
            \x20 kiln completions bash > ~/.local/share/bash-completion/completions/kiln\n\
            \x20 kiln completions zsh  > ~/.zfunc/_kiln\n\
            \x20 kiln completions fish > ~/.config/fish/completions/kiln.fish"
    )]
    Completions(CompletionsArgs),

    /// Inspect the Kiln configuration.
    #[command(
        about = "Configuration management",
        subcommand,
        after_help = "EXAMPLES:\n\
            \x20 kiln config get generation.init_git\n\
            \x20 kiln config list\n\
            \x20 kiln config path"
    )]
    Config(ConfigCommands),

    /// Inspect configured profiles.
    #[command(
        about = "Profile management",
        subcommand,
        after_help = "EXAMPLES:\n\
            \x20 kiln profile list\n\
            \x20 kiln profile show work"
    )]
    Profile(ProfileCommands),
}

// ── new ───────────────────────────────────────────────────────────────────────

/// Arguments for `kiln new`.
#[derive(Debug, Args)]
pub struct NewArgs {
    /// Project name or path. A plain name creates `<output>/name`; a path
    /// like `services/orders` nests it, and the last component is the name.
    #[arg(value_name = "NAME", help = "Project name or path")]
    pub name: String,

    /// Go module path written to `go.mod`.
    #[arg(
        short = 'm',
        long = "module",
        value_name = "PATH",
        help = "Go module path (e.g. github.com/acme/orders)"
    )]
    pub module: Option<String>,

    /// Project kind. Unknown kinds are reported with the kinds that exist.
    #[arg(
        short = 'k',
        long = "kind",
        value_name = "KIND",
        help = "Project kind: web-api, cli, library, worker"
    )]
    pub kind: Option<String>,

    #[arg(
        short = 'a',
        long = "arch",
        value_name = "ARCH",
        help = "Architecture: clean, hexagonal, layered, standard [default: clean]"
    )]
    pub architecture: Option<String>,

    #[arg(
        short = 'f',
        long = "framework",
        value_name = "FRAMEWORK",
        help = "Web framework: gin, echo, fiber, chi, stdlib"
    )]
    pub framework: Option<String>,

    /// Go toolchain version, or `auto` to use the installed one.
    #[arg(
        long = "go-version",
        value_name = "VERSION",
        help = "Go version (1.20 to 1.25, or 'auto') [default: 1.22]"
    )]
    pub go_version: Option<String>,

    #[arg(
        long = "logger",
        value_name = "LOGGER",
        help = "Logging library: slog, zap, zerolog, logrus [default: slog]"
    )]
    pub logger: Option<String>,

    /// Database drivers. The first one is the primary driver.
    #[arg(
        long = "db",
        value_name = "DRIVER",
        value_delimiter = ',',
        help = "Database driver(s): postgres, mysql, sqlite, mongodb"
    )]
    pub databases: Vec<String>,

    #[arg(
        long = "orm",
        value_name = "ORM",
        help = "Data access library: gorm, sqlx, ent"
    )]
    pub orm: Option<String>,

    #[arg(
        long = "auth",
        value_name = "TYPE",
        help = "Authentication: jwt, oauth2, session, api-key"
    )]
    pub auth: Option<String>,

    #[arg(
        long = "auth-provider",
        value_name = "PROVIDER",
        value_delimiter = ',',
        requires = "auth",
        help = "Identity provider(s) for --auth (e.g. google,github)"
    )]
    pub auth_providers: Vec<String>,

    #[arg(
        long = "deploy",
        value_name = "TARGET",
        value_delimiter = ',',
        help = "Deployment target(s): docker, kubernetes, compose, serverless"
    )]
    pub deploy: Vec<String>,

    #[arg(
        long = "test-framework",
        value_name = "NAME",
        help = "Test framework (e.g. testify)"
    )]
    pub test_framework: Option<String>,

    #[arg(long = "coverage", help = "Enable coverage reporting in the test setup")]
    pub coverage: bool,

    /// Blueprint variables. Repeatable.
    #[arg(
        long = "var",
        value_name = "KEY=VALUE",
        help = "Set a blueprint variable (repeatable)"
    )]
    pub vars: Vec<String>,

    #[arg(long = "author", value_name = "NAME", help = "Author name")]
    pub author: Option<String>,

    #[arg(long = "email", value_name = "EMAIL", help = "Author email")]
    pub email: Option<String>,

    #[arg(long = "license", value_name = "SPDX", help = "License [default: MIT]")]
    pub license: Option<String>,

    /// Profile to apply. Defaults to `current_profile` from the config file.
    #[arg(
        short = 'p',
        long = "profile",
        value_name = "NAME",
        help = "Configuration profile to use"
    )]
    pub profile: Option<String>,

    /// Override the parent output directory.
    #[arg(
        short = 'o',
        long = "output",
        value_name = "DIR",
        help = "Parent directory for the project (default: current directory)"
    )]
    pub output: Option<PathBuf>,

    /// Preview what would be created without writing any files.
    #[arg(long = "dry-run", help = "Show what would be created without creating")]
    pub dry_run: bool,

    #[arg(long = "no-git", help = "Do not initialise a git repository")]
    pub no_git: bool,
}

// ── list ──────────────────────────────────────────────────────────────────────

/// Arguments for `kiln list`.
#[derive(Debug, Args)]
pub struct ListArgs {
    #[arg(short = 'k', long = "kind", help = "Filter by project kind")]
    pub kind: Option<String>,

    #[arg(short = 'a', long = "arch", help = "Filter by architecture")]
    pub architecture: Option<String>,

    #[arg(
        short = 'f',
        long = "framework",
        help = "Filter by supported framework ('none' for framework-less)"
    )]
    pub framework: Option<String>,

    /// Output format.
    #[arg(
        long = "format",
        value_enum,
        default_value = "table",
        help = "Output format"
    )]
    pub format: ListFormat,
}

/// Output format for the `list` command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ListFormat {
    /// Human-readable table.
    Table,
    /// One id per line.
    List,
    /// JSON array.
    Json,
    /// CSV rows.
    Csv,
}

// ── init ──────────────────────────────────────────────────────────────────────

/// Arguments for `kiln init`.
#[derive(Debug, Args)]
pub struct InitArgs {
    /// Overwrite an existing config file.
    #[arg(short = 'f', long = "force", help = "Overwrite existing configuration")]
    pub force: bool,
}

// ── completions ───────────────────────────────────────────────────────────────

/// Arguments for `kiln completions`.
#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Target shell.
    #[arg(value_enum, help = "Shell to generate completions for")]
    pub shell: Shell,
}

/// Supported shells for completion generation.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
    Elvish,
}

// ── config / profile subcommands ──────────────────────────────────────────────

/// Subcommands for `kiln config`.
#[derive(Debug, Subcommand)]
pub enum ConfigCommands {
    /// Print the value of a configuration key.
    Get {
        /// Dotted key path, e.g. `output.format`.
        key: String,
    },
    /// Print the effective configuration.
    List,
    /// Print the path to the configuration file.
    Path,
}

/// Subcommands for `kiln profile`.
#[derive(Debug, Subcommand)]
pub enum ProfileCommands {
    /// List profile names, marking the current one.
    List,
    /// Print one profile.
    Show {
        /// Profile name. Defaults to the current profile.
        name: Option<String>,
    },
}

// ── tests ─────────────────────────────────────────────────────────────────────
