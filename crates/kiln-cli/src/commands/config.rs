//! `kiln config`: inspect configuration values.

use std::path::PathBuf;

use serde_json::Value;

use crate::{
    cli::{ConfigCommands, GlobalArgs},
    config::AppConfig,
    error::{CliError, CliResult, IntoCli},
    output::OutputManager,
};

/// Dispatch to the correct config subcommand.
pub fn execute(
    cmd: ConfigCommands,
    global: GlobalArgs,
    config: AppConfig,
    output: OutputManager,
) -> CliResult<()> {
    match cmd {
        ConfigCommands::Get { key } => {
            let value = get_config_value(&config, &key)?;
            if output.is_json() {
                output.json(&value)?;
            } else {
                output.print(&display_value(&value))?;
            }
        }

        ConfigCommands::List => {
            if output.is_json() {
                output.json(&config)?;
            } else {
                output.header("Current Configuration:")?;
                let serialised = config.to_toml().with_cli_context(|| "config list")?;
                output.print(serialised.trim_end())?;
            }
        }

        ConfigCommands::Path => {
            output.print(&config_file(&global).display().to_string())?;
        }
    }

    Ok(())
}

/// The file `--config` names, or the platform default.
pub fn config_file(global: &GlobalArgs) -> PathBuf {
    global.config.clone().unwrap_or_else(AppConfig::config_path)
}

// ── helpers ───────────────────────────────────────────────────────────────────

/// Look up a dotted key such as `profiles.work.identity.email`.
fn get_config_value(config: &AppConfig, key: &str) -> CliResult<Value> {
    let root = serde_json::to_value(config).map_err(|e| CliError::ConfigError {
        message: format!("failed to serialise config: {e}"),
        source: Some(Box::new(e)),
    })?;

    key.split('.')
        .try_fold(&root, |node, segment| node.get(segment))
        .cloned()
        .ok_or_else(|| CliError::InvalidInput {
            message: format!("unknown config key '{key}'"),
            source: None,
        })
}

fn display_value(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

// ── tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ProfileConfig;

    #[test]
    fn get_scalar_keys() {
        let cfg = AppConfig::default();
        assert_eq!(get_config_value(&cfg, "generation.init_git").unwrap(), Value::Bool(true));
        assert_eq!(display_value(&get_config_value(&cfg, "output.format").unwrap()), "auto");
        assert_eq!(display_value(&get_config_value(&cfg, "current_profile").unwrap()), "");
    }

    #[test]
    fn get_nested_profile_key() {
        let mut cfg = AppConfig::default();
        let mut work = ProfileConfig::default();
        work.identity.email = "dev@acme.io".into();
        cfg.profiles.insert("work".into(), work);

        let value = get_config_value(&cfg, "profiles.work.identity.email").unwrap();
        assert_eq!(display_value(&value), "dev@acme.io");
    }

    #[test]
    fn get_unknown_key_is_user_error() {
        let err = get_config_value(&AppConfig::default(), "does.not.exist").unwrap_err();
        assert!(matches!(err, CliError::InvalidInput { .. }));
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn tables_display_as_json() {
        let value = get_config_value(&AppConfig::default(), "output").unwrap();
        let shown = display_value(&value);
        assert!(shown.starts_with('{'));
        assert!(shown.contains(r#""format":"auto""#));
        assert!(shown.contains(r#""no_color":false"#));
    }
}
