//! `kiln profile`: inspect configured profiles.

use serde::Serialize;

use crate::{
    cli::ProfileCommands,
    config::AppConfig,
    error::{CliError, CliResult, IntoCli},
    output::OutputManager,
};

#[derive(Debug, Serialize)]
struct ProfileEntry<'a> {
    name: &'a str,
    current: bool,
}

pub fn execute(cmd: ProfileCommands, config: AppConfig, output: OutputManager) -> CliResult<()> {
    match cmd {
        ProfileCommands::List => {
            let entries = entries(&config);
            if output.is_json() {
                output.json(&entries)?;
            } else if entries.is_empty() {
                output.info("No profiles configured.")?;
            } else {
                for entry in entries {
                    let marker = if entry.current { "*" } else { " " };
                    output.print(&format!("{marker} {}", entry.name))?;
                }
            }
        }

        ProfileCommands::Show { name } => {
            let name = name
                .or_else(|| config.current_profile.clone())
                .ok_or_else(|| CliError::InvalidInput {
                    message: "no current profile is set; pass a profile name".into(),
                    source: None,
                })?;
            let profile = config
                .active_profile(Some(&name))
                .map_err(|name| CliError::ProfileNotFound {
                    name,
                    available: config.profile_names(),
                })?;

            if output.is_json() {
                output.json(&profile)?;
            } else {
                output.header(&format!("Profile '{}':", profile.name))?;
                let body = toml::to_string_pretty(&profile).map_err(anyhow::Error::from);
                output.print(body.with_cli_context(|| "profile show")?.trim_end())?;
            }
        }
    }

    Ok(())
}

fn entries(config: &AppConfig) -> Vec<ProfileEntry<'_>> {
    config
        .profiles
        .keys()
        .map(|name| ProfileEntry {
            name,
            current: config.current_profile.as_deref() == Some(name.as_str()),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ProfileConfig;

    #[test]
    fn entries_mark_the_current_profile() {
        let mut config = AppConfig {
            current_profile: Some("work".into()),
            ..AppConfig::default()
        };
        config.profiles.insert("home".into(), ProfileConfig::default());
        config.profiles.insert("work".into(), ProfileConfig::default());

        let entries = entries(&config);
        assert_eq!(entries.len(), 2);
        assert_eq!((entries[0].name, entries[0].current), ("home", false));
        assert_eq!((entries[1].name, entries[1].current), ("work", true));
    }

    #[test]
    fn no_profiles_means_no_entries() {
        assert!(entries(&AppConfig::default()).is_empty());
    }
}
