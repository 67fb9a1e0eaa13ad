//! Implementation of the `kiln new` command.
//!
//! Responsibility: translate CLI arguments into a `ProjectRequest`, wire the
//! adapters into a `Generator`, and display the result. No business logic
//! lives here.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, info, instrument};

use kiln_adapters::{
    GitInitializer, GoToolchainProbe, LocalFilesystem, MiniJinjaEngine, SystemClock,
    load_registry,
};
use kiln_core::{
    application::{GenerateOptions, GenerationResult, Generator},
    domain::{
        AuthFeature, AuthType, BlueprintRegistry, DatabaseDriver, DatabaseFeature,
        DeploymentFeature, DeploymentTarget, Features, LoggingFeature, Logger, Orm, Profile,
        ProjectRequest, TestingFeature, ValidationError,
    },
};

use crate::{
    cli::{NewArgs, global::GlobalArgs},
    config::AppConfig,
    error::{CliError, CliResult, IntoCli},
    output::OutputManager,
};

/// Execute the `kiln new` command.
///
/// 1. Parse and validate the project name / output path
/// 2. Select the profile and build the request
/// 3. Load blueprints and wire the generator
/// 4. Generate (or preview with `--dry-run`)
/// 5. Report in the requested format
#[instrument(skip_all, fields(project = %args.name))]
pub fn execute(
    args: NewArgs,
    global: GlobalArgs,
    config: AppConfig,
    output: OutputManager,
) -> CliResult<()> {
    let (project_name, project_dir) = resolve_project_path(&args.name, args.output.as_deref())?;
    validate_project_name(&project_name)?;

    let profile = select_profile(&config, args.profile.as_deref())?;
    let mut request = build_request(&args, &project_name);

    let (blueprints_dir, registry) =
        load_registry(global.blueprints.clone(), config.blueprints.dir.clone())?;
    debug!(
        dir = %blueprints_dir.display(),
        blueprints = registry.len(),
        profile = %profile.name,
        "Blueprints loaded"
    );

    let init_git = !args.no_git && config.generation.init_git;
    let generator = build_generator(registry, init_git)?;

    match parse_selections(&args) {
        Ok((features, variables)) => {
            request.features = features;
            request.custom_variables.extend(variables);
        }
        Err(err) => {
            // A missing or invalid core field is reported ahead of a bad
            // feature value or variable.
            generator.resolver().resolve(&request, &profile)?;
            return Err(err.into());
        }
    }

    let options = GenerateOptions::new(&project_dir)
        .dry_run(args.dry_run)
        .init_repository(init_git)
        .profile(profile);

    info!(path = %project_dir.display(), dry_run = args.dry_run, "Generation started");
    let spinner = output.spinner(&format!("Generating '{project_name}'..."));
    let result = generator.generate(&request, &options);
    if let Some(spinner) = spinner {
        spinner.finish_and_clear();
    }

    if output.is_json() {
        output
            .json(&result)
            .with_cli_context(|| "failed to write JSON output")?;
        return result.into_result().map(|_| ()).map_err(CliError::from);
    }

    let result = result.into_result()?;
    if args.dry_run {
        report_preview(&project_name, &result, &output)?;
    } else {
        report_created(&project_name, &result, global.verbose > 0, &output)?;
    }
    Ok(())
}

// ── Path resolution ───────────────────────────────────────────────────────────

/// Split `name` into the project name (its last component) and the project
/// directory, placed under `output` when given.
pub fn resolve_project_path(name: &str, output: Option<&Path>) -> CliResult<(String, PathBuf)> {
    let path = Path::new(name);

    let project_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| CliError::InvalidProjectName {
            name: name.into(),
            reason: "cannot extract valid project name".into(),
        })?
        .to_string();

    let project_dir = match output {
        Some(dir) => dir.join(path),
        None => path.to_path_buf(),
    };

    Ok((project_name, project_dir))
}

fn validate_project_name(name: &str) -> CliResult<()> {
    if name.is_empty() {
        return Err(CliError::InvalidProjectName {
            name: name.into(),
            reason: "name cannot be empty".into(),
        });
    }
    if name.starts_with('.') {
        return Err(CliError::InvalidProjectName {
            name: name.into(),
            reason: "name cannot start with '.'".into(),
        });
    }
    if let Some(c) = name
        .chars()
        .find(|c| !(c.is_alphanumeric() || matches!(c, '-' | '_' | '.')))
    {
        return Err(CliError::InvalidProjectName {
            name: name.into(),
            reason: format!("character '{c}' is not allowed"),
        });
    }
    Ok(())
}

// ── Request construction ──────────────────────────────────────────────────────

fn select_profile(config: &AppConfig, requested: Option<&str>) -> CliResult<Profile> {
    config
        .active_profile(requested)
        .map_err(|name| CliError::ProfileNotFound {
            name,
            available: config.profile_names(),
        })
}

/// The request's scalar fields, passed through unparsed for the resolver.
fn build_request(args: &NewArgs, name: &str) -> ProjectRequest {
    ProjectRequest::builder()
        .name(name)
        .module_path(args.module.as_deref().unwrap_or_default())
        .kind(args.kind.as_deref().unwrap_or_default())
        .architecture(args.architecture.as_deref().unwrap_or_default())
        .framework(args.framework.as_deref().unwrap_or_default())
        .runtime_version(args.go_version.as_deref().unwrap_or_default())
        .logger(args.logger.as_deref().unwrap_or_default())
        .author(args.author.as_deref().unwrap_or_default())
        .email(args.email.as_deref().unwrap_or_default())
        .license(args.license.as_deref().unwrap_or_default())
        .build()
}

/// Feature flags and `--var` assignments, parsed against their closed sets.
fn parse_selections(args: &NewArgs) -> Result<(Features, Vec<(String, String)>), ValidationError> {
    let features = build_features(args)?;
    let variables = args
        .vars
        .iter()
        .map(String::as_str)
        .map(parse_variable)
        .collect::<Result<Vec<_>, _>>()?;
    Ok((features, variables))
}

fn build_features(args: &NewArgs) -> Result<Features, ValidationError> {
    let mut features = Features::default();

    let drivers = parse_all::<DatabaseDriver>(&args.databases)?;
    let orm = args.orm.as_deref().map(str::parse::<Orm>).transpose()?;
    if !drivers.is_empty() || orm.is_some() {
        features.database = Some(DatabaseFeature {
            driver: None,
            drivers,
            orm,
        });
    }

    if let Some(auth) = args.auth.as_deref() {
        features.authentication = Some(AuthFeature {
            kind: auth.parse::<AuthType>()?,
            providers: args.auth_providers.clone(),
        });
    }

    if let Some(logger) = args.logger.as_deref() {
        features.logging = Some(LoggingFeature {
            kind: Some(logger.parse::<Logger>()?),
            ..LoggingFeature::default()
        });
    }

    if args.coverage || args.test_framework.is_some() {
        let mut testing = TestingFeature {
            coverage: args.coverage,
            ..TestingFeature::default()
        };
        if let Some(framework) = &args.test_framework {
            testing.framework = framework.clone();
        }
        features.testing = Some(testing);
    }

    let targets = parse_all::<DeploymentTarget>(&args.deploy)?;
    if !targets.is_empty() {
        features.deployment = Some(DeploymentFeature { targets });
    }

    Ok(features)
}

fn parse_all<T>(values: &[String]) -> Result<Vec<T>, ValidationError>
where
    T: std::str::FromStr<Err = ValidationError>,
{
    values.iter().map(|v| v.parse()).collect()
}

/// Split a `KEY=VALUE` assignment. The value may itself contain `=`.
fn parse_variable(input: &str) -> Result<(String, String), ValidationError> {
    match input.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_string(), value.to_string()))
        }
        _ => Err(ValidationError::MalformedVariable {
            input: input.to_string(),
        }),
    }
}

fn build_generator(registry: BlueprintRegistry, init_git: bool) -> CliResult<Generator> {
    let mut builder = Generator::builder(Arc::new(registry))
        .engine(Arc::new(MiniJinjaEngine::new()))
        .filesystem(Arc::new(LocalFilesystem::new()))
        .toolchain(Arc::new(GoToolchainProbe::new()))
        .clock(Arc::new(SystemClock));
    if init_git {
        builder = builder.repository(Arc::new(GitInitializer::new()));
    }
    Ok(builder.build()?)
}

// ── Reporting ─────────────────────────────────────────────────────────────────

fn blueprint_label(result: &GenerationResult) -> &str {
    result.blueprint.as_deref().unwrap_or("unknown blueprint")
}

fn report_preview(name: &str, result: &GenerationResult, out: &OutputManager) -> CliResult<()> {
    out.header(&format!(
        "Dry run: '{name}' from {} would create {} files in {}",
        blueprint_label(result),
        result.preview.len(),
        result.output_path.display(),
    ))
    .with_cli_context(|| "failed to write output")?;

    for file in &result.preview {
        let suffix = if file.executable { ", executable" } else { "" };
        out.detail(&format!("  {}  ({} bytes{suffix})", file.path, file.size))
            .with_cli_context(|| "failed to write output")?;
    }

    out.info("No files were written.")
        .with_cli_context(|| "failed to write output")
}

fn report_created(
    name: &str,
    result: &GenerationResult,
    list_files: bool,
    out: &OutputManager,
) -> CliResult<()> {
    let write = |r: std::io::Result<()>| r.with_cli_context(|| "failed to write output");

    write(out.success(&format!(
        "Created '{name}' from {} ({} files, {} ms)",
        blueprint_label(result),
        result.files_created.len(),
        result.elapsed_ms,
    )))?;

    if list_files {
        for path in &result.files_created {
            write(out.detail(&format!("  {}", path.display())))?;
        }
    }

    for warning in &result.warnings {
        write(out.warning(&format!("{}: {}", warning.step, warning.message)))?;
    }

    write(out.print(""))?;
    write(out.print("Next steps:"))?;
    write(out.print(&format!("  cd {}", result.output_path.display())))?;
    write(out.print("  go mod tidy"))?;
    write(out.print("  go build ./..."))?;
    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────
