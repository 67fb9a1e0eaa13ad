//! Generation orchestrator - the main use case.
//!
//! This service coordinates one generation:
//! 1. Resolve the request against the profile and defaults
//! 2. Look up the blueprint
//! 3. Validate blueprint variables
//! 4. Build the render context
//! 5. Compile every file in memory
//! 6. Commit transactionally (skipped for a dry run)
//! 7. Run optional post-steps
//!
//! Failures in steps 1-6 leave the output root exactly as it was. A post-step
//! failure is reported as a warning on an otherwise successful result.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use serde::Serialize;
use tracing::{info, instrument, warn};

use crate::application::{
    error::PostStepWarning,
    ports::{Clock, Filesystem, RepositoryInitializer, TemplateEngine, ToolchainProbe},
    services::{BlueprintCompiler, ConfigResolver, TransactionalWriter},
};
use crate::domain::{
    BlueprintRegistry, NO_FRAMEWORK, Profile, ProjectRequest, RenderContext, RenderedFile,
};
use crate::error::{KilnError, KilnResult};

/// Per-call knobs.
#[derive(Debug, Clone, Default)]
pub struct GenerateOptions {
    /// Directory the project is written into. Created if missing.
    pub output_root: PathBuf,
    /// Compile everything but write nothing.
    pub dry_run: bool,
    /// Run the repository initializer after a successful commit.
    pub init_repository: bool,
    /// Current profile; `None` means the empty profile.
    pub profile: Option<Profile>,
}

impl GenerateOptions {
    pub fn new(output_root: impl Into<PathBuf>) -> Self {
        Self {
            output_root: output_root.into(),
            ..Self::default()
        }
    }

    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn init_repository(mut self, init: bool) -> Self {
        self.init_repository = init;
        self
    }

    pub fn profile(mut self, profile: Profile) -> Self {
        self.profile = Some(profile);
        self
    }
}

/// Outcome of one [`Generator::generate`] call.
#[derive(Debug, Clone, Serialize)]
pub struct GenerationResult {
    pub success: bool,
    pub output_path: PathBuf,
    /// `id@version` of the blueprint used, once lookup succeeded.
    pub blueprint: Option<String>,
    pub elapsed_ms: u64,
    /// Paths written, relative to `output_path`. Empty for a dry run.
    pub files_created: Vec<PathBuf>,
    /// Files that would be written. Only populated for a dry run.
    pub preview: Vec<RenderedFile>,
    pub warnings: Vec<PostStepWarning>,
    pub error: Option<KilnError>,
}

impl GenerationResult {
    pub fn is_dry_run(&self) -> bool {
        self.success && self.files_created.is_empty() && !self.preview.is_empty()
    }

    /// The error, if the call failed.
    pub fn into_result(self) -> KilnResult<Self> {
        match self.error.clone() {
            Some(err) => Err(err),
            None => Ok(self),
        }
    }
}

struct Outcome {
    files_created: Vec<PathBuf>,
    preview: Vec<RenderedFile>,
    warnings: Vec<PostStepWarning>,
}

/// Runs generations against one registry and one set of adapters.
///
/// `Generator` is `Send + Sync` and holds no per-call state, so one instance
/// can serve concurrent calls. Calls targeting the *same* output root are not
/// coordinated: each transaction only tracks its own mutations, so callers
/// must serialize such calls themselves.
pub struct Generator {
    registry: Arc<BlueprintRegistry>,
    resolver: ConfigResolver,
    compiler: BlueprintCompiler,
    writer: TransactionalWriter,
    clock: Arc<dyn Clock>,
    repository: Option<Arc<dyn RepositoryInitializer>>,
}

impl Generator {
    pub fn builder(registry: Arc<BlueprintRegistry>) -> GeneratorBuilder {
        GeneratorBuilder::new(registry)
    }

    pub fn registry(&self) -> &BlueprintRegistry {
        &self.registry
    }

    pub fn resolver(&self) -> &ConfigResolver {
        &self.resolver
    }

    /// Generate a project. Never panics on bad input; every failure is
    /// reported through [`GenerationResult::error`].
    #[instrument(
        skip_all,
        fields(
            project = %request.name.trim(),
            output = %options.output_root.display(),
            dry_run = options.dry_run
        )
    )]
    pub fn generate(&self, request: &ProjectRequest, options: &GenerateOptions) -> GenerationResult {
        let started = Instant::now();
        let mut blueprint_label = None;

        let outcome = self.run(request, options, &mut blueprint_label);
        let elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);

        match outcome {
            Ok(outcome) => {
                info!(
                    files = outcome.files_created.len(),
                    preview = outcome.preview.len(),
                    elapsed_ms,
                    "Generation completed"
                );
                GenerationResult {
                    success: true,
                    output_path: options.output_root.clone(),
                    blueprint: blueprint_label,
                    elapsed_ms,
                    files_created: outcome.files_created,
                    preview: outcome.preview,
                    warnings: outcome.warnings,
                    error: None,
                }
            }
            Err(err) => {
                warn!(code = %err.code(), error = %err, "Generation failed");
                GenerationResult {
                    success: false,
                    output_path: options.output_root.clone(),
                    blueprint: blueprint_label,
                    elapsed_ms,
                    files_created: Vec::new(),
                    preview: Vec::new(),
                    warnings: Vec::new(),
                    error: Some(err),
                }
            }
        }
    }

    fn run(
        &self,
        request: &ProjectRequest,
        options: &GenerateOptions,
        blueprint_label: &mut Option<String>,
    ) -> KilnResult<Outcome> {
        let empty = Profile::empty();
        let profile = options.profile.as_ref().unwrap_or(&empty);

        let resolved = self.resolver.resolve(request, profile)?;

        let blueprint = self.registry.lookup(
            &resolved.kind,
            &resolved.architecture,
            Some(resolved.framework.as_deref().unwrap_or(NO_FRAMEWORK)),
        )?;
        *blueprint_label = Some(blueprint.label());
        info!(blueprint = %blueprint.label(), "Blueprint resolved");

        blueprint.validate_variables(&resolved.custom_variables)?;

        let context = RenderContext::build(&resolved, &blueprint, self.clock.today());
        let files = self.compiler.compile(&context, &blueprint)?;

        if options.dry_run {
            info!(files = files.len(), "Dry run, nothing written");
            return Ok(Outcome {
                files_created: Vec::new(),
                preview: files,
                warnings: Vec::new(),
            });
        }

        let files_created = self.writer.commit(&options.output_root, &files)?;

        let mut warnings = Vec::new();
        if options.init_repository {
            if let Some(warning) = self.init_repository(&options.output_root) {
                warnings.push(warning);
            }
        }

        Ok(Outcome {
            files_created,
            preview: Vec::new(),
            warnings,
        })
    }

    fn init_repository(&self, root: &Path) -> Option<PostStepWarning> {
        let repository = self.repository.as_ref()?;
        match repository.init(root) {
            Ok(()) => {
                info!(root = %root.display(), "Repository initialized");
                None
            }
            Err(e) => {
                warn!(error = %e, "Repository initialization failed");
                Some(PostStepWarning {
                    step: "repository-init".into(),
                    message: e.message,
                })
            }
        }
    }
}

// ── Builder ──────────────────────────────────────────────────────────────────

/// Wires adapters into a [`Generator`].
pub struct GeneratorBuilder {
    registry: Arc<BlueprintRegistry>,
    engine: Option<Arc<dyn TemplateEngine>>,
    filesystem: Option<Arc<dyn Filesystem>>,
    toolchain: Option<Arc<dyn ToolchainProbe>>,
    clock: Option<Arc<dyn Clock>>,
    repository: Option<Arc<dyn RepositoryInitializer>>,
}

impl GeneratorBuilder {
    fn new(registry: Arc<BlueprintRegistry>) -> Self {
        Self {
            registry,
            engine: None,
            filesystem: None,
            toolchain: None,
            clock: None,
            repository: None,
        }
    }

    pub fn engine(mut self, engine: Arc<dyn TemplateEngine>) -> Self {
        self.engine = Some(engine);
        self
    }

    pub fn filesystem(mut self, filesystem: Arc<dyn Filesystem>) -> Self {
        self.filesystem = Some(filesystem);
        self
    }

    pub fn toolchain(mut self, toolchain: Arc<dyn ToolchainProbe>) -> Self {
        self.toolchain = Some(toolchain);
        self
    }

    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    pub fn repository(mut self, repository: Arc<dyn RepositoryInitializer>) -> Self {
        self.repository = Some(repository);
        self
    }

    /// # Errors
    ///
    /// [`KilnError::Configuration`] when a required adapter is missing.
    pub fn build(self) -> KilnResult<Generator> {
        fn required<T: ?Sized>(value: Option<Arc<T>>, name: &str) -> KilnResult<Arc<T>> {
            value.ok_or_else(|| {
                KilnError::configuration(format!("required adapter not configured: {name}"))
            })
        }

        let engine = required(self.engine, "template engine")?;
        let filesystem = required(self.filesystem, "filesystem")?;
        let toolchain = required(self.toolchain, "toolchain probe")?;
        let clock = required(self.clock, "clock")?;

        Ok(Generator {
            registry: self.registry,
            resolver: ConfigResolver::new(toolchain),
            compiler: BlueprintCompiler::new(engine),
            writer: TransactionalWriter::new(filesystem),
            clock,
            repository: self.repository,
        })
    }
}
