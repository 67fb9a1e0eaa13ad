//! Core domain layer for Kiln.
//!
//! Pure data and rules: closed value sets, requests, blueprints, the
//! registry and the render context. Nothing in here touches the filesystem,
//! the process environment or a template engine; those sit behind the
//! ports in [`crate::application::ports`].

pub mod context;
pub mod entities;
pub mod error;
pub mod registry;
pub mod validation;
pub mod value_objects;

pub use context::RenderContext;
pub use entities::{
    Blueprint, BlueprintKey, Profile, ProjectRequest, RenderedFile, ResolvedConfig,
    blueprint::{BlueprintBuilder, BlueprintMetadata, FileContent, FileSpec, VariableSpec},
    common::{PathViolation, RelativePath},
    request::{
        AuthFeature, DatabaseFeature, DeploymentFeature, Features, Identity, LoggingFeature,
        ProfileDefaults, ProjectRequestBuilder, TestingFeature,
    },
};
pub use error::{BlueprintError, BlueprintNotFound, LookupAxis, ValidationError};
pub use registry::{BlueprintRegistry, BlueprintSummary, NO_FRAMEWORK};
pub use validation::{AUTO_TOOLCHAIN, MAX_TOOLCHAIN, MIN_TOOLCHAIN, ToolchainVersion};
pub use value_objects::{
    Architecture, AuthType, Axis, DatabaseDriver, DeploymentTarget, Framework, Logger, Orm,
    ProjectKind,
};
