//! Application layer for Kiln.
//!
//! This layer contains:
//! - **Services**: use case orchestration (`Generator` and the resolver,
//!   compiler and writer it drives)
//! - **Ports**: interface definitions (traits) for external dependencies
//! - **Errors**: rendering, filesystem and adapter failures
//!
//! Business rules (merging tiers aside) live in `crate::domain`; this layer
//! sequences them and owns every side effect through the ports.

pub mod error;
pub mod ports;
pub mod services;

pub use services::{
    BlueprintCompiler, ConfigResolver, GenerateOptions, GenerationResult, Generator,
    GeneratorBuilder, TransactionalWriter,
};

pub use ports::{Clock, Filesystem, RepositoryInitializer, TemplateEngine, ToolchainProbe};

pub use error::{
    FileSystemError, FsOperation, PostStepError, PostStepWarning, RenderError, RollbackFailure,
    ToolchainError,
};
