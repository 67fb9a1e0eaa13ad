//! Kiln Core - Hexagonal Architecture Implementation
//!
//! This crate provides the domain and application layers of the Kiln
//! project generator, following hexagonal (ports and adapters) architecture.
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │             kiln-cli (CLI)              │
//! │      (builds requests, prints results)  │
//! └──────────────────┬──────────────────────┘
//!                    │ calls
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │          Application Services           │
//! │ Generator → Resolver → Compiler → Writer│
//! └──────────────────┬──────────────────────┘
//!                    │ uses
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │        Application Ports (Traits)       │
//! │ Filesystem, TemplateEngine, Toolchain,  │
//! │      RepositoryInitializer, Clock       │
//! └──────────────────┬──────────────────────┘
//!                    │ implemented by
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │     kiln-adapters (Infrastructure)      │
//! │ LocalFilesystem, MiniJinjaEngine, git2  │
//! └─────────────────────────────────────────┘
//!
//! ┌─────────────────────────────────────────┐
//! │        Domain Layer (Pure Logic)        │
//! │ Request, Blueprint, Registry, Context   │
//! └─────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use kiln_core::prelude::*;
//!
//! let generator = Generator::builder(registry)
//!     .engine(engine)
//!     .filesystem(filesystem)
//!     .toolchain(toolchain)
//!     .clock(clock)
//!     .build()?;
//!
//! let request = ProjectRequest::builder()
//!     .name("orders")
//!     .module_path("github.com/acme/orders")
//!     .kind("web-api")
//!     .framework("gin")
//!     .build();
//!
//! let result = generator.generate(&request, &GenerateOptions::new("./orders"));
//! assert!(result.success);
//! ```

pub mod application;
pub mod domain;
pub mod error;

/// Everything a caller needs to wire and run a generation.
pub mod prelude {
    pub use crate::application::{
        GenerateOptions, GenerationResult, Generator, GeneratorBuilder,
        ports::{Clock, Filesystem, RepositoryInitializer, TemplateEngine, ToolchainProbe},
    };
    pub use crate::domain::{
        Blueprint, BlueprintRegistry, Features, Profile, ProjectRequest, RenderContext,
        RenderedFile,
    };
    pub use crate::error::{ErrorCode, KilnError, KilnResult};
}

// Version info
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
