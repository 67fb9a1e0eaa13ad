//! Infrastructure adapters for Kiln.
//!
//! This crate implements the ports defined in `kiln_core::application::ports`
//! and owns every piece of real I/O: the filesystem, the template engine,
//! blueprint loading from disk, the host toolchain probe and git.

pub mod blueprint_loader;
pub mod builtin_blueprints;
pub mod clock;
pub mod engine;
pub mod filesystem;
pub mod git;
pub mod toolchain;

// Re-export commonly used adapters
pub use blueprint_loader::BlueprintLoader;
pub use builtin_blueprints::{discover, load_registry};
pub use clock::{FixedClock, SystemClock};
pub use engine::MiniJinjaEngine;
pub use filesystem::{LocalFilesystem, MemoryFilesystem};
pub use git::GitInitializer;
pub use toolchain::GoToolchainProbe;
