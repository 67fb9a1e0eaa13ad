//! Application ports (traits) for external dependencies.
//!
//! In hexagonal architecture, ports define what the application needs from
//! the outside world. Adapters in `kiln-adapters` implement them.
//!
//! ## Port Types
//!
//! - **Driven (Output) Ports**: called by the application, implemented by
//!   infrastructure
//!   - `Filesystem`: single-step file and directory operations
//!   - `TemplateEngine`: template rendering and predicate evaluation
//!   - `ToolchainProbe`: host toolchain version for `auto`
//!   - `RepositoryInitializer`: optional post-generation step
//!   - `Clock`: today's date
//!
//! - **Driving (Input) Ports**: the [`Generator`](crate::application::Generator)
//!   and [`ConfigResolver`](crate::application::ConfigResolver) services.

pub mod output;

pub use output::{Clock, Filesystem, RepositoryInitializer, TemplateEngine, ToolchainProbe};

#[cfg(test)]
pub use output::{
    MockClock, MockFilesystem, MockRepositoryInitializer, MockTemplateEngine, MockToolchainProbe,
};
