//! Application services: the use cases, wired over the ports.

pub mod compiler;
pub mod generator;
pub mod resolver;
pub mod writer;

pub use compiler::{BlueprintCompiler, TEMPLATE_SUFFIX};
pub use generator::{GenerateOptions, GenerationResult, Generator, GeneratorBuilder};
pub use resolver::{BuiltinDefaults, ConfigResolver};
pub use writer::{FsAction, GenerationTransaction, PlannedEntry, TransactionalWriter};
