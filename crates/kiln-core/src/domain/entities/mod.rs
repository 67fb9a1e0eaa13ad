pub mod blueprint;
pub mod common;
pub mod rendered;
pub mod request;
pub mod resolved;

pub use blueprint::{Blueprint, BlueprintKey};
pub use rendered::RenderedFile;
pub use request::{ProjectRequest, Profile};
pub use resolved::ResolvedConfig;
