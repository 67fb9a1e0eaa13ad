use std::collections::BTreeMap;

use serde::Serialize;

use crate::domain::{
    entities::request::Features, validation::ToolchainVersion, value_objects::Logger,
};

/// A request after tier merging and validation.
///
/// Required fields are non-empty; the toolchain is concrete (never `auto`)
/// and inside the supported window. Blueprint axes stay as normalised
/// strings so that unknown values surface as lookup failures naming the
/// axis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedConfig {
    pub name: String,
    pub module_path: String,
    pub kind: String,
    pub architecture: String,
    pub framework: Option<String>,
    #[serde(serialize_with = "serialize_display")]
    pub toolchain: ToolchainVersion,
    pub logger: Logger,
    pub author: String,
    pub email: String,
    pub license: String,
    pub custom_variables: BTreeMap<String, String>,
    pub features: Features,
}

fn serialize_display<S: serde::Serializer>(
    value: &ToolchainVersion,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.collect_str(value)
}
