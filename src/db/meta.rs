//! On-disk formats written next to and into asset files.

use serde::{Deserialize, Serialize};

use crate::core::Guid;

pub(crate) const META_SUFFIX: &str = ".meta";

/// Where the content of an entry comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Origin {
    /// Serialized by the database itself.
    Native,
    /// Imported from a file in some other format.
    Foreign,
}

/// The `.meta` sidecar that keeps an entry's guid stable across imports.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(crate) struct MetaFile {
    pub guid: Guid,
    pub origin: Origin,
}

/// The file written for a native asset.
#[derive(Debug, Serialize)]
pub(crate) struct NativeDocument {
    #[serde(rename = "type")]
    pub type_name: String,
    pub guid: Guid,
    pub data: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub sub_objects: Vec<SubObject>,
}

#[derive(Debug, Serialize)]
pub(crate) struct SubObject {
    #[serde(rename = "type")]
    pub type_name: String,
    pub data: String,
}
