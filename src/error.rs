use thiserror::Error;

use crate::dom::NodeId;

#[derive(Debug, Error)]
pub enum PageError {
    #[error("node {0} is not an element")]
    NotAnElement(NodeId),

    #[error("cannot insert node {child} under node {parent}")]
    HierarchyRequest { parent: NodeId, child: NodeId },

    #[error("form count field `{field}` holds a non-numeric value {value:?}")]
    InvalidFormCount { field: String, value: String },

    #[error("no element matches `{0}`")]
    UnknownTarget(String),

    #[error("could not find a config directory")]
    NoConfigDir,

    #[error("failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("failed to serialize TOML: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, PageError>;
