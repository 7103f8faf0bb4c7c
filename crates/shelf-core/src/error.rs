use crate::ItemId;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// Malformed item shape or engine configuration, rejected before it
    /// reaches the view engine.
    #[error("validation error: {0}")]
    Validation(String),

    #[error("item not found: {0}")]
    NotFound(ItemId),

    /// The renderer asked for a slot outside the ordered view. Indicates a
    /// windowing bug; hosts must not recover from it.
    #[error("render fault: index {index} outside ordered view of {len} items")]
    RenderFault { index: usize, len: usize },

    #[error("invalid backup file: {0}")]
    InvalidBackup(String),

    #[error("unsupported backup version: {0}")]
    UnsupportedVersion(u64),

    #[error("no valid items found in backup")]
    NoValidItems,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
