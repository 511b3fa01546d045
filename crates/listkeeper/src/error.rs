use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Which kind of entity an id failed to resolve to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    List,
    Item,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityKind::List => f.write_str("List"),
            EntityKind::Item => f.write_str("Item"),
        }
    }
}

/// Coarse classification of a [`StoreError`], cheap to copy into sinks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Validation,
    NotFound,
    Io,
    Parse,
    Other,
}

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("{kind} not found: {id}")]
    NotFound { kind: EntityKind, id: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error in {}: {message}", path.display())]
    Parse { path: PathBuf, message: String },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Runtime error: {0}")]
    Runtime(String),
}

impl StoreError {
    pub fn list_not_found(id: impl Into<String>) -> Self {
        StoreError::NotFound {
            kind: EntityKind::List,
            id: id.into(),
        }
    }

    pub fn item_not_found(id: impl Into<String>) -> Self {
        StoreError::NotFound {
            kind: EntityKind::Item,
            id: id.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            StoreError::Validation(_) => ErrorKind::Validation,
            StoreError::NotFound { .. } => ErrorKind::NotFound,
            StoreError::Io(_) => ErrorKind::Io,
            StoreError::Parse { .. } => ErrorKind::Parse,
            StoreError::Serialization(_) | StoreError::Config(_) | StoreError::Runtime(_) => {
                ErrorKind::Other
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, StoreError>;
