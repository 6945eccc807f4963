//! Errors raised while toggling the symlink

use std::{io, path::PathBuf};
use thiserror::Error;

/// `Result` alias for the toggle routines
pub type Result<T> = std::result::Result<T, ToggleError>;

/// Everything that can stop a toggle invocation.
///
/// A missing entry is not an error: the existence check reports it as
/// `Ok(false)` and the toggle takes the create branch.
#[derive(Error, Debug)]
pub enum ToggleError {
    /// The existence query failed for a reason other than "not found"
    #[error("unknown error querying {}: {source}", path.display())]
    Query {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Creating or removing the link failed
    #[error("failed to {action} {}: {source}", path.display())]
    Mutation {
        action: Mutation,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The host cannot map the vault onto a real filesystem path
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The configured paths cannot be toggled safely
    #[error("invalid path: {0}")]
    InvalidPath(String),

    /// Another toggle is still running
    #[error("a toggle is already in progress")]
    Busy,
}

/// The filesystem mutation a toggle attempted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mutation {
    Create,
    Remove,
}

impl std::fmt::Display for Mutation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Mutation::Create => f.write_str("create symlink"),
            Mutation::Remove => f.write_str("remove"),
        }
    }
}
