//! Error types for remote schema fetching.

use thiserror::Error;

/// Error type for fetching and registering remote type definitions.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Reading a node or browsing references failed.
    #[error("address space read failed at {node}: {message}")]
    Read {
        /// Node the read targeted, in string form.
        node: String,
        /// What the server or transport reported.
        message: String,
    },

    /// Dictionary parsing or model building failed.
    #[error("schema error: {0}")]
    Schema(#[from] uaforge_schema::SchemaParseError),

    /// Materialization failed.
    #[error("generation error: {0}")]
    Generation(#[from] uaforge_codegen::GenerationError),

    /// Codec-level failure.
    #[error("codec error: {0}")]
    Core(#[from] uaforge_core::Error),
}

impl FetchError {
    /// Creates a read error for a node.
    pub fn read(node: impl ToString, message: impl Into<String>) -> Self {
        Self::Read {
            node: node.to_string(),
            message: message.into(),
        }
    }
}
