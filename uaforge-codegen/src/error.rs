//! Error types for code emission and materialization.

use thiserror::Error;

/// Error type for code generation and type materialization.
#[derive(Debug, Error)]
pub enum GenerationError {
    /// Schema parsing or model building error.
    #[error("schema error: {0}")]
    Schema(#[from] uaforge_schema::SchemaParseError),

    /// Materialization failure for one generated type.
    ///
    /// Carries the emitted source of the failing type so the problem can be
    /// inspected without re-running the pipeline.
    #[error("failed to materialize type '{type_name}': {message}")]
    Materialize {
        /// Name of the failing type.
        type_name: String,
        /// What went wrong.
        message: String,
        /// Emitted source text of the failing type.
        source_code: String,
    },

    /// Codec-level error while registering types.
    #[error("codec error: {0}")]
    Core(#[from] uaforge_core::Error),

    /// IO error writing generated code.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl GenerationError {
    /// Creates a materialization error.
    pub fn materialize(
        type_name: impl Into<String>,
        message: impl Into<String>,
        source_code: impl Into<String>,
    ) -> Self {
        Self::Materialize {
            type_name: type_name.into(),
            message: message.into(),
            source_code: source_code.into(),
        }
    }
}
