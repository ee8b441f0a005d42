//! Error types for core codec and catalog operations.

use thiserror::Error;

/// Core error type for uaforge operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Buffer is too short for the requested operation.
    #[error("buffer too short: required {required} bytes, available {available} bytes")]
    BufferTooShort {
        /// Required buffer size in bytes.
        required: usize,
        /// Available buffer size in bytes.
        available: usize,
    },

    /// Invalid UTF-8 encoding in a string field.
    #[error("invalid UTF-8 in string field '{field}'")]
    InvalidUtf8 {
        /// Field name.
        field: String,
    },

    /// A type identifier has no registered type.
    #[error("no type registered for identifier {type_id}")]
    UnknownTypeId {
        /// The unresolved protocol type identifier.
        type_id: crate::nodeid::NodeId,
    },

    /// A type name has no entry in the catalog.
    #[error("unknown type name '{name}'")]
    UnknownTypeName {
        /// The unresolved type name.
        name: String,
    },

    /// A decoded integer is not a member of the target enum.
    #[error("invalid value {value} for enum '{enum_name}'")]
    InvalidEnumValue {
        /// Enum type name.
        enum_name: String,
        /// Value found on the wire.
        value: i64,
    },

    /// A value does not match the type its descriptor declares.
    #[error("type mismatch in field '{field}': expected {expected}, got {actual}")]
    TypeMismatch {
        /// Field name.
        field: String,
        /// Expected type description.
        expected: String,
        /// Actual value kind.
        actual: &'static str,
    },

    /// Variant payload type byte is not supported.
    #[error("unsupported variant type byte 0x{type_byte:02x}")]
    UnsupportedVariant {
        /// Raw variant type byte.
        type_byte: u8,
    },

    /// A node identifier string does not parse.
    #[error("invalid node identifier '{text}'")]
    InvalidNodeId {
        /// Offending text.
        text: String,
    },

    /// A GUID string does not parse.
    #[error("invalid GUID '{text}'")]
    InvalidGuid {
        /// Offending text.
        text: String,
    },

    /// A length prefix is negative where null is not allowed, or does not
    /// fit in memory.
    #[error("invalid length prefix {length} for {context}")]
    InvalidLength {
        /// Decoded length prefix.
        length: i64,
        /// What was being decoded.
        context: &'static str,
    },
}

/// Result type alias for core operations.
pub type Result<T> = std::result::Result<T, Error>;
