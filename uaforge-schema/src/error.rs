//! Error types for schema parsing and model construction.

use thiserror::Error;

/// Error type for schema dictionary parsing and type model building.
#[derive(Debug, Error)]
pub enum SchemaParseError {
    /// XML parsing error.
    #[error("XML parsing error: {0}")]
    Xml(#[from] quick_xml::Error),

    /// Missing required attribute.
    #[error("missing required attribute '{attribute}' on element '{element}'")]
    MissingAttribute {
        /// Element name.
        element: String,
        /// Attribute name.
        attribute: String,
    },

    /// Invalid attribute value.
    #[error("invalid value '{value}' for attribute '{attribute}' on element '{element}'")]
    InvalidAttribute {
        /// Element name.
        element: String,
        /// Attribute name.
        attribute: String,
        /// Invalid value.
        value: String,
    },

    /// A field references a type that is neither builtin nor modeled yet.
    #[error("unknown type '{type_name}' referenced by field '{field}' of struct '{struct_name}'")]
    UnknownType {
        /// Referenced type name.
        type_name: String,
        /// Field name.
        field: String,
        /// Enclosing struct name.
        struct_name: String,
    },

    /// More mask-guarded fields than the u32 encoding mask can address.
    #[error("struct '{struct_name}' declares {count} optional fields, the encoding mask holds at most 32")]
    TooManyOptionalFields {
        /// Enclosing struct name.
        struct_name: String,
        /// Declared optional field count.
        count: usize,
    },

    /// IO error reading a schema file.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// UTF-8 decoding error.
    #[error("UTF-8 error: {0}")]
    Utf8(#[from] std::str::Utf8Error),
}

impl SchemaParseError {
    /// Creates a missing attribute error.
    pub fn missing_attr(element: impl Into<String>, attribute: impl Into<String>) -> Self {
        Self::MissingAttribute {
            element: element.into(),
            attribute: attribute.into(),
        }
    }

    /// Creates an invalid attribute error.
    pub fn invalid_attr(
        element: impl Into<String>,
        attribute: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self::InvalidAttribute {
            element: element.into(),
            attribute: attribute.into(),
            value: value.into(),
        }
    }

    /// Creates an unknown type error.
    pub fn unknown_type(
        type_name: impl Into<String>,
        field: impl Into<String>,
        struct_name: impl Into<String>,
    ) -> Self {
        Self::UnknownType {
            type_name: type_name.into(),
            field: field.into(),
            struct_name: struct_name.into(),
        }
    }
}
