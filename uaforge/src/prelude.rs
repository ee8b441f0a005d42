//! Prelude module for convenient imports.
//!
//! This module re-exports the most commonly used types and traits.
//!
//! ```ignore
//! use uaforge::prelude::*;
//! ```

// Core types
pub use uaforge_core::{
    BuiltinType, EnumDescriptor, Error as CoreError, ExtensionBody, ExtensionObject,
    FieldDescriptor, Guid, Identifier, LiveType, LocalizedText, NodeId, QualifiedName,
    Result as CoreResult, StructDescriptor, StructValue, TypeCatalog, TypeRef, Value,
    decode_extension_object, decode_struct, encode_extension_object, encode_struct,
};

// Schema types
pub use uaforge_schema::{
    EnumType, Field, FieldType, ModelEntry, SchemaParseError, Struct, TypeModel, clean_name,
};

// Codegen types
pub use uaforge_codegen::{CodeEmitter, GenerationError, materialize, save_to_file};

// Client types
pub use uaforge_client::{
    EnumMetadata, FetchError, FetchOutcome, FetchPolicy, NodeDescription, ReferenceKind,
    SchemaSource, TypeFetcher, load_enums, load_type_definitions,
};
