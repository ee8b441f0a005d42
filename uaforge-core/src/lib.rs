//! # uaforge Core
//!
//! Core types for dynamic OPC UA structure support.
//!
//! This crate provides:
//! - The protocol value model (`Value`, `NodeId`, `Guid`, builtin types)
//! - Live type descriptors produced by the schema pipeline
//! - The process-wide `TypeCatalog` mapping names and type identifiers
//!   to live types (extension-object dispatch)
//! - A generic structural binary encoder/decoder that interprets
//!   descriptors without any compile-time knowledge of the types

pub mod builtin;
pub mod catalog;
pub mod decoder;
pub mod descriptor;
pub mod encoder;
pub mod error;
pub mod ids;
pub mod nodeid;
pub mod value;

pub use builtin::{BuiltinType, Guid, ua_epoch};
pub use catalog::TypeCatalog;
pub use decoder::{decode_extension_object, decode_struct};
pub use descriptor::{EnumDescriptor, FieldDescriptor, LiveType, StructDescriptor, TypeRef};
pub use encoder::{encode_extension_object, encode_struct};
pub use error::{Error, Result};
pub use nodeid::{Identifier, NodeId};
pub use value::{ExtensionBody, ExtensionObject, LocalizedText, QualifiedName, StructValue, Value};
