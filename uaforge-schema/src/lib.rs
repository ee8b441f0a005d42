//! # uaforge Schema
//!
//! Binary schema dictionary parsing and type model construction.
//!
//! This crate provides:
//! - XML parsing of binary schema dictionaries into raw type declarations
//! - The two-pass type model builder (enums before structs)
//! - Identifier sanitization shared by every component that makes names

pub mod error;
pub mod model;
pub mod names;
pub mod parser;

pub use error::SchemaParseError;
pub use model::{
    DefaultValue, EnumMember, EnumType, Field, FieldType, ModelEntry, Struct, TypeModel,
};
pub use names::clean_name;
pub use parser::{
    EnumDecl, RawField, StructDecl, TypeDeclaration, parse_declarations, parse_declarations_file,
};
