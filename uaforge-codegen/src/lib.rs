//! # uaforge Codegen
//!
//! Code emission and type materialization for uaforge.
//!
//! This crate provides:
//! - Rust source emission for modeled enums and structures
//! - All-or-nothing materialization of models into a type catalog
//! - File output for generated definitions

pub mod emit;
pub mod error;
pub mod materialize;

pub use emit::{CodeEmitter, save_to_file, to_snake_case};
pub use error::GenerationError;
pub use materialize::materialize;

use uaforge_core::TypeCatalog;
use uaforge_schema::TypeModel;

/// Generates Rust definitions from a schema dictionary string.
///
/// # Arguments
/// * `xml` - Binary schema dictionary content
///
/// # Returns
/// Generated Rust code as a string.
///
/// # Errors
/// Returns `GenerationError` if parsing or model building fails.
pub fn generate_from_xml(xml: &str) -> Result<String, GenerationError> {
    let model = TypeModel::from_xml(xml)?;
    Ok(CodeEmitter::new(&model).emit_module())
}

/// Generates Rust definitions from a schema dictionary file.
///
/// # Errors
/// Returns `GenerationError` if reading, parsing, or model building fails.
pub fn generate_from_file(path: &std::path::Path) -> Result<String, GenerationError> {
    let xml = std::fs::read_to_string(path)?;
    generate_from_xml(&xml)
}

/// Parses, models and materializes a dictionary in one step.
///
/// Foreign type references resolve through `catalog`, which also receives
/// the committed types. Returns the committed type names.
///
/// # Errors
/// Returns `GenerationError` if parsing, modeling or materialization fails.
pub fn load_from_xml(
    xml: &str,
    catalog: &TypeCatalog,
) -> Result<Vec<String>, GenerationError> {
    let model = TypeModel::from_xml_in(xml, catalog)?;
    materialize(&model, catalog)
}
