//! Type materialization.
//!
//! Turns a built model into live descriptors and commits them to a catalog.
//! Commit is all-or-nothing per model: every type is staged and validated
//! first, and nothing becomes visible if any type fails. Failures carry the
//! emitted source of the offending type.

use crate::emit::CodeEmitter;
use crate::error::GenerationError;
use std::collections::HashSet;
use tracing::info;
use uaforge_core::{TypeCatalog, TypeRef};
use uaforge_schema::{ModelEntry, TypeModel};

/// Materializes every type of a model into the catalog.
///
/// Returns the committed type names in declaration order. Encoding node
/// identifiers recorded on the model are bound after the commit.
///
/// # Errors
/// Returns `GenerationError::Materialize` if any type fails validation; the
/// catalog is left untouched in that case.
pub fn materialize(
    model: &TypeModel,
    catalog: &TypeCatalog,
) -> Result<Vec<String>, GenerationError> {
    validate(model, catalog)?;

    let mut names = Vec::with_capacity(model.len());
    catalog.commit(model.iter().map(|entry| {
        names.push(entry.name().to_string());
        entry.live_type()
    }));

    for entry in model.iter() {
        if let ModelEntry::Struct(s) = entry
            && let Some(type_id) = &s.type_id
        {
            catalog.bind_identifier(&s.name, type_id.clone());
        }
    }

    info!(types = names.len(), "materialized model into catalog");
    Ok(names)
}

/// Validates a model against its staged names and the target catalog.
fn validate(model: &TypeModel, catalog: &TypeCatalog) -> Result<(), GenerationError> {
    let staged: HashSet<&str> = model.iter().map(ModelEntry::name).collect();
    let emitter = CodeEmitter::new(model);

    for entry in model.iter() {
        match entry {
            ModelEntry::Enum(e) => {
                if e.members.is_empty() {
                    return Err(GenerationError::materialize(
                        &e.name,
                        "enum declares no members",
                        emitter.emit_enum(e),
                    ));
                }
            }
            ModelEntry::Struct(s) => {
                for field in &s.fields {
                    if let TypeRef::Named(name) = field.field_type.type_ref()
                        && !staged.contains(name.as_str())
                        && !catalog.contains(&name)
                    {
                        return Err(GenerationError::materialize(
                            &s.name,
                            format!("field '{}' references unknown type '{name}'", field.name),
                            emitter.emit_struct(s),
                        ));
                    }
                }
            }
        }
    }
    Ok(())
}
