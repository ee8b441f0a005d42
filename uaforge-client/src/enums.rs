//! Enum introspection.
//!
//! Servers expose custom enums as subtypes of the abstract `Enumeration`
//! data type, with member metadata in an `EnumStrings` or `EnumValues`
//! property rather than in a dictionary. This walk picks up the enums the
//! dictionaries never mention.

use crate::error::FetchError;
use crate::source::{EnumMetadata, ReferenceKind, SchemaSource};
use tracing::{debug, warn};
use uaforge_core::ids::ENUMERATION;
use uaforge_core::{NodeId, TypeCatalog};
use uaforge_schema::{EnumMember, EnumType, TypeModel, clean_name};

/// Loads custom enums from the server's `Enumeration` subtree.
///
/// Enums already in the catalog are skipped unless `force` is set. Returns
/// the committed enum names.
///
/// # Errors
/// Returns `FetchError` if browsing or property reads fail.
pub async fn load_enums<S: SchemaSource>(
    source: &S,
    catalog: &TypeCatalog,
    force: bool,
) -> Result<Vec<String>, FetchError> {
    let root = NodeId::numeric(0, ENUMERATION);
    let subtypes = source.children(&root, ReferenceKind::HasSubtype).await?;

    let mut enums = Vec::new();
    for subtype in subtypes {
        // Standard-namespace enums ship with the stack.
        if subtype.node_id.namespace == 0 {
            continue;
        }
        let name = clean_name(&subtype.browse_name.name);
        if !force && catalog.contains(&name) {
            debug!(enum_name = %name, "enum already registered, skipping");
            continue;
        }
        match source.read_enum_metadata(&subtype.node_id).await? {
            Some(metadata) => enums.push(EnumType {
                members: members_from(&metadata),
                name,
            }),
            None => {
                warn!(enum_name = %name, "enum exposes no member metadata, skipping");
            }
        }
    }

    if enums.is_empty() {
        return Ok(Vec::new());
    }
    let model = TypeModel::from_enum_types(enums);
    Ok(uaforge_codegen::materialize(&model, catalog)?)
}

/// Turns one metadata property into ordered members.
fn members_from(metadata: &EnumMetadata) -> Vec<EnumMember> {
    match metadata {
        // EnumStrings carries names only; the position is the value.
        EnumMetadata::Strings(texts) => texts
            .iter()
            .enumerate()
            .map(|(value, text)| EnumMember {
                name: clean_name(text.text.as_deref().unwrap_or_default()),
                value: value as i64,
            })
            .collect(),
        EnumMetadata::Values(pairs) => pairs
            .iter()
            .map(|(value, name)| EnumMember {
                name: clean_name(name),
                value: *value,
            })
            .collect(),
    }
}
