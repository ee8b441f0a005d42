//! The shared type catalog.
//!
//! The catalog is the process-wide namespace for generated types and the
//! extension-object registry mapping protocol type identifiers to them.
//! It is constructed once at startup and mutated only through the commit
//! and bind paths below; reads are lock-cheap and may happen from any
//! task. One document's types are committed in a single exclusive write,
//! so two concurrently loaded documents never interleave their entries.

use crate::descriptor::LiveType;
use crate::nodeid::NodeId;
use parking_lot::RwLock;
use std::collections::HashMap;
use tracing::{debug, warn};

#[derive(Default)]
struct CatalogInner {
    types: HashMap<String, LiveType>,
    name_by_id: HashMap<NodeId, String>,
    id_by_name: HashMap<String, NodeId>,
}

/// Shared registry of live types and their protocol identifiers.
#[derive(Default)]
pub struct TypeCatalog {
    inner: RwLock<CatalogInner>,
}

impl TypeCatalog {
    /// Creates an empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Commits a document's freshly materialized types.
    ///
    /// A name already present is overwritten: last write wins, which is
    /// what hot-reloading a changed schema document needs. An overwritten
    /// struct keeps its identifier binding until rebound.
    pub fn commit(&self, types: impl IntoIterator<Item = LiveType>) {
        let mut inner = self.inner.write();
        for lt in types {
            let name = lt.name().to_string();
            if inner.types.insert(name.clone(), lt).is_some() {
                debug!(type_name = %name, "type redefined, keeping latest");
            }
        }
    }

    /// Returns the live type registered under `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<LiveType> {
        self.inner.read().types.get(name).cloned()
    }

    /// Returns true if `name` is registered.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.inner.read().types.contains_key(name)
    }

    /// Associates a protocol type identifier with a registered type so the
    /// wire codec can dispatch extension objects to it.
    ///
    /// Unknown names are logged and ignored: some servers advertise
    /// identity descriptors for types absent from the schema document.
    pub fn bind_identifier(&self, name: &str, type_id: NodeId) {
        let mut inner = self.inner.write();
        if !inner.types.contains_key(name) {
            warn!(type_name = %name, %type_id, "identifier bound to unknown type, ignoring");
            return;
        }
        inner.name_by_id.insert(type_id.clone(), name.to_string());
        inner.id_by_name.insert(name.to_string(), type_id);
    }

    /// Resolves a protocol type identifier to its live type.
    #[must_use]
    pub fn resolve_id(&self, type_id: &NodeId) -> Option<LiveType> {
        let inner = self.inner.read();
        inner
            .name_by_id
            .get(type_id)
            .and_then(|name| inner.types.get(name))
            .cloned()
    }

    /// Returns the identifier bound to `name`, if any.
    #[must_use]
    pub fn identifier_of(&self, name: &str) -> Option<NodeId> {
        self.inner.read().id_by_name.get(name).cloned()
    }

    /// Returns the number of registered types.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.read().types.len()
    }

    /// Returns true if no types are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.read().types.is_empty()
    }

    /// Returns the names of all registered types, unordered.
    #[must_use]
    pub fn type_names(&self) -> Vec<String> {
        self.inner.read().types.keys().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::{EnumDescriptor, StructDescriptor};
    use std::sync::Arc;

    fn enum_type(name: &str, members: &[(&str, i64)]) -> LiveType {
        LiveType::Enum(Arc::new(EnumDescriptor {
            name: name.to_string(),
            members: members
                .iter()
                .map(|(n, v)| (n.to_string(), *v))
                .collect(),
        }))
    }

    fn struct_type(name: &str) -> LiveType {
        LiveType::Struct(Arc::new(StructDescriptor {
            name: name.to_string(),
            fields: Vec::new(),
            option_count: 0,
        }))
    }

    #[test]
    fn test_commit_and_get() {
        let catalog = TypeCatalog::new();
        assert!(catalog.is_empty());
        catalog.commit([enum_type("Color", &[("Red", 0)]), struct_type("Shape")]);
        assert_eq!(catalog.len(), 2);
        assert!(catalog.contains("Color"));
        assert!(catalog.get("Shape").is_some());
        assert!(catalog.get("Missing").is_none());
    }

    #[test]
    fn test_last_write_wins() {
        let catalog = TypeCatalog::new();
        catalog.commit([enum_type("Color", &[("Red", 0)])]);
        catalog.commit([enum_type("Color", &[("Red", 0), ("Green", 1)])]);
        match catalog.get("Color") {
            Some(LiveType::Enum(e)) => assert_eq!(e.members.len(), 2),
            other => panic!("unexpected entry: {other:?}"),
        }
    }

    #[test]
    fn test_bind_and_resolve() {
        let catalog = TypeCatalog::new();
        catalog.commit([struct_type("Shape")]);
        let id = NodeId::numeric(2, 7);
        catalog.bind_identifier("Shape", id.clone());
        assert_eq!(catalog.identifier_of("Shape"), Some(id.clone()));
        assert_eq!(
            catalog.resolve_id(&id).map(|lt| lt.name().to_string()),
            Some("Shape".to_string())
        );
    }

    #[test]
    fn test_bind_unknown_name_does_not_error() {
        let catalog = TypeCatalog::new();
        catalog.bind_identifier("Ghost", NodeId::numeric(2, 9));
        assert!(catalog.identifier_of("Ghost").is_none());
        assert!(catalog.resolve_id(&NodeId::numeric(2, 9)).is_none());
    }
}
