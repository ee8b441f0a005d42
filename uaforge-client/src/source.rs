//! Abstraction over the server address space.
//!
//! The fetcher and enum introspector only need four primitives from a
//! connected session: read a dictionary blob, browse typed references,
//! resolve a description node to its encoding identifier, and read enum
//! metadata properties. Implementing [`SchemaSource`] on a session type
//! plugs a live connection in; tests use in-memory sources.

use crate::error::FetchError;
use async_trait::async_trait;
use uaforge_core::ids::references;
use uaforge_core::{LocalizedText, NodeId, QualifiedName};

/// A browsed node, as much of it as the pipeline needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeDescription {
    /// The node's identifier.
    pub node_id: NodeId,
    /// The node's browse name.
    pub browse_name: QualifiedName,
}

impl NodeDescription {
    /// Creates a node description.
    pub fn new(node_id: NodeId, browse_name: QualifiedName) -> Self {
        Self {
            node_id,
            browse_name,
        }
    }
}

/// Reference types the pipeline browses along.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferenceKind {
    /// `HasComponent`, containers to their parts.
    HasComponent,
    /// `HasProperty`, nodes to their property variables.
    HasProperty,
    /// `HasSubtype`, types to their subtypes.
    HasSubtype,
}

impl ReferenceKind {
    /// Numeric identifier of the reference type in the standard namespace.
    #[must_use]
    pub const fn type_id(&self) -> u32 {
        match self {
            Self::HasComponent => references::HAS_COMPONENT,
            Self::HasProperty => references::HAS_PROPERTY,
            Self::HasSubtype => references::HAS_SUBTYPE,
        }
    }
}

/// Member metadata read from an enum data type node.
#[derive(Debug, Clone, PartialEq)]
pub enum EnumMetadata {
    /// `EnumStrings`: member names by position, the position is the value.
    Strings(Vec<LocalizedText>),
    /// `EnumValues`: explicit (value, name) pairs.
    Values(Vec<(i64, String)>),
}

/// Read access to the parts of a server address space the type pipeline
/// walks.
#[async_trait]
pub trait SchemaSource: Send + Sync {
    /// Reads the raw XML of a dictionary node's value.
    async fn read_dictionary(&self, node: &NodeId) -> Result<String, FetchError>;

    /// Browses forward references of `kind` from `node`.
    async fn children(
        &self,
        node: &NodeId,
        kind: ReferenceKind,
    ) -> Result<Vec<NodeDescription>, FetchError>;

    /// Resolves a data type description node to the identifier of its
    /// binary encoding node, when the server exposes one.
    async fn type_identifier(&self, description: &NodeId) -> Result<Option<NodeId>, FetchError>;

    /// Reads the `EnumStrings` or `EnumValues` property of an enum data
    /// type node, when present.
    async fn read_enum_metadata(&self, node: &NodeId) -> Result<Option<EnumMetadata>, FetchError>;
}
