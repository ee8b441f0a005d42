//! Remote type definition fetching.
//!
//! Walks the server's `OPC Binary` type system, pulls every non-standard
//! dictionary, builds and materializes a model per dictionary, and binds
//! the encoding node identifiers discovered next to each dictionary.
//! Materialization stays all-or-nothing per dictionary; whether one broken
//! dictionary stops the walk is a policy choice.

use crate::error::FetchError;
use crate::source::{ReferenceKind, SchemaSource};
use tracing::{info, warn};
use uaforge_core::ids::OPC_BINARY_TYPE_SYSTEM;
use uaforge_core::{NodeId, TypeCatalog};
use uaforge_schema::{ModelEntry, TypeModel, clean_name};

/// The server's own dictionary, never fetched.
const STANDARD_DICTIONARY: &str = "Opc.Ua";

/// What to do when one dictionary fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FetchPolicy {
    /// Record the failure and keep going with the remaining dictionaries.
    #[default]
    ContinueOnError,
    /// Stop at the first failing dictionary.
    AbortOnError,
}

/// Result of one fetch pass.
#[derive(Debug, Default)]
pub struct FetchOutcome {
    /// Built models by dictionary browse name, committed ones only.
    pub models: Vec<(String, TypeModel)>,
    /// All committed type names, in registration order.
    pub types: Vec<String>,
    /// Failed dictionaries as (browse name, error) pairs.
    pub failures: Vec<(String, String)>,
}

/// Fetches remote type definitions into a catalog.
pub struct TypeFetcher<'a, S: SchemaSource> {
    source: &'a S,
    catalog: &'a TypeCatalog,
    policy: FetchPolicy,
    nodes: Option<Vec<NodeId>>,
}

impl<'a, S: SchemaSource> TypeFetcher<'a, S> {
    /// Creates a fetcher with the default policy.
    pub fn new(source: &'a S, catalog: &'a TypeCatalog) -> Self {
        Self {
            source,
            catalog,
            policy: FetchPolicy::default(),
            nodes: None,
        }
    }

    /// Sets the failure policy.
    #[must_use]
    pub fn with_policy(mut self, policy: FetchPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Restricts the fetch to the given dictionary nodes.
    #[must_use]
    pub fn with_nodes(mut self, nodes: Vec<NodeId>) -> Self {
        self.nodes = Some(nodes);
        self
    }

    /// Runs one fetch pass over every non-standard dictionary.
    ///
    /// # Errors
    /// Returns the first dictionary's error under
    /// [`FetchPolicy::AbortOnError`]; browse failures at the type-system
    /// root are errors under either policy.
    pub async fn fetch(&self) -> Result<FetchOutcome, FetchError> {
        let root = NodeId::numeric(0, OPC_BINARY_TYPE_SYSTEM);
        let dictionaries = self
            .source
            .children(&root, ReferenceKind::HasComponent)
            .await?;

        let mut outcome = FetchOutcome::default();
        for dictionary in dictionaries {
            let name = dictionary.browse_name.name.clone();
            if name == STANDARD_DICTIONARY {
                continue;
            }
            if let Some(wanted) = &self.nodes
                && !wanted.contains(&dictionary.node_id)
            {
                continue;
            }
            match self.fetch_dictionary(&dictionary.node_id).await {
                Ok((model, mut types)) => {
                    outcome.types.append(&mut types);
                    outcome.models.push((name, model));
                }
                Err(e) => match self.policy {
                    FetchPolicy::AbortOnError => return Err(e),
                    FetchPolicy::ContinueOnError => {
                        warn!(dictionary = %name, error = %e, "skipping broken dictionary");
                        outcome.failures.push((name, e.to_string()));
                    }
                },
            }
        }

        info!(
            types = outcome.types.len(),
            dictionaries = outcome.models.len(),
            failed = outcome.failures.len(),
            "fetched remote type definitions"
        );
        Ok(outcome)
    }

    /// Fetches, models, id-binds and materializes one dictionary.
    async fn fetch_dictionary(
        &self,
        dictionary: &NodeId,
    ) -> Result<(TypeModel, Vec<String>), FetchError> {
        let xml = self.source.read_dictionary(dictionary).await?;
        let mut model = TypeModel::from_xml_in(&xml, self.catalog)?;

        // Description nodes next to the dictionary carry the browse names
        // of the structures it declares; each resolves to an encoding node.
        let descriptions = self
            .source
            .children(dictionary, ReferenceKind::HasComponent)
            .await?;
        for description in descriptions {
            let type_name = clean_name(&description.browse_name.name);
            match model.get(&type_name) {
                Some(ModelEntry::Struct(_)) => {
                    match self.source.type_identifier(&description.node_id).await? {
                        Some(type_id) => {
                            model.set_typeid(&type_name, type_id);
                        }
                        None => {
                            warn!(type_name = %type_name, "description without encoding node");
                        }
                    }
                }
                _ => {
                    warn!(
                        type_name = %type_name,
                        "description matches no declared structure, skipping"
                    );
                }
            }
        }

        let types = uaforge_codegen::materialize(&model, self.catalog)?;
        Ok((model, types))
    }
}

/// Fetches every non-standard dictionary with the default policy.
///
/// # Errors
/// Returns `FetchError` if the type-system root cannot be browsed.
pub async fn load_type_definitions<S: SchemaSource>(
    source: &S,
    catalog: &TypeCatalog,
) -> Result<FetchOutcome, FetchError> {
    TypeFetcher::new(source, catalog).fetch().await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::{EnumMetadata, NodeDescription};
    use async_trait::async_trait;
    use std::collections::HashMap;
    use uaforge_core::{LiveType, QualifiedName};

    #[derive(Default)]
    struct MockSpace {
        components: HashMap<NodeId, Vec<NodeDescription>>,
        dictionaries: HashMap<NodeId, String>,
        encodings: HashMap<NodeId, NodeId>,
    }

    #[async_trait]
    impl SchemaSource for MockSpace {
        async fn read_dictionary(&self, node: &NodeId) -> Result<String, FetchError> {
            self.dictionaries
                .get(node)
                .cloned()
                .ok_or_else(|| FetchError::read(node, "no such dictionary"))
        }

        async fn children(
            &self,
            node: &NodeId,
            kind: ReferenceKind,
        ) -> Result<Vec<NodeDescription>, FetchError> {
            match kind {
                ReferenceKind::HasComponent => {
                    Ok(self.components.get(node).cloned().unwrap_or_default())
                }
                _ => Ok(Vec::new()),
            }
        }

        async fn type_identifier(
            &self,
            description: &NodeId,
        ) -> Result<Option<NodeId>, FetchError> {
            Ok(self.encodings.get(description).cloned())
        }

        async fn read_enum_metadata(
            &self,
            _node: &NodeId,
        ) -> Result<Option<EnumMetadata>, FetchError> {
            Ok(None)
        }
    }

    const DICT_XML: &str = r#"<Dict>
        <StructuredType Name="Reading">
            <Field Name="Value" TypeName="opc:Double"/>
            <Field Name="Quality" TypeName="opc:UInt32"/>
        </StructuredType>
    </Dict>"#;

    fn space_with_one_dictionary() -> MockSpace {
        let mut space = MockSpace::default();
        let root = NodeId::numeric(0, OPC_BINARY_TYPE_SYSTEM);
        let std_dict = NodeId::numeric(0, 7617);
        let dict = NodeId::numeric(2, 500);
        let description = NodeId::numeric(2, 501);

        space.components.insert(
            root,
            vec![
                NodeDescription::new(std_dict, QualifiedName::new(0, STANDARD_DICTIONARY)),
                NodeDescription::new(dict.clone(), QualifiedName::new(2, "Acme.Types")),
            ],
        );
        space.components.insert(
            dict.clone(),
            vec![NodeDescription::new(
                description.clone(),
                QualifiedName::new(2, "Reading"),
            )],
        );
        space.dictionaries.insert(dict, DICT_XML.to_string());
        space.encodings.insert(description, NodeId::numeric(2, 502));
        space
    }

    #[tokio::test]
    async fn test_fetch_registers_and_binds() {
        let space = space_with_one_dictionary();
        let catalog = TypeCatalog::new();
        let outcome = load_type_definitions(&space, &catalog).await.expect("fetch");

        assert_eq!(outcome.types, vec!["Reading".to_string()]);
        assert_eq!(outcome.models.len(), 1);
        assert_eq!(outcome.models[0].0, "Acme.Types");
        assert!(outcome.failures.is_empty());
        assert!(catalog.contains("Reading"));
        assert_eq!(
            catalog.identifier_of("Reading"),
            Some(NodeId::numeric(2, 502))
        );
        assert!(matches!(
            catalog.resolve_id(&NodeId::numeric(2, 502)),
            Some(LiveType::Struct(_))
        ));
    }

    #[tokio::test]
    async fn test_standard_dictionary_is_skipped() {
        let mut space = MockSpace::default();
        let root = NodeId::numeric(0, OPC_BINARY_TYPE_SYSTEM);
        space.components.insert(
            root,
            vec![NodeDescription::new(
                NodeId::numeric(0, 7617),
                QualifiedName::new(0, STANDARD_DICTIONARY),
            )],
        );
        let catalog = TypeCatalog::new();
        let outcome = load_type_definitions(&space, &catalog).await.expect("fetch");
        assert!(outcome.types.is_empty());
        assert!(catalog.is_empty());
    }

    #[tokio::test]
    async fn test_unmatched_description_is_skipped() {
        let mut space = space_with_one_dictionary();
        let dict = NodeId::numeric(2, 500);
        space
            .components
            .get_mut(&dict)
            .expect("dictionary components")
            .push(NodeDescription::new(
                NodeId::numeric(2, 600),
                QualifiedName::new(2, "NotDeclaredHere"),
            ));

        let catalog = TypeCatalog::new();
        let outcome = load_type_definitions(&space, &catalog).await.expect("fetch");
        assert_eq!(outcome.types, vec!["Reading".to_string()]);
        assert!(!catalog.contains("NotDeclaredHere"));
    }

    #[tokio::test]
    async fn test_node_filter_limits_the_walk() {
        let mut space = space_with_one_dictionary();
        let root = NodeId::numeric(0, OPC_BINARY_TYPE_SYSTEM);
        let other = NodeId::numeric(3, 700);
        space
            .components
            .get_mut(&root)
            .expect("root components")
            .push(NodeDescription::new(
                other.clone(),
                QualifiedName::new(3, "Other.Types"),
            ));
        space.dictionaries.insert(
            other,
            r#"<Dict>
                <StructuredType Name="Widget">
                    <Field Name="Id" TypeName="opc:UInt32"/>
                </StructuredType>
            </Dict>"#
                .to_string(),
        );

        let catalog = TypeCatalog::new();
        let outcome = TypeFetcher::new(&space, &catalog)
            .with_nodes(vec![NodeId::numeric(2, 500)])
            .fetch()
            .await
            .expect("fetch");
        assert_eq!(outcome.types, vec!["Reading".to_string()]);
        assert!(!catalog.contains("Widget"));
    }

    #[tokio::test]
    async fn test_broken_dictionary_continue_policy() {
        let mut space = space_with_one_dictionary();
        let root = NodeId::numeric(0, OPC_BINARY_TYPE_SYSTEM);
        let broken = NodeId::numeric(3, 900);
        space
            .components
            .get_mut(&root)
            .expect("root components")
            .push(NodeDescription::new(
                broken.clone(),
                QualifiedName::new(3, "Broken.Types"),
            ));
        space
            .dictionaries
            .insert(broken, "<Dict><StructuredType".to_string());

        let catalog = TypeCatalog::new();
        let outcome = load_type_definitions(&space, &catalog).await.expect("fetch");
        assert_eq!(outcome.types, vec!["Reading".to_string()]);
        assert_eq!(outcome.failures.len(), 1);
        assert_eq!(outcome.failures[0].0, "Broken.Types");
    }

    #[tokio::test]
    async fn test_broken_dictionary_abort_policy() {
        let mut space = space_with_one_dictionary();
        let root = NodeId::numeric(0, OPC_BINARY_TYPE_SYSTEM);
        let broken = NodeId::numeric(3, 900);
        space
            .components
            .get_mut(&root)
            .expect("root components")
            .insert(
                0,
                NodeDescription::new(broken.clone(), QualifiedName::new(3, "Broken.Types")),
            );
        space
            .dictionaries
            .insert(broken, "<Dict><StructuredType".to_string());

        let catalog = TypeCatalog::new();
        let result = TypeFetcher::new(&space, &catalog)
            .with_policy(FetchPolicy::AbortOnError)
            .fetch()
            .await;
        assert!(result.is_err());
        assert!(catalog.is_empty());
    }
}
