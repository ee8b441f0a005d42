//! Type model construction.
//!
//! Turns raw dictionary declarations into a resolved, code-generation-ready
//! model. Building is two-pass: names are collected first so fields can
//! reference types declared later in the same document, then every field
//! type is resolved against builtins, the document, and optionally an
//! already-populated catalog for cross-dictionary references.

use crate::error::SchemaParseError;
use crate::names::clean_name;
use crate::parser::{self, RawField, TypeDeclaration};
use std::collections::HashMap;
use uaforge_core::{
    BuiltinType, EnumDescriptor, FieldDescriptor, LiveType, NodeId, StructDescriptor, TypeCatalog,
    TypeRef,
};

/// One member of a modeled enum.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumMember {
    /// Sanitized member name.
    pub name: String,
    /// Declared integer value.
    pub value: i64,
}

/// A modeled enumerated type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumType {
    /// Sanitized type name.
    pub name: String,
    /// Members in declared order.
    pub members: Vec<EnumMember>,
}

impl EnumType {
    /// Builds the live descriptor for this enum.
    #[must_use]
    pub fn descriptor(&self) -> EnumDescriptor {
        EnumDescriptor {
            name: self.name.clone(),
            members: self
                .members
                .iter()
                .map(|m| (m.name.clone(), m.value))
                .collect(),
        }
    }
}

/// Resolved value type of a modeled field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldType {
    /// A builtin protocol type.
    Builtin(BuiltinType),
    /// A modeled enum, by sanitized name.
    Enum(String),
    /// A modeled structure, by sanitized name.
    Struct(String),
}

impl FieldType {
    /// Returns the codec-facing type reference.
    #[must_use]
    pub fn type_ref(&self) -> TypeRef {
        match self {
            Self::Builtin(b) => TypeRef::Builtin(*b),
            Self::Enum(name) | Self::Struct(name) => TypeRef::Named(name.clone()),
        }
    }
}

/// How a generated field is initialized by `Default`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DefaultValue {
    /// The builtin type's own default.
    Builtin(BuiltinType),
    /// The first declared member of the named enum.
    EnumFirst(String),
    /// A default instance of the named structure.
    StructNew(String),
    /// An empty sequence.
    EmptyArray,
    /// `None`, for optional fields.
    None,
}

/// A modeled structure field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    /// Sanitized field name.
    pub name: String,
    /// Resolved value type.
    pub field_type: FieldType,
    /// Whether the field is a sequence.
    pub is_array: bool,
    /// Whether the field is mask-guarded.
    pub is_optional: bool,
}

impl Field {
    /// Returns the default used for this field in generated code.
    #[must_use]
    pub fn default_value(&self) -> DefaultValue {
        if self.is_optional {
            DefaultValue::None
        } else if self.is_array {
            DefaultValue::EmptyArray
        } else {
            match &self.field_type {
                FieldType::Builtin(b) => DefaultValue::Builtin(*b),
                FieldType::Enum(name) => DefaultValue::EnumFirst(name.clone()),
                FieldType::Struct(name) => DefaultValue::StructNew(name.clone()),
            }
        }
    }

    /// Builds the live descriptor for this field.
    #[must_use]
    pub fn descriptor(&self) -> FieldDescriptor {
        FieldDescriptor {
            name: self.name.clone(),
            type_ref: self.field_type.type_ref(),
            is_array: self.is_array,
            is_optional: self.is_optional,
        }
    }
}

/// A modeled structure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Struct {
    /// Sanitized type name.
    pub name: String,
    /// Fields in wire order, markers and filler already removed.
    pub fields: Vec<Field>,
    /// Encoding node identifier, once known.
    pub type_id: Option<NodeId>,
}

impl Struct {
    /// Number of mask-guarded fields.
    #[must_use]
    pub fn option_count(&self) -> u32 {
        self.fields.iter().filter(|f| f.is_optional).count() as u32
    }

    /// Builds the live descriptor for this structure.
    #[must_use]
    pub fn descriptor(&self) -> StructDescriptor {
        StructDescriptor {
            name: self.name.clone(),
            fields: self.fields.iter().map(Field::descriptor).collect(),
            option_count: self.option_count(),
        }
    }
}

/// One entry of a built model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelEntry {
    /// A modeled enum.
    Enum(EnumType),
    /// A modeled structure.
    Struct(Struct),
}

impl ModelEntry {
    /// Returns the entry's sanitized type name.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Enum(e) => &e.name,
            Self::Struct(s) => &s.name,
        }
    }

    /// Builds the live descriptor for this entry.
    #[must_use]
    pub fn live_type(&self) -> LiveType {
        match self {
            Self::Enum(e) => LiveType::Enum(std::sync::Arc::new(e.descriptor())),
            Self::Struct(s) => LiveType::Struct(std::sync::Arc::new(s.descriptor())),
        }
    }
}

/// A fully resolved type model for one dictionary.
#[derive(Debug, Clone, Default)]
pub struct TypeModel {
    entries: Vec<ModelEntry>,
    index: HashMap<String, usize>,
}

impl TypeModel {
    /// Builds a model from raw declarations without external context.
    ///
    /// # Errors
    /// Returns `SchemaParseError::UnknownType` if a field references a type
    /// that is neither builtin nor declared in the same document.
    pub fn from_declarations(
        declarations: &[TypeDeclaration],
    ) -> Result<Self, SchemaParseError> {
        Self::build(declarations, None)
    }

    /// Parses and models a dictionary without external context.
    pub fn from_xml(xml: &str) -> Result<Self, SchemaParseError> {
        Self::build(&parser::parse_declarations(xml)?, None)
    }

    /// Parses and models a dictionary file without external context.
    pub fn from_xml_file(path: impl AsRef<std::path::Path>) -> Result<Self, SchemaParseError> {
        Self::build(&parser::parse_declarations_file(path)?, None)
    }

    /// Parses and models a dictionary, resolving foreign references through
    /// a catalog of already-materialized types.
    pub fn from_xml_in(xml: &str, catalog: &TypeCatalog) -> Result<Self, SchemaParseError> {
        Self::build(&parser::parse_declarations(xml)?, Some(catalog))
    }

    /// Builds a model holding only enums, as produced by node introspection.
    #[must_use]
    pub fn from_enum_types(enums: Vec<EnumType>) -> Self {
        let mut model = Self::default();
        for e in enums {
            model.push(ModelEntry::Enum(e));
        }
        model
    }

    fn build(
        declarations: &[TypeDeclaration],
        catalog: Option<&TypeCatalog>,
    ) -> Result<Self, SchemaParseError> {
        // Pass 1: names declared in this document, so forward references
        // within the dictionary resolve.
        let mut declared: HashMap<String, bool> = HashMap::new();
        for decl in declarations {
            match decl {
                TypeDeclaration::Enum(e) => {
                    declared.insert(clean_name(&e.name), true);
                }
                TypeDeclaration::Struct(s) => {
                    declared.insert(clean_name(&s.name), false);
                }
            }
        }

        // Pass 2: enums first, then structs, so iteration and emission
        // order never show a struct ahead of an enum it uses.
        let mut model = Self::default();
        for decl in declarations {
            if let TypeDeclaration::Enum(e) = decl {
                model.push(ModelEntry::Enum(EnumType {
                    name: clean_name(&e.name),
                    members: e
                        .values
                        .iter()
                        .map(|(n, v)| EnumMember {
                            name: clean_name(n),
                            value: *v,
                        })
                        .collect(),
                }));
            }
        }
        for decl in declarations {
            if let TypeDeclaration::Struct(s) = decl {
                let built = build_struct(&s.name, &s.fields, &declared, catalog)?;
                model.push(ModelEntry::Struct(built));
            }
        }
        Ok(model)
    }

    fn push(&mut self, entry: ModelEntry) {
        match self.index.get(entry.name()) {
            Some(&at) => self.entries[at] = entry,
            None => {
                self.index.insert(entry.name().to_string(), self.entries.len());
                self.entries.push(entry);
            }
        }
    }

    /// Records the encoding node identifier for a modeled structure.
    ///
    /// Returns false when no structure with that name is in the model.
    pub fn set_typeid(&mut self, name: &str, type_id: NodeId) -> bool {
        match self.index.get(name) {
            Some(&at) => match &mut self.entries[at] {
                ModelEntry::Struct(s) => {
                    s.type_id = Some(type_id);
                    true
                }
                ModelEntry::Enum(_) => false,
            },
            None => false,
        }
    }

    /// Looks up an entry by sanitized name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&ModelEntry> {
        self.index.get(name).map(|&at| &self.entries[at])
    }

    /// Iterates entries: enums first, then structs, each in declaration
    /// order.
    pub fn iter(&self) -> impl Iterator<Item = &ModelEntry> {
        self.entries.iter()
    }

    /// Number of modeled types.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the model holds no types.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Builds live descriptors for every entry, in model order.
    #[must_use]
    pub fn live_types(&self) -> Vec<LiveType> {
        self.entries.iter().map(ModelEntry::live_type).collect()
    }
}

/// Resolves one structure declaration.
fn build_struct(
    raw_name: &str,
    raw_fields: &[RawField],
    declared: &HashMap<String, bool>,
    catalog: Option<&TypeCatalog>,
) -> Result<Struct, SchemaParseError> {
    let struct_name = clean_name(raw_name);

    let mut fields = Vec::new();
    // A length marker flags the next materialized field as an array,
    // whatever that field is named.
    let mut next_is_array = false;
    for raw in raw_fields {
        if is_length_marker(&raw.name) {
            next_is_array = true;
            continue;
        }
        let local_type = local_type_name(&raw.type_name);
        // Switch and padding bits live only in the mask.
        if local_type == "Bit" {
            continue;
        }
        // The raw switch cell is replaced by the synthetic mask.
        if raw.name == "SwitchField" {
            continue;
        }

        let field_type = resolve_type(local_type, declared, catalog).ok_or_else(|| {
            SchemaParseError::unknown_type(&raw.type_name, &raw.name, raw_name)
        })?;

        fields.push(Field {
            name: clean_name(&raw.name),
            field_type,
            is_array: std::mem::take(&mut next_is_array),
            is_optional: raw.switch_field.is_some(),
        });
    }

    let option_count = fields.iter().filter(|f| f.is_optional).count();
    if option_count > 32 {
        return Err(SchemaParseError::TooManyOptionalFields {
            struct_name,
            count: option_count,
        });
    }

    Ok(Struct {
        name: struct_name,
        fields,
        type_id: None,
    })
}

fn resolve_type(
    local: &str,
    declared: &HashMap<String, bool>,
    catalog: Option<&TypeCatalog>,
) -> Option<FieldType> {
    if let Some(builtin) = BuiltinType::from_name(local) {
        return Some(FieldType::Builtin(builtin));
    }
    let cleaned = clean_name(local);
    if let Some(&is_enum) = declared.get(&cleaned) {
        return Some(if is_enum {
            FieldType::Enum(cleaned)
        } else {
            FieldType::Struct(cleaned)
        });
    }
    if let Some(live) = catalog.and_then(|c| c.get(&cleaned)) {
        return Some(if live.is_enum() {
            FieldType::Enum(cleaned)
        } else {
            FieldType::Struct(cleaned)
        });
    }
    None
}

/// Returns true if `name` is an array length marker.
fn is_length_marker(name: &str) -> bool {
    name.starts_with("NoOf")
        || (name.starts_with("__") && name.ends_with("Length"))
        || name.starts_with('#')
}

/// Strips any namespace qualifier from a declared type name.
fn local_type_name(type_name: &str) -> &str {
    type_name.rsplit(':').next().unwrap_or(type_name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    const BASIC: &str = r#"<Dict>
        <EnumeratedType Name="Severity">
            <EnumeratedValue Name="Low" Value="0"/>
            <EnumeratedValue Name="High" Value="10"/>
        </EnumeratedType>
        <StructuredType Name="Reading">
            <Field Name="Value" TypeName="opc:Double"/>
            <Field Name="Level" TypeName="tns:Severity"/>
        </StructuredType>
    </Dict>"#;

    #[test]
    fn test_basic_model() {
        let model = TypeModel::from_xml(BASIC).expect("model");
        assert_eq!(model.len(), 2);

        match model.get("Severity") {
            Some(ModelEntry::Enum(e)) => {
                assert_eq!(e.members.len(), 2);
                assert_eq!(e.members[1].value, 10);
            }
            other => panic!("expected enum, got {other:?}"),
        }

        match model.get("Reading") {
            Some(ModelEntry::Struct(s)) => {
                assert_eq!(s.fields.len(), 2);
                assert_eq!(
                    s.fields[0].field_type,
                    FieldType::Builtin(BuiltinType::Double)
                );
                assert_eq!(s.fields[1].field_type, FieldType::Enum("Severity".into()));
                assert_eq!(s.option_count(), 0);
            }
            other => panic!("expected struct, got {other:?}"),
        }
    }

    #[test]
    fn test_enums_precede_structs_in_model_order() {
        let xml = r#"<Dict>
            <StructuredType Name="Reading">
                <Field Name="Level" TypeName="tns:Severity"/>
            </StructuredType>
            <EnumeratedType Name="Severity">
                <EnumeratedValue Name="Low" Value="0"/>
            </EnumeratedType>
        </Dict>"#;
        let model = TypeModel::from_xml(xml).expect("model");
        let names: Vec<&str> = model.iter().map(ModelEntry::name).collect();
        assert_eq!(names, vec!["Severity", "Reading"]);
    }

    #[test]
    fn test_forward_reference_within_document() {
        let xml = r#"<Dict>
            <StructuredType Name="Outer">
                <Field Name="Inner" TypeName="tns:Part"/>
            </StructuredType>
            <StructuredType Name="Part">
                <Field Name="Id" TypeName="opc:UInt32"/>
            </StructuredType>
        </Dict>"#;
        let model = TypeModel::from_xml(xml).expect("model");
        match model.get("Outer") {
            Some(ModelEntry::Struct(s)) => {
                assert_eq!(s.fields[0].field_type, FieldType::Struct("Part".into()));
            }
            other => panic!("expected struct, got {other:?}"),
        }
    }

    #[test]
    fn test_optional_fields_and_bits() {
        let xml = r#"<Dict>
            <StructuredType Name="Options">
                <Field Name="LabelSpecified" TypeName="opc:Bit"/>
                <Field Name="CountSpecified" TypeName="opc:Bit"/>
                <Field Name="Reserved1" TypeName="opc:Bit" Length="30"/>
                <Field Name="Serial" TypeName="opc:UInt32"/>
                <Field Name="Label" TypeName="opc:String" SwitchField="LabelSpecified"/>
                <Field Name="Count" TypeName="opc:Int32" SwitchField="CountSpecified"/>
            </StructuredType>
        </Dict>"#;
        let model = TypeModel::from_xml(xml).expect("model");
        match model.get("Options") {
            Some(ModelEntry::Struct(s)) => {
                assert_eq!(s.fields.len(), 3);
                assert_eq!(s.option_count(), 2);
                assert!(!s.fields[0].is_optional);
                assert!(s.fields[1].is_optional);
                assert!(s.fields[2].is_optional);
                assert_eq!(s.fields[1].default_value(), DefaultValue::None);
            }
            other => panic!("expected struct, got {other:?}"),
        }
    }

    #[test]
    fn test_array_markers() {
        let xml = r#"<Dict>
            <StructuredType Name="Samples">
                <Field Name="NoOfValues" TypeName="opc:Int32"/>
                <Field Name="Values" TypeName="opc:Double"/>
                <Field Name="__NamesLength" TypeName="opc:Int32"/>
                <Field Name="Names" TypeName="opc:String"/>
            </StructuredType>
        </Dict>"#;
        let model = TypeModel::from_xml(xml).expect("model");
        match model.get("Samples") {
            Some(ModelEntry::Struct(s)) => {
                assert_eq!(s.fields.len(), 2);
                assert!(s.fields[0].is_array);
                assert!(s.fields[1].is_array);
                assert_eq!(s.fields[0].default_value(), DefaultValue::EmptyArray);
            }
            other => panic!("expected struct, got {other:?}"),
        }
    }

    #[test]
    fn test_length_marker_applies_to_the_next_field() {
        let xml = r#"<Dict>
            <StructuredType Name="Path">
                <Field Name="NoOfPoints" TypeName="opc:Int32"/>
                <Field Name="Coordinates" TypeName="opc:Double"/>
                <Field Name="Closed" TypeName="opc:Boolean"/>
            </StructuredType>
        </Dict>"#;
        let model = TypeModel::from_xml(xml).expect("model");
        match model.get("Path") {
            Some(ModelEntry::Struct(s)) => {
                assert_eq!(s.fields.len(), 2);
                assert_eq!(s.fields[0].name, "Coordinates");
                assert!(s.fields[0].is_array);
                assert!(!s.fields[1].is_array);
            }
            other => panic!("expected struct, got {other:?}"),
        }
    }

    #[test]
    fn test_switch_field_cell_is_suppressed() {
        let xml = r#"<Dict>
            <StructuredType Name="OptionSet">
                <Field Name="SwitchField" TypeName="opc:UInt32"/>
                <Field Name="Label" TypeName="opc:String" SwitchField="LabelSpecified"/>
            </StructuredType>
        </Dict>"#;
        let model = TypeModel::from_xml(xml).expect("model");
        match model.get("OptionSet") {
            Some(ModelEntry::Struct(s)) => {
                let names: Vec<&str> = s.fields.iter().map(|f| f.name.as_str()).collect();
                assert_eq!(names, vec!["Label"]);
                assert_eq!(s.option_count(), 1);
            }
            other => panic!("expected struct, got {other:?}"),
        }
    }

    #[test]
    fn test_more_than_32_optional_fields_is_an_error() {
        let mut xml = String::from(r#"<Dict><StructuredType Name="Wide">"#);
        for i in 0..33 {
            xml.push_str(&format!(
                r#"<Field Name="F{i}" TypeName="opc:Int32" SwitchField="F{i}Specified"/>"#
            ));
        }
        xml.push_str("</StructuredType></Dict>");

        let err = TypeModel::from_xml(&xml).unwrap_err();
        assert!(matches!(
            err,
            SchemaParseError::TooManyOptionalFields { count: 33, .. }
        ));
    }

    #[test]
    fn test_unknown_type_is_an_error() {
        let xml = r#"<Dict>
            <StructuredType Name="Broken">
                <Field Name="X" TypeName="tns:Mystery"/>
            </StructuredType>
        </Dict>"#;
        let err = TypeModel::from_xml(xml).unwrap_err();
        assert!(matches!(err, SchemaParseError::UnknownType { .. }));
    }

    #[test]
    fn test_cross_dictionary_reference_through_catalog() {
        let catalog = TypeCatalog::new();
        catalog.commit([LiveType::Enum(Arc::new(EnumDescriptor {
            name: "Mode".to_string(),
            members: vec![("Auto".to_string(), 0)],
        }))]);

        let xml = r#"<Dict>
            <StructuredType Name="Config">
                <Field Name="Mode" TypeName="other:Mode"/>
            </StructuredType>
        </Dict>"#;
        let model = TypeModel::from_xml_in(xml, &catalog).expect("model");
        match model.get("Config") {
            Some(ModelEntry::Struct(s)) => {
                assert_eq!(s.fields[0].field_type, FieldType::Enum("Mode".into()));
            }
            other => panic!("expected struct, got {other:?}"),
        }
    }

    #[test]
    fn test_set_typeid() {
        let mut model = TypeModel::from_xml(BASIC).expect("model");
        let id: NodeId = "ns=2;i=451".parse().expect("node id");
        assert!(model.set_typeid("Reading", id.clone()));
        assert!(!model.set_typeid("Severity", id.clone()));
        assert!(!model.set_typeid("Missing", id));

        match model.get("Reading") {
            Some(ModelEntry::Struct(s)) => {
                assert_eq!(s.type_id.as_ref().map(|n| n.namespace), Some(2));
            }
            other => panic!("expected struct, got {other:?}"),
        }
    }

    #[test]
    fn test_member_name_sanitization() {
        let xml = r#"<Dict>
            <EnumeratedType Name="State">
                <EnumeratedValue Name="None" Value="0"/>
                <EnumeratedValue Name="In Service" Value="1"/>
            </EnumeratedType>
        </Dict>"#;
        let model = TypeModel::from_xml(xml).expect("model");
        match model.get("State") {
            Some(ModelEntry::Enum(e)) => {
                assert_eq!(e.members[0].name, "None_");
                assert_eq!(e.members[1].name, "InService");
            }
            other => panic!("expected enum, got {other:?}"),
        }
    }
}
