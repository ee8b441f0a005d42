//! Dynamic values carried by generated structure instances.

use crate::builtin::Guid;
use crate::descriptor::StructDescriptor;
use crate::nodeid::NodeId;
use chrono::{DateTime, Utc};
use std::sync::Arc;

/// A namespace-qualified name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct QualifiedName {
    /// Namespace index.
    pub namespace_index: u16,
    /// Name within the namespace.
    pub name: String,
}

impl QualifiedName {
    /// Creates a qualified name.
    #[must_use]
    pub fn new(namespace_index: u16, name: impl Into<String>) -> Self {
        Self {
            namespace_index,
            name: name.into(),
        }
    }
}

/// Locale-tagged human readable text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct LocalizedText {
    /// Locale tag, e.g. `en-US`.
    pub locale: Option<String>,
    /// The text itself.
    pub text: Option<String>,
}

impl LocalizedText {
    /// Creates a localized text without a locale.
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            locale: None,
            text: Some(text.into()),
        }
    }
}

/// Body of an extension object.
#[derive(Debug, Clone, PartialEq)]
pub enum ExtensionBody {
    /// No body.
    None,
    /// Payload decoded through a registered type.
    Decoded(StructValue),
    /// Payload kept as raw bytes because the type identifier is not
    /// registered.
    Opaque(Vec<u8>),
}

/// A protocol extension object: a type-identified payload container.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtensionObject {
    /// Protocol identifier of the payload type.
    pub type_id: NodeId,
    /// Payload.
    pub body: ExtensionBody,
}

impl Default for ExtensionObject {
    fn default() -> Self {
        Self {
            type_id: NodeId::default(),
            body: ExtensionBody::None,
        }
    }
}

/// A dynamically typed protocol value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Null / absent.
    Null,
    /// Boolean.
    Boolean(bool),
    /// Signed 8-bit integer.
    SByte(i8),
    /// Unsigned 8-bit integer (also `Char` cells).
    Byte(u8),
    /// Signed 16-bit integer.
    Int16(i16),
    /// Unsigned 16-bit integer.
    UInt16(u16),
    /// Signed 32-bit integer.
    Int32(i32),
    /// Unsigned 32-bit integer.
    UInt32(u32),
    /// Signed 64-bit integer.
    Int64(i64),
    /// Unsigned 64-bit integer.
    UInt64(u64),
    /// 32-bit floating point.
    Float(f32),
    /// 64-bit floating point.
    Double(f64),
    /// UTF-8 string.
    String(String),
    /// Timestamp.
    DateTime(DateTime<Utc>),
    /// GUID.
    Guid(Guid),
    /// Raw bytes.
    ByteString(Vec<u8>),
    /// XML fragment.
    XmlElement(String),
    /// Node identifier.
    NodeId(NodeId),
    /// Status code.
    StatusCode(u32),
    /// Qualified name.
    QualifiedName(QualifiedName),
    /// Localized text.
    LocalizedText(LocalizedText),
    /// Member value of a generated enum.
    Enum(i32),
    /// Instance of a generated structure.
    Struct(StructValue),
    /// Extension object.
    ExtensionObject(Box<ExtensionObject>),
    /// Sequence of values.
    Array(Vec<Value>),
}

impl Value {
    /// Returns a short kind name for diagnostics.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Null => "Null",
            Self::Boolean(_) => "Boolean",
            Self::SByte(_) => "SByte",
            Self::Byte(_) => "Byte",
            Self::Int16(_) => "Int16",
            Self::UInt16(_) => "UInt16",
            Self::Int32(_) => "Int32",
            Self::UInt32(_) => "UInt32",
            Self::Int64(_) => "Int64",
            Self::UInt64(_) => "UInt64",
            Self::Float(_) => "Float",
            Self::Double(_) => "Double",
            Self::String(_) => "String",
            Self::DateTime(_) => "DateTime",
            Self::Guid(_) => "Guid",
            Self::ByteString(_) => "ByteString",
            Self::XmlElement(_) => "XmlElement",
            Self::NodeId(_) => "NodeId",
            Self::StatusCode(_) => "StatusCode",
            Self::QualifiedName(_) => "QualifiedName",
            Self::LocalizedText(_) => "LocalizedText",
            Self::Enum(_) => "Enum",
            Self::Struct(_) => "Struct",
            Self::ExtensionObject(_) => "ExtensionObject",
            Self::Array(_) => "Array",
        }
    }

    /// Returns true if this value is null.
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }
}

/// An instance of a generated structure: its descriptor plus one value per
/// descriptor field, positionally aligned.
///
/// Absent optional fields hold [`Value::Null`]; the encoder derives the
/// leading encoding mask from exactly that.
#[derive(Debug, Clone, PartialEq)]
pub struct StructValue {
    descriptor: Arc<StructDescriptor>,
    values: Vec<Value>,
}

impl StructValue {
    /// Creates an instance with every field set to null.
    ///
    /// Callers populate fields before encoding; the codec substitutes
    /// type-appropriate defaults only where the descriptor allows null.
    #[must_use]
    pub fn new(descriptor: Arc<StructDescriptor>) -> Self {
        let values = vec![Value::Null; descriptor.fields.len()];
        Self { descriptor, values }
    }

    /// Creates an instance from positional values.
    ///
    /// The value count must match the descriptor's field count.
    #[must_use]
    pub fn from_values(descriptor: Arc<StructDescriptor>, values: Vec<Value>) -> Self {
        debug_assert_eq!(descriptor.fields.len(), values.len());
        Self { descriptor, values }
    }

    /// Returns the descriptor.
    #[must_use]
    pub fn descriptor(&self) -> &Arc<StructDescriptor> {
        &self.descriptor
    }

    /// Returns the type name.
    #[must_use]
    pub fn type_name(&self) -> &str {
        &self.descriptor.name
    }

    /// Returns the positional values in field order.
    #[must_use]
    pub fn values(&self) -> &[Value] {
        &self.values
    }

    /// Returns a field value by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.descriptor.field_index(name).map(|i| &self.values[i])
    }

    /// Sets a field value by name. Returns false if the field is unknown.
    pub fn set(&mut self, name: &str, value: Value) -> bool {
        match self.descriptor.field_index(name) {
            Some(i) => {
                self.values[i] = value;
                true
            }
            None => false,
        }
    }

    /// Sets a field value by position.
    pub fn set_index(&mut self, index: usize, value: Value) {
        self.values[index] = value;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builtin::BuiltinType;
    use crate::descriptor::{FieldDescriptor, TypeRef};

    fn point_descriptor() -> Arc<StructDescriptor> {
        Arc::new(StructDescriptor {
            name: "Point".to_string(),
            fields: vec![
                FieldDescriptor {
                    name: "X".to_string(),
                    type_ref: TypeRef::Builtin(BuiltinType::Double),
                    is_array: false,
                    is_optional: false,
                },
                FieldDescriptor {
                    name: "Y".to_string(),
                    type_ref: TypeRef::Builtin(BuiltinType::Double),
                    is_array: false,
                    is_optional: false,
                },
            ],
            option_count: 0,
        })
    }

    #[test]
    fn test_struct_value_get_set() {
        let mut v = StructValue::new(point_descriptor());
        assert_eq!(v.get("X"), Some(&Value::Null));
        assert!(v.set("X", Value::Double(1.5)));
        assert_eq!(v.get("X"), Some(&Value::Double(1.5)));
        assert!(!v.set("Z", Value::Double(0.0)));
        assert_eq!(v.get("Z"), None);
    }

    #[test]
    fn test_value_kind() {
        assert_eq!(Value::Null.kind(), "Null");
        assert_eq!(Value::Array(vec![]).kind(), "Array");
        assert_eq!(Value::Enum(1).kind(), "Enum");
    }
}
