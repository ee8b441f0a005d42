//! Live type descriptors.
//!
//! A descriptor is the run-time product of the schema pipeline: an
//! interpretable description of a generated enum or structure that the
//! structural codec walks field by field. Descriptors are immutable once
//! built and shared behind `Arc`.

use crate::builtin::BuiltinType;
use std::sync::Arc;

/// Reference from a field to its value type.
///
/// Named references are resolved through the catalog at codec time, which
/// keeps recursive compositions and hot-reloaded definitions working
/// without descriptor rebuilds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeRef {
    /// A builtin protocol type.
    Builtin(BuiltinType),
    /// A generated enum or structure, by sanitized name.
    Named(String),
}

/// Descriptor for one field of a generated structure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDescriptor {
    /// Sanitized field name.
    pub name: String,
    /// Value type of the field.
    pub type_ref: TypeRef,
    /// Whether the field is a sequence.
    pub is_array: bool,
    /// Whether the field is guarded by a bit of the leading encoding mask.
    pub is_optional: bool,
}

/// Descriptor for a generated structure.
///
/// The field list never contains the synthetic `Encoding` mask; the codec
/// derives it from `option_count` so wire order and model order stay the
/// same thing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructDescriptor {
    /// Sanitized type name.
    pub name: String,
    /// Fields in wire order.
    pub fields: Vec<FieldDescriptor>,
    /// Number of optional fields.
    pub option_count: u32,
}

impl StructDescriptor {
    /// Returns the index of a field by name.
    #[must_use]
    pub fn field_index(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name == name)
    }
}

/// Descriptor for a generated enum.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumDescriptor {
    /// Sanitized type name.
    pub name: String,
    /// Members in declared order with their exact values.
    pub members: Vec<(String, i64)>,
}

impl EnumDescriptor {
    /// Returns the member name for a value, if the value is declared.
    #[must_use]
    pub fn member_name(&self, value: i64) -> Option<&str> {
        self.members
            .iter()
            .find(|(_, v)| *v == value)
            .map(|(n, _)| n.as_str())
    }

    /// Returns the value of a member by name.
    #[must_use]
    pub fn value_of(&self, name: &str) -> Option<i64> {
        self.members
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| *v)
    }

    /// Returns the first declared member, the enum's default.
    #[must_use]
    pub fn first(&self) -> Option<&(String, i64)> {
        self.members.first()
    }

    /// Returns true if `value` is a declared member value.
    #[must_use]
    pub fn contains_value(&self, value: i64) -> bool {
        self.members.iter().any(|(_, v)| *v == value)
    }
}

/// A live, catalog-registered type.
#[derive(Debug, Clone)]
pub enum LiveType {
    /// A generated enum.
    Enum(Arc<EnumDescriptor>),
    /// A generated structure.
    Struct(Arc<StructDescriptor>),
}

impl LiveType {
    /// Returns the type name.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Enum(e) => &e.name,
            Self::Struct(s) => &s.name,
        }
    }

    /// Returns true if this is an enum type.
    #[must_use]
    pub fn is_enum(&self) -> bool {
        matches!(self, Self::Enum(_))
    }

    /// Returns the struct descriptor, if this is a structure.
    #[must_use]
    pub fn as_struct(&self) -> Option<&Arc<StructDescriptor>> {
        match self {
            Self::Struct(s) => Some(s),
            Self::Enum(_) => None,
        }
    }
}
