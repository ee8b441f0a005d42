//! Generic structural encoder.
//!
//! Encodes [`StructValue`] instances by interpreting their descriptors,
//! so types generated at run time need no compile-time codec support.
//! All multi-byte values are little-endian per the protocol binary
//! encoding.

use crate::builtin::{BuiltinType, datetime_to_ticks};
use crate::catalog::TypeCatalog;
use crate::descriptor::{FieldDescriptor, LiveType, StructDescriptor, TypeRef};
use crate::error::{Error, Result};
use crate::nodeid::{Identifier, NodeId};
use crate::value::{ExtensionBody, ExtensionObject, StructValue, Value};
use bytes::{BufMut, BytesMut};

/// Encodes a structure instance into `buf`.
///
/// If the descriptor declares optional fields, the leading encoding mask
/// is derived from which optional fields are non-null and written first.
///
/// # Errors
/// Returns an error on value/descriptor mismatch or unresolvable named
/// types.
pub fn encode_struct(value: &StructValue, catalog: &TypeCatalog, buf: &mut BytesMut) -> Result<()> {
    let descriptor = value.descriptor();
    if descriptor.option_count > 0 {
        buf.put_u32_le(encoding_mask(descriptor, value.values()));
    }
    for (fd, v) in descriptor.fields.iter().zip(value.values()) {
        if fd.is_optional && v.is_null() {
            continue;
        }
        encode_field(fd, v, catalog, buf)?;
    }
    Ok(())
}

/// Computes the optional-field presence mask: bit i is set when the i-th
/// optional field (in field order) is present.
#[must_use]
pub fn encoding_mask(descriptor: &StructDescriptor, values: &[Value]) -> u32 {
    let mut mask = 0u32;
    let mut bit = 0u32;
    for (fd, v) in descriptor.fields.iter().zip(values) {
        if fd.is_optional {
            if !v.is_null() {
                mask |= 1 << bit;
            }
            bit += 1;
        }
    }
    mask
}

fn encode_field(
    fd: &FieldDescriptor,
    value: &Value,
    catalog: &TypeCatalog,
    buf: &mut BytesMut,
) -> Result<()> {
    if fd.is_array {
        return match value {
            Value::Null => {
                buf.put_i32_le(-1);
                Ok(())
            }
            Value::Array(items) => {
                buf.put_i32_le(items.len() as i32);
                for item in items {
                    encode_scalar(&fd.name, &fd.type_ref, item, catalog, buf)?;
                }
                Ok(())
            }
            other => Err(Error::TypeMismatch {
                field: fd.name.clone(),
                expected: "Array".to_string(),
                actual: other.kind(),
            }),
        };
    }
    encode_scalar(&fd.name, &fd.type_ref, value, catalog, buf)
}

fn encode_scalar(
    field: &str,
    type_ref: &TypeRef,
    value: &Value,
    catalog: &TypeCatalog,
    buf: &mut BytesMut,
) -> Result<()> {
    match type_ref {
        TypeRef::Builtin(bt) => encode_builtin(field, *bt, value, catalog, buf),
        TypeRef::Named(name) => match catalog.get(name) {
            Some(LiveType::Enum(e)) => {
                let raw = match value {
                    Value::Enum(v) => *v,
                    Value::Null => e.first().map(|(_, v)| *v as i32).unwrap_or(0),
                    other => {
                        return Err(Error::TypeMismatch {
                            field: field.to_string(),
                            expected: format!("enum {name}"),
                            actual: other.kind(),
                        });
                    }
                };
                if !e.contains_value(i64::from(raw)) {
                    return Err(Error::InvalidEnumValue {
                        enum_name: name.clone(),
                        value: i64::from(raw),
                    });
                }
                buf.put_i32_le(raw);
                Ok(())
            }
            Some(LiveType::Struct(sd)) => match value {
                Value::Struct(sv) if sv.type_name() == name => encode_struct(sv, catalog, buf),
                Value::Null => {
                    // Default-constructed nested instance.
                    encode_struct(&StructValue::new(sd), catalog, buf)
                }
                other => Err(Error::TypeMismatch {
                    field: field.to_string(),
                    expected: format!("struct {name}"),
                    actual: other.kind(),
                }),
            },
            None => Err(Error::UnknownTypeName { name: name.clone() }),
        },
    }
}

#[allow(clippy::too_many_lines)]
fn encode_builtin(
    field: &str,
    bt: BuiltinType,
    value: &Value,
    catalog: &TypeCatalog,
    buf: &mut BytesMut,
) -> Result<()> {
    let mismatch = |actual: &Value| Error::TypeMismatch {
        field: field.to_string(),
        expected: bt.name().to_string(),
        actual: actual.kind(),
    };

    match (bt, value) {
        (BuiltinType::Boolean, Value::Boolean(v)) => buf.put_u8(u8::from(*v)),
        (BuiltinType::Boolean, Value::Null) => buf.put_u8(0),
        (BuiltinType::SByte, Value::SByte(v)) => buf.put_i8(*v),
        (BuiltinType::SByte, Value::Null) => buf.put_i8(0),
        (BuiltinType::Byte | BuiltinType::Char, Value::Byte(v)) => buf.put_u8(*v),
        (BuiltinType::Byte | BuiltinType::Char, Value::Null) => buf.put_u8(0),
        (BuiltinType::Int16, Value::Int16(v)) => buf.put_i16_le(*v),
        (BuiltinType::Int16, Value::Null) => buf.put_i16_le(0),
        (BuiltinType::UInt16, Value::UInt16(v)) => buf.put_u16_le(*v),
        (BuiltinType::UInt16, Value::Null) => buf.put_u16_le(0),
        (BuiltinType::Int32, Value::Int32(v)) => buf.put_i32_le(*v),
        (BuiltinType::Int32, Value::Null) => buf.put_i32_le(0),
        (BuiltinType::UInt32, Value::UInt32(v)) => buf.put_u32_le(*v),
        (BuiltinType::UInt32, Value::Null) => buf.put_u32_le(0),
        (BuiltinType::Int64, Value::Int64(v)) => buf.put_i64_le(*v),
        (BuiltinType::Int64, Value::Null) => buf.put_i64_le(0),
        (BuiltinType::UInt64, Value::UInt64(v)) => buf.put_u64_le(*v),
        (BuiltinType::UInt64, Value::Null) => buf.put_u64_le(0),
        (BuiltinType::Float, Value::Float(v)) => buf.put_f32_le(*v),
        (BuiltinType::Float, Value::Null) => buf.put_f32_le(0.0),
        (BuiltinType::Double, Value::Double(v)) => buf.put_f64_le(*v),
        (BuiltinType::Double, Value::Null) => buf.put_f64_le(0.0),
        (BuiltinType::String | BuiltinType::XmlElement, Value::String(s)) => {
            write_bytes(buf, Some(s.as_bytes()));
        }
        (BuiltinType::XmlElement, Value::XmlElement(s)) => {
            write_bytes(buf, Some(s.as_bytes()));
        }
        (BuiltinType::String | BuiltinType::XmlElement, Value::Null) => write_bytes(buf, None),
        (BuiltinType::DateTime, Value::DateTime(dt)) => buf.put_i64_le(datetime_to_ticks(*dt)),
        (BuiltinType::DateTime, Value::Null) => buf.put_i64_le(0),
        (BuiltinType::Guid, Value::Guid(g)) => buf.put_slice(&g.to_bytes()),
        (BuiltinType::Guid, Value::Null) => buf.put_slice(&[0u8; 16]),
        (BuiltinType::ByteString, Value::ByteString(b)) => write_bytes(buf, Some(b)),
        (BuiltinType::ByteString, Value::Null) => write_bytes(buf, None),
        (BuiltinType::NodeId, Value::NodeId(id)) => encode_node_id(id, buf),
        (BuiltinType::NodeId, Value::Null) => encode_node_id(&NodeId::default(), buf),
        (BuiltinType::StatusCode, Value::StatusCode(v)) => buf.put_u32_le(*v),
        (BuiltinType::StatusCode, Value::Null) => buf.put_u32_le(0),
        (BuiltinType::QualifiedName, Value::QualifiedName(qn)) => {
            buf.put_u16_le(qn.namespace_index);
            write_bytes(buf, Some(qn.name.as_bytes()));
        }
        (BuiltinType::QualifiedName, Value::Null) => {
            buf.put_u16_le(0);
            write_bytes(buf, None);
        }
        (BuiltinType::LocalizedText, Value::LocalizedText(lt)) => {
            let mut mask = 0u8;
            if lt.locale.is_some() {
                mask |= 0x01;
            }
            if lt.text.is_some() {
                mask |= 0x02;
            }
            buf.put_u8(mask);
            if let Some(locale) = &lt.locale {
                write_bytes(buf, Some(locale.as_bytes()));
            }
            if let Some(text) = &lt.text {
                write_bytes(buf, Some(text.as_bytes()));
            }
        }
        (BuiltinType::LocalizedText, Value::Null) => buf.put_u8(0),
        (BuiltinType::Variant, v) => encode_variant(field, v, catalog, buf)?,
        (BuiltinType::ExtensionObject, Value::ExtensionObject(obj)) => {
            encode_extension_object(obj, catalog, buf)?;
        }
        (BuiltinType::ExtensionObject, Value::Struct(sv)) => {
            let type_id = catalog
                .identifier_of(sv.type_name())
                .ok_or_else(|| Error::UnknownTypeName {
                    name: sv.type_name().to_string(),
                })?;
            encode_node_id(&type_id, buf);
            let mut body = BytesMut::new();
            encode_struct(sv, catalog, &mut body)?;
            buf.put_u8(0x01);
            write_bytes(buf, Some(&body));
        }
        (BuiltinType::ExtensionObject, Value::Null) => {
            encode_extension_object(&ExtensionObject::default(), catalog, buf)?;
        }
        (_, other) => return Err(mismatch(other)),
    }
    Ok(())
}

/// Encodes an extension object: type identifier, encoding byte and
/// length-prefixed body.
///
/// # Errors
/// Returns an error if a decoded body fails to encode.
pub fn encode_extension_object(
    obj: &ExtensionObject,
    catalog: &TypeCatalog,
    buf: &mut BytesMut,
) -> Result<()> {
    encode_node_id(&obj.type_id, buf);
    match &obj.body {
        ExtensionBody::None => buf.put_u8(0x00),
        ExtensionBody::Opaque(bytes) => {
            buf.put_u8(0x01);
            write_bytes(buf, Some(bytes));
        }
        ExtensionBody::Decoded(sv) => {
            let mut body = BytesMut::new();
            encode_struct(sv, catalog, &mut body)?;
            buf.put_u8(0x01);
            write_bytes(buf, Some(&body));
        }
    }
    Ok(())
}

fn encode_variant(
    field: &str,
    value: &Value,
    catalog: &TypeCatalog,
    buf: &mut BytesMut,
) -> Result<()> {
    match value {
        Value::Null => {
            buf.put_u8(0);
            Ok(())
        }
        Value::Array(items) => {
            let Some(first) = items.first() else {
                return Err(Error::UnsupportedVariant { type_byte: 0x80 });
            };
            let id = variant_id_of(first)?;
            buf.put_u8(id | 0x80);
            buf.put_i32_le(items.len() as i32);
            for item in items {
                encode_variant_payload(field, item, catalog, buf)?;
            }
            Ok(())
        }
        scalar => {
            let id = variant_id_of(scalar)?;
            buf.put_u8(id);
            encode_variant_payload(field, scalar, catalog, buf)
        }
    }
}

fn variant_id_of(value: &Value) -> Result<u8> {
    let bt = match value {
        Value::Boolean(_) => BuiltinType::Boolean,
        Value::SByte(_) => BuiltinType::SByte,
        Value::Byte(_) => BuiltinType::Byte,
        Value::Int16(_) => BuiltinType::Int16,
        Value::UInt16(_) => BuiltinType::UInt16,
        Value::Int32(_) | Value::Enum(_) => BuiltinType::Int32,
        Value::UInt32(_) => BuiltinType::UInt32,
        Value::Int64(_) => BuiltinType::Int64,
        Value::UInt64(_) => BuiltinType::UInt64,
        Value::Float(_) => BuiltinType::Float,
        Value::Double(_) => BuiltinType::Double,
        Value::String(_) => BuiltinType::String,
        Value::DateTime(_) => BuiltinType::DateTime,
        Value::Guid(_) => BuiltinType::Guid,
        Value::ByteString(_) => BuiltinType::ByteString,
        Value::XmlElement(_) => BuiltinType::XmlElement,
        Value::NodeId(_) => BuiltinType::NodeId,
        Value::StatusCode(_) => BuiltinType::StatusCode,
        Value::QualifiedName(_) => BuiltinType::QualifiedName,
        Value::LocalizedText(_) => BuiltinType::LocalizedText,
        Value::ExtensionObject(_) | Value::Struct(_) => BuiltinType::ExtensionObject,
        Value::Null | Value::Array(_) => {
            return Err(Error::UnsupportedVariant { type_byte: 0 });
        }
    };
    bt.variant_id()
        .ok_or(Error::UnsupportedVariant { type_byte: 0 })
}

fn encode_variant_payload(
    field: &str,
    value: &Value,
    catalog: &TypeCatalog,
    buf: &mut BytesMut,
) -> Result<()> {
    let bt = match value {
        Value::Enum(_) => BuiltinType::Int32,
        Value::Struct(_) => BuiltinType::ExtensionObject,
        other => match variant_id_of(other) {
            Ok(_) => builtin_of(other),
            Err(e) => return Err(e),
        },
    };
    let coerced = match value {
        Value::Enum(v) => Value::Int32(*v),
        other => other.clone(),
    };
    encode_builtin(field, bt, &coerced, catalog, buf)
}

const fn builtin_of(value: &Value) -> BuiltinType {
    match value {
        Value::Boolean(_) => BuiltinType::Boolean,
        Value::SByte(_) => BuiltinType::SByte,
        Value::Byte(_) => BuiltinType::Byte,
        Value::Int16(_) => BuiltinType::Int16,
        Value::UInt16(_) => BuiltinType::UInt16,
        Value::Int32(_) | Value::Enum(_) => BuiltinType::Int32,
        Value::UInt32(_) => BuiltinType::UInt32,
        Value::Int64(_) => BuiltinType::Int64,
        Value::UInt64(_) => BuiltinType::UInt64,
        Value::Float(_) => BuiltinType::Float,
        Value::Double(_) => BuiltinType::Double,
        Value::String(_) => BuiltinType::String,
        Value::DateTime(_) => BuiltinType::DateTime,
        Value::Guid(_) => BuiltinType::Guid,
        Value::ByteString(_) => BuiltinType::ByteString,
        Value::XmlElement(_) => BuiltinType::XmlElement,
        Value::NodeId(_) => BuiltinType::NodeId,
        Value::StatusCode(_) => BuiltinType::StatusCode,
        Value::QualifiedName(_) => BuiltinType::QualifiedName,
        Value::LocalizedText(_) => BuiltinType::LocalizedText,
        _ => BuiltinType::ExtensionObject,
    }
}

/// Encodes a node identifier in its compact binary form.
pub fn encode_node_id(id: &NodeId, buf: &mut BytesMut) {
    match &id.identifier {
        Identifier::Numeric(v) if id.namespace == 0 && *v <= 0xFF => {
            buf.put_u8(0x00);
            buf.put_u8(*v as u8);
        }
        Identifier::Numeric(v) if id.namespace <= 0xFF && *v <= 0xFFFF => {
            buf.put_u8(0x01);
            buf.put_u8(id.namespace as u8);
            buf.put_u16_le(*v as u16);
        }
        Identifier::Numeric(v) => {
            buf.put_u8(0x02);
            buf.put_u16_le(id.namespace);
            buf.put_u32_le(*v);
        }
        Identifier::String(s) => {
            buf.put_u8(0x03);
            buf.put_u16_le(id.namespace);
            write_bytes(buf, Some(s.as_bytes()));
        }
        Identifier::Guid(g) => {
            buf.put_u8(0x04);
            buf.put_u16_le(id.namespace);
            buf.put_slice(&g.to_bytes());
        }
        Identifier::Opaque(bytes) => {
            buf.put_u8(0x05);
            buf.put_u16_le(id.namespace);
            write_bytes(buf, Some(bytes));
        }
    }
}

fn write_bytes(buf: &mut BytesMut, bytes: Option<&[u8]>) {
    match bytes {
        Some(b) => {
            buf.put_i32_le(b.len() as i32);
            buf.put_slice(b);
        }
        None => buf.put_i32_le(-1),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::{EnumDescriptor, FieldDescriptor};
    use std::sync::Arc;

    fn descriptor(fields: Vec<FieldDescriptor>, option_count: u32) -> Arc<StructDescriptor> {
        Arc::new(StructDescriptor {
            name: "Test".to_string(),
            fields,
            option_count,
        })
    }

    fn field(name: &str, bt: BuiltinType) -> FieldDescriptor {
        FieldDescriptor {
            name: name.to_string(),
            type_ref: TypeRef::Builtin(bt),
            is_array: false,
            is_optional: false,
        }
    }

    #[test]
    fn test_encode_plain_fields() {
        let d = descriptor(
            vec![field("A", BuiltinType::Int32), field("B", BuiltinType::Byte)],
            0,
        );
        let mut v = StructValue::new(d);
        v.set("A", Value::Int32(-2));
        v.set("B", Value::Byte(7));

        let catalog = TypeCatalog::new();
        let mut buf = BytesMut::new();
        encode_struct(&v, &catalog, &mut buf).expect("encode");
        assert_eq!(&buf[..], &[0xFE, 0xFF, 0xFF, 0xFF, 7]);
    }

    #[test]
    fn test_encode_mask_reflects_present_optionals() {
        let mut f1 = field("A", BuiltinType::Int32);
        f1.is_optional = true;
        let mut f2 = field("B", BuiltinType::Int32);
        f2.is_optional = true;
        let d = descriptor(vec![f1, f2], 2);

        let mut v = StructValue::new(d);
        v.set("B", Value::Int32(9));

        let catalog = TypeCatalog::new();
        let mut buf = BytesMut::new();
        encode_struct(&v, &catalog, &mut buf).expect("encode");
        // Mask 0b10: only second optional present; then 9.
        assert_eq!(&buf[..4], &2u32.to_le_bytes());
        assert_eq!(&buf[4..], &9i32.to_le_bytes());
    }

    #[test]
    fn test_encode_array_and_null_array() {
        let mut f = field("Points", BuiltinType::Double);
        f.is_array = true;
        let d = descriptor(vec![f], 0);

        let catalog = TypeCatalog::new();
        let mut v = StructValue::new(d.clone());
        v.set("Points", Value::Array(vec![Value::Double(1.0)]));
        let mut buf = BytesMut::new();
        encode_struct(&v, &catalog, &mut buf).expect("encode");
        assert_eq!(&buf[..4], &1i32.to_le_bytes());
        assert_eq!(buf.len(), 4 + 8);

        let v = StructValue::new(d);
        let mut buf = BytesMut::new();
        encode_struct(&v, &catalog, &mut buf).expect("encode");
        assert_eq!(&buf[..], &(-1i32).to_le_bytes());
    }

    #[test]
    fn test_encode_string_null_and_value() {
        let d = descriptor(vec![field("S", BuiltinType::String)], 0);
        let catalog = TypeCatalog::new();

        let mut v = StructValue::new(d.clone());
        v.set("S", Value::String("ab".to_string()));
        let mut buf = BytesMut::new();
        encode_struct(&v, &catalog, &mut buf).expect("encode");
        assert_eq!(&buf[..], &[2, 0, 0, 0, b'a', b'b']);

        let v = StructValue::new(d);
        let mut buf = BytesMut::new();
        encode_struct(&v, &catalog, &mut buf).expect("encode");
        assert_eq!(&buf[..], &(-1i32).to_le_bytes());
    }

    #[test]
    fn test_encode_enum_validates_membership() {
        let catalog = TypeCatalog::new();
        catalog.commit([LiveType::Enum(Arc::new(EnumDescriptor {
            name: "Color".to_string(),
            members: vec![("Red".to_string(), 0), ("Green".to_string(), 1)],
        }))]);

        let d = descriptor(
            vec![FieldDescriptor {
                name: "C".to_string(),
                type_ref: TypeRef::Named("Color".to_string()),
                is_array: false,
                is_optional: false,
            }],
            0,
        );

        let mut v = StructValue::new(d.clone());
        v.set("C", Value::Enum(1));
        let mut buf = BytesMut::new();
        encode_struct(&v, &catalog, &mut buf).expect("encode");
        assert_eq!(&buf[..], &1i32.to_le_bytes());

        let mut v = StructValue::new(d);
        v.set("C", Value::Enum(5));
        let mut buf = BytesMut::new();
        let err = encode_struct(&v, &catalog, &mut buf).unwrap_err();
        assert!(matches!(err, Error::InvalidEnumValue { .. }));
    }

    #[test]
    fn test_encode_type_mismatch() {
        let d = descriptor(vec![field("A", BuiltinType::Int32)], 0);
        let mut v = StructValue::new(d);
        v.set("A", Value::String("oops".to_string()));
        let catalog = TypeCatalog::new();
        let mut buf = BytesMut::new();
        let err = encode_struct(&v, &catalog, &mut buf).unwrap_err();
        assert!(matches!(err, Error::TypeMismatch { .. }));
    }

    #[test]
    fn test_encode_node_id_forms() {
        let mut buf = BytesMut::new();
        encode_node_id(&NodeId::numeric(0, 5), &mut buf);
        assert_eq!(&buf[..], &[0x00, 5]);

        let mut buf = BytesMut::new();
        encode_node_id(&NodeId::numeric(2, 300), &mut buf);
        assert_eq!(&buf[..], &[0x01, 2, 0x2C, 0x01]);

        let mut buf = BytesMut::new();
        encode_node_id(&NodeId::numeric(300, 70000), &mut buf);
        assert_eq!(buf[0], 0x02);
    }
}
