//! Generic structural decoder.
//!
//! Mirrors [`crate::encoder`]: walks a [`StructDescriptor`] and consumes
//! the binary form field by field, reconstructing absent optional fields
//! as [`Value::Null`] from the leading encoding mask.

use crate::builtin::{BuiltinType, Guid, ticks_to_datetime};
use crate::catalog::TypeCatalog;
use crate::descriptor::{FieldDescriptor, LiveType, StructDescriptor, TypeRef};
use crate::error::{Error, Result};
use crate::nodeid::{Identifier, NodeId};
use crate::value::{
    ExtensionBody, ExtensionObject, LocalizedText, QualifiedName, StructValue, Value,
};
use std::sync::Arc;

/// Decodes a structure instance from `input`, advancing it past the
/// consumed bytes.
///
/// # Errors
/// Returns an error on truncated input, unresolvable named types or
/// undeclared enum values.
pub fn decode_struct(
    descriptor: &Arc<StructDescriptor>,
    catalog: &TypeCatalog,
    input: &mut &[u8],
) -> Result<StructValue> {
    let mask = if descriptor.option_count > 0 {
        read_u32(input)?
    } else {
        0
    };

    let mut values = Vec::with_capacity(descriptor.fields.len());
    let mut bit = 0u32;
    for fd in &descriptor.fields {
        if fd.is_optional {
            let present = mask & (1 << bit) != 0;
            bit += 1;
            if !present {
                values.push(Value::Null);
                continue;
            }
        }
        values.push(decode_field(fd, catalog, input)?);
    }
    Ok(StructValue::from_values(descriptor.clone(), values))
}

fn decode_field(
    fd: &FieldDescriptor,
    catalog: &TypeCatalog,
    input: &mut &[u8],
) -> Result<Value> {
    if fd.is_array {
        let len = read_i32(input)?;
        if len < 0 {
            return Ok(Value::Null);
        }
        let mut items = Vec::with_capacity(len.min(4096) as usize);
        for _ in 0..len {
            items.push(decode_scalar(&fd.name, &fd.type_ref, catalog, input)?);
        }
        return Ok(Value::Array(items));
    }
    decode_scalar(&fd.name, &fd.type_ref, catalog, input)
}

fn decode_scalar(
    field: &str,
    type_ref: &TypeRef,
    catalog: &TypeCatalog,
    input: &mut &[u8],
) -> Result<Value> {
    match type_ref {
        TypeRef::Builtin(bt) => decode_builtin(field, *bt, catalog, input),
        TypeRef::Named(name) => match catalog.get(name) {
            Some(LiveType::Enum(e)) => {
                let raw = read_i32(input)?;
                if !e.contains_value(i64::from(raw)) {
                    return Err(Error::InvalidEnumValue {
                        enum_name: name.clone(),
                        value: i64::from(raw),
                    });
                }
                Ok(Value::Enum(raw))
            }
            Some(LiveType::Struct(sd)) => {
                Ok(Value::Struct(decode_struct(&sd, catalog, input)?))
            }
            None => Err(Error::UnknownTypeName { name: name.clone() }),
        },
    }
}

fn decode_builtin(
    field: &str,
    bt: BuiltinType,
    catalog: &TypeCatalog,
    input: &mut &[u8],
) -> Result<Value> {
    Ok(match bt {
        BuiltinType::Boolean => Value::Boolean(read_u8(input)? != 0),
        BuiltinType::SByte => Value::SByte(read_u8(input)? as i8),
        BuiltinType::Byte | BuiltinType::Char => Value::Byte(read_u8(input)?),
        BuiltinType::Int16 => Value::Int16(read_u16(input)? as i16),
        BuiltinType::UInt16 => Value::UInt16(read_u16(input)?),
        BuiltinType::Int32 => Value::Int32(read_i32(input)?),
        BuiltinType::UInt32 => Value::UInt32(read_u32(input)?),
        BuiltinType::Int64 => Value::Int64(read_i64(input)?),
        BuiltinType::UInt64 => Value::UInt64(read_i64(input)? as u64),
        BuiltinType::Float => Value::Float(f32::from_le_bytes(take_array::<4>(input)?)),
        BuiltinType::Double => Value::Double(f64::from_le_bytes(take_array::<8>(input)?)),
        BuiltinType::String => match read_opt_bytes(input)? {
            Some(bytes) => Value::String(utf8(field, bytes)?),
            None => Value::Null,
        },
        BuiltinType::XmlElement => match read_opt_bytes(input)? {
            Some(bytes) => Value::XmlElement(utf8(field, bytes)?),
            None => Value::Null,
        },
        BuiltinType::DateTime => Value::DateTime(ticks_to_datetime(read_i64(input)?)),
        BuiltinType::Guid => Value::Guid(Guid::from_bytes(&take_array::<16>(input)?)),
        BuiltinType::ByteString => match read_opt_bytes(input)? {
            Some(bytes) => Value::ByteString(bytes.to_vec()),
            None => Value::Null,
        },
        BuiltinType::NodeId => Value::NodeId(decode_node_id(field, input)?),
        BuiltinType::StatusCode => Value::StatusCode(read_u32(input)?),
        BuiltinType::QualifiedName => {
            let namespace_index = read_u16(input)?;
            let name = match read_opt_bytes(input)? {
                Some(bytes) => utf8(field, bytes)?,
                None => String::new(),
            };
            Value::QualifiedName(QualifiedName {
                namespace_index,
                name,
            })
        }
        BuiltinType::LocalizedText => {
            let mask = read_u8(input)?;
            let locale = if mask & 0x01 != 0 {
                read_opt_bytes(input)?.map(|b| utf8(field, b)).transpose()?
            } else {
                None
            };
            let text = if mask & 0x02 != 0 {
                read_opt_bytes(input)?.map(|b| utf8(field, b)).transpose()?
            } else {
                None
            };
            Value::LocalizedText(LocalizedText { locale, text })
        }
        BuiltinType::Variant => decode_variant(field, catalog, input)?,
        BuiltinType::ExtensionObject => {
            Value::ExtensionObject(Box::new(decode_extension_object(catalog, input)?))
        }
    })
}

/// Decodes an extension object, dispatching the body through the catalog.
///
/// A type identifier with no registered type yields an opaque body rather
/// than an error, so unknown payloads survive a round trip untouched.
///
/// # Errors
/// Returns an error on truncated input or a body that fails structural
/// decoding.
pub fn decode_extension_object(
    catalog: &TypeCatalog,
    input: &mut &[u8],
) -> Result<ExtensionObject> {
    let type_id = decode_node_id("ExtensionObject", input)?;
    let encoding = read_u8(input)?;
    let body = match encoding {
        0x00 => ExtensionBody::None,
        _ => {
            let Some(bytes) = read_opt_bytes(input)? else {
                return Ok(ExtensionObject {
                    type_id,
                    body: ExtensionBody::None,
                });
            };
            match catalog.resolve_id(&type_id) {
                Some(LiveType::Struct(sd)) => {
                    let mut body_input = bytes;
                    ExtensionBody::Decoded(decode_struct(&sd, catalog, &mut body_input)?)
                }
                _ => ExtensionBody::Opaque(bytes.to_vec()),
            }
        }
    };
    Ok(ExtensionObject { type_id, body })
}

fn decode_variant(field: &str, catalog: &TypeCatalog, input: &mut &[u8]) -> Result<Value> {
    let type_byte = read_u8(input)?;
    if type_byte == 0 {
        return Ok(Value::Null);
    }
    let is_array = type_byte & 0x80 != 0;
    let id = type_byte & 0x3F;
    let bt = variant_builtin(id).ok_or(Error::UnsupportedVariant { type_byte })?;
    if is_array {
        let len = read_i32(input)?;
        if len < 0 {
            return Ok(Value::Null);
        }
        let mut items = Vec::with_capacity(len.min(4096) as usize);
        for _ in 0..len {
            items.push(decode_builtin(field, bt, catalog, input)?);
        }
        Ok(Value::Array(items))
    } else {
        decode_builtin(field, bt, catalog, input)
    }
}

const fn variant_builtin(id: u8) -> Option<BuiltinType> {
    match id {
        1 => Some(BuiltinType::Boolean),
        2 => Some(BuiltinType::SByte),
        3 => Some(BuiltinType::Byte),
        4 => Some(BuiltinType::Int16),
        5 => Some(BuiltinType::UInt16),
        6 => Some(BuiltinType::Int32),
        7 => Some(BuiltinType::UInt32),
        8 => Some(BuiltinType::Int64),
        9 => Some(BuiltinType::UInt64),
        10 => Some(BuiltinType::Float),
        11 => Some(BuiltinType::Double),
        12 => Some(BuiltinType::String),
        13 => Some(BuiltinType::DateTime),
        14 => Some(BuiltinType::Guid),
        15 => Some(BuiltinType::ByteString),
        16 => Some(BuiltinType::XmlElement),
        17 => Some(BuiltinType::NodeId),
        19 => Some(BuiltinType::StatusCode),
        20 => Some(BuiltinType::QualifiedName),
        21 => Some(BuiltinType::LocalizedText),
        22 => Some(BuiltinType::ExtensionObject),
        _ => None,
    }
}

fn decode_node_id(field: &str, input: &mut &[u8]) -> Result<NodeId> {
    let encoding = read_u8(input)? & 0x0F;
    Ok(match encoding {
        0x00 => NodeId::numeric(0, u32::from(read_u8(input)?)),
        0x01 => {
            let namespace = u16::from(read_u8(input)?);
            NodeId::numeric(namespace, u32::from(read_u16(input)?))
        }
        0x02 => {
            let namespace = read_u16(input)?;
            NodeId::numeric(namespace, read_u32(input)?)
        }
        0x03 => {
            let namespace = read_u16(input)?;
            let name = match read_opt_bytes(input)? {
                Some(bytes) => utf8(field, bytes)?,
                None => String::new(),
            };
            NodeId::string(namespace, name)
        }
        0x04 => {
            let namespace = read_u16(input)?;
            let guid = Guid::from_bytes(&take_array::<16>(input)?);
            NodeId {
                namespace,
                identifier: Identifier::Guid(guid),
            }
        }
        _ => {
            let namespace = read_u16(input)?;
            let bytes = read_opt_bytes(input)?.map(<[u8]>::to_vec).unwrap_or_default();
            NodeId {
                namespace,
                identifier: Identifier::Opaque(bytes),
            }
        }
    })
}

fn take<'a>(input: &mut &'a [u8], n: usize) -> Result<&'a [u8]> {
    if input.len() < n {
        return Err(Error::BufferTooShort {
            required: n,
            available: input.len(),
        });
    }
    let (head, tail) = input.split_at(n);
    *input = tail;
    Ok(head)
}

fn take_array<const N: usize>(input: &mut &[u8]) -> Result<[u8; N]> {
    let slice = take(input, N)?;
    let mut out = [0u8; N];
    out.copy_from_slice(slice);
    Ok(out)
}

fn read_u8(input: &mut &[u8]) -> Result<u8> {
    Ok(take(input, 1)?[0])
}

fn read_u16(input: &mut &[u8]) -> Result<u16> {
    Ok(u16::from_le_bytes(take_array::<2>(input)?))
}

fn read_i32(input: &mut &[u8]) -> Result<i32> {
    Ok(i32::from_le_bytes(take_array::<4>(input)?))
}

fn read_u32(input: &mut &[u8]) -> Result<u32> {
    Ok(u32::from_le_bytes(take_array::<4>(input)?))
}

fn read_i64(input: &mut &[u8]) -> Result<i64> {
    Ok(i64::from_le_bytes(take_array::<8>(input)?))
}

fn read_opt_bytes<'a>(input: &mut &'a [u8]) -> Result<Option<&'a [u8]>> {
    let len = read_i32(input)?;
    if len < 0 {
        return Ok(None);
    }
    Ok(Some(take(input, len as usize)?))
}

fn utf8(field: &str, bytes: &[u8]) -> Result<String> {
    String::from_utf8(bytes.to_vec()).map_err(|_| Error::InvalidUtf8 {
        field: field.to_string(),
    })
}
