//! Binary schema dictionary XML parser.
//!
//! Parses the type dictionary dialect served by protocol servers into an
//! ordered sequence of raw type declarations. Matching ignores namespace
//! prefixes and tolerates unknown elements for forward compatibility;
//! the only hard failure is malformed XML or a malformed attribute.

use crate::error::SchemaParseError;
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

/// A raw declaration from one dictionary, in document order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeDeclaration {
    /// An enumerated type declaration.
    Enum(EnumDecl),
    /// A structured type declaration.
    Struct(StructDecl),
}

/// Raw enumerated type: name plus ordered (name, value) pairs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumDecl {
    /// Declared name, unsanitized.
    pub name: String,
    /// Members in declared order with their exact integer values.
    pub values: Vec<(String, i64)>,
}

/// Raw structured type: name plus field descriptors in declared order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructDecl {
    /// Declared name, unsanitized.
    pub name: String,
    /// Raw fields, including markers and filler cells.
    pub fields: Vec<RawField>,
}

/// One raw field descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawField {
    /// Declared field name, unsanitized.
    pub name: String,
    /// Declared type name, possibly namespace-qualified.
    pub type_name: String,
    /// Switch-field marker; non-empty means the field is optional.
    pub switch_field: Option<String>,
}

/// Parses a schema dictionary from a string.
///
/// # Errors
/// Returns `SchemaParseError` if the XML is malformed or an enum value
/// does not parse as an integer.
pub fn parse_declarations(xml: &str) -> Result<Vec<TypeDeclaration>, SchemaParseError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut declarations = Vec::new();
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => {
                let name_bytes = e.name().as_ref().to_vec();
                match local_name(&name_bytes)? {
                    "EnumeratedType" => {
                        let decl = parse_enum(&mut reader, e)?;
                        declarations.push(TypeDeclaration::Enum(decl));
                    }
                    "StructuredType" => {
                        let decl = parse_struct(&mut reader, e)?;
                        declarations.push(TypeDeclaration::Struct(decl));
                    }
                    _ => {}
                }
            }
            Ok(Event::Empty(ref e)) => {
                let name_bytes = e.name().as_ref().to_vec();
                match local_name(&name_bytes)? {
                    "EnumeratedType" => declarations.push(TypeDeclaration::Enum(EnumDecl {
                        name: require_attr(e, "EnumeratedType", "Name")?,
                        values: Vec::new(),
                    })),
                    "StructuredType" => declarations.push(TypeDeclaration::Struct(StructDecl {
                        name: require_attr(e, "StructuredType", "Name")?,
                        fields: Vec::new(),
                    })),
                    _ => {}
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(SchemaParseError::Xml(e)),
            _ => {}
        }
        buf.clear();
    }

    Ok(declarations)
}

/// Parses a schema dictionary from a file.
///
/// # Errors
/// Returns `SchemaParseError` on IO failure or malformed XML.
pub fn parse_declarations_file(
    path: impl AsRef<std::path::Path>,
) -> Result<Vec<TypeDeclaration>, SchemaParseError> {
    let xml = std::fs::read_to_string(path)?;
    parse_declarations(&xml)
}

/// Parses an enumerated type element.
fn parse_enum(
    reader: &mut Reader<&[u8]>,
    e: &BytesStart<'_>,
) -> Result<EnumDecl, SchemaParseError> {
    let name = require_attr(e, "EnumeratedType", "Name")?;
    let mut values = Vec::new();
    let mut buf = Vec::new();
    let mut depth = 1usize;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref child)) => {
                depth += 1;
                let name_bytes = child.name().as_ref().to_vec();
                if local_name(&name_bytes)? == "EnumeratedValue" {
                    values.push(parse_enum_value(child)?);
                }
            }
            Ok(Event::Empty(ref child)) => {
                let name_bytes = child.name().as_ref().to_vec();
                if local_name(&name_bytes)? == "EnumeratedValue" {
                    values.push(parse_enum_value(child)?);
                }
            }
            Ok(Event::End(_)) => {
                depth -= 1;
                if depth == 0 {
                    break;
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(SchemaParseError::Xml(e)),
            _ => {}
        }
        buf.clear();
    }

    Ok(EnumDecl { name, values })
}

/// Parses one enumerated value element.
fn parse_enum_value(e: &BytesStart<'_>) -> Result<(String, i64), SchemaParseError> {
    let name = require_attr(e, "EnumeratedValue", "Name")?;
    let raw = require_attr(e, "EnumeratedValue", "Value")?;
    let value = raw
        .parse()
        .map_err(|_| SchemaParseError::invalid_attr("EnumeratedValue", "Value", raw))?;
    Ok((name, value))
}

/// Parses a structured type element.
fn parse_struct(
    reader: &mut Reader<&[u8]>,
    e: &BytesStart<'_>,
) -> Result<StructDecl, SchemaParseError> {
    let name = require_attr(e, "StructuredType", "Name")?;
    let mut fields = Vec::new();
    let mut buf = Vec::new();
    let mut depth = 1usize;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref child)) => {
                depth += 1;
                let name_bytes = child.name().as_ref().to_vec();
                if local_name(&name_bytes)? == "Field" {
                    fields.push(parse_field(child)?);
                }
            }
            Ok(Event::Empty(ref child)) => {
                let name_bytes = child.name().as_ref().to_vec();
                if local_name(&name_bytes)? == "Field" {
                    fields.push(parse_field(child)?);
                }
            }
            Ok(Event::End(_)) => {
                depth -= 1;
                if depth == 0 {
                    break;
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(SchemaParseError::Xml(e)),
            _ => {}
        }
        buf.clear();
    }

    Ok(StructDecl { name, fields })
}

/// Parses one field element.
fn parse_field(e: &BytesStart<'_>) -> Result<RawField, SchemaParseError> {
    let name = require_attr(e, "Field", "Name")?;
    let type_name = require_attr(e, "Field", "TypeName")?;
    let switch_field = optional_attr(e, "SwitchField")?.filter(|s| !s.is_empty());
    Ok(RawField {
        name,
        type_name,
        switch_field,
    })
}

/// Returns the tag name with any namespace prefix stripped.
fn local_name(name: &[u8]) -> Result<&str, SchemaParseError> {
    let full = std::str::from_utf8(name)?;
    Ok(full.rsplit(':').next().unwrap_or(full))
}

fn require_attr(
    e: &BytesStart<'_>,
    element: &str,
    attribute: &str,
) -> Result<String, SchemaParseError> {
    optional_attr(e, attribute)?
        .ok_or_else(|| SchemaParseError::missing_attr(element, attribute))
}

fn optional_attr(e: &BytesStart<'_>, attribute: &str) -> Result<Option<String>, SchemaParseError> {
    for attr in e.attributes().flatten() {
        let key = std::str::from_utf8(attr.key.as_ref())?;
        if key == attribute {
            return Ok(Some(std::str::from_utf8(&attr.value)?.to_string()));
        }
    }
    Ok(None)
}
