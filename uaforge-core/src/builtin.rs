//! Builtin protocol types recognized by the schema pipeline and the codec.
//!
//! Type names here are the ones binary schema dictionaries use
//! (`Int32`, `ByteString`, ...); the namespace prefix of a schema
//! `TypeName` is always stripped before lookup.

use crate::error::{Error, Result};
use chrono::{DateTime, Duration, Utc};

/// Builtin type enumeration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BuiltinType {
    /// Boolean (1 byte).
    Boolean,
    /// Signed 8-bit integer.
    SByte,
    /// Unsigned 8-bit integer.
    Byte,
    /// Signed 16-bit integer.
    Int16,
    /// Unsigned 16-bit integer.
    UInt16,
    /// Signed 32-bit integer.
    Int32,
    /// Unsigned 32-bit integer.
    UInt32,
    /// Signed 64-bit integer.
    Int64,
    /// Unsigned 64-bit integer.
    UInt64,
    /// 32-bit floating point.
    Float,
    /// 64-bit floating point.
    Double,
    /// Single character cell; arrays of Char collapse to String.
    Char,
    /// Length-prefixed UTF-8 string, nullable.
    String,
    /// 100 ns ticks since 1601-01-01 UTC.
    DateTime,
    /// 16-byte GUID.
    Guid,
    /// Length-prefixed raw bytes, nullable.
    ByteString,
    /// XML fragment, encoded like a string.
    XmlElement,
    /// Node identifier.
    NodeId,
    /// 32-bit status code.
    StatusCode,
    /// Namespace-qualified name.
    QualifiedName,
    /// Locale-tagged text.
    LocalizedText,
    /// Self-describing value.
    Variant,
    /// Type-identified container for registered structures.
    ExtensionObject,
}

impl BuiltinType {
    /// Looks up a builtin by its dictionary type name (no namespace prefix).
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "Boolean" => Some(Self::Boolean),
            "SByte" => Some(Self::SByte),
            "Byte" => Some(Self::Byte),
            "Int16" => Some(Self::Int16),
            "UInt16" => Some(Self::UInt16),
            "Int32" => Some(Self::Int32),
            "UInt32" => Some(Self::UInt32),
            "Int64" => Some(Self::Int64),
            "UInt64" => Some(Self::UInt64),
            "Float" => Some(Self::Float),
            "Double" => Some(Self::Double),
            "Char" => Some(Self::Char),
            "String" | "CharArray" => Some(Self::String),
            "DateTime" => Some(Self::DateTime),
            "Guid" => Some(Self::Guid),
            "ByteString" => Some(Self::ByteString),
            "XmlElement" => Some(Self::XmlElement),
            "NodeId" | "ExpandedNodeId" => Some(Self::NodeId),
            "StatusCode" => Some(Self::StatusCode),
            "QualifiedName" => Some(Self::QualifiedName),
            "LocalizedText" => Some(Self::LocalizedText),
            "Variant" | "BaseDataType" => Some(Self::Variant),
            "ExtensionObject" | "Structure" => Some(Self::ExtensionObject),
            _ => None,
        }
    }

    /// Returns the dictionary type name.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Boolean => "Boolean",
            Self::SByte => "SByte",
            Self::Byte => "Byte",
            Self::Int16 => "Int16",
            Self::UInt16 => "UInt16",
            Self::Int32 => "Int32",
            Self::UInt32 => "UInt32",
            Self::Int64 => "Int64",
            Self::UInt64 => "UInt64",
            Self::Float => "Float",
            Self::Double => "Double",
            Self::Char => "Char",
            Self::String => "String",
            Self::DateTime => "DateTime",
            Self::Guid => "Guid",
            Self::ByteString => "ByteString",
            Self::XmlElement => "XmlElement",
            Self::NodeId => "NodeId",
            Self::StatusCode => "StatusCode",
            Self::QualifiedName => "QualifiedName",
            Self::LocalizedText => "LocalizedText",
            Self::Variant => "Variant",
            Self::ExtensionObject => "ExtensionObject",
        }
    }

    /// Returns the Rust type name used by emitted definitions.
    #[must_use]
    pub const fn rust_type(&self) -> &'static str {
        match self {
            Self::Boolean => "bool",
            Self::SByte => "i8",
            Self::Byte | Self::Char => "u8",
            Self::Int16 => "i16",
            Self::UInt16 => "u16",
            Self::Int32 => "i32",
            Self::UInt32 | Self::StatusCode => "u32",
            Self::Int64 => "i64",
            Self::UInt64 => "u64",
            Self::Float => "f32",
            Self::Double => "f64",
            Self::String | Self::XmlElement => "String",
            Self::DateTime => "chrono::DateTime<chrono::Utc>",
            Self::Guid => "Guid",
            Self::ByteString => "Vec<u8>",
            Self::NodeId => "NodeId",
            Self::QualifiedName => "QualifiedName",
            Self::LocalizedText => "LocalizedText",
            Self::Variant => "Value",
            Self::ExtensionObject => "ExtensionObject",
        }
    }

    /// Returns the zero-equivalent default expression used by emitted
    /// definitions.
    #[must_use]
    pub const fn default_expr(&self) -> &'static str {
        match self {
            Self::Boolean => "false",
            Self::SByte
            | Self::Byte
            | Self::Char
            | Self::Int16
            | Self::UInt16
            | Self::Int32
            | Self::UInt32
            | Self::StatusCode
            | Self::Int64
            | Self::UInt64 => "0",
            Self::Float | Self::Double => "0.0",
            Self::String | Self::XmlElement => "String::new()",
            Self::DateTime => "ua_epoch()",
            Self::Guid => "Guid::NIL",
            Self::ByteString => "Vec::new()",
            Self::NodeId => "NodeId::default()",
            Self::QualifiedName => "QualifiedName::default()",
            Self::LocalizedText => "LocalizedText::default()",
            Self::Variant => "Value::Null",
            Self::ExtensionObject => "ExtensionObject::default()",
        }
    }

    /// Returns the variant type byte for this builtin, if it has one.
    #[must_use]
    pub const fn variant_id(&self) -> Option<u8> {
        match self {
            Self::Boolean => Some(1),
            Self::SByte => Some(2),
            Self::Byte | Self::Char => Some(3),
            Self::Int16 => Some(4),
            Self::UInt16 => Some(5),
            Self::Int32 => Some(6),
            Self::UInt32 => Some(7),
            Self::Int64 => Some(8),
            Self::UInt64 => Some(9),
            Self::Float => Some(10),
            Self::Double => Some(11),
            Self::String => Some(12),
            Self::DateTime => Some(13),
            Self::Guid => Some(14),
            Self::ByteString => Some(15),
            Self::XmlElement => Some(16),
            Self::NodeId => Some(17),
            Self::StatusCode => Some(19),
            Self::QualifiedName => Some(20),
            Self::LocalizedText => Some(21),
            Self::ExtensionObject => Some(22),
            Self::Variant => None,
        }
    }
}

/// 16-byte globally unique identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Guid {
    /// First group (32 bits).
    pub data1: u32,
    /// Second group (16 bits).
    pub data2: u16,
    /// Third group (16 bits).
    pub data3: u16,
    /// Final eight bytes.
    pub data4: [u8; 8],
}

impl Guid {
    /// The all-zero GUID.
    pub const NIL: Self = Self {
        data1: 0,
        data2: 0,
        data3: 0,
        data4: [0; 8],
    };

    /// Parses a GUID from its canonical hyphenated form.
    ///
    /// # Errors
    /// Returns `Error::InvalidGuid` if the text is not a valid GUID.
    pub fn parse(text: &str) -> Result<Self> {
        let invalid = || Error::InvalidGuid {
            text: text.to_string(),
        };
        let parts: Vec<&str> = text.split('-').collect();
        if parts.len() != 5
            || parts[0].len() != 8
            || parts[1].len() != 4
            || parts[2].len() != 4
            || parts[3].len() != 4
            || parts[4].len() != 12
        {
            return Err(invalid());
        }
        let data1 = u32::from_str_radix(parts[0], 16).map_err(|_| invalid())?;
        let data2 = u16::from_str_radix(parts[1], 16).map_err(|_| invalid())?;
        let data3 = u16::from_str_radix(parts[2], 16).map_err(|_| invalid())?;
        let tail = format!("{}{}", parts[3], parts[4]);
        let mut data4 = [0u8; 8];
        for (i, byte) in data4.iter_mut().enumerate() {
            *byte = u8::from_str_radix(&tail[i * 2..i * 2 + 2], 16).map_err(|_| invalid())?;
        }
        Ok(Self {
            data1,
            data2,
            data3,
            data4,
        })
    }

    /// Returns the wire representation (mixed-endian, 16 bytes).
    #[must_use]
    pub fn to_bytes(&self) -> [u8; 16] {
        let mut out = [0u8; 16];
        out[0..4].copy_from_slice(&self.data1.to_le_bytes());
        out[4..6].copy_from_slice(&self.data2.to_le_bytes());
        out[6..8].copy_from_slice(&self.data3.to_le_bytes());
        out[8..16].copy_from_slice(&self.data4);
        out
    }

    /// Builds a GUID from its wire representation.
    #[must_use]
    pub fn from_bytes(bytes: &[u8; 16]) -> Self {
        Self {
            data1: u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]),
            data2: u16::from_le_bytes([bytes[4], bytes[5]]),
            data3: u16::from_le_bytes([bytes[6], bytes[7]]),
            data4: [
                bytes[8], bytes[9], bytes[10], bytes[11], bytes[12], bytes[13], bytes[14],
                bytes[15],
            ],
        }
    }
}

impl std::fmt::Display for Guid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{:08x}-{:04x}-{:04x}-{:02x}{:02x}-{:02x}{:02x}{:02x}{:02x}{:02x}{:02x}",
            self.data1,
            self.data2,
            self.data3,
            self.data4[0],
            self.data4[1],
            self.data4[2],
            self.data4[3],
            self.data4[4],
            self.data4[5],
            self.data4[6],
            self.data4[7],
        )
    }
}

/// Seconds between the protocol epoch (1601-01-01 UTC) and the Unix epoch.
const EPOCH_OFFSET_SECS: i64 = -11_644_473_600;

/// Returns the protocol epoch, 1601-01-01T00:00:00Z.
#[must_use]
pub fn ua_epoch() -> DateTime<Utc> {
    DateTime::<Utc>::from_timestamp(EPOCH_OFFSET_SECS, 0).unwrap_or(DateTime::<Utc>::UNIX_EPOCH)
}

/// Converts a timestamp to 100 ns ticks since the protocol epoch.
#[must_use]
pub fn datetime_to_ticks(dt: DateTime<Utc>) -> i64 {
    let delta = dt.signed_duration_since(ua_epoch());
    delta.num_seconds().saturating_mul(10_000_000) + i64::from(delta.subsec_nanos()) / 100
}

/// Converts 100 ns ticks since the protocol epoch to a timestamp.
///
/// Ticks outside the representable range clamp to the epoch.
#[must_use]
pub fn ticks_to_datetime(ticks: i64) -> DateTime<Utc> {
    let secs = ticks.div_euclid(10_000_000);
    let nanos = ticks.rem_euclid(10_000_000) * 100;
    ua_epoch()
        .checked_add_signed(Duration::seconds(secs) + Duration::nanoseconds(nanos))
        .unwrap_or_else(ua_epoch)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_from_name() {
        assert_eq!(BuiltinType::from_name("Int32"), Some(BuiltinType::Int32));
        assert_eq!(
            BuiltinType::from_name("ByteString"),
            Some(BuiltinType::ByteString)
        );
        assert_eq!(
            BuiltinType::from_name("CharArray"),
            Some(BuiltinType::String)
        );
        assert_eq!(BuiltinType::from_name("NotAType"), None);
    }

    #[test]
    fn test_builtin_name_round_trip() {
        for bt in [
            BuiltinType::Boolean,
            BuiltinType::Double,
            BuiltinType::LocalizedText,
            BuiltinType::ExtensionObject,
        ] {
            assert_eq!(BuiltinType::from_name(bt.name()), Some(bt));
        }
    }

    #[test]
    fn test_guid_parse_display_round_trip() {
        let text = "72962b91-fa75-4ae6-8d28-b404dc7daf63";
        let guid = Guid::parse(text).expect("valid guid");
        assert_eq!(guid.to_string(), text);
        assert_eq!(Guid::from_bytes(&guid.to_bytes()), guid);
    }

    #[test]
    fn test_guid_parse_invalid() {
        assert!(Guid::parse("not-a-guid").is_err());
        assert!(Guid::parse("72962b91-fa75-4ae6-8d28").is_err());
    }

    #[test]
    fn test_nil_guid_is_default() {
        assert_eq!(Guid::default(), Guid::NIL);
        assert_eq!(
            Guid::NIL.to_string(),
            "00000000-0000-0000-0000-000000000000"
        );
    }

    #[test]
    fn test_datetime_ticks_round_trip() {
        let dt = DateTime::<Utc>::from_timestamp(1_700_000_000, 123_456_700).expect("timestamp");
        let ticks = datetime_to_ticks(dt);
        assert_eq!(ticks_to_datetime(ticks), dt);
    }

    #[test]
    fn test_epoch_is_zero_ticks() {
        assert_eq!(datetime_to_ticks(ua_epoch()), 0);
        assert_eq!(ticks_to_datetime(0), ua_epoch());
    }
}
