//! Well-known numeric node identifiers from the standard namespace.

/// The `OPC Binary` type-system container node.
pub const OPC_BINARY_TYPE_SYSTEM: u32 = 93;

/// The abstract `Enumeration` data type node.
pub const ENUMERATION: u32 = 29;

/// Reference type identifiers.
pub mod references {
    /// `HasEncoding` reference type.
    pub const HAS_ENCODING: u32 = 38;
    /// `HasDescription` reference type.
    pub const HAS_DESCRIPTION: u32 = 39;
    /// `HasSubtype` reference type.
    pub const HAS_SUBTYPE: u32 = 45;
    /// `HasProperty` reference type.
    pub const HAS_PROPERTY: u32 = 46;
    /// `HasComponent` reference type.
    pub const HAS_COMPONENT: u32 = 47;
}
