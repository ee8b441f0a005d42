//! Protocol node identifiers.

use crate::builtin::Guid;
use crate::error::{Error, Result};
use std::fmt;
use std::str::FromStr;

/// The identifier part of a [`NodeId`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Identifier {
    /// Numeric identifier.
    Numeric(u32),
    /// String identifier.
    String(String),
    /// GUID identifier.
    Guid(Guid),
    /// Opaque byte identifier.
    Opaque(Vec<u8>),
}

/// A namespace-qualified node identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NodeId {
    /// Namespace index.
    pub namespace: u16,
    /// Identifier within the namespace.
    pub identifier: Identifier,
}

impl NodeId {
    /// Creates a numeric node identifier.
    #[must_use]
    pub const fn numeric(namespace: u16, value: u32) -> Self {
        Self {
            namespace,
            identifier: Identifier::Numeric(value),
        }
    }

    /// Creates a string node identifier.
    #[must_use]
    pub fn string(namespace: u16, value: impl Into<String>) -> Self {
        Self {
            namespace,
            identifier: Identifier::String(value.into()),
        }
    }

    /// Parses a node identifier from its string form, e.g. `ns=2;i=1234`,
    /// `s=MyType`, `g=<guid>` or `b=<hex>`.
    ///
    /// # Errors
    /// Returns `Error::InvalidNodeId` if the text is malformed.
    pub fn parse(text: &str) -> Result<Self> {
        let invalid = || Error::InvalidNodeId {
            text: text.to_string(),
        };

        let mut namespace = 0u16;
        let mut rest = text;
        if let Some(stripped) = text.strip_prefix("ns=") {
            let (ns, tail) = stripped.split_once(';').ok_or_else(invalid)?;
            namespace = ns.parse().map_err(|_| invalid())?;
            rest = tail;
        }

        let (kind, value) = rest.split_once('=').ok_or_else(invalid)?;
        let identifier = match kind {
            "i" => Identifier::Numeric(value.parse().map_err(|_| invalid())?),
            "s" => Identifier::String(value.to_string()),
            "g" => Identifier::Guid(Guid::parse(value)?),
            "b" => Identifier::Opaque(decode_hex(value).ok_or_else(invalid)?),
            _ => return Err(invalid()),
        };

        Ok(Self {
            namespace,
            identifier,
        })
    }
}

impl Default for NodeId {
    fn default() -> Self {
        Self::numeric(0, 0)
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.namespace != 0 {
            write!(f, "ns={};", self.namespace)?;
        }
        match &self.identifier {
            Identifier::Numeric(v) => write!(f, "i={v}"),
            Identifier::String(s) => write!(f, "s={s}"),
            Identifier::Guid(g) => write!(f, "g={g}"),
            Identifier::Opaque(bytes) => {
                write!(f, "b=")?;
                for b in bytes {
                    write!(f, "{b:02x}")?;
                }
                Ok(())
            }
        }
    }
}

impl FromStr for NodeId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

fn decode_hex(text: &str) -> Option<Vec<u8>> {
    if text.len() % 2 != 0 {
        return None;
    }
    (0..text.len() / 2)
        .map(|i| u8::from_str_radix(&text[i * 2..i * 2 + 2], 16).ok())
        .collect()
}
