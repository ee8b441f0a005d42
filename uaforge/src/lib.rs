//! # uaforge
//!
//! Schema-driven custom structure types for OPC UA binary encoding.
//!
//! uaforge turns the binary schema dictionaries a server publishes at run
//! time into live, codec-ready type bindings: dictionaries are parsed and
//! modeled, materialized into a shared type catalog, and from then on
//! extension objects carrying those types encode and decode structurally.
//!
//! ## Quick Start
//!
//! ```ignore
//! use uaforge::prelude::*;
//!
//! // Pull every custom dictionary from a connected session
//! let catalog = TypeCatalog::new();
//! let outcome = load_type_definitions(&session, &catalog).await?;
//! load_enums(&session, &catalog, false).await?;
//!
//! // Decode a server value carrying a custom structure
//! let object = decode_extension_object(&catalog, &mut data)?;
//! ```
//!
//! ## Crate Organization
//!
//! - [`core`] - Value model, type catalog and the structural binary codec
//! - [`schema`] - Dictionary parsing and type model construction
//! - [`codegen`] - Rust source emission and type materialization
//! - [`client`] - Remote dictionary fetching and enum introspection

pub mod prelude;

/// Value model, type catalog and the structural binary codec.
pub mod core {
    pub use uaforge_core::*;
}

/// Dictionary parsing and type model construction.
pub mod schema {
    pub use uaforge_schema::*;
}

/// Rust source emission and type materialization.
pub mod codegen {
    pub use uaforge_codegen::*;
}

/// Remote dictionary fetching and enum introspection.
pub mod client {
    pub use uaforge_client::*;
}

// Re-export commonly used items at the crate root
pub use uaforge_core::{
    ExtensionObject, NodeId, StructValue, TypeCatalog, Value, decode_extension_object,
    decode_struct, encode_extension_object, encode_struct,
};

pub use uaforge_schema::TypeModel;

pub use uaforge_client::{TypeFetcher, load_enums, load_type_definitions};
