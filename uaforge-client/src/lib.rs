//! # uaforge Client
//!
//! Remote schema fetching and enum introspection for uaforge.
//!
//! This crate provides:
//! - The [`SchemaSource`] trait, the session-facing seam for address
//!   space reads
//! - [`TypeFetcher`], which pulls and materializes remote dictionaries
//! - [`load_enums`], which picks up custom enums exposed only as
//!   `Enumeration` subtypes

pub mod enums;
pub mod error;
pub mod fetcher;
pub mod source;

pub use enums::load_enums;
pub use error::FetchError;
pub use fetcher::{FetchOutcome, FetchPolicy, TypeFetcher, load_type_definitions};
pub use source::{EnumMetadata, NodeDescription, ReferenceKind, SchemaSource};
