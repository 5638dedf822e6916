//! Casterix - catalog-driven ASTERIX message decoding.
//!
//! This crate re-exports the core runtime (`casterix-core`) for convenient
//! single-import usage.
//!
//! ## Crate Structure
//!
//! - [`ccore`] - The decoding engine: catalog model, format trees, and the
//!   packet/block/record decoders
//!
//! ## Usage
//!
//! ```ignore
//! use casterix::{Catalog, DecodeOptions, decode_packet};
//!
//! let result = decode_packet(&catalog, &bytes, 0, &DecodeOptions::default());
//! for block in &result.blocks {
//!     for record in &block.records {
//!         println!("CAT{:03}: {} items", record.category, record.items.len());
//!     }
//! }
//! ```

/// Re-export of casterix-core as `ccore`.
///
/// Contains the runtime types for ASTERIX message decoding:
/// - [`Catalog`](ccore::Catalog) - Validated, immutable category definitions
/// - [`FormatArena`](ccore::FormatArena) - Per-category format trees
/// - [`decode_packet`](ccore::decode_packet) - The decode entry point
/// - [`DecodeResult`](ccore::DecodeResult) - Blocks, warnings, and errors of one call
/// - [`FilterPredicate`](ccore::FilterPredicate) - Output filtering rules
pub mod ccore {
    pub use casterix_core::*;
}

// Re-export commonly used types at the crate root for convenience.
pub use casterix_core::{
    BitsField, Block, Catalog, CatalogError, Category, CategoryBuilder, DecodeOptions,
    DecodeResult, DecodedField, DecodedItem, Encoding, Error, FieldValue, FilterPredicate,
    FilterRule, FormatArena, FormatNode, Fspec, ItemValue, Record, Uap, UapSelector, Warning,
    decode_packet, describe, filter_build, is_category_defined,
};
