//! # casterix-core
//!
//! Core runtime library for catalog-driven ASTERIX message decoding.
//!
//! An immutable [`Catalog`] of category definitions (assembled by an
//! external loader, XML or otherwise) drives a recursive interpreter over
//! raw data blocks: the catalog is the program, the bytes are its input.
//! Decoding is bounds-checked end to end; malformed or hostile input is
//! reported through structured errors, never by reading past a buffer.
//!
//! ## Key components
//!
//! | Type | Purpose |
//! |------|---------|
//! | [`Catalog`] | Validated, immutable category definitions |
//! | [`FormatArena`] / [`FormatNode`] | Per-category format trees, referenced by index |
//! | [`BitsField`] | Leaf bit-field descriptor with encoding, scale, and constraints |
//! | [`Fspec`] | FX-terminated field-specification bitmap |
//! | [`decode_packet`] | Entry point: bytes in, [`DecodeResult`] out |
//! | [`FilterPredicate`] | Include/exclude rules over (category, item, field) |
//! | [`describe`] | Catalog label lookup for categories, items, fields, values |
//!
//! ## Example
//!
//! ```rust
//! use casterix_core::{
//!     BitsField, Catalog, CategoryBuilder, DecodeOptions, Encoding, Uap, decode_packet,
//! };
//!
//! // A one-item category: the ubiquitous Data Source Identifier.
//! let mut builder = CategoryBuilder::new(48, "Monoradar Target Reports", "1.31");
//! let dsi = builder.formats().fixed(
//!     2,
//!     vec![
//!         BitsField::new("SAC", 16, 9, Encoding::Unsigned),
//!         BitsField::new("SIC", 8, 1, Encoding::Unsigned),
//!     ],
//! );
//! builder.item("010", "Data Source Identifier", dsi);
//! builder.uap(Uap::unconditional([Some("010")]));
//! let catalog = Catalog::new(vec![builder.build().unwrap()]).unwrap();
//!
//! // CAT=48, LEN=6, FSPEC=0x80, SAC/SIC = 0x12/0x34.
//! let packet = [0x30, 0x00, 0x06, 0x80, 0x12, 0x34];
//! let result = decode_packet(&catalog, &packet, 0, &DecodeOptions::default());
//!
//! assert_eq!(result.bytes_consumed, 6);
//! let record = &result.blocks[0].records[0];
//! assert_eq!(record.item("010").unwrap().field("SAC").unwrap().raw, Some(0x12));
//! ```
//!
//! ## Concurrency
//!
//! The catalog is read-only after construction and safe to share by
//! reference across threads; every decode call owns its transient state.
//! The crate holds no global state of any kind.

use std::sync::Arc;

pub mod bit_reader;
pub mod block;
pub mod catalog;
pub mod describe;
pub mod error;
pub mod field;
pub mod filter;
pub mod format;
pub mod fspec;
pub mod packet;
pub mod record;
pub mod value;

pub use block::Block;
pub use catalog::{
    BDS_CATEGORY, Catalog, Category, CategoryBuilder, DataItemDescription, Rule, Uap, UapEntry,
    UapSelector,
};
pub use describe::describe;
pub use error::{CatalogError, Error, Warning};
pub use field::{BitsField, Encoding};
pub use filter::{FilterAction, FilterPredicate, FilterRule};
pub use format::{Compound, CompoundChild, Fixed, FormatArena, FormatId, FormatNode, Variable};
pub use fspec::Fspec;
pub use packet::{DEFAULT_MAX_PACKET_BYTES, DecodeOptions, DecodeResult, decode_packet};
pub use record::{DecodedItem, Record};
pub use value::{DecodedField, FieldValue, ItemValue};

/// Compiles filter rules into a [`FilterPredicate`].
///
/// Convenience alias for [`FilterPredicate::build`].
pub fn filter_build(rules: impl IntoIterator<Item = FilterRule>) -> FilterPredicate {
    FilterPredicate::build(rules)
}

/// Whether the catalog defines the given wire category.
pub fn is_category_defined(catalog: &Catalog, category: u8) -> bool {
    catalog.is_defined(category)
}

/// Transient state of one decode call.
///
/// Owns the warning sink and the current (category, item) context so leaf
/// extraction can report findings without re-plumbing identifiers through
/// every signature. One exists per [`decode_packet`] call; nothing escapes
/// it except what lands in the returned [`DecodeResult`].
pub(crate) struct DecodeCx<'a> {
    pub catalog: &'a Catalog,
    pub filter: Option<&'a FilterPredicate>,
    pub verbose: bool,
    /// Category of the record currently decoding.
    pub category: u8,
    /// Item id currently decoding, interned from the catalog.
    pub item: Arc<str>,
    /// Wall-clock stamp for this call, when requested.
    pub timestamp: Option<f64>,
    pub warnings: Vec<Warning>,
}

impl<'a> DecodeCx<'a> {
    pub fn new(
        catalog: &'a Catalog,
        filter: Option<&'a FilterPredicate>,
        verbose: bool,
    ) -> Self {
        Self {
            catalog,
            filter,
            verbose,
            category: 0,
            item: Arc::from(""),
            timestamp: None,
            warnings: Vec::new(),
        }
    }

    pub fn warn(&mut self, warning: Warning) {
        self.warnings.push(warning);
    }

    /// Whether the current item's field may appear in the output.
    pub fn field_included(&self, field: &str) -> bool {
        self.filter
            .is_none_or(|f| f.matches(self.category, &self.item, field))
    }

    /// Whether the item needs decoding at all under the active filter.
    pub fn item_included(&self, item: &str) -> bool {
        self.filter.is_none_or(|f| f.matches_item(self.category, item))
    }

    pub fn truncated(&self, offset: usize) -> Error {
        Error::Truncated {
            offset,
            category: Some(self.category),
            item: Some(self.item.clone()),
        }
    }

    pub fn extension_limit(&self) -> Error {
        Error::ExtensionLimit {
            category: Some(self.category),
            item: Some(self.item.clone()),
            max: format::MAX_EXTENSION_OCTETS,
        }
    }

    pub fn recursion_limit(&self) -> Error {
        Error::RecursionLimit {
            category: Some(self.category),
            item: Some(self.item.clone()),
            max: format::MAX_FORMAT_DEPTH,
        }
    }

    pub fn unknown_compound_bit(&self, bit: usize) -> Error {
        Error::UnknownCompoundBit {
            category: self.category,
            item: self.item.clone(),
            bit,
        }
    }
}
