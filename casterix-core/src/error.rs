use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;

/// Fatal decoding error.
///
/// A fatal error aborts the current record and, with it, the containing data
/// block: once an item length cannot be trusted, the byte stream cannot be
/// re-synchronized before the next block boundary. [`decode_packet`] collects
/// these alongside the partial result instead of returning early, so callers
/// always see everything that was decoded before the failure.
///
/// [`decode_packet`]: crate::decode_packet
#[derive(Debug, Clone, PartialEq, Error, Serialize)]
pub enum Error {
    /// The wire window ended before the current element was complete.
    #[error("truncated input at offset {offset}{}", context_suffix(.category, .item.as_deref()))]
    Truncated {
        offset: usize,
        category: Option<u8>,
        item: Option<Arc<str>>,
    },

    /// The input buffer exceeds [`DecodeOptions::max_packet_bytes`].
    ///
    /// [`DecodeOptions::max_packet_bytes`]: crate::DecodeOptions
    #[error("packet of {len} bytes exceeds the {max} byte limit")]
    OversizedPacket { len: usize, max: usize },

    /// The CAT byte of a data block is not defined in the catalog.
    #[error("category {category} at offset {offset} is not defined in the catalog")]
    UnknownCategory { category: u8, offset: usize },

    /// No UAP selector of the category matched the record's FSPEC.
    #[error("no UAP of category {category} matches FSPEC {fspec}")]
    NoMatchingUap { category: u8, fspec: String },

    /// A UAP entry references an item id the catalog does not define.
    #[error("category {category} UAP references undefined item {item}")]
    UnknownDataItem { category: u8, item: Arc<str> },

    /// The FSPEC had a bit set past the last entry of the selected UAP.
    #[error("category {category} FSPEC sets FRN {frn} beyond the UAP")]
    UnknownFrn { category: u8, frn: usize },

    /// A compound indicator bit is set but the schema has no child for it.
    #[error("compound item {item} of category {category} has no child for indicator bit {bit}")]
    UnknownCompoundBit {
        category: u8,
        item: Arc<str>,
        bit: usize,
    },

    /// An FX chain (FSPEC or variable-length item) exceeded its octet cap.
    #[error("extension chain exceeds {max} octets{}", context_suffix(.category, .item.as_deref()))]
    ExtensionLimit {
        category: Option<u8>,
        item: Option<Arc<str>>,
        max: usize,
    },

    /// A data block LEN field was below 3 or past the end of the packet.
    #[error("data block length {len} at offset {offset} is invalid ({remaining} bytes remain)")]
    InvalidBlockLength {
        len: u16,
        offset: usize,
        remaining: usize,
    },

    /// A field's bit range does not fit the window it was applied to.
    #[error("bit range {from}..={to} does not fit a {window_bits} bit window")]
    FieldOutOfRange {
        from: u32,
        to: u32,
        window_bits: usize,
    },

    /// Nested formats exceeded the recursion cap.
    #[error("format nesting exceeds {max} levels{}", context_suffix(.category, .item.as_deref()))]
    RecursionLimit {
        category: Option<u8>,
        item: Option<Arc<str>>,
        max: usize,
    },

    /// A warning promoted by [`DecodeOptions::strict`].
    ///
    /// [`DecodeOptions::strict`]: crate::DecodeOptions
    #[error("strict mode: {0}")]
    Strict(Warning),
}

impl Error {
    /// Attaches category context to an error raised before the category was
    /// known (the FSPEC prelude).
    pub(crate) fn with_category(self, category: u8) -> Self {
        match self {
            Error::Truncated { offset, item, .. } => Error::Truncated {
                offset,
                category: Some(category),
                item,
            },
            Error::ExtensionLimit { item, max, .. } => Error::ExtensionLimit {
                category: Some(category),
                item,
                max,
            },
            other => other,
        }
    }
}

fn context_suffix(category: &Option<u8>, item: Option<&str>) -> String {
    match (*category, item) {
        (Some(cat), Some(item)) => format!(" (category {cat}, item {item})"),
        (Some(cat), None) => format!(" (category {cat})"),
        (None, Some(item)) => format!(" (item {item})"),
        (None, None) => String::new(),
    }
}

/// Non-fatal finding collected during a decode and returned with the result.
///
/// Warnings never stop decoding. With [`DecodeOptions::strict`] they are
/// promoted into [`Error::Strict`] entries after the packet completes.
///
/// [`DecodeOptions::strict`]: crate::DecodeOptions
#[derive(Debug, Clone, PartialEq, Error, Serialize)]
pub enum Warning {
    /// A spare/reserved field did not hold its declared constant.
    #[error("field {field} of {category}/{item} holds {actual:#x}, expected constant {expected:#x}")]
    ConstMismatch {
        category: u8,
        item: Arc<str>,
        field: Arc<str>,
        expected: u64,
        actual: u64,
    },

    /// A scaled value fell outside its declared `[min, max]` interval.
    #[error("field {field} of {category}/{item} value {value} is outside its declared range")]
    ValueOutOfRange {
        category: u8,
        item: Arc<str>,
        field: Arc<str>,
        value: f64,
    },

    /// A repetitive item carried REP = 0; an empty list was emitted.
    #[error("repetitive item {item} of category {category} has zero repetitions")]
    RepetitionCountZero { category: u8, item: Arc<str> },

    /// An explicit-length item left residual bytes after its element.
    #[error("explicit item {item} of category {category} left {residual} residual bytes")]
    ExplicitPadding {
        category: u8,
        item: Arc<str>,
        residual: usize,
    },

    /// A value with an enumeration table had no entry for the decoded code.
    #[error("field {field} of {category}/{item} value {value} has no enumeration entry")]
    UnrecognizedValueCode {
        category: u8,
        item: Arc<str>,
        field: Arc<str>,
        value: u64,
    },

    /// An inline BDS register id has no definition in the catalog.
    #[error("item {item} of category {category} carries unknown BDS register {register:#04x}")]
    UnknownBdsRegister {
        category: u8,
        item: Arc<str>,
        register: u8,
    },
}

/// Catalog construction error.
///
/// Raised once, when a [`Catalog`] or [`Category`] is assembled; decoding
/// never observes an invalid catalog.
///
/// [`Catalog`]: crate::Catalog
/// [`Category`]: crate::Category
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CatalogError {
    /// Category id outside 1..=256.
    #[error("category id {0} is outside 1..=256")]
    CategoryId(u16),

    /// Two categories with the same id.
    #[error("category {0} is defined twice")]
    DuplicateCategory(u16),

    /// A field's bit range does not fit its fixed window.
    #[error("field {field} of item {item} spans bits {to}..={from}, outside a {bytes} byte window")]
    FieldRange {
        item: Arc<str>,
        field: Arc<str>,
        from: u32,
        to: u32,
        bytes: u16,
    },

    /// A numeric field wider than 64 bits.
    #[error("field {field} of item {item} is {width} bits wide; numeric fields are capped at 64")]
    FieldTooWide {
        item: Arc<str>,
        field: Arc<str>,
        width: u32,
    },

    /// A string field whose width does not divide into its character size.
    #[error("field {field} of item {item} is {width} bits wide, not a multiple of {group}")]
    FieldNotAligned {
        item: Arc<str>,
        field: Arc<str>,
        width: u32,
        group: u32,
    },

    /// Two fields of one fixed part share a short name.
    #[error("item {item} declares field {field} twice in one part")]
    DuplicateField { item: Arc<str>, field: Arc<str> },

    /// Two items of one category share an id.
    #[error("category {category} declares item {item} twice")]
    DuplicateItem { category: u16, item: Arc<str> },

    /// A format node references an id outside its category's arena.
    #[error("item {item} references a format node outside its category")]
    FormatRef { item: Arc<str> },

    /// A variable part without exactly one single-bit FX field.
    #[error("part {part} of item {item} must declare exactly one single-bit FX field")]
    FxCardinality { item: Arc<str>, part: usize },

    /// A compound indicator part wider than one octet.
    #[error("compound indicator of item {item} has a part wider than one octet")]
    IndicatorWidth { item: Arc<str> },

    /// A variable or compound indicator with no parts at all.
    #[error("item {item} declares an empty part list")]
    EmptyParts { item: Arc<str> },

    /// UAP entries whose FRNs are not contiguous from 1.
    #[error("UAP {uap} of category {category} has a gap at FRN {frn}")]
    UapGap { category: u16, uap: usize, frn: usize },

    /// A category without any UAP.
    #[error("category {0} declares no UAP")]
    NoUap(u16),
}
