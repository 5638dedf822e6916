//! Leaf field descriptors.
//!
//! A [`BitsField`] describes one bit-field of a fixed window: its inclusive
//! bit range (EUROCONTROL numbering, see [`bit_reader`](crate::bit_reader)),
//! encoding, scaling, optional constraints, and optional enumeration table.
//! Descriptors are built once per catalog; extraction clones nothing but
//! interned names.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::DecodeCx;
use crate::bit_reader;
use crate::error::{Error, Warning};
use crate::value::{DecodedField, FieldValue};

/// Interpretation of an extracted bit range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    /// Zero-extended integer, scaled if a scale is declared.
    Unsigned,
    /// Two's-complement integer, sign-extended from the range's top bit.
    Signed,
    /// Six-bit IA-5 character groups (callsigns, aircraft identification).
    SixBitAscii,
    /// Unsigned rendered in base 8 (Mode-3/A codes).
    Octal,
    /// One character per octet, non-printable bytes escaped.
    Ascii,
    /// Unsigned rendered in base 16, zero-padded to the field width.
    Hex,
    /// Raw bytes, width a multiple of 8.
    Raw,
}

impl Encoding {
    /// Bit-group size the field width must divide into, if any. Encodings
    /// without a group go through the 64-bit integer path instead.
    pub(crate) fn group_bits(self) -> Option<u32> {
        match self {
            Encoding::SixBitAscii => Some(6),
            Encoding::Ascii | Encoding::Raw => Some(8),
            _ => None,
        }
    }
}

/// Descriptor of a single bit-field within a fixed window.
#[derive(Debug, Clone)]
pub struct BitsField {
    pub name: Arc<str>,
    /// Long description used by the lookup API; not emitted on decode.
    pub description: Option<Arc<str>>,
    /// High bit of the inclusive range, 1-based from the LSB of the last octet.
    pub from: u32,
    /// Low bit of the inclusive range; `to <= from`.
    pub to: u32,
    pub encoding: Encoding,
    pub scale: f64,
    pub unit: Option<Arc<str>>,
    pub min: Option<f64>,
    pub max: Option<f64>,
    /// Marks the extension-continuation bit of a variable part.
    pub fx: bool,
    /// Expected value of a spare/reserved field; mismatch is a warning.
    pub const_value: Option<u64>,
    /// Enumeration labels keyed by raw value.
    pub values: BTreeMap<u64, Arc<str>>,
}

impl BitsField {
    pub fn new(name: &str, from: u32, to: u32, encoding: Encoding) -> Self {
        Self {
            name: Arc::from(name),
            description: None,
            from,
            to,
            encoding,
            scale: 1.0,
            unit: None,
            min: None,
            max: None,
            fx: false,
            const_value: None,
            values: BTreeMap::new(),
        }
    }

    /// A single-bit FX continuation marker at the given bit position
    /// (conventionally bit 1, the LSB of the part).
    pub fn fx_at(bit: u32) -> Self {
        let mut field = Self::new("FX", bit, bit, Encoding::Unsigned);
        field.fx = true;
        field
    }

    pub fn described(mut self, description: &str) -> Self {
        self.description = Some(Arc::from(description));
        self
    }

    pub fn scaled(mut self, scale: f64, unit: &str) -> Self {
        self.scale = scale;
        self.unit = Some(Arc::from(unit));
        self
    }

    pub fn bounded(mut self, min: f64, max: f64) -> Self {
        self.min = Some(min);
        self.max = Some(max);
        self
    }

    pub fn constant(mut self, value: u64) -> Self {
        self.const_value = Some(value);
        self
    }

    pub fn with_values<'a>(mut self, pairs: impl IntoIterator<Item = (u64, &'a str)>) -> Self {
        self.values = pairs
            .into_iter()
            .map(|(v, label)| (v, Arc::from(label)))
            .collect();
        self
    }

    /// Width of the field in bits.
    pub fn width(&self) -> u32 {
        self.from - self.to + 1
    }

    /// Extracts this field from a fixed window and interprets it.
    ///
    /// Constant and min/max violations are reported through the context's
    /// warning sink; only a bit range that leaves the window is fatal.
    pub(crate) fn extract(
        &self,
        window: &[u8],
        cx: &mut DecodeCx<'_>,
    ) -> Result<DecodedField, Error> {
        let (value, raw) = match self.encoding {
            Encoding::Unsigned => {
                let raw = bit_reader::read_bits(window, self.from, self.to)?;
                let value = if self.scale != 1.0 {
                    FieldValue::Float(raw as f64 * self.scale)
                } else {
                    FieldValue::Unsigned(raw)
                };
                (value, Some(raw))
            }
            Encoding::Signed => {
                let raw = bit_reader::read_bits(window, self.from, self.to)?;
                let signed = bit_reader::sign_extend(raw, self.width());
                let value = if self.scale != 1.0 {
                    FieldValue::Float(signed as f64 * self.scale)
                } else {
                    FieldValue::Signed(signed)
                };
                (value, Some(raw))
            }
            Encoding::Octal => {
                let raw = bit_reader::read_bits(window, self.from, self.to)?;
                let digits = self.width().div_ceil(3) as usize;
                (FieldValue::Octal(format!("{raw:0digits$o}")), Some(raw))
            }
            Encoding::Hex => {
                let raw = bit_reader::read_bits(window, self.from, self.to)?;
                let digits = self.width().div_ceil(4) as usize;
                (FieldValue::Hex(format!("{raw:0digits$X}")), Some(raw))
            }
            Encoding::SixBitAscii => {
                let text = bit_reader::read_six_bit_text(window, self.from, self.to)?;
                (FieldValue::Text(text), None)
            }
            Encoding::Ascii => {
                let text = bit_reader::read_ascii_text(window, self.from, self.to)?;
                (FieldValue::Text(text), None)
            }
            Encoding::Raw => {
                let bytes = bit_reader::read_bytes(window, self.from, self.to)?;
                (FieldValue::Bytes(bytes), None)
            }
        };

        if let (Some(expected), Some(actual)) = (self.const_value, raw)
            && actual != expected
        {
            cx.warn(Warning::ConstMismatch {
                category: cx.category,
                item: cx.item.clone(),
                field: self.name.clone(),
                expected,
                actual,
            });
        }

        if self.min.is_some() || self.max.is_some() {
            let scaled = match &value {
                FieldValue::Unsigned(v) => Some(*v as f64),
                FieldValue::Signed(v) => Some(*v as f64),
                FieldValue::Float(v) => Some(*v),
                _ => None,
            };
            if let Some(v) = scaled
                && (self.min.is_some_and(|min| v < min) || self.max.is_some_and(|max| v > max))
            {
                cx.warn(Warning::ValueOutOfRange {
                    category: cx.category,
                    item: cx.item.clone(),
                    field: self.name.clone(),
                    value: v,
                });
            }
        }

        let meaning = if cx.verbose && !self.values.is_empty() {
            match raw.and_then(|r| self.values.get(&r)) {
                Some(label) => Some(label.clone()),
                None => {
                    if let Some(r) = raw {
                        cx.warn(Warning::UnrecognizedValueCode {
                            category: cx.category,
                            item: cx.item.clone(),
                            field: self.name.clone(),
                            value: r,
                        });
                    }
                    None
                }
            }
        } else {
            None
        };

        Ok(DecodedField {
            name: self.name.clone(),
            value,
            raw,
            unit: self.unit.clone(),
            meaning,
        })
    }
}
