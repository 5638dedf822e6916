//! Format trees.
//!
//! Every data item is described by a tree of [`FormatNode`]s: fixed windows
//! of bit-fields, FX-extended variable chains, counted repetitions,
//! bitmap-gated compounds, explicit-length envelopes, and Mode-S BDS
//! registers. Nodes live in a per-category [`FormatArena`] and reference each
//! other by [`FormatId`]; the arena owns every node, so shared sub-formats
//! need no clones and no reference counting.
//!
//! Each node answers two questions against a byte window positioned at the
//! item start: how many bytes it consumes ([`FormatArena::byte_length`]) and
//! what it decodes to ([`FormatArena::decode`]). Neither ever reads past the
//! window; a window that ends too early is a [`Error::Truncated`], never a
//! panic or a wrap-around.

use std::sync::Arc;

use crate::DecodeCx;
use crate::error::{Error, Warning};
use crate::field::BitsField;
use crate::value::{DecodedField, FieldValue, ItemValue};

/// Octet cap on any single FX chain. Hostile input can otherwise string
/// extension octets forever.
pub const MAX_EXTENSION_OCTETS: usize = 16;

/// Nesting cap for format trees (Explicit in Compound in Repetitive in ...).
pub const MAX_FORMAT_DEPTH: usize = 16;

/// Index of a [`FormatNode`] within its [`FormatArena`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FormatId(u32);

/// A fixed-length window of bit-fields.
#[derive(Debug, Clone)]
pub struct Fixed {
    /// Window length in bytes; every field's bit range lies within it.
    pub length: u16,
    pub fields: Vec<BitsField>,
}

impl Fixed {
    pub fn new(length: u16, fields: Vec<BitsField>) -> Self {
        Self { length, fields }
    }

    /// Evaluates the FX continuation bit of this part against its window.
    /// Catalog validation guarantees variable parts carry exactly one.
    pub(crate) fn fx_set(&self, window: &[u8]) -> Result<bool, Error> {
        match self.fields.iter().find(|f| f.fx) {
            Some(fx) => Ok(crate::bit_reader::read_bits(window, fx.from, fx.to)? == 1),
            None => Ok(false),
        }
    }

    fn extract_fields(
        &self,
        window: &[u8],
        cx: &mut DecodeCx<'_>,
        out: &mut Vec<DecodedField>,
    ) -> Result<(), Error> {
        for field in &self.fields {
            if field.fx && !cx.verbose {
                continue;
            }
            if !cx.field_included(&field.name) {
                continue;
            }
            out.push(field.extract(window, cx)?);
        }
        Ok(())
    }
}

/// An FX-extended chain of fixed parts.
///
/// With a single declared part, every extension octet reuses it and the item
/// decodes to a list of extents. With several, the i-th extension uses the
/// i-th part (saturating on the last) and the extents merge into one object.
#[derive(Debug, Clone)]
pub struct Variable {
    pub parts: Vec<Fixed>,
}

impl Variable {
    pub fn new(parts: Vec<Fixed>) -> Self {
        Self { parts }
    }

    fn part(&self, index: usize) -> &Fixed {
        &self.parts[index.min(self.parts.len() - 1)]
    }
}

/// One gated child of a compound item.
#[derive(Debug, Clone)]
pub struct CompoundChild {
    pub name: Arc<str>,
    pub format: FormatId,
}

/// A compound item: a variable bitmap indicator followed by the present
/// children, in indicator-bit order.
#[derive(Debug, Clone)]
pub struct Compound {
    pub indicator: Variable,
    pub children: Vec<CompoundChild>,
}

/// A format tree node. The six structural kinds of ASTERIX data items.
#[derive(Debug, Clone)]
pub enum FormatNode {
    Fixed(Fixed),
    Variable(Variable),
    /// One count octet, then REP copies of the element.
    Repetitive { element: FormatId },
    Compound(Compound),
    /// One total-length octet (including itself), then the element.
    Explicit { element: FormatId },
    /// Seven-byte Mode-S register; `register: None` means the first byte
    /// carries the register id inline. The selected register schema spans
    /// the full seven bytes either way, so inline-selectable registers
    /// describe bits 56..49 as the register id.
    Bds { register: Option<u8> },
}

/// Arena owning every format node of one category.
#[derive(Debug, Clone, Default)]
pub struct FormatArena {
    nodes: Vec<FormatNode>,
}

impl FormatArena {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, node: FormatNode) -> FormatId {
        let id = FormatId(self.nodes.len() as u32);
        self.nodes.push(node);
        id
    }

    /// Convenience for the most common node shape.
    pub fn fixed(&mut self, length: u16, fields: Vec<BitsField>) -> FormatId {
        self.push(FormatNode::Fixed(Fixed::new(length, fields)))
    }

    pub(crate) fn get(&self, id: FormatId) -> Option<&FormatNode> {
        self.nodes.get(id.0 as usize)
    }

    pub(crate) fn node(&self, id: FormatId) -> &FormatNode {
        &self.nodes[id.0 as usize]
    }

    /// Bytes the node at `id` consumes from the start of `window`.
    ///
    /// `at` is the absolute offset of the window start, carried for error
    /// context only. Walks exactly the same boundaries as [`decode`] without
    /// extracting anything, so a filtered-out item can be skipped at full
    /// speed.
    ///
    /// [`decode`]: Self::decode
    pub(crate) fn byte_length(
        &self,
        id: FormatId,
        window: &[u8],
        at: usize,
        cx: &DecodeCx<'_>,
        depth: usize,
    ) -> Result<usize, Error> {
        if depth > MAX_FORMAT_DEPTH {
            return Err(cx.recursion_limit());
        }
        match self.node(id) {
            FormatNode::Fixed(fixed) => {
                let length = fixed.length as usize;
                if window.len() < length {
                    return Err(cx.truncated(at + window.len()));
                }
                Ok(length)
            }
            FormatNode::Variable(variable) => {
                let mut consumed = 0;
                for extent in 0.. {
                    if extent >= MAX_EXTENSION_OCTETS {
                        return Err(cx.extension_limit());
                    }
                    let part = variable.part(extent);
                    let length = part.length as usize;
                    if consumed + length > window.len() {
                        return Err(cx.truncated(at + window.len()));
                    }
                    let part_window = &window[consumed..consumed + length];
                    consumed += length;
                    if !part.fx_set(part_window)? {
                        break;
                    }
                }
                Ok(consumed)
            }
            FormatNode::Repetitive { element } => {
                let Some(&rep) = window.first() else {
                    return Err(cx.truncated(at));
                };
                let mut consumed = 1;
                for _ in 0..rep {
                    consumed += self.byte_length(
                        *element,
                        &window[consumed..],
                        at + consumed,
                        cx,
                        depth + 1,
                    )?;
                }
                Ok(consumed)
            }
            FormatNode::Compound(compound) => {
                let (primaries, indicator_len) = read_indicator(compound, window, at, cx)?;
                let mut consumed = indicator_len;
                for (index, present) in primaries.iter().enumerate() {
                    if !present {
                        continue;
                    }
                    let child = compound
                        .children
                        .get(index)
                        .ok_or_else(|| cx.unknown_compound_bit(index + 1))?;
                    consumed += self.byte_length(
                        child.format,
                        &window[consumed..],
                        at + consumed,
                        cx,
                        depth + 1,
                    )?;
                }
                Ok(consumed)
            }
            FormatNode::Explicit { .. } => {
                let Some(&len) = window.first() else {
                    return Err(cx.truncated(at));
                };
                let len = len as usize;
                // LEN counts its own octet, so zero can never be valid.
                if len == 0 || len > window.len() {
                    return Err(cx.truncated(at));
                }
                Ok(len)
            }
            FormatNode::Bds { .. } => {
                if window.len() < 7 {
                    return Err(cx.truncated(at + window.len()));
                }
                Ok(7)
            }
        }
    }

    /// Decodes the node at `id` from the start of `window`, returning the
    /// item value and the bytes consumed.
    pub(crate) fn decode(
        &self,
        id: FormatId,
        window: &[u8],
        at: usize,
        cx: &mut DecodeCx<'_>,
        depth: usize,
    ) -> Result<(ItemValue, usize), Error> {
        if depth > MAX_FORMAT_DEPTH {
            return Err(cx.recursion_limit());
        }
        match self.node(id) {
            FormatNode::Fixed(fixed) => {
                let length = fixed.length as usize;
                if window.len() < length {
                    return Err(cx.truncated(at + window.len()));
                }
                let mut fields = Vec::with_capacity(fixed.fields.len());
                fixed.extract_fields(&window[..length], cx, &mut fields)?;
                Ok((ItemValue::Fields(fields), length))
            }
            FormatNode::Variable(variable) => {
                let mut consumed = 0;
                let mut extents: Vec<ItemValue> = Vec::new();
                let mut merged: Vec<DecodedField> = Vec::new();
                let single = variable.parts.len() == 1;
                for extent in 0.. {
                    if extent >= MAX_EXTENSION_OCTETS {
                        return Err(cx.extension_limit());
                    }
                    let part = variable.part(extent);
                    let length = part.length as usize;
                    if consumed + length > window.len() {
                        return Err(cx.truncated(at + window.len()));
                    }
                    let part_window = &window[consumed..consumed + length];
                    consumed += length;
                    if single {
                        let mut fields = Vec::with_capacity(part.fields.len());
                        part.extract_fields(part_window, cx, &mut fields)?;
                        extents.push(ItemValue::Fields(fields));
                    } else {
                        part.extract_fields(part_window, cx, &mut merged)?;
                    }
                    if !part.fx_set(part_window)? {
                        break;
                    }
                }
                let value = if single {
                    ItemValue::List(extents)
                } else {
                    ItemValue::Fields(merged)
                };
                Ok((value, consumed))
            }
            FormatNode::Repetitive { element } => {
                let Some(&rep) = window.first() else {
                    return Err(cx.truncated(at));
                };
                if rep == 0 {
                    cx.warn(Warning::RepetitionCountZero {
                        category: cx.category,
                        item: cx.item.clone(),
                    });
                    return Ok((ItemValue::List(Vec::new()), 1));
                }
                let mut consumed = 1;
                let mut entries = Vec::with_capacity(rep as usize);
                for _ in 0..rep {
                    let (value, used) = self.decode(
                        *element,
                        &window[consumed..],
                        at + consumed,
                        cx,
                        depth + 1,
                    )?;
                    entries.push(value);
                    consumed += used;
                }
                Ok((ItemValue::List(entries), consumed))
            }
            FormatNode::Compound(compound) => {
                let (primaries, indicator_len) = read_indicator(compound, window, at, cx)?;
                let mut consumed = indicator_len;
                let mut children = Vec::new();
                for (index, present) in primaries.iter().enumerate() {
                    if !present {
                        continue;
                    }
                    let child = compound
                        .children
                        .get(index)
                        .ok_or_else(|| cx.unknown_compound_bit(index + 1))?;
                    let (value, used) = self.decode(
                        child.format,
                        &window[consumed..],
                        at + consumed,
                        cx,
                        depth + 1,
                    )?;
                    children.push((child.name.clone(), value));
                    consumed += used;
                }
                Ok((ItemValue::Object(children), consumed))
            }
            FormatNode::Explicit { element } => {
                let Some(&len) = window.first() else {
                    return Err(cx.truncated(at));
                };
                let len = len as usize;
                if len == 0 || len > window.len() {
                    return Err(cx.truncated(at));
                }
                let inner = &window[1..len];
                let (value, used) = self.decode(*element, inner, at + 1, cx, depth + 1)?;
                if used < inner.len() {
                    cx.warn(Warning::ExplicitPadding {
                        category: cx.category,
                        item: cx.item.clone(),
                        residual: inner.len() - used,
                    });
                }
                Ok((value, len))
            }
            FormatNode::Bds { register } => {
                if window.len() < 7 {
                    return Err(cx.truncated(at + window.len()));
                }
                let reg = match register {
                    Some(reg) => *reg,
                    None => window[0],
                };
                let payload = &window[..7];
                let value = match cx.catalog.bds_format(reg) {
                    Some((arena, format)) => {
                        arena.decode(format, payload, at, cx, depth + 1)?.0
                    }
                    None => {
                        cx.warn(Warning::UnknownBdsRegister {
                            category: cx.category,
                            item: cx.item.clone(),
                            register: reg,
                        });
                        ItemValue::Fields(vec![DecodedField {
                            name: Arc::from("MB"),
                            value: FieldValue::Bytes(payload.to_vec()),
                            raw: None,
                            unit: None,
                            meaning: None,
                        }])
                    }
                };
                Ok((value, 7))
            }
        }
    }

    /// Looks a field descriptor up anywhere in the tree rooted at `id`.
    pub(crate) fn find_field(&self, id: FormatId, name: &str) -> Option<&BitsField> {
        self.find_field_at(id, name, 0)
    }

    fn find_field_at(&self, id: FormatId, name: &str, depth: usize) -> Option<&BitsField> {
        if depth > MAX_FORMAT_DEPTH {
            return None;
        }
        match self.get(id)? {
            FormatNode::Fixed(fixed) => fixed.fields.iter().find(|f| f.name.as_ref() == name),
            FormatNode::Variable(variable) => variable
                .parts
                .iter()
                .flat_map(|p| p.fields.iter())
                .find(|f| f.name.as_ref() == name),
            FormatNode::Repetitive { element } | FormatNode::Explicit { element } => {
                self.find_field_at(*element, name, depth + 1)
            }
            FormatNode::Compound(compound) => compound
                .indicator
                .parts
                .iter()
                .flat_map(|p| p.fields.iter())
                .find(|f| f.name.as_ref() == name)
                .or_else(|| {
                    compound
                        .children
                        .iter()
                        .find_map(|c| self.find_field_at(c.format, name, depth + 1))
                }),
            FormatNode::Bds { .. } => None,
        }
    }
}

/// Walks a compound indicator's FX chain and returns the primary presence
/// bits (7 per octet, MSB first, FX excluded) plus the indicator length.
fn read_indicator(
    compound: &Compound,
    window: &[u8],
    at: usize,
    cx: &DecodeCx<'_>,
) -> Result<(Vec<bool>, usize), Error> {
    let mut primaries = Vec::new();
    let mut consumed = 0;
    for extent in 0.. {
        if extent >= MAX_EXTENSION_OCTETS {
            return Err(cx.extension_limit());
        }
        if consumed >= window.len() {
            return Err(cx.truncated(at + window.len()));
        }
        let octet = window[consumed];
        let part_window = &window[consumed..consumed + 1];
        for shift in (1..=7).rev() {
            primaries.push((octet >> shift) & 1 == 1);
        }
        let part = compound.indicator.part(extent);
        consumed += 1;
        if !part.fx_set(part_window)? {
            break;
        }
    }
    Ok((primaries, consumed))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Catalog;
    use crate::field::Encoding;

    fn cx_for<'a>(catalog: &'a Catalog) -> DecodeCx<'a> {
        let mut cx = DecodeCx::new(catalog, None, false);
        cx.category = 48;
        cx.item = Arc::from("TST");
        cx
    }

    fn sac_sic_fixed() -> Fixed {
        Fixed::new(
            2,
            vec![
                BitsField::new("SAC", 16, 9, Encoding::Unsigned),
                BitsField::new("SIC", 8, 1, Encoding::Unsigned),
            ],
        )
    }

    fn variable_part() -> Fixed {
        Fixed::new(
            1,
            vec![
                BitsField::new("VAL", 8, 2, Encoding::Unsigned),
                BitsField::fx_at(1),
            ],
        )
    }

    #[test]
    fn fixed_decodes_fields_in_order() {
        let catalog = Catalog::new(vec![]).unwrap();
        let mut cx = cx_for(&catalog);
        let mut arena = FormatArena::new();
        let id = arena.push(FormatNode::Fixed(sac_sic_fixed()));

        let (value, used) = arena.decode(id, &[0x12, 0x34, 0xFF], 0, &mut cx, 0).unwrap();
        assert_eq!(used, 2);
        let ItemValue::Fields(fields) = value else {
            panic!("fixed must decode to fields");
        };
        assert_eq!(fields[0].name.as_ref(), "SAC");
        assert_eq!(fields[0].value, FieldValue::Unsigned(0x12));
        assert_eq!(fields[1].value, FieldValue::Unsigned(0x34));
    }

    #[test]
    fn fixed_rejects_short_window() {
        let catalog = Catalog::new(vec![]).unwrap();
        let mut cx = cx_for(&catalog);
        let mut arena = FormatArena::new();
        let id = arena.push(FormatNode::Fixed(sac_sic_fixed()));

        assert!(matches!(
            arena.decode(id, &[0x12], 10, &mut cx, 0),
            Err(Error::Truncated { offset: 11, .. })
        ));
    }

    #[test]
    fn single_part_variable_lists_extents() {
        let catalog = Catalog::new(vec![]).unwrap();
        let mut cx = cx_for(&catalog);
        let mut arena = FormatArena::new();
        let id = arena.push(FormatNode::Variable(Variable::new(vec![variable_part()])));

        // Two extents: FX set on the first octet only.
        let (value, used) = arena.decode(id, &[0x03, 0x04], 0, &mut cx, 0).unwrap();
        assert_eq!(used, 2);
        assert_eq!(value.repetitions(), 2);
        let ItemValue::List(extents) = &value else {
            panic!()
        };
        assert_eq!(extents[0].field("VAL").unwrap().value, FieldValue::Unsigned(1));
        assert_eq!(extents[1].field("VAL").unwrap().value, FieldValue::Unsigned(2));
    }

    #[test]
    fn multi_part_variable_merges_fields() {
        let catalog = Catalog::new(vec![]).unwrap();
        let mut cx = cx_for(&catalog);
        let mut arena = FormatArena::new();
        let first = Fixed::new(
            1,
            vec![
                BitsField::new("A", 8, 2, Encoding::Unsigned),
                BitsField::fx_at(1),
            ],
        );
        let second = Fixed::new(
            1,
            vec![
                BitsField::new("B", 8, 2, Encoding::Unsigned),
                BitsField::fx_at(1),
            ],
        );
        let id = arena.push(FormatNode::Variable(Variable::new(vec![first, second])));

        let (value, used) = arena.decode(id, &[0x05, 0x06], 0, &mut cx, 0).unwrap();
        assert_eq!(used, 2);
        let ItemValue::Fields(fields) = &value else {
            panic!()
        };
        assert_eq!(fields.len(), 2);
        assert_eq!(fields[0].name.as_ref(), "A");
        assert_eq!(fields[1].name.as_ref(), "B");
    }

    #[test]
    fn variable_saturates_on_last_declared_part() {
        let catalog = Catalog::new(vec![]).unwrap();
        let mut cx = cx_for(&catalog);
        let mut arena = FormatArena::new();
        let first = Fixed::new(
            1,
            vec![
                BitsField::new("A", 8, 2, Encoding::Unsigned),
                BitsField::fx_at(1),
            ],
        );
        let second = Fixed::new(
            1,
            vec![
                BitsField::new("B", 8, 2, Encoding::Unsigned),
                BitsField::fx_at(1),
            ],
        );
        let id = arena.push(FormatNode::Variable(Variable::new(vec![first, second])));

        // Three extents against two declared parts: the third reuses "B".
        let (value, used) = arena.decode(id, &[0x01, 0x01, 0x02], 0, &mut cx, 0).unwrap();
        assert_eq!(used, 3);
        let ItemValue::Fields(fields) = &value else {
            panic!()
        };
        assert_eq!(fields.len(), 3);
        assert_eq!(fields[2].name.as_ref(), "B");
    }

    #[test]
    fn variable_chain_past_cap_fails() {
        let catalog = Catalog::new(vec![]).unwrap();
        let mut cx = cx_for(&catalog);
        let mut arena = FormatArena::new();
        let id = arena.push(FormatNode::Variable(Variable::new(vec![variable_part()])));

        // Sixteen octets all with FX set would require a seventeenth.
        let window = [0x01u8; 17];
        assert!(matches!(
            arena.decode(id, &window, 0, &mut cx, 0),
            Err(Error::ExtensionLimit { .. })
        ));

        // Sixteen octets with the last FX clear decode fine.
        let mut window = [0x01u8; 16];
        window[15] = 0x00;
        let (_, used) = arena.decode(id, &window, 0, &mut cx, 0).unwrap();
        assert_eq!(used, 16);
    }

    #[test]
    fn repetitive_decodes_rep_elements() {
        let catalog = Catalog::new(vec![]).unwrap();
        let mut cx = cx_for(&catalog);
        let mut arena = FormatArena::new();
        let element = arena.fixed(2, vec![BitsField::new("V", 16, 1, Encoding::Unsigned)]);
        let id = arena.push(FormatNode::Repetitive { element });

        let window = [0x03, 0x00, 0x01, 0x00, 0x02, 0x00, 0x03];
        let (value, used) = arena.decode(id, &window, 0, &mut cx, 0).unwrap();
        assert_eq!(used, 7);
        assert_eq!(value.repetitions(), 3);
    }

    #[test]
    fn repetitive_zero_count_warns_and_emits_empty_list() {
        let catalog = Catalog::new(vec![]).unwrap();
        let mut cx = cx_for(&catalog);
        let mut arena = FormatArena::new();
        let element = arena.fixed(2, vec![BitsField::new("V", 16, 1, Encoding::Unsigned)]);
        let id = arena.push(FormatNode::Repetitive { element });

        let (value, used) = arena.decode(id, &[0x00, 0xAA], 0, &mut cx, 0).unwrap();
        assert_eq!(used, 1);
        assert_eq!(value, ItemValue::List(vec![]));
        assert!(matches!(
            cx.warnings.as_slice(),
            [Warning::RepetitionCountZero { .. }]
        ));
    }

    #[test]
    fn repetitive_truncated_mid_element_fails() {
        let catalog = Catalog::new(vec![]).unwrap();
        let mut cx = cx_for(&catalog);
        let mut arena = FormatArena::new();
        let element = arena.fixed(2, vec![BitsField::new("V", 16, 1, Encoding::Unsigned)]);
        let id = arena.push(FormatNode::Repetitive { element });

        assert!(matches!(
            arena.decode(id, &[0x02, 0x00, 0x01, 0x00], 0, &mut cx, 0),
            Err(Error::Truncated { .. })
        ));
    }

    fn compound_arena() -> (FormatArena, FormatId) {
        let mut arena = FormatArena::new();
        let first = arena.fixed(1, vec![BitsField::new("C0", 8, 1, Encoding::Unsigned)]);
        let second = arena.fixed(1, vec![BitsField::new("C1", 8, 1, Encoding::Unsigned)]);
        let indicator = Variable::new(vec![Fixed::new(
            1,
            vec![
                BitsField::new("P", 8, 2, Encoding::Unsigned),
                BitsField::fx_at(1),
            ],
        )]);
        let id = arena.push(FormatNode::Compound(Compound {
            indicator,
            children: vec![
                CompoundChild {
                    name: Arc::from("FIRST"),
                    format: first,
                },
                CompoundChild {
                    name: Arc::from("SECOND"),
                    format: second,
                },
            ],
        }));
        (arena, id)
    }

    #[test]
    fn compound_decodes_only_present_children() {
        let catalog = Catalog::new(vec![]).unwrap();
        let mut cx = cx_for(&catalog);
        let (arena, id) = compound_arena();

        // Bit 7 of the indicator gates the second child only.
        let (value, used) = arena.decode(id, &[0x40, 0xAB], 0, &mut cx, 0).unwrap();
        assert_eq!(used, 2);
        assert!(value.child("FIRST").is_none());
        let second = value.child("SECOND").unwrap();
        assert_eq!(second.field("C1").unwrap().value, FieldValue::Unsigned(0xAB));
    }

    #[test]
    fn compound_bit_without_child_fails() {
        let catalog = Catalog::new(vec![]).unwrap();
        let mut cx = cx_for(&catalog);
        let (arena, id) = compound_arena();

        // Bit 5 would be the third child; only two are declared.
        assert!(matches!(
            arena.decode(id, &[0x20, 0xAB], 0, &mut cx, 0),
            Err(Error::UnknownCompoundBit { bit: 3, .. })
        ));
    }

    #[test]
    fn explicit_length_envelope() {
        let catalog = Catalog::new(vec![]).unwrap();
        let mut cx = cx_for(&catalog);
        let mut arena = FormatArena::new();
        let element = arena.fixed(2, vec![BitsField::new("V", 16, 1, Encoding::Unsigned)]);
        let id = arena.push(FormatNode::Explicit { element });

        let (value, used) = arena.decode(id, &[0x03, 0x12, 0x34], 0, &mut cx, 0).unwrap();
        assert_eq!(used, 3);
        assert_eq!(value.field("V").unwrap().value, FieldValue::Unsigned(0x1234));
        assert!(cx.warnings.is_empty());
    }

    #[test]
    fn explicit_residual_bytes_warn() {
        let catalog = Catalog::new(vec![]).unwrap();
        let mut cx = cx_for(&catalog);
        let mut arena = FormatArena::new();
        let element = arena.fixed(2, vec![BitsField::new("V", 16, 1, Encoding::Unsigned)]);
        let id = arena.push(FormatNode::Explicit { element });

        let (_, used) = arena
            .decode(id, &[0x05, 0x12, 0x34, 0x00, 0x00], 0, &mut cx, 0)
            .unwrap();
        assert_eq!(used, 5);
        assert!(matches!(
            cx.warnings.as_slice(),
            [Warning::ExplicitPadding { residual: 2, .. }]
        ));
    }

    #[test]
    fn explicit_len_past_window_fails() {
        let catalog = Catalog::new(vec![]).unwrap();
        let mut cx = cx_for(&catalog);
        let mut arena = FormatArena::new();
        let element = arena.fixed(2, vec![BitsField::new("V", 16, 1, Encoding::Unsigned)]);
        let id = arena.push(FormatNode::Explicit { element });

        assert!(matches!(
            arena.decode(id, &[0x10, 0x12, 0x34, 0x00], 0, &mut cx, 0),
            Err(Error::Truncated { .. })
        ));
        assert!(matches!(
            arena.decode(id, &[0x00, 0x12], 0, &mut cx, 0),
            Err(Error::Truncated { .. })
        ));
    }

    fn bds_catalog() -> Catalog {
        use crate::catalog::{CategoryBuilder, Uap};

        let mut builder = CategoryBuilder::new(256, "Mode S BDS Registers", "1.0");
        let reg30 = builder.formats().fixed(
            7,
            vec![
                BitsField::new("ARA", 56, 43, Encoding::Unsigned),
                BitsField::new("RAT", 38, 38, Encoding::Unsigned),
            ],
        );
        builder.item("30", "ACAS Resolution Advisory Report", reg30);
        builder.uap(Uap::unconditional([Some("30")]));
        Catalog::new(vec![builder.build().unwrap()]).unwrap()
    }

    #[test]
    fn bds_prebound_register_decodes_the_full_window() {
        let catalog = bds_catalog();
        let mut cx = cx_for(&catalog);
        let mut arena = FormatArena::new();
        let id = arena.push(FormatNode::Bds {
            register: Some(0x30),
        });

        // Seven payload bytes plus a guard byte the node must not touch.
        let window = [0x80, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0xFF];
        let (value, used) = arena.decode(id, &window, 0, &mut cx, 0).unwrap();
        assert_eq!(used, 7);
        assert!(cx.warnings.is_empty());
        assert_eq!(
            value.field("ARA").unwrap().value,
            FieldValue::Unsigned(0x2000)
        );
    }

    #[test]
    fn bds_prebound_unknown_register_degrades_to_raw() {
        let catalog = bds_catalog();
        let mut cx = cx_for(&catalog);
        let mut arena = FormatArena::new();
        let id = arena.push(FormatNode::Bds {
            register: Some(0x99),
        });

        let window = [0xAA; 7];
        let (value, used) = arena.decode(id, &window, 0, &mut cx, 0).unwrap();
        assert_eq!(used, 7);
        assert!(matches!(
            cx.warnings.as_slice(),
            [Warning::UnknownBdsRegister { register: 0x99, .. }]
        ));
        assert_eq!(
            value.field("MB").unwrap().value,
            FieldValue::Bytes(vec![0xAA; 7])
        );
    }

    #[test]
    fn bds_inline_id_selects_the_register_schema() {
        let catalog = bds_catalog();
        let mut cx = cx_for(&catalog);
        let mut arena = FormatArena::new();
        let id = arena.push(FormatNode::Bds { register: None });

        // First byte selects register 30; the schema covers all seven bytes.
        let window = [0x30, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00];
        let (value, used) = arena.decode(id, &window, 0, &mut cx, 0).unwrap();
        assert_eq!(used, 7);
        // Bits 56..49 hold the id, so ARA (56..43) sees it in its top bits.
        assert_eq!(
            value.field("ARA").unwrap().value,
            FieldValue::Unsigned(0x30 << 6)
        );
    }

    #[test]
    fn recursion_cap_stops_pathological_nesting() {
        let catalog = Catalog::new(vec![]).unwrap();
        let mut cx = cx_for(&catalog);
        let mut arena = FormatArena::new();
        // Explicit whose element is itself: each level peels one LEN octet.
        let id = arena.push(FormatNode::Explicit {
            element: FormatId(0),
        });

        // Descending LEN bytes keep every level's length valid, so only the
        // depth cap can stop the descent.
        let window: Vec<u8> = (0..40u8).map(|i| 40 - i).collect();
        assert!(matches!(
            arena.decode(id, &window, 0, &mut cx, 0),
            Err(Error::RecursionLimit { .. })
        ));
    }

    #[test]
    fn byte_length_matches_decode_consumption() {
        let catalog = Catalog::new(vec![]).unwrap();
        let mut cx = cx_for(&catalog);
        let (arena, id) = compound_arena();

        let window = [0xC0, 0x11, 0x22];
        let length = arena.byte_length(id, &window, 0, &cx, 0).unwrap();
        let (_, used) = arena.decode(id, &window, 0, &mut cx, 0).unwrap();
        assert_eq!(length, used);
        assert_eq!(length, 3);
    }

    #[test]
    fn find_field_descends_the_tree() {
        let (arena, id) = compound_arena();
        assert!(arena.find_field(id, "C1").is_some());
        assert!(arena.find_field(id, "P").is_some());
        assert!(arena.find_field(id, "NOPE").is_none());
    }
}
