//! The category catalog.
//!
//! A [`Catalog`] is the immutable, validated form of a set of ASTERIX
//! category definitions. An external loader (XML or otherwise) assembles
//! categories through [`CategoryBuilder`]; every structural invariant is
//! checked once here so the decoder never meets an inconsistent schema.
//! After construction the catalog is read-only and safe to share by
//! reference across any number of concurrent decodes.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::error::CatalogError;
use crate::field::BitsField;
use crate::format::{
    Fixed, FormatArena, FormatId, FormatNode, MAX_FORMAT_DEPTH,
};

/// Pseudo-category id reserved for Mode-S BDS register definitions.
/// Registers are items of this category, keyed by their two-hex-digit id
/// (`"60"`, `"4A"`, ...).
pub const BDS_CATEGORY: u16 = 256;

/// Presence rule of a data item within its category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Rule {
    Mandatory,
    Optional,
    Conditional,
    #[default]
    Unknown,
}

/// One data item of a category: identity, prose, presence rule, and the
/// root of its format tree.
#[derive(Debug, Clone)]
pub struct DataItemDescription {
    pub id: Arc<str>,
    pub name: Arc<str>,
    pub definition: Option<Arc<str>>,
    pub note: Option<Arc<str>>,
    pub rule: Rule,
    pub format: FormatId,
}

impl DataItemDescription {
    pub fn new(id: &str, name: &str, format: FormatId) -> Self {
        Self {
            id: Arc::from(id),
            name: Arc::from(name),
            definition: None,
            note: None,
            rule: Rule::default(),
            format,
        }
    }

    pub fn with_rule(mut self, rule: Rule) -> Self {
        self.rule = rule;
        self
    }

    pub fn with_definition(mut self, definition: &str) -> Self {
        self.definition = Some(Arc::from(definition));
        self
    }

    pub fn with_note(mut self, note: &str) -> Self {
        self.note = Some(Arc::from(note));
        self
    }
}

/// Predicate choosing a UAP for a record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UapSelector {
    /// Always matches. The common single-UAP case.
    Unconditional,
    /// Matches when bit `bit` (0 = LSB) of FSPEC octet `byte` equals
    /// `expected`. A missing octet reads as 0.
    IfBit { byte: usize, bit: u8, expected: bool },
}

impl UapSelector {
    pub(crate) fn matches(&self, fspec: &[u8]) -> bool {
        match self {
            UapSelector::Unconditional => true,
            UapSelector::IfBit {
                byte,
                bit,
                expected,
            } => {
                let set = fspec
                    .get(*byte)
                    .map(|b| (b >> bit) & 1 == 1)
                    .unwrap_or(false);
                set == *expected
            }
        }
    }
}

/// One FRN slot of a UAP. `item: None` marks an FX or spare slot that
/// gates no data item.
#[derive(Debug, Clone)]
pub struct UapEntry {
    pub frn: usize,
    pub item: Option<Arc<str>>,
}

/// A User Application Profile: the ordered FRN-to-item mapping of a
/// category, optionally guarded by a selector.
#[derive(Debug, Clone)]
pub struct Uap {
    pub selector: UapSelector,
    pub entries: Vec<UapEntry>,
}

impl Uap {
    /// Builds an unconditional UAP with FRNs assigned in slot order.
    pub fn unconditional<'a>(slots: impl IntoIterator<Item = Option<&'a str>>) -> Self {
        Self::selected(UapSelector::Unconditional, slots)
    }

    pub fn selected<'a>(
        selector: UapSelector,
        slots: impl IntoIterator<Item = Option<&'a str>>,
    ) -> Self {
        let entries = slots
            .into_iter()
            .enumerate()
            .map(|(index, item)| UapEntry {
                frn: index + 1,
                item: item.map(Arc::from),
            })
            .collect();
        Self { selector, entries }
    }

    /// The entry gated by `frn`, if the UAP extends that far.
    pub(crate) fn entry(&self, frn: usize) -> Option<&UapEntry> {
        self.entries.get(frn - 1)
    }
}

/// A validated ASTERIX category definition.
#[derive(Debug, Clone)]
pub struct Category {
    id: u16,
    name: Arc<str>,
    version: Arc<str>,
    items: BTreeMap<Arc<str>, DataItemDescription>,
    uaps: Vec<Uap>,
    arena: FormatArena,
}

impl Category {
    pub fn id(&self) -> u16 {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn item(&self, id: &str) -> Option<&DataItemDescription> {
        self.items.get(id)
    }

    pub fn items(&self) -> impl Iterator<Item = &DataItemDescription> {
        self.items.values()
    }

    pub fn uaps(&self) -> &[Uap] {
        &self.uaps
    }

    pub(crate) fn arena(&self) -> &FormatArena {
        &self.arena
    }
}

/// Assembles and validates one [`Category`].
///
/// The builder owns the category's [`FormatArena`]; format nodes are pushed
/// through [`formats`](Self::formats) and referenced by the ids it returns.
#[derive(Debug)]
pub struct CategoryBuilder {
    id: u16,
    name: Arc<str>,
    version: Arc<str>,
    arena: FormatArena,
    items: Vec<DataItemDescription>,
    uaps: Vec<Uap>,
}

impl CategoryBuilder {
    pub fn new(id: u16, name: &str, version: &str) -> Self {
        Self {
            id,
            name: Arc::from(name),
            version: Arc::from(version),
            arena: FormatArena::new(),
            items: Vec::new(),
            uaps: Vec::new(),
        }
    }

    /// The category's format arena, for pushing nodes.
    pub fn formats(&mut self) -> &mut FormatArena {
        &mut self.arena
    }

    /// Adds a data item with default prose and rule.
    pub fn item(&mut self, id: &str, name: &str, format: FormatId) -> &mut Self {
        self.items.push(DataItemDescription::new(id, name, format));
        self
    }

    pub fn add_item(&mut self, item: DataItemDescription) -> &mut Self {
        self.items.push(item);
        self
    }

    pub fn uap(&mut self, uap: Uap) -> &mut Self {
        self.uaps.push(uap);
        self
    }

    /// Validates every structural invariant and freezes the category.
    pub fn build(self) -> Result<Category, CatalogError> {
        if self.id == 0 || self.id > BDS_CATEGORY {
            return Err(CatalogError::CategoryId(self.id));
        }
        if self.uaps.is_empty() {
            return Err(CatalogError::NoUap(self.id));
        }
        for (uap_index, uap) in self.uaps.iter().enumerate() {
            for (index, entry) in uap.entries.iter().enumerate() {
                if entry.frn != index + 1 {
                    return Err(CatalogError::UapGap {
                        category: self.id,
                        uap: uap_index,
                        frn: index + 1,
                    });
                }
            }
        }

        let mut items = BTreeMap::new();
        for item in self.items {
            validate_format(&self.arena, item.format, &item.id, 0)?;
            let id = item.id.clone();
            if items.insert(id.clone(), item).is_some() {
                return Err(CatalogError::DuplicateItem {
                    category: self.id,
                    item: id,
                });
            }
        }

        Ok(Category {
            id: self.id,
            name: self.name,
            version: self.version,
            items,
            uaps: self.uaps,
            arena: self.arena,
        })
    }
}

fn validate_format(
    arena: &FormatArena,
    id: FormatId,
    item: &Arc<str>,
    depth: usize,
) -> Result<(), CatalogError> {
    if depth > MAX_FORMAT_DEPTH {
        // Cycles and over-deep trees are cut off at decode by the same cap;
        // nodes past it are unreachable.
        return Ok(());
    }
    let node = arena
        .get(id)
        .ok_or_else(|| CatalogError::FormatRef { item: item.clone() })?;
    match node {
        FormatNode::Fixed(fixed) => validate_fixed(fixed, item, None),
        FormatNode::Variable(variable) => {
            if variable.parts.is_empty() {
                return Err(CatalogError::EmptyParts { item: item.clone() });
            }
            for (index, part) in variable.parts.iter().enumerate() {
                validate_fixed(part, item, Some(index))?;
            }
            Ok(())
        }
        FormatNode::Repetitive { element } | FormatNode::Explicit { element } => {
            validate_format(arena, *element, item, depth + 1)
        }
        FormatNode::Compound(compound) => {
            if compound.indicator.parts.is_empty() {
                return Err(CatalogError::EmptyParts { item: item.clone() });
            }
            for (index, part) in compound.indicator.parts.iter().enumerate() {
                if part.length != 1 {
                    return Err(CatalogError::IndicatorWidth { item: item.clone() });
                }
                validate_fixed(part, item, Some(index))?;
            }
            for child in &compound.children {
                validate_format(arena, child.format, item, depth + 1)?;
            }
            Ok(())
        }
        FormatNode::Bds { .. } => Ok(()),
    }
}

/// Checks one fixed part: field ranges inside the window, width caps per
/// encoding, unique names, and (for variable parts) exactly one single-bit
/// FX marker.
fn validate_fixed(
    fixed: &Fixed,
    item: &Arc<str>,
    variable_part: Option<usize>,
) -> Result<(), CatalogError> {
    let window_bits = fixed.length as u32 * 8;
    let mut fx_bits = 0usize;
    for field in &fixed.fields {
        validate_field(field, window_bits, item)?;
        if field.fx {
            if field.width() != 1 {
                return Err(CatalogError::FxCardinality {
                    item: item.clone(),
                    part: variable_part.unwrap_or(0),
                });
            }
            fx_bits += 1;
        }
    }
    if let Some(part) = variable_part
        && fx_bits != 1
    {
        return Err(CatalogError::FxCardinality {
            item: item.clone(),
            part,
        });
    }
    for (index, field) in fixed.fields.iter().enumerate() {
        if fixed.fields[..index].iter().any(|f| f.name == field.name) {
            return Err(CatalogError::DuplicateField {
                item: item.clone(),
                field: field.name.clone(),
            });
        }
    }
    Ok(())
}

fn validate_field(
    field: &BitsField,
    window_bits: u32,
    item: &Arc<str>,
) -> Result<(), CatalogError> {
    if field.to == 0 || field.from < field.to || field.from > window_bits {
        return Err(CatalogError::FieldRange {
            item: item.clone(),
            field: field.name.clone(),
            from: field.from,
            to: field.to,
            bytes: (window_bits / 8) as u16,
        });
    }
    let width = field.width();
    match field.encoding.group_bits() {
        Some(group) if width % group != 0 => Err(CatalogError::FieldNotAligned {
            item: item.clone(),
            field: field.name.clone(),
            width,
            group,
        }),
        None if width > 64 => Err(CatalogError::FieldTooWide {
            item: item.clone(),
            field: field.name.clone(),
            width,
        }),
        _ => Ok(()),
    }
}

/// The indexed, immutable set of categories a decode runs against.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    categories: BTreeMap<u16, Category>,
}

impl Catalog {
    /// Indexes the given categories, rejecting duplicates.
    pub fn new(categories: Vec<Category>) -> Result<Self, CatalogError> {
        let mut indexed = BTreeMap::new();
        for category in categories {
            let id = category.id;
            if indexed.insert(id, category).is_some() {
                return Err(CatalogError::DuplicateCategory(id));
            }
        }
        Ok(Self {
            categories: indexed,
        })
    }

    pub fn category(&self, id: u16) -> Option<&Category> {
        self.categories.get(&id)
    }

    /// Whether a wire category (1..=255) has a definition.
    pub fn is_defined(&self, category: u8) -> bool {
        self.categories.contains_key(&(category as u16))
    }

    pub fn categories(&self) -> impl Iterator<Item = &Category> {
        self.categories.values()
    }

    /// Resolves a BDS register id against the pseudo-category.
    pub(crate) fn bds_format(&self, register: u8) -> Option<(&FormatArena, FormatId)> {
        let bds = self.categories.get(&BDS_CATEGORY)?;
        let item = bds.item(&format!("{register:02X}"))?;
        Some((bds.arena(), item.format))
    }
}
