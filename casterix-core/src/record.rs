//! Per-record decoding.
//!
//! A record is an FSPEC prelude followed by one data item per present FRN,
//! in UAP order. The decoder selects the category's UAP, walks the present
//! FRNs, and dispatches each item to its format tree. Items outside the
//! active filter are skipped by byte length, so filtering never changes how
//! far the cursor advances.

use std::sync::Arc;

use serde::Serialize;

use crate::DecodeCx;
use crate::catalog::Category;
use crate::error::Error;
use crate::fspec::Fspec;
use crate::value::ItemValue;

/// One decoded data item of a record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DecodedItem {
    pub id: Arc<str>,
    pub value: ItemValue,
}

/// A fully decoded record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Record {
    pub category: u8,
    /// Items in FRN order (the UAP's declaration order).
    pub items: Vec<DecodedItem>,
    /// The FSPEC octets as read off the wire.
    pub fspec: Vec<u8>,
    /// The record's raw bytes; attached on verbose decodes only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw: Option<Vec<u8>>,
    /// CRC-32 over the record's raw bytes.
    pub crc: u32,
    /// Wall-clock hint in seconds since the epoch, when requested.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<f64>,
    /// Total wire length: FSPEC plus all present items.
    pub length: usize,
}

impl Record {
    pub fn fspec_hex(&self) -> String {
        hex::encode_upper(&self.fspec)
    }

    pub fn raw_hex(&self) -> Option<String> {
        self.raw.as_deref().map(hex::encode_upper)
    }

    /// The decoded value of an item, by id.
    pub fn item(&self, id: &str) -> Option<&ItemValue> {
        self.items
            .iter()
            .find(|item| item.id.as_ref() == id)
            .map(|item| &item.value)
    }
}

/// Decodes one record of `category` from the start of `window`.
///
/// `window` must end at the enclosing block boundary; `at` is the absolute
/// offset of the record start.
pub(crate) fn decode_record(
    category: &Category,
    window: &[u8],
    at: usize,
    cx: &mut DecodeCx<'_>,
) -> Result<Record, Error> {
    let category_id = category.id() as u8;
    let fspec =
        Fspec::read(window, at).map_err(|error| error.with_category(category_id))?;

    let uap = category
        .uaps()
        .iter()
        .find(|uap| uap.selector.matches(fspec.bytes()))
        .ok_or_else(|| Error::NoMatchingUap {
            category: category_id,
            fspec: fspec.to_hex(),
        })?;

    cx.category = category_id;
    let frns = fspec.frns();
    let mut items = Vec::with_capacity(frns.len());
    let mut cursor = fspec.len();

    for frn in frns {
        let entry = uap.entry(frn).ok_or(Error::UnknownFrn {
            category: category_id,
            frn,
        })?;
        let Some(item_id) = &entry.item else {
            // FX or spare slot: gates no item.
            continue;
        };
        let item = category.item(item_id).ok_or_else(|| Error::UnknownDataItem {
            category: category_id,
            item: item_id.clone(),
        })?;
        cx.item = item.id.clone();

        let remaining = &window[cursor..];
        if !cx.item_included(item_id) {
            cursor += category
                .arena()
                .byte_length(item.format, remaining, at + cursor, cx, 0)?;
            continue;
        }
        let (value, used) = category
            .arena()
            .decode(item.format, remaining, at + cursor, cx, 0)?;
        items.push(DecodedItem {
            id: item.id.clone(),
            value,
        });
        cursor += used;
    }

    let raw = &window[..cursor];
    log::trace!(
        "decoded category {category_id} record: {} items in {cursor} bytes",
        items.len()
    );
    Ok(Record {
        category: category_id,
        items,
        fspec: fspec.bytes().to_vec(),
        raw: cx.verbose.then(|| raw.to_vec()),
        crc: crc32(raw),
        timestamp: cx.timestamp,
        length: cursor,
    })
}

/// Bitwise CRC-32 (IEEE polynomial, reflected).
pub(crate) fn crc32(bytes: &[u8]) -> u32 {
    let mut crc = 0xFFFF_FFFFu32;
    for &byte in bytes {
        crc ^= byte as u32;
        for _ in 0..8 {
            let mask = (crc & 1).wrapping_neg();
            crc = (crc >> 1) ^ (0xEDB8_8320 & mask);
        }
    }
    !crc
}
