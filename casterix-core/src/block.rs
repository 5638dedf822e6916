//! Data-block decoding.
//!
//! A data block is a 3-byte header (`CAT`, big-endian `LEN` counting the
//! header itself) followed by records of that one category. Records decode
//! until the block window is exhausted; a record failure aborts the rest of
//! the block but keeps everything decoded before it.

use serde::Serialize;

use crate::DecodeCx;
use crate::error::Error;
use crate::record::{Record, decode_record};

/// Header size: one CAT octet plus the two LEN octets.
pub const BLOCK_HEADER_BYTES: usize = 3;

/// One decoded data block.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Block {
    pub category: u8,
    /// Records in wire order; possibly fewer than the block carried if a
    /// record failed mid-block.
    pub records: Vec<Record>,
    /// The block's LEN field: header plus record bytes.
    pub length: usize,
}

/// What one block-decode attempt produced.
///
/// `consumed == 0` means the header itself was unusable, so the packet
/// cannot re-synchronize and must stop.
pub(crate) struct BlockOutcome {
    pub block: Option<Block>,
    pub error: Option<Error>,
    pub consumed: usize,
}

/// Decodes the data block starting at `at`.
pub(crate) fn decode_block(buf: &[u8], at: usize, cx: &mut DecodeCx<'_>) -> BlockOutcome {
    let window = &buf[at..];
    if window.len() < BLOCK_HEADER_BYTES {
        return BlockOutcome {
            block: None,
            error: Some(Error::Truncated {
                offset: at,
                category: None,
                item: None,
            }),
            consumed: 0,
        };
    }

    let category_id = window[0];
    let length = u16::from_be_bytes([window[1], window[2]]);
    if (length as usize) < BLOCK_HEADER_BYTES || length as usize > window.len() {
        return BlockOutcome {
            block: None,
            error: Some(Error::InvalidBlockLength {
                len: length,
                offset: at,
                remaining: window.len(),
            }),
            consumed: 0,
        };
    }
    let length = length as usize;

    let Some(category) = cx.catalog.category(category_id as u16) else {
        // LEN was readable, so the packet can resume at the next block.
        return BlockOutcome {
            block: None,
            error: Some(Error::UnknownCategory {
                category: category_id,
                offset: at,
            }),
            consumed: length,
        };
    };

    let mut records = Vec::new();
    let mut cursor = BLOCK_HEADER_BYTES;
    let mut error = None;
    while cursor < length {
        match decode_record(category, &buf[at + cursor..at + length], at + cursor, cx) {
            Ok(record) => {
                cursor += record.length;
                records.push(record);
            }
            Err(record_error) => {
                log::debug!(
                    "aborting category {category_id} block at offset {}: {record_error}",
                    at + cursor
                );
                error = Some(record_error);
                break;
            }
        }
    }

    BlockOutcome {
        block: Some(Block {
            category: category_id,
            records,
            length,
        }),
        error,
        consumed: length,
    }
}
