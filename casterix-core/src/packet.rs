//! Packet decoding: the public entry point.
//!
//! A packet is a plain concatenation of data blocks. [`decode_packet`] walks
//! them under the caller's options, collecting every block, warning, and
//! error into one [`DecodeResult`]. It is a pure function of
//! `(catalog, buf, offset, options)` apart from the optional wall-clock
//! timestamp, holds no global state, and may run concurrently against a
//! shared catalog from any number of threads.

use std::time::{SystemTime, UNIX_EPOCH};

use serde::Serialize;

use crate::DecodeCx;
use crate::block::{BLOCK_HEADER_BYTES, Block, decode_block};
use crate::catalog::Catalog;
use crate::error::{Error, Warning};
use crate::filter::FilterPredicate;

/// Options for one [`decode_packet`] call.
#[derive(Debug, Clone, Default)]
pub struct DecodeOptions {
    /// Stop after this many blocks; `None` or `Some(0)` decodes them all.
    pub max_blocks: Option<u32>,
    /// Attach raw hex, FX diagnostic bits, and enumeration labels.
    pub verbose: bool,
    /// Reject inputs larger than this many bytes past the offset.
    /// Zero selects [`DEFAULT_MAX_PACKET_BYTES`].
    pub max_packet_bytes: usize,
    /// Restrict which items and fields reach the output.
    pub filter: Option<FilterPredicate>,
    /// Promote every warning into [`Error::Strict`].
    pub strict: bool,
    /// Stamp records with the wall clock. Off by default, keeping the
    /// decode a pure function of its inputs.
    pub timestamp: bool,
}

/// Default input cap, sized for one UDP datagram worth of blocks.
pub const DEFAULT_MAX_PACKET_BYTES: usize = 65_536;

impl DecodeOptions {
    fn packet_cap(&self) -> usize {
        if self.max_packet_bytes == 0 {
            DEFAULT_MAX_PACKET_BYTES
        } else {
            self.max_packet_bytes
        }
    }

    fn block_cap(&self) -> u32 {
        match self.max_blocks {
            None | Some(0) => u32::MAX,
            Some(n) => n,
        }
    }
}

/// Everything one [`decode_packet`] call produced.
///
/// Partial results are never dropped: blocks decoded before a failure stay
/// in `blocks` and the failure itself lands in `errors`.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct DecodeResult {
    /// Blocks in wire order.
    pub blocks: Vec<Block>,
    /// Absolute offset decoding stopped at; equals the starting offset when
    /// nothing was consumed. Callers streaming a larger capture resume here.
    pub bytes_consumed: usize,
    /// Rough lower-bound block count left past `bytes_consumed`, derived
    /// from the minimum block size. For backpressure only, never exact.
    pub remaining_blocks_estimate: usize,
    pub warnings: Vec<Warning>,
    pub errors: Vec<Error>,
}

impl DecodeResult {
    /// Total records across all blocks.
    pub fn record_count(&self) -> usize {
        self.blocks.iter().map(|b| b.records.len()).sum()
    }
}

/// Decodes every data block of `buf` starting at `offset`.
///
/// The catalog is borrowed read-only; all transient state lives in the
/// call. Fatal errors abort their block, and the walk resumes at the next
/// block boundary whenever the failed block's LEN was still trustworthy.
pub fn decode_packet(
    catalog: &Catalog,
    buf: &[u8],
    offset: usize,
    options: &DecodeOptions,
) -> DecodeResult {
    let mut result = DecodeResult {
        bytes_consumed: offset.min(buf.len()),
        ..DecodeResult::default()
    };

    if buf.is_empty() {
        result.errors.push(Error::Truncated {
            offset: 0,
            category: None,
            item: None,
        });
        return result;
    }
    if offset >= buf.len() {
        // Nothing left to decode; an exhausted stream is not an error.
        result.bytes_consumed = offset;
        return result;
    }
    if buf.len() - offset > options.packet_cap() {
        result.errors.push(Error::OversizedPacket {
            len: buf.len() - offset,
            max: options.packet_cap(),
        });
        return result;
    }

    let mut cx = DecodeCx::new(catalog, options.filter.as_ref(), options.verbose);
    if options.timestamp {
        cx.timestamp = Some(now_secs());
    }

    log::trace!(
        "decoding packet: {} bytes from offset {offset}",
        buf.len() - offset
    );

    let block_cap = options.block_cap();
    let mut cursor = offset;
    let mut blocks_seen = 0u32;
    while cursor < buf.len() && blocks_seen < block_cap {
        let outcome = decode_block(buf, cursor, &mut cx);
        if let Some(block) = outcome.block {
            result.blocks.push(block);
        }
        if let Some(error) = outcome.error {
            log::warn!("block at offset {cursor}: {error}");
            result.errors.push(error);
        }
        if outcome.consumed == 0 {
            // Header unusable: no LEN to resynchronize on.
            break;
        }
        cursor += outcome.consumed;
        blocks_seen += 1;
    }

    result.bytes_consumed = cursor;
    result.remaining_blocks_estimate = (buf.len() - cursor) / BLOCK_HEADER_BYTES;
    result.warnings = cx.warnings;
    if options.strict {
        result
            .errors
            .extend(result.warnings.drain(..).map(Error::Strict));
    }
    result
}

fn now_secs() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_secs_f64())
        .unwrap_or_default()
}
