//! Fragmentation codec for oversized replies.
//!
//! A reply whose encoded length exceeds the safe datagram payload is split
//! into numbered chunks, each prefixed with a textual `FRAG:<i>/<N>:` header
//! (1-based index, total count). Concatenating the chunk payloads in index
//! order reconstructs the reply exactly. The receiver collects chunks out of
//! order in a [`FragmentBuffer`]; reassembly is best-effort by contract, so
//! a buffer drained before completion yields the fragments that did arrive,
//! in index order, never an error.

use std::collections::BTreeMap;

/// Prefix marking a datagram as one chunk of a fragmented reply.
pub const FRAG_PREFIX: &[u8] = b"FRAG:";

// Reserved for the `FRAG:<i>/<N>:` header within one datagram.
const HEADER_MARGIN: usize = 20;

/// Parsed `FRAG:<index>/<total>:` header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FragmentHeader {
    /// 1-based chunk index.
    pub index: usize,
    /// Total chunk count for the reply.
    pub total: usize,
}

/// Splits `payload` into datagrams no larger than `max_payload` bytes.
///
/// A payload that already fits is returned as a single unframed datagram;
/// only oversized payloads carry fragment headers.
pub fn split(payload: &[u8], max_payload: usize) -> Vec<Vec<u8>> {
    if payload.len() <= max_payload {
        return vec![payload.to_vec()];
    }

    let chunk_size = max_payload - HEADER_MARGIN;
    let total = (payload.len() + chunk_size - 1) / chunk_size;

    payload
        .chunks(chunk_size)
        .enumerate()
        .map(|(i, chunk)| {
            let mut datagram = format!("FRAG:{}/{}:", i + 1, total).into_bytes();
            datagram.extend_from_slice(chunk);
            datagram
        })
        .collect()
}

/// Parses a fragment datagram into its header and payload slice.
///
/// Returns `None` for unframed datagrams or malformed headers.
pub fn parse_fragment(datagram: &[u8]) -> Option<(FragmentHeader, &[u8])> {
    let rest = datagram.strip_prefix(FRAG_PREFIX)?;
    let colon = rest.iter().position(|&b| b == b':')?;
    let header = std::str::from_utf8(&rest[..colon]).ok()?;
    let (index, total) = header.split_once('/')?;
    let index: usize = index.parse().ok()?;
    let total: usize = total.parse().ok()?;
    if index == 0 || total == 0 {
        return None;
    }
    Some((FragmentHeader { index, total }, &rest[colon + 1..]))
}

/// Receiver-side map from fragment index to payload, built incrementally
/// as fragments arrive out of order.
#[derive(Debug)]
pub struct FragmentBuffer {
    total: usize,
    parts: BTreeMap<usize, Vec<u8>>,
}

impl FragmentBuffer {
    /// Creates a buffer expecting `total` fragments.
    pub fn new(total: usize) -> Self {
        Self {
            total,
            parts: BTreeMap::new(),
        }
    }

    /// Stores one fragment payload. Duplicates overwrite the previous copy;
    /// indices outside `1..=total` are kept but never counted toward
    /// completion.
    pub fn insert(&mut self, index: usize, payload: &[u8]) {
        self.parts.insert(index, payload.to_vec());
    }

    /// Number of distinct in-range fragments received so far.
    pub fn received(&self) -> usize {
        self.parts.range(1..=self.total).count()
    }

    /// Total fragment count this buffer was created for.
    pub fn total(&self) -> usize {
        self.total
    }

    /// True once every index in `1..=total` is present.
    pub fn is_complete(&self) -> bool {
        self.received() == self.total
    }

    /// Concatenates the in-range fragments in index order.
    ///
    /// Callers must not assume the output is complete content: missing
    /// indices are simply skipped.
    pub fn into_bytes(self) -> Vec<u8> {
        let total = self.total;
        let mut out = Vec::new();
        for (_, part) in self.parts.range(1..=total) {
            out.extend_from_slice(part);
        }
        out
    }
}
