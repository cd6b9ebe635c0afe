//! Byte-to-text decoding for log sources.
//!
//! A byte-order mark wins when present. Without one, a buffer whose first
//! 4 KiB is more than 10% NUL bytes is taken to be BOM-less UTF-16LE (the
//! usual shape of Windows installer logs). Everything else is UTF-8.
//! Malformed sequences, unpaired surrogates and an odd trailing UTF-16 byte
//! all decode to U+FFFD.

pub use encoding_rs::{Encoding, UTF_16BE, UTF_16LE, UTF_8};

/// Bytes sampled by the NUL heuristic.
const SNIFF_LEN: usize = 4096;

/// Pick an encoding and the number of leading BOM bytes to skip.
pub fn sniff(bytes: &[u8]) -> (&'static Encoding, usize) {
    if let Some(found) = Encoding::for_bom(bytes) {
        return found;
    }
    let sample = &bytes[..bytes.len().min(SNIFF_LEN)];
    let nuls = sample.iter().filter(|b| **b == 0).count();
    if nuls * 10 > sample.len() {
        (UTF_16LE, 0)
    } else {
        (UTF_8, 0)
    }
}

/// Decode `bytes` to text. Never fails.
pub fn decode(bytes: &[u8]) -> String {
    let (encoding, skip) = sniff(bytes);
    let body = &bytes[skip..];
    let (text, had_errors) = encoding.decode_without_bom_handling(body);
    tracing::debug!(
        encoding = encoding.name(),
        bytes = body.len(),
        had_errors,
        "decode: sniffed encoding"
    );
    text.into_owned()
}
