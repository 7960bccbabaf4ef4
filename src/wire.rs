//! Descriptor wire format: a flat array of key/value records.
//!
//! ```text
//! [{"cluster_id":1,"pixels":20,"brightness":180,"clustering":3,"speed":100,"symbol":"AAPL"}, ...]
//! ```
//!
//! # Decoding contract
//!
//! The decoder is a small tolerant scanner, not a JSON parser:
//!
//! - each record runs from a `{` to the next `}`; nesting is not understood
//! - a missing key yields 0 (empty string for `symbol`); non-numeric values yield 0
//! - a record containing none of the known keys is skipped and scanning
//!   carries on with the next record; a well-formed but unrecognised record
//!   does not end the decode, only an unterminated or over-long one does
//! - scanning stops at end of input, at the first unterminated record, at a
//!   record longer than [`MAX_RECORD_LEN`] bytes, or once [`MAX_CLUSTERS`]
//!   records were read; everything read up to that point is kept
//!
//! Callers rely on partial input degrading to fewer clusters, never to an error.
//! [`DecodeStop`] says why scanning ended, for diagnostics only.

use core::fmt;

use crate::descriptor::{truncated_label, ClusterDescriptor, RawDescriptor, MAX_CLUSTERS};

/// Longest accepted record body in bytes (between the braces).
pub const MAX_RECORD_LEN: usize = 256;

const KEY_CLUSTER_ID: &[u8] = b"\"cluster_id\"";
const KEY_PIXELS: &[u8] = b"\"pixels\"";
const KEY_BRIGHTNESS: &[u8] = b"\"brightness\"";
const KEY_CLUSTERING: &[u8] = b"\"clustering\"";
const KEY_SPEED: &[u8] = b"\"speed\"";
const KEY_SYMBOL: &[u8] = b"\"symbol\"";

// ─── DecodeStop ──────────────────────────────────────────────────────────────

/// Why the scanner stopped.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DecodeStop {
    /// Input exhausted after at least one record start.
    EndOfInput,
    /// No record start marker anywhere in the input.
    NoRecordStart,
    /// A record was opened but never closed.
    Unterminated,
    /// A record body exceeded [`MAX_RECORD_LEN`].
    RecordTooLong,
    /// [`MAX_CLUSTERS`] records were read.
    CapacityReached,
}

impl DecodeStop {
    /// `true` when scanning ended on malformed input rather than naturally.
    pub fn is_abnormal(&self) -> bool {
        matches!(self, Self::Unterminated | Self::RecordTooLong)
    }
}

impl fmt::Display for DecodeStop {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EndOfInput => f.write_str("end of input"),
            Self::NoRecordStart => f.write_str("no record start marker"),
            Self::Unterminated => f.write_str("unterminated record"),
            Self::RecordTooLong => write!(f, "record longer than {} bytes", MAX_RECORD_LEN),
            Self::CapacityReached => write!(f, "{} records read", MAX_CLUSTERS),
        }
    }
}

/// Output of [`decode`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Decoded {
    /// Records read, in input order, fields unclamped.
    pub records: heapless::Vec<RawDescriptor, MAX_CLUSTERS>,
    /// Records skipped because they contained no known key.
    pub skipped: usize,
    /// Why scanning ended.
    pub stop: DecodeStop,
}

// ─── decode ──────────────────────────────────────────────────────────────────

/// Scan `input` for descriptor records.
pub fn decode(input: &[u8]) -> Decoded {
    let mut records: heapless::Vec<RawDescriptor, MAX_CLUSTERS> = heapless::Vec::new();
    let mut skipped = 0usize;
    let mut pos = 0usize;
    let mut seen_start = false;

    let stop = loop {
        if records.is_full() {
            break DecodeStop::CapacityReached;
        }
        let start = match find_byte(input, pos, b'{') {
            Some(i) => i,
            None if seen_start => break DecodeStop::EndOfInput,
            None => break DecodeStop::NoRecordStart,
        };
        seen_start = true;
        let end = match find_byte(input, start + 1, b'}') {
            Some(i) => i,
            None => break DecodeStop::Unterminated,
        };
        if end - start - 1 > MAX_RECORD_LEN {
            break DecodeStop::RecordTooLong;
        }
        pos = end + 1;

        match parse_record(&input[start + 1..end]) {
            Some(raw) => {
                // Capacity checked at the top of the loop.
                let _ = records.push(raw);
            }
            None => skipped += 1,
        }
    };

    if stop.is_abnormal() {
        log::warn!("descriptor decode stopped early: {} ({} records kept)", stop, records.len());
    }

    Decoded { records, skipped, stop }
}

/// [`decode`] for string input.
pub fn decode_str(input: &str) -> Decoded {
    decode(input.as_bytes())
}

fn parse_record(body: &[u8]) -> Option<RawDescriptor> {
    let cluster_id = find_value(body, KEY_CLUSTER_ID);
    let pixels = find_value(body, KEY_PIXELS);
    let brightness = find_value(body, KEY_BRIGHTNESS);
    let clustering = find_value(body, KEY_CLUSTERING);
    let speed = find_value(body, KEY_SPEED);
    let symbol = find_value(body, KEY_SYMBOL);

    if cluster_id.is_none()
        && pixels.is_none()
        && brightness.is_none()
        && clustering.is_none()
        && speed.is_none()
        && symbol.is_none()
    {
        return None;
    }

    let int = |v: Option<&[u8]>| v.map_or(0, parse_int);
    Some(RawDescriptor {
        cluster_id: int(cluster_id),
        pixels: int(pixels),
        brightness: int(brightness),
        clustering: int(clustering),
        speed: int(speed),
        symbol: symbol.map(parse_symbol).unwrap_or_default(),
    })
}

/// Slice starting at the value that follows `key:` in `body`.
///
/// A key occurrence not followed by `:` (e.g. the same text used as a value)
/// is passed over.
fn find_value<'a>(body: &'a [u8], key: &[u8]) -> Option<&'a [u8]> {
    let mut from = 0;
    while let Some(at) = find_slice(body, from, key) {
        let after = skip_ws(body, at + key.len());
        if body.get(after) == Some(&b':') {
            return Some(&body[skip_ws(body, after + 1)..]);
        }
        from = at + 1;
    }
    None
}

/// Leading-integer parse: optional sign then digits, saturating; 0 if none.
fn parse_int(v: &[u8]) -> i32 {
    let (negative, digits) = match v.first() {
        Some(b'-') => (true, &v[1..]),
        Some(b'+') => (false, &v[1..]),
        _ => (false, v),
    };
    let mut acc: i64 = 0;
    for &b in digits.iter().take_while(|b| b.is_ascii_digit()) {
        acc = (acc * 10 + (b - b'0') as i64).min(i32::MAX as i64 + 1);
    }
    let signed = if negative { -acc } else { acc };
    signed.clamp(i32::MIN as i64, i32::MAX as i64) as i32
}

fn parse_symbol(v: &[u8]) -> crate::descriptor::Label {
    if v.first() != Some(&b'"') {
        return Default::default();
    }
    let rest = &v[1..];
    let end = find_byte(rest, 0, b'"').unwrap_or(rest.len());
    match core::str::from_utf8(&rest[..end]) {
        Ok(s) => truncated_label(s),
        Err(_) => Default::default(),
    }
}

fn find_byte(haystack: &[u8], from: usize, needle: u8) -> Option<usize> {
    haystack
        .get(from..)?
        .iter()
        .position(|&b| b == needle)
        .map(|i| i + from)
}

fn find_slice(haystack: &[u8], from: usize, needle: &[u8]) -> Option<usize> {
    haystack
        .get(from..)?
        .windows(needle.len())
        .position(|w| w == needle)
        .map(|i| i + from)
}

fn skip_ws(s: &[u8], mut i: usize) -> usize {
    while s.get(i).map_or(false, |b| b.is_ascii_whitespace()) {
        i += 1;
    }
    i
}

// ─── encode ──────────────────────────────────────────────────────────────────

/// Write `descriptors` in the wire format.
///
/// Double quotes and backslashes in labels are dropped; the decoder has no
/// escape handling.
pub fn encode<W: fmt::Write>(descriptors: &[ClusterDescriptor], out: &mut W) -> fmt::Result {
    out.write_char('[')?;
    for (i, d) in descriptors.iter().enumerate() {
        if i > 0 {
            out.write_char(',')?;
        }
        write!(
            out,
            "{{\"cluster_id\":{},\"pixels\":{},\"brightness\":{},\"clustering\":{},\"speed\":{},\"symbol\":\"",
            d.cluster_id, d.pixel_count, d.brightness, d.clustering_strength, d.animation_speed_ms,
        )?;
        for ch in d.label.chars().filter(|&c| c != '"' && c != '\\') {
            out.write_char(ch)?;
        }
        out.write_str("\"}")?;
    }
    out.write_char(']')
}
