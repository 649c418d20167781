//! On-disk entry encoding: `<expiry>\n<payload>`
//!
//! `<expiry>` is a decimal unix timestamp in seconds; `0` never expires.

use std::io;

/// Longest header accepted when decoding (`u64::MAX` plus newline)
pub const MAX_HEADER_LEN: usize = 21;

pub fn encode(expires_at: u64, payload: &[u8]) -> Vec<u8> {
    let header = format!("{}\n", expires_at);
    let mut buf = Vec::with_capacity(header.len() + payload.len());
    buf.extend_from_slice(header.as_bytes());
    buf.extend_from_slice(payload);
    buf
}

/// Parse the expiry header line (without its newline)
pub fn parse_header(line: &[u8]) -> io::Result<u64> {
    std::str::from_utf8(line)
        .ok()
        .and_then(|s| s.trim_end_matches('\r').parse::<u64>().ok())
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidData, "malformed cache entry header"))
}

/// Split raw file contents into expiry and payload
pub fn decode(raw: &[u8]) -> io::Result<(u64, &[u8])> {
    let newline = raw
        .iter()
        .take(MAX_HEADER_LEN)
        .position(|b| *b == b'\n')
        .ok_or_else(|| {
            io::Error::new(io::ErrorKind::InvalidData, "cache entry header not terminated")
        })?;
    let expires_at = parse_header(&raw[..newline])?;
    Ok((expires_at, &raw[newline + 1..]))
}

pub fn is_expired(expires_at: u64, now: u64) -> bool {
    expires_at != 0 && expires_at <= now
}
