//! Container header framing: magic tags, the `(symbol, length, code)`
//! table, and the MD5 digest field.
//!
//! Byte layout grounded on `original_source/source/compress.c`
//! (`egz_write_header`, `egz_get_header_size`) and `expand.c`
//! (`egz_rebuild_symbols`), per `spec.md` §4.4/§4.6/§6.

use crate::tree::CodeEntry;
use crate::Error;

pub const FILE_MAGIC: &[u8; 3] = b"EGZ";
pub const HEADER_MAGIC: &[u8; 3] = b"EGH";
pub const DATA_MAGIC: &[u8; 3] = b"EGD";

/// 32 hex chars + 1 NUL terminator, per `spec.md` §4.4/§9.
pub const DIGEST_FIELD_LEN: usize = 33;

/// Width in bytes of a code-table entry's `code` field for a given code
/// length, per `spec.md` §4.4: the smallest power-of-two width that holds
/// `length` bits.
pub fn code_width(length: u8) -> u8 {
    match length {
        1..=8 => 1,
        9..=16 => 2,
        17..=32 => 4,
        33..=64 => 8,
        _ => unreachable!("code length out of range: {length}"),
    }
}

fn entry_size(length: u8) -> u16 {
    2 + code_width(length) as u16 // symbol byte + length byte + code width
}

/// Sum of `header-magic + 8 + 33 + 2 + entry_sizes`, the value written
/// into the 2-byte `header_length` field (`spec.md` §4.4).
pub fn header_length(entries: &[CodeEntry]) -> u16 {
    let entries_sum: u16 = entries.iter().map(|e| entry_size(e.length)).sum();
    HEADER_MAGIC.len() as u16 + 8 + DIGEST_FIELD_LEN as u16 + 2 + entries_sum
}

/// Format a raw MD5 digest as the 33-byte on-disk field (32 lowercase hex
/// chars, zero-padded to 33 with a trailing NUL).
pub fn digest_field(digest: &md5::Digest) -> [u8; DIGEST_FIELD_LEN] {
    let hex = format!("{:x}", digest);
    let mut field = [0u8; DIGEST_FIELD_LEN];
    field[..32].copy_from_slice(hex.as_bytes());
    field
}

pub fn digest_hex(data: &[u8]) -> String {
    format!("{:x}", md5::compute(data))
}

/// Writes the full header (everything between the file magic and the
/// data magic) to `out`.
pub fn write_header(
    out: &mut Vec<u8>,
    original_size: u64,
    digest: &md5::Digest,
    entries: &[CodeEntry],
) {
    out.extend_from_slice(FILE_MAGIC);
    out.extend_from_slice(&header_length(entries).to_le_bytes());
    out.extend_from_slice(HEADER_MAGIC);
    out.extend_from_slice(&original_size.to_le_bytes());
    out.extend_from_slice(&digest_field(digest));
    out.extend_from_slice(&(entries.len() as u16).to_le_bytes());
    for e in entries {
        out.push(e.symbol);
        out.push(e.length);
        let width = code_width(e.length) as usize;
        out.extend_from_slice(&e.code.to_le_bytes()[..width]);
    }
}

/// The parsed, read-only view of a header.
pub struct Header {
    pub original_size: u64,
    pub digest_hex: String,
    pub entries: Vec<CodeEntry>,
}

/// Parses a header out of `data`, starting at offset 0. Returns the
/// header plus the byte offset of the data magic that follows it.
pub fn read_header(data: &[u8]) -> Result<(Header, usize), Error> {
    if data.len() < 5 || &data[0..3] != FILE_MAGIC {
        return Err(Error::FileFormatMismatch);
    }
    let header_length = u16::from_le_bytes([data[3], data[4]]) as usize;
    let body_start = 5;
    let body_end = body_start + header_length;
    if data.len() < body_end {
        return Err(Error::FileFormatMismatch);
    }
    let body = &data[body_start..body_end];

    if body.len() < 3 || &body[0..3] != HEADER_MAGIC {
        return Err(Error::FileFormatMismatch);
    }
    if body.len() < 3 + 8 + DIGEST_FIELD_LEN + 2 {
        return Err(Error::FileFormatMismatch);
    }
    let original_size = u64::from_le_bytes(body[3..11].try_into().unwrap());
    let digest_bytes = &body[11..11 + DIGEST_FIELD_LEN];
    let nul = digest_bytes.iter().position(|&b| b == 0).unwrap_or(digest_bytes.len());
    let digest_hex = String::from_utf8_lossy(&digest_bytes[..nul]).into_owned();
    let count_off = 11 + DIGEST_FIELD_LEN;
    let count = u16::from_le_bytes([body[count_off], body[count_off + 1]]) as usize;

    let mut entries = Vec::with_capacity(count);
    let mut pos = count_off + 2;
    for _ in 0..count {
        if pos + 2 > body.len() {
            return Err(Error::FileFormatMismatch);
        }
        let symbol = body[pos];
        let length = body[pos + 1];
        pos += 2;
        let width = code_width(length) as usize;
        if pos + width > body.len() {
            return Err(Error::FileFormatMismatch);
        }
        let mut code_bytes = [0u8; 8];
        code_bytes[..width].copy_from_slice(&body[pos..pos + width]);
        pos += width;
        entries.push(CodeEntry { symbol, length, code: u64::from_le_bytes(code_bytes) });
    }

    Ok((Header { original_size, digest_hex, entries }, body_end))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_round_trips() {
        let entries = vec![
            CodeEntry { symbol: b'a', length: 1, code: 0 },
            CodeEntry { symbol: b'b', length: 1, code: 1 },
        ];
        let digest = md5::compute(b"aaaaab");
        let mut out = Vec::new();
        write_header(&mut out, 6, &digest, &entries);
        out.extend_from_slice(DATA_MAGIC);

        let (header, data_offset) = read_header(&out).unwrap();
        assert_eq!(header.original_size, 6);
        assert_eq!(header.digest_hex, format!("{:x}", digest));
        assert_eq!(header.entries.len(), 2);
        assert_eq!(&out[data_offset..data_offset + 3], DATA_MAGIC);
    }

    #[test]
    fn header_length_matches_on_disk_span() {
        let entries = vec![CodeEntry { symbol: b'x', length: 9, code: 0x1FF }];
        let digest = md5::compute(b"x");
        let mut out = Vec::new();
        write_header(&mut out, 1, &digest, &entries);
        let declared = u16::from_le_bytes([out[3], out[4]]) as usize;
        // on-disk span between the length field and the data magic that follows
        assert_eq!(declared, out.len() - 5);
    }

    #[test]
    fn boundary_code_widths() {
        assert_eq!(code_width(8), 1);
        assert_eq!(code_width(9), 2);
        assert_eq!(code_width(16), 2);
        assert_eq!(code_width(17), 4);
        assert_eq!(code_width(32), 4);
        assert_eq!(code_width(33), 8);
        assert_eq!(code_width(64), 8);
    }

    #[test]
    fn rejects_bad_magic() {
        let bytes = b"XYZ\x00\x00".to_vec();
        assert!(matches!(read_header(&bytes), Err(Error::FileFormatMismatch)));
    }
}
