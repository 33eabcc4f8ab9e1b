//! HPACK header-field encoding (RFC 7541 Section 6).
//!
//! Encoding is stateless: every routine writes one complete instruction
//! into a caller buffer and returns the octet count, or
//! [`EncoderError::BufferTooSmall`] when it does not fit (the caller
//! retries with more room; partial output is never meaningful). Nothing
//! here touches a dynamic table, so two sides can encode concurrently and
//! an encoder cannot desynchronize a peer.
//!
//! String literals are emitted raw (H bit clear). The `_vec` variants
//! allocate instead of taking a buffer, for callers that prefer `Vec<u8>`.

use crate::error::EncoderError;
use crate::integer;
use crate::table::status_index;

const INDEXED: u8 = 0x80;
const LITERAL_WITH_INDEXING: u8 = 0x40;
const SIZE_UPDATE: u8 = 0x20;
const NEVER_INDEXED: u8 = 0x10;
const WITHOUT_INDEXING: u8 = 0x00;

/// Indexed header field (Section 6.1): a single static or dynamic index.
pub fn encode_indexed(index: u32, dst: &mut [u8]) -> Result<usize, EncoderError> {
    integer::encode(index, 7, INDEXED, dst).ok_or(EncoderError::BufferTooSmall)
}

/// Literal with incremental indexing, name by index (Section 6.2.1).
pub fn encode_literal_with_indexing(
    name_index: u32,
    value: &[u8],
    dst: &mut [u8],
) -> Result<usize, EncoderError> {
    encode_literal(LITERAL_WITH_INDEXING, 6, name_index, value, dst)
}

/// Literal with incremental indexing, literal name (Section 6.2.1).
pub fn encode_literal_with_indexing_new_name(
    name: &[u8],
    value: &[u8],
    dst: &mut [u8],
) -> Result<usize, EncoderError> {
    encode_literal_new_name(LITERAL_WITH_INDEXING, name, value, dst)
}

/// Literal without indexing, name by index (Section 6.2.2).
pub fn encode_literal_without_indexing(
    name_index: u32,
    value: &[u8],
    dst: &mut [u8],
) -> Result<usize, EncoderError> {
    encode_literal(WITHOUT_INDEXING, 4, name_index, value, dst)
}

/// Literal without indexing, literal name (Section 6.2.2).
pub fn encode_literal_without_indexing_new_name(
    name: &[u8],
    value: &[u8],
    dst: &mut [u8],
) -> Result<usize, EncoderError> {
    encode_literal_new_name(WITHOUT_INDEXING, name, value, dst)
}

/// Literal never indexed, name by index (Section 6.2.3). Marks the value
/// as sensitive: intermediaries must forward it never-indexed too.
pub fn encode_literal_never_indexed(
    name_index: u32,
    value: &[u8],
    dst: &mut [u8],
) -> Result<usize, EncoderError> {
    encode_literal(NEVER_INDEXED, 4, name_index, value, dst)
}

/// Literal never indexed, literal name (Section 6.2.3).
pub fn encode_literal_never_indexed_new_name(
    name: &[u8],
    value: &[u8],
    dst: &mut [u8],
) -> Result<usize, EncoderError> {
    encode_literal_new_name(NEVER_INDEXED, name, value, dst)
}

/// Literal without indexing with the value assembled from parts joined by
/// `separator`, emitted after a single length prefix. Avoids
/// concatenating multi-value headers (cookie reassembly, vary lists)
/// before encoding.
pub fn encode_literal_without_indexing_multi_value(
    name_index: u32,
    values: &[&[u8]],
    separator: &[u8],
    dst: &mut [u8],
) -> Result<usize, EncoderError> {
    let mut n = integer::encode(name_index, 4, WITHOUT_INDEXING, dst)
        .ok_or(EncoderError::BufferTooSmall)?;

    let total: usize = values.iter().map(|v| v.len()).sum::<usize>()
        + separator.len() * values.len().saturating_sub(1);
    n += integer::encode(total as u32, 7, 0, &mut dst[n..]).ok_or(EncoderError::BufferTooSmall)?;

    if dst.len() - n < total {
        return Err(EncoderError::BufferTooSmall);
    }
    for (i, value) in values.iter().enumerate() {
        if i > 0 {
            dst[n..n + separator.len()].copy_from_slice(separator);
            n += separator.len();
        }
        dst[n..n + value.len()].copy_from_slice(value);
        n += value.len();
    }
    Ok(n)
}

/// `:status` response header: a one-octet indexed field for the codes the
/// static table carries, a literal decimal value otherwise.
pub fn encode_status(status: u16, dst: &mut [u8]) -> Result<usize, EncoderError> {
    if let Some(index) = status_index(status) {
        return encode_indexed(index, dst);
    }
    let mut digits = [0u8; 5];
    let mut pos = digits.len();
    let mut v = status;
    loop {
        pos -= 1;
        digits[pos] = b'0' + (v % 10) as u8;
        v /= 10;
        if v == 0 {
            break;
        }
    }
    // :status is static index 8.
    encode_literal(WITHOUT_INDEXING, 4, 8, &digits[pos..], dst)
}

/// Dynamic table size update (Section 6.3).
pub fn encode_dynamic_table_size_update(size: u32, dst: &mut [u8]) -> Result<usize, EncoderError> {
    integer::encode(size, 5, SIZE_UPDATE, dst).ok_or(EncoderError::BufferTooSmall)
}

// -- Allocating variants --

pub fn encode_indexed_vec(index: u32) -> Vec<u8> {
    encode_vec(|dst| encode_indexed(index, dst))
}

pub fn encode_literal_with_indexing_vec(name_index: u32, value: &[u8]) -> Vec<u8> {
    encode_vec(|dst| encode_literal_with_indexing(name_index, value, dst))
}

pub fn encode_literal_with_indexing_new_name_vec(name: &[u8], value: &[u8]) -> Vec<u8> {
    encode_vec(|dst| encode_literal_with_indexing_new_name(name, value, dst))
}

pub fn encode_literal_without_indexing_vec(name_index: u32, value: &[u8]) -> Vec<u8> {
    encode_vec(|dst| encode_literal_without_indexing(name_index, value, dst))
}

pub fn encode_literal_without_indexing_new_name_vec(name: &[u8], value: &[u8]) -> Vec<u8> {
    encode_vec(|dst| encode_literal_without_indexing_new_name(name, value, dst))
}

pub fn encode_literal_never_indexed_vec(name_index: u32, value: &[u8]) -> Vec<u8> {
    encode_vec(|dst| encode_literal_never_indexed(name_index, value, dst))
}

pub fn encode_literal_never_indexed_new_name_vec(name: &[u8], value: &[u8]) -> Vec<u8> {
    encode_vec(|dst| encode_literal_never_indexed_new_name(name, value, dst))
}

pub fn encode_status_vec(status: u16) -> Vec<u8> {
    encode_vec(|dst| encode_status(status, dst))
}

// -- Helpers --

fn encode_literal(
    pattern: u8,
    prefix_bits: u8,
    name_index: u32,
    value: &[u8],
    dst: &mut [u8],
) -> Result<usize, EncoderError> {
    debug_assert!(name_index != 0, "literal name index must reference a table entry");
    let mut n =
        integer::encode(name_index, prefix_bits, pattern, dst).ok_or(EncoderError::BufferTooSmall)?;
    n += encode_string_literal(value, &mut dst[n..])?;
    Ok(n)
}

fn encode_literal_new_name(
    pattern: u8,
    name: &[u8],
    value: &[u8],
    dst: &mut [u8],
) -> Result<usize, EncoderError> {
    if dst.is_empty() {
        return Err(EncoderError::BufferTooSmall);
    }
    // Name index 0: the name follows as a literal.
    dst[0] = pattern;
    let mut n = 1;
    n += encode_string_literal(name, &mut dst[n..])?;
    n += encode_string_literal(value, &mut dst[n..])?;
    Ok(n)
}

/// Raw string literal: 7-bit length prefix with the H bit clear, then the
/// octets verbatim.
fn encode_string_literal(value: &[u8], dst: &mut [u8]) -> Result<usize, EncoderError> {
    let n = integer::encode(value.len() as u32, 7, 0, dst).ok_or(EncoderError::BufferTooSmall)?;
    let end = n + value.len();
    if dst.len() < end {
        return Err(EncoderError::BufferTooSmall);
    }
    dst[n..end].copy_from_slice(value);
    Ok(end)
}

fn encode_vec(encode: impl Fn(&mut [u8]) -> Result<usize, EncoderError>) -> Vec<u8> {
    let mut buf = vec![0u8; 64];
    loop {
        match encode(&mut buf) {
            Ok(n) => {
                buf.truncate(n);
                return buf;
            }
            Err(EncoderError::BufferTooSmall) => {
                let doubled = buf.len() * 2;
                buf.resize(doubled, 0);
            }
        }
    }
}
