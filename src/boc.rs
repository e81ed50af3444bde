//! Decoding of serialized native objects (bag-of-cells blobs).
//!
//! A BOC blob arrives base64 or hex encoded. Decoding parses the standard
//! bag-of-cells header (magic `b5ee9c72`, ref/offset widths, cell and root
//! counts) and returns a structural summary; the gateway does not interpret
//! cell contents.

use crate::error::{GatewayError, Result};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde::Serialize;
use sha2::{Digest, Sha256};

/// Serialized bag-of-cells magic prefix.
const BOC_MAGIC: [u8; 4] = [0xb5, 0xee, 0x9c, 0x72];

/// Structured view over a decoded native object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NativeObject {
    pub cell_count: u64,
    pub root_count: u64,
    /// Total serialized size of the cell data section in bytes.
    pub data_size: u64,
    /// SHA-256 of the raw blob, hex encoded. Identifies the object.
    pub root_hash: String,
    /// Length of the raw blob in bytes.
    pub byte_len: usize,
}

/// Decode a textual blob into raw bytes: base64 first, hex as a fallback.
fn decode_blob(blob: &str) -> Result<Vec<u8>> {
    let trimmed = blob.trim();
    if trimmed.is_empty() {
        return Err(GatewayError::DecodeError("Blob is empty".to_string()));
    }
    if let Ok(bytes) = BASE64.decode(trimmed) {
        return Ok(bytes);
    }
    hex::decode(trimmed)
        .map_err(|_| GatewayError::DecodeError("Blob is neither valid base64 nor hex".to_string()))
}

/// Big-endian read of `width` bytes at `pos`, advancing the cursor.
fn read_uint(bytes: &[u8], pos: &mut usize, width: usize) -> Result<u64> {
    if *pos + width > bytes.len() {
        return Err(GatewayError::DecodeError(
            "Truncated bag-of-cells header".to_string(),
        ));
    }
    let mut value: u64 = 0;
    for &b in &bytes[*pos..*pos + width] {
        value = (value << 8) | u64::from(b);
    }
    *pos += width;
    Ok(value)
}

/// Decode a serialized native object blob into a [`NativeObject`].
pub fn decode(blob: &str) -> Result<NativeObject> {
    let bytes = decode_blob(blob)?;

    if bytes.len() < 6 || bytes[..4] != BOC_MAGIC {
        return Err(GatewayError::DecodeError(
            "Missing bag-of-cells magic prefix".to_string(),
        ));
    }

    let mut pos = 4;
    let descriptor = bytes[pos];
    pos += 1;
    let has_index = descriptor & 0b1000_0000 != 0;
    let has_crc = descriptor & 0b0100_0000 != 0;
    let ref_size = usize::from(descriptor & 0b0000_0111);
    if !(1..=4).contains(&ref_size) {
        return Err(GatewayError::DecodeError(format!(
            "Invalid reference width {}",
            ref_size
        )));
    }

    let offset_size = usize::from(bytes[pos]);
    pos += 1;
    if !(1..=8).contains(&offset_size) {
        return Err(GatewayError::DecodeError(format!(
            "Invalid offset width {}",
            offset_size
        )));
    }

    let cell_count = read_uint(&bytes, &mut pos, ref_size)?;
    let root_count = read_uint(&bytes, &mut pos, ref_size)?;
    let absent_count = read_uint(&bytes, &mut pos, ref_size)?;
    let data_size = read_uint(&bytes, &mut pos, offset_size)?;

    if root_count == 0 || root_count > cell_count {
        return Err(GatewayError::DecodeError(format!(
            "Inconsistent counts: {} roots over {} cells",
            root_count, cell_count
        )));
    }
    if absent_count != 0 {
        return Err(GatewayError::DecodeError(
            "Absent cells are not supported".to_string(),
        ));
    }

    // Remaining sections: root list, optional per-cell index, cell data,
    // optional checksum. Only their combined length is validated; a crafted
    // header can declare sizes that overflow, which is malformed too.
    let index_size = if has_index {
        cell_count.checked_mul(offset_size as u64)
    } else {
        Some(0)
    };
    let expected = root_count
        .checked_mul(ref_size as u64)
        .and_then(|v| index_size.and_then(|i| v.checked_add(i)))
        .and_then(|v| v.checked_add(data_size))
        .and_then(|v| v.checked_add(if has_crc { 4 } else { 0 }));
    let remaining = (bytes.len() - pos) as u64;
    match expected {
        Some(expected) if expected <= remaining => {}
        Some(expected) => {
            return Err(GatewayError::DecodeError(format!(
                "Blob truncated: expected {} more bytes, found {}",
                expected, remaining
            )));
        }
        None => {
            return Err(GatewayError::DecodeError(
                "Declared section sizes overflow".to_string(),
            ));
        }
    }

    Ok(NativeObject {
        cell_count,
        root_count,
        data_size,
        root_hash: hex::encode(Sha256::digest(&bytes)),
        byte_len: bytes.len(),
    })
}
