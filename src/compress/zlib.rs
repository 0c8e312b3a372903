//! zlib stream wrappers for IDAT payloads.
//!
//! PNG stores image data as a single zlib stream (2-byte header, DEFLATE
//! body, Adler-32 trailer) split across IDAT chunks. Both directions are
//! delegated to `flate2`.

use std::io::{Read, Write};

use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;
use flate2::Compression;

use crate::error::{Error, Result};

/// Upper bound on the up-front allocation taken from a size hint.
const MAX_PREALLOC: usize = 64 * 1024 * 1024;

/// Compress `data` into a zlib stream at `level` (1-9).
pub fn compress(data: &[u8], level: u8) -> Result<Vec<u8>> {
    let mut encoder = ZlibEncoder::new(
        Vec::with_capacity(data.len() / 2 + 64),
        Compression::new(u32::from(level)),
    );
    encoder
        .write_all(data)
        .map_err(|e| Error::EncodeFailure(e.to_string()))?;
    encoder
        .finish()
        .map_err(|e| Error::EncodeFailure(e.to_string()))
}

/// Decompress a zlib stream.
///
/// With a `limit`, inflation stops once that many bytes have been produced;
/// anything the stream holds beyond it is never materialized.
pub fn decompress(data: &[u8], limit: Option<usize>) -> Result<Vec<u8>> {
    let capacity = limit.unwrap_or(data.len() * 4).min(MAX_PREALLOC);
    let mut out = Vec::with_capacity(capacity);
    ZlibDecoder::new(data)
        .take(limit.map_or(u64::MAX, |n| n as u64))
        .read_to_end(&mut out)
        .map_err(|e| Error::CorruptData(format!("inflate failed: {e}")))?;
    Ok(out)
}
