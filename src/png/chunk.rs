//! PNG chunk handling.
//!
//! Every chunk is framed as `length(4, BE) || type(4) || data || crc(4, BE)`.
//! Reading trusts the length field and does not verify the CRC footer; PNGs
//! from untrusted sources should be checked elsewhere if that matters.

use log::trace;

use super::PNG_SIGNATURE;
use crate::compress::crc32::Crc32;
use crate::error::{Error, Result};

/// Length, type and CRC fields around each chunk's data.
const CHUNK_OVERHEAD: usize = 12;

/// A single chunk borrowed from a PNG byte stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Chunk<'a> {
    /// Four-byte ASCII chunk type, e.g. `*b"IHDR"`.
    pub kind: [u8; 4],
    /// Chunk payload.
    pub data: &'a [u8],
    /// Length as stored in the stream; always equals `data.len()`.
    pub declared_length: u32,
}

impl Chunk<'_> {
    /// Chunk type as text, lossy for non-ASCII tags.
    pub fn kind_str(&self) -> std::borrow::Cow<'_, str> {
        String::from_utf8_lossy(&self.kind)
    }
}

/// Lazy iterator over the chunks of a PNG stream.
///
/// Yields chunks in stream order up to and including IEND, then stops. A
/// framing error is yielded once and ends iteration. Cloning the reader (or
/// calling [`ChunkReader::rewind`]) restarts from the current or first chunk.
#[derive(Debug, Clone)]
pub struct ChunkReader<'a> {
    data: &'a [u8],
    pos: usize,
    done: bool,
}

impl<'a> ChunkReader<'a> {
    /// Validate the signature and position the reader at the first chunk.
    pub fn new(data: &'a [u8]) -> Result<Self> {
        if data.len() < PNG_SIGNATURE.len() {
            return Err(Error::MalformedStream(format!(
                "{} bytes is shorter than the PNG signature",
                data.len()
            )));
        }
        if data[..8] != PNG_SIGNATURE {
            return Err(Error::MalformedStream("PNG signature mismatch".into()));
        }
        Ok(Self {
            data,
            pos: PNG_SIGNATURE.len(),
            done: false,
        })
    }

    /// Restart iteration from the first chunk.
    pub fn rewind(&mut self) {
        self.pos = PNG_SIGNATURE.len();
        self.done = false;
    }

    fn read_chunk(&mut self) -> Result<Chunk<'a>> {
        let remaining = self.data.len() - self.pos;
        if remaining < CHUNK_OVERHEAD {
            return Err(Error::Truncated);
        }

        let pos = self.pos;
        let declared_length = u32::from_be_bytes([
            self.data[pos],
            self.data[pos + 1],
            self.data[pos + 2],
            self.data[pos + 3],
        ]);
        let kind = [
            self.data[pos + 4],
            self.data[pos + 5],
            self.data[pos + 6],
            self.data[pos + 7],
        ];

        let length = declared_length as usize;
        let data_start = pos + 8;
        let end = length
            .checked_add(CHUNK_OVERHEAD)
            .filter(|&total| total <= remaining)
            .map(|total| pos + total)
            .ok_or_else(|| {
                Error::MalformedStream(format!(
                    "{} chunk length {} runs past end of stream",
                    String::from_utf8_lossy(&kind),
                    declared_length
                ))
            })?;

        self.pos = end;
        Ok(Chunk {
            kind,
            data: &self.data[data_start..data_start + length],
            declared_length,
        })
    }
}

impl<'a> Iterator for ChunkReader<'a> {
    type Item = Result<Chunk<'a>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.read_chunk() {
            Ok(chunk) => {
                trace!("chunk {} ({} bytes)", chunk.kind_str(), chunk.data.len());
                if &chunk.kind == b"IEND" {
                    self.done = true;
                }
                Some(Ok(chunk))
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}

impl std::iter::FusedIterator for ChunkReader<'_> {}

/// Write a PNG chunk (length, type, data, CRC32) to the output buffer.
pub fn write_chunk(output: &mut Vec<u8>, chunk_type: &[u8; 4], data: &[u8]) {
    output.reserve(CHUNK_OVERHEAD + data.len());

    let mut crc = Crc32::new();
    crc.update(chunk_type);
    crc.update(data);
    let crc = crc.finalize();

    output.extend_from_slice(&(data.len() as u32).to_be_bytes());
    output.extend_from_slice(chunk_type);
    output.extend_from_slice(data);
    output.extend_from_slice(&crc.to_be_bytes());
}
