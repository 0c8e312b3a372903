//! PNG codec.
//!
//! Implements the subset of PNG (RFC 2083) needed to flatten icons: 8-bit,
//! non-interlaced grayscale, RGB, palette and RGBA on the way in, 8-bit RGBA
//! on the way out.

pub mod chunk;
pub mod decode;
pub mod encode;
pub mod filter;

pub use chunk::{Chunk, ChunkReader};
pub use decode::{decode, DecodedImage, ImageHeader};
pub use encode::{encode, encode_into, encode_with_options, PngOptions};

/// PNG file signature (magic bytes).
pub const PNG_SIGNATURE: [u8; 8] = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];

/// Maximum supported image dimension.
pub(crate) const MAX_DIMENSION: u32 = 1 << 24; // 16 million pixels

/// Returns true if `data` starts with the PNG signature.
pub fn has_signature(data: &[u8]) -> bool {
    data.starts_with(&PNG_SIGNATURE)
}
