//! PNG encoder implementation.
//!
//! Always writes 8-bit RGBA with filter type None on every scanline, as a
//! signature, IHDR, a single IDAT and IEND.

use super::chunk::write_chunk;
use super::filter::FILTER_NONE;
use super::{MAX_DIMENSION, PNG_SIGNATURE};
use crate::color::ColorType;
use crate::compress::zlib;
use crate::error::{Error, Result};

/// PNG encoding options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PngOptions {
    /// zlib compression level (1-9, default 6).
    pub compression_level: u8,
}

impl Default for PngOptions {
    fn default() -> Self {
        Self {
            compression_level: 6,
        }
    }
}

impl PngOptions {
    /// Speed-focused preset.
    pub fn fast() -> Self {
        Self {
            compression_level: 1,
        }
    }

    /// Balanced preset (matches the default).
    pub fn balanced() -> Self {
        Self::default()
    }

    /// Highest compression preset; slowest.
    pub fn max_compression() -> Self {
        Self {
            compression_level: 9,
        }
    }
}

/// Encode RGBA pixels as PNG with default options.
pub fn encode(pixels: &[u8], width: u32, height: u32) -> Result<Vec<u8>> {
    encode_with_options(pixels, width, height, &PngOptions::default())
}

/// Encode RGBA pixels as PNG with custom options.
pub fn encode_with_options(
    pixels: &[u8],
    width: u32,
    height: u32,
    options: &PngOptions,
) -> Result<Vec<u8>> {
    let mut output = Vec::new();
    encode_into(&mut output, pixels, width, height, options)?;
    Ok(output)
}

/// Encode RGBA pixels as PNG into a caller-provided buffer.
///
/// The `output` buffer will be cleared before writing. This API allows callers
/// to reuse an allocation across multiple encodes.
pub fn encode_into(
    output: &mut Vec<u8>,
    pixels: &[u8],
    width: u32,
    height: u32,
    options: &PngOptions,
) -> Result<()> {
    validate(pixels, width, height, options)?;

    let row_bytes = width as usize * 4;
    let mut scanlines = Vec::with_capacity((row_bytes + 1) * height as usize);
    for row in pixels.chunks_exact(row_bytes) {
        scanlines.push(FILTER_NONE);
        scanlines.extend_from_slice(row);
    }
    let compressed = zlib::compress(&scanlines, options.compression_level)?;

    output.clear();
    output.reserve(PNG_SIGNATURE.len() + 25 + 12 + compressed.len() + 12);
    output.extend_from_slice(&PNG_SIGNATURE);
    write_ihdr(output, width, height);
    write_chunk(output, b"IDAT", &compressed);
    write_chunk(output, b"IEND", &[]);
    Ok(())
}

/// Write IHDR (image header) chunk.
fn write_ihdr(output: &mut Vec<u8>, width: u32, height: u32) {
    let mut ihdr_data = Vec::with_capacity(13);
    ihdr_data.extend_from_slice(&width.to_be_bytes());
    ihdr_data.extend_from_slice(&height.to_be_bytes());
    ihdr_data.push(8); // bit depth
    ihdr_data.push(ColorType::Rgba.png_color_type());
    ihdr_data.push(0); // compression: DEFLATE
    ihdr_data.push(0); // filter method: adaptive (we only use None)
    ihdr_data.push(0); // interlace: none
    write_chunk(output, b"IHDR", &ihdr_data);
}

fn validate(pixels: &[u8], width: u32, height: u32, options: &PngOptions) -> Result<()> {
    if !(1..=9).contains(&options.compression_level) {
        return Err(Error::InvalidCompressionLevel(options.compression_level));
    }
    if width == 0 || height == 0 {
        return Err(Error::InvalidDimensions { width, height });
    }
    if width > MAX_DIMENSION || height > MAX_DIMENSION {
        return Err(Error::ImageTooLarge {
            width,
            height,
            max: MAX_DIMENSION,
        });
    }

    let expected = (width as usize)
        .checked_mul(height as usize)
        .and_then(|n| n.checked_mul(4))
        .ok_or(Error::ImageTooLarge {
            width,
            height,
            max: MAX_DIMENSION,
        })?;
    if pixels.len() != expected {
        return Err(Error::InvalidDataLength {
            expected,
            actual: pixels.len(),
        });
    }
    Ok(())
}
