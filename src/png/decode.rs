//! PNG decoder implementation.
//!
//! Decodes the 8-bit, non-interlaced subset of PNG (grayscale, RGB, palette
//! and RGBA) into a uniform RGBA buffer.

use log::trace;

use super::chunk::ChunkReader;
use super::filter::unfilter_row;
use super::MAX_DIMENSION;
use crate::color::ColorType;
use crate::compress::zlib;
use crate::error::{Error, Result};

/// Maximum number of PLTE entries.
const MAX_PALETTE_LEN: usize = 256;

/// IHDR chunk fields, validated against the supported subset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageHeader {
    /// Image width in pixels.
    pub width: u32,
    /// Image height in pixels.
    pub height: u32,
    /// Bits per sample; always 8.
    pub bit_depth: u8,
    /// Color type.
    pub color_type: ColorType,
    /// Compression method; always 0.
    pub compression: u8,
    /// Filter method; always 0.
    pub filter_method: u8,
    /// Interlace method; always 0.
    pub interlace: u8,
}

impl ImageHeader {
    /// Parse and validate the 13-byte IHDR payload.
    pub fn parse(data: &[u8]) -> Result<Self> {
        if data.len() != 13 {
            return Err(Error::MalformedStream(format!(
                "invalid IHDR length: {}",
                data.len()
            )));
        }

        let width = u32::from_be_bytes([data[0], data[1], data[2], data[3]]);
        let height = u32::from_be_bytes([data[4], data[5], data[6], data[7]]);
        let bit_depth = data[8];
        let color_type = ColorType::try_from(data[9])?;
        let compression = data[10];
        let filter_method = data[11];
        let interlace = data[12];

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
        if bit_depth != 8 {
            return Err(Error::UnsupportedFormat(format!(
                "bit depth {bit_depth} (only 8 is supported)"
            )));
        }
        if compression != 0 {
            return Err(Error::UnsupportedFormat(format!(
                "compression method {compression}"
            )));
        }
        if filter_method != 0 {
            return Err(Error::UnsupportedFormat(format!(
                "filter method {filter_method}"
            )));
        }
        if interlace != 0 {
            return Err(Error::UnsupportedFormat(
                "Adam7 interlaced images not supported".into(),
            ));
        }

        Ok(Self {
            width,
            height,
            bit_depth,
            color_type,
            compression,
            filter_method,
            interlace,
        })
    }

    /// Bytes per scanline, excluding the filter byte.
    pub fn row_bytes(&self) -> usize {
        self.width as usize * self.color_type.channels()
    }

    /// Size of the decompressed IDAT stream: one filter byte plus a row per line.
    fn filtered_size(&self) -> Result<usize> {
        (self.row_bytes() + 1)
            .checked_mul(self.height as usize)
            .ok_or_else(|| Error::UnsupportedFormat("image size overflow".into()))
    }
}

/// Decoded PNG image, always RGBA.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedImage {
    /// Header of the source stream.
    pub header: ImageHeader,
    /// RGBA pixels, `width * height * 4` bytes, row-major.
    pub pixels: Vec<u8>,
}

impl DecodedImage {
    /// Image width in pixels.
    pub fn width(&self) -> u32 {
        self.header.width
    }

    /// Image height in pixels.
    pub fn height(&self) -> u32 {
        self.header.height
    }
}

/// Decode a PNG image from bytes into RGBA.
pub fn decode(data: &[u8]) -> Result<DecodedImage> {
    let mut chunks = ChunkReader::new(data)?;

    let header = match chunks.next() {
        Some(Ok(chunk)) if &chunk.kind == b"IHDR" => ImageHeader::parse(chunk.data)?,
        Some(Err(e)) => return Err(e),
        Some(Ok(_)) | None => return Err(Error::MissingHeader),
    };
    trace!("IHDR {:?}", header);

    let mut palette: Option<Vec<[u8; 3]>> = None;
    let mut trns: Option<&[u8]> = None;
    let mut idat = Vec::new();
    let mut seen_iend = false;

    for chunk in chunks {
        let chunk = chunk?;
        match &chunk.kind {
            b"IHDR" => return Err(Error::MalformedStream("duplicate IHDR chunk".into())),
            b"PLTE" => {
                if palette.is_some() {
                    return Err(Error::MalformedStream("duplicate PLTE chunk".into()));
                }
                palette = Some(parse_palette(chunk.data)?);
            }
            b"tRNS" => {
                if trns.is_some() {
                    return Err(Error::MalformedStream("duplicate tRNS chunk".into()));
                }
                trns = Some(chunk.data);
            }
            b"IDAT" => idat.extend_from_slice(chunk.data),
            b"IEND" => seen_iend = true,
            _ => {
                // Ancillary chunks carry nothing the RGBA output needs.
            }
        }
    }

    if !seen_iend {
        return Err(Error::Truncated);
    }
    if header.color_type == ColorType::Indexed && palette.is_none() {
        return Err(Error::UnsupportedFormat(
            "indexed image without PLTE chunk".into(),
        ));
    }

    let expected_size = header.filtered_size()?;
    let decompressed = zlib::decompress(&idat, Some(expected_size))?;
    if decompressed.len() < expected_size {
        return Err(Error::CorruptData(format!(
            "decompressed data too short: {} < {}",
            decompressed.len(),
            expected_size
        )));
    }

    let pixels = reconstruct_image(
        &header,
        &decompressed[..expected_size],
        palette.as_deref(),
        trns.unwrap_or(&[]),
    )?;

    Ok(DecodedImage { header, pixels })
}

/// Split a PLTE payload into RGB triples.
fn parse_palette(data: &[u8]) -> Result<Vec<[u8; 3]>> {
    if data.is_empty() || data.len() % 3 != 0 || data.len() / 3 > MAX_PALETTE_LEN {
        return Err(Error::MalformedStream(format!(
            "invalid PLTE length: {}",
            data.len()
        )));
    }
    Ok(data
        .chunks_exact(3)
        .map(|rgb| [rgb[0], rgb[1], rgb[2]])
        .collect())
}

/// Unfilter every scanline and expand it to RGBA.
fn reconstruct_image(
    header: &ImageHeader,
    data: &[u8],
    palette: Option<&[[u8; 3]]>,
    trns: &[u8],
) -> Result<Vec<u8>> {
    let row_bytes = header.row_bytes();
    let bpp = header.color_type.channels();

    let mut current_row = vec![0u8; row_bytes];
    let mut prev_row = vec![0u8; row_bytes];
    let mut pixels = Vec::with_capacity(header.width as usize * header.height as usize * 4);

    for line in data.chunks_exact(row_bytes + 1) {
        current_row.copy_from_slice(&line[1..]);
        unfilter_row(line[0], &mut current_row, &prev_row, bpp)?;
        expand_row(header.color_type, &current_row, palette, trns, &mut pixels)?;
        std::mem::swap(&mut current_row, &mut prev_row);
    }

    Ok(pixels)
}

/// Append one reconstructed scanline to `out` as RGBA.
fn expand_row(
    color_type: ColorType,
    row: &[u8],
    palette: Option<&[[u8; 3]]>,
    trns: &[u8],
    out: &mut Vec<u8>,
) -> Result<()> {
    match color_type {
        ColorType::Rgba => out.extend_from_slice(row),
        ColorType::Rgb => {
            for px in row.chunks_exact(3) {
                out.extend_from_slice(&[px[0], px[1], px[2], 255]);
            }
        }
        ColorType::Gray => {
            for &v in row {
                out.extend_from_slice(&[v, v, v, 255]);
            }
        }
        ColorType::Indexed => {
            let palette =
                palette.ok_or_else(|| Error::UnsupportedFormat("missing PLTE chunk".into()))?;
            for &idx in row {
                let [r, g, b] = *palette.get(idx as usize).ok_or_else(|| {
                    Error::CorruptData(format!(
                        "palette index {idx} out of range ({} entries)",
                        palette.len()
                    ))
                })?;
                let a = trns.get(idx as usize).copied().unwrap_or(255);
                out.extend_from_slice(&[r, g, b, a]);
            }
        }
    }
    Ok(())
}
