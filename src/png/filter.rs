//! PNG scanline filter reconstruction.
//!
//! Filters operate on bytes, not pixels: the "left" neighbour of a byte is
//! the byte one pixel earlier at the same channel offset, `bpp` bytes back.

use crate::error::{Error, Result};

/// Filter type bytes as defined by PNG specification.
pub const FILTER_NONE: u8 = 0;
/// Sub: predict from the byte to the left.
pub const FILTER_SUB: u8 = 1;
/// Up: predict from the byte above.
pub const FILTER_UP: u8 = 2;
/// Average: predict from the floor-mean of left and above.
pub const FILTER_AVERAGE: u8 = 3;
/// Paeth: predict with [`paeth_predictor`].
pub const FILTER_PAETH: u8 = 4;

/// Reconstruct a row in place by reversing its filter.
///
/// `prev` is the already reconstructed previous row (all zeros for the first
/// row) and must be the same length as `row`.
pub fn unfilter_row(filter: u8, row: &mut [u8], prev: &[u8], bpp: usize) -> Result<()> {
    debug_assert_eq!(row.len(), prev.len());

    match filter {
        FILTER_NONE => {}
        FILTER_SUB => {
            for i in bpp..row.len() {
                row[i] = row[i].wrapping_add(row[i - bpp]);
            }
        }
        FILTER_UP => {
            for (byte, &above) in row.iter_mut().zip(prev) {
                *byte = byte.wrapping_add(above);
            }
        }
        FILTER_AVERAGE => {
            for i in 0..row.len() {
                let left = if i >= bpp { row[i - bpp] as u16 } else { 0 };
                let above = prev[i] as u16;
                row[i] = row[i].wrapping_add(((left + above) / 2) as u8);
            }
        }
        FILTER_PAETH => {
            for i in 0..row.len() {
                let (a, c) = if i >= bpp {
                    (row[i - bpp], prev[i - bpp])
                } else {
                    (0, 0)
                };
                row[i] = row[i].wrapping_add(paeth_predictor(a, prev[i], c));
            }
        }
        _ => {
            return Err(Error::CorruptData(format!(
                "invalid filter type: {filter}"
            )))
        }
    }
    Ok(())
}

/// Paeth predictor: whichever of left (`a`), above (`b`) or upper-left (`c`)
/// is closest to `a + b - c`, ties resolved in that order.
#[inline]
pub fn paeth_predictor(a: u8, b: u8, c: u8) -> u8 {
    let p = a as i16 + b as i16 - c as i16;
    let pa = (p - a as i16).abs();
    let pb = (p - b as i16).abs();
    let pc = (p - c as i16).abs();

    if pa <= pb && pa <= pc {
        a
    } else if pb <= pc {
        b
    } else {
        c
    }
}
