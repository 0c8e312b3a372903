//! Alpha compositing onto a solid background.
//!
//! # Example
//!
//! ```rust
//! use pngflat::color::Rgb;
//! use pngflat::composite::{flatten, FlattenConfig};
//!
//! // A fully transparent 1x1 pixel becomes the background color.
//! let out = flatten(&[0, 0, 0, 0], 1, 1, &FlattenConfig::new(Rgb::WHITE)).unwrap();
//! assert_eq!(out, vec![255, 255, 255, 255]);
//! ```

use crate::color::Rgb;
use crate::error::{Error, Result};
use crate::png::MAX_DIMENSION;

/// How to flatten an image.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlattenConfig {
    /// Solid color placed behind the image.
    pub background: Rgb,
    /// Size of the image relative to the canvas, in `(0, 1]`.
    /// Values outside that range (and NaN) mean 1.
    pub scale: f64,
    /// Center the shrunk image; otherwise it is anchored top-left.
    pub center: bool,
}

impl Default for FlattenConfig {
    fn default() -> Self {
        Self::new(Rgb::WHITE)
    }
}

impl FlattenConfig {
    /// Full-bleed composite over `background`.
    pub fn new(background: Rgb) -> Self {
        Self {
            background,
            scale: 1.0,
            center: true,
        }
    }

    /// Set the shrink factor.
    pub fn with_scale(mut self, scale: f64) -> Self {
        self.scale = scale;
        self
    }

    /// Set whether a shrunk image is centered.
    pub fn with_center(mut self, center: bool) -> Self {
        self.center = center;
        self
    }

    fn effective_scale(&self) -> f64 {
        if self.scale > 0.0 && self.scale < 1.0 {
            self.scale
        } else {
            1.0
        }
    }
}

/// Composite an RGBA buffer over the configured background.
///
/// Returns a new, fully opaque RGBA buffer of the same dimensions.
pub fn flatten(pixels: &[u8], width: u32, height: u32, config: &FlattenConfig) -> Result<Vec<u8>> {
    if width == 0 || height == 0 {
        return Err(Error::InvalidDimensions { width, height });
    }
    let w = width as usize;
    let h = height as usize;
    let expected = w
        .checked_mul(h)
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

    let bg = config.background.to_array();
    let mut out = [bg[0], bg[1], bg[2], 255].repeat(expected / 4);

    let scale = config.effective_scale();
    if scale >= 1.0 {
        for (dst, src) in out.chunks_exact_mut(4).zip(pixels.chunks_exact(4)) {
            dst.copy_from_slice(&blend(src, bg));
        }
        return Ok(out);
    }

    let scaled_w = (w as f64 * scale).floor() as usize;
    let scaled_h = (h as f64 * scale).floor() as usize;
    let (off_x, off_y) = if config.center {
        ((w - scaled_w) / 2, (h - scaled_h) / 2)
    } else {
        (0, 0)
    };

    // Nearest-neighbour sampling, coordinates relative to the scaled region.
    for dy in 0..scaled_h {
        let sy = ((dy as f64 / scale).floor() as usize).min(h - 1);
        for dx in 0..scaled_w {
            let sx = ((dx as f64 / scale).floor() as usize).min(w - 1);
            let src = (sy * w + sx) * 4;
            let dst = ((off_y + dy) * w + off_x + dx) * 4;
            out[dst..dst + 4].copy_from_slice(&blend(&pixels[src..src + 4], bg));
        }
    }

    Ok(out)
}

/// Source-over blend of one RGBA pixel onto an opaque background.
#[inline]
fn blend(src: &[u8], bg: [u8; 3]) -> [u8; 4] {
    let alpha = src[3] as f64 / 255.0;
    let mix = |s: u8, b: u8| (s as f64 * alpha + b as f64 * (1.0 - alpha)).round() as u8;
    [
        mix(src[0], bg[0]),
        mix(src[1], bg[1]),
        mix(src[2], bg[2]),
        255,
    ]
}
