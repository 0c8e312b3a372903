//! Transparency and brightness analysis of RGBA buffers.

/// Pixels with alpha below this count as transparent.
pub const TRANSPARENT_ALPHA_CUTOFF: u8 = 128;

/// Result of a full pass over an RGBA buffer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Analysis {
    /// Fraction of pixels with alpha below [`TRANSPARENT_ALPHA_CUTOFF`], in `[0, 1]`.
    pub transparent_ratio: f64,
    /// Mean luminance of the remaining pixels, in `[0, 255]`.
    /// 255 when every pixel is transparent.
    pub avg_luma: f64,
}

/// Relative luminance (BT.709 weights) of an RGB triple.
#[inline]
pub fn luma(r: u8, g: u8, b: u8) -> f64 {
    0.2126 * r as f64 + 0.7152 * g as f64 + 0.0722 * b as f64
}

/// Scan every pixel of an RGBA buffer once.
///
/// Trailing bytes that do not form a whole pixel are ignored. An empty
/// buffer reports a ratio of 0.
pub fn analyze(pixels: &[u8]) -> Analysis {
    let mut total = 0usize;
    let mut transparent = 0usize;
    let mut opaque = 0usize;
    let mut luma_sum = 0.0f64;

    for px in pixels.chunks_exact(4) {
        total += 1;
        if px[3] < TRANSPARENT_ALPHA_CUTOFF {
            transparent += 1;
        } else {
            opaque += 1;
            luma_sum += luma(px[0], px[1], px[2]);
        }
    }

    let transparent_ratio = if total == 0 {
        0.0
    } else {
        transparent as f64 / total as f64
    };
    let avg_luma = if opaque == 0 {
        255.0
    } else {
        (luma_sum / opaque as f64).clamp(0.0, 255.0)
    };

    Analysis {
        transparent_ratio,
        avg_luma,
    }
}
