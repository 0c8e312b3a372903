//! Synthetic test image generation.
//!
//! Generates deterministic RGBA patterns for controlled testing of the
//! decoder, analyzer and compositor. All functions produce reproducible
//! output suitable for regression testing.

#![allow(dead_code)]

use rand::{rngs::StdRng, Rng, SeedableRng};

/// Generate a solid color RGBA image.
pub fn solid_color_rgba(width: u32, height: u32, r: u8, g: u8, b: u8, a: u8) -> Vec<u8> {
    [r, g, b, a].repeat((width * height) as usize)
}

/// Generate an RGBA gradient (red horizontal, green vertical, alpha diagonal).
pub fn gradient_rgba(width: u32, height: u32) -> Vec<u8> {
    let mut pixels = Vec::with_capacity((width * height * 4) as usize);
    for y in 0..height {
        for x in 0..width {
            let r = ((x * 255) / width.max(1)) as u8;
            let g = ((y * 255) / height.max(1)) as u8;
            let a = (((x + y) * 255) / (width + height).max(1)) as u8;
            pixels.extend_from_slice(&[r, g, 64, a]);
        }
    }
    pixels
}

/// Opaque `color` cells alternating with fully transparent cells.
pub fn checkerboard_alpha(width: u32, height: u32, cell_size: u32, color: [u8; 3]) -> Vec<u8> {
    let mut pixels = Vec::with_capacity((width * height * 4) as usize);
    let cell_size = cell_size.max(1);
    for y in 0..height {
        for x in 0..width {
            let opaque = ((x / cell_size) + (y / cell_size)) % 2 == 0;
            let a = if opaque { 255 } else { 0 };
            pixels.extend_from_slice(&[color[0], color[1], color[2], a]);
        }
    }
    pixels
}

/// A centered opaque square of `color` on a transparent canvas, the typical
/// shape of a favicon with padding.
pub fn icon_on_transparent(size: u32, inset: u32, color: [u8; 3]) -> Vec<u8> {
    let mut pixels = Vec::with_capacity((size * size * 4) as usize);
    for y in 0..size {
        for x in 0..size {
            let inside = x >= inset && y >= inset && x < size - inset && y < size - inset;
            if inside {
                pixels.extend_from_slice(&[color[0], color[1], color[2], 255]);
            } else {
                pixels.extend_from_slice(&[0, 0, 0, 0]);
            }
        }
    }
    pixels
}

/// Seeded random RGBA noise.
pub fn random_rgba(width: u32, height: u32, seed: u64) -> Vec<u8> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..width * height * 4).map(|_| rng.gen()).collect()
}

/// Seeded random noise with `channels` samples per pixel.
pub fn random_samples(width: u32, height: u32, channels: u32, seed: u64) -> Vec<u8> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..width * height * channels).map(|_| rng.gen()).collect()
}
