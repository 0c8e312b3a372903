//! # pngflat
//!
//! A minimal PNG codec and a transparency-driven background flattener.
//!
//! Icons fetched from third-party services are often mostly transparent and
//! disappear against the page behind them. This crate decodes a PNG, measures
//! how much of it is transparent and how bright the rest is, and, past a
//! threshold, composites it onto a contrasting solid background and
//! re-encodes it.
//!
//! ## Features
//!
//! - **Decoding** of 8-bit, non-interlaced grayscale, RGB, palette and RGBA PNG
//! - **Encoding** of 8-bit RGBA PNG
//! - **Best-effort pipeline**: any input that is not a PNG, fails to decode,
//!   or fails to re-encode is returned unchanged
//!
//! ## Example
//!
//! ```rust
//! use pngflat::png;
//!
//! // A 1x1 fully transparent pixel.
//! let input = png::encode(&[0, 0, 0, 0], 1, 1).unwrap();
//!
//! let (output, media_type) = pngflat::process(&input, "image/png");
//! assert_eq!(media_type, "image/png");
//!
//! let flat = png::decode(&output).unwrap();
//! assert_eq!(flat.pixels[3], 255);
//!
//! // Anything else passes through untouched.
//! let (jpeg, media_type) = pngflat::process(b"\xFF\xD8\xFF", "image/jpeg");
//! assert_eq!(jpeg, b"\xFF\xD8\xFF");
//! assert_eq!(media_type, "image/jpeg");
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod analyze;
pub mod color;
pub mod composite;
pub mod compress;
pub mod error;
pub mod pipeline;
pub mod png;

pub use analyze::{analyze, Analysis};
pub use color::{ColorType, Rgb};
pub use composite::{flatten, FlattenConfig};
pub use error::{Error, Result};
pub use pipeline::{process, FlattenPolicy, Outcome, PassReason, Pipeline, Processed};
