//! Checksums and compression used by the PNG codec.

pub mod crc32;
pub mod zlib;

pub use crc32::crc32;
