//! Error types for the pngflat library.

use thiserror::Error;

/// Result type alias for pngflat operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while decoding or encoding a PNG.
///
/// The pipeline never surfaces these to its caller; they are reported as the
/// reason an input was passed through untouched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// Signature or chunk framing violation.
    #[error("malformed PNG stream: {0}")]
    MalformedStream(String),
    /// The first chunk is not IHDR.
    #[error("missing IHDR chunk")]
    MissingHeader,
    /// The stream ended before an IEND chunk.
    #[error("PNG stream truncated before IEND")]
    Truncated,
    /// Valid PNG outside the supported subset.
    #[error("unsupported PNG: {0}")]
    UnsupportedFormat(String),
    /// Image data could not be reconstructed.
    #[error("corrupt PNG data: {0}")]
    CorruptData(String),
    /// Compression backend failure while writing output.
    #[error("PNG encode failed: {0}")]
    EncodeFailure(String),
    /// Invalid image dimensions (zero width or height).
    #[error("invalid image dimensions: {width}x{height}")]
    InvalidDimensions {
        /// Image width.
        width: u32,
        /// Image height.
        height: u32,
    },
    /// Pixel data length doesn't match expected size.
    #[error("invalid pixel data length: expected {expected} bytes, got {actual}")]
    InvalidDataLength {
        /// Expected number of bytes.
        expected: usize,
        /// Actual number of bytes provided.
        actual: usize,
    },
    /// Image dimensions exceed maximum supported size.
    #[error("image {width}x{height} exceeds maximum dimension {max}")]
    ImageTooLarge {
        /// Image width.
        width: u32,
        /// Image height.
        height: u32,
        /// Maximum supported dimension.
        max: u32,
    },
    /// Compression level outside 1-9.
    #[error("invalid compression level {0}: must be 1-9")]
    InvalidCompressionLevel(u8),
}

impl Error {
    /// Returns true for errors raised while reading an input stream.
    pub fn is_decode_failure(&self) -> bool {
        match self {
            Error::MalformedStream(_)
            | Error::MissingHeader
            | Error::Truncated
            | Error::UnsupportedFormat(_)
            | Error::CorruptData(_)
            | Error::ImageTooLarge { .. }
            | Error::InvalidDimensions { .. } => true,
            Error::EncodeFailure(_)
            | Error::InvalidDataLength { .. }
            | Error::InvalidCompressionLevel(_) => false,
        }
    }
}
