use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("Source image is empty")]
    EmptySource,
    #[error("Pixel buffer size mismatch: expected {expected} bytes, got {actual}")]
    BufferSizeMismatch { expected: usize, actual: usize },
    #[error("Unsupported channel count {0} (expected 3 or 4)")]
    UnsupportedChannelCount(usize),
    #[error("Invalid quality {0} (expected 0-100)")]
    InvalidQuality(u8),
    #[error("Invalid DCT method {0}")]
    InvalidDctMethod(u8),
    #[error("Unsupported format: not a JPEG stream")]
    UnsupportedFormat,
    #[error("No image to save")]
    NoImage,
    #[error("Decode failed: {0}")]
    Decode(String),
    #[error("Encode failed: {0}")]
    Encode(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
