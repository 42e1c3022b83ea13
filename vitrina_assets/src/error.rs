use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AssetError {
    #[error("unsupported image format: {0}")]
    UnsupportedFormat(PathBuf),
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to decode {path}: {source}")]
    Decode {
        path: PathBuf,
        source: ::image::ImageError,
    },
    #[error("invalid image dimensions {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },
    #[error("unsupported channel count {0} (expected 3 or 4)")]
    InvalidChannels(u8),
    #[error("pixel data length {actual} does not match {expected} ({width}x{height}x{channels})")]
    DataSizeMismatch {
        expected: usize,
        actual: usize,
        width: u32,
        height: u32,
        channels: u8,
    },
    #[error("font file not found: {0}")]
    FontNotFound(PathBuf),
}
