use crate::error::AssetError;
use std::path::{Path, PathBuf};

/// Source format tag, derived from the file extension before any decoding
/// happens. `Unknown` is a load failure, not a fallback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelFormat {
    Jpeg,
    Png,
    Unknown,
}

impl PixelFormat {
    pub fn from_path(path: &Path) -> Self {
        let Some(ext) = path.extension().and_then(|e| e.to_str()) else {
            return PixelFormat::Unknown;
        };
        match ext.to_ascii_lowercase().as_str() {
            "jpg" | "jpeg" => PixelFormat::Jpeg,
            "png" => PixelFormat::Png,
            _ => PixelFormat::Unknown,
        }
    }
}

/// Decoded pixel buffer: tightly packed RGBA8, row-major, top-to-bottom.
/// Immutable once constructed.
#[derive(Debug, Clone)]
pub struct Image {
    width: u32,
    height: u32,
    channels: u8,
    format: PixelFormat,
    path: Option<PathBuf>,
    pixels: Vec<u8>,
}

impl Image {
    /// Decode an image file. The format gate runs before any I/O: an
    /// unrecognized extension fails without touching the file.
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self, AssetError> {
        let path = path.as_ref();
        let format = PixelFormat::from_path(path);
        if format == PixelFormat::Unknown {
            return Err(AssetError::UnsupportedFormat(path.to_path_buf()));
        }

        let bytes = std::fs::read(path).map_err(|source| AssetError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let decoded = ::image::load_from_memory(&bytes).map_err(|source| AssetError::Decode {
            path: path.to_path_buf(),
            source,
        })?;
        let rgba = decoded.to_rgba8();
        let (width, height) = rgba.dimensions();

        Ok(Self {
            width,
            height,
            channels: 4,
            format,
            path: Some(path.to_path_buf()),
            pixels: rgba.into_raw(),
        })
    }

    /// Wrap already-decoded pixels. Accepts 3 (RGB, expanded to opaque
    /// RGBA) or 4 channels; rejects empty data, zero dimensions, and
    /// length mismatches.
    pub fn from_data(
        data: &[u8],
        width: u32,
        height: u32,
        channels: u8,
    ) -> Result<Self, AssetError> {
        if width == 0 || height == 0 {
            return Err(AssetError::InvalidDimensions { width, height });
        }
        if channels != 3 && channels != 4 {
            return Err(AssetError::InvalidChannels(channels));
        }
        let expected = width as usize * height as usize * channels as usize;
        if data.is_empty() || data.len() != expected {
            return Err(AssetError::DataSizeMismatch {
                expected,
                actual: data.len(),
                width,
                height,
                channels,
            });
        }

        let pixels = if channels == 4 {
            data.to_vec()
        } else {
            let mut rgba = Vec::with_capacity(width as usize * height as usize * 4);
            for rgb in data.chunks_exact(3) {
                rgba.extend_from_slice(rgb);
                rgba.push(255);
            }
            rgba
        };

        Ok(Self {
            width,
            height,
            channels: 4,
            format: PixelFormat::Unknown,
            path: None,
            pixels,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn channels(&self) -> u8 {
        self.channels
    }

    pub fn format(&self) -> PixelFormat {
        self.format
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub fn is_loaded(&self) -> bool {
        !self.pixels.is_empty()
    }
}
