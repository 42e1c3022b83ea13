use crate::error::AssetError;
use std::path::{Path, PathBuf};

pub const DEFAULT_FONT_SIZE: f32 = 16.0;

/// Loaded typeface metadata. Glyph rasterization is an external service;
/// this type only records what was requested and whether the file exists.
#[derive(Debug, Clone)]
pub struct Font {
    path: PathBuf,
    size: f32,
    bold: bool,
    italic: bool,
    loaded: bool,
}

impl Font {
    pub fn load_from_file(path: impl AsRef<Path>, size: f32) -> Result<Self, AssetError> {
        let path = path.as_ref();
        if path.as_os_str().is_empty() || !path.is_file() {
            return Err(AssetError::FontNotFound(path.to_path_buf()));
        }
        Ok(Self {
            path: path.to_path_buf(),
            size: if size > 0.0 { size } else { DEFAULT_FONT_SIZE },
            bold: false,
            italic: false,
            loaded: true,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn size(&self) -> f32 {
        self.size
    }

    pub fn set_size(&mut self, size: f32) {
        if size > 0.0 {
            self.size = size;
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub fn bold(&self) -> bool {
        self.bold
    }

    pub fn set_bold(&mut self, bold: bool) {
        self.bold = bold;
    }

    pub fn italic(&self) -> bool {
        self.italic
    }

    pub fn set_italic(&mut self, italic: bool) {
        self.italic = italic;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_is_an_error() {
        let err = Font::load_from_file("no/such/font.ttf", 16.0).unwrap_err();
        assert!(matches!(err, AssetError::FontNotFound(_)));
    }

    #[test]
    fn empty_path_is_an_error() {
        assert!(Font::load_from_file("", 16.0).is_err());
    }

    #[test]
    fn nonpositive_size_falls_back_to_default() {
        let dir = std::env::temp_dir();
        let path = dir.join("vitrina_font_test.ttf");
        std::fs::write(&path, b"stub").unwrap();
        let font = Font::load_from_file(&path, 0.0).unwrap();
        assert_eq!(font.size(), DEFAULT_FONT_SIZE);
        assert!(font.is_loaded());
        std::fs::remove_file(&path).ok();
    }
}
