use crate::font::{DEFAULT_FONT_SIZE, Font};
use crate::image::Image;
use log::warn;
use std::path::Path;
use vitrina_ids::{FontID, ImageID};

/// Owns decoded images and loaded fonts; hands out typed IDs that scene
/// nodes carry as non-owning references. IDs are sequential (index 1..),
/// slots are never reused, and a stale ID simply resolves to `None`.
#[derive(Default)]
pub struct AssetStore {
    images: Vec<Option<Image>>,
    fonts: Vec<Option<Font>>,
}

impl AssetStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode an image file into the store. Failures are logged and leave
    /// no entry behind.
    pub fn load_image(&mut self, path: impl AsRef<Path>) -> Option<ImageID> {
        match Image::load_from_file(path.as_ref()) {
            Ok(image) => Some(self.insert_image(image)),
            Err(err) => {
                warn!("image load failed: {err}");
                None
            }
        }
    }

    pub fn insert_image(&mut self, image: Image) -> ImageID {
        self.images.push(Some(image));
        ImageID::from_parts(self.images.len() as u32, 0)
    }

    pub fn image(&self, id: ImageID) -> Option<&Image> {
        if id.is_nil() {
            return None;
        }
        self.images.get(id.index() as usize - 1)?.as_ref()
    }

    pub fn remove_image(&mut self, id: ImageID) -> Option<Image> {
        if id.is_nil() {
            return None;
        }
        self.images.get_mut(id.index() as usize - 1)?.take()
    }

    pub fn image_count(&self) -> usize {
        self.images.iter().filter(|slot| slot.is_some()).count()
    }

    pub fn load_font(&mut self, path: impl AsRef<Path>, size: f32) -> Option<FontID> {
        match Font::load_from_file(path.as_ref(), size) {
            Ok(font) => Some(self.insert_font(font)),
            Err(err) => {
                warn!("font load failed: {err}");
                None
            }
        }
    }

    pub fn load_font_default_size(&mut self, path: impl AsRef<Path>) -> Option<FontID> {
        self.load_font(path, DEFAULT_FONT_SIZE)
    }

    pub fn insert_font(&mut self, font: Font) -> FontID {
        self.fonts.push(Some(font));
        FontID::from_parts(self.fonts.len() as u32, 0)
    }

    pub fn font(&self, id: FontID) -> Option<&Font> {
        if id.is_nil() {
            return None;
        }
        self.fonts.get(id.index() as usize - 1)?.as_ref()
    }

    pub fn font_count(&self) -> usize {
        self.fonts.iter().filter(|slot| slot.is_some()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_and_lookup_image() {
        let mut store = AssetStore::new();
        let data = vec![255u8; 4 * 4 * 4];
        let image = Image::from_data(&data, 4, 4, 4).unwrap();
        let id = store.insert_image(image);

        assert!(!id.is_nil());
        assert_eq!(store.image(id).map(|i| i.width()), Some(4));
        assert_eq!(store.image_count(), 1);
    }

    #[test]
    fn nil_and_stale_ids_resolve_to_none() {
        let store = AssetStore::new();
        assert!(store.image(ImageID::nil()).is_none());
        assert!(store.image(ImageID::from_parts(3, 0)).is_none());
        assert!(store.font(FontID::from_parts(1, 0)).is_none());
    }

    #[test]
    fn removed_image_leaves_a_hole() {
        let mut store = AssetStore::new();
        let a = store.insert_image(Image::from_data(&[0u8; 4], 1, 1, 4).unwrap());
        let b = store.insert_image(Image::from_data(&[0u8; 4], 1, 1, 4).unwrap());
        assert!(store.remove_image(a).is_some());
        assert!(store.image(a).is_none());
        assert!(store.image(b).is_some());
        assert_eq!(store.image_count(), 1);
    }

    #[test]
    fn failed_image_load_leaves_no_entry() {
        let mut store = AssetStore::new();
        assert!(store.load_image("definitely/missing.png").is_none());
        assert_eq!(store.image_count(), 0);
    }
}
