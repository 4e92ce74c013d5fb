use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::rc::Rc;

use image::ImageReader;
use thiserror::Error;
use tracing::{debug, warn};

pub const SOLDIER_WALK_KEY: &str = "soldier/walk";
pub const SOLDIER_RUN_KEY: &str = "soldier/run";
pub const SOLDIER_FIRE_KEY: &str = "soldier/shot";
pub const SOLDIER_IDLE_KEY: &str = "soldier/idle";
pub const SOLDIER_RELOAD_KEY: &str = "soldier/recharge";
pub const SOLDIER_MELEE_KEY: &str = "soldier/attack";
pub const BACKGROUND_KEY: &str = "backgrounds/winter";

/// Decoded RGBA8 image, rows top to bottom.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpriteSheet {
    width: u32,
    height: u32,
    rgba: Vec<u8>,
}

impl SpriteSheet {
    /// Returns `None` when the buffer does not hold exactly `width * height` pixels.
    pub fn from_rgba(width: u32, height: u32, rgba: Vec<u8>) -> Option<Self> {
        let expected = (width as usize)
            .checked_mul(height as usize)?
            .checked_mul(4)?;
        (rgba.len() == expected).then_some(Self {
            width,
            height,
            rgba,
        })
    }

    pub fn solid(width: u32, height: u32, color: [u8; 4]) -> Self {
        let pixel_count = width as usize * height as usize;
        let mut rgba = Vec::with_capacity(pixel_count * 4);
        for _ in 0..pixel_count {
            rgba.extend_from_slice(&color);
        }
        Self {
            width,
            height,
            rgba,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn full_rect(&self) -> FrameRect {
        FrameRect {
            x: 0,
            y: 0,
            width: self.width,
            height: self.height,
        }
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let offset = (y as usize * self.width as usize + x as usize) * 4;
        let mut out = [0u8; 4];
        out.copy_from_slice(&self.rgba[offset..offset + 4]);
        Some(out)
    }
}

/// Source rectangle of one animation frame inside a sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// Slices the first row of `sheet` into `floor(sheet.width / frame_width)`
/// frames of `frame_width x frame_height`.
pub fn frames_from_sheet(sheet: &SpriteSheet, frame_width: u32, frame_height: u32) -> Vec<FrameRect> {
    if frame_width == 0 || frame_height == 0 || sheet.height < frame_height {
        return Vec::new();
    }
    let count = sheet.width / frame_width;
    (0..count)
        .map(|index| FrameRect {
            x: index * frame_width,
            y: 0,
            width: frame_width,
            height: frame_height,
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SpriteKeyError {
    #[error("sprite key is empty")]
    Empty,
    #[error("sprite key is absolute")]
    Absolute,
    #[error("sprite key escapes the sprite directory")]
    Traversal,
    #[error("sprite key contains unsupported character '{0}'")]
    UnsupportedCharacter(char),
}

#[derive(Debug, Error)]
pub enum SpriteLoadError {
    #[error("invalid sprite key '{key}': {source}")]
    InvalidKey {
        key: String,
        #[source]
        source: SpriteKeyError,
    },
    #[error("failed to open sprite {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to decode sprite {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
}

pub fn validate_sprite_key(key: &str) -> Result<(), SpriteKeyError> {
    if key.is_empty() {
        return Err(SpriteKeyError::Empty);
    }
    if key.starts_with('/') {
        return Err(SpriteKeyError::Absolute);
    }
    if key.split('/').any(|segment| segment == ".." || segment == ".") {
        return Err(SpriteKeyError::Traversal);
    }
    match key
        .chars()
        .find(|ch| !(ch.is_ascii_lowercase() || ch.is_ascii_digit() || matches!(ch, '_' | '-' | '/')))
    {
        Some(ch) => Err(SpriteKeyError::UnsupportedCharacter(ch)),
        None => Ok(()),
    }
}

pub fn sprite_path(sprite_root: &Path, key: &str) -> Result<PathBuf, SpriteKeyError> {
    validate_sprite_key(key)?;
    Ok(sprite_root.join(format!("{key}.png")))
}

pub fn load_sprite_sheet(sprite_root: &Path, key: &str) -> Result<SpriteSheet, SpriteLoadError> {
    let path = sprite_path(sprite_root, key).map_err(|source| SpriteLoadError::InvalidKey {
        key: key.to_string(),
        source,
    })?;
    let reader = ImageReader::open(&path).map_err(|source| SpriteLoadError::Open {
        path: path.clone(),
        source,
    })?;
    let decoded = reader.decode().map_err(|source| SpriteLoadError::Decode {
        path: path.clone(),
        source,
    })?;
    let image = decoded.to_rgba8();
    let (width, height) = image.dimensions();
    Ok(SpriteSheet {
        width,
        height,
        rgba: image.into_raw(),
    })
}

/// Keyed sheet cache. A failed load is cached as `None` and warned about once,
/// so every later lookup of that key is a silent miss.
#[derive(Debug, Default)]
pub struct SpriteStore {
    sprite_root: Option<PathBuf>,
    cache: HashMap<String, Option<Rc<SpriteSheet>>>,
    warned_keys: HashSet<String>,
}

impl SpriteStore {
    pub fn new(sprite_root: PathBuf) -> Self {
        Self {
            sprite_root: Some(sprite_root),
            ..Self::default()
        }
    }

    /// Store with no backing directory; only inserted sheets resolve.
    pub fn in_memory() -> Self {
        Self::default()
    }

    pub fn sprite_root(&self) -> Option<&Path> {
        self.sprite_root.as_deref()
    }

    pub fn insert(&mut self, key: impl Into<String>, sheet: SpriteSheet) {
        self.cache.insert(key.into(), Some(Rc::new(sheet)));
    }

    pub fn get(&mut self, key: &str) -> Option<Rc<SpriteSheet>> {
        if let Some(cached) = self.cache.get(key) {
            return cached.clone();
        }
        let loaded = match self.sprite_root.as_deref() {
            Some(root) => match load_sprite_sheet(root, key) {
                Ok(sheet) => {
                    debug!(sprite_key = key, width = sheet.width, height = sheet.height, "sprite_loaded");
                    Some(Rc::new(sheet))
                }
                Err(error) => {
                    self.warn_load_failed_once(key, &error);
                    None
                }
            },
            None => None,
        };
        self.cache.insert(key.to_string(), loaded.clone());
        loaded
    }

    pub fn cached_len(&self) -> usize {
        self.cache.values().filter(|entry| entry.is_some()).count()
    }

    fn warn_load_failed_once(&mut self, key: &str, error: &SpriteLoadError) {
        if !self.warned_keys.insert(key.to_string()) {
            return;
        }
        warn!(sprite_key = key, error = %error, "sprite_load_failed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write_png(root: &Path, key: &str, width: u32, height: u32) {
        let path = root.join(format!("{key}.png"));
        fs::create_dir_all(path.parent().expect("parent")).expect("create dirs");
        let image = image::RgbaImage::from_pixel(width, height, image::Rgba([10, 20, 30, 255]));
        image.save(&path).expect("save png");
    }

    #[test]
    fn frames_from_sheet_floors_partial_frames() {
        let sheet = SpriteSheet::solid(128 * 4 + 60, 128, [0, 0, 0, 255]);
        let frames = frames_from_sheet(&sheet, 128, 128);
        assert_eq!(frames.len(), 4);
        assert_eq!(
            frames[3],
            FrameRect {
                x: 384,
                y: 0,
                width: 128,
                height: 128
            }
        );
    }

    #[test]
    fn frames_from_sheet_is_empty_for_short_or_narrow_sheets() {
        assert!(frames_from_sheet(&SpriteSheet::solid(100, 128, [0; 4]), 128, 128).is_empty());
        assert!(frames_from_sheet(&SpriteSheet::solid(512, 64, [0; 4]), 128, 128).is_empty());
        assert!(frames_from_sheet(&SpriteSheet::solid(512, 128, [0; 4]), 0, 128).is_empty());
    }

    #[test]
    fn from_rgba_rejects_mismatched_buffer() {
        assert!(SpriteSheet::from_rgba(2, 2, vec![0; 15]).is_none());
        let sheet = SpriteSheet::from_rgba(2, 1, vec![1, 2, 3, 4, 5, 6, 7, 8]).expect("sheet");
        assert_eq!(sheet.pixel(1, 0), Some([5, 6, 7, 8]));
        assert_eq!(sheet.pixel(2, 0), None);
    }

    #[test]
    fn sprite_keys_are_validated() {
        for key in ["soldier/walk", "effects/explosion/frame_00", "a-b"] {
            assert!(validate_sprite_key(key).is_ok(), "key={key}");
        }
        assert_eq!(validate_sprite_key(""), Err(SpriteKeyError::Empty));
        assert_eq!(validate_sprite_key("/etc"), Err(SpriteKeyError::Absolute));
        assert_eq!(validate_sprite_key("a/../b"), Err(SpriteKeyError::Traversal));
        assert_eq!(
            validate_sprite_key("Soldier"),
            Err(SpriteKeyError::UnsupportedCharacter('S'))
        );
    }

    #[test]
    fn store_loads_png_from_disk_and_caches_it() {
        let temp = TempDir::new().expect("temp dir");
        write_png(temp.path(), "soldier/walk", 256, 128);
        let mut store = SpriteStore::new(temp.path().to_path_buf());

        let first = store.get("soldier/walk").expect("walk sheet");
        assert_eq!((first.width(), first.height()), (256, 128));
        assert_eq!(first.pixel(0, 0), Some([10, 20, 30, 255]));

        let second = store.get("soldier/walk").expect("cached sheet");
        assert!(Rc::ptr_eq(&first, &second));
    }

    #[test]
    fn store_caches_missing_sprites_as_misses() {
        let temp = TempDir::new().expect("temp dir");
        let mut store = SpriteStore::new(temp.path().to_path_buf());
        assert!(store.get("soldier/run").is_none());
        assert!(store.get("soldier/run").is_none());
        assert_eq!(store.cached_len(), 0);
        assert_eq!(store.warned_keys.len(), 1);
    }

    #[test]
    fn in_memory_store_only_resolves_inserted_sheets() {
        let mut store = SpriteStore::in_memory();
        store.insert("backgrounds/winter", SpriteSheet::solid(4, 4, [1, 1, 1, 255]));
        assert!(store.get("backgrounds/winter").is_some());
        assert!(store.get("soldier/walk").is_none());
    }

    #[test]
    fn invalid_key_fails_before_touching_disk() {
        let temp = TempDir::new().expect("temp dir");
        let error = load_sprite_sheet(temp.path(), "../escape").expect_err("invalid key");
        assert!(matches!(error, SpriteLoadError::InvalidKey { .. }));
    }
}
