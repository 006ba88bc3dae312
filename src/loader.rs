//! Animation asset persistence and sprite folder discovery.
//!
//! Assets are TOML documents holding one [`SpriteAnimation`]. Loading
//! reconciles mismatched `frames`/`frame_durations` lengths, so files
//! written by older tools still play.

use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, warn};

use crate::data::{Sprite, SpriteAnimation};
use crate::error::AssetError;
use crate::parser::parse_png_size;

/// Extension used for animation assets.
pub const ASSET_EXTENSION: &str = "toml";

/// Metadata about a sprite image file on disk.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SpriteFile {
    /// Full path to the image
    pub path: PathBuf,
    /// File stem (e.g., "slash_0003(2)")
    pub name: String,
    /// Frame index for ordering (extracted from the stem)
    pub index: u32,
}

impl SpriteFile {
    pub fn new(path: PathBuf, name: String, index: u32) -> Self {
        Self { path, name, index }
    }

    /// Extract the frame index from a file stem.
    ///
    /// A `(N)` duration suffix is ignored. Handles patterns like:
    /// - "frame_0001" -> 1
    /// - "0042" -> 42
    /// - "slash_3(2)" -> 3
    pub fn extract_index(stem: &str, fallback: u32) -> u32 {
        let stem = match stem.find('(') {
            Some(open) => &stem[..open],
            None => stem,
        };
        if let Some(suffix) = stem.strip_prefix("frame_") {
            suffix.parse::<u32>().unwrap_or(0)
        } else {
            let num_str: String = stem.chars().filter(|c| c.is_ascii_digit()).collect();
            num_str.parse::<u32>().unwrap_or(fallback)
        }
    }
}

#[cfg(feature = "toml")]
impl SpriteAnimation {
    /// Parse an animation asset, reconciling array lengths.
    pub fn from_toml_str(s: &str) -> Result<Self, AssetError> {
        let mut animation: SpriteAnimation = toml::from_str(s)?;
        if animation.name.trim().is_empty() {
            return Err(AssetError::EmptyName);
        }
        if animation.reconcile() {
            warn!(
                "animation '{}': frame durations did not match frames; padded with 1",
                animation.name
            );
        }
        Ok(animation)
    }

    /// Serialize to the asset format.
    pub fn to_toml_string(&self) -> Result<String, AssetError> {
        Ok(toml::to_string_pretty(self)?)
    }
}

/// Load an animation asset from disk.
#[cfg(feature = "toml")]
pub fn load_animation(path: impl AsRef<Path>) -> Result<SpriteAnimation, AssetError> {
    let path = path.as_ref();
    let text = fs::read_to_string(path)?;
    let animation = SpriteAnimation::from_toml_str(&text)?;
    debug!("loaded '{}' from {}", animation.name, path.display());
    Ok(animation)
}

/// Write an animation asset to disk.
#[cfg(feature = "toml")]
pub fn save_animation(path: impl AsRef<Path>, animation: &SpriteAnimation) -> Result<(), AssetError> {
    let path = path.as_ref();
    fs::write(path, animation.to_toml_string()?)?;
    debug!("saved '{}' to {}", animation.name, path.display());
    Ok(())
}

/// First free asset path in `dir` for `stem`: `stem.toml`, then
/// `stem 1.toml`, `stem 2.toml`, ...
pub fn unique_asset_path(dir: impl AsRef<Path>, stem: &str) -> PathBuf {
    let dir = dir.as_ref();
    let candidate = dir.join(format!("{stem}.{ASSET_EXTENSION}"));
    if !candidate.exists() {
        return candidate;
    }
    (1u32..)
        .map(|n| dir.join(format!("{stem} {n}.{ASSET_EXTENSION}")))
        .find(|p| !p.exists())
        .unwrap_or(candidate)
}

/// List the PNG files of `dir` in frame order.
pub fn list_sprite_files(dir: impl AsRef<Path>) -> Result<Vec<SpriteFile>, AssetError> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        let is_png = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("png"));
        if !is_png {
            continue;
        }
        let Some(name) = path.file_stem().and_then(|s| s.to_str()).map(str::to_string) else {
            continue;
        };
        let index = SpriteFile::extract_index(&name, u32::MAX);
        files.push(SpriteFile::new(path, name, index));
    }
    files.sort_by(|a, b| a.index.cmp(&b.index).then_with(|| a.name.cmp(&b.name)));
    Ok(files)
}

/// Build sprites from every readable PNG in `dir`, in frame order.
///
/// Files whose header cannot be read are skipped.
pub fn scan_sprite_folder(dir: impl AsRef<Path>) -> Result<Vec<Sprite>, AssetError> {
    let mut sprites = Vec::new();
    for file in list_sprite_files(dir)? {
        let bytes = fs::read(&file.path)?;
        match parse_png_size(&bytes) {
            Ok((width, height)) => {
                sprites.push(Sprite::new(file.name, width as f32, height as f32));
            }
            Err(err) => warn!("skipping {}: {}", file.path.display(), err),
        }
    }
    Ok(sprites)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::png_header;

    #[test]
    fn test_extract_index() {
        assert_eq!(SpriteFile::extract_index("frame_0001", 0), 1);
        assert_eq!(SpriteFile::extract_index("0042", 0), 42);
        assert_eq!(SpriteFile::extract_index("slash_3(2)", 0), 3);
        assert_eq!(SpriteFile::extract_index("no_digits", 99), 99);
    }

    #[test]
    fn test_unique_asset_path() {
        let dir = tempfile::tempdir().unwrap();
        let first = unique_asset_path(dir.path(), "New Animation");
        assert_eq!(first, dir.path().join("New Animation.toml"));

        fs::write(&first, "").unwrap();
        let second = unique_asset_path(dir.path(), "New Animation");
        assert_eq!(second, dir.path().join("New Animation 1.toml"));
    }

    #[test]
    fn test_scan_sprite_folder_orders_and_skips() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("slash_10.png"), png_header(32, 16)).unwrap();
        fs::write(dir.path().join("slash_2(3).png"), png_header(32, 16)).unwrap();
        fs::write(dir.path().join("slash_1.png"), png_header(64, 64)).unwrap();
        fs::write(dir.path().join("broken_5.png"), b"not a png").unwrap();
        fs::write(dir.path().join("notes.txt"), b"ignored").unwrap();

        let sprites = scan_sprite_folder(dir.path()).unwrap();
        let names: Vec<&str> = sprites.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["slash_1", "slash_2(3)", "slash_10"]);
        assert_eq!((sprites[0].width, sprites[0].height), (64.0, 64.0));
    }

    #[cfg(feature = "toml")]
    #[test]
    fn test_round_trip_preserves_everything() {
        let mut animation = SpriteAnimation::new("slash", 24)
            .with_frame(Sprite::new("slash_0", 32.0, 32.0), 2)
            .with_frame(Sprite::new("slash_1(3)", 48.5, 32.0).with_pixels_per_unit(64.0), 1);
        animation.frames.push(None);
        animation.frame_durations.push(4);
        animation.use_sprite_name_postfix_as_duration = true;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("slash.toml");
        save_animation(&path, &animation).unwrap();
        assert_eq!(load_animation(&path).unwrap(), animation);
    }

    #[cfg(feature = "toml")]
    #[test]
    fn test_load_pads_missing_durations() {
        let text = r#"
            name = "legacy"
            fps = 12
            frame_durations = [5]

            [[frames]]
            [frames.sprite]
            name = "a"
            width = 8.0
            height = 8.0

            [[frames]]
            [frames.sprite]
            name = "b"
            width = 8.0
            height = 8.0
        "#;
        let animation = SpriteAnimation::from_toml_str(text).unwrap();
        assert_eq!(animation.frame_durations, vec![5, 1]);
        assert_eq!(animation.frame(1).map(|s| s.pixels_per_unit), Some(100.0));
        assert!(!animation.use_sprite_name_postfix_as_duration);
    }

    #[cfg(feature = "toml")]
    #[test]
    fn test_load_rejects_empty_name_and_bad_toml() {
        assert!(matches!(
            SpriteAnimation::from_toml_str("name = \"\"\nfps = 1"),
            Err(AssetError::EmptyName)
        ));
        assert!(matches!(
            SpriteAnimation::from_toml_str("name = [1"),
            Err(AssetError::Parse(_))
        ));
        assert!(matches!(
            load_animation("/definitely/not/here.toml"),
            Err(AssetError::Io(_))
        ));
    }
}
