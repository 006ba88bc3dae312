//! Core data structures for sprite-frame animations.

/// Weight given to frames without an explicit duration.
pub const DEFAULT_FRAME_WEIGHT: u32 = 1;

/// Reference to a sprite image used as an animation frame.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Sprite {
    /// Sprite name (also used to derive per-frame durations)
    pub name: String,
    /// Width of the sprite rect in pixels
    pub width: f32,
    /// Height of the sprite rect in pixels
    pub height: f32,
    /// Pixels per world unit
    #[cfg_attr(feature = "serde", serde(default = "default_pixels_per_unit"))]
    pub pixels_per_unit: f32,
}

#[cfg(feature = "serde")]
fn default_pixels_per_unit() -> f32 {
    100.0
}

impl Sprite {
    pub fn new(name: impl Into<String>, width: f32, height: f32) -> Self {
        Self {
            name: name.into(),
            width,
            height,
            pixels_per_unit: 100.0,
        }
    }

    pub fn with_pixels_per_unit(mut self, pixels_per_unit: f32) -> Self {
        self.pixels_per_unit = pixels_per_unit;
        self
    }

    /// Size of a UI surface showing this sprite at its native resolution.
    pub fn ui_size(&self) -> (f32, f32) {
        if self.pixels_per_unit <= 0.0 {
            return (self.width, self.height);
        }
        (
            100.0 * self.width / self.pixels_per_unit,
            100.0 * self.height / self.pixels_per_unit,
        )
    }

    /// Extract a frame weight encoded in the sprite name as `(N)`.
    ///
    /// Handles patterns like:
    /// - "slash(3)" -> Some(3)
    /// - "hit_01(12)_glow" -> Some(12)
    /// - "idle_02" -> None
    pub fn weight_from_name(name: &str) -> Option<u32> {
        let mut rest = name;
        while let Some(open) = rest.find('(') {
            let after = &rest[open + 1..];
            let digits: &str = match after.find(|c: char| !c.is_ascii_digit()) {
                Some(end) => &after[..end],
                None => after,
            };
            if !digits.is_empty() && after[digits.len()..].starts_with(')') {
                if let Ok(n) = digits.parse::<u32>() {
                    return Some(n);
                }
            }
            rest = after;
        }
        None
    }
}

/// A single authored frame: an optional sprite and its duration weight.
#[derive(Clone, Debug, PartialEq)]
pub struct AnimationFrame {
    pub sprite: Option<Sprite>,
    pub duration: u32,
}

impl AnimationFrame {
    pub fn new(sprite: Option<Sprite>, duration: u32) -> Self {
        Self { sprite, duration }
    }
}

/// A named sequence of sprite frames played at a fixed rate.
///
/// `frames` and `frame_durations` are parallel arrays. A frame lasts
/// `weight / fps` seconds.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SpriteAnimation {
    /// Unique key used by [`SpriteAnimator::play`](crate::SpriteAnimator::play)
    pub name: String,
    /// Frames per second
    #[cfg_attr(feature = "serde", serde(default))]
    pub fps: u32,
    /// Derive each frame's weight from a `(N)` suffix in its sprite name
    #[cfg_attr(feature = "serde", serde(default))]
    pub use_sprite_name_postfix_as_duration: bool,
    /// Per-frame duration weights in units of `1 / fps` seconds
    #[cfg_attr(feature = "serde", serde(default))]
    pub frame_durations: Vec<u32>,
    /// Frame sprites; `None` marks an empty slot left during authoring
    #[cfg_attr(feature = "serde", serde(default, with = "frame_slots"))]
    pub frames: Vec<Option<Sprite>>,
}

/// TOML arrays cannot hold missing values, so each slot is written as a
/// table whose `sprite` key is omitted when the slot is empty.
#[cfg(feature = "serde")]
mod frame_slots {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    use super::Sprite;

    #[derive(Serialize)]
    struct SlotRef<'a> {
        #[serde(skip_serializing_if = "Option::is_none")]
        sprite: Option<&'a Sprite>,
    }

    #[derive(Deserialize)]
    struct Slot {
        #[serde(default)]
        sprite: Option<Sprite>,
    }

    pub fn serialize<S: Serializer>(frames: &[Option<Sprite>], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(frames.iter().map(|f| SlotRef { sprite: f.as_ref() }))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<Option<Sprite>>, D::Error> {
        let slots = Vec::<Slot>::deserialize(deserializer)?;
        Ok(slots.into_iter().map(|s| s.sprite).collect())
    }
}

impl SpriteAnimation {
    /// Create an empty animation.
    pub fn new(name: impl Into<String>, fps: u32) -> Self {
        Self {
            name: name.into(),
            fps,
            use_sprite_name_postfix_as_duration: false,
            frame_durations: Vec::new(),
            frames: Vec::new(),
        }
    }

    /// Create an animation where every sprite has the default weight.
    pub fn from_sprites(name: impl Into<String>, fps: u32, sprites: Vec<Sprite>) -> Self {
        let frame_durations = vec![DEFAULT_FRAME_WEIGHT; sprites.len()];
        Self {
            name: name.into(),
            fps,
            use_sprite_name_postfix_as_duration: false,
            frame_durations,
            frames: sprites.into_iter().map(Some).collect(),
        }
    }

    /// Builder-style frame append.
    pub fn with_frame(mut self, sprite: Sprite, weight: u32) -> Self {
        self.frames.push(Some(sprite));
        self.frame_durations.push(weight);
        self
    }

    /// Number of frames.
    #[inline]
    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Get the sprite at `index`.
    ///
    /// Returns None for out-of-range indices and empty slots.
    #[inline]
    pub fn frame(&self, index: usize) -> Option<&Sprite> {
        self.frames.get(index).and_then(Option::as_ref)
    }

    /// Duration weight of the frame at `index`.
    pub fn frame_weight(&self, index: usize) -> u32 {
        if self.use_sprite_name_postfix_as_duration {
            self.frame(index)
                .and_then(|s| Sprite::weight_from_name(&s.name))
                .unwrap_or(DEFAULT_FRAME_WEIGHT)
        } else {
            self.frame_durations
                .get(index)
                .copied()
                .unwrap_or(DEFAULT_FRAME_WEIGHT)
        }
    }

    /// Duration of the frame at `index` in seconds. Zero when fps is 0.
    pub fn frame_seconds(&self, index: usize) -> f32 {
        if self.fps == 0 {
            return 0.0;
        }
        self.frame_weight(index) as f32 / self.fps as f32
    }

    /// Sum of all frame weights.
    pub fn total_weight(&self) -> u64 {
        (0..self.frame_count())
            .map(|i| self.frame_weight(i) as u64)
            .sum()
    }

    /// Length of one pass through the animation in seconds.
    pub fn duration_seconds(&self) -> f32 {
        if self.fps == 0 {
            return 0.0;
        }
        self.total_weight() as f32 / self.fps as f32
    }

    /// Paired view of frames and their weights.
    pub fn animation_frames(&self) -> Vec<AnimationFrame> {
        (0..self.frame_count())
            .map(|i| AnimationFrame::new(self.frames[i].clone(), self.frame_weight(i)))
            .collect()
    }

    /// Make `frame_durations` match `frames` in length.
    ///
    /// Missing weights are padded with [`DEFAULT_FRAME_WEIGHT`], extra ones are
    /// dropped. Returns true if anything changed.
    pub fn reconcile(&mut self) -> bool {
        let len = self.frames.len();
        if self.frame_durations.len() == len {
            return false;
        }
        self.frame_durations.resize(len, DEFAULT_FRAME_WEIGHT);
        true
    }

    /// Overwrite stored weights with the values encoded in sprite names.
    pub fn apply_name_durations(&mut self) {
        self.reconcile();
        for (i, slot) in self.frames.iter().enumerate() {
            self.frame_durations[i] = slot
                .as_ref()
                .and_then(|s| Sprite::weight_from_name(&s.name))
                .unwrap_or(DEFAULT_FRAME_WEIGHT);
        }
    }
}
