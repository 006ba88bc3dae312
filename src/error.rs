//! Error types for playback, persistence and authoring.

use thiserror::Error;

/// Errors reported by [`SpriteAnimator::play`](crate::SpriteAnimator::play).
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AnimatorError {
    /// No animation with the requested name is registered on the animator.
    #[error("animation not found: {name}")]
    AnimationNotFound { name: String },

    /// Speed multipliers must be positive and finite.
    #[error("invalid speed multiplier: {speed}")]
    InvalidSpeed { speed: f32 },

    /// `play_previous` was called before any animation was played.
    #[error("no previous animation to resume")]
    NoPreviousAnimation,
}

/// Errors raised while loading or saving animation assets.
#[derive(Debug, Error)]
pub enum AssetError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[cfg(feature = "toml")]
    #[error("parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[cfg(feature = "toml")]
    #[error("serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("animation asset has an empty name")]
    EmptyName,

    /// The editor was asked to save before a file path was chosen.
    #[error("animation has no file path")]
    NoPath,
}

/// Errors raised by editor commands.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EditError {
    #[error("frame index {index} out of range (frame count {len})")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("nothing to undo")]
    NothingToUndo,

    #[error("nothing to redo")]
    NothingToRedo,
}
