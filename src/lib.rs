//! # flipbook-core
//!
//! Frame-based sprite animation and scripted effect sequencing.
//!
//! This crate provides platform-agnostic data structures and logic for:
//! - Describing sprite animations with per-frame duration weights
//! - Playing them through a state machine driven by an explicit tick
//! - Binding the selected frame to a UI image or world-space sprite surface
//! - Tweening, timed delays and cancellation scopes for multi-stage effects
//! - Authoring animations with undoable commands and TOML persistence
//!
//! Nothing runs in the background: the host calls `update`/`tick` on the
//! animator, [`Scheduler`] and [`Tweener`] once per frame with a
//! [`FrameTime`].
//!
//! ## Features
//!
//! - `serde` - Enable serialization/deserialization for data structures
//! - `toml` (default) - Load and save animation assets and skill settings
//!
//! ## Example
//!
//! ```rust
//! use flipbook_core::{
//!     FrameTime, LoopMode, ObjectRenderer, PlayOptions, Sprite, SpriteAnimation,
//!     SpriteAnimator, SurfaceHandle, Tweener,
//! };
//!
//! let burst = SpriteAnimation::new("burst", 10)
//!     .with_frame(Sprite::new("burst_0", 32.0, 32.0), 1)
//!     .with_frame(Sprite::new("burst_1", 32.0, 32.0), 2);
//!
//! let tweener = Tweener::new();
//! let surface = SurfaceHandle::new();
//! let mut animator =
//!     SpriteAnimator::new(ObjectRenderer::new(surface.clone(), tweener.clone())).with_animation(burst);
//!
//! animator
//!     .play("burst", PlayOptions::default().loop_mode(LoopMode::Once))
//!     .unwrap();
//!
//! for _ in 0..10 {
//!     let time = FrameTime::new(0.05);
//!     animator.update(time);
//!     tweener.tick(time);
//! }
//! assert!(!animator.is_playing());
//! assert_eq!(surface.sprite_name().as_deref(), Some("burst_1"));
//! ```

mod animation;
mod color;
mod config;
mod data;
mod editor;
mod error;
pub mod linger;
pub mod loader;
mod parser;
pub mod render;
mod scheduler;
pub mod services;
pub mod skill;
mod time;
pub mod tween;

pub use animation::{AnimationState, LoopMode, PlayOptions, SpriteAnimator};
pub use color::{parse_color, Color};
pub use config::{SkillConfig, SkillDetails};
pub use data::{AnimationFrame, Sprite, SpriteAnimation, DEFAULT_FRAME_WEIGHT};
pub use editor::{AnimationEditor, AnimationPreview, EditCommand, History};
pub use error::{AnimatorError, AssetError, EditError};
pub use parser::{parse_png_size, ParseError};
pub use render::{FrameRenderer, ImageRenderer, ObjectRenderer, SurfaceHandle};
pub use scheduler::Scheduler;
pub use time::{CancelScope, CancellationToken, FrameTime};
pub use tween::{Easing, Tween, Tweener};
