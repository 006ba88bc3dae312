//! Command-based authoring model for sprite animations.
//!
//! Every change to an animation goes through an [`EditCommand`]. Applying a
//! command validates it, mutates the animation and returns the command that
//! reverts it; [`AnimationEditor`] keeps those pairs in an undo/redo
//! history. Persistence is separate from editing: nothing is written until
//! [`AnimationEditor::save`] is called.

use std::path::{Path, PathBuf};

use log::debug;

use crate::animation::{AnimationState, LoopMode, PlayOptions, SpriteAnimator};
use crate::data::{AnimationFrame, Sprite, SpriteAnimation, DEFAULT_FRAME_WEIGHT};
use crate::error::{AssetError, EditError};
use crate::loader::scan_sprite_folder;
use crate::render::FrameRenderer;
use crate::time::FrameTime;
#[cfg(feature = "toml")]
use crate::loader::{load_animation, save_animation, unique_asset_path};

/// Stem used for newly created assets.
pub const NEW_ANIMATION_NAME: &str = "New Animation";

/// A reversible edit of a [`SpriteAnimation`].
#[derive(Clone, Debug, PartialEq)]
pub enum EditCommand {
    Rename(String),
    /// Negative values clamp to 0.
    SetFps(i64),
    /// Enabling recomputes every weight from the sprite names.
    SetDurationFromName(bool),
    /// Append one slot; `None` adds an empty frame.
    AddFrame(Option<Sprite>),
    AddFrames(Vec<Sprite>),
    RemoveFrame(usize),
    InsertFrame { index: usize, frame: AnimationFrame },
    MoveFrame { from: usize, to: usize },
    SetFrameDuration { index: usize, duration: u32 },
    SetFrameDurations(Vec<u32>),
    ReverseFrames,
    ClearFrames,
    ReplaceFrames {
        frames: Vec<Option<Sprite>>,
        durations: Vec<u32>,
    },
    /// Applied in order; rolled back as a whole if any step fails.
    Batch(Vec<EditCommand>),
}

impl EditCommand {
    /// Short name suitable for an "Undo ..." menu entry.
    pub fn label(&self) -> &'static str {
        match self {
            EditCommand::Rename(_) => "Rename",
            EditCommand::SetFps(_) => "Set FPS",
            EditCommand::SetDurationFromName(_) => "Duration From Name",
            EditCommand::AddFrame(None) => "Add Empty Frame",
            EditCommand::AddFrame(Some(_)) => "Add Frame",
            EditCommand::AddFrames(_) => "Add Frames",
            EditCommand::RemoveFrame(_) => "Remove Frame",
            EditCommand::InsertFrame { .. } => "Insert Frame",
            EditCommand::MoveFrame { .. } => "Move Frame",
            EditCommand::SetFrameDuration { .. } => "Set Frame Duration",
            EditCommand::SetFrameDurations(_) => "Set Frame Durations",
            EditCommand::ReverseFrames => "Reverse Frames",
            EditCommand::ClearFrames => "Clear Frames",
            EditCommand::ReplaceFrames { .. } => "Replace Frames",
            EditCommand::Batch(_) => "Edit",
        }
    }

    /// Apply to `animation` and return the command that undoes it.
    ///
    /// On error the animation is left untouched.
    pub fn apply(self, animation: &mut SpriteAnimation) -> Result<EditCommand, EditError> {
        animation.reconcile();
        let len = animation.frames.len();
        let inverse = match self {
            EditCommand::Rename(name) => {
                EditCommand::Rename(std::mem::replace(&mut animation.name, name))
            }
            EditCommand::SetFps(fps) => {
                let old = animation.fps;
                animation.fps = fps.clamp(0, u32::MAX as i64) as u32;
                EditCommand::SetFps(old as i64)
            }
            EditCommand::SetDurationFromName(enabled) => {
                let restore = EditCommand::Batch(vec![
                    EditCommand::SetDurationFromName(animation.use_sprite_name_postfix_as_duration),
                    EditCommand::SetFrameDurations(animation.frame_durations.clone()),
                ]);
                animation.use_sprite_name_postfix_as_duration = enabled;
                if enabled {
                    animation.apply_name_durations();
                }
                restore
            }
            EditCommand::AddFrame(slot) => {
                let weight = new_frame_weight(animation, slot.as_ref());
                animation.frames.push(slot);
                animation.frame_durations.push(weight);
                EditCommand::RemoveFrame(len)
            }
            EditCommand::AddFrames(sprites) => {
                let restore = snapshot(animation);
                for sprite in sprites {
                    let weight = new_frame_weight(animation, Some(&sprite));
                    animation.frames.push(Some(sprite));
                    animation.frame_durations.push(weight);
                }
                restore
            }
            EditCommand::RemoveFrame(index) => {
                check_index(index, len)?;
                let sprite = animation.frames.remove(index);
                let duration = animation.frame_durations.remove(index);
                EditCommand::InsertFrame {
                    index,
                    frame: AnimationFrame::new(sprite, duration),
                }
            }
            EditCommand::InsertFrame { index, frame } => {
                if index > len {
                    return Err(EditError::IndexOutOfRange { index, len });
                }
                animation.frames.insert(index, frame.sprite);
                animation.frame_durations.insert(index, frame.duration);
                EditCommand::RemoveFrame(index)
            }
            EditCommand::MoveFrame { from, to } => {
                check_index(from, len)?;
                check_index(to, len)?;
                let sprite = animation.frames.remove(from);
                let duration = animation.frame_durations.remove(from);
                animation.frames.insert(to, sprite);
                animation.frame_durations.insert(to, duration);
                EditCommand::MoveFrame { from: to, to: from }
            }
            EditCommand::SetFrameDuration { index, duration } => {
                check_index(index, len)?;
                let old = std::mem::replace(&mut animation.frame_durations[index], duration);
                EditCommand::SetFrameDuration {
                    index,
                    duration: old,
                }
            }
            EditCommand::SetFrameDurations(durations) => {
                let old = std::mem::replace(&mut animation.frame_durations, durations);
                animation.reconcile();
                EditCommand::SetFrameDurations(old)
            }
            EditCommand::ReverseFrames => {
                animation.frames.reverse();
                animation.frame_durations.reverse();
                EditCommand::ReverseFrames
            }
            EditCommand::ClearFrames => {
                let restore = snapshot(animation);
                animation.frames.clear();
                animation.frame_durations.clear();
                restore
            }
            EditCommand::ReplaceFrames { frames, durations } => {
                let restore = snapshot(animation);
                animation.frames = frames;
                animation.frame_durations = durations;
                animation.reconcile();
                restore
            }
            EditCommand::Batch(commands) => {
                let mut inverses = Vec::with_capacity(commands.len());
                for command in commands {
                    match command.apply(animation) {
                        Ok(inverse) => inverses.push(inverse),
                        Err(err) => {
                            for inverse in inverses.into_iter().rev() {
                                // Inverses of applied steps always validate.
                                let _ = inverse.apply(animation);
                            }
                            return Err(err);
                        }
                    }
                }
                inverses.reverse();
                EditCommand::Batch(inverses)
            }
        };
        Ok(inverse)
    }
}

fn check_index(index: usize, len: usize) -> Result<(), EditError> {
    if index >= len {
        return Err(EditError::IndexOutOfRange { index, len });
    }
    Ok(())
}

fn snapshot(animation: &SpriteAnimation) -> EditCommand {
    EditCommand::ReplaceFrames {
        frames: animation.frames.clone(),
        durations: animation.frame_durations.clone(),
    }
}

fn new_frame_weight(animation: &SpriteAnimation, sprite: Option<&Sprite>) -> u32 {
    if !animation.use_sprite_name_postfix_as_duration {
        return DEFAULT_FRAME_WEIGHT;
    }
    sprite
        .and_then(|s| Sprite::weight_from_name(&s.name))
        .unwrap_or(DEFAULT_FRAME_WEIGHT)
}

#[derive(Clone, Debug)]
struct HistoryEntry {
    label: &'static str,
    forward: EditCommand,
    inverse: EditCommand,
}

/// Undo/redo stacks of applied commands.
#[derive(Clone, Debug, Default)]
pub struct History {
    undo: Vec<HistoryEntry>,
    redo: Vec<HistoryEntry>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply `command` and record it. Clears the redo stack.
    pub fn apply(&mut self, animation: &mut SpriteAnimation, command: EditCommand) -> Result<(), EditError> {
        let label = command.label();
        let inverse = command.clone().apply(animation)?;
        self.undo.push(HistoryEntry {
            label,
            forward: command,
            inverse,
        });
        self.redo.clear();
        Ok(())
    }

    pub fn undo(&mut self, animation: &mut SpriteAnimation) -> Result<&'static str, EditError> {
        let mut entry = self.undo.pop().ok_or(EditError::NothingToUndo)?;
        match entry.inverse.clone().apply(animation) {
            Ok(forward) => {
                entry.forward = forward;
                let label = entry.label;
                self.redo.push(entry);
                Ok(label)
            }
            Err(err) => {
                self.undo.push(entry);
                Err(err)
            }
        }
    }

    pub fn redo(&mut self, animation: &mut SpriteAnimation) -> Result<&'static str, EditError> {
        let mut entry = self.redo.pop().ok_or(EditError::NothingToRedo)?;
        match entry.forward.clone().apply(animation) {
            Ok(inverse) => {
                entry.inverse = inverse;
                let label = entry.label;
                self.undo.push(entry);
                Ok(label)
            }
            Err(err) => {
                self.redo.push(entry);
                Err(err)
            }
        }
    }

    pub fn can_undo(&self) -> bool {
        !self.undo.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    /// Label of the command the next undo reverts.
    pub fn undo_label(&self) -> Option<&'static str> {
        self.undo.last().map(|e| e.label)
    }

    pub fn redo_label(&self) -> Option<&'static str> {
        self.redo.last().map(|e| e.label)
    }

    pub fn clear(&mut self) {
        self.undo.clear();
        self.redo.clear();
    }
}

/// An animation asset open for editing.
///
/// ```rust
/// use flipbook_core::{AnimationEditor, Sprite, SpriteAnimation};
///
/// let mut editor = AnimationEditor::new(SpriteAnimation::new("slash", 12));
/// editor.add_frame(Sprite::new("slash_0(2)", 32.0, 32.0)).unwrap();
/// editor.add_empty_frame().unwrap();
/// editor.set_duration_from_name(true).unwrap();
/// assert_eq!(editor.total_frame_count(), 3);
///
/// editor.undo().unwrap();
/// assert_eq!(editor.total_frame_count(), 2);
/// ```
#[derive(Debug)]
pub struct AnimationEditor {
    animation: SpriteAnimation,
    path: Option<PathBuf>,
    history: History,
    dirty: bool,
}

impl AnimationEditor {
    /// Edit an in-memory animation. Mismatched arrays are reconciled.
    pub fn new(mut animation: SpriteAnimation) -> Self {
        animation.reconcile();
        Self {
            animation,
            path: None,
            history: History::new(),
            dirty: false,
        }
    }

    /// Open an asset from disk.
    #[cfg(feature = "toml")]
    pub fn open(path: impl AsRef<Path>) -> Result<Self, AssetError> {
        let path = path.as_ref();
        let mut editor = Self::new(load_animation(path)?);
        editor.path = Some(path.to_path_buf());
        Ok(editor)
    }

    /// Create and save an empty asset under a free `New Animation` name.
    #[cfg(feature = "toml")]
    pub fn create_in(dir: impl AsRef<Path>) -> Result<Self, AssetError> {
        let path = unique_asset_path(dir, NEW_ANIMATION_NAME);
        let name = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or(NEW_ANIMATION_NAME)
            .to_string();
        let mut editor = Self::new(SpriteAnimation::new(name, 12));
        editor.save_as(&path)?;
        Ok(editor)
    }

    /// Write the animation to its current path.
    #[cfg(feature = "toml")]
    pub fn save(&mut self) -> Result<(), AssetError> {
        let path = self.path.clone().ok_or(AssetError::NoPath)?;
        save_animation(&path, &self.animation)?;
        self.dirty = false;
        Ok(())
    }

    /// Write the animation to `path` and make it the current path.
    #[cfg(feature = "toml")]
    pub fn save_as(&mut self, path: impl AsRef<Path>) -> Result<(), AssetError> {
        self.path = Some(path.as_ref().to_path_buf());
        self.save()
    }

    pub fn animation(&self) -> &SpriteAnimation {
        &self.animation
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// True when there are edits not yet saved.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn apply(&mut self, command: EditCommand) -> Result<(), EditError> {
        debug!("editor: {}", command.label());
        self.history.apply(&mut self.animation, command)?;
        self.dirty = true;
        Ok(())
    }

    pub fn undo(&mut self) -> Result<(), EditError> {
        let label = self.history.undo(&mut self.animation)?;
        debug!("editor: undo {}", label);
        self.dirty = true;
        Ok(())
    }

    pub fn redo(&mut self) -> Result<(), EditError> {
        let label = self.history.redo(&mut self.animation)?;
        debug!("editor: redo {}", label);
        self.dirty = true;
        Ok(())
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    pub fn rename(&mut self, name: impl Into<String>) -> Result<(), EditError> {
        self.apply(EditCommand::Rename(name.into()))
    }

    pub fn set_fps(&mut self, fps: i64) -> Result<(), EditError> {
        self.apply(EditCommand::SetFps(fps))
    }

    pub fn set_duration_from_name(&mut self, enabled: bool) -> Result<(), EditError> {
        self.apply(EditCommand::SetDurationFromName(enabled))
    }

    pub fn add_frame(&mut self, sprite: Sprite) -> Result<(), EditError> {
        self.apply(EditCommand::AddFrame(Some(sprite)))
    }

    pub fn add_empty_frame(&mut self) -> Result<(), EditError> {
        self.apply(EditCommand::AddFrame(None))
    }

    pub fn add_frames(&mut self, sprites: Vec<Sprite>) -> Result<(), EditError> {
        self.apply(EditCommand::AddFrames(sprites))
    }

    pub fn remove_frame(&mut self, index: usize) -> Result<(), EditError> {
        self.apply(EditCommand::RemoveFrame(index))
    }

    pub fn move_frame(&mut self, from: usize, to: usize) -> Result<(), EditError> {
        self.apply(EditCommand::MoveFrame { from, to })
    }

    pub fn set_frame_duration(&mut self, index: usize, duration: u32) -> Result<(), EditError> {
        self.apply(EditCommand::SetFrameDuration { index, duration })
    }

    pub fn reverse_frames(&mut self) -> Result<(), EditError> {
        self.apply(EditCommand::ReverseFrames)
    }

    pub fn clear_frames(&mut self) -> Result<(), EditError> {
        self.apply(EditCommand::ClearFrames)
    }

    /// Append every PNG of `dir` as frames, in frame-number order.
    ///
    /// Returns the number of frames added.
    pub fn load_from_folder(&mut self, dir: impl AsRef<Path>) -> Result<usize, AssetError> {
        let sprites = scan_sprite_folder(dir)?;
        let count = sprites.len();
        if count > 0 {
            // Appending cannot fail validation.
            let _ = self.add_frames(sprites);
        }
        Ok(count)
    }

    /// Sum of all frame weights.
    pub fn total_frame_count(&self) -> u64 {
        self.animation.total_weight()
    }

    /// Seconds for one pass through the animation.
    pub fn animation_time(&self) -> f32 {
        self.animation.duration_seconds()
    }
}

/// Key the previewed copy is registered under in the preview animator.
const PREVIEW_KEY: &str = "preview";

/// Headless live preview of an animation being edited.
///
/// The host passes the edited animation to every [`tick`](Self::tick); edits
/// are picked up automatically. The selected frame follows playback, and
/// playback stops by itself once the animation has no frames left.
pub struct AnimationPreview<R> {
    animator: SpriteAnimator<R>,
    source: Option<SpriteAnimation>,
    playing: bool,
    looping: bool,
    fps_override: Option<u32>,
    selected: usize,
}

impl<R: FrameRenderer> AnimationPreview<R> {
    pub fn new(renderer: R) -> Self {
        Self {
            animator: SpriteAnimator::new(renderer),
            source: None,
            playing: false,
            looping: true,
            fps_override: None,
            selected: 0,
        }
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    /// Play/pause toggle. Playing again after a finished pass restarts
    /// from the first frame.
    pub fn set_playing(&mut self, playing: bool) {
        if playing == self.playing {
            return;
        }
        if !playing {
            self.playing = false;
            self.animator.pause();
            return;
        }
        if self.source.as_ref().is_some_and(SpriteAnimation::is_empty) {
            return;
        }
        self.playing = true;
        match self.animator.state() {
            AnimationState::Paused => self.animator.resume(),
            _ => {
                self.selected = 0;
                self.rebuild();
            }
        }
    }

    pub fn is_looping(&self) -> bool {
        self.looping
    }

    /// Loop toggle; without it playback stops after one pass.
    pub fn set_loop(&mut self, looping: bool) {
        if looping != self.looping {
            self.looping = looping;
            self.rebuild();
        }
    }

    /// Preview rate, independent of the asset's own fps. Negative values
    /// clamp to 0.
    pub fn set_preview_fps(&mut self, fps: i64) {
        self.fps_override = Some(fps.clamp(0, u32::MAX as i64) as u32);
        self.rebuild();
    }

    /// Rate used for the preview: the override, or the asset's fps.
    pub fn preview_fps(&self) -> u32 {
        self.fps_override
            .or_else(|| self.source.as_ref().map(|a| a.fps))
            .unwrap_or(0)
    }

    /// Show frame `index`; playback continues from it. Out of range is
    /// ignored.
    pub fn select_frame(&mut self, index: usize) {
        if self.animator.seek(index) {
            self.selected = index;
        }
    }

    /// Frame currently shown, if any.
    pub fn selected_frame(&self) -> Option<usize> {
        self.source
            .as_ref()
            .filter(|a| !a.is_empty())
            .map(|_| self.selected)
    }

    pub fn renderer(&self) -> &R {
        self.animator.renderer()
    }

    /// Pick up edits to `animation` and advance playback by one frame.
    pub fn tick(&mut self, animation: &SpriteAnimation, time: FrameTime) {
        if self.source.as_ref() != Some(animation) {
            self.source = Some(animation.clone());
            self.rebuild();
        }
        if !self.playing {
            return;
        }
        self.animator.update(time);
        if let Some(frame) = self.animator.current_frame() {
            self.selected = frame;
        }
        if !self.animator.is_playing() {
            debug!("preview: pass finished");
            self.playing = false;
        }
    }

    /// Re-register the previewed copy and restore position and play state.
    fn rebuild(&mut self) {
        let Some(source) = self.source.as_ref() else {
            return;
        };
        let mut preview = source.clone();
        preview.name = PREVIEW_KEY.to_string();
        if let Some(fps) = self.fps_override {
            preview.fps = fps;
        }
        let count = preview.frame_count();
        self.animator.add_animation(preview);

        if count == 0 {
            if self.playing {
                debug!("preview: no frames left, stopping");
            }
            self.playing = false;
            self.selected = 0;
            self.animator.stop();
            self.animator.clear_renderer();
            return;
        }

        self.selected = self.selected.min(count - 1);
        let loop_mode = if self.looping {
            LoopMode::Repeat
        } else {
            LoopMode::Once
        };
        // The key was just registered and the default speed is valid.
        let _ = self
            .animator
            .play(PREVIEW_KEY, PlayOptions::default().loop_mode(loop_mode));
        self.animator.seek(self.selected);
        if !self.playing {
            self.animator.pause();
        }
    }
}
