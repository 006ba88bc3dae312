//! Sprite animator: the frame playback state machine.

use log::{debug, trace, warn};

use crate::color::Color;
use crate::data::SpriteAnimation;
use crate::error::AnimatorError;
use crate::render::{Callback, FrameRenderer};
use crate::time::FrameTime;

/// Loop mode for animation playback.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LoopMode {
    /// Stop on the last frame
    Once,
    /// Wrap back to the first frame when reaching the end
    #[default]
    Repeat,
    /// Reverse direction at either end
    PingPong,
}

/// Current state of the animator.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AnimationState {
    /// Nothing is playing, or the last pass finished
    Stopped,
    /// Frames advance on every update
    Playing,
    /// Playback is suspended and resumes where it left off
    Paused,
}

/// Options for [`SpriteAnimator::play`].
///
/// ```rust
/// use flipbook_core::{LoopMode, PlayOptions};
///
/// let options = PlayOptions::default()
///     .speed(1.5)
///     .loop_mode(LoopMode::PingPong)
///     .on_frame(3, || println!("impact"));
/// ```
pub struct PlayOptions {
    speed: f32,
    one_shot: bool,
    backwards: bool,
    loop_mode: LoopMode,
    event_frame: Option<usize>,
    on_frame_event: Option<Box<dyn FnMut()>>,
    on_stopped: Option<Callback>,
}

impl Default for PlayOptions {
    fn default() -> Self {
        Self {
            speed: 1.0,
            one_shot: false,
            backwards: false,
            loop_mode: LoopMode::Repeat,
            event_frame: None,
            on_frame_event: None,
            on_stopped: None,
        }
    }
}

impl PlayOptions {
    /// Playback speed multiplier. Must be positive.
    pub fn speed(mut self, speed: f32) -> Self {
        self.speed = speed;
        self
    }

    /// Stop after a single pass regardless of the loop mode.
    pub fn one_shot(mut self) -> Self {
        self.one_shot = true;
        self
    }

    /// Start on the last frame and step towards the first.
    pub fn backwards(mut self) -> Self {
        self.backwards = true;
        self
    }

    pub fn loop_mode(mut self, loop_mode: LoopMode) -> Self {
        self.loop_mode = loop_mode;
        self
    }

    /// Invoke `callback` every time playback enters frame `index`.
    pub fn on_frame(mut self, index: usize, callback: impl FnMut() + 'static) -> Self {
        self.event_frame = Some(index);
        self.on_frame_event = Some(Box::new(callback));
        self
    }

    /// Invoke `callback` when a non-repeating pass finishes.
    pub fn on_stopped(mut self, callback: impl FnOnce() + 'static) -> Self {
        self.on_stopped = Some(Box::new(callback));
        self
    }
}

struct PlaybackSession {
    animation: usize,
    frame: usize,
    time_in_frame: f32,
    speed: f32,
    one_shot: bool,
    loop_mode: LoopMode,
    forward: bool,
    event_frame: Option<usize>,
    on_frame_event: Option<Box<dyn FnMut()>>,
    on_stopped: Option<Callback>,
}

impl PlaybackSession {
    fn fire_frame_event(&mut self) {
        if self.event_frame == Some(self.frame) {
            if let Some(callback) = self.on_frame_event.as_mut() {
                callback();
            }
        }
    }

    /// Move one frame along the current direction. Returns false when the
    /// pass is over and playback must stop.
    fn step(&mut self, count: usize) -> bool {
        let repeat = (!self.one_shot).then_some(self.loop_mode);
        advance(&mut self.frame, &mut self.forward, count, repeat)
    }

    /// Drop whole loop cycles from the accumulated time in one go, firing
    /// the frame event once for every entry the skipped cycles contain.
    ///
    /// Returns false if the cursor is not yet on a cycle (ping-pong start
    /// frames are left once and never revisited).
    fn skip_cycles(&mut self, animation: &SpriteAnimation) -> bool {
        if self.one_shot || self.loop_mode == LoopMode::Once {
            return true;
        }
        let count = animation.frame_count();
        let (mut frame, mut forward) = (self.frame, self.forward);
        let mut period = 0.0;
        let mut entries: u64 = 0;
        let mut closed = false;
        for _ in 0..2 * count + 2 {
            period += animation.frame_seconds(frame);
            advance(&mut frame, &mut forward, count, Some(self.loop_mode));
            if self.event_frame == Some(frame) {
                entries += 1;
            }
            if frame == self.frame && forward == self.forward {
                closed = true;
                break;
            }
        }
        if !closed {
            return false;
        }
        if period <= 0.0 || self.time_in_frame < period {
            return true;
        }

        let remainder = self.time_in_frame % period;
        let cycles = ((self.time_in_frame - remainder) / period).round() as u64;
        self.time_in_frame = remainder;
        trace!("'{}' skipped {} cycles", animation.name, cycles);
        if self.event_frame.is_some() {
            if let Some(callback) = self.on_frame_event.as_mut() {
                for _ in 0..cycles.saturating_mul(entries) {
                    callback();
                }
            }
        }
        true
    }
}

/// Step `frame` one position along `forward`. At either end `repeat`
/// decides whether playback wraps, bounces or ends (`None` ends it).
fn advance(frame: &mut usize, forward: &mut bool, count: usize, repeat: Option<LoopMode>) -> bool {
    let neighbour = |frame: usize, forward: bool| {
        if forward {
            (frame + 1 < count).then_some(frame + 1)
        } else {
            frame.checked_sub(1)
        }
    };
    if let Some(next) = neighbour(*frame, *forward) {
        *frame = next;
        return true;
    }
    match repeat {
        None | Some(LoopMode::Once) => false,
        Some(LoopMode::Repeat) => {
            *frame = if *forward { 0 } else { count - 1 };
            true
        }
        Some(LoopMode::PingPong) => {
            *forward = !*forward;
            if let Some(next) = neighbour(*frame, *forward) {
                *frame = next;
            }
            true
        }
    }
}

/// Platform-agnostic sprite animator.
///
/// Holds a set of named animations and a bound [`FrameRenderer`]. The caller
/// drives playback by calling [`update`](Self::update) once per host frame.
///
/// ## Example
///
/// ```rust
/// use flipbook_core::{
///     AnimationState, FrameTime, ObjectRenderer, PlayOptions, Sprite, SpriteAnimation,
///     SpriteAnimator, SurfaceHandle, Tweener,
/// };
///
/// let walk = SpriteAnimation::from_sprites(
///     "walk",
///     10,
///     vec![Sprite::new("walk_0", 16.0, 16.0), Sprite::new("walk_1", 16.0, 16.0)],
/// );
/// let surface = SurfaceHandle::new();
/// let renderer = ObjectRenderer::new(surface.clone(), Tweener::new());
/// let mut animator = SpriteAnimator::new(renderer).with_animation(walk);
///
/// animator.play("walk", PlayOptions::default()).unwrap();
/// assert_eq!(surface.sprite_name().as_deref(), Some("walk_0"));
///
/// animator.update(FrameTime::new(0.1));
/// assert_eq!(animator.current_frame(), Some(1));
/// assert_eq!(animator.state(), AnimationState::Playing);
/// ```
pub struct SpriteAnimator<R> {
    animations: Vec<SpriteAnimation>,
    renderer: R,
    state: AnimationState,
    session: Option<PlaybackSession>,
    previous_animation: Option<String>,
    ignore_time_scale: bool,
}

impl<R: FrameRenderer> SpriteAnimator<R> {
    /// Create an animator with no animations.
    pub fn new(renderer: R) -> Self {
        Self {
            animations: Vec::new(),
            renderer,
            state: AnimationState::Stopped,
            session: None,
            previous_animation: None,
            ignore_time_scale: false,
        }
    }

    pub fn with_animation(mut self, animation: SpriteAnimation) -> Self {
        self.add_animation(animation);
        self
    }

    /// Register an animation, replacing any animation with the same name.
    ///
    /// Replacing the animation that is currently playing stops playback.
    pub fn add_animation(&mut self, mut animation: SpriteAnimation) {
        if animation.reconcile() {
            warn!(
                "animation '{}' had mismatched frame durations; reconciled",
                animation.name
            );
        }
        match self.animations.iter().position(|a| a.name == animation.name) {
            Some(index) => {
                if self.session.as_ref().is_some_and(|s| s.animation == index) {
                    self.session = None;
                    self.state = AnimationState::Stopped;
                }
                self.animations[index] = animation;
            }
            None => self.animations.push(animation),
        }
    }

    /// All registered animations in registration order.
    pub fn animations(&self) -> &[SpriteAnimation] {
        &self.animations
    }

    pub fn animation(&self, name: &str) -> Option<&SpriteAnimation> {
        self.animations.iter().find(|a| a.name == name)
    }

    /// The animation of the current playback session.
    pub fn current_animation(&self) -> Option<&SpriteAnimation> {
        self.session.as_ref().map(|s| &self.animations[s.animation])
    }

    /// Name of the animation that was active before the last `play`.
    pub fn previous_animation(&self) -> Option<&str> {
        self.previous_animation.as_deref()
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }

    /// Get the current playback state.
    #[inline]
    pub fn state(&self) -> AnimationState {
        self.state
    }

    /// Check if the animation is currently playing.
    #[inline]
    pub fn is_playing(&self) -> bool {
        self.state == AnimationState::Playing
    }

    /// Index of the selected frame, if an animation with frames is loaded.
    pub fn current_frame(&self) -> Option<usize> {
        let session = self.session.as_ref()?;
        (!self.animations[session.animation].is_empty()).then_some(session.frame)
    }

    /// Whether updates use unscaled time.
    pub fn set_ignore_time_scale(&mut self, ignore: bool) {
        self.ignore_time_scale = ignore;
    }

    /// Start playing the animation called `name`.
    ///
    /// Fails without touching the current session if the animation does not
    /// exist or the speed multiplier is not positive. On success the first
    /// frame (or the last, when playing backwards) is rendered immediately.
    ///
    /// `one_shot` takes precedence over the loop mode.
    pub fn play(&mut self, name: &str, options: PlayOptions) -> Result<(), AnimatorError> {
        let index = match self.animations.iter().position(|a| a.name == name) {
            Some(index) => index,
            None => {
                warn!("play: animation '{}' not found", name);
                return Err(AnimatorError::AnimationNotFound {
                    name: name.to_string(),
                });
            }
        };
        if !(options.speed.is_finite() && options.speed > 0.0) {
            return Err(AnimatorError::InvalidSpeed {
                speed: options.speed,
            });
        }

        self.previous_animation = self.current_animation().map(|a| a.name.clone());

        let count = self.animations[index].frame_count();
        let start = if options.backwards {
            count.saturating_sub(1)
        } else {
            0
        };
        debug!(
            "play '{}' ({} frames, speed {}, {:?}{})",
            name,
            count,
            options.speed,
            options.loop_mode,
            if options.one_shot { ", one-shot" } else { "" }
        );

        self.session = Some(PlaybackSession {
            animation: index,
            frame: start,
            time_in_frame: 0.0,
            speed: options.speed,
            one_shot: options.one_shot,
            loop_mode: options.loop_mode,
            forward: !options.backwards,
            event_frame: options.event_frame,
            on_frame_event: options.on_frame_event,
            on_stopped: options.on_stopped,
        });

        if count == 0 {
            self.finish();
            return Ok(());
        }

        self.state = AnimationState::Playing;
        self.change_frame(start as isize);
        if let Some(session) = self.session.as_mut() {
            session.fire_frame_event();
        }
        Ok(())
    }

    /// Replay the animation that was active before the last `play`.
    pub fn play_previous(&mut self, options: PlayOptions) -> Result<(), AnimatorError> {
        let name = self
            .previous_animation
            .clone()
            .ok_or(AnimatorError::NoPreviousAnimation)?;
        self.play(&name, options)
    }

    /// Suspend playback without losing position.
    pub fn pause(&mut self) {
        if self.state == AnimationState::Playing {
            self.state = AnimationState::Paused;
        }
    }

    /// Continue a paused playback.
    pub fn resume(&mut self) {
        if self.state == AnimationState::Paused {
            self.state = AnimationState::Playing;
        }
    }

    /// Stop playback on the current frame. The stop callback is not invoked.
    pub fn stop(&mut self) {
        self.state = AnimationState::Stopped;
    }

    /// Advance playback by one host frame.
    ///
    /// Every frame boundary crossed is walked in order, so frame events fire
    /// for intermediate frames even when `time` spans several of them.
    pub fn update(&mut self, time: FrameTime) {
        if self.state != AnimationState::Playing {
            return;
        }
        let delta = time.delta_for(self.ignore_time_scale);
        let Some(session) = self.session.as_mut() else {
            return;
        };
        let animation = &self.animations[session.animation];
        // Zero fps or all-zero weights: hold the current frame.
        if animation.duration_seconds() <= 0.0 {
            return;
        }
        let count = animation.frame_count();

        session.time_in_frame += delta * session.speed;
        let mut on_cycle = session.skip_cycles(animation);
        let mut finished = false;
        loop {
            if !on_cycle {
                on_cycle = session.skip_cycles(animation);
            }
            let frame_seconds = animation.frame_seconds(session.frame);
            if session.time_in_frame < frame_seconds {
                break;
            }
            session.time_in_frame -= frame_seconds;
            if !session.step(count) {
                finished = true;
                break;
            }
            trace!("'{}' -> frame {}", animation.name, session.frame);
            if let Some(sprite) = animation.frame(session.frame) {
                self.renderer.show_frame(sprite);
            }
            session.fire_frame_event();
        }

        if finished {
            self.finish();
        }
    }

    fn finish(&mut self) {
        self.state = AnimationState::Stopped;
        let callback = self.session.as_mut().and_then(|s| {
            s.time_in_frame = 0.0;
            s.on_stopped.take()
        });
        if let Some(callback) = callback {
            callback();
        }
    }

    /// Move playback to frame `index`, restarting its time and rendering it.
    ///
    /// Returns false, changing nothing, when there is no session or `index`
    /// is out of range.
    pub fn seek(&mut self, index: usize) -> bool {
        let Some(session) = self.session.as_mut() else {
            return false;
        };
        if index >= self.animations[session.animation].frame_count() {
            return false;
        }
        session.frame = index;
        session.time_in_frame = 0.0;
        self.change_frame(index as isize);
        true
    }

    /// Show frame `index` of the current animation.
    ///
    /// Out-of-range indices and empty frames are ignored.
    pub fn change_frame(&mut self, index: isize) {
        let Some(session) = self.session.as_ref() else {
            return;
        };
        let animation = &self.animations[session.animation];
        match usize::try_from(index).ok().and_then(|i| animation.frame(i)) {
            Some(sprite) => self.renderer.show_frame(sprite),
            None => trace!("change_frame({}) ignored for '{}'", index, animation.name),
        }
    }

    /// Detach the sprite from the renderer; playback state is unchanged.
    pub fn clear_renderer(&mut self) {
        self.renderer.clear_renderer();
    }

    pub fn tint_color(&mut self, color: Color) {
        self.renderer.tint_color(color);
    }

    pub fn fade_in(&mut self, duration: f32, on_completed: Option<Callback>) {
        self.renderer.fade_in(duration, on_completed);
    }

    pub fn fade_out(&mut self, duration: f32, on_completed: Option<Callback>) {
        self.renderer.fade_out(duration, on_completed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Sprite;
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    /// Renderer that records every frame it is asked to show.
    #[derive(Default)]
    struct Recorder {
        shown: Rc<RefCell<Vec<String>>>,
        cleared: Rc<Cell<usize>>,
    }

    impl FrameRenderer for Recorder {
        fn tint_color(&mut self, _color: Color) {}
        fn fade_out(&mut self, _duration: f32, _on_completed: Option<Callback>) {}
        fn fade_in(&mut self, _duration: f32, _on_completed: Option<Callback>) {}
        fn show_frame(&mut self, sprite: &Sprite) {
            self.shown.borrow_mut().push(sprite.name.clone());
        }
        fn clear_renderer(&mut self) {
            self.cleared.set(self.cleared.get() + 1);
        }
    }

    fn animation(name: &str, fps: u32, weights: &[u32]) -> SpriteAnimation {
        weights.iter().enumerate().fold(SpriteAnimation::new(name, fps), |a, (i, &w)| {
            a.with_frame(Sprite::new(format!("{name}_{i}"), 8.0, 8.0), w)
        })
    }

    fn animator(anim: SpriteAnimation) -> (SpriteAnimator<Recorder>, Rc<RefCell<Vec<String>>>) {
        let recorder = Recorder::default();
        let shown = recorder.shown.clone();
        (SpriteAnimator::new(recorder).with_animation(anim), shown)
    }

    fn counter() -> (Rc<Cell<u32>>, impl FnMut() + 'static) {
        let count = Rc::new(Cell::new(0));
        let c = count.clone();
        (count, move || c.set(c.get() + 1))
    }

    #[test]
    fn test_play_renders_first_frame() {
        let (mut anim, shown) = animator(animation("idle", 10, &[1, 1, 1]));
        anim.play("idle", PlayOptions::default()).unwrap();

        assert_eq!(anim.state(), AnimationState::Playing);
        assert_eq!(anim.current_frame(), Some(0));
        assert_eq!(*shown.borrow(), vec!["idle_0"]);
    }

    #[test]
    fn test_play_unknown_animation_does_not_mutate() {
        let (mut anim, shown) = animator(animation("idle", 10, &[1, 1, 1]));
        anim.play("idle", PlayOptions::default()).unwrap();
        anim.update(FrameTime::new(0.1));

        let err = anim.play("missing", PlayOptions::default()).unwrap_err();
        assert_eq!(
            err,
            AnimatorError::AnimationNotFound {
                name: "missing".into()
            }
        );
        assert_eq!(anim.current_frame(), Some(1));
        assert_eq!(anim.current_animation().map(|a| a.name.as_str()), Some("idle"));
        assert_eq!(shown.borrow().len(), 2);
    }

    #[test]
    fn test_play_rejects_non_positive_speed() {
        let (mut anim, _) = animator(animation("idle", 10, &[1]));
        assert!(matches!(
            anim.play("idle", PlayOptions::default().speed(0.0)),
            Err(AnimatorError::InvalidSpeed { .. })
        ));
        assert!(anim.play("idle", PlayOptions::default().speed(f32::NAN)).is_err());
        assert_eq!(anim.state(), AnimationState::Stopped);
    }

    #[test]
    fn test_once_duration_matches_weight_sum() {
        // weights sum to 6 at 12 fps: one pass lasts 0.5 s
        let (mut anim, _) = animator(animation("swing", 12, &[1, 2, 3]));
        let (stopped, on_stopped) = counter();
        anim.play(
            "swing",
            PlayOptions::default().loop_mode(LoopMode::Once).on_stopped(on_stopped),
        )
        .unwrap();

        for _ in 0..9 {
            anim.update(FrameTime::new(0.05));
        }
        assert!(anim.is_playing());
        assert_eq!(anim.current_frame(), Some(2));

        anim.update(FrameTime::new(0.06));
        assert_eq!(anim.state(), AnimationState::Stopped);
        assert_eq!(anim.current_frame(), Some(2));
        assert_eq!(stopped.get(), 1);

        anim.update(FrameTime::new(1.0));
        assert_eq!(stopped.get(), 1);
    }

    #[test]
    fn test_repeat_visits_every_frame_in_cyclic_order() {
        let (mut anim, shown) = animator(animation("run", 10, &[1, 1, 1, 1]));
        anim.play("run", PlayOptions::default()).unwrap();

        for _ in 0..10 {
            anim.update(FrameTime::new(0.1));
        }
        let expected: Vec<String> = (0..11).map(|i| format!("run_{}", i % 4)).collect();
        assert_eq!(*shown.borrow(), expected);
        assert!(anim.is_playing());
    }

    #[test]
    fn test_large_delta_walks_each_boundary() {
        let (mut anim, shown) = animator(animation("burst", 10, &[1, 1, 1, 1, 1]));
        let (events, on_event) = counter();
        anim.play("burst", PlayOptions::default().on_frame(2, on_event)).unwrap();

        anim.update(FrameTime::new(0.45));
        assert_eq!(
            *shown.borrow(),
            vec!["burst_0", "burst_1", "burst_2", "burst_3", "burst_4"]
        );
        assert_eq!(events.get(), 1);

        // A full extra pass in one update fires the event exactly once more
        anim.update(FrameTime::new(0.5));
        assert_eq!(events.get(), 2);
        assert_eq!(anim.current_frame(), Some(4));
    }

    #[test]
    fn test_backwards_repeat_wraps_to_last() {
        let (mut anim, shown) = animator(animation("rewind", 10, &[1, 1, 1]));
        anim.play("rewind", PlayOptions::default().backwards()).unwrap();
        for _ in 0..4 {
            anim.update(FrameTime::new(0.1));
        }
        assert_eq!(
            *shown.borrow(),
            vec!["rewind_2", "rewind_1", "rewind_0", "rewind_2", "rewind_1"]
        );
    }

    #[test]
    fn test_backwards_once_stops_on_first_frame() {
        let (mut anim, _) = animator(animation("rewind", 10, &[1, 1, 1]));
        anim.play(
            "rewind",
            PlayOptions::default().backwards().loop_mode(LoopMode::Once),
        )
        .unwrap();
        anim.update(FrameTime::new(1.0));
        assert_eq!(anim.state(), AnimationState::Stopped);
        assert_eq!(anim.current_frame(), Some(0));
    }

    #[test]
    fn test_ping_pong_reverses_at_ends() {
        let (mut anim, shown) = animator(animation("bob", 10, &[1, 1, 1]));
        anim.play("bob", PlayOptions::default().loop_mode(LoopMode::PingPong)).unwrap();
        for _ in 0..6 {
            anim.update(FrameTime::new(0.1));
        }
        assert_eq!(
            *shown.borrow(),
            vec!["bob_0", "bob_1", "bob_2", "bob_1", "bob_0", "bob_1", "bob_2"]
        );
    }

    #[test]
    fn test_one_shot_overrides_repeat() {
        let (mut anim, _) = animator(animation("hit", 10, &[1, 1]));
        let (stopped, on_stopped) = counter();
        anim.play(
            "hit",
            PlayOptions::default()
                .one_shot()
                .loop_mode(LoopMode::Repeat)
                .on_stopped(on_stopped),
        )
        .unwrap();
        anim.update(FrameTime::new(0.25));
        assert!(!anim.is_playing());
        assert_eq!(anim.current_frame(), Some(1));
        assert_eq!(stopped.get(), 1);
    }

    #[test]
    fn test_one_shot_overrides_ping_pong() {
        let (mut anim, shown) = animator(animation("hit", 10, &[1, 1, 1]));
        let (stopped, on_stopped) = counter();
        anim.play(
            "hit",
            PlayOptions::default()
                .one_shot()
                .loop_mode(LoopMode::PingPong)
                .on_stopped(on_stopped),
        )
        .unwrap();
        anim.update(FrameTime::new(0.35));
        anim.update(FrameTime::new(1.0));

        assert_eq!(anim.state(), AnimationState::Stopped);
        assert_eq!(anim.current_frame(), Some(2));
        assert_eq!(*shown.borrow(), vec!["hit_0", "hit_1", "hit_2"]);
        assert_eq!(stopped.get(), 1);
    }

    #[test]
    fn test_backwards_one_shot_stops_on_first_frame() {
        let (mut anim, shown) = animator(animation("rewind", 10, &[1, 1, 1]));
        let (stopped, on_stopped) = counter();
        anim.play(
            "rewind",
            PlayOptions::default()
                .one_shot()
                .backwards()
                .on_stopped(on_stopped),
        )
        .unwrap();
        anim.update(FrameTime::new(0.5));

        assert!(!anim.is_playing());
        assert_eq!(anim.current_frame(), Some(0));
        assert_eq!(*shown.borrow(), vec!["rewind_2", "rewind_1", "rewind_0"]);
        assert_eq!(stopped.get(), 1);
    }

    #[test]
    fn test_huge_speed_repeat_returns() {
        let (mut anim, _) = animator(animation("spin", 60, &[1, 1]));
        anim.play("spin", PlayOptions::default().speed(1.0e7)).unwrap();
        anim.update(FrameTime::new(1.0));
        assert_eq!(anim.state(), AnimationState::Playing);
        assert!(matches!(anim.current_frame(), Some(0) | Some(1)));
    }

    #[test]
    fn test_skipped_repeat_passes_still_fire_events() {
        // 0.5 s per pass, 1000 s of playback: 2000 passes
        let (mut anim, _) = animator(animation("spin", 4, &[1, 1]));
        let (events, on_event) = counter();
        anim.play("spin", PlayOptions::default().speed(1000.0).on_frame(1, on_event))
            .unwrap();
        anim.update(FrameTime::new(1.0));
        assert_eq!(events.get(), 2000);
        assert_eq!(anim.current_frame(), Some(0));
    }

    #[test]
    fn test_skipped_ping_pong_cycles_still_fire_events() {
        // After the first step the bounce cycle 1,2,1,0 lasts 1 s.
        let (mut anim, _) = animator(animation("bob", 4, &[1, 1, 1]));
        let (events, on_event) = counter();
        anim.play(
            "bob",
            PlayOptions::default()
                .speed(1000.0)
                .loop_mode(LoopMode::PingPong)
                .on_frame(2, on_event),
        )
        .unwrap();
        anim.update(FrameTime::new(1.0));
        assert_eq!(events.get(), 1000);
        assert_eq!(anim.current_frame(), Some(0));
        assert!(anim.is_playing());
    }

    #[test]
    fn test_seek_moves_playback() {
        let (mut anim, shown) = animator(animation("run", 10, &[1, 1, 1, 1]));
        assert!(!anim.seek(0));
        anim.play("run", PlayOptions::default()).unwrap();
        assert!(anim.seek(2));
        assert!(!anim.seek(4));
        anim.update(FrameTime::new(0.1));
        assert_eq!(anim.current_frame(), Some(3));
        assert_eq!(*shown.borrow(), vec!["run_0", "run_2", "run_3"]);
    }

    #[test]
    fn test_speed_multiplier() {
        let (mut anim, _) = animator(animation("dash", 10, &[1, 1, 1, 1]));
        anim.play("dash", PlayOptions::default().speed(2.0)).unwrap();
        anim.update(FrameTime::new(0.1));
        assert_eq!(anim.current_frame(), Some(2));
    }

    #[test]
    fn test_event_on_start_frame_fires_on_play() {
        let (mut anim, _) = animator(animation("cast", 10, &[1, 1]));
        let (events, on_event) = counter();
        anim.play("cast", PlayOptions::default().on_frame(0, on_event)).unwrap();
        assert_eq!(events.get(), 1);
        anim.update(FrameTime::new(0.2));
        assert_eq!(events.get(), 2);
    }

    #[test]
    fn test_pause_and_time_scale() {
        let (mut anim, _) = animator(animation("idle", 10, &[1, 1, 1]));
        anim.play("idle", PlayOptions::default()).unwrap();

        anim.pause();
        anim.update(FrameTime::new(0.1));
        assert_eq!(anim.state(), AnimationState::Paused);
        assert_eq!(anim.current_frame(), Some(0));

        anim.resume();
        anim.update(FrameTime::new(0.1).with_time_scale(0.0));
        assert_eq!(anim.current_frame(), Some(0));

        anim.set_ignore_time_scale(true);
        anim.update(FrameTime::new(0.1).with_time_scale(0.0));
        assert_eq!(anim.current_frame(), Some(1));
    }

    #[test]
    fn test_change_frame_out_of_range_is_noop() {
        let mut frames = animation("idle", 10, &[1, 1]);
        frames.frames.push(None);
        frames.frame_durations.push(1);
        let (mut anim, shown) = animator(frames);
        anim.play("idle", PlayOptions::default()).unwrap();

        anim.change_frame(-1);
        anim.change_frame(3);
        anim.change_frame(2);
        assert_eq!(*shown.borrow(), vec!["idle_0"]);

        anim.change_frame(1);
        assert_eq!(*shown.borrow(), vec!["idle_0", "idle_1"]);
        assert_eq!(anim.current_frame(), Some(0));
    }

    #[test]
    fn test_clear_renderer_keeps_playback() {
        let (mut anim, _) = animator(animation("idle", 10, &[1, 1]));
        anim.play("idle", PlayOptions::default()).unwrap();
        anim.clear_renderer();
        assert_eq!(anim.renderer().cleared.get(), 1);
        assert!(anim.is_playing());
        anim.update(FrameTime::new(0.1));
        assert_eq!(anim.current_frame(), Some(1));
    }

    #[test]
    fn test_empty_animation_stops_immediately() {
        let (mut anim, shown) = animator(SpriteAnimation::new("empty", 10));
        let (stopped, on_stopped) = counter();
        anim.play("empty", PlayOptions::default().on_stopped(on_stopped)).unwrap();
        assert_eq!(anim.state(), AnimationState::Stopped);
        assert_eq!(anim.current_frame(), None);
        assert_eq!(stopped.get(), 1);
        assert!(shown.borrow().is_empty());
    }

    #[test]
    fn test_zero_fps_holds_first_frame() {
        let (mut anim, _) = animator(animation("still", 0, &[1, 1]));
        anim.play("still", PlayOptions::default()).unwrap();
        anim.update(FrameTime::new(10.0));
        assert_eq!(anim.current_frame(), Some(0));
        assert!(anim.is_playing());
    }

    #[test]
    fn test_previous_animation_resume() {
        let (mut anim, _) = animator(animation("idle", 10, &[1]));
        anim.add_animation(animation("hit", 10, &[1]));

        assert_eq!(
            anim.play_previous(PlayOptions::default()),
            Err(AnimatorError::NoPreviousAnimation)
        );

        anim.play("idle", PlayOptions::default()).unwrap();
        anim.play("hit", PlayOptions::default().one_shot()).unwrap();
        assert_eq!(anim.previous_animation(), Some("idle"));

        anim.play_previous(PlayOptions::default()).unwrap();
        assert_eq!(anim.current_animation().map(|a| a.name.as_str()), Some("idle"));
        assert_eq!(anim.previous_animation(), Some("hit"));
    }

    #[test]
    fn test_add_animation_reconciles_durations() {
        let mut broken = animation("walk", 10, &[2, 2]);
        broken.frame_durations.pop();
        let (anim, _) = animator(broken);
        assert_eq!(anim.animation("walk").unwrap().frame_durations, vec![2, 1]);
    }
}
