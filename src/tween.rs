//! Tween facility for interpolating values over time.
//!
//! A [`Tween`] drives a setter with an eased progress value in `0.0..=1.0`.
//! Tweens can be tagged with a [`TweenTarget`] so that every tween animating
//! the same object can be killed at once, which is how the renderer
//! adapters keep at most one fade active per surface.
//!
//! Typed shortcuts for surfaces (fade, color, move) live on
//! [`SurfaceHandle`](crate::render::SurfaceHandle).

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::time::{CancellationToken, FrameTime};

/// Easing functions for smooth interpolation.
///
/// These functions transform a linear `t` value (0.0 to 1.0) to create
/// different acceleration/deceleration curves.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum Easing {
    /// Constant speed (no easing).
    #[default]
    Linear,
    /// Starts slow, accelerates (quadratic).
    QuadIn,
    /// Starts fast, decelerates (quadratic).
    QuadOut,
    /// Slow start and end (quadratic).
    QuadInOut,
    /// Starts slow, accelerates (cubic).
    CubicIn,
    /// Starts fast, decelerates (cubic).
    CubicOut,
    /// Slow start and end (cubic).
    CubicInOut,
}

/// Apply an easing function to a normalized time value.
///
/// The input `t` is clamped to [0.0, 1.0] and transformed according to the
/// easing curve.
pub fn ease(e: Easing, t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    match e {
        Easing::Linear => t,
        Easing::QuadIn => t * t,
        Easing::QuadOut => t * (2.0 - t),
        Easing::QuadInOut => {
            if t < 0.5 {
                2.0 * t * t
            } else {
                -1.0 + (4.0 - 2.0 * t) * t
            }
        }
        Easing::CubicIn => t * t * t,
        Easing::CubicOut => {
            let p = t - 1.0;
            p * p * p + 1.0
        }
        Easing::CubicInOut => {
            if t < 0.5 {
                4.0 * t * t * t
            } else {
                let p = 2.0 * t - 2.0;
                0.5 * p * p * p + 1.0
            }
        }
    }
}

/// Linearly interpolate between two floats.
#[inline]
pub fn lerp_f32(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Identity of an object that tweens can be grouped by.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TweenTarget(u64);

impl TweenTarget {
    /// Allocate a fresh, process-unique target id.
    pub fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        TweenTarget(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

/// Identity of a single started tween.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TweenId(u64);

/// A pending interpolation, configured builder-style and handed to
/// [`Tweener::start`].
pub struct Tween {
    target: Option<TweenTarget>,
    duration: f32,
    elapsed: f32,
    easing: Easing,
    ignore_time_scale: bool,
    token: CancellationToken,
    apply: Box<dyn FnMut(f32)>,
    on_complete: Option<Box<dyn FnOnce()>>,
}

impl Tween {
    /// Create a tween calling `apply` with the eased progress every tick.
    pub fn new(duration: f32, apply: impl FnMut(f32) + 'static) -> Self {
        Self {
            target: None,
            duration: duration.max(0.0),
            elapsed: 0.0,
            easing: Easing::Linear,
            ignore_time_scale: false,
            token: CancellationToken::none(),
            apply: Box::new(apply),
            on_complete: None,
        }
    }

    /// Interpolate a free-standing value from `from` to `to`.
    pub fn float(from: f32, to: f32, duration: f32, mut set: impl FnMut(f32) + 'static) -> Self {
        Self::new(duration, move |t| set(lerp_f32(from, to, t)))
    }

    pub fn with_target(mut self, target: TweenTarget) -> Self {
        self.target = Some(target);
        self
    }

    pub fn with_easing(mut self, easing: Easing) -> Self {
        self.easing = easing;
        self
    }

    /// Advance with unscaled time, so the tween keeps running while the
    /// game is paused.
    pub fn ignore_time_scale(mut self) -> Self {
        self.ignore_time_scale = true;
        self
    }

    /// Drop the tween silently once `token` is cancelled.
    pub fn with_cancellation(mut self, token: &CancellationToken) -> Self {
        self.token = token.clone();
        self
    }

    pub fn on_complete(mut self, callback: impl FnOnce() + 'static) -> Self {
        self.on_complete = Some(Box::new(callback));
        self
    }

    #[inline]
    pub fn duration(&self) -> f32 {
        self.duration
    }
}

struct Running {
    id: TweenId,
    tween: Tween,
    finished: bool,
}

#[derive(Default)]
struct TweenerInner {
    running: Vec<Running>,
    next_id: u64,
}

/// Shared handle to the set of running tweens.
///
/// Cloning is cheap; all clones drive the same tweens. The host calls
/// [`Tweener::tick`] once per frame.
#[derive(Clone, Default)]
pub struct Tweener {
    inner: Rc<RefCell<TweenerInner>>,
}

impl Tweener {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a tween. It first advances on the next tick.
    pub fn start(&self, tween: Tween) -> TweenId {
        let mut inner = self.inner.borrow_mut();
        inner.next_id += 1;
        let id = TweenId(inner.next_id);
        inner.running.push(Running {
            id,
            tween,
            finished: false,
        });
        id
    }

    /// Kill every tween tagged with `target`. Their completion callbacks
    /// never run. Returns the number of tweens killed.
    pub fn kill(&self, target: TweenTarget) -> usize {
        let mut inner = self.inner.borrow_mut();
        let before = inner.running.len();
        inner.running.retain(|r| r.tween.target != Some(target));
        before - inner.running.len()
    }

    /// Kill a single tween. Returns false if it already finished.
    pub fn kill_tween(&self, id: TweenId) -> bool {
        let mut inner = self.inner.borrow_mut();
        let before = inner.running.len();
        inner.running.retain(|r| r.id != id);
        before != inner.running.len()
    }

    /// Whether any tween tagged with `target` is still running.
    pub fn is_tweening(&self, target: TweenTarget) -> bool {
        self.inner
            .borrow()
            .running
            .iter()
            .any(|r| r.tween.target == Some(target))
    }

    /// Number of running tweens.
    pub fn active_count(&self) -> usize {
        self.inner.borrow().running.len()
    }

    /// Advance all tweens, then run completion callbacks.
    ///
    /// Callbacks run one at a time with no borrow held, so they may start or
    /// kill tweens. A finished tween killed by an earlier callback in the
    /// same tick does not get its callback.
    pub fn tick(&self, time: FrameTime) {
        let mut running = std::mem::take(&mut self.inner.borrow_mut().running);

        running.retain_mut(|r| {
            if r.tween.token.is_cancelled() {
                return false;
            }
            let tween = &mut r.tween;
            tween.elapsed += time.delta_for(tween.ignore_time_scale);
            let t = if tween.duration <= 0.0 {
                1.0
            } else {
                (tween.elapsed / tween.duration).min(1.0)
            };
            (tween.apply)(ease(tween.easing, t));
            r.finished = t >= 1.0;
            true
        });

        {
            let mut inner = self.inner.borrow_mut();
            running.append(&mut inner.running);
            inner.running = running;
        }

        while let Some(finished) = self.take_finished() {
            if finished.tween.token.is_cancelled() {
                continue;
            }
            if let Some(callback) = finished.tween.on_complete {
                callback();
            }
        }
    }

    fn take_finished(&self) -> Option<Running> {
        let mut inner = self.inner.borrow_mut();
        let index = inner.running.iter().position(|r| r.finished)?;
        Some(inner.running.remove(index))
    }
}
