//! Frame timing and cancellation scopes.
//!
//! The embedding application drives everything in this crate by passing a
//! [`FrameTime`] to each `tick`/`update` call. Pending work is bound to a
//! [`CancellationToken`]; cancelling its [`CancelScope`] abandons that work
//! without running any completion callback.

use std::cell::Cell;
use std::rc::Rc;

/// Elapsed time for one host frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameTime {
    /// Unscaled seconds since the previous frame
    pub unscaled_delta: f32,
    /// Global time scale (0.0 pauses scaled time)
    pub time_scale: f32,
}

impl FrameTime {
    pub fn new(unscaled_delta: f32) -> Self {
        Self {
            unscaled_delta,
            time_scale: 1.0,
        }
    }

    pub fn with_time_scale(mut self, time_scale: f32) -> Self {
        self.time_scale = time_scale;
        self
    }

    /// Scaled delta in seconds.
    #[inline]
    pub fn delta(&self) -> f32 {
        (self.unscaled_delta * self.time_scale).max(0.0)
    }

    /// Delta for work that either follows or ignores the time scale.
    #[inline]
    pub fn delta_for(&self, ignore_time_scale: bool) -> f32 {
        if ignore_time_scale {
            self.unscaled_delta.max(0.0)
        } else {
            self.delta()
        }
    }
}

impl Default for FrameTime {
    fn default() -> Self {
        Self::new(0.0)
    }
}

/// Read side of a cancellation scope.
///
/// Cloning shares the same flag.
#[derive(Clone, Debug, Default)]
pub struct CancellationToken {
    cancelled: Rc<Cell<bool>>,
}

impl CancellationToken {
    /// A token that is never cancelled.
    pub fn none() -> Self {
        Self::default()
    }

    #[inline]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.get()
    }
}

/// Owner of a cancellation flag.
///
/// Cancels its tokens when [`cancel`](Self::cancel) is called or when the
/// scope is dropped, mirroring an object whose destruction aborts all of
/// its pending suspensions.
#[derive(Debug, Default)]
pub struct CancelScope {
    token: CancellationToken,
}

impl CancelScope {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn token(&self) -> CancellationToken {
        self.token.clone()
    }

    pub fn cancel(&self) {
        self.token.cancelled.set(true);
    }

    #[inline]
    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }
}

impl Drop for CancelScope {
    fn drop(&mut self) {
        self.cancel();
    }
}
