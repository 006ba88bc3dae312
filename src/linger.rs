//! Skeletal effect that holds its last pose, then fades away.
//!
//! When the skeleton's track completes, the track is frozen on its final
//! pose. Independently, `duration` unscaled seconds after the effect is
//! enabled its alpha fades from 1 to 0, the object is deactivated and the
//! alpha restored for the next use.

use std::cell::RefCell;
use std::rc::Rc;

use log::debug;

use crate::scheduler::Scheduler;
use crate::time::CancelScope;
use crate::tween::{Tween, Tweener};

/// Seconds the final fade takes.
pub const FADE_DURATION: f32 = 0.5;

/// The parts of a skeletal animation this effect drives.
pub trait Skeleton {
    fn set_alpha(&mut self, alpha: f32);
    fn set_active(&mut self, active: bool);
    /// Freeze the current track by setting its time scale to zero.
    fn pause_current_track(&mut self);
}

/// Fade-out-after-delay controller for a [`Skeleton`].
pub struct LingerEffect<S> {
    skeleton: Rc<RefCell<S>>,
    duration: f32,
    scheduler: Scheduler,
    tweener: Tweener,
    scope: CancelScope,
}

impl<S: Skeleton + 'static> LingerEffect<S> {
    pub fn new(skeleton: Rc<RefCell<S>>, duration: f32, scheduler: Scheduler, tweener: Tweener) -> Self {
        Self {
            skeleton,
            duration,
            scheduler,
            tweener,
            scope: CancelScope::new(),
        }
    }

    /// Start the countdown. Re-enabling restarts it.
    pub fn on_enable(&mut self) {
        self.scope = CancelScope::new();
        let token = self.scope.token();
        let skeleton = self.skeleton.clone();
        let tweener = self.tweener.clone();

        self.scheduler.delay(self.duration, true, &token.clone(), move || {
            debug!("linger: fading out");
            let fading = skeleton.clone();
            let done = skeleton;
            tweener.start(
                Tween::float(1.0, 0.0, FADE_DURATION, move |a| fading.borrow_mut().set_alpha(a))
                    .ignore_time_scale()
                    .with_cancellation(&token)
                    .on_complete(move || {
                        let mut skeleton = done.borrow_mut();
                        skeleton.set_active(false);
                        skeleton.set_alpha(1.0);
                    }),
            );
        });
    }

    /// Called by the host when the skeleton's track completes.
    pub fn on_track_complete(&self) {
        self.skeleton.borrow_mut().pause_current_track();
    }
}
