//! Cooperative scheduler for timed delays and wait-until conditions.
//!
//! Nothing here runs on its own: the host calls [`Scheduler::tick`] once per
//! frame. A task whose token is cancelled is dropped without running its
//! callback.

use std::cell::RefCell;
use std::rc::Rc;

use crate::time::{CancellationToken, FrameTime};

enum Wait {
    Delay { remaining: f32, ignore_time_scale: bool },
    Until(Box<dyn FnMut() -> bool>),
}

struct Task {
    wait: Wait,
    token: CancellationToken,
    callback: Box<dyn FnOnce()>,
}

/// Shared handle to a queue of suspended tasks.
///
/// Cloning is cheap and every clone schedules into the same queue, so
/// callbacks can capture a clone and schedule their follow-up stage.
#[derive(Clone, Default)]
pub struct Scheduler {
    tasks: Rc<RefCell<Vec<Task>>>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `callback` once `seconds` have elapsed.
    ///
    /// With `ignore_time_scale` the delay counts unscaled time.
    pub fn delay(
        &self,
        seconds: f32,
        ignore_time_scale: bool,
        token: &CancellationToken,
        callback: impl FnOnce() + 'static,
    ) {
        self.push(Task {
            wait: Wait::Delay {
                remaining: seconds.max(0.0),
                ignore_time_scale,
            },
            token: token.clone(),
            callback: Box::new(callback),
        });
    }

    /// Run `callback` on the first tick where `condition` returns true.
    pub fn wait_until(
        &self,
        condition: impl FnMut() -> bool + 'static,
        token: &CancellationToken,
        callback: impl FnOnce() + 'static,
    ) {
        self.push(Task {
            wait: Wait::Until(Box::new(condition)),
            token: token.clone(),
            callback: Box::new(callback),
        });
    }

    fn push(&self, task: Task) {
        self.tasks.borrow_mut().push(task);
    }

    /// Number of tasks still waiting.
    pub fn pending(&self) -> usize {
        self.tasks.borrow().len()
    }

    /// Advance all waiting tasks and run the ones that became ready.
    ///
    /// Ready callbacks run in registration order after the queue borrow is
    /// released; work they schedule is first polled on the next tick.
    pub fn tick(&self, time: FrameTime) {
        let mut tasks = std::mem::take(&mut *self.tasks.borrow_mut());
        let mut ready = Vec::new();
        let mut waiting = Vec::with_capacity(tasks.len());

        for mut task in tasks.drain(..) {
            if task.token.is_cancelled() {
                continue;
            }
            let done = match &mut task.wait {
                Wait::Delay {
                    remaining,
                    ignore_time_scale,
                } => {
                    *remaining -= time.delta_for(*ignore_time_scale);
                    *remaining <= 0.0
                }
                Wait::Until(condition) => condition(),
            };
            if done {
                ready.push(task);
            } else {
                waiting.push(task);
            }
        }

        {
            let mut queue = self.tasks.borrow_mut();
            // Conditions may have scheduled work; keep older tasks first.
            waiting.append(&mut queue);
            *queue = waiting;
        }

        for task in ready {
            // An earlier callback in this tick may have cancelled the scope.
            if task.token.is_cancelled() {
                continue;
            }
            (task.callback)();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::CancelScope;
    use std::cell::Cell;

    fn recorder() -> (Rc<RefCell<Vec<&'static str>>>, impl Fn(&'static str) -> Box<dyn FnOnce()>) {
        let log = Rc::new(RefCell::new(Vec::new()));
        let sink = log.clone();
        (log, move |label| {
            let sink = sink.clone();
            Box::new(move || sink.borrow_mut().push(label)) as Box<dyn FnOnce()>
        })
    }

    #[test]
    fn test_delay_fires_once_after_time() {
        let scheduler = Scheduler::new();
        let (log, record) = recorder();
        scheduler.delay(0.25, false, &CancellationToken::none(), record("done"));

        scheduler.tick(FrameTime::new(0.1));
        scheduler.tick(FrameTime::new(0.1));
        assert!(log.borrow().is_empty());

        scheduler.tick(FrameTime::new(0.1));
        assert_eq!(*log.borrow(), vec!["done"]);
        assert_eq!(scheduler.pending(), 0);

        scheduler.tick(FrameTime::new(1.0));
        assert_eq!(log.borrow().len(), 1);
    }

    #[test]
    fn test_unscaled_delay_ignores_pause() {
        let scheduler = Scheduler::new();
        let (log, record) = recorder();
        let token = CancellationToken::none();
        scheduler.delay(0.1, true, &token, record("unscaled"));
        scheduler.delay(0.1, false, &token, record("scaled"));

        scheduler.tick(FrameTime::new(0.2).with_time_scale(0.0));
        assert_eq!(*log.borrow(), vec!["unscaled"]);
        assert_eq!(scheduler.pending(), 1);
    }

    #[test]
    fn test_ready_callbacks_run_in_registration_order() {
        let scheduler = Scheduler::new();
        let (log, record) = recorder();
        let token = CancellationToken::none();
        scheduler.delay(0.05, false, &token, record("first"));
        scheduler.wait_until(|| true, &token, record("second"));
        scheduler.delay(0.0, false, &token, record("third"));

        scheduler.tick(FrameTime::new(0.1));
        assert_eq!(*log.borrow(), vec!["first", "second", "third"]);
    }

    #[test]
    fn test_wait_until_polls_each_tick() {
        let scheduler = Scheduler::new();
        let (log, record) = recorder();
        let flag = Rc::new(Cell::new(false));
        let polled = flag.clone();
        scheduler.wait_until(move || polled.get(), &CancellationToken::none(), record("ready"));

        scheduler.tick(FrameTime::new(0.016));
        assert!(log.borrow().is_empty());

        flag.set(true);
        scheduler.tick(FrameTime::new(0.016));
        assert_eq!(*log.borrow(), vec!["ready"]);
    }

    #[test]
    fn test_cancelled_tasks_never_run() {
        let scheduler = Scheduler::new();
        let (log, record) = recorder();
        let scope = CancelScope::new();
        scheduler.delay(0.1, false, &scope.token(), record("cancelled"));
        scheduler.wait_until(|| true, &scope.token(), record("also cancelled"));

        scope.cancel();
        scheduler.tick(FrameTime::new(1.0));
        assert!(log.borrow().is_empty());
        assert_eq!(scheduler.pending(), 0);
    }

    #[test]
    fn test_cancel_from_earlier_callback_in_same_tick() {
        let scheduler = Scheduler::new();
        let (log, record) = recorder();
        let scope = Rc::new(CancelScope::new());
        let token = scope.token();

        let canceller = scope.clone();
        scheduler.delay(0.0, false, &CancellationToken::none(), move || canceller.cancel());
        scheduler.delay(0.0, false, &token, record("late"));

        scheduler.tick(FrameTime::new(0.1));
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn test_callback_can_schedule_follow_up() {
        let scheduler = Scheduler::new();
        let (log, _) = recorder();
        let inner = scheduler.clone();
        let sink = log.clone();
        scheduler.delay(0.1, false, &CancellationToken::none(), move || {
            sink.borrow_mut().push("stage one");
            let sink = sink.clone();
            inner.delay(0.1, false, &CancellationToken::none(), move || {
                sink.borrow_mut().push("stage two")
            });
        });

        scheduler.tick(FrameTime::new(0.1));
        assert_eq!(*log.borrow(), vec!["stage one"]);
        assert_eq!(scheduler.pending(), 1);

        scheduler.tick(FrameTime::new(0.1));
        assert_eq!(*log.borrow(), vec!["stage one", "stage two"]);
    }
}
