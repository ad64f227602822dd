//! Cooperative single-threaded scheduler.
//!
//! Every suspension point in the crate funnels through this queue: fetch
//! completions, readiness-gate polls, and the child-enter cascade. Nothing
//! runs until the owner pumps, which keeps lifecycle re-entry deterministic.
//! Production code pumps from the [`crate::driver`], tests pump with explicit
//! instants.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;
use std::time::{Duration, Instant};

use tracing::trace;

/// Token returned by [`Scheduler::set_interval`]; required to cancel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerId(u64);

struct Timer {
    id: TimerId,
    period: Duration,
    due: Instant,
    callback: Rc<dyn Fn()>,
}

struct SchedulerInner {
    tasks: RefCell<VecDeque<Box<dyn FnOnce()>>>,
    timers: RefCell<Vec<Timer>>,
    next_timer: Cell<u64>,
}

#[derive(Clone)]
pub struct Scheduler {
    inner: Rc<SchedulerInner>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self {
            inner: Rc::new(SchedulerInner {
                tasks: RefCell::new(VecDeque::new()),
                timers: RefCell::new(Vec::new()),
                next_timer: Cell::new(1),
            }),
        }
    }

    /// Queue a one-shot task for the next pump.
    pub fn schedule(&self, task: impl FnOnce() + 'static) {
        self.inner.tasks.borrow_mut().push_back(Box::new(task));
    }

    /// Register a repeating timer. The first firing is one `period` after
    /// registration.
    pub fn set_interval(&self, period: Duration, callback: impl Fn() + 'static) -> TimerId {
        let id = TimerId(self.inner.next_timer.get());
        self.inner.next_timer.set(id.0 + 1);
        self.inner.timers.borrow_mut().push(Timer {
            id,
            period,
            due: Instant::now() + period,
            callback: Rc::new(callback),
        });
        id
    }

    pub fn clear_interval(&self, id: TimerId) -> bool {
        let mut timers = self.inner.timers.borrow_mut();
        let before = timers.len();
        timers.retain(|timer| timer.id != id);
        timers.len() != before
    }

    /// Run every queued task and every timer due at `now`. Tasks scheduled by
    /// running work (including timer callbacks) are drained in the same pump.
    pub fn pump(&self, now: Instant) {
        self.drain_tasks();
        self.run_due_timers(now);
        self.drain_tasks();
    }

    pub fn has_tasks(&self) -> bool {
        !self.inner.tasks.borrow().is_empty()
    }

    pub fn timer_count(&self) -> usize {
        self.inner.timers.borrow().len()
    }

    pub fn is_idle(&self) -> bool {
        !self.has_tasks() && self.timer_count() == 0
    }

    fn drain_tasks(&self) {
        loop {
            let task = self.inner.tasks.borrow_mut().pop_front();
            match task {
                Some(task) => task(),
                None => break,
            }
        }
    }

    fn run_due_timers(&self, now: Instant) {
        let due: Vec<(TimerId, Rc<dyn Fn()>)> = {
            let timers = self.inner.timers.borrow();
            timers
                .iter()
                .filter(|timer| timer.due <= now)
                .map(|timer| (timer.id, Rc::clone(&timer.callback)))
                .collect()
        };
        if !due.is_empty() {
            trace!(target: "viewtree::schedule", fired = due.len(), "timers due");
        }
        for (id, callback) in due {
            callback();
            // The callback may have cancelled itself; only surviving timers
            // are rearmed.
            let mut timers = self.inner.timers.borrow_mut();
            if let Some(timer) = timers.iter_mut().find(|timer| timer.id == id) {
                timer.due = now + timer.period;
            }
        }
    }
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}
