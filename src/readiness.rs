//! Polling one-shot readiness barrier.
//!
//! A gate holds an ordered list of checks and a queue of callbacks. Checks
//! are evaluated once synchronously at construction and then on a scheduler
//! interval; the first evaluation pass in which every check holds stops the
//! polling, fires the queued callbacks exactly once in registration order,
//! and latches the gate ready. Callbacks pushed afterwards run immediately.
//!
//! There is no cancellation and no failure state: a gate whose checks never
//! pass keeps polling, a known resource leak.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;
use std::time::Duration;

use tracing::{debug, trace};

use crate::error::{Error, Result};
use crate::render::Host;
use crate::schedule::{Scheduler, TimerId};

/// A single readiness condition: either an ad hoc predicate or a named,
/// parameterized check resolved against the [`CheckRegistry`].
pub enum ReadinessCheck {
    Predicate(Rc<dyn Fn() -> bool>),
    Named { name: String, arg: String },
}

impl ReadinessCheck {
    pub fn predicate(test: impl Fn() -> bool + 'static) -> Self {
        Self::Predicate(Rc::new(test))
    }

    pub fn named(name: impl Into<String>, arg: impl Into<String>) -> Self {
        Self::Named {
            name: name.into(),
            arg: arg.into(),
        }
    }
}

impl Clone for ReadinessCheck {
    fn clone(&self) -> Self {
        match self {
            Self::Predicate(test) => Self::Predicate(Rc::clone(test)),
            Self::Named { name, arg } => Self::Named {
                name: name.clone(),
                arg: arg.clone(),
            },
        }
    }
}

/// Fixed registry of named parameterized checks.
///
/// The stock registry carries `attached`: is the given logical id currently
/// attached to the visible document.
pub struct CheckRegistry {
    checks: HashMap<String, Rc<dyn Fn(&str) -> bool>>,
}

impl CheckRegistry {
    pub fn new() -> Self {
        Self {
            checks: HashMap::new(),
        }
    }

    pub fn with_host(host: Rc<dyn Host>) -> Self {
        let mut registry = Self::new();
        registry.register("attached", move |id| host.contains(id));
        registry
    }

    pub fn register(&mut self, name: impl Into<String>, check: impl Fn(&str) -> bool + 'static) {
        self.checks.insert(name.into(), Rc::new(check));
    }

    /// Fail fast when a named check is not registered.
    pub fn validate(&self, check: &ReadinessCheck) -> Result<()> {
        match check {
            ReadinessCheck::Predicate(_) => Ok(()),
            ReadinessCheck::Named { name, .. } => {
                if self.checks.contains_key(name) {
                    Ok(())
                } else {
                    Err(Error::UnknownCheck(name.clone()))
                }
            }
        }
    }

    fn evaluate(&self, check: &ReadinessCheck) -> bool {
        match check {
            ReadinessCheck::Predicate(test) => test(),
            ReadinessCheck::Named { name, arg } => self
                .checks
                .get(name)
                .map(|check| check(arg))
                .unwrap_or(false),
        }
    }
}

impl Default for CheckRegistry {
    fn default() -> Self {
        Self::new()
    }
}

struct GateInner {
    checks: Vec<ReadinessCheck>,
    registry: Rc<CheckRegistry>,
    scheduler: Scheduler,
    ready: Cell<bool>,
    timer: Cell<Option<TimerId>>,
    callbacks: RefCell<Vec<Box<dyn FnOnce()>>>,
}

impl GateInner {
    fn all_pass(&self) -> bool {
        self.checks.iter().all(|check| self.registry.evaluate(check))
    }

    fn fire(&self) {
        if let Some(id) = self.timer.take() {
            self.scheduler.clear_interval(id);
        }
        self.ready.set(true);
        let callbacks: Vec<Box<dyn FnOnce()>> = self.callbacks.borrow_mut().drain(..).collect();
        debug!(target: "viewtree::readiness", callbacks = callbacks.len(), "gate ready");
        for callback in callbacks {
            callback();
        }
    }
}

pub struct ReadinessGate {
    inner: Rc<GateInner>,
}

impl ReadinessGate {
    /// Build a gate and evaluate it once synchronously. Named checks that are
    /// not in the registry fail fast. If the checks do not yet hold, a poll
    /// timer with `poll_interval` is registered on the scheduler; the timer
    /// keeps the gate alive until it passes, independent of the returned
    /// handle.
    pub fn new(
        scheduler: &Scheduler,
        registry: Rc<CheckRegistry>,
        checks: Vec<ReadinessCheck>,
        initial: Option<Box<dyn FnOnce()>>,
        poll_interval: Duration,
    ) -> Result<Self> {
        for check in &checks {
            registry.validate(check)?;
        }
        let inner = Rc::new(GateInner {
            checks,
            registry,
            scheduler: scheduler.clone(),
            ready: Cell::new(false),
            timer: Cell::new(None),
            callbacks: RefCell::new(Vec::new()),
        });
        if let Some(callback) = initial {
            inner.callbacks.borrow_mut().push(callback);
        }
        if inner.all_pass() {
            inner.fire();
        } else {
            trace!(target: "viewtree::readiness", "gate pending, polling");
            let poll_target = Rc::clone(&inner);
            let id = scheduler.set_interval(poll_interval, move || {
                if !poll_target.ready.get() && poll_target.all_pass() {
                    poll_target.fire();
                }
            });
            inner.timer.set(Some(id));
        }
        Ok(Self { inner })
    }

    pub fn is_ready(&self) -> bool {
        self.inner.ready.get()
    }

    /// Queue a callback, or run it immediately and synchronously when the
    /// gate is already ready.
    pub fn push(&self, callback: impl FnOnce() + 'static) {
        if self.inner.ready.get() {
            callback();
        } else {
            self.inner.callbacks.borrow_mut().push(Box::new(callback));
        }
    }

    pub fn push_all(&self, callbacks: Vec<Box<dyn FnOnce()>>) {
        for callback in callbacks {
            if self.inner.ready.get() {
                callback();
            } else {
                self.inner.callbacks.borrow_mut().push(callback);
            }
        }
    }
}
