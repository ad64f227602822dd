//! Route table and navigation reconciliation.
//!
//! The manager owns one long-lived [`ViewState`] per registered name and, on
//! every navigation, classifies the target against the currently active view
//! state to decide how much of the visible branch survives:
//!
//! ```text
//! first navigation        enter target
//! sibling                 transition, direct enter, cleanup previous
//! ancestor                transition only
//! same-context descendant transition, direct enter, cleanup previous
//! unrelated               destroy previous branch, bottom up
//! ```
//!
//! The only two classification signals are logical-parent identity and
//! positional-argument equality.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use tracing::debug;

use crate::app::App;
use crate::error::{Error, Result};
use crate::event::{EventChannel, SubscriptionId};
use crate::view::{ViewState, ViewStateSpec};

mod pattern;

pub use pattern::RoutePattern;

/// Notification emitted after every successful navigation.
#[derive(Debug, Clone)]
pub struct Navigated {
    pub name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Relation {
    Sibling,
    Ancestor,
    SameContextDescendant,
    Unrelated,
}

struct RouteEntry {
    pattern: RoutePattern,
    view: ViewState,
}

struct RouterInner {
    routes: RefCell<Vec<RouteEntry>>,
    view_states: RefCell<HashMap<String, ViewState>>,
    active: RefCell<Option<ViewState>>,
    last_args: RefCell<Vec<String>>,
    navigated: EventChannel<Navigated>,
}

/// Cheap-clone handle to the route manager.
#[derive(Clone)]
pub struct RouteManager {
    inner: Rc<RouterInner>,
}

impl RouteManager {
    pub fn new() -> Self {
        Self {
            inner: Rc::new(RouterInner {
                routes: RefCell::new(Vec::new()),
                view_states: RefCell::new(HashMap::new()),
                active: RefCell::new(None),
                last_args: RefCell::new(Vec::new()),
                navigated: EventChannel::new(),
            }),
        }
    }

    /// Get-or-create the singleton for `spec` and bind its pattern. Returns
    /// the existing instance untouched when the name is already registered.
    pub fn register(&self, app: &App, spec: ViewStateSpec) -> Result<ViewState> {
        let (view, created) = self.get_or_create(app, spec)?;
        if created {
            self.bind_route(&view);
        }
        Ok(view)
    }

    /// Like [`register`](Self::register), additionally wiring the logical
    /// parent before the route is bound, so the bound pattern carries the
    /// parent prefix. The parent must already be registered.
    pub fn register_child(
        &self,
        app: &App,
        spec: ViewStateSpec,
        parent_name: &str,
    ) -> Result<ViewState> {
        let parent = self
            .view_state(parent_name)
            .ok_or_else(|| Error::UnknownViewState(parent_name.to_string()))?;
        let (view, created) = self.get_or_create(app, spec)?;
        view.set_logical_parent(&parent)?;
        if created {
            self.bind_route(&view);
        }
        Ok(view)
    }

    pub fn view_state(&self, name: &str) -> Option<ViewState> {
        self.inner.view_states.borrow().get(name).cloned()
    }

    pub fn active_view_state(&self) -> Option<ViewState> {
        self.inner.active.borrow().clone()
    }

    /// Positional parameters from the previous successful navigation.
    pub fn last_route_args(&self) -> Vec<String> {
        self.inner.last_args.borrow().clone()
    }

    pub fn on_navigated(&self, callback: impl Fn(&Navigated) + 'static) -> SubscriptionId {
        self.inner.navigated.subscribe(callback)
    }

    pub fn unsubscribe_navigated(&self, id: SubscriptionId) -> bool {
        self.inner.navigated.unsubscribe(id)
    }

    /// Match `url` against the route table in registration order.
    pub fn match_url(&self, url: &str) -> Option<(ViewState, Vec<String>)> {
        let routes = self.inner.routes.borrow();
        for entry in routes.iter() {
            if let Some(args) = entry.pattern.matches(url) {
                return Some((entry.view.clone(), args));
            }
        }
        None
    }

    /// Resolve `url` and run the reconciliation algorithm against the
    /// currently active view state. Fails fast when nothing matches.
    pub fn navigate(&self, app: &App, url: &str) -> Result<()> {
        let (target, args) = self
            .match_url(url)
            .ok_or_else(|| Error::NoRouteMatched(url.to_string()))?;
        debug!(target: "viewtree::router", url, view = %target.name(), "navigation matched");
        self.reconcile(app, target, args);
        Ok(())
    }

    fn get_or_create(&self, app: &App, spec: ViewStateSpec) -> Result<(ViewState, bool)> {
        let name = spec.module.name.clone();
        if let Some(existing) = self.inner.view_states.borrow().get(&name) {
            return Ok((existing.clone(), false));
        }
        let view = ViewState::from_spec(spec, app)?;
        self.inner
            .view_states
            .borrow_mut()
            .insert(name, view.clone());
        Ok((view, true))
    }

    fn bind_route(&self, view: &ViewState) {
        let pattern = view.full_pattern();
        debug!(
            target: "viewtree::router",
            name = %view.name(),
            pattern = %pattern.text(),
            "route bound"
        );
        self.inner.routes.borrow_mut().push(RouteEntry {
            pattern,
            view: view.clone(),
        });
    }

    fn classify(&self, prev: &ViewState, target: &ViewState, args: &[String]) -> Relation {
        if target.is_sibling(prev) {
            return Relation::Sibling;
        }
        if target.is_parent_of(prev) {
            return Relation::Ancestor;
        }
        let same_context = {
            let last = self.inner.last_args.borrow();
            args.iter().zip(last.iter()).all(|(next, last)| next == last)
        };
        if prev.is_parent_of(target) && same_context {
            return Relation::SameContextDescendant;
        }
        Relation::Unrelated
    }

    fn reconcile(&self, app: &App, target: ViewState, args: Vec<String>) {
        let prev = self.inner.active.borrow().clone();
        if let Some(prev) = prev {
            let relation = self.classify(&prev, &target, &args);
            debug!(
                target: "viewtree::router",
                from = %prev.name(),
                to = %target.name(),
                ?relation,
                "reconciling"
            );
            match relation {
                // Moving up within a live context: soften, keep everything.
                Relation::Ancestor => prev.transition(app),
                // Moving sideways or deeper within a live context: soften,
                // enter the target eagerly, park the previous subtree while
                // its root stays mounted for reuse.
                Relation::Sibling | Relation::SameContextDescendant => {
                    prev.transition(app);
                    target.node().enter_hooks_direct(app, &args);
                    prev.cleanup(app);
                }
                // Leaving the context: tear down the whole previous branch.
                Relation::Unrelated => {
                    let mut cursor = Some(prev);
                    while let Some(state) = cursor {
                        state.destroy(app);
                        cursor = state.logical_parent();
                    }
                }
            }
        }
        *self.inner.last_args.borrow_mut() = args.clone();
        *self.inner.active.borrow_mut() = Some(target.clone());
        target.handle_enter(app, &args);
        self.inner.navigated.emit(&Navigated {
            name: target.name(),
        });
    }
}

impl Default for RouteManager {
    fn default() -> Self {
        Self::new()
    }
}
