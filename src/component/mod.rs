//! Component lifecycle.
//!
//! Every node in the view tree runs the same state machine:
//!
//! ```text
//! unrendered ──enter──▶ rendering ──output attached──▶ ready ──▶ loaded
//!      ▲                                                           │
//!      └────────────────────── cleanup ◀───────────────────────────┘
//! ```
//!
//! crossed with an `active` entry flag. `ready` means this component's own
//! output is attached; `loaded` additionally means every currently registered
//! child is loaded, recomputed on every child completion. Overridable
//! behavior lives behind the narrow [`Hooks`] trait; the shared machinery is
//! not virtual.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::{Rc, Weak};

use tracing::{debug, trace, warn};
use uuid::Uuid;

use crate::app::App;
use crate::data::{DataSource, FetchCompletion, FetchError, FetchRequest};
use crate::error::{Error, Result};
use crate::event::{EventChannel, SubscriptionId};
use crate::readiness::{ReadinessCheck, ReadinessGate};
use crate::registry::OrderedRegistry;
use crate::render::{DataSnapshot, Template};

mod hooks;
mod spec;

pub use hooks::{Hooks, NoHooks};
pub use spec::ModuleSpec;

/// Render status. `Ready` means own output is attached; `Loaded` additionally
/// means every currently registered child is loaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Unrendered,
    Rendering,
    Ready,
    Loaded,
}

impl Status {
    /// Own render complete, children aside.
    pub fn is_rendered(self) -> bool {
        matches!(self, Status::Ready | Status::Loaded)
    }
}

struct LifecycleCore {
    id: String,
    name: String,
    status: Status,
    active: bool,
    is_view: bool,
    skip_enter: bool,
    tag: String,
    class_name: Option<String>,
    placeholder: Option<String>,
    template: Option<Template>,
    data: DataSnapshot,
    fetch_params: DataSnapshot,
    data_source: Option<Rc<dyn DataSource>>,
    readiness: Vec<ReadinessCheck>,
    child_config: HashMap<String, DataSnapshot>,
    children: OrderedRegistry<String, Component>,
    parent: Option<WeakComponent>,
    // Subscriptions this component holds on its children's load channels;
    // detached on cleanup.
    child_load_subs: Vec<(String, SubscriptionId)>,
}

struct ComponentInner {
    core: RefCell<LifecycleCore>,
    hooks: RefCell<Box<dyn Hooks>>,
    ready_events: EventChannel<()>,
    load_events: EventChannel<()>,
    error_events: EventChannel<FetchError>,
}

/// Cheap-clone handle to one lifecycle node.
#[derive(Clone)]
pub struct Component {
    inner: Rc<ComponentInner>,
}

/// Non-owning back-reference; parent links use this so a subtree cannot keep
/// itself alive.
#[derive(Clone)]
pub struct WeakComponent(Weak<ComponentInner>);

impl WeakComponent {
    pub fn upgrade(&self) -> Option<Component> {
        self.0.upgrade().map(|inner| Component { inner })
    }
}

impl std::fmt::Debug for Component {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let core = self.inner.core.borrow();
        f.debug_struct("Component")
            .field("id", &core.id)
            .field("name", &core.name)
            .field("status", &core.status)
            .finish()
    }
}

impl Component {
    pub(crate) fn from_spec(spec: ModuleSpec, app: &App, is_view: bool) -> Result<Self> {
        let template = match &spec.template_source {
            Some(source) => {
                Some(
                    app.renderer()
                        .compile(source)
                        .map_err(|source| Error::Template {
                            name: spec.name.clone(),
                            source,
                        })?,
                )
            }
            None => None,
        };
        // View-state singletons get a stable id so containers can be wired up
        // ahead of time; plain modules get a generated one.
        let id = spec.id.unwrap_or_else(|| {
            if is_view {
                spec.name.clone()
            } else {
                format!("{}-{}", spec.name, Uuid::new_v4())
            }
        });
        trace!(target: "viewtree::component", %id, name = %spec.name, "built");
        Ok(Self {
            inner: Rc::new(ComponentInner {
                core: RefCell::new(LifecycleCore {
                    id,
                    name: spec.name,
                    status: Status::Unrendered,
                    active: false,
                    is_view,
                    skip_enter: spec.skip_enter,
                    tag: spec.tag,
                    class_name: spec.class_name,
                    placeholder: spec.placeholder,
                    template,
                    data: spec.data,
                    fetch_params: spec.fetch_params,
                    data_source: spec.data_source,
                    readiness: spec.readiness,
                    child_config: spec.child_config,
                    children: OrderedRegistry::new(),
                    parent: None,
                    child_load_subs: Vec::new(),
                }),
                hooks: RefCell::new(spec.hooks),
                ready_events: EventChannel::new(),
                load_events: EventChannel::new(),
                error_events: EventChannel::new(),
            }),
        })
    }

    pub fn id(&self) -> String {
        self.inner.core.borrow().id.clone()
    }

    pub fn name(&self) -> String {
        self.inner.core.borrow().name.clone()
    }

    pub fn status(&self) -> Status {
        self.inner.core.borrow().status
    }

    pub fn is_active(&self) -> bool {
        self.inner.core.borrow().active
    }

    pub fn data(&self) -> DataSnapshot {
        self.inner.core.borrow().data.clone()
    }

    pub fn set_data(&self, key: impl Into<String>, value: serde_json::Value) {
        self.inner.core.borrow_mut().data.insert(key.into(), value);
    }

    pub fn merge_data(&self, snapshot: DataSnapshot) {
        let mut core = self.inner.core.borrow_mut();
        for (key, value) in snapshot {
            core.data.insert(key, value);
        }
    }

    pub fn parent(&self) -> Option<Component> {
        self.inner.core.borrow().parent.clone()?.upgrade()
    }

    pub fn child(&self, id: &str) -> Option<Component> {
        self.inner.core.borrow().children.get(id).cloned()
    }

    pub fn children(&self) -> Vec<Component> {
        self.inner.core.borrow().children.to_vec()
    }

    pub fn downgrade(&self) -> WeakComponent {
        WeakComponent(Rc::downgrade(&self.inner))
    }

    pub fn ptr_eq(&self, other: &Component) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    /// Markup for the slot this component renders into, in the shape the
    /// host expects to attach before the first render lands.
    pub fn placeholder_markup(&self) -> String {
        let core = self.inner.core.borrow();
        let mut class = core.name.clone();
        if let Some(extra) = &core.class_name {
            class.push(' ');
            class.push_str(extra);
        }
        let content = core.placeholder.clone().unwrap_or_default();
        format!(
            "<{tag} id=\"{id}\" class=\"{class}\">{content}</{tag}>",
            tag = core.tag,
            id = core.id,
        )
    }

    /// Enter this component: run `before_enter`, start the render pipeline
    /// unless output is already attached, then run `enter` and mark active.
    ///
    /// Idempotent: an already-active or enter-skipping component returns
    /// immediately, with no re-render and no duplicate hook invocation.
    /// `enter` may run before output exists; hooks must not assume rendered
    /// output.
    pub fn handle_enter(&self, app: &App, args: &[String]) {
        {
            let core = self.inner.core.borrow();
            if core.active || core.skip_enter {
                trace!(
                    target: "viewtree::component",
                    id = %core.id,
                    active = core.active,
                    "enter skipped"
                );
                return;
            }
        }
        self.with_hooks(|hooks| hooks.before_enter(self, app, args));
        if !self.status().is_rendered() {
            self.start_pipeline(app, args);
        }
        self.with_hooks(|hooks| hooks.enter(self, app, args));
        self.inner.core.borrow_mut().active = true;
        debug!(target: "viewtree::component", id = %self.id(), "entered");
    }

    /// Insert `child` into the children registry and wire its containment
    /// parent (legal once). Re-registering the same child is a no-op.
    pub fn register_child(&self, child: &Component) -> Result<()> {
        child.set_parent(self)?;
        let child_id = child.id();
        let added = self
            .inner
            .core
            .borrow_mut()
            .children
            .add(child_id.clone(), child.clone());
        if !added {
            return Ok(());
        }
        // Loaded state is recomputed on every child completion, so late
        // finishers still bubble up.
        let parent = self.downgrade();
        let sub = child.inner.load_events.subscribe(move |_| {
            if let Some(parent) = parent.upgrade() {
                parent.recheck_loaded();
            }
        });
        self.inner
            .core
            .borrow_mut()
            .child_load_subs
            .push((child_id, sub));
        Ok(())
    }

    /// Instantiate a registered module by name, apply this component's
    /// child-config override for it, and register it.
    pub fn spawn_child(&self, app: &App, name: &str) -> Result<Component> {
        let child = app.instantiate(name)?;
        let overrides = self.inner.core.borrow().child_config.get(name).cloned();
        if let Some(overrides) = overrides {
            child.merge_data(overrides);
        }
        self.register_child(&child)?;
        Ok(child)
    }

    /// `spawn_child` plus placeholder attachment and immediate entry.
    pub fn append_child(&self, app: &App, name: &str, args: &[String]) -> Result<Component> {
        let child = self.spawn_child(app, name)?;
        app.host().attach(&child.id(), &child.placeholder_markup());
        child.handle_enter(app, args);
        Ok(child)
    }

    /// Run `callback` once output is attached, immediately if it already is.
    pub fn on_ready(&self, callback: impl FnOnce() + 'static) {
        if self.status().is_rendered() {
            callback();
            return;
        }
        let slot = RefCell::new(Some(callback));
        self.inner.ready_events.once(move |_| {
            if let Some(callback) = slot.borrow_mut().take() {
                callback();
            }
        });
    }

    pub fn on_load(&self, callback: impl Fn() + 'static) -> SubscriptionId {
        self.inner.load_events.subscribe(move |_| callback())
    }

    pub fn unsubscribe_load(&self, id: SubscriptionId) -> bool {
        self.inner.load_events.unsubscribe(id)
    }

    pub fn on_error(&self, callback: impl Fn(&FetchError) + 'static) -> SubscriptionId {
        self.inner.error_events.subscribe(callback)
    }

    pub fn unsubscribe_error(&self, id: SubscriptionId) -> bool {
        self.inner.error_events.unsubscribe(id)
    }

    /// Park this component: deactivate, detach the subscriptions it holds,
    /// destroy every child, and empty the children registry. Own mounted
    /// output is left intact.
    pub fn cleanup(&self, app: &App) {
        let (children, subs) = {
            let mut core = self.inner.core.borrow_mut();
            debug!(target: "viewtree::component", id = %core.id, "cleanup");
            core.active = false;
            core.status = Status::Unrendered;
            let subs = std::mem::take(&mut core.child_load_subs);
            (core.children.to_vec(), subs)
        };
        for (child_id, sub) in subs {
            if let Some(child) = children.iter().find(|child| child.id() == child_id) {
                child.inner.load_events.unsubscribe(sub);
            }
        }
        for child in &children {
            child.destroy(app);
        }
        self.inner.core.borrow_mut().children.clear();
    }

    /// Tear this component down: cleanup, drop every listener, discard own
    /// output, and leave the containment parent's registry. View-state nodes
    /// are emptied rather than detached, since route singletons persist
    /// across navigations.
    pub fn destroy(&self, app: &App) {
        self.cleanup(app);
        self.inner.ready_events.clear();
        self.inner.load_events.clear();
        self.inner.error_events.clear();
        let (id, is_view, parent) = {
            let core = self.inner.core.borrow();
            (core.id.clone(), core.is_view, core.parent.clone())
        };
        if is_view {
            app.host().clear(&id);
        } else {
            app.host().detach(&id);
        }
        if let Some(parent) = parent.and_then(|weak| weak.upgrade()) {
            parent.remove_child(&id);
        }
        debug!(target: "viewtree::component", %id, "destroyed");
    }

    /// Cleanup and re-enter. Cleanup resets the status, so the ready
    /// short-circuit cannot suppress the fresh render.
    pub fn refresh(&self, app: &App, args: &[String]) {
        self.cleanup(app);
        self.handle_enter(app, args);
    }

    pub(crate) fn set_parent(&self, parent: &Component) -> Result<()> {
        let mut core = self.inner.core.borrow_mut();
        match &core.parent {
            Some(existing) => {
                let same = existing
                    .upgrade()
                    .map(|current| current.ptr_eq(parent))
                    .unwrap_or(false);
                if same {
                    Ok(())
                } else {
                    Err(Error::ParentAlreadySet {
                        id: core.id.clone(),
                    })
                }
            }
            None => {
                core.parent = Some(parent.downgrade());
                Ok(())
            }
        }
    }

    pub(crate) fn remove_child(&self, id: &str) {
        let mut core = self.inner.core.borrow_mut();
        core.children.remove(id);
        core.child_load_subs.retain(|(child_id, _)| child_id != id);
    }

    pub(crate) fn run_transition(&self, app: &App) {
        self.with_hooks(|hooks| hooks.transition(self, app));
    }

    /// Hook-only entry used by the reconciliation algorithm: `before_enter`
    /// and `enter` without touching the pipeline or the active flag.
    pub(crate) fn enter_hooks_direct(&self, app: &App, args: &[String]) {
        self.with_hooks(|hooks| {
            hooks.before_enter(self, app, args);
            hooks.enter(self, app, args);
        });
    }

    fn with_hooks(&self, run: impl FnOnce(&mut dyn Hooks)) {
        let mut hooks = self.inner.hooks.borrow_mut();
        run(hooks.as_mut());
    }

    fn start_pipeline(&self, app: &App, args: &[String]) {
        let source = {
            let mut core = self.inner.core.borrow_mut();
            core.status = Status::Rendering;
            core.data_source.clone()
        };
        match source {
            Some(source) => {
                let request = {
                    let core = self.inner.core.borrow();
                    FetchRequest {
                        params: core.fetch_params.clone(),
                        args: args.to_vec(),
                    }
                };
                let this = self.clone();
                let app_handle = app.clone();
                let args = args.to_vec();
                let completion = FetchCompletion::new(
                    app.scheduler(),
                    Box::new(move |outcome| match outcome {
                        Ok(snapshot) => {
                            this.merge_data(snapshot);
                            this.finish_pipeline(&app_handle, &args);
                        }
                        Err(error) => this.fail_pipeline(error),
                    }),
                );
                source.fetch(request, completion);
            }
            None => self.finish_pipeline(app, args),
        }
    }

    fn finish_pipeline(&self, app: &App, args: &[String]) {
        let (id, extra) = {
            let core = self.inner.core.borrow();
            (core.id.clone(), core.readiness.clone())
        };
        let mut checks = vec![ReadinessCheck::named("attached", &id)];
        checks.extend(extra);
        let this = self.clone();
        let app_handle = app.clone();
        let args = args.to_vec();
        let gate = ReadinessGate::new(
            &app.scheduler(),
            app.checks(),
            checks,
            Some(Box::new(move || this.complete_render(&app_handle, &args))),
            app.poll_interval(),
        );
        // The gate keeps itself alive through its poll timer; the handle is
        // not needed.
        if let Err(error) = gate {
            warn!(target: "viewtree::component", %id, %error, "render pipeline aborted");
            self.inner.core.borrow_mut().status = Status::Unrendered;
        }
    }

    /// Explicit failure outcome for the pipeline: report and unblock instead
    /// of suspending the subtree forever.
    fn fail_pipeline(&self, error: FetchError) {
        {
            let mut core = self.inner.core.borrow_mut();
            core.status = Status::Unrendered;
            warn!(
                target: "viewtree::component",
                id = %core.id,
                %error,
                "fetch failed, render pipeline unblocked with error"
            );
        }
        self.inner.error_events.emit(&error);
    }

    fn complete_render(&self, app: &App, args: &[String]) {
        let (id, markup) = {
            let core = self.inner.core.borrow();
            let markup = core.template.as_ref().map(|template| template(&core.data));
            (core.id.clone(), markup)
        };
        if let Some(markup) = markup {
            app.host().attach(&id, &markup);
        }
        self.inner.core.borrow_mut().status = Status::Ready;
        debug!(target: "viewtree::component", %id, "ready");
        self.inner.ready_events.emit(&());
        let this = self.clone();
        let app_handle = app.clone();
        let args = args.to_vec();
        app.scheduler()
            .schedule(move || this.enter_children(&app_handle, &args));
        self.recheck_loaded();
    }

    fn enter_children(&self, app: &App, args: &[String]) {
        let pending = {
            let core = self.inner.core.borrow();
            core.children.filter(|child| !child.is_active())
        };
        for child in pending {
            child.handle_enter(app, args);
        }
    }

    /// Bottom-up loaded propagation: promote to `Loaded` when own render is
    /// complete and every currently registered child is loaded (vacuously
    /// true with none). Runs again on every child completion; the guard on
    /// `Ready` keeps the `load` event to a single emission.
    pub(crate) fn recheck_loaded(&self) {
        let load = {
            let core = self.inner.core.borrow();
            core.status == Status::Ready
                && core
                    .children
                    .iter()
                    .all(|(_, child)| child.status() == Status::Loaded)
        };
        if !load {
            return;
        }
        self.inner.core.borrow_mut().status = Status::Loaded;
        debug!(target: "viewtree::component", id = %self.id(), "loaded");
        self.inner.load_events.emit(&());
    }
}
