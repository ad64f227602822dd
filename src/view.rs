//! View states: route-bound lifecycle nodes.
//!
//! A view state is a component singleton bound to a route pattern, with a
//! second hierarchy (the logical-parent chain) used only to classify
//! navigations. The logical parent is wired once, at registration; for view
//! states the containment link of the node coincides with it.

use std::cell::RefCell;
use std::rc::Rc;

use tracing::trace;

use crate::app::App;
use crate::component::{Component, ModuleSpec};
use crate::data::DataSource;
use crate::error::{Error, Result};
use crate::readiness::ReadinessCheck;
use crate::render::DataSnapshot;
use crate::router::{RouteManager, RoutePattern};

/// Construction spec for a [`ViewState`]: a [`ModuleSpec`] plus the route
/// pattern it answers to.
pub struct ViewStateSpec {
    pub(crate) module: ModuleSpec,
    pub(crate) route: RoutePattern,
}

impl ViewStateSpec {
    /// `path` is parsed as a literal or `:param` segment pattern.
    pub fn new(name: impl Into<String>, path: &str) -> Self {
        Self {
            module: ModuleSpec::new(name),
            route: RoutePattern::parse(path),
        }
    }

    /// `path` is used verbatim: matched as-is and never prefixed with the
    /// parent's pattern.
    pub fn with_raw_route(name: impl Into<String>, path: &str) -> Self {
        Self {
            module: ModuleSpec::new(name),
            route: RoutePattern::raw(path),
        }
    }

    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.module = self.module.id(id);
        self
    }

    pub fn template(mut self, source: impl Into<String>) -> Self {
        self.module = self.module.template(source);
        self
    }

    pub fn data(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.module = self.module.data(key, value);
        self
    }

    pub fn data_source(mut self, source: Rc<dyn DataSource>) -> Self {
        self.module = self.module.data_source(source);
        self
    }

    pub fn skip_enter(mut self, skip: bool) -> Self {
        self.module = self.module.skip_enter(skip);
        self
    }

    pub fn child_config(mut self, child: impl Into<String>, overrides: DataSnapshot) -> Self {
        self.module = self.module.child_config(child, overrides);
        self
    }

    pub fn readiness_check(mut self, check: ReadinessCheck) -> Self {
        self.module = self.module.readiness_check(check);
        self
    }

    pub fn hooks(mut self, hooks: impl crate::component::Hooks + 'static) -> Self {
        self.module = self.module.hooks(hooks);
        self
    }
}

struct ViewInner {
    node: Component,
    route: RoutePattern,
    logical_parent: RefCell<Option<ViewState>>,
}

/// Cheap-clone handle to a view-state singleton.
#[derive(Clone)]
pub struct ViewState {
    inner: Rc<ViewInner>,
}

impl std::fmt::Debug for ViewState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ViewState")
            .field("name", &self.inner.node.name())
            .finish()
    }
}

impl ViewState {
    pub(crate) fn from_spec(spec: ViewStateSpec, app: &App) -> Result<Self> {
        let node = Component::from_spec(spec.module, app, true)?;
        Ok(Self {
            inner: Rc::new(ViewInner {
                node,
                route: spec.route,
                logical_parent: RefCell::new(None),
            }),
        })
    }

    pub fn name(&self) -> String {
        self.inner.node.name()
    }

    /// The lifecycle node behind this view state.
    pub fn node(&self) -> &Component {
        &self.inner.node
    }

    pub fn route(&self) -> &RoutePattern {
        &self.inner.route
    }

    pub fn logical_parent(&self) -> Option<ViewState> {
        self.inner.logical_parent.borrow().clone()
    }

    pub fn ptr_eq(&self, other: &ViewState) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    pub(crate) fn set_logical_parent(&self, parent: &ViewState) -> Result<()> {
        {
            let current = self.inner.logical_parent.borrow();
            if let Some(current) = current.as_ref() {
                if current.ptr_eq(parent) {
                    return Ok(());
                }
                return Err(Error::LogicalParentAlreadySet(self.name()));
            }
        }
        // The containment link of the node coincides with the logical parent.
        self.inner.node.set_parent(parent.node())?;
        *self.inner.logical_parent.borrow_mut() = Some(parent.clone());
        Ok(())
    }

    /// True iff walking `other`'s logical-parent chain reaches `self`.
    pub fn is_parent_of(&self, other: &ViewState) -> bool {
        let mut cursor = other.logical_parent();
        while let Some(ancestor) = cursor {
            if ancestor.ptr_eq(self) {
                return true;
            }
            cursor = ancestor.logical_parent();
        }
        false
    }

    /// True iff both logical parents are present and identical.
    pub fn is_sibling(&self, other: &ViewState) -> bool {
        match (self.logical_parent(), other.logical_parent()) {
            (Some(mine), Some(theirs)) => mine.ptr_eq(&theirs),
            _ => false,
        }
    }

    pub fn is_active(&self, routes: &RouteManager) -> bool {
        routes
            .active_view_state()
            .map(|active| active.ptr_eq(self))
            .unwrap_or(false)
    }

    /// In-place visual effect used instead of destruction. Default no-op;
    /// override through [`crate::component::Hooks::transition`].
    pub fn transition(&self, app: &App) {
        trace!(target: "viewtree::view", name = %self.name(), "transition");
        self.inner.node.run_transition(app);
    }

    /// Enter this view state, cascading into the logical parent first so
    /// ancestors render before descendants. The cascade is safe because
    /// `handle_enter` is idempotent.
    pub fn handle_enter(&self, app: &App, args: &[String]) {
        if let Some(parent) = self.logical_parent() {
            parent.handle_enter(app, args);
        }
        self.inner.node.handle_enter(app, args);
    }

    pub fn cleanup(&self, app: &App) {
        self.inner.node.cleanup(app);
    }

    pub fn destroy(&self, app: &App) {
        self.inner.node.destroy(app);
    }

    /// The pattern this view state is routed under: raw patterns verbatim,
    /// anything else prefixed with the immediate logical parent's own
    /// pattern text.
    pub fn full_pattern(&self) -> RoutePattern {
        if self.inner.route.is_raw() {
            return self.inner.route.clone();
        }
        match self.logical_parent() {
            Some(parent) => {
                RoutePattern::parse(&format!("{}/{}", parent.route().text(), self.inner.route.text()))
            }
            None => self.inner.route.clone(),
        }
    }
}
