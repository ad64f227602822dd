//! The runtime context.
//!
//! Everything that used to be ambient (the document, the markup compiler,
//! the timer source, the module table) lives in one explicitly constructed
//! [`App`] handle that is passed to every operation. There are no
//! process-wide singletons.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use std::time::{Duration, Instant};

use tracing::debug;

use crate::component::{Component, ModuleSpec};
use crate::config::RuntimeConfig;
use crate::error::{Error, Result};
use crate::readiness::CheckRegistry;
use crate::render::{DataSnapshot, Host, Renderer};
use crate::schedule::Scheduler;

/// Factory producing a fresh [`ModuleSpec`] per instantiation.
pub type ModuleFactory = Rc<dyn Fn() -> ModuleSpec>;

/// How a registered module is built. A sealed pair of shapes instead of
/// probing what the registrant handed over: either a bare factory, or a
/// factory bundled with instantiation args and child-config overrides.
pub enum ModuleDescriptor {
    Factory(ModuleFactory),
    Configured {
        factory: ModuleFactory,
        args: DataSnapshot,
        child_config: HashMap<String, DataSnapshot>,
    },
}

struct AppInner {
    renderer: Rc<dyn Renderer>,
    host: Rc<dyn Host>,
    scheduler: Scheduler,
    checks: Rc<CheckRegistry>,
    config: RuntimeConfig,
    modules: RefCell<HashMap<String, ModuleDescriptor>>,
}

/// Cheap-clone handle to the runtime context.
#[derive(Clone)]
pub struct App {
    inner: Rc<AppInner>,
}

impl App {
    pub fn new(renderer: Rc<dyn Renderer>, host: Rc<dyn Host>, config: RuntimeConfig) -> Self {
        let checks = Rc::new(CheckRegistry::with_host(Rc::clone(&host)));
        Self {
            inner: Rc::new(AppInner {
                renderer,
                host,
                scheduler: Scheduler::new(),
                checks,
                config,
                modules: RefCell::new(HashMap::new()),
            }),
        }
    }

    pub fn renderer(&self) -> Rc<dyn Renderer> {
        Rc::clone(&self.inner.renderer)
    }

    pub fn host(&self) -> Rc<dyn Host> {
        Rc::clone(&self.inner.host)
    }

    pub fn scheduler(&self) -> Scheduler {
        self.inner.scheduler.clone()
    }

    pub fn checks(&self) -> Rc<CheckRegistry> {
        Rc::clone(&self.inner.checks)
    }

    pub fn config(&self) -> &RuntimeConfig {
        &self.inner.config
    }

    pub fn poll_interval(&self) -> Duration {
        self.inner.config.poll_interval()
    }

    /// Run queued work now. Production code pumps from the driver; tests call
    /// this directly.
    pub fn pump(&self) {
        self.inner.scheduler.pump(Instant::now());
    }

    pub fn register_module(&self, name: impl Into<String>, descriptor: ModuleDescriptor) {
        let name = name.into();
        debug!(target: "viewtree::app", module = %name, "module registered");
        self.inner.modules.borrow_mut().insert(name, descriptor);
    }

    /// Shorthand for registering a bare factory.
    pub fn register_factory(
        &self,
        name: impl Into<String>,
        factory: impl Fn() -> ModuleSpec + 'static,
    ) {
        self.register_module(name, ModuleDescriptor::Factory(Rc::new(factory)));
    }

    /// Build a fresh instance of the named module. Unknown names fail fast.
    pub fn instantiate(&self, name: &str) -> Result<Component> {
        let spec = {
            let modules = self.inner.modules.borrow();
            let descriptor = modules
                .get(name)
                .ok_or_else(|| Error::UnknownModule(name.to_string()))?;
            match descriptor {
                ModuleDescriptor::Factory(factory) => factory(),
                ModuleDescriptor::Configured {
                    factory,
                    args,
                    child_config,
                } => {
                    let mut spec = factory();
                    for (key, value) in args {
                        spec.data.insert(key.clone(), value.clone());
                    }
                    for (child, overrides) in child_config {
                        spec.child_config.insert(child.clone(), overrides.clone());
                    }
                    spec
                }
            }
        };
        spec.build(self)
    }
}
