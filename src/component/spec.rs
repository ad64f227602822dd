//! Component construction spec.

use std::collections::HashMap;
use std::rc::Rc;

use crate::app::App;
use crate::component::{Component, Hooks, NoHooks};
use crate::data::DataSource;
use crate::error::Result;
use crate::readiness::ReadinessCheck;
use crate::render::DataSnapshot;

/// Everything needed to build a [`Component`]: identity, markup, data wiring,
/// and behavior. Factories registered with the app produce these.
pub struct ModuleSpec {
    pub(crate) name: String,
    pub(crate) id: Option<String>,
    pub(crate) tag: String,
    pub(crate) class_name: Option<String>,
    pub(crate) placeholder: Option<String>,
    pub(crate) template_source: Option<String>,
    pub(crate) data: DataSnapshot,
    pub(crate) fetch_params: DataSnapshot,
    pub(crate) data_source: Option<Rc<dyn DataSource>>,
    pub(crate) skip_enter: bool,
    pub(crate) child_config: HashMap<String, DataSnapshot>,
    pub(crate) readiness: Vec<ReadinessCheck>,
    pub(crate) hooks: Box<dyn Hooks>,
}

impl ModuleSpec {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            id: None,
            tag: "div".to_string(),
            class_name: None,
            placeholder: None,
            template_source: None,
            data: DataSnapshot::new(),
            fetch_params: DataSnapshot::new(),
            data_source: None,
            skip_enter: false,
            child_config: HashMap::new(),
            readiness: Vec::new(),
            hooks: Box::new(NoHooks),
        }
    }

    /// Fix the component id instead of generating one.
    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = tag.into();
        self
    }

    pub fn class_name(mut self, class_name: impl Into<String>) -> Self {
        self.class_name = Some(class_name.into());
        self
    }

    /// Content shown in the placeholder slot until the first render lands.
    pub fn placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = Some(placeholder.into());
        self
    }

    /// Template source, compiled through the app's renderer at build time.
    pub fn template(mut self, source: impl Into<String>) -> Self {
        self.template_source = Some(source.into());
        self
    }

    pub fn data(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.data.insert(key.into(), value);
        self
    }

    /// Request parameters sent with every fetch this component issues.
    pub fn fetch_param(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.fetch_params.insert(key.into(), value);
        self
    }

    pub fn data_source(mut self, source: Rc<dyn DataSource>) -> Self {
        self.data_source = Some(source);
        self
    }

    /// Opt this component out of the enter machinery entirely: `handle_enter`
    /// becomes a no-op.
    pub fn skip_enter(mut self, skip: bool) -> Self {
        self.skip_enter = skip;
        self
    }

    /// Data overrides applied to the named child when it is spawned from
    /// this component.
    pub fn child_config(mut self, child: impl Into<String>, overrides: DataSnapshot) -> Self {
        self.child_config.insert(child.into(), overrides);
        self
    }

    /// Extra readiness condition gating this component's render, on top of
    /// the built-in attachment check.
    pub fn readiness_check(mut self, check: ReadinessCheck) -> Self {
        self.readiness.push(check);
        self
    }

    pub fn hooks(mut self, hooks: impl Hooks + 'static) -> Self {
        self.hooks = Box::new(hooks);
        self
    }

    pub fn build(self, app: &App) -> Result<Component> {
        Component::from_spec(self, app, false)
    }
}
