//! Shared test utilities and mock collaborators.

#![allow(dead_code, unused_imports)]

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use std::time::{Duration, Instant};

use viewtree::{
    App, Component, DataSnapshot, DataSource, FetchCompletion, FetchError, FetchRequest, Hooks,
    Host, RenderError, Renderer, RuntimeConfig, Template,
};

/// In-memory document: a map of attached slots.
pub struct TestHost {
    slots: RefCell<HashMap<String, String>>,
}

impl TestHost {
    pub fn new() -> Rc<Self> {
        Rc::new(Self {
            slots: RefCell::new(HashMap::new()),
        })
    }

    pub fn markup(&self, id: &str) -> Option<String> {
        self.slots.borrow().get(id).cloned()
    }

    /// Pre-attach an empty slot, the way a surrounding page would provide a
    /// container for a view state.
    pub fn provide_slot(&self, id: &str) {
        self.slots
            .borrow_mut()
            .insert(id.to_string(), String::new());
    }
}

impl Host for TestHost {
    fn attach(&self, id: &str, markup: &str) {
        self.slots
            .borrow_mut()
            .insert(id.to_string(), markup.to_string());
    }

    fn clear(&self, id: &str) {
        if let Some(slot) = self.slots.borrow_mut().get_mut(id) {
            slot.clear();
        }
    }

    fn detach(&self, id: &str) {
        self.slots.borrow_mut().remove(id);
    }

    fn contains(&self, id: &str) -> bool {
        self.slots.borrow().contains_key(id)
    }
}

/// Compiler doing `{key}` substitution from the data snapshot.
pub struct TestRenderer;

impl Renderer for TestRenderer {
    fn compile(&self, source: &str) -> Result<Template, RenderError> {
        let source = source.to_string();
        Ok(Rc::new(move |data: &DataSnapshot| {
            let mut out = source.clone();
            for (key, value) in data {
                let needle = format!("{{{key}}}");
                let text = match value {
                    serde_json::Value::String(text) => text.clone(),
                    other => other.to_string(),
                };
                out = out.replace(&needle, &text);
            }
            out
        }))
    }
}

/// Data source that parks every completion until the test resolves it.
pub struct ManualData {
    pending: RefCell<Vec<(FetchRequest, FetchCompletion)>>,
}

impl ManualData {
    pub fn new() -> Rc<Self> {
        Rc::new(Self {
            pending: RefCell::new(Vec::new()),
        })
    }

    pub fn pending(&self) -> usize {
        self.pending.borrow().len()
    }

    pub fn next_request(&self) -> Option<FetchRequest> {
        self.pending
            .borrow()
            .first()
            .map(|(request, _)| request.clone())
    }

    pub fn resolve_next(&self, outcome: Result<DataSnapshot, FetchError>) {
        let (_, completion) = self.pending.borrow_mut().remove(0);
        completion.resolve(outcome);
    }
}

impl DataSource for ManualData {
    fn fetch(&self, request: FetchRequest, completion: FetchCompletion) {
        self.pending.borrow_mut().push((request, completion));
    }
}

/// Shared, cloneable hook-call log.
#[derive(Clone, Default)]
pub struct CallLog(Rc<RefCell<Vec<String>>>);

impl CallLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, entry: impl Into<String>) {
        self.0.borrow_mut().push(entry.into());
    }

    pub fn entries(&self) -> Vec<String> {
        self.0.borrow().clone()
    }

    pub fn count_of(&self, entry: &str) -> usize {
        self.0.borrow().iter().filter(|seen| *seen == entry).count()
    }
}

/// Hooks that record every invocation as `tag:hook(args)`.
pub struct RecordingHooks {
    tag: String,
    log: CallLog,
}

impl RecordingHooks {
    pub fn new(tag: impl Into<String>, log: &CallLog) -> Self {
        Self {
            tag: tag.into(),
            log: log.clone(),
        }
    }
}

impl Hooks for RecordingHooks {
    fn before_enter(&mut self, _component: &Component, _app: &App, args: &[String]) {
        self.log
            .push(format!("{}:before_enter({})", self.tag, args.join(",")));
    }

    fn enter(&mut self, _component: &Component, _app: &App, args: &[String]) {
        self.log
            .push(format!("{}:enter({})", self.tag, args.join(",")));
    }

    fn transition(&mut self, _component: &Component, _app: &App) {
        self.log.push(format!("{}:transition", self.tag));
    }
}

/// App with fast polling and a shared in-memory host.
pub fn test_app() -> (App, Rc<TestHost>) {
    let host = TestHost::new();
    let config = RuntimeConfig {
        poll_interval_ms: 10,
        pump_tick_ms: 10,
    };
    let host_dyn: Rc<dyn Host> = host.clone();
    let app = App::new(Rc::new(TestRenderer), host_dyn, config);
    (app, host)
}

/// Run queued work plus every pending poll timer once.
pub fn pump(app: &App) {
    app.scheduler().pump(Instant::now() + Duration::from_secs(3600));
}

/// Pump a few rounds so multi-step cascades settle.
pub fn settle(app: &App) {
    for _ in 0..5 {
        pump(app);
    }
}

pub fn snapshot(pairs: &[(&str, &str)]) -> DataSnapshot {
    let mut map = DataSnapshot::new();
    for (key, value) in pairs {
        map.insert(
            (*key).to_string(),
            serde_json::Value::String((*value).to_string()),
        );
    }
    map
}
