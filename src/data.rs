//! Remote data collaborator seam.
//!
//! The transport is external; the crate only defines the request shape and a
//! completion handle. A completion resolves exactly once (enforced by move
//! semantics) and always carries an explicit outcome, so a failed fetch
//! reports instead of leaving the render pipeline suspended forever.

use std::rc::Rc;

use thiserror::Error;
use tracing::trace;

use crate::render::DataSnapshot;
use crate::schedule::Scheduler;

#[derive(Debug, Clone, Error)]
pub enum FetchError {
    #[error("transport error: {0}")]
    Transport(String),

    #[error("remote rejected request with status {0}")]
    Rejected(u16),
}

/// What a component sends along with a fetch: its configured request
/// parameters plus the positional route args of the navigation that
/// triggered the render.
#[derive(Debug, Clone)]
pub struct FetchRequest {
    pub params: DataSnapshot,
    pub args: Vec<String>,
}

/// One-shot completion handle for a fetch.
///
/// Delivery is routed through the scheduler, so the lifecycle is re-entered
/// cooperatively on the next pump rather than inside the transport's stack.
pub struct FetchCompletion {
    scheduler: Scheduler,
    deliver: Box<dyn FnOnce(Result<DataSnapshot, FetchError>)>,
}

impl FetchCompletion {
    pub(crate) fn new(
        scheduler: Scheduler,
        deliver: Box<dyn FnOnce(Result<DataSnapshot, FetchError>)>,
    ) -> Self {
        Self { scheduler, deliver }
    }

    /// Consume the handle with the fetch outcome.
    pub fn resolve(self, outcome: Result<DataSnapshot, FetchError>) {
        trace!(target: "viewtree::data", ok = outcome.is_ok(), "fetch resolved");
        let deliver = self.deliver;
        self.scheduler.schedule(move || deliver(outcome));
    }
}

/// Remote data collaborator. `fetch` must eventually resolve the completion
/// with a success or failure outcome; it must not block.
pub trait DataSource {
    fn fetch(&self, request: FetchRequest, completion: FetchCompletion);
}

/// Data source that resolves every fetch immediately with a fixed snapshot.
/// Useful as a stand-in where content is static but the pipeline shape should
/// match a fetching component.
pub struct StaticData {
    snapshot: DataSnapshot,
}

impl StaticData {
    pub fn new(snapshot: DataSnapshot) -> Rc<Self> {
        Rc::new(Self { snapshot })
    }
}

impl DataSource for StaticData {
    fn fetch(&self, _request: FetchRequest, completion: FetchCompletion) {
        completion.resolve(Ok(self.snapshot.clone()));
    }
}
