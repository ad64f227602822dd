//! Behavior capability trait for enterable components.

use crate::app::App;
use crate::component::Component;

/// Overridable lifecycle behavior, narrowed to the three entry-related
/// hooks. Everything else about the lifecycle is fixed machinery.
///
/// Hooks run on the current thread with the component's state free to
/// borrow: `component` can be queried and its data mutated. Hooks must not
/// re-enter lifecycle operations (`handle_enter`, `cleanup`, navigation) on
/// the component they are running on.
pub trait Hooks {
    /// Runs before rendering begins; the place to inject data or config.
    fn before_enter(&mut self, _component: &Component, _app: &App, _args: &[String]) {}

    /// Entry notification. May run before any output exists; callers must
    /// not assume rendered output here.
    fn enter(&mut self, _component: &Component, _app: &App, _args: &[String]) {}

    /// In-place visual effect used instead of destruction when a navigation
    /// stays within a live context.
    fn transition(&mut self, _component: &Component, _app: &App) {}
}

/// The default behavior: every hook is a no-op.
pub struct NoHooks;

impl Hooks for NoHooks {}
