//! Single-context view lifecycle with navigation reconciliation.
//!
//! A tree of stateful view components for a single-page client. On every
//! navigation the [`RouteManager`] compares the target against the currently
//! active [`ViewState`] and decides how much of the visible branch to
//! preserve, soft-transition, or tear down; components coordinate their own
//! asynchronous render-readiness through a polling [`ReadinessGate`].
//!
//! ```text
//!                 RouteManager ──reconcile──▶ ViewState ─┐
//!                                                        │ embeds
//!   DataSource ──fetch──▶ Component lifecycle ◀──────────┘
//!        Renderer/Host ──render/attach──▶ ready ──▶ loaded
//! ```
//!
//! Execution is single-threaded and cooperative: fetch completions and gate
//! polls re-enter the lifecycle only through the [`Scheduler`] pump, driven
//! in production by the tokio [`Driver`]. The runtime context is an explicit
//! [`App`] handle; nothing is process-wide.

mod app;
mod component;
mod config;
mod data;
mod driver;
mod error;
mod event;
mod logging;
mod readiness;
mod registry;
mod render;
mod router;
mod schedule;
mod view;

pub use app::{App, ModuleDescriptor, ModuleFactory};
pub use component::{Component, Hooks, ModuleSpec, NoHooks, Status, WeakComponent};
pub use config::{ConfigError, RuntimeConfig};
pub use data::{DataSource, FetchCompletion, FetchError, FetchRequest, StaticData};
pub use driver::Driver;
pub use error::{Error, Result};
pub use event::{EventChannel, SubscriptionId};
pub use logging::init_tracing;
pub use readiness::{CheckRegistry, ReadinessCheck, ReadinessGate};
pub use registry::OrderedRegistry;
pub use render::{DataSnapshot, Host, RenderError, Renderer, Template};
pub use router::{Navigated, RouteManager, RoutePattern};
pub use schedule::{Scheduler, TimerId};
pub use view::{ViewState, ViewStateSpec};
