//! Collaborator seams for templating and container attachment.
//!
//! The markup compiler and the document it renders into are external to this
//! crate: components only ever hold a compiled render closure and talk to the
//! document through [`Host`].

use std::rc::Rc;

use thiserror::Error;

/// Plain key-value data snapshot handed to a compiled template.
pub type DataSnapshot = serde_json::Map<String, serde_json::Value>;

/// A compiled template: data snapshot in, markup out.
pub type Template = Rc<dyn Fn(&DataSnapshot) -> String>;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("template parse failed: {0}")]
    Parse(String),
}

/// Markup compiler collaborator.
pub trait Renderer {
    fn compile(&self, source: &str) -> Result<Template, RenderError>;
}

/// Container attachment collaborator.
///
/// Ids are logical identities, not markup: the host decides what "attached to
/// the visible document" means. `attach` replaces any output previously held
/// under the same id.
pub trait Host {
    fn attach(&self, id: &str, markup: &str);

    /// Empty the output under `id` but keep the slot attached. Used for view
    /// states, whose singletons persist across navigations.
    fn clear(&self, id: &str);

    /// Remove the slot entirely.
    fn detach(&self, id: &str);

    fn contains(&self, id: &str) -> bool;
}
