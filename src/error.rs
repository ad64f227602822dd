use thiserror::Error;

use crate::render::RenderError;

/// Errors surfaced by registration, lookup, and wiring operations.
///
/// Lookup failures are fail-fast and always name the missing identifier.
#[derive(Debug, Error)]
pub enum Error {
    #[error("unknown module '{0}'")]
    UnknownModule(String),

    #[error("unknown view state '{0}'")]
    UnknownViewState(String),

    #[error("no route matched '{0}'")]
    NoRouteMatched(String),

    #[error("unknown readiness check '{0}'")]
    UnknownCheck(String),

    #[error("component '{id}' already has a parent")]
    ParentAlreadySet { id: String },

    #[error("view state '{0}' already has a logical parent")]
    LogicalParentAlreadySet(String),

    #[error("template compile failed for '{name}': {source}")]
    Template {
        name: String,
        #[source]
        source: RenderError,
    },
}

pub type Result<T> = std::result::Result<T, Error>;
