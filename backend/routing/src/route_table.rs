/// Action kind to destination mapping.
///
/// Filled once at startup and shared read-only afterwards, so lookups take no
/// lock.
use std::collections::HashMap;
use std::sync::Arc;

use modbot_core::Queuer;
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RouteError {
    #[error("action kind must not be empty")]
    EmptyKind,

    #[error("a route for action kind '{0}' is already registered")]
    Duplicate(String),

    #[error("no routes registered")]
    NoRoutes,
}

// ---------------------------------------------------------------------------
// Route table
// ---------------------------------------------------------------------------

#[derive(Default, Clone)]
pub struct RouteTable {
    routes: HashMap<String, Arc<dyn Queuer>>,
}

impl RouteTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `destination` for actions whose kind is exactly `kind`.
    pub fn register_route(
        &mut self,
        kind: impl Into<String>,
        destination: Arc<dyn Queuer>,
    ) -> Result<(), RouteError> {
        let kind = kind.into();
        if kind.is_empty() {
            return Err(RouteError::EmptyKind);
        }
        if self.routes.contains_key(&kind) {
            return Err(RouteError::Duplicate(kind));
        }
        info!(kind = %kind, destination = destination.name(), "Registered route");
        self.routes.insert(kind, destination);
        Ok(())
    }

    /// Case-sensitive exact match.
    pub fn lookup(&self, kind: &str) -> Option<&Arc<dyn Queuer>> {
        self.routes.get(kind)
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Registered kinds, sorted.
    pub fn kinds(&self) -> Vec<&str> {
        let mut kinds: Vec<&str> = self.routes.keys().map(String::as_str).collect();
        kinds.sort_unstable();
        kinds
    }
}

impl std::fmt::Debug for RouteTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RouteTable")
            .field("kinds", &self.kinds())
            .finish()
    }
}
