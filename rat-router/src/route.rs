//! Route descriptors and locations.
//!
//! A [`Route`] identifies where in the route tree a component sits. It is
//! opaque to guards: two routes are equal only if one was cloned from the
//! other, regardless of their paths. A [`Location`] describes where a pending
//! navigation is heading.

use std::num::NonZeroU64;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Global counter for generating unique route IDs.
static NEXT_ROUTE_ID: AtomicU64 = AtomicU64::new(1);

/// A process-unique identifier for a route.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RouteId(NonZeroU64);

impl RouteId {
    /// Generate a new unique RouteId.
    ///
    /// # Panics
    /// Panics if more than 2^64-1 routes are created.
    fn next() -> Self {
        let id = NEXT_ROUTE_ID.fetch_add(1, Ordering::Relaxed);
        // SAFETY: We start at 1 and only increment, so it's never zero.
        Self(NonZeroU64::new(id).unwrap_or_else(|| {
            panic!("RouteId overflow: created more than 2^64-1 routes")
        }))
    }

    /// Get the raw u64 value.
    pub fn as_u64(&self) -> u64 {
        self.0.get()
    }
}

impl std::fmt::Debug for RouteId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "RouteId({})", self.0)
    }
}

impl std::fmt::Display for RouteId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A node in the route tree.
///
/// Cloning is cheap and keeps the identity.
#[derive(Clone)]
pub struct Route {
    id: RouteId,
    path: Arc<str>,
}

impl Route {
    /// Create a new route. Every call yields a distinct identity.
    pub fn new(path: impl Into<Arc<str>>) -> Self {
        Self {
            id: RouteId::next(),
            path: path.into(),
        }
    }

    pub fn id(&self) -> RouteId {
        self.id
    }

    /// The path this route was declared with, for display and logging.
    pub fn path(&self) -> &str {
        &self.path
    }
}

impl PartialEq for Route {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Route {}

impl std::hash::Hash for Route {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl std::fmt::Debug for Route {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Route({}, {:?})", self.id, self.path)
    }
}

/// How a location was reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NavigationAction {
    #[default]
    Push,
    Replace,
    Pop,
}

/// A destination in the navigation history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    pub pathname: String,
    pub action: NavigationAction,
}

impl Location {
    pub fn new(pathname: impl Into<String>, action: NavigationAction) -> Self {
        Self {
            pathname: pathname.into(),
            action,
        }
    }
}

impl std::fmt::Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.pathname)
    }
}
