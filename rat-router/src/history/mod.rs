//! Navigation history.
//!
//! The [`History`] trait is the single entry point the leave-guard adapter
//! talks to. [`MemoryHistory`] is the in-process implementation used by the
//! terminal application.

pub mod memory;

pub use memory::MemoryHistory;

use crate::guard::LeaveGuard;
use crate::route::{Location, Route};
use std::collections::HashMap;

/// Detaches a leave guard. Must be called at most once.
pub type Unlisten = Box<dyn FnOnce() + Send>;

/// A navigation service that consults leave guards before leaving a route.
pub trait History: Send + Sync {
    /// Ask `guard` before every transition that leaves `route`.
    ///
    /// Several guards may listen on the same route; each returned [`Unlisten`]
    /// detaches only its own guard.
    fn listen_before_leaving_route(&self, route: &Route, guard: LeaveGuard) -> Unlisten;
}

/// Renders a leave prompt and returns the user's answer.
pub trait UserConfirmation {
    fn confirm(&mut self, message: &str) -> bool;
}

impl<F: FnMut(&str) -> bool> UserConfirmation for F {
    fn confirm(&mut self, message: &str) -> bool {
        self(message)
    }
}

/// Result of a navigation attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    /// The history moved to the given location.
    Completed(Location),
    /// The target is the current location; no guard was asked.
    Unchanged,
    /// A leave guard cancelled the transition.
    Cancelled,
    /// A leave guard prompted and the user declined.
    Declined,
    /// Going back with an empty history.
    NoHistory,
}

impl Transition {
    pub fn is_completed(&self) -> bool {
        matches!(self, Transition::Completed(_))
    }
}

/// Exact path lookup from a location to its route branch (root first).
#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    branches: HashMap<String, Vec<Route>>,
}

impl RouteTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare the routes active at `pathname`, outermost first.
    pub fn define(mut self, pathname: impl Into<String>, branch: impl IntoIterator<Item = Route>) -> Self {
        self.branches.insert(pathname.into(), branch.into_iter().collect());
        self
    }

    pub fn branch(&self, pathname: &str) -> Option<&[Route]> {
        self.branches.get(pathname).map(Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.branches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.branches.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_route_table_lookup() {
        let app = Route::new("/");
        let editor = Route::new("/editor");
        let table = RouteTable::new()
            .define("/", [app.clone()])
            .define("/editor", [app.clone(), editor.clone()]);

        assert_eq!(table.len(), 2);
        assert_eq!(table.branch("/editor"), Some(&[app, editor][..]));
        assert!(table.branch("/missing").is_none());
    }

    #[test]
    fn test_closure_confirmation() {
        let mut seen = Vec::new();
        let mut confirm = |message: &str| {
            seen.push(message.to_string());
            false
        };
        assert!(!UserConfirmation::confirm(&mut confirm, "Leave?"));
        assert_eq!(seen, vec!["Leave?".to_string()]);
    }
}
