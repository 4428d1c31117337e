//! In-memory navigation history with leave guards.

use super::{History, RouteTable, Transition, Unlisten, UserConfirmation};
use crate::error::{Result, UnknownLocationSnafu};
use crate::guard::{LeaveGuard, LeaveVerdict};
use crate::route::{Location, NavigationAction, Route, RouteId};
use snafu::OptionExt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, info, warn};

struct Entry {
    location: Location,
    branch: Vec<Route>,
}

struct Listener {
    id: u64,
    route: RouteId,
    guard: LeaveGuard,
}

struct State {
    table: RouteTable,
    current: Entry,
    history: Vec<Entry>,
    listeners: Vec<Listener>,
    next_listener_id: u64,
    /// Bumped on every committed transition.
    generation: u64,
}

impl State {
    fn entry(&self, pathname: &str, action: NavigationAction) -> Result<Entry> {
        let branch = self
            .table
            .branch(pathname)
            .context(UnknownLocationSnafu { pathname })?
            .to_vec();
        Ok(Entry {
            location: Location::new(pathname, action),
            branch,
        })
    }

    /// Guards listening on routes of the current branch that `next` does not keep.
    fn leaving_guards(&self, next: &[Route]) -> Vec<LeaveGuard> {
        let leaving: Vec<RouteId> = self
            .current
            .branch
            .iter()
            .filter(|route| !next.contains(route))
            .map(Route::id)
            .collect();
        self.listeners
            .iter()
            .filter(|listener| leaving.contains(&listener.route))
            .map(|listener| Arc::clone(&listener.guard))
            .collect()
    }
}

enum Decision {
    Proceed,
    Cancelled,
    Declined,
}

/// Ask guards in registration order. The first verdict other than
/// [`LeaveVerdict::Allow`] decides.
fn ask_guards(guards: &[LeaveGuard], next: &Location, confirm: &mut dyn UserConfirmation) -> Decision {
    for guard in guards {
        match guard(Some(next)) {
            LeaveVerdict::Allow => continue,
            LeaveVerdict::Cancel => return Decision::Cancelled,
            LeaveVerdict::Prompt(message) => {
                return if confirm.confirm(&message) {
                    Decision::Proceed
                } else {
                    Decision::Declined
                };
            }
        }
    }
    Decision::Proceed
}

/// A guard or prompt navigated while this transition was waiting on it.
/// The newer transition stands.
fn superseded(state: &State, generation: u64, next: &Location) -> bool {
    if state.generation == generation {
        return false;
    }
    warn!(to = %next, now = %state.current.location, "transition superseded during leave prompt");
    true
}

/// A navigation history kept in memory.
///
/// Cloning yields another handle to the same history.
///
/// # Example
/// ```ignore
/// let home = Route::new("/");
/// let editor = Route::new("/editor");
/// let table = RouteTable::new()
///     .define("/", [home.clone()])
///     .define("/editor", [editor.clone()]);
///
/// let history = MemoryHistory::new(table, "/")?;
/// history.push("/editor", &mut |_: &str| true)?;
/// assert_eq!(history.location().pathname, "/editor");
/// ```
#[derive(Clone)]
pub struct MemoryHistory {
    state: Arc<Mutex<State>>,
}

impl MemoryHistory {
    /// Create a history positioned at `initial`.
    pub fn new(table: RouteTable, initial: &str) -> Result<Self> {
        let branch = table
            .branch(initial)
            .context(UnknownLocationSnafu { pathname: initial })?
            .to_vec();
        let current = Entry {
            location: Location::new(initial, NavigationAction::Push),
            branch,
        };
        Ok(Self {
            state: Arc::new(Mutex::new(State {
                table,
                current,
                history: Vec::new(),
                listeners: Vec::new(),
                next_listener_id: 1,
                generation: 0,
            })),
        })
    }

    // Guards never run while the lock is held.
    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// The current location.
    pub fn location(&self) -> Location {
        self.state().current.location.clone()
    }

    /// Routes active at the current location, outermost first.
    pub fn branch(&self) -> Vec<Route> {
        self.state().current.branch.clone()
    }

    /// Check whether `route` is part of the current branch.
    pub fn is_active(&self, route: &Route) -> bool {
        self.state().current.branch.contains(route)
    }

    /// Check if there's history to go back to.
    pub fn can_go_back(&self) -> bool {
        !self.state().history.is_empty()
    }

    /// Get the history length.
    pub fn history_len(&self) -> usize {
        self.state().history.len()
    }

    /// Number of attached leave guards.
    pub fn listener_count(&self) -> usize {
        self.state().listeners.len()
    }

    /// Navigate to `pathname`, pushing the current location onto the history.
    pub fn push(&self, pathname: &str, confirm: &mut dyn UserConfirmation) -> Result<Transition> {
        self.transition(pathname, NavigationAction::Push, confirm)
    }

    /// Navigate to `pathname`, replacing the current location.
    pub fn replace(&self, pathname: &str, confirm: &mut dyn UserConfirmation) -> Result<Transition> {
        self.transition(pathname, NavigationAction::Replace, confirm)
    }

    /// Go back to the previous location.
    pub fn go_back(&self, confirm: &mut dyn UserConfirmation) -> Result<Transition> {
        let (next, guards, generation) = {
            let state = self.state();
            let Some(previous) = state.history.last() else {
                return Ok(Transition::NoHistory);
            };
            let next = state.entry(&previous.location.pathname, NavigationAction::Pop)?;
            let guards = state.leaving_guards(&next.branch);
            (next, guards, state.generation)
        };

        if let Some(outcome) = self.decide(&guards, &next.location, confirm) {
            return Ok(outcome);
        }

        let mut state = self.state();
        if superseded(&state, generation, &next.location) {
            return Ok(Transition::Cancelled);
        }
        state.generation += 1;
        state.history.pop();
        let location = next.location.clone();
        state.current = next;
        info!(to = %location, "navigated back");
        Ok(Transition::Completed(location))
    }

    fn transition(
        &self,
        pathname: &str,
        action: NavigationAction,
        confirm: &mut dyn UserConfirmation,
    ) -> Result<Transition> {
        let (next, guards, generation) = {
            let state = self.state();
            let next = state.entry(pathname, action)?;
            if state.current.location.pathname == pathname {
                return Ok(Transition::Unchanged);
            }
            let guards = state.leaving_guards(&next.branch);
            (next, guards, state.generation)
        };

        if let Some(outcome) = self.decide(&guards, &next.location, confirm) {
            return Ok(outcome);
        }

        let mut state = self.state();
        if superseded(&state, generation, &next.location) {
            return Ok(Transition::Cancelled);
        }
        state.generation += 1;
        let location = next.location.clone();
        let previous = std::mem::replace(&mut state.current, next);
        info!(from = %previous.location, to = %location, ?action, "navigated");
        if action == NavigationAction::Push {
            state.history.push(previous);
        }
        Ok(Transition::Completed(location))
    }

    /// `None` when the transition may proceed.
    fn decide(
        &self,
        guards: &[LeaveGuard],
        next: &Location,
        confirm: &mut dyn UserConfirmation,
    ) -> Option<Transition> {
        match ask_guards(guards, next, confirm) {
            Decision::Proceed => None,
            Decision::Cancelled => {
                warn!(to = %next, "transition cancelled by leave guard");
                Some(Transition::Cancelled)
            }
            Decision::Declined => {
                warn!(to = %next, "transition declined at prompt");
                Some(Transition::Declined)
            }
        }
    }

    /// Ask every guard of the active branch whether the application may close.
    ///
    /// Guards receive no destination. Returns the first prompt message; a bare
    /// cancel cannot hold back an unload and counts as allow.
    pub fn before_unload(&self) -> Option<String> {
        let guards: Vec<LeaveGuard> = {
            let state = self.state();
            state
                .listeners
                .iter()
                .filter(|listener| state.current.branch.iter().any(|route| route.id() == listener.route))
                .map(|listener| Arc::clone(&listener.guard))
                .collect()
        };

        guards.iter().find_map(|guard| match guard(None) {
            LeaveVerdict::Prompt(message) => Some(message),
            LeaveVerdict::Allow | LeaveVerdict::Cancel => None,
        })
    }
}

impl History for MemoryHistory {
    fn listen_before_leaving_route(&self, route: &Route, guard: LeaveGuard) -> Unlisten {
        let id = {
            let mut state = self.state();
            let id = state.next_listener_id;
            state.next_listener_id += 1;
            state.listeners.push(Listener {
                id,
                route: route.id(),
                guard,
            });
            id
        };
        debug!(route = route.path(), listener = id, "leave guard attached");

        let state = Arc::downgrade(&self.state);
        let path = route.path().to_owned();
        Box::new(move || {
            if let Some(state) = state.upgrade() {
                let mut state = state.lock().unwrap_or_else(PoisonError::into_inner);
                state.listeners.retain(|listener| listener.id != id);
                debug!(route = %path, listener = id, "leave guard detached");
            }
        })
    }
}
