//! Leave-guard lifecycle for components.
//!
//! A component opts into leave guarding by implementing [`HasLeaveGuard`] and,
//! when it sits directly on a route, [`HasRoute`]. Components nested below a
//! routed component inherit the route through the [`RouteContext`] their parent
//! hands down.
//!
//! Registration follows the component's mount phase and returns a
//! [`LeaveRegistration`]; releasing it (explicitly or by dropping it) detaches
//! the guard from the history. [`Lifecycle`] tracks the pair for components
//! that keep the registration in a field.
//!
//! # Example
//! ```ignore
//! struct Editor {
//!     route: Route,
//!     dirty: Arc<AtomicBool>,
//!     lifecycle: Lifecycle,
//! }
//!
//! impl HasRoute for Editor {
//!     fn route(&self) -> Option<&Route> {
//!         Some(&self.route)
//!     }
//! }
//!
//! impl HasLeaveGuard for Editor {
//!     fn leave_guard(&self) -> Option<LeaveGuard> {
//!         let dirty = Arc::clone(&self.dirty);
//!         Some(leave_guard(move |_| dirty.load(Ordering::Relaxed).then_some("Discard changes?")))
//!     }
//! }
//!
//! // mount
//! editor.lifecycle.mount(&editor, &cx.route)?;
//! // unmount
//! editor.lifecycle.unmount();
//! ```

use crate::error::{LifecycleReusedSnafu, MissingGuardCallbackSnafu, MissingRouteContextSnafu, Result};
use crate::guard::LeaveGuard;
use crate::history::{History, Unlisten};
use crate::route::Route;
use snafu::OptionExt;
use std::sync::Arc;
use tracing::debug;

/// A component that is mounted directly on a route.
pub trait HasRoute {
    fn route(&self) -> Option<&Route> {
        None
    }
}

/// A component that wants to be asked before its route is left.
pub trait HasLeaveGuard {
    fn leave_guard(&self) -> Option<LeaveGuard>;
}

/// Route information handed from a parent to its children.
#[derive(Clone)]
pub struct RouteContext {
    history: Arc<dyn History>,
    route: Option<Route>,
}

impl RouteContext {
    /// A context without a route, as seen by the root component.
    pub fn new(history: Arc<dyn History>) -> Self {
        Self { history, route: None }
    }

    /// Derive the context for children of a component sitting on `route`.
    pub fn with_route(&self, route: Route) -> Self {
        Self {
            history: Arc::clone(&self.history),
            route: Some(route),
        }
    }

    pub fn route(&self) -> Option<&Route> {
        self.route.as_ref()
    }

    pub fn history(&self) -> &Arc<dyn History> {
        &self.history
    }
}

impl std::fmt::Debug for RouteContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RouteContext").field("route", &self.route).finish_non_exhaustive()
    }
}

/// Find the route a component guards: its own route first, then the one
/// provided by its ancestors.
pub fn resolve_route<C>(component: &C, cx: &RouteContext) -> Result<Route>
where
    C: HasRoute + ?Sized,
{
    component
        .route()
        .or_else(|| cx.route())
        .cloned()
        .context(MissingRouteContextSnafu)
}

/// Attach the component's leave guard to the history for its route.
///
/// Fails before touching the history when the component has no guard or no
/// route can be resolved.
pub fn register<C>(component: &C, cx: &RouteContext) -> Result<LeaveRegistration>
where
    C: HasRoute + HasLeaveGuard + ?Sized,
{
    let guard = component.leave_guard().context(MissingGuardCallbackSnafu)?;
    let route = resolve_route(component, cx)?;
    let unlisten = cx.history().listen_before_leaving_route(&route, guard);
    debug!(route = route.path(), "leave guard registered");
    Ok(LeaveRegistration {
        route,
        unlisten: Some(unlisten),
    })
}

/// Handle to a registered leave guard. Releases the guard exactly once, either
/// through [`LeaveRegistration::unregister`] or on drop.
#[must_use = "dropping a LeaveRegistration detaches the guard"]
pub struct LeaveRegistration {
    route: Route,
    unlisten: Option<Unlisten>,
}

impl LeaveRegistration {
    /// The route the guard listens on.
    pub fn route(&self) -> &Route {
        &self.route
    }

    /// Detach the guard.
    pub fn unregister(mut self) {
        self.release();
    }

    fn release(&mut self) {
        if let Some(unlisten) = self.unlisten.take() {
            unlisten();
            debug!(route = self.route.path(), "leave guard released");
        }
    }
}

impl Drop for LeaveRegistration {
    fn drop(&mut self) {
        self.release();
    }
}

impl std::fmt::Debug for LeaveRegistration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LeaveRegistration")
            .field("route", &self.route)
            .field("attached", &self.unlisten.is_some())
            .finish()
    }
}

enum LifecycleState {
    Unregistered,
    Registered(LeaveRegistration),
    Released,
}

/// Mount/unmount bookkeeping for one guarded component instance.
///
/// `Unregistered` → `Registered` on a successful [`mount`](Self::mount), then
/// `Released` on [`unmount`](Self::unmount). `Released` is final.
pub struct Lifecycle {
    state: LifecycleState,
}

impl Lifecycle {
    pub fn new() -> Self {
        Self {
            state: LifecycleState::Unregistered,
        }
    }

    /// Register the component's guard. A failed mount leaves the lifecycle
    /// unregistered.
    pub fn mount<C>(&mut self, component: &C, cx: &RouteContext) -> Result<()>
    where
        C: HasRoute + HasLeaveGuard + ?Sized,
    {
        match self.state {
            LifecycleState::Unregistered => {
                self.state = LifecycleState::Registered(register(component, cx)?);
                Ok(())
            }
            LifecycleState::Registered(_) => LifecycleReusedSnafu { state: "registered" }.fail(),
            LifecycleState::Released => LifecycleReusedSnafu { state: "released" }.fail(),
        }
    }

    /// Release the guard if one was registered. Safe to call when mount never
    /// succeeded.
    pub fn unmount(&mut self) {
        if let LifecycleState::Registered(registration) =
            std::mem::replace(&mut self.state, LifecycleState::Released)
        {
            registration.unregister();
        }
    }

    pub fn is_registered(&self) -> bool {
        matches!(self.state, LifecycleState::Registered(_))
    }

    pub fn is_released(&self) -> bool {
        matches!(self.state, LifecycleState::Released)
    }

    /// The guarded route while registered.
    pub fn route(&self) -> Option<&Route> {
        match &self.state {
            LifecycleState::Registered(registration) => Some(registration.route()),
            _ => None,
        }
    }
}

impl Default for Lifecycle {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::guard::leave_guard;
    use crate::Error;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct RecordingHistory {
        calls: Mutex<Vec<(Route, LeaveGuard)>>,
        released: Arc<AtomicUsize>,
    }

    impl RecordingHistory {
        fn call_count(&self) -> usize {
            self.calls.lock().unwrap().len()
        }

        fn released(&self) -> usize {
            self.released.load(Ordering::SeqCst)
        }
    }

    impl History for RecordingHistory {
        fn listen_before_leaving_route(&self, route: &Route, guard: LeaveGuard) -> Unlisten {
            self.calls.lock().unwrap().push((route.clone(), guard));
            let released = Arc::clone(&self.released);
            Box::new(move || {
                released.fetch_add(1, Ordering::SeqCst);
            })
        }
    }

    struct TestComponent {
        route: Option<Route>,
        guard: Option<LeaveGuard>,
    }

    impl HasRoute for TestComponent {
        fn route(&self) -> Option<&Route> {
            self.route.as_ref()
        }
    }

    impl HasLeaveGuard for TestComponent {
        fn leave_guard(&self) -> Option<LeaveGuard> {
            self.guard.clone()
        }
    }

    fn setup() -> (Arc<RecordingHistory>, RouteContext) {
        let history = Arc::new(RecordingHistory::default());
        let cx = RouteContext::new(history.clone());
        (history, cx)
    }

    #[test]
    fn test_own_route_takes_precedence() {
        let (_, cx) = setup();
        let r1 = Route::new("/r1");
        let r2 = Route::new("/r2");
        let component = TestComponent {
            route: Some(r1.clone()),
            guard: None,
        };
        assert_eq!(resolve_route(&component, &cx.with_route(r2)).unwrap(), r1);
    }

    #[test]
    fn test_route_inherited_from_context() {
        let (_, cx) = setup();
        let r2 = Route::new("/r2");
        let component = TestComponent { route: None, guard: None };
        assert_eq!(resolve_route(&component, &cx.with_route(r2.clone())).unwrap(), r2);
    }

    #[test]
    fn test_mount_with_own_route() {
        let (history, cx) = setup();
        let r1 = Route::new("/r1");
        let guard = leave_guard(|_| true);
        let component = TestComponent {
            route: Some(r1.clone()),
            guard: Some(Arc::clone(&guard)),
        };

        let mut lifecycle = Lifecycle::new();
        lifecycle.mount(&component, &cx).unwrap();
        assert!(lifecycle.is_registered());
        assert_eq!(lifecycle.route(), Some(&r1));
        {
            let calls = history.calls.lock().unwrap();
            assert_eq!(calls.len(), 1);
            assert_eq!(calls[0].0, r1);
            assert!(Arc::ptr_eq(&calls[0].1, &guard));
        }

        lifecycle.unmount();
        assert_eq!(history.released(), 1);
        assert!(lifecycle.is_released());

        lifecycle.unmount();
        assert_eq!(history.released(), 1);
    }

    #[test]
    fn test_mount_with_context_route() {
        let (history, cx) = setup();
        let r2 = Route::new("/r2");
        let component = TestComponent {
            route: None,
            guard: Some(leave_guard(|_| true)),
        };

        let registration = register(&component, &cx.with_route(r2.clone())).unwrap();
        assert_eq!(registration.route(), &r2);
        assert_eq!(history.calls.lock().unwrap()[0].0, r2);

        registration.unregister();
        assert_eq!(history.released(), 1);
    }

    #[test]
    fn test_missing_route_fails_before_history() {
        let (history, cx) = setup();
        let component = TestComponent {
            route: None,
            guard: Some(leave_guard(|_| true)),
        };

        let mut lifecycle = Lifecycle::new();
        let err = lifecycle.mount(&component, &cx).unwrap_err();
        assert!(matches!(err, Error::MissingRouteContext));
        assert_eq!(history.call_count(), 0);
        assert!(!lifecycle.is_registered());

        lifecycle.unmount();
        assert_eq!(history.released(), 0);
    }

    #[test]
    fn test_missing_guard_fails_before_history() {
        let (history, cx) = setup();
        let component = TestComponent {
            route: Some(Route::new("/r1")),
            guard: None,
        };

        let err = register(&component, &cx).unwrap_err();
        assert!(matches!(err, Error::MissingGuardCallback));
        assert_eq!(history.call_count(), 0);
    }

    #[test]
    fn test_missing_guard_reported_before_missing_route() {
        let (_, cx) = setup();
        let component = TestComponent { route: None, guard: None };
        assert!(matches!(register(&component, &cx), Err(Error::MissingGuardCallback)));
    }

    #[test]
    fn test_drop_releases_once() {
        let (history, cx) = setup();
        let component = TestComponent {
            route: Some(Route::new("/r1")),
            guard: Some(leave_guard(|_| false)),
        };

        let registration = register(&component, &cx).unwrap();
        drop(registration);
        assert_eq!(history.released(), 1);

        let mut lifecycle = Lifecycle::new();
        lifecycle.mount(&component, &cx).unwrap();
        drop(lifecycle);
        assert_eq!(history.released(), 2);
    }

    #[test]
    fn test_lifecycle_cannot_be_reused() {
        let (history, cx) = setup();
        let component = TestComponent {
            route: Some(Route::new("/r1")),
            guard: Some(leave_guard(|_| true)),
        };

        let mut lifecycle = Lifecycle::new();
        lifecycle.mount(&component, &cx).unwrap();
        assert!(matches!(
            lifecycle.mount(&component, &cx),
            Err(Error::LifecycleReused { state: "registered" })
        ));

        lifecycle.unmount();
        assert!(matches!(
            lifecycle.mount(&component, &cx),
            Err(Error::LifecycleReused { state: "released" })
        ));
        assert_eq!(history.call_count(), 1);
        assert_eq!(history.released(), 1);
    }
}
