//! Leave guards for routed terminal UI components.
//!
//! Components that want a say before their route is left implement
//! [`HasLeaveGuard`] (and [`HasRoute`] when they sit directly on a route),
//! then either wrap themselves in [`Guarded`] or drive a [`Lifecycle`] from
//! their own mount/unmount hooks.

pub mod application;
pub mod component;
pub mod config;
pub mod error;
pub mod guard;
pub mod history;
pub mod lifecycle;
pub mod logging;
pub mod route;

pub use error::{Error, Result};

// Re-export common types for convenience
pub use application::{AppContext, Application, Context, EventContext, apply_transition};
pub use component::{Component, Guarded, traits::{Action, Event}};
pub use config::{LoggingSettings, RouterConfig};
pub use guard::{LeaveGuard, LeaveVerdict, leave_guard};
pub use history::{History, MemoryHistory, RouteTable, Transition, Unlisten, UserConfirmation};
pub use lifecycle::{HasLeaveGuard, HasRoute, LeaveRegistration, Lifecycle, RouteContext, register, resolve_route};
pub use logging::init_logging;
pub use route::{Location, NavigationAction, Route, RouteId};
