use snafu::prelude::*;
use std::path::PathBuf;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum Error {
    #[snafu(display(
        "No route to guard: use the leave guard either on a routed component \
         or on a descendant whose RouteContext carries a route"
    ))]
    MissingRouteContext,

    #[snafu(display("A guarded component requires a leave guard (HasLeaveGuard::leave_guard returned None)"))]
    MissingGuardCallback,

    #[snafu(display("Lifecycle already {state}; create a new instance to guard again"))]
    LifecycleReused { state: &'static str },

    #[snafu(display("No route is defined for location '{pathname}'"))]
    UnknownLocation { pathname: String },

    #[snafu(display("Failed to lock mutex: poisoned"))]
    LockPoisoned,

    #[snafu(display("Terminal error: {source}"))]
    Terminal { source: std::io::Error },

    #[snafu(display("IO error: {source}"))]
    Io { source: std::io::Error },

    #[snafu(display("Failed to read config {}: {source}", path.display()))]
    ConfigRead { path: PathBuf, source: std::io::Error },

    #[snafu(display("Failed to parse config: {source}"))]
    ConfigParse { source: toml::de::Error },

    #[snafu(display("Invalid config: {reason}"))]
    InvalidConfig { reason: String },

    #[snafu(display("Failed to initialize logging: {message}"))]
    LoggingInit { message: String },
}

pub type Result<T> = std::result::Result<T, Error>;
