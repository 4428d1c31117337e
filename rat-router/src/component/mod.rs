//! Component module.
//!
//! Defines the `Component` trait and the `Guarded` wrapper that ties a leave
//! guard to a component's mount/unmount hooks.

pub mod guarded;
pub mod traits;

pub use guarded::Guarded;
pub use traits::Component;
