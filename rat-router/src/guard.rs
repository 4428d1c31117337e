//! Leave guards.
//!
//! A leave guard is asked before the router leaves the route it was registered
//! for. On ordinary transitions it receives the location being navigated to.
//! On application quit it receives `None`: the destination is unknowable, so
//! only a prompt message can hold the user back.

use crate::route::Location;
use std::sync::Arc;

/// The answer of a leave guard.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LeaveVerdict {
    /// Let the transition proceed.
    #[default]
    Allow,
    /// Abort the transition.
    Cancel,
    /// Ask the user; proceed only if they confirm.
    Prompt(String),
}

impl LeaveVerdict {
    pub fn is_allow(&self) -> bool {
        matches!(self, LeaveVerdict::Allow)
    }
}

impl From<bool> for LeaveVerdict {
    fn from(allow: bool) -> Self {
        if allow { LeaveVerdict::Allow } else { LeaveVerdict::Cancel }
    }
}

impl From<()> for LeaveVerdict {
    fn from(_: ()) -> Self {
        LeaveVerdict::Allow
    }
}

impl From<String> for LeaveVerdict {
    fn from(message: String) -> Self {
        LeaveVerdict::Prompt(message)
    }
}

impl From<&str> for LeaveVerdict {
    fn from(message: &str) -> Self {
        LeaveVerdict::Prompt(message.to_owned())
    }
}

impl<V: Into<LeaveVerdict>> From<Option<V>> for LeaveVerdict {
    fn from(value: Option<V>) -> Self {
        value.map(Into::into).unwrap_or_default()
    }
}

/// A shared guard callback. The history keeps a clone of the `Arc`, never of
/// the closure itself.
pub type LeaveGuard = Arc<dyn Fn(Option<&Location>) -> LeaveVerdict + Send + Sync>;

/// Build a [`LeaveGuard`] from any closure whose result converts into a
/// [`LeaveVerdict`].
///
/// ```ignore
/// let dirty = Arc::new(AtomicBool::new(true));
/// let guard = leave_guard(move |_next| {
///     dirty.load(Ordering::Relaxed).then_some("Discard unsaved changes?")
/// });
/// ```
pub fn leave_guard<F, V>(f: F) -> LeaveGuard
where
    F: Fn(Option<&Location>) -> V + Send + Sync + 'static,
    V: Into<LeaveVerdict>,
{
    Arc::new(move |next: Option<&Location>| -> LeaveVerdict { f(next).into() })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::route::NavigationAction;

    #[test]
    fn test_verdict_conversions() {
        assert_eq!(LeaveVerdict::from(true), LeaveVerdict::Allow);
        assert_eq!(LeaveVerdict::from(false), LeaveVerdict::Cancel);
        assert_eq!(LeaveVerdict::from(()), LeaveVerdict::Allow);
        assert_eq!(
            LeaveVerdict::from("Leave?"),
            LeaveVerdict::Prompt("Leave?".to_string())
        );
        assert_eq!(LeaveVerdict::from(None::<&str>), LeaveVerdict::Allow);
        assert_eq!(LeaveVerdict::from(Some(false)), LeaveVerdict::Cancel);
    }

    #[test]
    fn test_leave_guard_sees_destination() {
        let guard = leave_guard(|next: Option<&Location>| match next {
            Some(location) if location.pathname == "/locked" => LeaveVerdict::Cancel,
            Some(_) => LeaveVerdict::Allow,
            None => LeaveVerdict::Prompt("Quit?".into()),
        });

        let locked = Location::new("/locked", NavigationAction::Push);
        let open = Location::new("/open", NavigationAction::Push);
        assert_eq!(guard(Some(&locked)), LeaveVerdict::Cancel);
        assert!(guard(Some(&open)).is_allow());
        assert_eq!(guard(None), LeaveVerdict::Prompt("Quit?".into()));
    }
}
