use crate::application::{Context, EventContext};
use crate::component::traits::{Action, Component, Event};
use crate::lifecycle::{HasLeaveGuard, HasRoute, Lifecycle};
use crate::route::Location;

/// Binds a component's leave guard to its mount/unmount hooks.
///
/// The guard is registered before the inner `on_mount` runs and released after
/// the inner `on_unmount`. It is also released when the inner `on_mount` fails
/// or when the wrapper is dropped without being unmounted. A component whose
/// mount did not complete never sees `on_unmount`.
pub struct Guarded<C> {
    inner: C,
    lifecycle: Lifecycle,
}

impl<C> Guarded<C>
where
    C: Component + HasRoute + HasLeaveGuard,
{
    pub fn new(inner: C) -> Self {
        Self {
            inner,
            lifecycle: Lifecycle::new(),
        }
    }

    pub fn inner(&self) -> &C {
        &self.inner
    }

    pub fn inner_mut(&mut self) -> &mut C {
        &mut self.inner
    }

    pub fn is_registered(&self) -> bool {
        self.lifecycle.is_registered()
    }
}

impl<C> Component for Guarded<C>
where
    C: Component + HasRoute + HasLeaveGuard,
{
    fn on_mount(&mut self, cx: &mut Context) -> crate::Result<()> {
        self.lifecycle.mount(&self.inner, &cx.route)?;
        if let Err(err) = self.inner.on_mount(cx) {
            self.lifecycle.unmount();
            return Err(err);
        }
        Ok(())
    }

    fn on_unmount(&mut self, cx: &mut Context) {
        if self.lifecycle.is_registered() {
            self.inner.on_unmount(cx);
        }
        self.lifecycle.unmount();
    }

    fn on_location_change(&mut self, location: &Location, cx: &mut Context) -> crate::Result<()> {
        self.inner.on_location_change(location, cx)
    }

    fn render(&mut self, frame: &mut ratatui::Frame, cx: &mut Context) {
        self.inner.render(frame, cx);
    }

    fn handle_event(&mut self, event: Event, cx: &mut EventContext) -> Option<Action> {
        self.inner.handle_event(event, cx)
    }
}
