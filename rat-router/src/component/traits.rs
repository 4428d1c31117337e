use crate::application::{Context, EventContext};
use crate::route::Location;

/// Event type for component interactions.
#[derive(Debug, Clone)]
pub enum Event {
    Key(crossterm::event::KeyEvent),
    Mouse(crossterm::event::MouseEvent),
    Resize(u16, u16),
    FocusGained,
    FocusLost,
    Paste(String),
}

/// Action that a component can return after handling an event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Navigate(String), // pathname
    Back,
    Quit,
    Noop,
}

/// The core Component trait for implementers.
pub trait Component: Send + 'static {
    /// Called once when the component enters the tree, before it can be
    /// navigated away from.
    fn on_mount(&mut self, cx: &mut Context) -> crate::Result<()> {
        let _ = cx;
        Ok(())
    }

    /// Called once before the component is discarded.
    fn on_unmount(&mut self, cx: &mut Context) {
        let _ = cx;
    }

    /// Called after the history completed a transition.
    fn on_location_change(&mut self, location: &Location, cx: &mut Context) -> crate::Result<()> {
        let _ = location;
        let _ = cx;
        Ok(())
    }

    /// Render the component into the given area.
    fn render(&mut self, frame: &mut ratatui::Frame, cx: &mut Context);

    /// Handle an event, returning an optional action.
    fn handle_event(&mut self, event: Event, cx: &mut EventContext) -> Option<Action> {
        let _ = event;
        let _ = cx;
        None
    }
}
