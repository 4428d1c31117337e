use crossterm::event::KeyCode;
use rat_router::{
    Action, Component, Context, Event, EventContext, Guarded, HasLeaveGuard, HasRoute, LeaveGuard, LeaveVerdict,
    Location, Route, leave_guard,
};
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Paragraph, Wrap};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

const UNSAVED_PROMPT: &str = "You have unsaved changes. Leave the editor anyway?";

/// A text buffer that asks before unsaved text is left behind.
pub struct EditorPage {
    route: Route,
    text: String,
    saved: String,
    dirty: Arc<AtomicBool>,
    inserting: bool,
    lock: Guarded<LockPanel>,
}

impl EditorPage {
    pub fn new(route: Route) -> Self {
        Self {
            route,
            text: String::new(),
            saved: String::new(),
            dirty: Arc::new(AtomicBool::new(false)),
            inserting: false,
            lock: Guarded::new(LockPanel::default()),
        }
    }

    fn edited(&mut self) {
        self.dirty.store(self.text != self.saved, Ordering::Relaxed);
    }

    fn save(&mut self) {
        self.saved = self.text.clone();
        self.edited();
        tracing::info!(bytes = self.saved.len(), "editor saved");
    }

    fn revert(&mut self) {
        self.text = self.saved.clone();
        self.edited();
    }

    fn insert_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Esc => self.inserting = false,
            KeyCode::Char(c) => self.text.push(c),
            KeyCode::Enter => self.text.push('\n'),
            KeyCode::Backspace => {
                self.text.pop();
            }
            _ => return,
        }
        self.edited();
    }

    fn is_dirty(&self) -> bool {
        self.dirty.load(Ordering::Relaxed)
    }
}

impl HasRoute for EditorPage {
    fn route(&self) -> Option<&Route> {
        Some(&self.route)
    }
}

impl HasLeaveGuard for EditorPage {
    fn leave_guard(&self) -> Option<LeaveGuard> {
        let dirty = Arc::clone(&self.dirty);
        Some(leave_guard(move |_: Option<&Location>| {
            dirty.load(Ordering::Relaxed).then_some(UNSAVED_PROMPT)
        }))
    }
}

impl Component for EditorPage {
    fn on_mount(&mut self, cx: &mut Context) -> rat_router::Result<()> {
        // The lock panel sits below the editor's route.
        let mut child_cx = cx.child(self.route.clone());
        self.lock.on_mount(&mut child_cx)
    }

    fn on_unmount(&mut self, cx: &mut Context) {
        let mut child_cx = cx.child(self.route.clone());
        self.lock.on_unmount(&mut child_cx);
    }

    fn render(&mut self, frame: &mut ratatui::Frame, cx: &mut Context) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Min(3),    // Buffer
                Constraint::Length(3), // Lock panel
                Constraint::Length(1), // Status
            ])
            .split(cx.area);

        let title = if self.is_dirty() { " Editor [modified] " } else { " Editor " };
        let border = if self.inserting { Color::Yellow } else { Color::Cyan };
        let mut body = self.text.clone();
        if self.inserting {
            body.push('_');
        }
        let buffer = Paragraph::new(body).wrap(Wrap { trim: false }).block(
            Block::default()
                .title(title)
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .border_style(Style::default().fg(border)),
        );
        frame.render_widget(buffer, chunks[0]);

        let mut lock_cx = cx.child(self.route.clone()).with_area(chunks[1]);
        self.lock.render(frame, &mut lock_cx);

        let mode = if self.inserting {
            Span::styled(" INSERT ", Style::default().fg(Color::Black).bg(Color::Yellow))
        } else {
            Span::styled(" NORMAL ", Style::default().fg(Color::Black).bg(Color::Cyan))
        };
        let status = Line::from(vec![
            mode,
            Span::styled(
                "  i insert · esc normal · s save · u revert · l lock",
                Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
            ),
        ]);
        frame.render_widget(Paragraph::new(status), chunks[2]);
    }

    fn handle_event(&mut self, event: Event, _cx: &mut EventContext) -> Option<Action> {
        if self.inserting {
            return match event {
                Event::Key(key) => {
                    self.insert_key(key.code);
                    Some(Action::Noop)
                }
                Event::Paste(text) => {
                    self.text.push_str(&text);
                    self.edited();
                    Some(Action::Noop)
                }
                _ => None,
            };
        }

        match event {
            Event::Key(key) => match key.code {
                KeyCode::Char('i') => {
                    self.inserting = true;
                    Some(Action::Noop)
                }
                KeyCode::Char('s') => {
                    self.save();
                    Some(Action::Noop)
                }
                KeyCode::Char('u') => {
                    self.revert();
                    Some(Action::Noop)
                }
                KeyCode::Char('l') => {
                    self.lock.inner_mut().toggle();
                    Some(Action::Noop)
                }
                _ => None,
            },
            _ => None,
        }
    }
}

/// Refuses to let the editor's route go while locked.
#[derive(Default)]
pub struct LockPanel {
    locked: Arc<AtomicBool>,
}

impl LockPanel {
    fn toggle(&mut self) {
        let locked = !self.locked.load(Ordering::Relaxed);
        self.locked.store(locked, Ordering::Relaxed);
        tracing::debug!(locked, "editor lock toggled");
    }
}

// Route comes from the RouteContext provided by EditorPage.
impl HasRoute for LockPanel {}

impl HasLeaveGuard for LockPanel {
    fn leave_guard(&self) -> Option<LeaveGuard> {
        let locked = Arc::clone(&self.locked);
        Some(leave_guard(move |next: Option<&Location>| {
            if !locked.load(Ordering::Relaxed) {
                return LeaveVerdict::Allow;
            }
            match next {
                Some(_) => LeaveVerdict::Cancel,
                None => LeaveVerdict::Prompt("The editor is locked. Quit anyway?".to_string()),
            }
        }))
    }
}

impl Component for LockPanel {
    fn render(&mut self, frame: &mut ratatui::Frame, cx: &mut Context) {
        let (label, color) = if self.locked.load(Ordering::Relaxed) {
            ("Locked: navigation away from the editor is refused", Color::Red)
        } else {
            ("Unlocked", Color::Green)
        };
        let panel = Paragraph::new(Span::styled(label, Style::default().fg(color))).block(
            Block::default()
                .title(" Lock ")
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded),
        );
        frame.render_widget(panel, cx.area);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rat_router::NavigationAction;

    fn about() -> Location {
        Location::new("/about", NavigationAction::Push)
    }

    #[test]
    fn test_editor_prompts_only_when_dirty() {
        let mut editor = EditorPage::new(Route::new("/editor"));
        let guard = editor.leave_guard().unwrap();
        assert_eq!(guard(Some(&about())), LeaveVerdict::Allow);

        editor.inserting = true;
        editor.insert_key(KeyCode::Char('x'));
        assert_eq!(guard(Some(&about())), LeaveVerdict::Prompt(UNSAVED_PROMPT.to_string()));
        assert_eq!(guard(None), LeaveVerdict::Prompt(UNSAVED_PROMPT.to_string()));

        editor.save();
        assert_eq!(guard(Some(&about())), LeaveVerdict::Allow);

        editor.insert_key(KeyCode::Backspace);
        assert!(editor.is_dirty());
        editor.revert();
        assert!(!editor.is_dirty());
    }

    #[test]
    fn test_lock_cancels_navigation_and_prompts_on_quit() {
        let mut panel = LockPanel::default();
        let guard = panel.leave_guard().unwrap();
        assert!(guard(Some(&about())).is_allow());

        panel.toggle();
        assert_eq!(guard(Some(&about())), LeaveVerdict::Cancel);
        assert!(matches!(guard(None), LeaveVerdict::Prompt(_)));
    }
}
