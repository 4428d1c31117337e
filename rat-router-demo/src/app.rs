use crate::pages::{AboutPage, EditorPage, HomePage};
use crossterm::event::KeyCode;
use rat_router::{Action, Component, Context, Event, EventContext, Guarded, Location, Route, RouteTable};
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};

pub const HOME: &str = "/";
pub const EDITOR: &str = "/editor";
pub const ABOUT: &str = "/about";

/// Route tree of the demo: a shell route with one child per page.
#[derive(Clone)]
pub struct Routes {
    pub shell: Route,
    pub home: Route,
    pub editor: Route,
    pub about: Route,
}

impl Default for Routes {
    fn default() -> Self {
        Self::new()
    }
}

impl Routes {
    pub fn new() -> Self {
        Self {
            shell: Route::new("/"),
            home: Route::new(HOME),
            editor: Route::new(EDITOR),
            about: Route::new(ABOUT),
        }
    }

    pub fn table(&self) -> RouteTable {
        RouteTable::new()
            .define(HOME, [self.shell.clone(), self.home.clone()])
            .define(EDITOR, [self.shell.clone(), self.editor.clone()])
            .define(ABOUT, [self.shell.clone(), self.about.clone()])
    }
}

enum Page {
    Home(HomePage),
    Editor(Guarded<EditorPage>),
    About(AboutPage),
}

impl Page {
    fn component(&mut self) -> &mut dyn Component {
        match self {
            Page::Home(page) => page,
            Page::Editor(page) => page,
            Page::About(page) => page,
        }
    }
}

/// Shell component: header tabs, the page for the current location, footer help.
pub struct Root {
    routes: Routes,
    location: String,
    page: Page,
}

impl Root {
    pub fn new(routes: Routes) -> Self {
        Self {
            routes,
            location: HOME.to_string(),
            page: Page::Home(HomePage::new()),
        }
    }

    fn page_for(&self, pathname: &str) -> Page {
        match pathname {
            EDITOR => Page::Editor(Guarded::new(EditorPage::new(self.routes.editor.clone()))),
            ABOUT => Page::About(AboutPage),
            _ => Page::Home(HomePage::new()),
        }
    }

    fn page_cx(&self, cx: &Context) -> Context {
        cx.child(self.routes.shell.clone())
    }

    fn show(&mut self, pathname: &str, cx: &mut Context) -> rat_router::Result<()> {
        self.location = pathname.to_string();
        self.page = self.page_for(pathname);
        let mut page_cx = self.page_cx(cx);
        self.page.component().on_mount(&mut page_cx)
    }

    fn render_tabs(&self) -> Line<'static> {
        let tabs = [("1", "Home", HOME), ("2", "Editor", EDITOR), ("3", "About", ABOUT)];
        let mut spans = Vec::new();
        for (key, label, path) in tabs {
            let style = if self.location == path {
                Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD | Modifier::REVERSED)
            } else {
                Style::default().fg(Color::Gray)
            };
            spans.push(Span::styled(format!(" [{key}] {label} "), style));
            spans.push(Span::raw(" "));
        }
        Line::from(spans)
    }
}

impl Component for Root {
    fn on_mount(&mut self, cx: &mut Context) -> rat_router::Result<()> {
        let location = cx.app().history().location();
        self.show(&location.pathname, cx)
    }

    fn on_unmount(&mut self, cx: &mut Context) {
        let mut page_cx = self.page_cx(cx);
        self.page.component().on_unmount(&mut page_cx);
    }

    fn on_location_change(&mut self, location: &Location, cx: &mut Context) -> rat_router::Result<()> {
        // Lifecycle: unmount the page being left before mounting the next one
        let mut page_cx = self.page_cx(cx);
        self.page.component().on_unmount(&mut page_cx);
        tracing::debug!(from = %self.location, to = %location, "switching page");
        self.show(&location.pathname, cx)
    }

    fn render(&mut self, frame: &mut ratatui::Frame, cx: &mut Context) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Tabs
                Constraint::Min(0),    // Page
                Constraint::Length(3), // Help
            ])
            .split(cx.area);

        let history = cx.app().history();
        let header = Paragraph::new(self.render_tabs()).block(
            Block::default()
                .title(format!(" rat-router · {} · back stack {} ", self.location, history.history_len()))
                .borders(Borders::ALL),
        );
        frame.render_widget(header, chunks[0]);

        let mut page_cx = self.page_cx(cx).with_area(chunks[1]);
        self.page.component().render(frame, &mut page_cx);

        let help = Paragraph::new(Line::from(vec![
            Span::styled(" 1-3 ", Style::default().fg(Color::Cyan)),
            Span::raw("navigate  "),
            Span::styled(" b ", Style::default().fg(Color::Cyan)),
            Span::raw("back  "),
            Span::styled(" q ", Style::default().fg(Color::Cyan)),
            Span::raw("quit"),
        ]))
        .block(Block::default().borders(Borders::ALL));
        frame.render_widget(help, chunks[2]);
    }

    fn handle_event(&mut self, event: Event, cx: &mut EventContext) -> Option<Action> {
        let mut page_cx = self.page_cx(cx);
        if let Some(action) = self.page.component().handle_event(event.clone(), &mut page_cx) {
            return Some(action);
        }

        match event {
            Event::Key(key) => match key.code {
                KeyCode::Char('1') => Some(Action::Navigate(HOME.to_string())),
                KeyCode::Char('2') => Some(Action::Navigate(EDITOR.to_string())),
                KeyCode::Char('3') => Some(Action::Navigate(ABOUT.to_string())),
                KeyCode::Char('b') | KeyCode::Backspace => Some(Action::Back),
                KeyCode::Char('q') => Some(Action::Quit),
                _ => None,
            },
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyEvent;
    use rat_router::{AppContext, MemoryHistory, RouterConfig, Transition, apply_transition};
    use ratatui::layout::Rect;

    fn mounted_at(pathname: &str) -> (MemoryHistory, Root, Context) {
        let routes = Routes::new();
        let history = MemoryHistory::new(routes.table(), pathname).unwrap();
        let app = AppContext::detached(history.clone(), RouterConfig::default());
        let mut cx = Context::new(app, Rect::new(0, 0, 80, 24));
        let mut root = Root::new(routes);
        root.on_mount(&mut cx).unwrap();
        (history, root, cx)
    }

    fn yes() -> impl FnMut(&str) -> bool {
        |_: &str| true
    }

    #[test]
    fn test_route_table_shares_shell() {
        let routes = Routes::new();
        let table = routes.table();

        for path in [HOME, EDITOR, ABOUT] {
            let branch = table.branch(path).unwrap();
            assert_eq!(branch[0], routes.shell);
        }
        assert_eq!(table.branch(EDITOR).unwrap()[1], routes.editor);
    }

    #[test]
    fn test_editor_registers_page_and_lock_guards() {
        let (history, root, _cx) = mounted_at(EDITOR);
        assert!(matches!(root.page, Page::Editor(ref page) if page.is_registered()));
        assert_eq!(history.listener_count(), 2);
    }

    #[test]
    fn test_leaving_editor_releases_its_guards() {
        let (history, mut root, mut cx) = mounted_at(EDITOR);

        let transition = history.push(ABOUT, &mut yes()).unwrap();
        assert!(transition.is_completed());
        apply_transition(&mut root, &transition, &mut cx).unwrap();

        assert_eq!(root.location, ABOUT);
        assert!(matches!(root.page, Page::About(_)));
        assert_eq!(history.listener_count(), 0);

        let transition = history.go_back(&mut yes()).unwrap();
        apply_transition(&mut root, &transition, &mut cx).unwrap();
        assert_eq!(root.location, EDITOR);
        assert_eq!(history.listener_count(), 2);
    }

    #[test]
    fn test_refused_transition_keeps_page() {
        let (history, mut root, mut cx) = mounted_at(EDITOR);
        let lock = Event::Key(KeyEvent::from(KeyCode::Char('l')));
        assert_eq!(root.handle_event(lock, &mut cx), Some(Action::Noop));

        let transition = history.push(HOME, &mut yes()).unwrap();
        assert_eq!(transition, Transition::Cancelled);
        apply_transition(&mut root, &transition, &mut cx).unwrap();
        assert_eq!(root.location, EDITOR);
        assert_eq!(history.listener_count(), 2);
    }

    #[test]
    fn test_unmount_releases_every_guard() {
        let (history, mut root, mut cx) = mounted_at(EDITOR);
        root.on_unmount(&mut cx);
        assert_eq!(history.listener_count(), 0);
    }
}
