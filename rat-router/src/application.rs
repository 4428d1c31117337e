//! Terminal application loop.
//!
//! The loop renders the root component, feeds it terminal events and turns
//! the `Action`s it returns into history transitions. Leave prompts raised by
//! guards are rendered here, on top of the current screen.

use crate::component::Component;
use crate::component::traits::{Action, Event};
use crate::config::RouterConfig;
use crate::history::{MemoryHistory, Transition, UserConfirmation};
use crate::lifecycle::RouteContext;
use crate::route::Route;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event as CrosstermEvent, KeyCode, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::prelude::*;
use ratatui::widgets::{Block, BorderType, Borders, Clear, Paragraph, Wrap};
use std::io::{self, stdout};
use std::sync::{Arc, Mutex};
use tokio::runtime::Runtime;
use tokio::sync::mpsc;
use tracing::{info, warn};

/// Application context providing access to global services.
#[derive(Clone)]
pub struct AppContext {
    /// The root component to render, if set by the user.
    root: Arc<Mutex<Option<Box<dyn Component>>>>,
    history: MemoryHistory,
    config: Arc<RouterConfig>,
    /// Internal: Channel to trigger a re-render.
    re_render_tx: mpsc::UnboundedSender<()>,
}

impl AppContext {
    pub(crate) fn new(
        history: MemoryHistory,
        config: Arc<RouterConfig>,
        re_render_tx: mpsc::UnboundedSender<()>,
    ) -> Self {
        Self {
            root: Arc::new(Mutex::new(None)),
            history,
            config,
            re_render_tx,
        }
    }

    /// A context outside a running application, for driving components
    /// directly. Refresh requests go nowhere.
    pub fn detached(history: MemoryHistory, config: RouterConfig) -> Self {
        let (re_render_tx, _) = mpsc::unbounded_channel();
        Self::new(history, Arc::new(config), re_render_tx)
    }

    pub fn history(&self) -> &MemoryHistory {
        &self.history
    }

    pub fn config(&self) -> &RouterConfig {
        &self.config
    }

    /// The route context seen by the root component: the history, no route.
    pub fn route_context(&self) -> RouteContext {
        RouteContext::new(Arc::new(self.history.clone()))
    }

    /// Set the root component of the application.
    pub fn set_root<C: Component>(&self, root: C) -> crate::Result<()> {
        let mut guard = self.root.lock().map_err(|_| crate::Error::LockPoisoned)?;
        *guard = Some(Box::new(root));
        self.refresh();
        Ok(())
    }

    fn take_root(&self) -> crate::Result<Option<Box<dyn Component>>> {
        let mut guard = self.root.lock().map_err(|_| crate::Error::LockPoisoned)?;
        Ok(guard.take())
    }

    /// Trigger a re-render.
    pub fn refresh(&self) {
        let _ = self.re_render_tx.send(());
    }
}

/// A specialized context passed to component methods.
pub struct Context {
    pub app: AppContext,
    pub area: Rect,
    /// Route information provided by the parent component.
    pub route: RouteContext,
}

impl Context {
    pub fn new(app: AppContext, area: Rect) -> Self {
        let route = app.route_context();
        Self { app, area, route }
    }

    /// Access the underlying AppContext.
    pub fn app(&self) -> &AppContext {
        &self.app
    }

    /// Context for the children of a component mounted on `route`.
    pub fn child(&self, route: Route) -> Context {
        Context {
            app: self.app.clone(),
            area: self.area,
            route: self.route.with_route(route),
        }
    }

    /// Same route information, different drawing area.
    pub fn with_area(&self, area: Rect) -> Context {
        Context {
            app: self.app.clone(),
            area,
            route: self.route.clone(),
        }
    }

    /// Explicitly trigger a re-render.
    pub fn notify(&self) {
        self.app.refresh();
    }
}

/// Context handed to `handle_event`.
pub type EventContext = Context;

type Term = Terminal<CrosstermBackend<io::Stdout>>;

/// Main application handle.
pub struct Application {
    history: MemoryHistory,
    config: RouterConfig,
}

impl Application {
    /// Create a new application navigating through `history`.
    pub fn new(history: MemoryHistory) -> Self {
        Self {
            history,
            config: RouterConfig::default(),
        }
    }

    pub fn with_config(mut self, config: RouterConfig) -> Self {
        self.config = config;
        self
    }

    /// Run the application with the given closure that receives a context.
    pub fn run<F>(self, setup: F) -> anyhow::Result<()>
    where
        F: FnOnce(&AppContext) -> anyhow::Result<()>,
    {
        let rt = Runtime::new().map_err(|e| anyhow::anyhow!("Failed to start tokio: {}", e))?;

        let (re_render_tx, re_render_rx) = mpsc::unbounded_channel();
        let app_context = AppContext::new(self.history.clone(), Arc::new(self.config.clone()), re_render_tx);

        let _guard = rt.enter();
        setup(&app_context)?;
        drop(_guard);

        let root = app_context
            .take_root()?
            .unwrap_or_else(|| Box::new(DummyView));

        rt.block_on(async move { self.run_loop(app_context, root, re_render_rx).await })
    }

    async fn run_loop(
        &self,
        app: AppContext,
        mut root: Box<dyn Component>,
        re_render_rx: mpsc::UnboundedReceiver<()>,
    ) -> anyhow::Result<()> {
        enable_raw_mode()?;
        let mut stdout = stdout();
        execute!(stdout, EnterAlternateScreen, EnableMouseCapture, event::EnableFocusChange)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;

        let area = screen(&terminal)?;
        let mut cx = Context::new(app.clone(), area);
        let result = match root.on_mount(&mut cx) {
            Ok(()) => {
                info!(location = %app.history().location(), "root mounted");
                let result = self.run_app_loop(app.clone(), &mut terminal, root.as_mut(), re_render_rx).await;
                // Lifecycle: unmount releases every leave guard before the terminal goes away.
                root.on_unmount(&mut Context::new(app, screen(&terminal).unwrap_or_default()));
                result
            }
            Err(err) => Err(err.into()),
        };

        disable_raw_mode()?;
        execute!(
            terminal.backend_mut(),
            LeaveAlternateScreen,
            DisableMouseCapture,
            event::DisableFocusChange
        )?;
        terminal.show_cursor()?;

        result
    }

    async fn run_app_loop(
        &self,
        app: AppContext,
        terminal: &mut Term,
        root: &mut dyn Component,
        mut re_render_rx: mpsc::UnboundedReceiver<()>,
    ) -> anyhow::Result<()> {
        let tick_rate = app.config().tick_rate();

        // Initial render
        app.refresh();

        loop {
            tokio::select! {
                _ = re_render_rx.recv() => {
                    draw(terminal, root, &app)?;
                }
                event_ready = async { event::poll(tick_rate) } => {
                    if let Ok(true) = event_ready {
                        let crossterm_event = event::read()?;
                        let internal_event = match crossterm_event {
                            CrosstermEvent::Key(key) if key.kind == KeyEventKind::Press => Some(Event::Key(key)),
                            CrosstermEvent::Mouse(mouse) => Some(Event::Mouse(mouse)),
                            CrosstermEvent::Resize(w, h) => Some(Event::Resize(w, h)),
                            CrosstermEvent::FocusGained => Some(Event::FocusGained),
                            CrosstermEvent::FocusLost => Some(Event::FocusLost),
                            CrosstermEvent::Paste(s) => Some(Event::Paste(s)),
                            _ => None,
                        };

                        if let Some(event) = internal_event {
                            let mut cx = Context::new(app.clone(), screen(terminal)?);
                            let action = root.handle_event(event, &mut cx);
                            app.refresh(); // Trigger refresh after any event handling

                            match action {
                                Some(Action::Navigate(pathname)) => {
                                    self.navigate(&app, terminal, root, |history, confirm| history.push(&pathname, confirm))?;
                                }
                                Some(Action::Back) => {
                                    self.navigate(&app, terminal, root, |history, confirm| history.go_back(confirm))?;
                                }
                                Some(Action::Quit) => {
                                    if self.may_quit(&app, terminal, root) {
                                        return Ok(());
                                    }
                                }
                                Some(Action::Noop) | None => {}
                            }
                        }
                    }
                }
            }
        }
    }

    fn navigate<F>(
        &self,
        app: &AppContext,
        terminal: &mut Term,
        root: &mut dyn Component,
        attempt: F,
    ) -> anyhow::Result<()>
    where
        F: FnOnce(&MemoryHistory, &mut dyn UserConfirmation) -> crate::Result<Transition>,
    {
        let transition = {
            let mut dialog = ConfirmDialog { app, terminal: &mut *terminal, root: &mut *root };
            attempt(app.history(), &mut dialog)?
        };

        let mut cx = Context::new(app.clone(), screen(terminal)?);
        apply_transition(root, &transition, &mut cx)?;
        Ok(())
    }

    /// Ask the active guards whether the application may close.
    fn may_quit(&self, app: &AppContext, terminal: &mut Term, root: &mut dyn Component) -> bool {
        if !app.config().confirm_on_quit {
            return true;
        }
        match app.history().before_unload() {
            Some(message) => ConfirmDialog { app, terminal, root }.confirm(&message),
            None => true,
        }
    }
}

/// Hand a completed transition to the root component, which unmounts the page
/// being left before mounting the next one. Other outcomes leave it untouched.
pub fn apply_transition(root: &mut dyn Component, transition: &Transition, cx: &mut Context) -> crate::Result<()> {
    if let Transition::Completed(location) = transition {
        root.on_location_change(location, cx)?;
    }
    Ok(())
}

fn screen(terminal: &Term) -> io::Result<Rect> {
    let size = terminal.size()?;
    Ok(Rect::new(0, 0, size.width, size.height))
}

fn draw(terminal: &mut Term, root: &mut dyn Component, app: &AppContext) -> io::Result<()> {
    terminal.draw(|frame| {
        let mut cx = Context::new(app.clone(), frame.area());
        root.render(frame, &mut cx);
    })?;
    Ok(())
}

/// Blocking yes/no dialog drawn over the current screen.
struct ConfirmDialog<'a> {
    app: &'a AppContext,
    terminal: &'a mut Term,
    root: &'a mut dyn Component,
}

impl ConfirmDialog<'_> {
    fn ask(&mut self, message: &str) -> io::Result<bool> {
        loop {
            let app = self.app;
            let root = &mut *self.root;
            self.terminal.draw(|frame| {
                let mut cx = Context::new(app.clone(), frame.area());
                root.render(frame, &mut cx);
                render_prompt(frame, message);
            })?;

            if let CrosstermEvent::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                match key.code {
                    KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => return Ok(true),
                    KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => return Ok(false),
                    _ => {}
                }
            }
        }
    }
}

impl UserConfirmation for ConfirmDialog<'_> {
    fn confirm(&mut self, message: &str) -> bool {
        let answer = match self.ask(message) {
            Ok(answer) => answer,
            Err(err) => {
                warn!(%err, "leave prompt failed, staying on the current route");
                false
            }
        };
        self.app.refresh();
        answer
    }
}

fn render_prompt(frame: &mut Frame, message: &str) {
    let area = frame.area();
    let width = area.width.min(60);
    let height = area.height.min(7);
    let popup = Rect::new(
        area.x + (area.width - width) / 2,
        area.y + (area.height - height) / 2,
        width,
        height,
    );

    let text = vec![
        Line::from(""),
        Line::from(message.to_string()),
        Line::from(""),
        Line::from(vec![
            Span::styled(" [y] ", Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)),
            Span::raw("leave   "),
            Span::styled(" [n] ", Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)),
            Span::raw("stay"),
        ]),
    ];
    let dialog = Paragraph::new(text)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .block(
            Block::default()
                .title(" Leave this page? ")
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .border_style(Style::default().fg(Color::Yellow)),
        );

    frame.render_widget(Clear, popup);
    frame.render_widget(dialog, popup);
}

struct DummyView;

impl Component for DummyView {
    fn render(&mut self, frame: &mut ratatui::Frame, cx: &mut Context) {
        let paragraph = ratatui::widgets::Paragraph::new("No component set")
            .alignment(ratatui::layout::Alignment::Center);
        frame.render_widget(paragraph, cx.area);
    }
}
