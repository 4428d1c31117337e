use crate::app::{ABOUT, EDITOR};
use crossterm::event::KeyCode;
use rat_router::{Action, Component, Context, Event, EventContext};
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, List, ListItem, Paragraph, Wrap};

pub struct HomePage {
    selected: usize,
    options: Vec<(&'static str, &'static str, Option<&'static str>)>, // (label, description, path)
}

impl Default for HomePage {
    fn default() -> Self {
        Self::new()
    }
}

impl HomePage {
    pub fn new() -> Self {
        Self {
            selected: 0,
            options: vec![
                ("Editor", "A page that guards unsaved changes", Some(EDITOR)),
                ("About", "How leave guards are wired", Some(ABOUT)),
                ("Exit", "Quit application", None),
            ],
        }
    }
}

impl Component for HomePage {
    fn render(&mut self, frame: &mut ratatui::Frame, cx: &mut Context) {
        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
            .margin(1)
            .split(cx.area);

        let items: Vec<ListItem> = self
            .options
            .iter()
            .enumerate()
            .map(|(i, (label, desc, _))| {
                let is_selected = i == self.selected;
                let prefix = if is_selected { "> " } else { "  " };
                let color = if is_selected { Color::Cyan } else { Color::White };
                ListItem::new(vec![
                    Line::from(vec![
                        Span::styled(prefix, Style::default().fg(color)),
                        Span::styled(*label, Style::default().fg(color).add_modifier(Modifier::BOLD)),
                    ]),
                    Line::from(vec![
                        Span::raw("    "),
                        Span::styled(*desc, Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC)),
                    ]),
                ])
            })
            .collect();

        let list = List::new(items).block(
            Block::default()
                .title(" Pages ")
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded),
        );
        frame.render_widget(list, chunks[0]);

        let info = Paragraph::new(vec![
            Line::from(""),
            Line::styled(" Leave guards", Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)),
            Line::from(""),
            Line::from(" Open the editor, type something and try to"),
            Line::from(" leave: the editor asks before dropping"),
            Line::from(" unsaved text. Lock it to refuse leaving"),
            Line::from(" outright."),
        ])
        .wrap(Wrap { trim: false })
        .block(Block::default().borders(Borders::ALL).border_type(BorderType::Rounded));
        frame.render_widget(info, chunks[1]);
    }

    fn handle_event(&mut self, event: Event, _cx: &mut EventContext) -> Option<Action> {
        match event {
            Event::Key(key) if key.code == KeyCode::Up => {
                self.selected = self.selected.saturating_sub(1);
                Some(Action::Noop)
            }
            Event::Key(key) if key.code == KeyCode::Down => {
                if self.selected + 1 < self.options.len() {
                    self.selected += 1;
                }
                Some(Action::Noop)
            }
            Event::Key(key) if key.code == KeyCode::Enter => match self.options[self.selected].2 {
                Some(path) => Some(Action::Navigate(path.to_string())),
                None => Some(Action::Quit),
            },
            _ => None,
        }
    }
}
