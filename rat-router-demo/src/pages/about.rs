use rat_router::{Component, Context};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::Line;
use ratatui::widgets::{Block, BorderType, Borders, Paragraph, Wrap};

/// Static page without a leave guard.
pub struct AboutPage;

impl Component for AboutPage {
    fn render(&mut self, frame: &mut ratatui::Frame, cx: &mut Context) {
        let heading = Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD);
        let text = vec![
            Line::from(""),
            Line::styled(" Routed components", heading),
            Line::from(" The editor page implements HasRoute and HasLeaveGuard and is"),
            Line::from(" wrapped in Guarded: its guard is attached on mount and"),
            Line::from(" detached on unmount."),
            Line::from(""),
            Line::styled(" Nested components", heading),
            Line::from(" The lock panel has no route of its own. It inherits the"),
            Line::from(" editor's route through the RouteContext handed down to it."),
            Line::from(""),
            Line::styled(" Quitting", heading),
            Line::from(" On quit, guards are asked without a destination. Only a"),
            Line::from(" prompt message can keep the application open."),
        ];
        let paragraph = Paragraph::new(text).wrap(Wrap { trim: false }).block(
            Block::default()
                .title(" About ")
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded),
        );
        frame.render_widget(paragraph, cx.area);
    }
}
