use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use crate::session::{App, InputMode};

pub fn draw_keybar(f: &mut Frame, area: Rect, app: &App) {
    let bindings: Vec<(&str, &str)> = if app.expired {
        vec![
            ("arrows", "review"),
            ("Ctrl+S", "submit"),
            ("Ctrl+Q", "quit"),
        ]
    } else {
        match app.input_mode {
            InputMode::TextInput => vec![
                ("←/→", "cursor"),
                ("Esc", "done editing"),
                ("Ctrl+F", "flag"),
                ("Ctrl+S", "submit"),
                ("Ctrl+Q", "quit"),
            ],
            InputMode::ChoiceSelect => vec![
                ("a-z", "answer"),
                ("arrows", "prev/next"),
                ("PgUp/PgDn", "jump 5"),
                ("Ctrl+F", "flag"),
                ("Ctrl+S", "submit"),
                ("Ctrl+Q", "quit"),
            ],
            InputMode::Navigation => vec![
                ("Enter", "edit answer"),
                ("Ctrl+E", "editor"),
                ("arrows", "prev/next"),
                ("Ctrl+F", "flag"),
                ("Ctrl+S", "submit"),
                ("Ctrl+Q", "quit"),
            ],
        }
    };

    let mut spans: Vec<Span> = vec![Span::raw(" ")];
    for (i, (key, action)) in bindings.iter().enumerate() {
        if i > 0 {
            spans.push(Span::raw("   "));
        }
        spans.push(Span::styled(
            key.to_string(),
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ));
        spans.push(Span::raw(format!(" {}", action)));
    }

    let line = Line::from(spans);
    let widget = Paragraph::new(line).style(Style::default().bg(Color::Rgb(20, 20, 20)));
    f.render_widget(widget, area);
}
